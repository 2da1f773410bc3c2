//! Display helpers shared by front-ends.

pub mod format;

pub use format::{format_duration, format_energy};

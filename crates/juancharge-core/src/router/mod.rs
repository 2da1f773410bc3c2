//! Named routes and the navigation guard.
//!
//! `RouteGuard` decides each navigation from the route's `RouteMeta` and the
//! credential store alone. `Router` runs the guard before a route becomes
//! current, so no route is activated (and none of its data loaded) until the
//! decision is made.

pub mod guard;
pub mod routes;

use thiserror::Error;
use tracing::debug;

pub use guard::{Navigation, RouteGuard};
pub use routes::{Route, RouteMeta, RouteTable};

use crate::auth::{CredentialStore, StoreError};

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("Unknown route: {0}")]
    NotFound(String),

    #[error("Navigation check failed: {0}")]
    Storage(#[from] StoreError),
}

/// Holds the current route and runs every transition through the guard.
pub struct Router {
    guard: RouteGuard,
    current: Option<&'static str>,
    /// Target abandoned for a login redirect, if any.
    pending: Option<&'static str>,
}

impl Router {
    pub fn new(table: RouteTable, store: CredentialStore) -> Self {
        Self {
            guard: RouteGuard::new(table, store),
            current: None,
            pending: None,
        }
    }

    pub fn table(&self) -> &RouteTable {
        self.guard.table()
    }

    pub fn current(&self) -> Option<&Route> {
        self.current.and_then(|name| self.table().get(name))
    }

    /// Navigate to a route by name, returning the route actually entered.
    ///
    /// Redirects are followed once: the redirect target is always a route
    /// the guard allows in the state that produced the redirect.
    pub async fn navigate(&mut self, name: &str) -> Result<&Route, RouteError> {
        let decision = self.guard.check(self.current, name).await?;
        let entered = match decision {
            Navigation::Allow => self.resolve(name)?,
            Navigation::Redirect { to, resume } => {
                debug!(from = ?self.current, route = name, redirect = to, "Navigation redirected");
                if resume.is_some() {
                    self.pending = resume;
                }
                to
            }
        };

        self.current = Some(entered);
        self.table()
            .get(entered)
            .ok_or_else(|| RouteError::NotFound(entered.to_string()))
    }

    /// After a successful login: go to the target that was abandoned for the
    /// login redirect, or to the home route.
    pub async fn resume_after_login(&mut self) -> Result<&Route, RouteError> {
        let target = self.pending.take().unwrap_or(self.table().home());
        self.navigate(target).await
    }

    fn resolve(&self, name: &str) -> Result<&'static str, RouteError> {
        self.table()
            .get(name)
            .map(|route| route.name)
            .ok_or_else(|| RouteError::NotFound(name.to_string()))
    }
}

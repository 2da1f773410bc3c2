/// Format a charging duration: "45 min", "2h", "1h 30m".
pub fn format_duration(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{} min", minutes);
    }
    let hours = minutes / 60;
    let mins = minutes % 60;
    if mins > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}h", hours)
    }
}

/// Format watt-hours, switching to kWh from 1000 Wh.
pub fn format_energy(wh: f64) -> String {
    if wh < 1000.0 {
        format!("{:.2} Wh", wh)
    } else {
        format!("{:.2} kWh", wh / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0 min");
        assert_eq!(format_duration(45), "45 min");
        assert_eq!(format_duration(120), "2h");
        assert_eq!(format_duration(90), "1h 30m");
    }

    #[test]
    fn test_format_energy() {
        assert_eq!(format_energy(10.02), "10.02 Wh");
        assert_eq!(format_energy(1500.0), "1.50 kWh");
    }
}

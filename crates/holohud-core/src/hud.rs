//! HUD clock text

use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use std::time::Duration;

/// Default clock refresh cadence
pub const HUD_REFRESH: Duration = Duration::from_millis(1000);

/// Formatted HUD strings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HudText {
    /// 24-hour `HH:MM:SS`
    pub time: String,
    /// e.g. `MONDAY, OCT 19, 2026`
    pub date: String,
}

/// Formats wall-clock time for the HUD overlay
pub struct HudClock;

impl HudClock {
    pub fn format<Tz>(now: &DateTime<Tz>) -> HudText
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        HudText {
            time: now.format("%H:%M:%S").to_string(),
            date: now.format("%A, %b %d, %Y").to_string().to_uppercase(),
        }
    }

    /// HUD text for the local wall clock
    pub fn now() -> HudText {
        Self::format(&Local::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_format_fixed_instant() {
        let instant = Utc.with_ymd_and_hms(2026, 10, 19, 7, 5, 9).unwrap();
        let text = HudClock::format(&instant);
        assert_eq!(text.time, "07:05:09");
        assert_eq!(text.date, "MONDAY, OCT 19, 2026");
    }

    #[test]
    fn test_afternoon_is_24_hour() {
        let instant = Utc.with_ymd_and_hms(2024, 2, 3, 23, 59, 0).unwrap();
        let text = HudClock::format(&instant);
        assert_eq!(text.time, "23:59:00");
        assert_eq!(text.date, "SATURDAY, FEB 03, 2024");
    }
}

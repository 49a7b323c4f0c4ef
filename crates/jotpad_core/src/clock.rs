//! Timestamp source for note creation and edit times.
//!
//! Timestamps are stored as display strings, so the clock owns formatting.

use chrono::{DateTime, Local, TimeZone};

/// Local-time rendering used for stored timestamps, e.g. `10/16/2026, 3:04:05 PM`.
pub const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Produces the current timestamp string.
pub trait Clock {
    fn now(&self) -> String;
}

/// Wall clock in the device's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        format_timestamp(&Local::now())
    }
}

/// Clock returning a caller-controlled value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedClock {
    value: String,
}

impl FixedClock {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }
}

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.value.clone()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> String {
        (**self).now()
    }
}

/// Formats an instant with [`TIMESTAMP_FORMAT`].
pub fn format_timestamp<Tz: TimeZone>(instant: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp, Clock, FixedClock, SystemClock};
    use chrono::{TimeZone, Utc};

    #[test]
    fn format_matches_locale_style_rendering() {
        let afternoon = Utc.with_ymd_and_hms(2026, 10, 6, 15, 4, 5).unwrap();
        assert_eq!(format_timestamp(&afternoon), "10/6/2026, 3:04:05 PM");

        let midnight = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 9).unwrap();
        assert_eq!(format_timestamp(&midnight), "1/2/2026, 12:00:09 AM");
    }

    #[test]
    fn fixed_clock_returns_latest_value() {
        let mut clock = FixedClock::new("t1");
        assert_eq!(clock.now(), "t1");
        clock.set("t2");
        assert_eq!(clock.now(), "t2");
    }

    #[test]
    fn system_clock_is_never_empty() {
        assert!(!SystemClock.now().is_empty());
    }
}

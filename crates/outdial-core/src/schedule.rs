// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Business-hours window and retry scheduling.
//!
//! Automatic retries after `no_answer`/`busy` land inside the calling window
//! [open, close): a raw retry time before opening moves to opening the same
//! day, and one at or after closing moves to opening the next day.

use chrono::{Days, Duration, NaiveDateTime, NaiveTime};

use crate::error::OutdialError;

/// Default calling window: 08:00 (inclusive) to 21:00 (exclusive).
pub const DEFAULT_OPEN_HOUR: u32 = 8;
pub const DEFAULT_CLOSE_HOUR: u32 = 21;

/// The local-time window within which automatic retries may be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    open: NaiveTime,
    close: NaiveTime,
}

impl Default for BusinessHours {
    fn default() -> Self {
        // Constructed from the compiled-in constants; cannot fail.
        Self::new(DEFAULT_OPEN_HOUR, DEFAULT_CLOSE_HOUR)
            .unwrap_or(Self {
                open: NaiveTime::MIN,
                close: NaiveTime::MIN,
            })
    }
}

impl BusinessHours {
    /// Build a window from whole-hour bounds. The window must be non-empty
    /// and the close hour must fit within the day.
    pub fn new(open_hour: u32, close_hour: u32) -> Result<Self, OutdialError> {
        if open_hour >= close_hour || close_hour > 24 {
            return Err(OutdialError::Config(format!(
                "business hours window [{open_hour}, {close_hour}) is invalid"
            )));
        }
        let open = NaiveTime::from_hms_opt(open_hour, 0, 0).ok_or_else(|| {
            OutdialError::Config(format!("invalid business hours open hour {open_hour}"))
        })?;
        // close_hour == 24 means the window runs to end of day.
        let close = NaiveTime::from_hms_opt(close_hour % 24, 0, 0).ok_or_else(|| {
            OutdialError::Config(format!("invalid business hours close hour {close_hour}"))
        })?;
        Ok(Self { open, close })
    }

    /// Clamp a raw retry time into the window.
    ///
    /// Before opening: opening time the same day. At or after closing:
    /// opening time the next day. Otherwise unchanged.
    pub fn clamp(&self, at: NaiveDateTime) -> NaiveDateTime {
        let time = at.time();
        if time < self.open {
            at.date().and_time(self.open)
        } else if self.close > self.open && time >= self.close {
            at.date()
                .checked_add_days(Days::new(1))
                .map(|d| d.and_time(self.open))
                .unwrap_or(at)
        } else {
            at
        }
    }

    /// Retry time for an automatically rescheduled outcome: `now + delay`,
    /// clamped into the window.
    pub fn next_retry(&self, now: NaiveDateTime, delay: Duration) -> NaiveDateTime {
        self.clamp(now.checked_add_signed(delay).unwrap_or(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn evening_retry_rolls_to_next_morning() {
        // 18:00 + 4h = 22:00, past closing, shifts to next day 08:00.
        let hours = BusinessHours::default();
        let scheduled = hours.next_retry(at(2024, 1, 15, 18, 0), Duration::hours(4));
        assert_eq!(scheduled, at(2024, 1, 16, 8, 0));
    }

    #[test]
    fn in_window_retry_is_unchanged() {
        // 06:00 + 4h = 10:00, inside [8, 21).
        let hours = BusinessHours::default();
        let scheduled = hours.next_retry(at(2024, 1, 15, 6, 0), Duration::hours(4));
        assert_eq!(scheduled, at(2024, 1, 15, 10, 0));
    }

    #[test]
    fn early_morning_raw_time_in_window_is_unchanged() {
        // 05:30 + 4h = 09:30, inside the window.
        let hours = BusinessHours::default();
        let scheduled = hours.next_retry(at(2024, 1, 15, 5, 30), Duration::hours(4));
        assert_eq!(scheduled, at(2024, 1, 15, 9, 30));
    }

    #[test]
    fn pre_opening_raw_time_clamps_to_opening_same_day() {
        // 02:00 + 4h = 06:00, before opening, shifts to 08:00 the same day.
        let hours = BusinessHours::default();
        let scheduled = hours.next_retry(at(2024, 1, 15, 2, 0), Duration::hours(4));
        assert_eq!(scheduled, at(2024, 1, 15, 8, 0));
    }

    #[test]
    fn exactly_at_close_rolls_over() {
        let hours = BusinessHours::default();
        assert_eq!(hours.clamp(at(2024, 1, 15, 21, 0)), at(2024, 1, 16, 8, 0));
    }

    #[test]
    fn exactly_at_open_is_kept() {
        let hours = BusinessHours::default();
        assert_eq!(hours.clamp(at(2024, 1, 15, 8, 0)), at(2024, 1, 15, 8, 0));
    }

    #[test]
    fn rejects_inverted_or_oversized_window() {
        assert!(BusinessHours::new(21, 8).is_err());
        assert!(BusinessHours::new(8, 8).is_err());
        assert!(BusinessHours::new(8, 25).is_err());
        assert!(BusinessHours::new(0, 24).is_ok());
    }

    proptest! {
        #[test]
        fn clamped_time_is_always_inside_the_window(
            day in 1u32..=28,
            hour in 0u32..24,
            minute in 0u32..60,
        ) {
            let hours = BusinessHours::default();
            let clamped = hours.clamp(at(2024, 6, day, hour, minute));
            let t = clamped.time();
            prop_assert!(t >= NaiveTime::from_hms_opt(8, 0, 0).unwrap());
            prop_assert!(t < NaiveTime::from_hms_opt(21, 0, 0).unwrap());
        }

        #[test]
        fn clamp_never_moves_time_backwards(
            day in 1u32..=28,
            hour in 0u32..24,
            minute in 0u32..60,
        ) {
            let hours = BusinessHours::default();
            let raw = at(2024, 6, day, hour, minute);
            prop_assert!(hours.clamp(raw) >= raw);
        }
    }
}

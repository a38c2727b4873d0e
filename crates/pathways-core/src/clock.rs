//! Calendar clock and period keys.
//!
//! Streaks, weekly XP windows and challenge rotation all work on calendar
//! dates, never on instants. The engine asks a [`Clock`] for today's date so
//! tests and simulations can move time explicitly.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Source of "today".
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Settable clock for tests and simulations.
///
/// Clones share the same date, so a test can keep a handle and advance the
/// clock after handing a copy to the engine.
#[derive(Debug, Clone)]
pub struct FixedClock {
    date: Rc<Cell<NaiveDate>>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Rc::new(Cell::new(date)),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        self.date.set(date);
    }

    pub fn advance_days(&self, days: i64) {
        self.date.set(self.date.get() + Duration::days(days));
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date.get()
    }
}

/// Weekday that opens a weekly window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }

    /// Most recent date on or before `date` that falls on this weekday.
    pub fn anchor(self, date: NaiveDate) -> NaiveDate {
        let offset = match self.weekday() {
            Weekday::Mon => date.weekday().num_days_from_monday(),
            _ => date.weekday().num_days_from_sunday(),
        };
        date - Duration::days(i64::from(offset))
    }
}

/// Storage key for a calendar day.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Whole calendar days from `from` to `to` (negative if `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn sunday_anchor() {
        // 2026-10-16 is a Friday
        assert_eq!(WeekStart::Sunday.anchor(date(2026, 10, 16)), date(2026, 10, 11));
        assert_eq!(WeekStart::Sunday.anchor(date(2026, 10, 11)), date(2026, 10, 11));
        assert_eq!(WeekStart::Sunday.anchor(date(2026, 10, 17)), date(2026, 10, 11));
        assert_eq!(WeekStart::Sunday.anchor(date(2026, 10, 18)), date(2026, 10, 18));
    }

    #[test]
    fn monday_anchor() {
        assert_eq!(WeekStart::Monday.anchor(date(2026, 10, 16)), date(2026, 10, 12));
        assert_eq!(WeekStart::Monday.anchor(date(2026, 10, 18)), date(2026, 10, 12));
        assert_eq!(WeekStart::Monday.anchor(date(2026, 10, 19)), date(2026, 10, 19));
    }

    #[test]
    fn anchor_crosses_month_boundary() {
        assert_eq!(WeekStart::Sunday.anchor(date(2026, 11, 3)), date(2026, 11, 1));
        assert_eq!(WeekStart::Monday.anchor(date(2026, 11, 1)), date(2026, 10, 26));
    }

    #[test]
    fn fixed_clock_shares_date_between_clones() {
        let clock = FixedClock::new(date(2026, 1, 1));
        let handle = clock.clone();
        handle.advance_days(3);
        assert_eq!(clock.today(), date(2026, 1, 4));
    }

    #[test]
    fn day_gaps() {
        assert_eq!(days_between(date(2026, 2, 28), date(2026, 3, 1)), 1);
        assert_eq!(days_between(date(2026, 3, 1), date(2026, 2, 28)), -1);
        assert_eq!(day_key(date(2026, 3, 1)), "2026-03-01");
    }
}

//! Time source and the business calendar (fixed UTC offset, default +09:00).
//!
//! Budget and lockout code never reads the system clock directly. Each request
//! takes one `now` from the [`Clock`] in [`AppState`](crate::state::AppState)
//! and threads it through every calculation.

use std::sync::Mutex;

use chrono::{
    DateTime, Datelike, Days, Duration, FixedOffset, Months, NaiveDateTime, NaiveTime, Offset, Utc,
};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to an instant, moved only by hand. Used by tests.
#[derive(Debug)]
pub struct FixedClock {
    instant: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        match self.instant.lock() {
            Ok(mut guard) => *guard = instant,
            Err(poisoned) => *poisoned.into_inner() = instant,
        }
    }

    pub fn advance(&self, by: Duration) {
        let next = self.now() + by;
        self.set(next);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.instant.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Half-open `[start, end)` range covering one local calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MonthWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BusinessCalendar {
    offset: FixedOffset,
}

impl BusinessCalendar {
    pub fn new(utc_offset_hours: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix());
        Self { offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn local(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset)
    }

    pub fn month_window(&self, now: DateTime<Utc>) -> MonthWindow {
        let today = self.local(now).date_naive();
        let first = today - Days::new(u64::from(today.day0()));
        let next = first + Months::new(1);
        MonthWindow {
            start: self.to_utc(first.and_time(NaiveTime::MIN)),
            end: self.to_utc(next.and_time(NaiveTime::MIN)),
        }
    }

    pub fn is_first_of_month(&self, now: DateTime<Utc>) -> bool {
        self.local(now).day() == 1
    }

    fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        (local - Duration::seconds(i64::from(self.offset.local_minus_utc()))).and_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn kst() -> BusinessCalendar {
        BusinessCalendar::new(9)
    }

    #[test]
    fn month_window_follows_local_calendar() {
        // 2025-03-31 16:30 UTC is already 2025-04-01 01:30 in KST.
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 16, 30, 0).unwrap();
        let window = kst().month_window(now);
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 3, 31, 15, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2025, 4, 30, 15, 0, 0).unwrap());
    }

    #[test]
    fn window_edges_are_half_open() {
        let now = Utc.with_ymd_and_hms(2025, 2, 10, 3, 0, 0).unwrap();
        let window = kst().month_window(now);
        let last_moment = window.end - Duration::milliseconds(1);
        assert!(window.contains(window.start));
        assert!(window.contains(last_moment));
        assert!(!window.contains(window.end));
        assert!(!window.contains(window.start - Duration::milliseconds(1)));
    }

    #[test]
    fn december_rolls_into_next_year() {
        let now = Utc.with_ymd_and_hms(2025, 12, 20, 0, 0, 0).unwrap();
        let window = kst().month_window(now);
        assert_eq!(window.end, Utc.with_ymd_and_hms(2025, 12, 31, 15, 0, 0).unwrap());
    }

    #[test]
    fn first_of_month_uses_local_day() {
        let late_utc = Utc.with_ymd_and_hms(2025, 4, 30, 15, 0, 0).unwrap();
        assert!(kst().is_first_of_month(late_utc));
        assert!(!BusinessCalendar::new(0).is_first_of_month(late_utc));
    }

    #[test]
    fn fixed_clock_advances() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        clock.advance(Duration::minutes(31));
        assert_eq!(clock.now(), start + Duration::minutes(31));
    }
}

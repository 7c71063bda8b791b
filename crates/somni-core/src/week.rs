//! The previous-calendar-week time window.
//!
//! Weeks start on Monday 00:00:00 UTC. The window is half-open — it admits
//! Sunday 23:59:59 of the previous week and excludes the Monday 00:00:00
//! that starts the current one. The reference instant is always passed in;
//! nothing here reads the ambient clock.

use chrono::{DateTime, Duration, NaiveTime, Utc, Weekday};

/// A half-open `[start, end)` window over UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
  pub start: DateTime<Utc>,
  pub end:   DateTime<Utc>,
}

impl WeekWindow {
  /// True iff `instant` falls inside the window.
  pub fn contains(&self, instant: DateTime<Utc>) -> bool {
    self.start <= instant && instant < self.end
  }
}

/// The calendar week immediately preceding the week containing `now`:
/// Monday 00:00:00 of the week of `now - 7 days`, for exactly seven days.
pub fn previous_week(now: DateTime<Utc>) -> WeekWindow {
  let anchor = (now - Duration::days(7)).date_naive();
  let monday = anchor.week(Weekday::Mon).first_day();
  let start_naive = monday.and_time(NaiveTime::MIN);
  let start = DateTime::from_naive_utc_and_offset(start_naive, Utc);
  WeekWindow {
    start,
    end: start + Duration::days(7),
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  // Wednesday 2024-01-17 12:00 UTC; the previous week runs
  // Monday 2024-01-08 00:00:00 through Sunday 2024-01-14 23:59:59.
  fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 17, 12, 0, 0).unwrap()
  }

  #[test]
  fn window_runs_monday_to_monday() {
    let w = previous_week(reference_now());
    assert_eq!(w.start, Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap());
    assert_eq!(w.end, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
  }

  #[test]
  fn boundaries_are_inclusive_start_exclusive_end() {
    let w = previous_week(reference_now());

    // First representable instant of the window.
    assert!(w.contains(Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap()));
    // Last second of the previous Sunday.
    assert!(w.contains(Utc.with_ymd_and_hms(2024, 1, 14, 23, 59, 59).unwrap()));
    // One second before the window opens.
    assert!(!w.contains(Utc.with_ymd_and_hms(2024, 1, 7, 23, 59, 59).unwrap()));
    // The Monday that starts the current week.
    assert!(!w.contains(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()));
  }

  #[test]
  fn now_on_a_monday_still_yields_the_full_prior_week() {
    // Monday 2024-01-15 00:00 — `now - 7d` lands exactly on the previous
    // Monday, so the window is unchanged from midweek anchors.
    let now = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
    let w = previous_week(now);
    assert_eq!(w.start, Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap());
  }

  #[test]
  fn now_on_a_sunday_anchors_to_the_week_before() {
    // Sunday 2024-01-21 23:00 is still in the week of Jan 15; its previous
    // week is Jan 8–14.
    let now = Utc.with_ymd_and_hms(2024, 1, 21, 23, 0, 0).unwrap();
    let w = previous_week(now);
    assert_eq!(w.start, Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap());
  }

  #[test]
  fn window_spans_a_year_boundary() {
    // Tuesday 2024-01-02: the previous week is Mon 2023-12-25 .. Mon 2024-01-01.
    let now = Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
    let w = previous_week(now);
    assert_eq!(w.start, Utc.with_ymd_and_hms(2023, 12, 25, 0, 0, 0).unwrap());
    assert_eq!(w.end, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
  }
}

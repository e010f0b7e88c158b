//! Daily progress history and streak computation.
//!
//! One record per calendar day (focus minutes + completed sessions),
//! append-only. `DailyStats` is derived, never stored: it is recomputed
//! from the history on open and after every recorded completion.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::storage::{Database, ProgressRecord};

/// Calendar-day source. The progress store's only dependency; tests
/// inject a fixed clock.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Wall-clock calendar day in the user's local timezone.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Derived view of today's progress plus the current streak.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub focus_min: u32,
    pub completed_sessions: u32,
    pub streak_days: u32,
}

/// Persisted per-day focus history.
pub struct ProgressStore {
    db: Database,
    clock: Box<dyn Clock>,
    daily_stats: DailyStats,
}

impl ProgressStore {
    /// Open against the default database with the system clock.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub fn open() -> Result<Self, StorageError> {
        Self::new(Database::open()?, Box::new(SystemClock))
    }

    /// Assemble from explicit parts; recomputes `DailyStats` from the
    /// stored history.
    ///
    /// # Errors
    /// Returns an error if the history cannot be read.
    pub fn new(db: Database, clock: Box<dyn Clock>) -> Result<Self, StorageError> {
        let mut store = Self {
            db,
            clock,
            daily_stats: DailyStats::default(),
        };
        store.daily_stats = store.compute_stats()?;
        Ok(store)
    }

    pub fn daily_stats(&self) -> &DailyStats {
        &self.daily_stats
    }

    /// Full history, newest first.
    pub fn records(&self) -> Result<Vec<ProgressRecord>, StorageError> {
        self.db.daily_records()
    }

    /// Record one completed work session of `duration_min` minutes
    /// against today's record, then recompute and return the stats.
    ///
    /// # Errors
    /// Returns an error if the write or the recompute fails.
    pub fn record_session_completion(
        &mut self,
        duration_min: u32,
    ) -> Result<DailyStats, StorageError> {
        let today = self.clock.today();
        self.db.add_daily_progress(today, duration_min)?;
        self.daily_stats = self.compute_stats()?;
        Ok(self.daily_stats.clone())
    }

    fn compute_stats(&self) -> Result<DailyStats, StorageError> {
        let today = self.clock.today();
        let records = self.db.daily_records()?;
        let (focus_min, completed_sessions) = records
            .iter()
            .find(|r| r.day == today)
            .map(|r| (r.focus_min, r.completed_sessions))
            .unwrap_or((0, 0));
        Ok(DailyStats {
            focus_min,
            completed_sessions,
            streak_days: streak_days(&records, today),
        })
    }
}

/// Walk the newest-first history and count the run of consecutive
/// calendar days (ending today or yesterday) that each have at least one
/// completed session. A gap of more than one day, or a stored day with
/// zero sessions, ends the streak.
pub fn streak_days(records: &[ProgressRecord], today: NaiveDate) -> u32 {
    let mut streak = 0u32;
    let mut current = today;
    for record in records {
        let gap = current.signed_duration_since(record.day).num_days();
        if gap == 0 && record.completed_sessions > 0 {
            if streak == 0 {
                streak = 1;
            }
        } else if gap == 1 && record.completed_sessions > 0 {
            streak += 1;
            current = record.day;
        } else {
            break;
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClock(NaiveDate);

    impl Clock for FixedClock {
        fn today(&self) -> NaiveDate {
            self.0
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(s: &str, sessions: u32) -> ProgressRecord {
        ProgressRecord {
            day: day(s),
            focus_min: sessions * 25,
            completed_sessions: sessions,
        }
    }

    fn store_at(today: &str) -> ProgressStore {
        ProgressStore::new(
            Database::open_memory().unwrap(),
            Box::new(FixedClock(day(today))),
        )
        .unwrap()
    }

    #[test]
    fn empty_history_has_zero_stats() {
        let store = store_at("2026-08-07");
        assert_eq!(*store.daily_stats(), DailyStats::default());
    }

    #[test]
    fn recording_updates_todays_stats() {
        let mut store = store_at("2026-08-07");
        let stats = store.record_session_completion(25).unwrap();
        assert_eq!(stats.focus_min, 25);
        assert_eq!(stats.completed_sessions, 1);
        assert_eq!(stats.streak_days, 1);

        let stats = store.record_session_completion(50).unwrap();
        assert_eq!(stats.focus_min, 75);
        assert_eq!(stats.completed_sessions, 2);
        assert_eq!(stats.streak_days, 1);
    }

    #[test]
    fn streak_is_zero_without_records() {
        assert_eq!(streak_days(&[], day("2026-08-07")), 0);
    }

    #[test]
    fn streak_is_one_with_only_today() {
        let records = [record("2026-08-07", 2)];
        assert_eq!(streak_days(&records, day("2026-08-07")), 1);
    }

    #[test]
    fn streak_counts_consecutive_days() {
        let records = [
            record("2026-08-07", 1),
            record("2026-08-06", 3),
            record("2026-08-05", 2),
        ];
        assert_eq!(streak_days(&records, day("2026-08-07")), 3);
    }

    #[test]
    fn streak_survives_a_missing_today() {
        // Today has no record yet, but yesterday does: streak holds.
        let records = [record("2026-08-06", 1), record("2026-08-05", 1)];
        assert_eq!(streak_days(&records, day("2026-08-07")), 2);
    }

    #[test]
    fn streak_breaks_on_gap() {
        let records = [record("2026-08-07", 1), record("2026-08-04", 5)];
        assert_eq!(streak_days(&records, day("2026-08-07")), 1);
    }

    #[test]
    fn streak_is_zero_when_first_record_is_older_than_yesterday() {
        let records = [record("2026-08-04", 5)];
        assert_eq!(streak_days(&records, day("2026-08-07")), 0);
    }

    #[test]
    fn zero_session_day_ends_the_walk() {
        let records = [
            record("2026-08-07", 0),
            record("2026-08-06", 4),
        ];
        assert_eq!(streak_days(&records, day("2026-08-07")), 0);
    }

    #[test]
    fn stats_recompute_spans_multiple_days() {
        let db = Database::open_memory().unwrap();
        db.add_daily_progress(day("2026-08-06"), 25).unwrap();
        db.add_daily_progress(day("2026-08-07"), 50).unwrap();
        let store = ProgressStore::new(db, Box::new(FixedClock(day("2026-08-07")))).unwrap();
        let stats = store.daily_stats();
        assert_eq!(stats.focus_min, 50);
        assert_eq!(stats.completed_sessions, 1);
        assert_eq!(stats.streak_days, 2);
    }
}

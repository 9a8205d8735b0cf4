//! Time-of-day schedule with per-time fire markers.
//!
//! # Design
//! - Each configured time is combined with today's date on every check.
//! - An instant fires when it lies strictly within [`FIRE_TOLERANCE`] of `now`.
//! - Markers are kept per configured time, so two times inside one window both fire and
//!   each fires at most once per day. Markers live only as long as the schedule.

use std::collections::HashMap;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

/// Maximum distance between `now` and a configured instant for it to fire.
pub const FIRE_TOLERANCE: TimeDelta = TimeDelta::seconds(5);

/// Configured times plus the instants already honored.
#[derive(Debug, Clone)]
pub struct PollSchedule {
    times: Vec<NaiveTime>,
    honored: HashMap<NaiveTime, NaiveDateTime>,
    last_fired: Option<NaiveDateTime>,
}

impl PollSchedule {
    /// Schedule for the given times of day.
    #[must_use]
    pub fn new(times: Vec<NaiveTime>) -> Self {
        Self {
            times,
            honored: HashMap::new(),
            last_fired: None,
        }
    }

    /// Configured times, in configuration order.
    #[must_use]
    pub fn times(&self) -> &[NaiveTime] {
        &self.times
    }

    /// Most recent instant that fired, if any.
    #[must_use]
    pub const fn last_fired(&self) -> Option<NaiveDateTime> {
        self.last_fired
    }

    /// Check the schedule at `now`, returning the instants that came due.
    ///
    /// Returned instants are recorded immediately and will not be returned again.
    pub fn poll(&mut self, now: NaiveDateTime) -> Vec<NaiveDateTime> {
        let today = now.date();
        let mut due = Vec::new();
        for &time in &self.times {
            let instant = today.and_time(time);
            if (now - instant).abs() >= FIRE_TOLERANCE {
                continue;
            }
            if self.honored.get(&time) == Some(&instant) {
                continue;
            }
            self.honored.insert(time, instant);
            self.last_fired = Some(instant);
            due.push(instant);
        }
        due
    }
}

//! Polling trigger: checks the schedule once per second.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDateTime, NaiveTime};
use tokio::time::{Interval, MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::error::TriggerResult;
use crate::event::TriggerEvent;
use crate::schedule::PollSchedule;
use crate::source::TriggerSource;

/// Cadence of schedule checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Trigger source that fires at configured times of day.
///
/// Ticks that fall behind (for example while a long pass runs) are delayed rather than
/// replayed in a burst.
pub struct PollingClock<C = SystemClock> {
    schedule: PollSchedule,
    clock: C,
    ticker: Option<Interval>,
    due: VecDeque<NaiveDateTime>,
    stopped: bool,
}

impl PollingClock<SystemClock> {
    /// Polling source driven by the system clock.
    #[must_use]
    pub fn new(times: Vec<NaiveTime>) -> Self {
        Self::with_clock(times, SystemClock)
    }
}

impl<C: Clock> PollingClock<C> {
    /// Polling source driven by an injected clock.
    #[must_use]
    pub fn with_clock(times: Vec<NaiveTime>, clock: C) -> Self {
        debug!(times = times.len(), "polling schedule armed");
        Self {
            schedule: PollSchedule::new(times),
            clock,
            ticker: None,
            due: VecDeque::new(),
            stopped: false,
        }
    }

    /// Most recent instant this source fired for.
    #[must_use]
    pub const fn last_fired(&self) -> Option<NaiveDateTime> {
        self.schedule.last_fired()
    }
}

#[async_trait]
impl<C: Clock> TriggerSource for PollingClock<C> {
    fn name(&self) -> &'static str {
        "schedule"
    }

    async fn next_trigger(&mut self) -> Option<TriggerEvent> {
        loop {
            if self.stopped {
                return None;
            }
            if let Some(fired_at) = self.due.pop_front() {
                info!(%fired_at, "scheduled time reached");
                return Some(TriggerEvent::Scheduled { fired_at });
            }
            let ticker = self.ticker.get_or_insert_with(|| {
                let mut ticker = interval(POLL_INTERVAL);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                ticker
            });
            ticker.tick().await;
            let now = self.clock.now();
            self.due.extend(self.schedule.poll(now));
        }
    }

    fn shutdown(&mut self) -> TriggerResult<()> {
        self.stopped = true;
        self.due.clear();
        debug!("polling schedule stopped");
        Ok(())
    }
}

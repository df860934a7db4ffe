//! Cancellable repeating timers.
//!
//! The scheduler owns one global day-clock task and one progress task per
//! flying mission. Each task is a tokio interval loop that sends an
//! epoch-stamped [`SessionEvent`] into the runner's channel. Stopping a
//! timer aborts its task; dropping the scheduler aborts all of them.
//!
//! The first tick of every timer fires one full period after it starts.

use std::collections::BTreeMap;
use std::time::Duration;

use spacefund_types::MissionId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::event::{EventKind, SessionEvent};

/// Shortest period a timer may tick at.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Owner of the day clock and per-mission progress timers.
#[derive(Debug)]
pub struct Scheduler {
    tx: mpsc::Sender<SessionEvent>,
    day_period: Duration,
    progress_period: Duration,
    clock: Option<JoinHandle<()>>,
    progress: BTreeMap<MissionId, JoinHandle<()>>,
}

impl Scheduler {
    /// Create a scheduler that sends ticks into `tx`. Periods shorter than
    /// [`MIN_PERIOD`] are raised to it.
    pub fn new(
        tx: mpsc::Sender<SessionEvent>,
        day_period: Duration,
        progress_period: Duration,
    ) -> Self {
        Self {
            tx,
            day_period: day_period.max(MIN_PERIOD),
            progress_period: progress_period.max(MIN_PERIOD),
            clock: None,
            progress: BTreeMap::new(),
        }
    }

    /// Start the day clock, replacing any clock already running.
    pub fn start_clock(&mut self, epoch: u64) {
        self.stop_clock();
        self.clock = Some(spawn_ticker(
            self.tx.clone(),
            self.day_period,
            epoch,
            EventKind::DayTick,
        ));
        debug!(epoch, "Day clock started");
    }

    /// Stop the day clock if it is running.
    pub fn stop_clock(&mut self) {
        if let Some(handle) = self.clock.take() {
            handle.abort();
            debug!("Day clock stopped");
        }
    }

    /// Start the progress timer for a mission, replacing any existing one.
    pub fn start_progress(&mut self, epoch: u64, mission_id: MissionId) {
        let handle = spawn_ticker(
            self.tx.clone(),
            self.progress_period,
            epoch,
            EventKind::ProgressTick(mission_id),
        );
        if let Some(old) = self.progress.insert(mission_id, handle) {
            old.abort();
        }
        debug!(epoch, mission_id = %mission_id, "Progress timer started");
    }

    /// Stop a mission's progress timer if it is running.
    pub fn stop_progress(&mut self, mission_id: MissionId) {
        if let Some(handle) = self.progress.remove(&mission_id) {
            handle.abort();
            debug!(mission_id = %mission_id, "Progress timer stopped");
        }
    }

    /// Stop every timer.
    pub fn stop_all(&mut self) {
        self.stop_clock();
        let count = self.progress.len();
        for (_, handle) in std::mem::take(&mut self.progress) {
            handle.abort();
        }
        if count > 0 {
            debug!(count, "Progress timers stopped");
        }
    }

    /// Whether the day clock task is held.
    pub const fn clock_running(&self) -> bool {
        self.clock.is_some()
    }

    /// Missions with a progress timer.
    pub fn progress_timers(&self) -> Vec<MissionId> {
        self.progress.keys().copied().collect()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop_all();
    }
}

fn spawn_ticker(
    tx: mpsc::Sender<SessionEvent>,
    period: Duration,
    epoch: u64,
    kind: EventKind,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
        let mut interval = tokio::time::interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let event = SessionEvent {
                epoch,
                kind: kind.clone(),
            };
            if tx.send(event).await.is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scheduler() -> (Scheduler, mpsc::Receiver<SessionEvent>) {
        let (tx, rx) = mpsc::channel(16);
        (
            Scheduler::new(tx, Duration::from_millis(3000), Duration::from_millis(100)),
            rx,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn clock_ticks_after_one_period() {
        let (mut scheduler, mut rx) = scheduler();
        scheduler.start_clock(4);

        let before = Instant::now();
        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            SessionEvent {
                epoch: 4,
                kind: EventKind::DayTick
            }
        );
        assert_eq!(before.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_clock_sends_nothing() {
        let (mut scheduler, mut rx) = scheduler();
        scheduler.start_clock(0);
        scheduler.stop_clock();
        assert!(!scheduler.clock_running());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn progress_timers_are_keyed_by_mission() {
        let (mut scheduler, mut rx) = scheduler();
        scheduler.start_progress(1, MissionId(1));
        scheduler.start_progress(1, MissionId(2));
        scheduler.start_progress(1, MissionId(2));
        assert_eq!(scheduler.progress_timers(), vec![MissionId(1), MissionId(2)]);

        scheduler.stop_progress(MissionId(1));
        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, EventKind::ProgressTick(MissionId(2)));

        scheduler.stop_all();
        assert!(scheduler.progress_timers().is_empty());
        tokio::time::sleep(Duration::from_secs(1)).await;
        while let Ok(event) = rx.try_recv() {
            // Only ticks already queued before the stop may remain.
            assert_eq!(event.kind, EventKind::ProgressTick(MissionId(2)));
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_period_is_raised_to_minimum() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut scheduler = Scheduler::new(tx, Duration::ZERO, Duration::ZERO);
        scheduler.start_progress(0, MissionId(3));

        let before = Instant::now();
        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, EventKind::ProgressTick(MissionId(3)));
        assert_eq!(before.elapsed(), MIN_PERIOD);
    }
}

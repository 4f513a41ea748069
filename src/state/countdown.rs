//! One-second recurring task driving the round timer.

use std::{
    future::Future,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};

use crate::state::round::RoundId;

/// Period between two countdown ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Owner of the (at most one) running countdown task.
///
/// Starting a countdown aborts the previous one. Every tick carries the [`RoundId`] it was
/// started for, so a tick that raced an abort can still be recognized as stale by the game.
#[derive(Default)]
pub struct Countdown {
    running: Mutex<Option<(RoundId, JoinHandle<()>)>>,
}

impl Countdown {
    /// Idle countdown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `on_tick` every [`TICK_PERIOD`] for `round_id` until it returns `false`.
    ///
    /// The first tick fires one full period after the call.
    pub fn start<F, Fut>(&self, round_id: RoundId, mut on_tick: F)
    where
        F: FnMut(RoundId) -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = interval(TICK_PERIOD);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of an interval completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if !on_tick(round_id).await {
                    break;
                }
            }
        });

        let previous = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace((round_id, handle));
        if let Some((_, previous)) = previous {
            previous.abort();
        }
    }

    /// Abort the running countdown, if any.
    pub fn stop(&self) {
        let running = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some((_, handle)) = running {
            handle.abort();
        }
    }

    /// Round of the countdown currently running.
    pub fn running_round(&self) -> Option<RoundId> {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(round_id, _)| *round_id)
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use uuid::Uuid;

    use super::*;

    fn counting(counter: &Arc<AtomicU32>, limit: u32) -> impl FnMut(RoundId) -> std::future::Ready<bool> + Send + 'static {
        let counter = counter.clone();
        move |_| {
            let seen = counter.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(seen < limit)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second_until_told_to_stop() {
        let countdown = Countdown::new();
        let counter = Arc::new(AtomicU32::new(0));
        countdown.start(Uuid::new_v4(), counting(&counter, 3));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(countdown.running_round(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_the_running_task() {
        let countdown = Countdown::new();
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));
        let round = Uuid::new_v4();

        countdown.start(round, counting(&first, u32::MAX));
        tokio::time::sleep(Duration::from_millis(2500)).await;
        countdown.start(round, counting(&second, u32::MAX));
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 2);
        assert_eq!(countdown.running_round(), Some(round));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_aborts() {
        let countdown = Countdown::new();
        let counter = Arc::new(AtomicU32::new(0));
        countdown.start(Uuid::new_v4(), counting(&counter, u32::MAX));
        countdown.stop();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(countdown.running_round(), None);
    }
}

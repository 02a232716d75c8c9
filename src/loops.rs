//! Repeating dispatch loop.
//!
//! The controller owns the timer and the stop flag for one repeating run.
//! The flag is checked after each tick fires and before the round body runs,
//! so a stop requested while a round is executing lets that round finish and
//! report, but no further round starts.

use crate::error::LoopError;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;
use tokio::{task::JoinHandle, time::interval};
use tracing::info;

/// Controls one repeating dispatch loop.
///
/// State machine: idle, running, stopped. `start` rejects while a loop is
/// still running and resets the stop flag otherwise, so a fresh start never
/// depends on how the previous run ended.
#[derive(Debug, Default)]
pub struct LoopController {
    running: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
}

impl LoopController {
    /// Creates an idle controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a loop is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Requests the running loop to stop. The in-flight round, if any, runs
    /// to completion; no new round starts afterwards.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Starts the loop: the first round runs after `delay`, then one round
    /// every `delay` thereafter, until [`LoopController::stop`] is called.
    ///
    /// The returned handle completes once a stop request has been observed
    /// and the final round has settled.
    pub fn start<F, Fut>(&self, delay: Duration, mut round: F) -> Result<JoinHandle<()>, LoopError>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(LoopError::AlreadyRunning);
        }
        self.stop.store(false, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        let stop = Arc::clone(&self.stop);
        Ok(tokio::spawn(async move {
            let mut clock = interval(delay);
            // The first interval tick completes immediately; the first round
            // belongs one full delay out.
            clock.tick().await;
            loop {
                clock.tick().await;
                if stop.load(Ordering::SeqCst) {
                    break;
                }
                round().await;
                clock.reset();
            }
            info!("dispatch loop stopped");
            running.store(false, Ordering::SeqCst);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;
    use tokio::time::sleep;

    fn counting_round(rounds: &Arc<AtomicU64>) -> impl FnMut() -> futures_util::future::Ready<()> + Send + 'static {
        let rounds = Arc::clone(rounds);
        move || {
            rounds.fetch_add(1, Ordering::SeqCst);
            futures_util::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_first_round_prevents_it() {
        let controller = LoopController::new();
        let rounds = Arc::new(AtomicU64::new(0));
        let handle = controller.start(Duration::from_secs(5), counting_round(&rounds)).unwrap();

        controller.stop();
        handle.await.unwrap();

        assert_eq!(rounds.load(Ordering::SeqCst), 0);
        assert!(!controller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn rounds_repeat_until_stopped() {
        let controller = LoopController::new();
        let rounds = Arc::new(AtomicU64::new(0));
        let handle = controller.start(Duration::from_secs(5), counting_round(&rounds)).unwrap();

        sleep(Duration::from_secs(12)).await;
        let seen = rounds.load(Ordering::SeqCst);
        assert!(seen >= 2, "expected at least two rounds, saw {seen}");

        controller.stop();
        handle.await.unwrap();
        let settled = rounds.load(Ordering::SeqCst);

        sleep(Duration::from_secs(60)).await;
        assert_eq!(rounds.load(Ordering::SeqCst), settled);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_during_a_round_lets_it_finish() {
        let controller = LoopController::new();
        let started = Arc::new(AtomicU64::new(0));
        let finished = Arc::new(AtomicU64::new(0));

        let handle = {
            let started = Arc::clone(&started);
            let finished = Arc::clone(&finished);
            controller
                .start(Duration::from_secs(5), move || {
                    let started = Arc::clone(&started);
                    let finished = Arc::clone(&finished);
                    async move {
                        started.fetch_add(1, Ordering::SeqCst);
                        sleep(Duration::from_secs(3)).await;
                        finished.fetch_add(1, Ordering::SeqCst);
                    }
                })
                .unwrap()
        };

        // Land inside the first round (5s..8s) and request a stop.
        sleep(Duration::from_secs(6)).await;
        assert_eq!(started.load(Ordering::SeqCst), 1);
        controller.stop();

        handle.await.unwrap();
        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_rejected_while_running() {
        let controller = LoopController::new();
        let rounds = Arc::new(AtomicU64::new(0));
        let handle = controller.start(Duration::from_secs(5), counting_round(&rounds)).unwrap();

        assert!(matches!(
            controller.start(Duration::from_secs(5), counting_round(&rounds)),
            Err(LoopError::AlreadyRunning)
        ));

        controller.stop();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_stop_is_benign() {
        let controller = LoopController::new();
        let rounds = Arc::new(AtomicU64::new(0));

        let handle = controller.start(Duration::from_secs(5), counting_round(&rounds)).unwrap();
        controller.stop();
        handle.await.unwrap();

        let handle = controller.start(Duration::from_secs(5), counting_round(&rounds)).unwrap();
        sleep(Duration::from_secs(6)).await;
        assert!(rounds.load(Ordering::SeqCst) >= 1);

        controller.stop();
        handle.await.unwrap();
    }
}

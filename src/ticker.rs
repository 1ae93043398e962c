//! Periodic recompute driver.
//!
//! The callback runs on a tokio task once per period until the ticker is
//! stopped or dropped. The stop signal is polled first at every iteration
//! boundary, so a callback that has started always finishes.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);
/// Shortest accepted period; tokio intervals reject a zero period.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

pub struct Ticker {
    stop: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Starts ticking. The first callback fires one `period` after start.
    ///
    /// A period shorter than [`MIN_PERIOD`] is raised to it.
    /// Must be called from within a tokio runtime.
    pub fn start<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let period = if period < MIN_PERIOD {
            log::warn!("ticker period {period:?} is too short; using {MIN_PERIOD:?}");
            MIN_PERIOD
        } else {
            period
        };
        let (stop, mut stopped) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            // A late tick is not made up for
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    // Also fires when the sender is dropped.
                    _ = stopped.changed() => break,
                    _ = interval.tick() => {
                        log::trace!("tick");
                        on_tick();
                    }
                }
            }
            log::debug!("ticker stopped");
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Stops ticking and waits for the task to finish.
    pub async fn stop(mut self) {
        let _ = self.stop.send(true);
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                log::warn!("ticker task ended abnormally: {err}");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        let _ = self.stop.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        (count, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_second() {
        let (count, on_tick) = counting();
        let ticker = Ticker::start(DEFAULT_PERIOD, on_tick);

        time::sleep(Duration::from_millis(3500)).await;
        assert!(count.load(Ordering::SeqCst) >= 3);

        ticker.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn no_ticks_after_stop() {
        let (count, on_tick) = counting();
        let ticker = Ticker::start(DEFAULT_PERIOD, on_tick);

        time::sleep(Duration::from_millis(1500)).await;
        assert!(ticker.is_running());
        ticker.stop().await;
        let seen = count.load(Ordering::SeqCst);

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_period_is_raised_to_the_minimum() {
        let (count, on_tick) = counting();
        let ticker = Ticker::start(Duration::ZERO, on_tick);

        time::sleep(Duration::from_millis(10)).await;
        assert!(ticker.is_running());
        assert!(count.load(Ordering::SeqCst) >= 5);

        ticker.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_stops_the_task() {
        let (count, on_tick) = counting();
        let ticker = Ticker::start(DEFAULT_PERIOD, on_tick);

        time::sleep(Duration::from_millis(1500)).await;
        drop(ticker);
        time::sleep(Duration::from_millis(10)).await;
        let seen = count.load(Ordering::SeqCst);

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
    }
}

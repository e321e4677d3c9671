//! Cancellable timers that post events into the UI loop.
//!
//! A timer never touches session state itself. It sends an event over the
//! loop's channel and the loop applies it, so timer work and key handling
//! never interleave. Dropping a [`Timer`] cancels it.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Interval between countdown ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

pub struct Timer {
    handle: JoinHandle<()>,
}

impl Timer {
    /// Send `make_event()` every `period`, starting one period from now.
    ///
    /// Stops on its own once the receiver is gone.
    pub fn repeating<E, F>(period: Duration, events: mpsc::UnboundedSender<E>, make_event: F) -> Self
    where
        E: Send + 'static,
        F: Fn() -> E + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if events.send(make_event()).is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }

    /// Send `event` once after `delay`.
    pub fn once<E>(delay: Duration, events: mpsc::UnboundedSender<E>, event: E) -> Self
    where
        E: Send + 'static,
    {
        let handle = tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = events.send(event);
        });
        Self { handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain<E>(rx: &mut mpsc::UnboundedReceiver<E>) -> Vec<E> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeating_ticks_once_per_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _timer = Timer::repeating(TICK_INTERVAL, tx, || "tick");

        time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(drain(&mut rx), vec!["tick"; 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_timer_stops_ticking() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = Timer::repeating(TICK_INTERVAL, tx, || 1u32);

        time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(drain(&mut rx).len(), 1);

        drop(timer);
        time::sleep(Duration::from_secs(5)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_once_fires_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = Timer::once(Duration::from_millis(500), tx, "reveal");

        time::sleep(Duration::from_millis(400)).await;
        assert!(drain(&mut rx).is_empty());

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(drain(&mut rx), vec!["reveal"]);
        assert!(!timer.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_once_never_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = Timer::once(Duration::from_millis(500), tx, "reveal");
        timer.cancel();

        time::sleep(Duration::from_secs(1)).await;
        assert!(drain(&mut rx).is_empty());
    }
}

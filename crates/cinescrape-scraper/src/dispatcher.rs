//! Serial, rate-limited execution of render requests.

use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Default minimum spacing between the starts of two units of work.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);

/// Runs submitted work one unit at a time, starting at most one unit per interval.
///
/// Waiters are served in submission order: the underlying mutex is fair, and
/// it is held for the whole unit so nothing else is in flight meanwhile.
#[derive(Debug)]
pub struct Dispatcher {
    interval: Duration,
    last_start: Mutex<Option<Instant>>,
}

impl Dispatcher {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_start: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for this unit's turn, then run it to completion.
    pub async fn submit<F, T>(&self, work: F) -> T
    where
        F: Future<Output = T>,
    {
        let mut last_start = self.last_start.lock().await;

        if let Some(previous) = *last_start {
            let ready_at = previous + self.interval;
            if ready_at > Instant::now() {
                tracing::debug!(
                    "Rate limiting: waiting {:?} before next request",
                    ready_at - Instant::now()
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last_start = Some(Instant::now());
        work.await
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

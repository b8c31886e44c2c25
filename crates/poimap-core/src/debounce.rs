//! Trailing-edge debouncing on top of tokio timers.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::trace;

/// Collapses bursts of calls into one deferred invocation of `action`.
///
/// Every `call` cancels the pending invocation (if any) and schedules a new
/// one `delay` after this call, so only the last value of a burst reaches
/// `action`. Requires a running tokio runtime.
pub struct Debouncer<T> {
    delay: Duration,
    action: Arc<dyn Fn(T) + Send + Sync>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, action: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            delay,
            action: Arc::new(action),
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn call(&mut self, value: T) {
        if self.cancel() {
            trace!("Debounce timer reset");
        }

        let deadline = Instant::now() + self.delay;
        let action = Arc::clone(&self.action);
        self.pending = Some(tokio::spawn(async move {
            sleep_until(deadline).await;
            // No await after the timer: once fired, the action cannot be cancelled
            action(value);
        }));
    }

    /// Cancel the pending invocation. Returns true if one was cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    /// Wait for the pending invocation, if any, to fire.
    pub async fn wait(&mut self) {
        if let Some(handle) = self.pending.take() {
            if let Err(e) = handle.await {
                trace!(error = %e, "Debounced task ended without firing");
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn recording_debouncer(delay_ms: u64) -> (Debouncer<u32>, Arc<Mutex<Vec<u32>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let debouncer = Debouncer::new(Duration::from_millis(delay_ms), move |value| {
            sink.lock().unwrap().push(value);
        });
        (debouncer, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_last_value() {
        let (mut debouncer, calls) = recording_debouncer(500);

        debouncer.call(1);
        tokio::time::advance(Duration::from_millis(40)).await;
        debouncer.call(2);
        tokio::time::advance(Duration::from_millis(40)).await;
        debouncer.call(3);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(*calls.lock().unwrap(), vec![3]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay_only() {
        let (mut debouncer, calls) = recording_debouncer(500);

        debouncer.call(1);
        assert!(debouncer.is_pending());
        tokio::time::sleep(Duration::from_millis(499)).await;
        assert!(calls.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(*calls.lock().unwrap(), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_resets_on_each_call() {
        let (mut debouncer, calls) = recording_debouncer(500);

        // Calls 400ms apart keep pushing the deadline out
        for value in 0..4 {
            debouncer.call(value);
            tokio::time::sleep(Duration::from_millis(400)).await;
        }
        assert!(calls.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(*calls.lock().unwrap(), vec![3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_fire_separately() {
        let (mut debouncer, calls) = recording_debouncer(500);

        debouncer.call(1);
        tokio::time::sleep(Duration::from_millis(600)).await;
        debouncer.call(2);
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(*calls.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_after_action_ran() {
        let (mut debouncer, calls) = recording_debouncer(500);

        // Nothing pending
        debouncer.wait().await;

        debouncer.call(1);
        debouncer.call(2);
        debouncer.wait().await;
        assert_eq!(*calls.lock().unwrap(), vec![2]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_call() {
        let (mut debouncer, calls) = recording_debouncer(500);

        debouncer.call(1);
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(calls.lock().unwrap().is_empty());
    }
}

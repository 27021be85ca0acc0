use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Default)]
struct Slot {
    generation: u64,
    pending: Option<JoinHandle<()>>,
    closed: bool,
}

/// One-shot timer with at most one pending run.
///
/// Scheduling aborts whatever was pending. A run claims its slot before it
/// starts, so a task that reschedules the timer never aborts itself.
#[derive(Default)]
pub struct RefreshTimer {
    slot: Mutex<Slot>,
}

impl RefreshTimer {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Run `task` once after `delay`, replacing any pending run.
    ///
    /// Returns `false` (and does nothing) once the timer is closed.
    pub fn schedule<F, Fut>(self: &Arc<Self>, delay: Duration, task: F) -> bool
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.lock();
        if slot.closed {
            return false;
        }

        if let Some(previous) = slot.pending.take() {
            previous.abort();
            tracing::debug!(generation = slot.generation, "Superseded pending refresh");
        }

        slot.generation += 1;
        let generation = slot.generation;
        let timer = Arc::clone(self);
        slot.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if timer.claim(generation) {
                task().await;
            }
        }));

        true
    }

    /// Cancel and refuse any further scheduling.
    pub fn close(&self) {
        let mut slot = self.lock();
        slot.closed = true;
        if let Some(pending) = slot.pending.take() {
            pending.abort();
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.lock().pending.is_some()
    }

    /// Number of runs scheduled so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    fn claim(&self, generation: u64) -> bool {
        let mut slot = self.lock();
        if slot.generation != generation || slot.pending.is_none() {
            return false;
        }
        // dropping a JoinHandle detaches, it does not abort
        slot.pending = None;
        true
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    type Task = Box<dyn FnOnce() -> std::future::Ready<()> + Send>;

    fn counter_task(counter: &Arc<AtomicU32>) -> Task {
        let counter = Arc::clone(counter);
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        })
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_delay() {
        let timer = RefreshTimer::new();
        let fired = Arc::new(AtomicU32::new(0));

        assert!(timer.schedule(Duration::from_secs(60), counter_task(&fired)));
        assert!(timer.is_pending());

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!timer.is_pending());

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_supersedes_pending_run() {
        let timer = RefreshTimer::new();
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));

        timer.schedule(Duration::from_secs(10), counter_task(&first));
        tokio::time::sleep(Duration::from_secs(5)).await;
        timer.schedule(Duration::from_secs(10), counter_task(&second));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(timer.generation(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_timer_refuses_work() {
        let timer = RefreshTimer::new();
        let fired = Arc::new(AtomicU32::new(0));

        timer.schedule(Duration::from_secs(1), counter_task(&fired));
        timer.close();
        assert!(!timer.is_pending());
        assert!(!timer.schedule(Duration::from_secs(1), counter_task(&fired)));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(timer.generation(), 1);
    }
}

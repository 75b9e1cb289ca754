//! Blocking model work that can outlive its caller

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinError;
use tracing::warn;

#[derive(Default)]
struct Progress {
    finished: bool,
    abandoned: bool,
}

/// Run `work` on the blocking pool.
///
/// A blocking task cannot be aborted: when the awaiting future is dropped
/// (the manager aborts a startup that ran past its timeout) the work still
/// runs to the end. In that case `undo` runs exactly once after it finishes,
/// so a component already marked failed does not end up holding models.
pub(crate) async fn run_blocking_or_undo<T, W, U>(work: W, undo: U) -> Result<T, JoinError>
where
    T: Send + 'static,
    W: FnOnce() -> T + Send + 'static,
    U: Fn() + Send + Sync + 'static,
{
    let progress = Arc::new(Mutex::new(Progress::default()));
    let undo = Arc::new(undo);
    let guard = AbandonGuard {
        progress: progress.clone(),
        undo: undo.clone(),
        armed: true,
    };

    let result = tokio::task::spawn_blocking(move || {
        let output = work();
        let abandoned = {
            let mut progress = progress.lock();
            progress.finished = true;
            progress.abandoned
        };
        if abandoned {
            warn!("abandoned model load finished, releasing it");
            undo();
        }
        output
    })
    .await;

    guard.disarm();
    result
}

struct AbandonGuard<U: Fn()> {
    progress: Arc<Mutex<Progress>>,
    undo: Arc<U>,
    armed: bool,
}

impl<U: Fn()> AbandonGuard<U> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<U: Fn()> Drop for AbandonGuard<U> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let finished = {
            let mut progress = self.progress.lock();
            progress.abandoned = true;
            progress.finished
        };
        // Finished but the result was never picked up
        if finished {
            (self.undo)();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let undo_count = count.clone();
        (count, move || {
            undo_count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test]
    async fn test_completed_work_is_kept() {
        let (undone, undo) = counter();
        let value = run_blocking_or_undo(|| 7, undo).await.unwrap();
        assert_eq!(value, 7);
        assert_eq!(undone.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_abandoned_work_is_undone_once() {
        let (undone, undo) = counter();
        let work = || std::thread::sleep(Duration::from_millis(150));

        let timed_out =
            tokio::time::timeout(Duration::from_millis(20), run_blocking_or_undo(work, undo)).await;
        assert!(timed_out.is_err());
        assert_eq!(undone.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(undone.load(Ordering::SeqCst), 1);
    }
}

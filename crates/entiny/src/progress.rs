// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Progress notifications for plan evaluation.
//!
//! Observers are advisory: they are told how many selection requests have
//! completed, and nothing they do affects the result.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Receives progress updates while a plan is collected.
///
/// Callbacks may arrive from several threads when requests run in parallel.
pub trait ProgressObserver: Send + Sync {
    /// Evaluation is about to run `total` selection requests
    fn on_start(&self, _total: usize) {}

    /// A request finished; `done` of `total` are now complete
    fn on_request_complete(&self, done: usize, total: usize);

    /// All requests finished
    fn on_finish(&self) {}
}

/// Observer that ignores every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_request_complete(&self, _done: usize, _total: usize) {}
}

/// Counts completed requests on behalf of an observer.
///
/// The observer is told the run finished when the tracker is dropped, on the
/// error path as well as on success.
pub(crate) struct ProgressTracker {
    observer: Arc<dyn ProgressObserver>,
    done: AtomicUsize,
    total: usize,
}

impl ProgressTracker {
    pub(crate) fn start(observer: Arc<dyn ProgressObserver>, total: usize) -> Self {
        observer.on_start(total);
        Self {
            observer,
            done: AtomicUsize::new(0),
            total,
        }
    }

    pub(crate) fn complete_one(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        self.observer.on_request_complete(done, self.total);
    }

}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.observer.on_finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl ProgressObserver for Recorder {
        fn on_start(&self, total: usize) {
            self.events.lock().unwrap().push(format!("start {total}"));
        }

        fn on_request_complete(&self, done: usize, total: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{done}/{total}"));
        }

        fn on_finish(&self) {
            self.events.lock().unwrap().push("finish".to_string());
        }
    }

    #[test]
    fn test_tracker_reports_counts() {
        let recorder = Arc::new(Recorder::default());
        let tracker = ProgressTracker::start(recorder.clone(), 2);
        tracker.complete_one();
        tracker.complete_one();
        drop(tracker);

        let events = recorder.events.lock().unwrap();
        assert_eq!(*events, vec!["start 2", "1/2", "2/2", "finish"]);
    }

    #[test]
    fn test_tracker_finishes_on_early_return() {
        fn failing_request() -> Result<(), String> {
            Err("request failed".to_string())
        }

        let recorder = Arc::new(Recorder::default());
        let outcome = (|| -> Result<(), String> {
            let tracker = ProgressTracker::start(recorder.clone(), 3);
            tracker.complete_one();
            failing_request()?;
            tracker.complete_one();
            Ok(())
        })();
        assert!(outcome.is_err());

        let events = recorder.events.lock().unwrap();
        assert_eq!(*events, vec!["start 3", "1/3", "finish"]);
    }
}

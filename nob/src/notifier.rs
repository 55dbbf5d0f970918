//! Notifier - delivers a changed subject's update to its subscribers
//!
//! The Coordinator does not know who subscribes to what. It hands each changed
//! subject to a [`Notifier`] exactly once per change episode and clears the
//! change flag when `update` returns.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::subject::SubjectRef;

/// External dispatch facility invoked synchronously by the Coordinator
///
/// `update` runs while the Coordinator's lock is held. Calling back into the
/// Coordinator from the same thread is fine; blocking on another thread that
/// itself calls into the Coordinator will deadlock.
pub trait Notifier: Send + Sync {
    fn update(&self, subject: &SubjectRef);
}

impl<F> Notifier for F
where
    F: Fn(&SubjectRef) + Send + Sync,
{
    fn update(&self, subject: &SubjectRef) {
        self(subject)
    }
}

/// Default notifier: emits one tracing event per update
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn update(&self, subject: &SubjectRef) {
        info!(%subject, "Subject changed");
    }
}

/// Notifier that remembers every update it was asked to deliver
///
/// Clones share the same log, so keep one clone and install the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    updates: Arc<Mutex<Vec<SubjectRef>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All updates in delivery order
    pub fn updates(&self) -> Vec<SubjectRef> {
        self.updates.lock().clone()
    }

    /// Number of updates delivered for one subject
    pub fn count_for(&self, subject: &SubjectRef) -> usize {
        self.updates.lock().iter().filter(|s| *s == subject).count()
    }

    /// Update counts grouped by subject
    pub fn counts(&self) -> HashMap<SubjectRef, usize> {
        let mut counts = HashMap::new();
        for subject in self.updates.lock().iter() {
            *counts.entry(*subject).or_insert(0) += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.updates.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.lock().is_empty()
    }

    /// Drain the log, returning what was recorded
    pub fn take(&self) -> Vec<SubjectRef> {
        std::mem::take(&mut *self.updates.lock())
    }
}

impl Notifier for RecordingNotifier {
    fn update(&self, subject: &SubjectRef) {
        debug!(%subject, "RecordingNotifier::update: called");
        self.updates.lock().push(*subject);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_recording_notifier_shares_log_across_clones() {
        let recorder = RecordingNotifier::new();
        let installed = recorder.clone();
        let a = SubjectRef::new();
        let b = SubjectRef::new();

        installed.update(&a);
        installed.update(&b);
        installed.update(&a);

        assert_eq!(recorder.updates(), vec![a, b, a]);
        assert_eq!(recorder.count_for(&a), 2);
        assert_eq!(recorder.counts().get(&b), Some(&1));
        assert_eq!(recorder.len(), 3);
    }

    #[test]
    fn test_take_drains() {
        let recorder = RecordingNotifier::new();
        recorder.update(&SubjectRef::new());

        assert_eq!(recorder.take().len(), 1);
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_closure_is_a_notifier() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let notifier = move |_: &SubjectRef| {
            counter.fetch_add(1, Ordering::SeqCst);
        };

        notifier.update(&SubjectRef::new());
        Notifier::update(&notifier, &SubjectRef::new());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}

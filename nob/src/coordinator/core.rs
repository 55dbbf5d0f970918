//! Coordinator state machine and the process-wide instance

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use parking_lot::ReentrantMutex;
use tracing::{debug, info, warn};

use super::config::CoordinatorConfig;
use super::metrics::CoordinatorMetrics;
use crate::config::Config;
use crate::error::CoordinatorError;
use crate::notifier::{LogNotifier, Notifier};
use crate::subject::{Subject, SubjectRef};

static INSTANCE: OnceLock<Coordinator> = OnceLock::new();

/// Subject sets and counters, only ever touched under the Coordinator's lock
struct State {
    registered: HashSet<SubjectRef>,
    changed: HashSet<SubjectRef>,
    metrics: CoordinatorMetrics,
}

impl State {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            registered: HashSet::with_capacity(capacity),
            changed: HashSet::with_capacity(capacity),
            metrics: CoordinatorMetrics::default(),
        }
    }

    fn mark_changed(&mut self, subject: SubjectRef) -> Result<(), CoordinatorError> {
        if !self.registered.contains(&subject) {
            return Err(CoordinatorError::NotRegistered { subject });
        }
        self.changed.insert(subject);
        Ok(())
    }

    fn clear_changed(&mut self, subject: SubjectRef) -> Result<(), CoordinatorError> {
        if !self.changed.remove(&subject) {
            return Err(CoordinatorError::NotChanged { subject });
        }
        Ok(())
    }

    fn invariant_holds(&self) -> bool {
        self.changed.is_subset(&self.registered)
    }
}

/// Process-wide registry of subjects and their pending changes
///
/// Every public call runs under one re-entrant lock, so callers on different
/// threads are serialized while a [`Notifier`] may still call back in from
/// the thread it was invoked on.
///
/// Only the public tier is reachable from outside this module. The internal
/// notify protocol, the subject sets and the constructor are not:
///
/// ```compile_fail
/// use node_observer::{Coordinator, SubjectRef};
/// Coordinator::instance().mark_changed(SubjectRef::new()).unwrap();
/// ```
///
/// ```compile_fail
/// use node_observer::{Coordinator, SubjectRef};
/// Coordinator::instance().clear_changed(SubjectRef::new()).unwrap();
/// ```
///
/// ```compile_fail
/// use node_observer::{Coordinator, SubjectRef};
/// Coordinator::instance().dispatch(SubjectRef::new()).unwrap();
/// ```
///
/// ```compile_fail
/// use node_observer::{Coordinator, SubjectRef};
/// let guard = Coordinator::instance().state.lock();
/// guard.borrow_mut().changed.insert(SubjectRef::new());
/// ```
///
/// ```compile_fail
/// use node_observer::{Coordinator, CoordinatorConfig, LogNotifier};
/// let second = Coordinator::new(CoordinatorConfig::default(), Box::new(LogNotifier));
/// ```
///
/// A second instance can only be requested at runtime through
/// [`Coordinator::install`], which refuses once the instance exists.
pub struct Coordinator {
    config: CoordinatorConfig,
    notifier: Box<dyn Notifier>,
    state: ReentrantMutex<RefCell<State>>,
}

impl Coordinator {
    fn new(config: CoordinatorConfig, notifier: Box<dyn Notifier>) -> Self {
        debug!(?config, "Coordinator::new: called");
        let state = State::with_capacity(config.initial_capacity);
        Self {
            config,
            notifier,
            state: ReentrantMutex::new(RefCell::new(state)),
        }
    }

    /// Get the process-wide Coordinator, constructing it on first access
    ///
    /// A lazily constructed instance uses the default configuration and
    /// [`LogNotifier`]. Use [`Coordinator::install`] first to choose your own.
    #[doc(alias = "get_instance")]
    pub fn instance() -> &'static Coordinator {
        INSTANCE.get_or_init(|| {
            info!("Coordinator::instance: constructing default coordinator");
            Coordinator::new(CoordinatorConfig::default(), Box::new(LogNotifier))
        })
    }

    /// Construct the process-wide Coordinator with a configuration and notifier
    ///
    /// Meant for the top-level context that owns the Coordinator; it hands the
    /// returned reference to its collaborators. Fails with `AccessViolation`
    /// once an instance exists, however it was created.
    pub fn install<N>(config: CoordinatorConfig, notifier: N) -> Result<&'static Coordinator, CoordinatorError>
    where
        N: Notifier + 'static,
    {
        debug!(?config, "Coordinator::install: called");
        let mut constructed = false;
        let instance = INSTANCE.get_or_init(|| {
            constructed = true;
            Coordinator::new(config, Box::new(notifier))
        });

        if constructed {
            info!("Coordinator installed");
            Ok(instance)
        } else {
            warn!("Coordinator::install: instance already exists");
            Err(CoordinatorError::AccessViolation {
                operation: "install".to_string(),
            })
        }
    }

    /// Install using the coordinator section of a loaded [`Config`]
    pub fn install_from<N>(config: &Config, notifier: N) -> Result<&'static Coordinator, CoordinatorError>
    where
        N: Notifier + 'static,
    {
        debug!(log_level = ?config.log_level, "Coordinator::install_from: called");
        Self::install(config.coordinator.clone(), notifier)
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Whether the candidate is a registered subject
    pub fn is_registered(&self, candidate: &impl Subject) -> bool {
        let candidate = candidate.subject_ref();
        self.with_state(|state| state.registered.contains(&candidate))
    }

    /// Whether the candidate has a notification in flight
    pub fn is_changed(&self, candidate: &impl Subject) -> bool {
        let candidate = candidate.subject_ref();
        self.with_state(|state| state.changed.contains(&candidate))
    }

    /// Start tracking a subject
    ///
    /// Registering an already registered subject leaves the sets as they are;
    /// the repeated call is still logged and counted.
    pub fn register(&self, subject: &impl Subject) -> Result<(), CoordinatorError> {
        let subject = subject.subject_ref();
        debug!(%subject, "Coordinator::register: called");

        if !subject.is_valid() {
            return self.finish("register", Err(CoordinatorError::InvalidArgument { subject }));
        }

        let inserted = self.with_state(|state| {
            let inserted = state.registered.insert(subject);
            if inserted {
                state.metrics.registrations += 1;
            } else {
                state.metrics.duplicate_registrations += 1;
            }
            inserted
        });

        if !inserted {
            if self.config.warn_on_duplicate_register {
                warn!(%subject, "Subject registered twice");
            } else {
                debug!(%subject, "Coordinator::register: already registered");
            }
        }
        self.finish("register", Ok(()))
    }

    /// Stop tracking a subject, dropping any pending change flag with it
    pub fn unregister(&self, subject: &impl Subject) -> Result<(), CoordinatorError> {
        let subject = subject.subject_ref();
        debug!(%subject, "Coordinator::unregister: called");

        let result = self.with_state(|state| {
            if !state.registered.remove(&subject) {
                return Err(CoordinatorError::NotRegistered { subject });
            }
            if state.changed.remove(&subject) {
                debug!(%subject, "Coordinator::unregister: cleared pending change");
            }
            state.metrics.unregistrations += 1;
            Ok(())
        });
        self.finish("unregister", result)
    }

    /// Report that a subject changed and notify its subscribers
    ///
    /// Marks the subject changed, hands it to the notifier and clears the flag,
    /// all before returning. Nothing is mutated if the subject is unregistered.
    ///
    /// A report for a subject whose dispatch is already in flight (a notifier
    /// reporting its own subject again) is folded into that episode: it
    /// returns `Ok` without a second delivery.
    pub fn report_change(&self, subject: &impl Subject) -> Result<(), CoordinatorError> {
        let subject = subject.subject_ref();
        debug!(%subject, "Coordinator::report_change: called");

        // Held for the whole mark -> dispatch -> clear episode
        let _guard = self.state.lock();

        let in_flight = self.with_state(|state| {
            let in_flight = state.changed.contains(&subject);
            if in_flight {
                state.metrics.coalesced_changes += 1;
            }
            in_flight
        });
        if in_flight {
            debug!(%subject, "Coordinator::report_change: dispatch already in flight");
            return self.finish("report_change", Ok(()));
        }

        let result = self.mark_changed(subject).and_then(|()| {
            self.with_state(|state| state.metrics.changes_reported += 1);
            self.dispatch(subject)
        });
        self.finish("report_change", result)
    }

    /// Snapshot of the registered subjects, sorted
    pub fn registered_subjects(&self) -> Vec<SubjectRef> {
        let mut subjects: Vec<SubjectRef> = self.with_state(|state| state.registered.iter().copied().collect());
        subjects.sort();
        subjects
    }

    /// Get current coordinator metrics
    pub fn metrics(&self) -> CoordinatorMetrics {
        self.with_state(|state| CoordinatorMetrics {
            registered_subjects: state.registered.len(),
            changed_subjects: state.changed.len(),
            ..state.metrics.clone()
        })
    }

    fn mark_changed(&self, subject: SubjectRef) -> Result<(), CoordinatorError> {
        debug!(%subject, "Coordinator::mark_changed: called");
        self.with_state(|state| state.mark_changed(subject))
    }

    fn clear_changed(&self, subject: SubjectRef) -> Result<(), CoordinatorError> {
        debug!(%subject, "Coordinator::clear_changed: called");
        self.with_state(|state| state.clear_changed(subject))
    }

    /// Deliver one subject's update, then clear its change flag
    fn dispatch(&self, subject: SubjectRef) -> Result<(), CoordinatorError> {
        let _guard = self.state.lock();
        debug!(%subject, "Coordinator::dispatch: notifying");

        // No RefCell borrow may be live here: the notifier can re-enter
        let pending = PendingChange { coordinator: self, subject };
        self.notifier.update(&subject);
        pending.disarm();

        self.with_state(|state| state.metrics.dispatches += 1);
        self.clear_changed(subject)
    }

    /// Run a closure against the state under the lock
    ///
    /// The borrow ends with the closure, so never call out to the notifier
    /// from inside one.
    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        f(&mut state)
    }

    fn invariant_holds(&self) -> bool {
        self.with_state(|state| state.invariant_holds())
    }

    /// Common exit path for public operations
    fn finish(&self, operation: &str, result: Result<(), CoordinatorError>) -> Result<(), CoordinatorError> {
        debug_assert!(self.invariant_holds(), "changed set escaped registered set after {operation}");
        if let Err(e) = &result {
            warn!(%operation, error = %e, "Coordinator call rejected");
            self.with_state(|state| state.metrics.rejected_calls += 1);
        }
        result
    }
}

/// Drops the change flag if the notifier unwinds out of `dispatch`
struct PendingChange<'a> {
    coordinator: &'a Coordinator,
    subject: SubjectRef,
}

impl PendingChange<'_> {
    fn disarm(self) {
        std::mem::forget(self);
    }
}

impl Drop for PendingChange<'_> {
    fn drop(&mut self) {
        let subject = self.subject;
        warn!(%subject, "Notifier panicked, clearing change flag");
        self.coordinator.with_state(|state| {
            state.changed.remove(&subject);
        });
    }
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("config", &self.config)
            .field("metrics", &self.metrics())
            .finish_non_exhaustive()
    }
}

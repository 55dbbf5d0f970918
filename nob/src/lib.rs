//! Node Observer - process-wide subject registry with change notification
//!
//! Producers of state changes (subjects) report changes to a single
//! [`Coordinator`]; the Coordinator hands each changed subject to a
//! [`Notifier`] exactly once per change episode. Producers never track their
//! own subscribers.
//!
//! # Core Concepts
//!
//! - **Registered set**: subjects the Coordinator tracks
//! - **Changed set**: registered subjects with a notification in flight,
//!   always a subset of the registered set
//! - **Synchronous dispatch**: `report_change` marks, notifies and clears
//!   before it returns
//! - **One instance per process**: created lazily or installed once by the
//!   owning context
//!
//! # Example
//!
//! ```
//! use node_observer::{Coordinator, CoordinatorConfig, RecordingNotifier, SubjectRef};
//!
//! # fn main() -> Result<(), node_observer::CoordinatorError> {
//! let recorder = RecordingNotifier::new();
//! let coordinator = Coordinator::install(CoordinatorConfig::default(), recorder.clone())?;
//!
//! let node = SubjectRef::new();
//! coordinator.register(&node)?;
//! coordinator.report_change(&node)?;
//!
//! assert_eq!(recorder.updates(), vec![node]);
//! assert!(!coordinator.is_changed(&node));
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`coordinator`] - the Coordinator, its configuration and metrics
//! - [`subject`] - subject identities
//! - [`notifier`] - the notification boundary
//! - [`config`] - configuration file loading
//! - [`logging`] - tracing subscriber setup

pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod notifier;
pub mod subject;

pub use config::Config;
pub use coordinator::{Coordinator, CoordinatorConfig, CoordinatorMetrics};
pub use error::CoordinatorError;
pub use notifier::{LogNotifier, Notifier, RecordingNotifier};
pub use subject::{Subject, SubjectRef};

//! Coordinator for subject change notification
//!
//! The Coordinator owns two sets and one protocol:
//! - **Registered:** subjects it tracks
//! - **Changed:** registered subjects with a notification in flight
//! - **Notify:** mark changed, hand to the notifier, clear

mod config;
mod core;
mod metrics;

pub use config::CoordinatorConfig;
pub use self::core::Coordinator;
pub use metrics::CoordinatorMetrics;

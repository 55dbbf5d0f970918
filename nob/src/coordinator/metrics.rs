//! Coordinator counters

use serde::{Deserialize, Serialize};

/// Coordinator metrics for observability
///
/// `registered_subjects` and `changed_subjects` are current set sizes; the
/// rest are monotonic counters since construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorMetrics {
    pub registered_subjects: usize,
    pub changed_subjects: usize,
    pub registrations: u64,
    pub duplicate_registrations: u64,
    pub unregistrations: u64,
    pub changes_reported: u64,
    pub coalesced_changes: u64,
    pub dispatches: u64,
    pub rejected_calls: u64,
}

//! Outcome counters for the relay functions

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::functions::{AlertOutcome, LivenessOutcome, ReadingOutcome, ResolveOutcome};

/// Running totals, updated by the dispatcher and the liveness worker
#[derive(Debug, Default)]
pub struct RelayStats {
    changes_seen: AtomicU64,
    changes_dropped: AtomicU64,
    alerts_sent: AtomicU64,
    alerts_skipped: AtomicU64,
    alert_failures: AtomicU64,
    readings_published: AtomicU64,
    reading_failures: AtomicU64,
    liveness_checks: AtomicU64,
    liveness_raised: AtomicU64,
    liveness_failures: AtomicU64,
    delays_resolved: AtomicU64,
    resolve_failures: AtomicU64,
}

/// Point-in-time copy of [`RelayStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub changes_seen: u64,
    pub changes_dropped: u64,
    pub alerts_sent: u64,
    pub alerts_skipped: u64,
    pub alert_failures: u64,
    pub readings_published: u64,
    pub reading_failures: u64,
    pub liveness_checks: u64,
    pub liveness_raised: u64,
    pub liveness_failures: u64,
    pub delays_resolved: u64,
    pub resolve_failures: u64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl RelayStats {
    pub fn record_change(&self) {
        bump(&self.changes_seen);
    }

    /// Changes lost because the dispatcher fell behind the change feed
    pub fn record_dropped(&self, count: u64) {
        self.changes_dropped.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_alert(&self, outcome: &AlertOutcome) {
        match outcome {
            AlertOutcome::Sent { .. } => bump(&self.alerts_sent),
            AlertOutcome::Deleted | AlertOutcome::Inactive => bump(&self.alerts_skipped),
            AlertOutcome::Invalid | AlertOutcome::SendFailed => bump(&self.alert_failures),
        }
    }

    pub fn record_reading(&self, outcome: &ReadingOutcome) {
        match outcome {
            ReadingOutcome::Published { .. } => bump(&self.readings_published),
            ReadingOutcome::Deleted => {}
            ReadingOutcome::PublishFailed => bump(&self.reading_failures),
        }
    }

    pub fn record_liveness(&self, outcome: &LivenessOutcome) {
        bump(&self.liveness_checks);
        match outcome {
            LivenessOutcome::Raised => bump(&self.liveness_raised),
            LivenessOutcome::Fresh => {}
            LivenessOutcome::ReadingMissing
            | LivenessOutcome::ReadFailed
            | LivenessOutcome::RaiseFailed => bump(&self.liveness_failures),
        }
    }

    pub fn record_resolve(&self, outcome: &ResolveOutcome) {
        match outcome {
            ResolveOutcome::NothingToResolve => {}
            ResolveOutcome::Resolved {
                archived_id: Some(_),
                cleared: true,
            } => bump(&self.delays_resolved),
            ResolveOutcome::Resolved { .. } | ResolveOutcome::LookupFailed => {
                bump(&self.resolve_failures)
            }
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        StatsSnapshot {
            changes_seen: load(&self.changes_seen),
            changes_dropped: load(&self.changes_dropped),
            alerts_sent: load(&self.alerts_sent),
            alerts_skipped: load(&self.alerts_skipped),
            alert_failures: load(&self.alert_failures),
            readings_published: load(&self.readings_published),
            reading_failures: load(&self.reading_failures),
            liveness_checks: load(&self.liveness_checks),
            liveness_raised: load(&self.liveness_raised),
            liveness_failures: load(&self.liveness_failures),
            delays_resolved: load(&self.delays_resolved),
            resolve_failures: load(&self.resolve_failures),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_resolution_counts_as_failure() {
        let stats = RelayStats::default();
        stats.record_resolve(&ResolveOutcome::Resolved {
            archived_id: Some("x".to_string()),
            cleared: false,
        });
        stats.record_resolve(&ResolveOutcome::Resolved {
            archived_id: Some("y".to_string()),
            cleared: true,
        });
        stats.record_resolve(&ResolveOutcome::NothingToResolve);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.delays_resolved, 1);
        assert_eq!(snapshot.resolve_failures, 1);
    }

    #[test]
    fn test_liveness_counts_every_check() {
        let stats = RelayStats::default();
        stats.record_liveness(&LivenessOutcome::Fresh);
        stats.record_liveness(&LivenessOutcome::Raised);
        stats.record_liveness(&LivenessOutcome::ReadingMissing);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.liveness_checks, 3);
        assert_eq!(snapshot.liveness_raised, 1);
        assert_eq!(snapshot.liveness_failures, 1);
    }
}

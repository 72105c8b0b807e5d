//! Anomaly notices pushed outward when a store deviates from expected
//! stewardship behavior.
//!
//! Reporting is fire-and-forget: the retrieval core never waits on a
//! reporter or branches control flow on its outcome.

use crate::ids::Principal;

/// A stewardship anomaly observed while serving a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnomalyNotice {
    /// An instance was permanently removed because its owning store does
    /// not support soft delete.
    PurgedWithoutSoftDelete {
        /// Principal whose delete request triggered the purge.
        principal: Principal,
        /// Type name of the removed instance.
        type_name: String,
        /// Identifier of the removed instance.
        instance_id: String,
    },

    /// A provenance/grouping tag could not be applied to a newly created
    /// instance.
    ProvenanceTagNotApplied {
        /// Principal that created the instance.
        principal: Principal,
        /// Type name of the created instance.
        type_name: String,
        /// Identifier of the created instance.
        instance_id: String,
        /// The tag that could not be applied.
        tag: String,
    },
}

/// Sink for anomaly notices.
pub trait AnomalyReporter: Send + Sync {
    /// Records a notice. Must not block or fail.
    fn report(&self, notice: AnomalyNotice);
}

/// Reporter that emits each notice as a structured warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnomalyReporter;

impl AnomalyReporter for TracingAnomalyReporter {
    fn report(&self, notice: AnomalyNotice) {
        match notice {
            AnomalyNotice::PurgedWithoutSoftDelete {
                principal,
                type_name,
                instance_id,
            } => {
                tracing::warn!(
                    principal = %principal,
                    type_name = %type_name,
                    instance_id = %instance_id,
                    "store performed a permanent purge; soft delete unsupported"
                );
            }
            AnomalyNotice::ProvenanceTagNotApplied {
                principal,
                type_name,
                instance_id,
                tag,
            } => {
                tracing::warn!(
                    principal = %principal,
                    type_name = %type_name,
                    instance_id = %instance_id,
                    tag = %tag,
                    "provenance tag could not be applied to new instance"
                );
            }
        }
    }
}

/// Reporter that discards every notice. Useful in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAnomalyReporter;

impl AnomalyReporter for NullAnomalyReporter {
    fn report(&self, _notice: AnomalyNotice) {}
}

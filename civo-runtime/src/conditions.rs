//! The `Ready` and `Synced` conditions of managed resources
//!
//! `Ready` reports the state of the external resource, `Synced` the outcome
//! of the last reconciliation. A condition's transition time only moves when
//! its status, reason or message actually changes.
use k8s_openapi::{apimachinery::pkg::apis::meta::v1::Time, chrono::Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The kind of a condition; a resource carries at most one of each
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum ConditionType {
    /// Whether the external resource is ready for use
    Ready,
    /// Whether the last reconciliation succeeded
    Synced,
}

/// Kubernetes style tri-state status
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum ConditionStatus {
    #[allow(missing_docs)]
    True,
    #[allow(missing_docs)]
    False,
    #[allow(missing_docs)]
    Unknown,
}

/// Machine readable reason of a condition
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum ConditionReason {
    /// The external resource is being provisioned
    Creating,
    /// The external resource is ready
    Available,
    /// The external resource is being deleted
    Deleting,
    /// The external resource failed
    Unavailable,
    /// Reconciliation succeeded
    ReconcileSuccess,
    /// Reconciliation failed
    ReconcileError,
}

/// A condition of a managed resource
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of the condition
    #[serde(rename = "type")]
    pub type_: ConditionType,
    /// Status of the condition
    pub status: ConditionStatus,
    /// Last time the condition changed
    pub last_transition_time: Time,
    /// Reason for the current status
    pub reason: ConditionReason,
    /// Details of the current status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Condition {
    fn new(type_: ConditionType, status: ConditionStatus, reason: ConditionReason) -> Self {
        Self {
            type_,
            status,
            last_transition_time: Time(Utc::now()),
            reason,
            message: None,
        }
    }

    /// The external resource is being created
    pub fn creating() -> Self {
        Self::new(ConditionType::Ready, ConditionStatus::False, ConditionReason::Creating)
    }

    /// The external resource is available for use
    pub fn available() -> Self {
        Self::new(ConditionType::Ready, ConditionStatus::True, ConditionReason::Available)
    }

    /// The external resource is being deleted
    pub fn deleting() -> Self {
        Self::new(ConditionType::Ready, ConditionStatus::False, ConditionReason::Deleting)
    }

    /// The external resource is not usable
    pub fn unavailable() -> Self {
        Self::new(ConditionType::Ready, ConditionStatus::False, ConditionReason::Unavailable)
    }

    /// The last reconciliation succeeded
    pub fn reconcile_success() -> Self {
        Self::new(ConditionType::Synced, ConditionStatus::True, ConditionReason::ReconcileSuccess)
    }

    /// The last reconciliation failed with `err`
    pub fn reconcile_error(err: &dyn std::error::Error) -> Self {
        Self::new(ConditionType::Synced, ConditionStatus::False, ConditionReason::ReconcileError)
            .with_message(err.to_string())
    }

    /// Attach a message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Whether two conditions say the same thing, ignoring transition time
    pub fn equivalent(&self, other: &Condition) -> bool {
        self.type_ == other.type_
            && self.status == other.status
            && self.reason == other.reason
            && self.message == other.message
    }
}

/// Set `condition` in `conditions`, replacing one of the same type
///
/// An equivalent existing condition is kept as is. Returns whether anything changed.
pub fn set_condition(conditions: &mut Vec<Condition>, condition: Condition) -> bool {
    match conditions.iter_mut().find(|c| c.type_ == condition.type_) {
        Some(existing) if existing.equivalent(&condition) => false,
        Some(existing) => {
            *existing = condition;
            true
        }
        None => {
            conditions.push(condition);
            true
        }
    }
}

/// Find the condition of a type
pub fn get_condition(conditions: &[Condition], type_: ConditionType) -> Option<&Condition> {
    conditions.iter().find(|c| c.type_ == type_)
}

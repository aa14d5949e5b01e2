//! Lifecycle status of a contract and its transition table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ContractError, ContractResult};

/// Lifecycle states a contract moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusType {
    Pending,
    Generated,
    Analyzed,
    Deployed,
    Failed,
}

impl StatusType {
    pub const ALL: [StatusType; 5] = [
        StatusType::Pending,
        StatusType::Generated,
        StatusType::Analyzed,
        StatusType::Deployed,
        StatusType::Failed,
    ];

    /// States reachable from this one in a single step.
    pub fn allowed_next(self) -> &'static [StatusType] {
        match self {
            StatusType::Pending => &[StatusType::Generated, StatusType::Failed],
            StatusType::Generated => &[StatusType::Analyzed, StatusType::Failed],
            StatusType::Analyzed => &[StatusType::Deployed, StatusType::Failed],
            StatusType::Deployed | StatusType::Failed => &[],
        }
    }

    pub fn can_transition_to(self, next: StatusType) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusType::Pending => "pending",
            StatusType::Generated => "generated",
            StatusType::Analyzed => "analyzed",
            StatusType::Deployed => "deployed",
            StatusType::Failed => "failed",
        }
    }
}

impl std::fmt::Display for StatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current status plus the time of the last transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractStatus {
    value: StatusType,
    changed_at: DateTime<Utc>,
}

impl ContractStatus {
    pub fn pending() -> Self {
        Self {
            value: StatusType::Pending,
            changed_at: Utc::now(),
        }
    }

    pub fn value(&self) -> StatusType {
        self.value
    }

    pub fn changed_at(&self) -> DateTime<Utc> {
        self.changed_at
    }

    /// Produce the next status, stamped now. The current value is left as is.
    pub fn transition_to(&self, next: StatusType) -> ContractResult<ContractStatus> {
        if !self.value.can_transition_to(next) {
            return Err(ContractError::InvalidTransition {
                from: self.value,
                to: next,
            });
        }
        Ok(ContractStatus {
            value: next,
            changed_at: Utc::now(),
        })
    }
}

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of an entity or relationship instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    /// Instance is being authored and is not yet visible to consumers.
    Draft,
    /// Instance has been proposed for activation.
    Proposed,
    /// Instance is live.
    Active,
    /// Instance is live but flagged for replacement.
    Deprecated,
    /// Instance has been soft-deleted; recoverable, normally hidden.
    Deleted,
}

impl InstanceStatus {
    /// Returns the canonical lowercase string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Proposed => "proposed",
            Self::Active => "active",
            Self::Deprecated => "deprecated",
            Self::Deleted => "deleted",
        }
    }
}

impl Default for InstanceStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl FromStr for InstanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "proposed" => Ok(Self::Proposed),
            "active" => Ok(Self::Active),
            "deprecated" => Ok(Self::Deprecated),
            "deleted" => Ok(Self::Deleted),
            _ => Err(format!("invalid instance status: {s}")),
        }
    }
}

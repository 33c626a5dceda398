use serde::{Deserialize, Serialize};

use crate::core::models::null_as_default;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeatBreakdown {
    #[serde(deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub active_this_cycle: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub inactive_this_cycle: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub added_this_cycle: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub pending_invitation: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub pending_cancellation: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    Business,
    Enterprise,
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Business => write!(f, "Business"),
            Self::Enterprise => write!(f, "Enterprise"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Organization policy state for a Copilot feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureState {
    Enabled,
    Disabled,
    #[default]
    Unconfigured,
    #[serde(other)]
    Unknown,
}

impl FeatureState {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled)
    }
}

impl std::fmt::Display for FeatureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enabled => write!(f, "enabled"),
            Self::Disabled => write!(f, "disabled"),
            Self::Unconfigured => write!(f, "unconfigured"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingSnapshot {
    #[serde(default)]
    pub seat_breakdown: SeatBreakdown,
    #[serde(default)]
    pub plan_type: PlanType,
    #[serde(default)]
    pub ide_chat: FeatureState,
    #[serde(default)]
    pub platform_chat: FeatureState,
    #[serde(default)]
    pub cli: FeatureState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_management_setting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_code_suggestions: Option<String>,
}

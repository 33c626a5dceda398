use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::models::billing::BillingSnapshot;
use crate::core::models::null_as_default;

/// Organization-wide counters over the fetched period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalMetrics {
    #[serde(deserialize_with = "null_as_default")]
    pub total_suggestions: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_acceptances: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_lines_suggested: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_lines_accepted: u64,
    /// Accepted / suggested, as a percentage (0.0 - 100.0)
    #[serde(deserialize_with = "null_as_default")]
    pub average_acceptance_rate: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub average_suggestions_per_user: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub average_suggestions_per_day: f64,
    /// Peak number of active users on any single day
    #[serde(deserialize_with = "null_as_default")]
    pub total_users: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_engaged_users: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub active_days: u64,
    /// Peak daily active users relative to seats, as a percentage
    #[serde(deserialize_with = "null_as_default")]
    pub seats_usage_rate: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_chat_turns: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_chat_insertions: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_chat_copies: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub day: NaiveDate,
    #[serde(default, deserialize_with = "null_as_default")]
    pub accepted_suggestions: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rejected_suggestions: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_suggestions: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active_users: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub engaged_users: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lines_suggested: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lines_accepted: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chat_turns: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub acceptance_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageStats {
    #[serde(deserialize_with = "null_as_default")]
    pub suggestions: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub acceptances: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub lines_suggested: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub lines_accepted: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub active_users: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub acceptance_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    #[serde(default)]
    pub global_metrics: GlobalMetrics,
    /// Per-day series, chronological. Keyed `users` on the wire.
    #[serde(default)]
    pub users: Vec<DailyStats>,
    #[serde(default)]
    pub language_stats: BTreeMap<String, LanguageStats>,
}

impl UsageSnapshot {
    /// Languages ordered by suggestion volume, busiest first.
    pub fn ranked_languages(&self) -> Vec<(&str, &LanguageStats)> {
        let mut ranked: Vec<(&str, &LanguageStats)> = self
            .language_stats
            .iter()
            .map(|(name, stats)| (name.as_str(), stats))
            .collect();
        ranked.sort_by(|a, b| b.1.suggestions.cmp(&a.1.suggestions).then(a.0.cmp(b.0)));
        ranked
    }
}

/// Full response of the snapshot loader: usage and billing for one organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing: Option<BillingSnapshot>,
}

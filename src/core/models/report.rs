use serde::{Deserialize, Serialize};

/// Hours saved by accepted suggestions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSaved {
    /// Over the whole fetched period
    pub total: f64,
    pub daily: f64,
    pub monthly: f64,
    pub annually: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSavings {
    pub cost_per_hour: f64,
    pub monthly: f64,
    pub annually: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantCosts {
    pub monthly: f64,
    pub annually: f64,
    /// Seats the cost was computed for
    pub actual_users: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    pub net_savings: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitySavings {
    pub quality_multiplier: f64,
    pub bug_reduction_savings: f64,
    pub quality_improvement_savings: f64,
    pub total_quality_savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductivityGains {
    pub lines_accepted: u64,
    pub acceptance_rate: f64,
    pub efficiency_gain_percent: f64,
    pub active_users: u64,
    pub active_days: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineMetrics {
    pub total_suggestions: u64,
    pub total_lines_suggested: u64,
    pub average_suggestions_per_user: f64,
}

/// Financial and productivity estimates derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiReport {
    pub time_saved: TimeSaved,
    pub cost_savings: CostSavings,
    pub assistant_costs: AssistantCosts,
    pub roi: Roi,
    pub quality: QualitySavings,
    pub productivity: ProductivityGains,
    pub baseline: BaselineMetrics,
}

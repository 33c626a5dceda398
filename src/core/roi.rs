//! Time, cost and ROI estimates derived from a usage/billing snapshot.
//!
//! The estimate is a fixed chain: accepted lines become hours saved, hours
//! become money through the configured daily rate, and money is weighed
//! against the per-seat assistant cost. All divisions are guarded in
//! [`RoiInputs::normalize`] so the chain never produces `NaN` or infinities
//! for finite input.

use crate::core::config::RoiConfig;
use crate::core::models::billing::BillingSnapshot;
use crate::core::models::report::{
    AssistantCosts, BaselineMetrics, CostSavings, ProductivityGains, QualitySavings, Roi,
    RoiReport, TimeSaved,
};
use crate::core::models::usage::{MetricsSnapshot, UsageSnapshot};

/// Hours credited per accepted suggestion line (15 minutes).
pub const TIME_PER_ACCEPTED_LINE_HOURS: f64 = 0.25;
/// Reported efficiency gain; a flat figure, independent of the snapshot.
pub const EFFICIENCY_GAIN_PER_LINE: f64 = 0.30;
/// Business plan list price per seat per month.
pub const ASSISTANT_COST_PER_SEAT_PER_MONTH: f64 = 19.0;
/// Share of monthly savings attributed to fewer bugs.
pub const BUG_REDUCTION_SHARE: f64 = 0.20;
/// Share of monthly savings attributed to general code quality.
pub const QUALITY_IMPROVEMENT_SHARE: f64 = 0.15;
/// Acceptance rate at which the quality multiplier is exactly 1.0.
pub const QUALITY_BASELINE_ACCEPTANCE_RATE: f64 = 50.0;

const MONTHS_PER_YEAR: f64 = 12.0;

/// Snapshot counters and config values after every fallback has been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiInputs {
    pub lines_accepted: u64,
    pub total_suggestions: u64,
    pub acceptance_rate: f64,
    /// Never zero
    pub active_users: u64,
    /// Never zero
    pub active_days: u64,
    /// Seats billed this cycle, or `active_users` when billing reports none
    pub billed_users: u64,
    pub cost_per_hour: f64,
    pub working_days_per_month: f64,
}

impl RoiInputs {
    pub fn normalize(
        usage: &UsageSnapshot,
        billing: Option<&BillingSnapshot>,
        config: &RoiConfig,
    ) -> Self {
        let metrics = &usage.global_metrics;

        let active_users = non_zero_or_one(metrics.total_users);
        let active_days = non_zero_or_one(metrics.active_days);

        let billed_users = billing
            .map(|b| b.seat_breakdown.active_this_cycle)
            .filter(|&seats| seats > 0)
            .unwrap_or(active_users);

        let cost_per_hour = if config.daily_working_hours > 0.0 {
            finite_or_zero(config.average_daily_rate / config.daily_working_hours)
        } else {
            0.0
        };

        Self {
            lines_accepted: metrics.total_lines_accepted,
            total_suggestions: metrics.total_suggestions,
            acceptance_rate: finite_or_zero(metrics.average_acceptance_rate),
            active_users,
            active_days,
            billed_users,
            cost_per_hour,
            working_days_per_month: finite_or_zero(config.working_days_per_month),
        }
    }
}

fn non_zero_or_one(value: u64) -> u64 {
    if value == 0 {
        1
    } else {
        value
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Derive the ROI report. `None` means no usage has been loaded yet.
pub fn compute_roi(
    usage: Option<&UsageSnapshot>,
    billing: Option<&BillingSnapshot>,
    config: &RoiConfig,
) -> Option<RoiReport> {
    let usage = usage?;
    let inputs = RoiInputs::normalize(usage, billing, config);

    let total_time_saved = inputs.lines_accepted as f64 * TIME_PER_ACCEPTED_LINE_HOURS;
    let daily_time_saved = total_time_saved / inputs.active_days as f64;
    let monthly_time_saved = daily_time_saved * inputs.working_days_per_month;
    let annual_time_saved = monthly_time_saved * MONTHS_PER_YEAR;

    let monthly_savings = monthly_time_saved * inputs.cost_per_hour;
    let annual_savings = monthly_savings * MONTHS_PER_YEAR;

    let assistant_cost_monthly = inputs.billed_users as f64 * ASSISTANT_COST_PER_SEAT_PER_MONTH;
    let assistant_cost_annual = assistant_cost_monthly * MONTHS_PER_YEAR;

    let net_savings_annual = annual_savings - assistant_cost_annual;
    let roi_percentage = if assistant_cost_annual > 0.0 {
        (net_savings_annual / assistant_cost_annual) * 100.0
    } else {
        0.0
    };

    let quality_multiplier = inputs.acceptance_rate / QUALITY_BASELINE_ACCEPTANCE_RATE;
    let bug_reduction_savings = monthly_savings * BUG_REDUCTION_SHARE * quality_multiplier;
    let quality_improvement_savings =
        monthly_savings * QUALITY_IMPROVEMENT_SHARE * quality_multiplier;

    Some(RoiReport {
        time_saved: TimeSaved {
            total: total_time_saved,
            daily: daily_time_saved,
            monthly: monthly_time_saved,
            annually: annual_time_saved,
        },
        cost_savings: CostSavings {
            cost_per_hour: inputs.cost_per_hour,
            monthly: monthly_savings,
            annually: annual_savings,
        },
        assistant_costs: AssistantCosts {
            monthly: assistant_cost_monthly,
            annually: assistant_cost_annual,
            actual_users: inputs.billed_users,
        },
        roi: Roi {
            net_savings: net_savings_annual,
            percentage: roi_percentage,
        },
        quality: QualitySavings {
            quality_multiplier,
            bug_reduction_savings,
            quality_improvement_savings,
            total_quality_savings: bug_reduction_savings + quality_improvement_savings,
        },
        productivity: ProductivityGains {
            lines_accepted: inputs.lines_accepted,
            acceptance_rate: inputs.acceptance_rate,
            efficiency_gain_percent: EFFICIENCY_GAIN_PER_LINE * 100.0,
            active_users: inputs.active_users,
            active_days: inputs.active_days,
        },
        baseline: BaselineMetrics {
            total_suggestions: usage.global_metrics.total_suggestions,
            total_lines_suggested: usage.global_metrics.total_lines_suggested,
            average_suggestions_per_user: usage.global_metrics.average_suggestions_per_user,
        },
    })
}

pub fn compute_for_snapshot(snapshot: &MetricsSnapshot, config: &RoiConfig) -> Option<RoiReport> {
    compute_roi(snapshot.usage.as_ref(), snapshot.billing.as_ref(), config)
}

use colored::{control, ColoredString, Colorize};

use crate::core::config::RoiConfig;
use crate::core::formatter::{
    format_count, format_currency, format_days_since, format_hours, format_percent_bar,
    format_signed_percent,
};
use crate::core::metrics::DailyAverages;
use crate::core::models::billing::{BillingSnapshot, FeatureState};
use crate::core::models::report::RoiReport;
use crate::core::models::roster::{ActivityStatus, Roster};
use crate::core::models::usage::UsageSnapshot;

const BAR_WIDTH: usize = 12;
const LABEL_WIDTH: usize = 16;

/// Push an aligned `label  value` line. The label is padded before coloring
/// so ANSI codes do not break the alignment.
fn push_row(lines: &mut Vec<String>, label: &str, value: impl std::fmt::Display) {
    let padded = format!("{:<width$}", label, width = LABEL_WIDTH);
    lines.push(format!("  {}{}", padded.cyan(), value));
}

fn push_header(lines: &mut Vec<String>, title: &str) {
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(" {}", title).bold().to_string());
}

/// Shown instead of every panel until a snapshot with usage has been loaded.
pub fn render_empty(use_color: bool) -> String {
    control::set_override(use_color);
    format!(
        " {}\n  {}",
        "No usage data loaded".bold(),
        "Pass --org <name> or --snapshot <file>, or run `croi config set org <name>`.".dimmed()
    )
}

/// Headline counters and daily averages.
///
/// ```text
///  Copilot usage (acme)
///   Suggestions     12,345
///   Acceptance      32.4% [████░░░░░░░░]
///   Lines           40,000 suggested, 9,800 accepted
/// ```
pub fn render_overview(label: &str, usage: &UsageSnapshot, use_color: bool) -> String {
    control::set_override(use_color);
    let m = &usage.global_metrics;
    let mut lines = Vec::new();

    push_header(&mut lines, &format!("Copilot usage ({})", label));
    push_row(&mut lines, "Suggestions", format_count(m.total_suggestions));
    push_row(&mut lines, "Acceptances", format_count(m.total_acceptances));
    push_row(
        &mut lines,
        "Acceptance",
        format!(
            "{} {}",
            color_by_rate(m.average_acceptance_rate, &format!("{:.1}%", m.average_acceptance_rate)),
            format_percent_bar(m.average_acceptance_rate, BAR_WIDTH).magenta()
        ),
    );
    push_row(
        &mut lines,
        "Lines",
        format!(
            "{} suggested, {} accepted",
            format_count(m.total_lines_suggested),
            format_count(m.total_lines_accepted)
        ),
    );
    push_row(
        &mut lines,
        "Active users",
        format!("{} peak, {} engaged", m.total_users, m.total_engaged_users),
    );
    push_row(&mut lines, "Active days", m.active_days);
    push_row(
        &mut lines,
        "Seat usage",
        format!(
            "{:.1}% {}",
            m.seats_usage_rate,
            format_percent_bar(m.seats_usage_rate, BAR_WIDTH).magenta()
        ),
    );
    if m.total_chat_turns > 0 {
        push_row(
            &mut lines,
            "Chat",
            format!(
                "{} turns, {} insertions, {} copies",
                format_count(m.total_chat_turns),
                format_count(m.total_chat_insertions),
                format_count(m.total_chat_copies)
            ),
        );
    }

    let averages = DailyAverages::from_global(m);
    push_row(
        &mut lines,
        "Per day",
        format!(
            "{:.1} suggestions, {:.1} lines accepted",
            averages.suggestions_per_day, averages.lines_accepted_per_day
        )
        .dimmed(),
    );
    push_row(
        &mut lines,
        "Per user/day",
        format!("{:.1} suggestions", averages.suggestions_per_user_per_day).dimmed(),
    );

    lines.join("\n")
}

/// One row per active day, oldest first.
pub fn render_daily(usage: &UsageSnapshot, use_color: bool) -> String {
    control::set_override(use_color);
    let mut lines = Vec::new();
    push_header(&mut lines, "Daily activity");
    if usage.users.is_empty() {
        lines.push(format!("  {}", "No active days in this period".dimmed()));
        return lines.join("\n");
    }

    lines.push(
        format!(
            "  {:<12}{:>7}{:>12}{:>10}{:>11}{:>8}",
            "Date", "Users", "Suggested", "Accepted", "Lines acc", "Rate"
        )
        .dimmed()
        .to_string(),
    );
    for day in &usage.users {
        let rate = format!("{:>7.1}%", day.acceptance_rate);
        lines.push(format!(
            "  {:<12}{:>7}{:>12}{:>10}{:>11}{}",
            day.day.format("%b %d"),
            day.active_users,
            format_count(day.total_suggestions),
            format_count(day.accepted_suggestions),
            format_count(day.lines_accepted),
            color_by_rate(day.acceptance_rate, &rate)
        ));
    }
    lines.join("\n")
}

/// Languages by suggestion volume, busiest first, capped at `limit` rows.
pub fn render_languages(usage: &UsageSnapshot, limit: usize, use_color: bool) -> String {
    control::set_override(use_color);
    let mut lines = Vec::new();
    push_header(&mut lines, "Languages");

    let ranked = usage.ranked_languages();
    if ranked.is_empty() {
        lines.push(format!("  {}", "No language data".dimmed()));
        return lines.join("\n");
    }
    for (name, stats) in ranked.iter().take(limit) {
        let rate = format!("{:>5.1}%", stats.acceptance_rate);
        lines.push(format!(
            "  {}{:>10} {} {}",
            format!("{:<width$}", name, width = LABEL_WIDTH).cyan(),
            format_count(stats.suggestions),
            color_by_rate(stats.acceptance_rate, &rate),
            format_percent_bar(stats.acceptance_rate, BAR_WIDTH).magenta()
        ));
    }
    if ranked.len() > limit {
        lines.push(format!(
            "  {}",
            format!("... and {} more", ranked.len() - limit).dimmed()
        ));
    }
    lines.join("\n")
}

fn feature(state: FeatureState) -> ColoredString {
    let text = state.to_string();
    match state {
        FeatureState::Enabled => text.green(),
        FeatureState::Disabled => text.red(),
        FeatureState::Unconfigured | FeatureState::Unknown => text.dimmed(),
    }
}

pub fn render_billing(billing: &BillingSnapshot, use_color: bool) -> String {
    control::set_override(use_color);
    let seats = &billing.seat_breakdown;
    let mut lines = Vec::new();

    push_header(&mut lines, &format!("Billing ({})", billing.plan_type));
    push_row(
        &mut lines,
        "Seats",
        format!(
            "{} total, {} active, {} inactive this cycle",
            seats.total, seats.active_this_cycle, seats.inactive_this_cycle
        ),
    );
    push_row(&mut lines, "Added", seats.added_this_cycle);
    if seats.pending_invitation > 0 || seats.pending_cancellation > 0 {
        push_row(
            &mut lines,
            "Pending",
            format!(
                "{} invitations, {} cancellations",
                seats.pending_invitation, seats.pending_cancellation
            )
            .yellow(),
        );
    }
    push_row(&mut lines, "IDE chat", feature(billing.ide_chat));
    push_row(&mut lines, "Platform chat", feature(billing.platform_chat));
    push_row(&mut lines, "CLI", feature(billing.cli));
    if let Some(setting) = &billing.seat_management_setting {
        push_row(&mut lines, "Seat management", setting);
    }
    if let Some(policy) = &billing.public_code_suggestions {
        push_row(&mut lines, "Public code", policy);
    }
    lines.join("\n")
}

fn color_roi(percent: f64) -> ColoredString {
    let text = format_signed_percent(percent);
    if percent > 0.0 {
        text.green().bold()
    } else if percent < 0.0 {
        text.red().bold()
    } else {
        text.normal()
    }
}

/// Compact ROI block for the metrics overview.
pub fn render_roi_summary(report: &RoiReport, currency: &str, use_color: bool) -> String {
    control::set_override(use_color);
    let mut lines = Vec::new();
    push_header(&mut lines, "ROI");
    push_row(
        &mut lines,
        "Time saved",
        format!("{} / month", format_hours(report.time_saved.monthly)),
    );
    push_row(
        &mut lines,
        "Savings",
        format!("{} / month", format_currency(report.cost_savings.monthly, currency)),
    );
    push_row(
        &mut lines,
        "Copilot cost",
        format!(
            "{} / month ({} seats)",
            format_currency(report.assistant_costs.monthly, currency),
            report.assistant_costs.actual_users
        ),
    );
    push_row(&mut lines, "ROI", color_roi(report.roi.percentage));
    lines.join("\n")
}

/// Full ROI breakdown with the assumptions it was computed from.
pub fn render_roi_report(
    report: &RoiReport,
    config: &RoiConfig,
    currency: &str,
    use_color: bool,
) -> String {
    control::set_override(use_color);
    let money = |amount: f64| format_currency(amount, currency);
    let mut lines = Vec::new();

    push_header(&mut lines, "Assumptions");
    push_row(&mut lines, "Daily rate", money(config.average_daily_rate));
    push_row(&mut lines, "Hours per day", config.daily_working_hours);
    push_row(&mut lines, "Days per month", config.working_days_per_month);
    push_row(&mut lines, "Cost per hour", money(report.cost_savings.cost_per_hour));

    push_header(&mut lines, "Time saved");
    push_row(&mut lines, "Period", format_hours(report.time_saved.total));
    push_row(&mut lines, "Daily", format_hours(report.time_saved.daily));
    push_row(&mut lines, "Monthly", format_hours(report.time_saved.monthly));
    push_row(&mut lines, "Annually", format_hours(report.time_saved.annually));

    push_header(&mut lines, "Financial impact");
    push_row(&mut lines, "Savings/month", money(report.cost_savings.monthly));
    push_row(&mut lines, "Savings/year", money(report.cost_savings.annually));
    push_row(
        &mut lines,
        "Copilot/month",
        format!(
            "{} ({} seats)",
            money(report.assistant_costs.monthly),
            report.assistant_costs.actual_users
        ),
    );
    push_row(&mut lines, "Copilot/year", money(report.assistant_costs.annually));
    push_row(&mut lines, "Net savings", money(report.roi.net_savings).bold());
    push_row(&mut lines, "ROI", color_roi(report.roi.percentage));

    push_header(&mut lines, "Quality");
    push_row(
        &mut lines,
        "Multiplier",
        format!("{:.2}x", report.quality.quality_multiplier),
    );
    push_row(&mut lines, "Bug reduction", money(report.quality.bug_reduction_savings));
    push_row(
        &mut lines,
        "Code quality",
        money(report.quality.quality_improvement_savings),
    );
    push_row(&mut lines, "Total/month", money(report.quality.total_quality_savings));

    push_header(&mut lines, "Productivity");
    push_row(
        &mut lines,
        "Lines accepted",
        format_count(report.productivity.lines_accepted),
    );
    push_row(
        &mut lines,
        "Acceptance",
        format!("{:.1}%", report.productivity.acceptance_rate),
    );
    push_row(
        &mut lines,
        "Efficiency gain",
        format!("{:.1}%", report.productivity.efficiency_gain_percent),
    );
    push_row(&mut lines, "Active users", report.productivity.active_users);
    push_row(&mut lines, "Active days", report.productivity.active_days);

    push_header(&mut lines, "Baseline");
    push_row(
        &mut lines,
        "Suggestions",
        format_count(report.baseline.total_suggestions),
    );
    push_row(
        &mut lines,
        "Lines suggested",
        format_count(report.baseline.total_lines_suggested),
    );
    push_row(
        &mut lines,
        "Per user",
        format!("{:.1}", report.baseline.average_suggestions_per_user),
    );

    lines.join("\n")
}

fn color_status(status: ActivityStatus, text: &str) -> ColoredString {
    match status {
        ActivityStatus::VeryActive => text.green(),
        ActivityStatus::Active => text.cyan(),
        ActivityStatus::Inactive => text.yellow(),
        ActivityStatus::VeryInactive => text.red(),
        ActivityStatus::NeverActive => text.dimmed(),
    }
}

/// Seat holders with their last activity, plus a per-status summary.
pub fn render_roster(roster: &Roster, use_color: bool) -> String {
    control::set_override(use_color);
    let mut lines = Vec::new();
    push_header(
        &mut lines,
        &format!(
            "Seats ({} active of {})",
            roster.active_count(),
            roster.total_seats
        ),
    );

    for (status, count) in roster.summary_by_status() {
        let label = status.to_string();
        push_row(&mut lines, &label, color_status(status, &count.to_string()));
    }

    if roster.users.is_empty() {
        return lines.join("\n");
    }

    lines.push(String::new());
    lines.push(
        format!(
            "  {:<22}{:<16}{:<12}{}",
            "Login", "Status", "Last seen", "Editor"
        )
        .dimmed()
        .to_string(),
    );
    for user in &roster.users {
        let status = format!("{:<16}", user.activity_status.to_string());
        let editor = user
            .last_editor
            .as_deref()
            .and_then(|e| e.split('/').next())
            .unwrap_or("-");
        lines.push(format!(
            "  {:<22}{}{:<12}{}",
            user.login,
            color_status(user.activity_status, &status),
            format_days_since(user.days_since_activity),
            editor.dimmed()
        ));
    }
    lines.join("\n")
}

/// Color an acceptance rate green/yellow/red.
fn color_by_rate(rate: f64, text: &str) -> ColoredString {
    if rate >= 30.0 {
        text.green()
    } else if rate >= 15.0 {
        text.yellow()
    } else {
        text.red()
    }
}

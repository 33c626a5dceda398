use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::core::models::usage::{DailyStats, GlobalMetrics, LanguageStats, UsageSnapshot};

// Raw `/orgs/{org}/copilot/metrics` records. Every counter may be absent.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LanguageCompletions {
    pub name: Option<String>,
    pub total_engaged_users: u64,
    pub total_code_suggestions: u64,
    pub total_code_acceptances: u64,
    pub total_code_lines_suggested: u64,
    pub total_code_lines_accepted: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompletionModel {
    pub name: Option<String>,
    pub languages: Vec<LanguageCompletions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompletionEditor {
    pub name: Option<String>,
    pub models: Vec<CompletionModel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdeCodeCompletions {
    pub editors: Vec<CompletionEditor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatModel {
    pub total_chats: u64,
    pub total_chat_insertion_events: u64,
    pub total_chat_copy_events: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatEditor {
    pub models: Vec<ChatModel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdeChat {
    pub editors: Vec<ChatEditor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DayMetrics {
    pub date: Option<NaiveDate>,
    pub total_active_users: u64,
    pub total_engaged_users: u64,
    pub copilot_ide_code_completions: Option<IdeCodeCompletions>,
    pub copilot_ide_chat: Option<IdeChat>,
}

impl DayMetrics {
    fn languages(&self) -> impl Iterator<Item = &LanguageCompletions> {
        self.copilot_ide_code_completions
            .iter()
            .flat_map(|c| c.editors.iter())
            .flat_map(|e| e.models.iter())
            .flat_map(|m| m.languages.iter())
    }

    fn chat_models(&self) -> impl Iterator<Item = &ChatModel> {
        self.copilot_ide_chat
            .iter()
            .flat_map(|c| c.editors.iter())
            .flat_map(|e| e.models.iter())
    }
}

#[derive(Debug, Default)]
struct DayTotals {
    suggestions: u64,
    acceptances: u64,
    lines_suggested: u64,
    lines_accepted: u64,
    chat_turns: u64,
    chat_insertions: u64,
    chat_copies: u64,
}

fn day_totals(record: &DayMetrics) -> DayTotals {
    let mut totals = DayTotals::default();
    for lang in record.languages() {
        totals.suggestions += lang.total_code_suggestions;
        totals.acceptances += lang.total_code_acceptances;
        totals.lines_suggested += lang.total_code_lines_suggested;
        totals.lines_accepted += lang.total_code_lines_accepted;
    }
    for model in record.chat_models() {
        totals.chat_turns += model.total_chats;
        totals.chat_insertions += model.total_chat_insertion_events;
        totals.chat_copies += model.total_chat_copy_events;
    }
    totals
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole * 100`, rounded to two decimals; 0 when `whole` is 0.
fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 / whole as f64 * 100.0)
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        round2(numerator as f64 / denominator as f64)
    }
}

/// Fold raw daily records into the usage snapshot.
///
/// Only days with at least one active user count toward the global totals.
/// The per-day series still lists every dated record, including days with
/// no active users.
/// `seat_total`, when known and non-zero, is the denominator of the seat
/// usage rate; otherwise the peak user count is.
pub fn aggregate(records: &[DayMetrics], seat_total: Option<u64>) -> UsageSnapshot {
    let mut global = GlobalMetrics::default();
    let mut days: Vec<DailyStats> = Vec::with_capacity(records.len());
    let mut languages: BTreeMap<String, LanguageStats> = BTreeMap::new();

    for record in records {
        let Some(day) = record.date else {
            warn!("skipping metrics record without a date");
            continue;
        };
        let totals = day_totals(record);

        if record.total_active_users > 0 {
            global.active_days += 1;
            global.total_users = global.total_users.max(record.total_active_users);
            global.total_engaged_users = global.total_engaged_users.max(record.total_engaged_users);
            global.total_suggestions += totals.suggestions;
            global.total_acceptances += totals.acceptances;
            global.total_lines_suggested += totals.lines_suggested;
            global.total_lines_accepted += totals.lines_accepted;
            global.total_chat_turns += totals.chat_turns;
            global.total_chat_insertions += totals.chat_insertions;
            global.total_chat_copies += totals.chat_copies;
        }

        for lang in record.languages() {
            let name = lang.name.clone().unwrap_or_else(|| "unknown".to_string());
            let stats = languages.entry(name).or_default();
            stats.suggestions += lang.total_code_suggestions;
            stats.acceptances += lang.total_code_acceptances;
            stats.lines_suggested += lang.total_code_lines_suggested;
            stats.lines_accepted += lang.total_code_lines_accepted;
            stats.active_users = stats.active_users.max(lang.total_engaged_users);
        }

        days.push(DailyStats {
            day,
            accepted_suggestions: totals.acceptances,
            rejected_suggestions: totals.suggestions.saturating_sub(totals.acceptances),
            total_suggestions: totals.suggestions,
            active_users: record.total_active_users,
            engaged_users: record.total_engaged_users,
            lines_suggested: totals.lines_suggested,
            lines_accepted: totals.lines_accepted,
            chat_turns: totals.chat_turns,
            acceptance_rate: percentage(totals.acceptances, totals.suggestions),
        });
    }

    days.sort_by_key(|d| d.day);

    if global.active_days > 0 {
        global.average_suggestions_per_day = ratio(global.total_suggestions, global.active_days);
        global.average_acceptance_rate =
            percentage(global.total_acceptances, global.total_suggestions);
        global.average_suggestions_per_user = ratio(global.total_suggestions, global.total_users);

        let peak_active = days.iter().map(|d| d.active_users).max().unwrap_or(0);
        let seats = seat_total.filter(|&s| s > 0).unwrap_or(global.total_users);
        global.seats_usage_rate = percentage(peak_active, seats);
    }

    for stats in languages.values_mut() {
        stats.acceptance_rate = percentage(stats.acceptances, stats.suggestions);
    }

    debug!(
        days = days.len(),
        active_days = global.active_days,
        languages = languages.len(),
        "aggregated copilot metrics"
    );

    UsageSnapshot {
        global_metrics: global,
        users: days,
        language_stats: languages,
    }
}

/// Per-day averages shown alongside the headline counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyAverages {
    pub suggestions_per_day: f64,
    pub lines_suggested_per_day: f64,
    pub lines_accepted_per_day: f64,
    pub suggestions_per_user_per_day: f64,
}

impl DailyAverages {
    pub fn from_global(metrics: &GlobalMetrics) -> Self {
        if metrics.active_days == 0 {
            return Self::default();
        }
        let days = metrics.active_days as f64;
        let per_user = if metrics.total_users > 0 {
            metrics.total_suggestions as f64 / days / metrics.total_users as f64
        } else {
            0.0
        };
        Self {
            suggestions_per_day: metrics.total_suggestions as f64 / days,
            lines_suggested_per_day: metrics.total_lines_suggested as f64 / days,
            lines_accepted_per_day: metrics.total_lines_accepted as f64 / days,
            suggestions_per_user_per_day: per_user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TWO_DAYS: &str = r#"[
        {
            "date": "2025-01-07",
            "total_active_users": 4,
            "total_engaged_users": 3,
            "copilot_ide_code_completions": {
                "total_engaged_users": 3,
                "editors": [
                    {
                        "name": "vscode",
                        "models": [
                            {
                                "name": "default",
                                "languages": [
                                    { "name": "rust", "total_engaged_users": 2,
                                      "total_code_suggestions": 100, "total_code_acceptances": 40,
                                      "total_code_lines_suggested": 150, "total_code_lines_accepted": 60 },
                                    { "name": "python", "total_engaged_users": 1,
                                      "total_code_suggestions": 50, "total_code_acceptances": 10,
                                      "total_code_lines_suggested": 70, "total_code_lines_accepted": 12 }
                                ]
                            }
                        ]
                    }
                ]
            },
            "copilot_ide_chat": {
                "editors": [ { "models": [ { "total_chats": 9, "total_chat_insertion_events": 2,
                                              "total_chat_copy_events": 3 } ] } ]
            }
        },
        {
            "date": "2025-01-06",
            "total_active_users": 5,
            "total_engaged_users": 5,
            "copilot_ide_code_completions": {
                "editors": [
                    { "name": "jetbrains", "models": [ { "languages": [
                        { "name": "rust", "total_engaged_users": 4,
                          "total_code_suggestions": 50, "total_code_acceptances": 30,
                          "total_code_lines_suggested": 80, "total_code_lines_accepted": 28 }
                    ] } ] }
                ]
            }
        }
    ]"#;

    fn records(json: &str) -> Vec<DayMetrics> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn aggregates_global_totals_over_active_days() {
        let usage = aggregate(&records(TWO_DAYS), None);
        let g = &usage.global_metrics;
        assert_eq!(g.active_days, 2);
        assert_eq!(g.total_users, 5);
        assert_eq!(g.total_engaged_users, 5);
        assert_eq!(g.total_suggestions, 200);
        assert_eq!(g.total_acceptances, 80);
        assert_eq!(g.total_lines_suggested, 300);
        assert_eq!(g.total_lines_accepted, 100);
        assert_eq!(g.total_chat_turns, 9);
        assert_eq!(g.total_chat_insertions, 2);
        assert_eq!(g.total_chat_copies, 3);
        assert_eq!(g.average_acceptance_rate, 40.0);
        assert_eq!(g.average_suggestions_per_day, 100.0);
        assert_eq!(g.average_suggestions_per_user, 40.0);
        assert_eq!(g.seats_usage_rate, 100.0);
    }

    #[test]
    fn daily_series_is_chronological() {
        let usage = aggregate(&records(TWO_DAYS), None);
        let days: Vec<String> = usage.users.iter().map(|d| d.day.to_string()).collect();
        assert_eq!(days, vec!["2025-01-06", "2025-01-07"]);

        let first = &usage.users[0];
        assert_eq!(first.total_suggestions, 50);
        assert_eq!(first.accepted_suggestions, 30);
        assert_eq!(first.rejected_suggestions, 20);
        assert_eq!(first.acceptance_rate, 60.0);

        let second = &usage.users[1];
        assert_eq!(second.chat_turns, 9);
        assert_eq!(second.acceptance_rate, 33.33);
    }

    #[test]
    fn language_breakdown_sums_across_days() {
        let usage = aggregate(&records(TWO_DAYS), None);
        let rust = &usage.language_stats["rust"];
        assert_eq!(rust.suggestions, 150);
        assert_eq!(rust.acceptances, 70);
        assert_eq!(rust.lines_accepted, 88);
        assert_eq!(rust.active_users, 4);
        assert_eq!(rust.acceptance_rate, 46.67);
        assert_eq!(usage.ranked_languages()[0].0, "rust");
    }

    #[test]
    fn seat_total_drives_usage_rate() {
        let usage = aggregate(&records(TWO_DAYS), Some(20));
        assert_eq!(usage.global_metrics.seats_usage_rate, 25.0);
        let usage = aggregate(&records(TWO_DAYS), Some(0));
        assert_eq!(usage.global_metrics.seats_usage_rate, 100.0);
    }

    #[test]
    fn inactive_days_are_listed_but_not_counted() {
        let json = r#"[
            { "date": "2025-02-01", "total_active_users": 0,
              "copilot_ide_code_completions": { "editors": [ { "models": [ { "languages": [
                  { "name": "go", "total_code_suggestions": 7, "total_code_acceptances": 9 } ] } ] } ] } }
        ]"#;
        let usage = aggregate(&records(json), None);
        assert_eq!(usage.users.len(), 1);
        assert_eq!(usage.global_metrics.active_days, 0);
        assert_eq!(usage.global_metrics.total_suggestions, 0);
        assert_eq!(usage.global_metrics.average_acceptance_rate, 0.0);
        assert_eq!(usage.users[0].rejected_suggestions, 0);
        assert_eq!(usage.language_stats["go"].suggestions, 7);
    }

    #[test]
    fn undated_records_are_skipped() {
        let json = r#"[ { "total_active_users": 3 }, { "date": "2025-02-02", "total_active_users": 1 } ]"#;
        let usage = aggregate(&records(json), None);
        assert_eq!(usage.users.len(), 1);
        assert_eq!(usage.global_metrics.active_days, 1);
    }

    #[test]
    fn unnamed_languages_are_grouped_as_unknown() {
        let json = r#"[ { "date": "2025-02-02", "total_active_users": 1,
            "copilot_ide_code_completions": { "editors": [ { "models": [ { "languages": [
                { "total_code_suggestions": 3 } ] } ] } ] } } ]"#;
        let usage = aggregate(&records(json), None);
        assert_eq!(usage.language_stats["unknown"].suggestions, 3);
    }

    #[test]
    fn empty_input_gives_empty_snapshot() {
        let usage = aggregate(&[], Some(10));
        assert_eq!(usage, UsageSnapshot::default());
    }

    #[test]
    fn daily_averages_guard_zero_days() {
        assert_eq!(
            DailyAverages::from_global(&GlobalMetrics::default()),
            DailyAverages::default()
        );
        let metrics = GlobalMetrics {
            total_suggestions: 400,
            total_lines_suggested: 200,
            total_lines_accepted: 80,
            total_users: 0,
            active_days: 4,
            ..Default::default()
        };
        let averages = DailyAverages::from_global(&metrics);
        assert_eq!(averages.suggestions_per_day, 100.0);
        assert_eq!(averages.lines_suggested_per_day, 50.0);
        assert_eq!(averages.lines_accepted_per_day, 20.0);
        assert_eq!(averages.suggestions_per_user_per_day, 0.0);
    }
}

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::core::models::roster::{ActivityStatus, Roster, SeatUser};

/// Seats inactive for longer than this are not counted as active users.
const ACTIVE_WITHIN_DAYS: i64 = 30;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Assignee {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

/// One entry of `/orgs/{org}/copilot/billing/seats`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Seat {
    pub assignee: Option<Assignee>,
    pub created_at: Option<String>,
    pub last_activity_at: Option<String>,
    pub last_activity_editor: Option<String>,
    pub pending_cancellation_date: Option<String>,
    pub plan_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeatsPage {
    pub total_seats: Option<u64>,
    pub seats: Vec<Seat>,
}

/// Parses RFC 3339 timestamps with any offset; anything else is treated as absent.
fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn seat_user(seat: &Seat, now: DateTime<Utc>) -> SeatUser {
    let assignee = seat.assignee.clone().unwrap_or_default();
    let last_activity = parse_timestamp(seat.last_activity_at.as_deref());
    let days_since_activity = last_activity.map(|at| (now - at).num_days());

    SeatUser {
        login: assignee.login,
        name: assignee.name,
        avatar_url: assignee.avatar_url,
        is_active: days_since_activity.is_some_and(|d| d <= ACTIVE_WITHIN_DAYS),
        last_activity,
        last_editor: seat.last_activity_editor.clone(),
        created_at: parse_timestamp(seat.created_at.as_deref()),
        pending_cancellation_date: seat.pending_cancellation_date.clone(),
        plan_type: seat.plan_type.clone(),
        days_since_activity,
        activity_status: ActivityStatus::from_days_since(days_since_activity),
    }
}

/// Build the roster from every fetched seats page.
pub fn build_roster(pages: &[SeatsPage], now: DateTime<Utc>) -> Roster {
    let users: Vec<SeatUser> = pages
        .iter()
        .flat_map(|p| p.seats.iter())
        .map(|seat| seat_user(seat, now))
        .collect();
    let total_seats = pages
        .iter()
        .find_map(|p| p.total_seats)
        .unwrap_or(users.len() as u64);
    Roster { total_seats, users }
}

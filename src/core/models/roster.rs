use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    VeryActive,
    Active,
    Inactive,
    VeryInactive,
    NeverActive,
}

impl ActivityStatus {
    pub fn from_days_since(days: Option<i64>) -> Self {
        match days {
            None => Self::NeverActive,
            Some(d) if d <= 7 => Self::VeryActive,
            Some(d) if d <= 30 => Self::Active,
            Some(d) if d <= 90 => Self::Inactive,
            Some(_) => Self::VeryInactive,
        }
    }

    pub fn all() -> &'static [ActivityStatus] {
        &[
            Self::VeryActive,
            Self::Active,
            Self::Inactive,
            Self::VeryInactive,
            Self::NeverActive,
        ]
    }
}

impl std::fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VeryActive => write!(f, "Very active"),
            Self::Active => write!(f, "Active"),
            Self::Inactive => write!(f, "Inactive"),
            Self::VeryInactive => write!(f, "Very inactive"),
            Self::NeverActive => write!(f, "Never active"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatUser {
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_editor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_cancellation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_since_activity: Option<i64>,
    #[serde(default = "default_status")]
    pub activity_status: ActivityStatus,
}

fn default_status() -> ActivityStatus {
    ActivityStatus::NeverActive
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub total_seats: u64,
    #[serde(default)]
    pub users: Vec<SeatUser>,
}

impl Roster {
    pub fn active_count(&self) -> usize {
        self.users.iter().filter(|u| u.is_active).count()
    }

    /// Number of seats per activity status, in display order, skipping empty buckets.
    pub fn summary_by_status(&self) -> Vec<(ActivityStatus, usize)> {
        ActivityStatus::all()
            .iter()
            .map(|status| {
                let count = self
                    .users
                    .iter()
                    .filter(|u| u.activity_status == *status)
                    .count();
                (*status, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_thresholds() {
        assert_eq!(ActivityStatus::from_days_since(None), ActivityStatus::NeverActive);
        assert_eq!(ActivityStatus::from_days_since(Some(0)), ActivityStatus::VeryActive);
        assert_eq!(ActivityStatus::from_days_since(Some(7)), ActivityStatus::VeryActive);
        assert_eq!(ActivityStatus::from_days_since(Some(8)), ActivityStatus::Active);
        assert_eq!(ActivityStatus::from_days_since(Some(30)), ActivityStatus::Active);
        assert_eq!(ActivityStatus::from_days_since(Some(31)), ActivityStatus::Inactive);
        assert_eq!(ActivityStatus::from_days_since(Some(90)), ActivityStatus::Inactive);
        assert_eq!(ActivityStatus::from_days_since(Some(91)), ActivityStatus::VeryInactive);
    }

    #[test]
    fn deserialize_dashboard_roster() {
        let json = r#"{
            "total_seats": 3,
            "users": [
                { "login": "octocat", "avatar_url": "https://example.com/a.png",
                  "is_active": true, "last_activity": "2025-01-10T12:00:00Z",
                  "last_editor": "vscode/1.96.0" },
                { "login": "hubot", "is_active": false, "last_activity": null, "last_editor": null }
            ]
        }"#;
        let roster: Roster = serde_json::from_str(json).unwrap();
        assert_eq!(roster.total_seats, 3);
        assert_eq!(roster.users.len(), 2);
        assert_eq!(roster.active_count(), 1);
        assert!(roster.users[0].last_activity.is_some());
        assert_eq!(roster.users[1].activity_status, ActivityStatus::NeverActive);
    }

    #[test]
    fn summary_skips_empty_buckets() {
        let user = |login: &str, status| SeatUser {
            login: login.to_string(),
            name: None,
            avatar_url: None,
            is_active: status == ActivityStatus::VeryActive,
            last_activity: None,
            last_editor: None,
            created_at: None,
            pending_cancellation_date: None,
            plan_type: None,
            days_since_activity: None,
            activity_status: status,
        };
        let roster = Roster {
            total_seats: 3,
            users: vec![
                user("a", ActivityStatus::VeryActive),
                user("b", ActivityStatus::VeryActive),
                user("c", ActivityStatus::NeverActive),
            ],
        };
        assert_eq!(
            roster.summary_by_status(),
            vec![(ActivityStatus::VeryActive, 2), (ActivityStatus::NeverActive, 1)]
        );
    }
}

//! Monthly calculation usage counters

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Calendar month bucket in UTC, rendered as `yyyy-MM`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthKey(String);

impl MonthKey {
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(format!("{:04}-{:02}", at.year(), at.month()))
    }

    pub fn current() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid month key: {}", s))?;
        let valid = year.len() == 4
            && month.len() == 2
            && year.chars().all(|c| c.is_ascii_digit())
            && matches!(month.parse::<u32>(), Ok(1..=12));
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(format!("Invalid month key: {}", s))
        }
    }
}

/// Calculations run by one user in one month
#[derive(Debug, Clone, Serialize)]
pub struct UsageMonthly {
    pub user_id: UserId,
    pub month: MonthKey,
    pub calc_count: i32,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a quota gate. A denial is an ordinary result, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl UsageDecision {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

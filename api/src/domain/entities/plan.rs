//! Subscription tiers and their quotas

use serde::{Deserialize, Serialize};

use super::UserId;

/// Calculations a free user may run per calendar month (UTC)
pub const FREE_CALCS_PER_MONTH: u32 = 15;

/// Scenarios a free user may keep saved at once
pub const FREE_MAX_SCENARIOS: u64 = 5;

/// Subscription tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Pro,
}

impl Tier {
    /// Monthly calculation ceiling, `None` when unlimited
    pub fn max_calcs_per_month(&self) -> Option<u32> {
        match self {
            Tier::Free => Some(FREE_CALCS_PER_MONTH),
            Tier::Pro => None,
        }
    }

    /// Saved scenario ceiling, `None` when unlimited
    pub fn max_scenarios(&self) -> Option<u64> {
        match self {
            Tier::Free => Some(FREE_MAX_SCENARIOS),
            Tier::Pro => None,
        }
    }

    pub fn all() -> [Tier; 2] {
        [Tier::Free, Tier::Pro]
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Free => write!(f, "free"),
            Tier::Pro => write!(f, "pro"),
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "pro" => Ok(Tier::Pro),
            _ => Err(format!("Unknown tier: {}", s)),
        }
    }
}

/// Billing profile of a user. Read-only here; written by the billing side.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user_id: UserId,
    pub is_pro: bool,
}

impl Profile {
    pub fn tier(&self) -> Tier {
        if self.is_pro {
            Tier::Pro
        } else {
            Tier::Free
        }
    }
}

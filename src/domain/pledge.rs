use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Label given to any amount that matches no catalog tier.
pub const CUSTOM_TIER: &str = "Custom";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pledge {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub tier_name: String,
    pub status: PledgeStatus,
    pub next_payment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pledge {
    pub fn is_active(&self) -> bool {
        self.status == PledgeStatus::Active
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PledgeStatus {
    Active,
    Paused,
    Cancelled,
}

impl PledgeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PledgeStatus::Active => "active",
            PledgeStatus::Paused => "paused",
            PledgeStatus::Cancelled => "cancelled",
        }
    }
}

/// A named preset pledge amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tier {
    pub amount: i64,
    pub label: String,
    #[serde(default)]
    pub description: String,
}

impl Tier {
    pub fn new(amount: i64, label: &str, description: &str) -> Self {
        Self {
            amount,
            label: label.to_string(),
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TierCatalog {
    tiers: Vec<Tier>,
}

impl TierCatalog {
    pub fn new(tiers: Vec<Tier>) -> Self {
        Self { tiers }
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Exact-match lookup; anything else is a custom amount.
    pub fn label_for(&self, amount: i64) -> String {
        self.tiers
            .iter()
            .find(|t| t.amount == amount)
            .map(|t| t.label.clone())
            .unwrap_or_else(|| CUSTOM_TIER.to_string())
    }
}

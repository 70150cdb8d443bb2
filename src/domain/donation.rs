use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::Pledge;

/// One recorded contribution. Rows are append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Donation {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
    pub status: DonationStatus,
    pub reference_id: String,
    pub is_anonymous: bool,
    pub message: Option<String>,
}

// Only `Successful` is ever written; the gateway's pending/failed states are not modeled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Successful,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Successful => "successful",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewDonation {
    pub user_id: Option<Uuid>,
    pub amount: i64,
    pub reference_id: String,
    pub is_anonymous: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordDonationRequest {
    pub amount: i64,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// Gateway reference; issued by the configured gateway when absent.
    #[serde(default)]
    pub reference_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    OneTime,
    Monthly,
}

/// Submission of the public donation form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DonateRequest {
    pub frequency: Frequency,
    #[validate(range(min = 1, message = "Please select or enter a valid donation amount."))]
    pub amount: i64,
    #[validate(custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(custom(function = "not_blank"))]
    pub last_name: String,
    #[validate(email(message = "Please provide a valid email address."))]
    pub email: String,
    #[serde(default)]
    pub is_anonymous: bool,
    /// Set once the donor has agreed to replace an existing active pledge.
    #[serde(default)]
    pub confirm_update: bool,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank")
            .with_message(Cow::Borrowed("Please provide your full name.")));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DonateOutcome {
    Pledge(Pledge),
    Donation(Donation),
}

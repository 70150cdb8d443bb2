use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Donor {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone_number: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Donor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Donor => "donor",
            Role::Admin => "admin",
        }
    }
}

/// Identity of the caller, resolved once per request and handed to every
/// ledger operation explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    pub donor_id: Uuid,
    pub role: Role,
}

impl SessionContext {
    pub fn new(donor_id: Uuid, role: Role) -> Self {
        Self { donor_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&Donor> for SessionContext {
    fn from(donor: &Donor) -> Self {
        Self::new(donor.id, donor.role)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDonorRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "is required"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "is required for verification"))]
    pub phone_number: String,
    #[serde(default)]
    pub role: Option<Role>,
}

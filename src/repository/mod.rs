use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::domain::*;
use crate::error::Result;

pub mod donor_repository;
pub mod pledge_repository;
pub mod donation_repository;
pub mod impact_story_repository;

pub use donor_repository::SqliteDonorRepository;
pub use pledge_repository::SqlitePledgeRepository;
pub use donation_repository::SqliteDonationRepository;
pub use impact_story_repository::SqliteImpactStoryRepository;

#[async_trait]
pub trait DonorRepository: Send + Sync {
    /// `password_hash` must already be an argon2 PHC string.
    async fn create(&self, request: CreateDonorRequest, password_hash: String) -> Result<Donor>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Donor>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Donor>>;
    async fn find_password_hash(&self, email: &str) -> Result<Option<String>>;
    /// Donors with at least one pledge or donation.
    async fn list_with_activity(&self) -> Result<Vec<Donor>>;
}

#[async_trait]
pub trait PledgeRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Pledge>>;
    async fn find_by_donor(&self, user_id: Uuid) -> Result<Option<Pledge>>;
    async fn find_active_by_donor(&self, user_id: Uuid) -> Result<Option<Pledge>>;
    /// Single-statement insert-or-update keyed on the donor. An active row
    /// keeps its schedule; an inactive row is reactivated with
    /// `next_payment_date`.
    async fn upsert_for_donor(
        &self,
        user_id: Uuid,
        amount: i64,
        tier_name: &str,
        next_payment_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Pledge>;
    async fn update_status(&self, id: Uuid, status: PledgeStatus, now: DateTime<Utc>) -> Result<Pledge>;
    async fn update_next_payment_date(
        &self,
        id: Uuid,
        next_payment_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Pledge>;
    async fn list(&self) -> Result<Vec<Pledge>>;
    async fn list_due(&self, as_of: DateTime<Utc>) -> Result<Vec<Pledge>>;
}

#[async_trait]
pub trait DonationRepository: Send + Sync {
    async fn create(&self, donation: NewDonation, created_at: DateTime<Utc>) -> Result<Donation>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Donation>>;
    async fn find_by_reference(&self, reference_id: &str) -> Result<Option<Donation>>;
    /// Newest first.
    async fn find_by_donor(&self, user_id: Uuid) -> Result<Vec<Donation>>;
    async fn find_by_donor_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Donation>>;
    /// Every donation attributed to a donor, anonymous-by-omission ones excluded.
    async fn list_attributed(&self) -> Result<Vec<Donation>>;
    async fn count(&self) -> Result<i64>;
}

#[async_trait]
pub trait ImpactStoryRepository: Send + Sync {
    async fn create(&self, request: CreateImpactStoryRequest) -> Result<ImpactStory>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ImpactStory>>;
    async fn list(&self, limit: i64) -> Result<Vec<ImpactStory>>;
}

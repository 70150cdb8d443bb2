pub mod clock;
pub mod ledger_service;
pub mod overview_service;
pub mod impact_story_service;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::{
    auth::AuthService,
    config::Settings,
    domain::TierCatalog,
    error::{AppError, Result},
    payments::{OfflineGateway, PaymentGateway},
    repository::*,
};
use clock::Clock;
use impact_story_service::ImpactStoryService;
use ledger_service::LedgerService;
use overview_service::OverviewService;

pub use clock::{FixedClock, SystemClock};
pub use ledger_service::DonorDashboard;
pub use overview_service::ReminderLink;

pub struct ServiceContext {
    pub donor_repo: Arc<dyn DonorRepository>,
    pub pledge_repo: Arc<dyn PledgeRepository>,
    pub donation_repo: Arc<dyn DonationRepository>,
    pub auth_service: Arc<AuthService>,
    pub ledger_service: Arc<LedgerService>,
    pub overview_service: Arc<OverviewService>,
    pub impact_story_service: Arc<ImpactStoryService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(db_pool: SqlitePool, settings: &Settings) -> Self {
        Self::with_clock(db_pool, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(db_pool: SqlitePool, settings: &Settings, clock: Arc<dyn Clock>) -> Self {
        let store_timeout = Duration::from_secs(settings.database.store_timeout_secs);

        // Repositories
        let donor_repo: Arc<dyn DonorRepository> = Arc::new(SqliteDonorRepository::new(db_pool.clone()));
        let pledge_repo: Arc<dyn PledgeRepository> = Arc::new(SqlitePledgeRepository::new(db_pool.clone()));
        let donation_repo: Arc<dyn DonationRepository> = Arc::new(SqliteDonationRepository::new(db_pool.clone()));
        let story_repo = Arc::new(SqliteImpactStoryRepository::new(db_pool.clone()));

        let gateway: Arc<dyn PaymentGateway> = Arc::new(OfflineGateway);
        tracing::debug!(gateway = gateway.name(), "Payment gateway configured");

        let auth_service = Arc::new(AuthService::new(
            db_pool.clone(),
            donor_repo.clone(),
            settings.auth.session_duration_hours,
            store_timeout,
        ));

        let ledger_service = Arc::new(LedgerService::new(
            pledge_repo.clone(),
            donation_repo.clone(),
            donor_repo.clone(),
            gateway,
            clock.clone(),
            TierCatalog::new(settings.ledger.tiers.clone()),
            store_timeout,
        ));

        let overview_service = Arc::new(OverviewService::new(
            donor_repo.clone(),
            pledge_repo.clone(),
            donation_repo.clone(),
            clock,
            settings.reminders.clone(),
            store_timeout,
        ));

        let impact_story_service = Arc::new(ImpactStoryService::new(story_repo, store_timeout));

        Self {
            donor_repo,
            pledge_repo,
            donation_repo,
            auth_service,
            ledger_service,
            overview_service,
            impact_story_service,
            db_pool,
        }
    }
}

/// Bounds a store round-trip. Expiry is reported as a store failure.
pub async fn with_store_timeout<T, F>(limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Store call exceeded {:?}", limit);
            Err(AppError::Store(format!("store call timed out after {:?}", limit)))
        }
    }
}

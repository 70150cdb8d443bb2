use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    config::ReminderConfig,
    domain::*,
    error::{AppError, Result},
    repository::{DonationRepository, DonorRepository, PledgeRepository},
};
use super::{clock::Clock, with_store_timeout};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReminderLink {
    pub user_id: Uuid,
    pub email: String,
    pub mailto: String,
}

/// Read-only admin projection over donors, pledges and donations.
pub struct OverviewService {
    donor_repo: Arc<dyn DonorRepository>,
    pledge_repo: Arc<dyn PledgeRepository>,
    donation_repo: Arc<dyn DonationRepository>,
    clock: Arc<dyn Clock>,
    reminders: ReminderConfig,
    store_timeout: Duration,
}

impl OverviewService {
    pub fn new(
        donor_repo: Arc<dyn DonorRepository>,
        pledge_repo: Arc<dyn PledgeRepository>,
        donation_repo: Arc<dyn DonationRepository>,
        clock: Arc<dyn Clock>,
        reminders: ReminderConfig,
        store_timeout: Duration,
    ) -> Self {
        Self {
            donor_repo,
            pledge_repo,
            donation_repo,
            clock,
            reminders,
            store_timeout,
        }
    }

    pub async fn list_donor_overview(
        &self,
        session: &SessionContext,
        filter: &OverviewFilter,
    ) -> Result<Vec<AdminDonorView>> {
        require_admin(session)?;
        let views = self.load_views().await?;
        Ok(views.into_iter().filter(|v| filter.matches(v)).collect())
    }

    pub async fn stats(&self, session: &SessionContext) -> Result<OverviewStats> {
        require_admin(session)?;
        let views = self.load_views().await?;
        Ok(OverviewStats::from_views(&views))
    }

    /// Builds the mail-client hand-off for a donor whose pledge is unpaid
    /// this cycle.
    pub async fn reminder_link(&self, session: &SessionContext, donor_id: Uuid) -> Result<ReminderLink> {
        require_admin(session)?;
        let view = self
            .load_views()
            .await?
            .into_iter()
            .find(|v| v.user_id == donor_id)
            .ok_or_else(|| AppError::NotFound("Donor not found".to_string()))?;

        if !view.needs_reminder() {
            return Err(AppError::Validation(
                "Donor has no unpaid active pledge this cycle".to_string(),
            ));
        }

        Ok(ReminderLink {
            user_id: view.user_id,
            mailto: reminder_mailto(&view, &self.reminders),
            email: view.email,
        })
    }

    async fn load_views(&self) -> Result<Vec<AdminDonorView>> {
        let donors = with_store_timeout(self.store_timeout, self.donor_repo.list_with_activity()).await?;
        let pledges = with_store_timeout(self.store_timeout, self.pledge_repo.list()).await?;
        let donations =
            with_store_timeout(self.store_timeout, self.donation_repo.list_attributed()).await?;

        Ok(project_overview(donors, pledges, donations, self.clock.now()))
    }
}

fn require_admin(session: &SessionContext) -> Result<()> {
    if session.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

pub fn reminder_mailto(view: &AdminDonorView, config: &ReminderConfig) -> String {
    let body = format!(
        "Dear {},\r\n\r\nHope this meets you well. We are preparing for this month's distribution \
         and noticed your pledge for this month is still pending.\r\n\r\n\
         Your support means the world to our beneficiaries.\r\n\r\nWarm regards,\r\n{} Team",
        view.full_name, config.organisation
    );

    format!(
        "mailto:{}?subject={}&body={}",
        view.email,
        urlencoding::encode(&config.subject),
        urlencoding::encode(&body)
    )
}

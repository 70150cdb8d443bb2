use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::*,
    error::{AppError, Result},
    payments::PaymentGateway,
    repository::{DonationRepository, DonorRepository, PledgeRepository},
};
use super::{clock::Clock, with_store_timeout};

/// Everything the donor dashboard shows, computed on each read.
#[derive(Debug, Clone, Serialize)]
pub struct DonorDashboard {
    pub donor: Donor,
    pub pledge: Option<Pledge>,
    pub donations: Vec<Donation>,
    pub current_cycle_status: CycleStatus,
}

/// Owns pledge lifecycle and the donation ledger.
pub struct LedgerService {
    pledge_repo: Arc<dyn PledgeRepository>,
    donation_repo: Arc<dyn DonationRepository>,
    donor_repo: Arc<dyn DonorRepository>,
    gateway: Arc<dyn PaymentGateway>,
    clock: Arc<dyn Clock>,
    tiers: TierCatalog,
    store_timeout: Duration,
}

impl LedgerService {
    pub fn new(
        pledge_repo: Arc<dyn PledgeRepository>,
        donation_repo: Arc<dyn DonationRepository>,
        donor_repo: Arc<dyn DonorRepository>,
        gateway: Arc<dyn PaymentGateway>,
        clock: Arc<dyn Clock>,
        tiers: TierCatalog,
        store_timeout: Duration,
    ) -> Self {
        Self {
            pledge_repo,
            donation_repo,
            donor_repo,
            gateway,
            clock,
            tiers,
            store_timeout,
        }
    }

    pub fn tiers(&self) -> &TierCatalog {
        &self.tiers
    }

    /// Creates the donor's pledge, or overwrites amount and tier of the
    /// existing one. An active pledge keeps its status and schedule; an
    /// inactive one is reactivated in place.
    pub async fn create_or_update_pledge(&self, session: &SessionContext, amount: i64) -> Result<Pledge> {
        validate_amount(amount)?;
        self.upsert_pledge(session.donor_id, amount).await
    }

    /// The caller must have obtained explicit confirmation from the donor;
    /// `confirmed` records that it did.
    pub async fn pause_or_cancel_pledge(
        &self,
        session: &SessionContext,
        pledge_id: Uuid,
        confirmed: bool,
    ) -> Result<Pledge> {
        if !confirmed {
            return Err(AppError::Validation(
                "Cancelling a pledge must be confirmed".to_string(),
            ));
        }

        let pledge = self.load_owned(session, pledge_id).await?;
        if pledge.status == PledgeStatus::Cancelled {
            return Ok(pledge);
        }

        let now = self.clock.now();
        let cancelled = self
            .store(self.pledge_repo.update_status(pledge.id, PledgeStatus::Cancelled, now))
            .await?;

        tracing::info!(pledge_id = %cancelled.id, donor_id = %cancelled.user_id, "Pledge cancelled");
        Ok(cancelled)
    }

    /// Suspends an active pledge without giving it up. Re-pledging resumes it.
    pub async fn pause_pledge(&self, session: &SessionContext, pledge_id: Uuid) -> Result<Pledge> {
        let pledge = self.load_owned(session, pledge_id).await?;
        match pledge.status {
            PledgeStatus::Paused => Ok(pledge),
            PledgeStatus::Cancelled => Err(AppError::Validation(
                "A cancelled pledge cannot be paused".to_string(),
            )),
            PledgeStatus::Active => {
                let now = self.clock.now();
                let paused = self
                    .store(self.pledge_repo.update_status(pledge.id, PledgeStatus::Paused, now))
                    .await?;
                tracing::info!(pledge_id = %paused.id, donor_id = %paused.user_id, "Pledge paused");
                Ok(paused)
            }
        }
    }

    pub async fn reactivate_pledge(
        &self,
        session: &SessionContext,
        pledge_id: Uuid,
        amount: i64,
    ) -> Result<Pledge> {
        validate_amount(amount)?;
        let pledge = self.load_owned(session, pledge_id).await?;
        if pledge.is_active() {
            return Err(AppError::Validation("Pledge is already active".to_string()));
        }
        self.upsert_pledge(pledge.user_id, amount).await
    }

    /// Appends a donation. Never touches pledges.
    pub async fn record_donation(
        &self,
        session: Option<&SessionContext>,
        request: RecordDonationRequest,
    ) -> Result<Donation> {
        validate_amount(request.amount)?;

        let now = self.clock.now();
        let reference_id = match request.reference_id.as_deref().map(str::trim) {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => self.gateway.issue_reference(request.amount, now),
        };

        let new_donation = NewDonation {
            user_id: session.map(|s| s.donor_id),
            amount: request.amount,
            reference_id,
            is_anonymous: request.is_anonymous,
            message: request.message.filter(|m| !m.trim().is_empty()),
        };

        let donation = self
            .store(self.donation_repo.create(new_donation, now))
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    AppError::Conflict("Donation reference already recorded".to_string())
                } else {
                    e
                }
            })?;

        tracing::info!(
            donation_id = %donation.id,
            amount = donation.amount,
            reference_id = %donation.reference_id,
            anonymous = donation.is_anonymous,
            "Donation recorded"
        );
        Ok(donation)
    }

    /// Handles a donation-form submission. A monthly gift replaces an
    /// existing active pledge only when `confirm_update` is set.
    pub async fn donate(
        &self,
        session: Option<&SessionContext>,
        request: DonateRequest,
    ) -> Result<DonateOutcome> {
        request.validate()?;

        match request.frequency {
            Frequency::Monthly => {
                let session = session.ok_or(AppError::Unauthorized)?;
                if !request.confirm_update {
                    let existing = self
                        .store(self.pledge_repo.find_active_by_donor(session.donor_id))
                        .await?;
                    if existing.is_some() {
                        return Err(AppError::Validation(
                            "You already have an active pledge. Confirm to update it.".to_string(),
                        ));
                    }
                }
                let pledge = self.create_or_update_pledge(session, request.amount).await?;
                Ok(DonateOutcome::Pledge(pledge))
            }
            Frequency::OneTime => {
                let donation = self
                    .record_donation(
                        session,
                        RecordDonationRequest {
                            amount: request.amount,
                            is_anonymous: request.is_anonymous,
                            message: Some(format!("Donation by {}", request.first_name.trim())),
                            reference_id: None,
                        },
                    )
                    .await?;
                Ok(DonateOutcome::Donation(donation))
            }
        }
    }

    pub async fn compute_current_cycle_status(&self, donor_id: Uuid) -> Result<CycleStatus> {
        let Some(pledge) = self.store(self.pledge_repo.find_active_by_donor(donor_id)).await? else {
            return Ok(CycleStatus::NoPledge);
        };

        let now = self.clock.now();
        let window = CycleWindow::containing(now);
        let donations = self
            .store(self.donation_repo.find_by_donor_between(donor_id, window.start, window.end))
            .await?;

        Ok(compute_cycle_status(Some(&pledge), &donations, now))
    }

    pub async fn dashboard(&self, session: &SessionContext) -> Result<DonorDashboard> {
        let donor = self
            .store(self.donor_repo.find_by_id(session.donor_id))
            .await?
            .ok_or(AppError::Unauthorized)?;
        let pledge = self.store(self.pledge_repo.find_by_donor(donor.id)).await?;
        let donations = self.store(self.donation_repo.find_by_donor(donor.id)).await?;
        let current_cycle_status = compute_cycle_status(pledge.as_ref(), &donations, self.clock.now());

        Ok(DonorDashboard {
            donor,
            pledge,
            donations,
            current_cycle_status,
        })
    }

    /// Walks every due active pledge forward one calendar month per cycle.
    /// A cycle is settled when it holds a qualifying donation, or skipped
    /// once it has closed unpaid. The walk stops at the first cycle that is
    /// still open and unpaid, or once the next date lies in the future.
    pub async fn reconcile_due_pledges(&self) -> Result<Vec<Pledge>> {
        let now = self.clock.now();
        let due = self.store(self.pledge_repo.list_due(now)).await?;
        let mut advanced = Vec::new();

        for pledge in due {
            let mut next = pledge.next_payment_date;

            while next <= now {
                let window = CycleWindow::containing(next);
                let donations = self
                    .store(self.donation_repo.find_by_donor_between(pledge.user_id, window.start, window.end))
                    .await?;

                if compute_cycle_status(Some(&pledge), &donations, next) != CycleStatus::Paid {
                    if window.end > now {
                        tracing::debug!(pledge_id = %pledge.id, "Pledge due but unpaid; schedule unchanged");
                        break;
                    }
                    tracing::warn!(
                        pledge_id = %pledge.id,
                        donor_id = %pledge.user_id,
                        cycle_start = %window.start,
                        "Pledge cycle closed unpaid"
                    );
                }

                next = add_one_month(next)
                    .ok_or_else(|| AppError::Internal("Pledge schedule overflow".to_string()))?;
            }

            if next == pledge.next_payment_date {
                continue;
            }

            let updated = self
                .store(self.pledge_repo.update_next_payment_date(pledge.id, next, now))
                .await?;
            tracing::info!(
                pledge_id = %updated.id,
                next_payment_date = %updated.next_payment_date,
                "Pledge reconciled"
            );
            advanced.push(updated);
        }

        Ok(advanced)
    }

    async fn upsert_pledge(&self, donor_id: Uuid, amount: i64) -> Result<Pledge> {
        let now = self.clock.now();
        let tier_name = self.tiers.label_for(amount);
        let next_payment_date = add_one_month(now)
            .ok_or_else(|| AppError::Internal("Pledge schedule overflow".to_string()))?;

        let previous = self.store(self.pledge_repo.find_by_donor(donor_id)).await?;
        let pledge = self
            .store(self.pledge_repo.upsert_for_donor(donor_id, amount, &tier_name, next_payment_date, now))
            .await?;

        match previous.map(|p| p.status) {
            None => tracing::info!(pledge_id = %pledge.id, donor_id = %donor_id, amount, "Pledge created"),
            Some(PledgeStatus::Active) => {
                tracing::info!(pledge_id = %pledge.id, donor_id = %donor_id, amount, "Pledge updated")
            }
            Some(_) => {
                tracing::info!(pledge_id = %pledge.id, donor_id = %donor_id, amount, "Pledge reactivated")
            }
        }
        Ok(pledge)
    }

    /// Missing pledges and pledges owned by someone else look the same to
    /// non-admin callers.
    async fn load_owned(&self, session: &SessionContext, pledge_id: Uuid) -> Result<Pledge> {
        let pledge = self.store(self.pledge_repo.find_by_id(pledge_id)).await?;
        match pledge {
            Some(p) if p.user_id == session.donor_id || session.is_admin() => Ok(p),
            None if session.is_admin() => Err(AppError::NotFound("Pledge not found".to_string())),
            _ => Err(AppError::Forbidden),
        }
    }

    async fn store<T, F>(&self, fut: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        with_store_timeout(self.store_timeout, fut).await
    }
}

fn validate_amount(amount: i64) -> Result<()> {
    if amount <= 0 {
        return Err(AppError::Validation(
            "Amount must be a positive whole number".to_string(),
        ));
    }
    Ok(())
}

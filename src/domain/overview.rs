use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{compute_cycle_status, CycleStatus, Donation, Donor, Pledge, PledgeStatus};

/// Row of the admin donor overview. Field names are the wire contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminDonorView {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub pledge_amount: Option<i64>,
    pub tier_name: Option<String>,
    pub pledge_status: Option<PledgeStatus>,
    pub last_donation_date: Option<DateTime<Utc>>,
    pub current_month_status: CycleStatus,
}

impl AdminDonorView {
    pub fn needs_reminder(&self) -> bool {
        self.pledge_status == Some(PledgeStatus::Active)
            && self.current_month_status == CycleStatus::Unpaid
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OverviewScope {
    #[default]
    #[serde(alias = "All", alias = "ALL")]
    All,
    #[serde(alias = "Unpaid", alias = "UNPAID")]
    Unpaid,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverviewFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub filter: OverviewScope,
}

impl OverviewFilter {
    pub fn matches(&self, view: &AdminDonorView) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                view.full_name.to_lowercase().contains(&term)
                    || view.email.to_lowercase().contains(&term)
            }
        };

        let matches_scope = match self.filter {
            OverviewScope::All => true,
            OverviewScope::Unpaid => view.needs_reminder(),
        };

        matches_search && matches_scope
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OverviewStats {
    pub donor_count: usize,
    pub total_active_pledges: usize,
    pub unpaid_count: usize,
}

impl OverviewStats {
    pub fn from_views(views: &[AdminDonorView]) -> Self {
        Self {
            donor_count: views.len(),
            total_active_pledges: views
                .iter()
                .filter(|v| v.pledge_status == Some(PledgeStatus::Active))
                .count(),
            unpaid_count: views.iter().filter(|v| v.needs_reminder()).count(),
        }
    }
}

/// Joins donors with their pledge and donations. Donors with neither are
/// left out. Rows are ordered by name, then email.
pub fn project_overview(
    donors: Vec<Donor>,
    pledges: Vec<Pledge>,
    donations: Vec<Donation>,
    now: DateTime<Utc>,
) -> Vec<AdminDonorView> {
    let mut pledge_by_donor: HashMap<Uuid, Pledge> = HashMap::new();
    for pledge in pledges {
        // Prefer the active row, then the most recently touched one.
        let replace = match pledge_by_donor.get(&pledge.user_id) {
            None => true,
            Some(current) => {
                (pledge.is_active() && !current.is_active())
                    || (pledge.is_active() == current.is_active()
                        && pledge.updated_at > current.updated_at)
            }
        };
        if replace {
            pledge_by_donor.insert(pledge.user_id, pledge);
        }
    }

    let mut donations_by_donor: HashMap<Uuid, Vec<Donation>> = HashMap::new();
    for donation in donations {
        if let Some(user_id) = donation.user_id {
            donations_by_donor.entry(user_id).or_default().push(donation);
        }
    }

    let mut views: Vec<AdminDonorView> = donors
        .into_iter()
        .filter_map(|donor| {
            let pledge = pledge_by_donor.get(&donor.id);
            let gifts = donations_by_donor
                .get(&donor.id)
                .map(Vec::as_slice)
                .unwrap_or_default();

            if pledge.is_none() && gifts.is_empty() {
                return None;
            }

            Some(AdminDonorView {
                user_id: donor.id,
                full_name: donor.full_name,
                email: donor.email,
                phone_number: donor.phone_number,
                pledge_amount: pledge.map(|p| p.amount),
                tier_name: pledge.map(|p| p.tier_name.clone()),
                pledge_status: pledge.map(|p| p.status),
                last_donation_date: gifts.iter().map(|d| d.created_at).max(),
                current_month_status: compute_cycle_status(pledge, gifts, now),
            })
        })
        .collect();

    views.sort_by(|a, b| {
        a.full_name
            .to_lowercase()
            .cmp(&b.full_name.to_lowercase())
            .then_with(|| a.email.cmp(&b.email))
    });
    views
}

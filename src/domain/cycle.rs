use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Donation, Pledge};

/// Payment status of a donor for the cycle containing a given instant.
/// Derived on every read, never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CycleStatus {
    Paid,
    Unpaid,
    #[serde(rename = "No Pledge")]
    NoPledge,
}

impl CycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleStatus::Paid => "Paid",
            CycleStatus::Unpaid => "Unpaid",
            CycleStatus::NoPledge => "No Pledge",
        }
    }
}

/// Half-open calendar-month window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CycleWindow {
    pub fn containing(instant: DateTime<Utc>) -> Self {
        let first = NaiveDate::from_ymd_opt(instant.year(), instant.month(), 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
            .unwrap_or(instant);
        Self {
            start: first,
            end: add_one_month(first).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Calendar-month step used for pledge schedules; day-of-month is clamped
/// to the end of shorter months.
pub fn add_one_month(instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
    instant.checked_add_months(Months::new(1))
}

/// `pledge` must belong to the same donor as every entry of `donations`.
pub fn compute_cycle_status(
    pledge: Option<&Pledge>,
    donations: &[Donation],
    now: DateTime<Utc>,
) -> CycleStatus {
    let pledge = match pledge {
        Some(p) if p.is_active() => p,
        _ => return CycleStatus::NoPledge,
    };

    let window = CycleWindow::containing(now);
    let paid = donations
        .iter()
        .any(|d| window.contains(d.created_at) && d.amount >= pledge.amount);

    if paid {
        CycleStatus::Paid
    } else {
        CycleStatus::Unpaid
    }
}

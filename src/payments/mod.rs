use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The card processor sits outside this service. All the ledger needs from
/// it is a unique reference for a completed charge.
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;
    fn issue_reference(&self, amount: i64, at: DateTime<Utc>) -> String;
}

/// Issues `REF-<millis>-<random>` references without contacting any processor.
#[derive(Debug, Default, Clone)]
pub struct OfflineGateway;

impl PaymentGateway for OfflineGateway {
    fn name(&self) -> &'static str {
        "offline"
    }

    fn issue_reference(&self, _amount: i64, at: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("REF-{}-{}", at.timestamp_millis(), &suffix[..8])
    }
}

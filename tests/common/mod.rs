#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use hive::{
    config::Settings,
    domain::{CreateDonorRequest, Donor, Role, SessionContext},
    service::{FixedClock, ServiceContext},
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

/// Single-connection in-memory database with migrations applied. The
/// connection is never recycled, so the database lives as long as the pool.
pub async fn test_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

pub fn start_of_test() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 5, 10, 0, 0).unwrap()
}

pub struct Harness {
    pub ctx: Arc<ServiceContext>,
    pub clock: Arc<FixedClock>,
    pub settings: Settings,
}

pub async fn harness() -> anyhow::Result<Harness> {
    harness_with(Settings::default()).await
}

pub async fn harness_with(settings: Settings) -> anyhow::Result<Harness> {
    let pool = test_pool().await?;
    let clock = Arc::new(FixedClock::new(start_of_test()));
    let ctx = Arc::new(ServiceContext::with_clock(pool, &settings, clock.clone()));
    Ok(Harness { ctx, clock, settings })
}

/// Inserts a donor directly, skipping password hashing.
pub async fn donor(h: &Harness, name: &str, email: &str) -> anyhow::Result<(Donor, SessionContext)> {
    insert_donor(h, name, email, Role::Donor).await
}

pub async fn admin(h: &Harness) -> anyhow::Result<(Donor, SessionContext)> {
    insert_donor(h, "Hive Admin", "admin@hive.local", Role::Admin).await
}

async fn insert_donor(
    h: &Harness,
    name: &str,
    email: &str,
    role: Role,
) -> anyhow::Result<(Donor, SessionContext)> {
    let donor = h.ctx.donor_repo
        .create(
            CreateDonorRequest {
                email: email.to_string(),
                password: "unused-password".to_string(),
                full_name: name.to_string(),
                phone_number: "+2348012345678".to_string(),
                role: Some(role),
            },
            "not-a-real-hash".to_string(),
        )
        .await?;
    let session = SessionContext::from(&donor);
    Ok((donor, session))
}

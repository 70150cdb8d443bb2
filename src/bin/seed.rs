use clap::Parser;
use fake::{
    Fake,
    faker::{internet::en::SafeEmail, name::en::Name, phone_number::en::PhoneNumber},
};
use hive::{
    config::Settings,
    domain::{CreateDonorRequest, RecordDonationRequest, Role, SessionContext},
    error::AppError,
    service::ServiceContext,
};
use rand::Rng;
use sqlx::sqlite::SqlitePoolOptions;

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Populate a Hive database with sample donors")]
struct Args {
    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://hive.db?mode=rwc")]
    database_url: String,

    /// Number of fake donors to create
    #[arg(long, default_value_t = 12)]
    donors: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    println!("🌱 Starting database seeding...");

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&args.database_url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let settings = Settings::default();
    let ctx = ServiceContext::new(db_pool, &settings);

    println!("👥 Creating donors...");
    match ctx.auth_service.signup(CreateDonorRequest {
        email: "admin@hive.local".to_string(),
        password: "admin12345".to_string(),
        full_name: "Hive Admin".to_string(),
        phone_number: "+2348000000001".to_string(),
        role: Some(Role::Admin),
    }).await {
        Ok(_) => println!("  ✅ Created admin user (admin@hive.local / admin12345)"),
        Err(AppError::Conflict(_)) => println!("  ↩️  Admin user already exists"),
        Err(e) => return Err(e.into()),
    }

    let tiers: Vec<i64> = settings.ledger.tiers.iter().map(|t| t.amount).collect();
    let mut rng = rand::thread_rng();
    let (mut pledged, mut paid) = (0, 0);

    for _ in 0..args.donors {
        let email: String = SafeEmail().fake();
        let donor = match ctx.auth_service.signup(CreateDonorRequest {
            email,
            password: "password123".to_string(),
            full_name: Name().fake(),
            phone_number: PhoneNumber().fake(),
            role: None,
        }).await {
            Ok(donor) => donor,
            Err(AppError::Conflict(_)) => continue,
            Err(e) => return Err(e.into()),
        };
        let session = SessionContext::from(&donor);

        // Roughly three in four donors pledge; some pick a custom amount.
        if rng.gen_bool(0.75) {
            let amount = if rng.gen_bool(0.8) && !tiers.is_empty() {
                tiers[rng.gen_range(0..tiers.len())]
            } else {
                rng.gen_range(10..=500) * 100
            };
            ctx.ledger_service.create_or_update_pledge(&session, amount).await?;
            pledged += 1;

            if rng.gen_bool(0.5) {
                ctx.ledger_service.record_donation(Some(&session), RecordDonationRequest {
                    amount,
                    is_anonymous: false,
                    message: Some(format!("Monthly pledge from {}", donor.full_name)),
                    reference_id: None,
                }).await?;
                paid += 1;
            }
        } else {
            ctx.ledger_service.record_donation(Some(&session), RecordDonationRequest {
                amount: rng.gen_range(1..=100) * 500,
                is_anonymous: rng.gen_bool(0.3),
                message: Some(format!("Donation by {}", donor.full_name)),
                reference_id: None,
            }).await?;
        }
    }

    println!("  ✅ {} pledges created, {} paid this cycle", pledged, paid);
    println!("✨ Seeding complete!");

    Ok(())
}

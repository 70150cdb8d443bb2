mod common;

use chrono::{Duration, TimeZone, Utc};
use hive::{
    config::Settings,
    domain::{
        CycleStatus, DonateOutcome, DonateRequest, Frequency, PledgeStatus, RecordDonationRequest,
        CUSTOM_TIER,
    },
    error::AppError,
    service::clock::Clock,
};

use common::{admin, donor, harness, harness_with};

fn paid(amount: i64) -> RecordDonationRequest {
    RecordDonationRequest {
        amount,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_pledge_create_then_update_keeps_schedule() -> anyhow::Result<()> {
    let h = harness().await?;
    let (_, session) = donor(&h, "Ada Obi", "ada@example.com").await?;
    let ledger = &h.ctx.ledger_service;

    let created = ledger.create_or_update_pledge(&session, 5000).await?;
    assert_eq!(created.tier_name, "Seed Plan");
    assert_eq!(created.status, PledgeStatus::Active);
    assert_eq!(
        created.next_payment_date,
        Utc.with_ymd_and_hms(2026, 11, 5, 10, 0, 0).unwrap()
    );

    h.clock.advance(Duration::days(3));
    let updated = ledger.create_or_update_pledge(&session, 25000).await?;

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.amount, 25000);
    assert_eq!(updated.tier_name, "Queen Plan");
    assert_eq!(updated.status, PledgeStatus::Active);
    assert_eq!(updated.next_payment_date, created.next_payment_date);
    assert_eq!(h.ctx.pledge_repo.list().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_unmatched_amount_is_custom_tier() -> anyhow::Result<()> {
    let h = harness().await?;
    let (_, session) = donor(&h, "Ada Obi", "ada@example.com").await?;

    let pledge = h.ctx.ledger_service.create_or_update_pledge(&session, 7500).await?;
    assert_eq!(pledge.tier_name, CUSTOM_TIER);

    Ok(())
}

#[tokio::test]
async fn test_empty_catalog_labels_everything_custom() -> anyhow::Result<()> {
    let mut settings = Settings::default();
    settings.ledger.tiers.clear();
    let h = harness_with(settings).await?;
    let (_, session) = donor(&h, "Ada Obi", "ada@example.com").await?;

    let pledge = h.ctx.ledger_service.create_or_update_pledge(&session, 5000).await?;
    assert_eq!(pledge.tier_name, "Custom");

    Ok(())
}

#[tokio::test]
async fn test_non_positive_amounts_are_rejected() -> anyhow::Result<()> {
    let h = harness().await?;
    let (_, session) = donor(&h, "Ada Obi", "ada@example.com").await?;
    let ledger = &h.ctx.ledger_service;

    for amount in [0, -5000] {
        let err = ledger.create_or_update_pledge(&session, amount).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = ledger.record_donation(Some(&session), paid(amount)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    assert!(h.ctx.pledge_repo.list().await?.is_empty());
    assert_eq!(h.ctx.donation_repo.count().await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_cancel_requires_confirmation() -> anyhow::Result<()> {
    let h = harness().await?;
    let (_, session) = donor(&h, "Ada Obi", "ada@example.com").await?;
    let ledger = &h.ctx.ledger_service;

    let pledge = ledger.create_or_update_pledge(&session, 10000).await?;
    let err = ledger.pause_or_cancel_pledge(&session, pledge.id, false).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let stored = h.ctx.pledge_repo.find_by_id(pledge.id).await?.unwrap();
    assert_eq!(stored.status, PledgeStatus::Active);

    Ok(())
}

#[tokio::test]
async fn test_cancel_is_idempotent() -> anyhow::Result<()> {
    let h = harness().await?;
    let (_, session) = donor(&h, "Ada Obi", "ada@example.com").await?;
    let ledger = &h.ctx.ledger_service;

    let pledge = ledger.create_or_update_pledge(&session, 10000).await?;
    let first = ledger.pause_or_cancel_pledge(&session, pledge.id, true).await?;
    assert_eq!(first.status, PledgeStatus::Cancelled);
    assert_eq!(first.next_payment_date, pledge.next_payment_date);

    h.clock.advance(Duration::hours(1));
    let second = ledger.pause_or_cancel_pledge(&session, pledge.id, true).await?;
    assert_eq!(second.status, PledgeStatus::Cancelled);
    assert_eq!(second.next_payment_date, first.next_payment_date);
    assert_eq!(second.updated_at, first.updated_at);

    Ok(())
}

#[tokio::test]
async fn test_cancel_then_repledge_reuses_row() -> anyhow::Result<()> {
    let h = harness().await?;
    let (_, session) = donor(&h, "Ada Obi", "ada@example.com").await?;
    let ledger = &h.ctx.ledger_service;

    let pledge = ledger.create_or_update_pledge(&session, 10000).await?;
    ledger.pause_or_cancel_pledge(&session, pledge.id, true).await?;
    assert_eq!(ledger.compute_current_cycle_status(session.donor_id).await?, CycleStatus::NoPledge);

    h.clock.set(Utc.with_ymd_and_hms(2026, 12, 10, 9, 0, 0).unwrap());
    let revived = ledger.create_or_update_pledge(&session, 5000).await?;

    assert_eq!(revived.id, pledge.id);
    assert_eq!(revived.status, PledgeStatus::Active);
    assert_eq!(revived.tier_name, "Seed Plan");
    assert_eq!(
        revived.next_payment_date,
        Utc.with_ymd_and_hms(2027, 1, 10, 9, 0, 0).unwrap()
    );
    assert_eq!(h.ctx.pledge_repo.list().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_reactivate_pledge() -> anyhow::Result<()> {
    let h = harness().await?;
    let (_, session) = donor(&h, "Ada Obi", "ada@example.com").await?;
    let ledger = &h.ctx.ledger_service;

    let pledge = ledger.create_or_update_pledge(&session, 10000).await?;
    let err = ledger.reactivate_pledge(&session, pledge.id, 10000).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    ledger.pause_or_cancel_pledge(&session, pledge.id, true).await?;
    let revived = ledger.reactivate_pledge(&session, pledge.id, 25000).await?;
    assert_eq!(revived.id, pledge.id);
    assert_eq!(revived.status, PledgeStatus::Active);
    assert_eq!(revived.tier_name, "Queen Plan");

    Ok(())
}

#[tokio::test]
async fn test_pause_pledge() -> anyhow::Result<()> {
    let h = harness().await?;
    let (_, session) = donor(&h, "Ada Obi", "ada@example.com").await?;
    let ledger = &h.ctx.ledger_service;

    let pledge = ledger.create_or_update_pledge(&session, 10000).await?;
    let paused = ledger.pause_pledge(&session, pledge.id).await?;
    assert_eq!(paused.status, PledgeStatus::Paused);
    assert_eq!(ledger.compute_current_cycle_status(session.donor_id).await?, CycleStatus::NoPledge);

    // Pausing again changes nothing.
    let again = ledger.pause_pledge(&session, pledge.id).await?;
    assert_eq!(again.updated_at, paused.updated_at);

    let resumed = ledger.create_or_update_pledge(&session, 10000).await?;
    assert_eq!(resumed.id, pledge.id);
    assert_eq!(resumed.status, PledgeStatus::Active);

    Ok(())
}

#[tokio::test]
async fn test_cancelled_pledge_cannot_be_paused() -> anyhow::Result<()> {
    let h = harness().await?;
    let (_, session) = donor(&h, "Ada Obi", "ada@example.com").await?;
    let ledger = &h.ctx.ledger_service;

    let pledge = ledger.create_or_update_pledge(&session, 10000).await?;
    ledger.pause_or_cancel_pledge(&session, pledge.id, true).await?;

    let err = ledger.pause_pledge(&session, pledge.id).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    Ok(())
}

#[tokio::test]
async fn test_other_donors_cannot_touch_a_pledge() -> anyhow::Result<()> {
    let h = harness().await?;
    let (_, owner) = donor(&h, "Ada Obi", "ada@example.com").await?;
    let (_, stranger) = donor(&h, "Bola Ade", "bola@example.com").await?;
    let (_, admin) = admin(&h).await?;
    let ledger = &h.ctx.ledger_service;

    let pledge = ledger.create_or_update_pledge(&owner, 10000).await?;

    let err = ledger.pause_or_cancel_pledge(&stranger, pledge.id, true).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    let err = ledger.pause_pledge(&stranger, pledge.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // A missing pledge looks the same as someone else's.
    let err = ledger
        .pause_or_cancel_pledge(&stranger, uuid::Uuid::new_v4(), true)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = ledger
        .pause_or_cancel_pledge(&admin, uuid::Uuid::new_v4(), true)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let cancelled = ledger.pause_or_cancel_pledge(&admin, pledge.id, true).await?;
    assert_eq!(cancelled.status, PledgeStatus::Cancelled);

    Ok(())
}

#[tokio::test]
async fn test_cycle_status_follows_donations() -> anyhow::Result<()> {
    let h = harness().await?;
    let (_, session) = donor(&h, "Ada Obi", "ada@example.com").await?;
    let ledger = &h.ctx.ledger_service;

    assert_eq!(ledger.compute_current_cycle_status(session.donor_id).await?, CycleStatus::NoPledge);

    ledger.create_or_update_pledge(&session, 10000).await?;
    assert_eq!(ledger.compute_current_cycle_status(session.donor_id).await?, CycleStatus::Unpaid);

    // Smaller gifts do not settle the month.
    ledger.record_donation(Some(&session), paid(4000)).await?;
    assert_eq!(ledger.compute_current_cycle_status(session.donor_id).await?, CycleStatus::Unpaid);

    ledger.record_donation(Some(&session), paid(10000)).await?;
    assert_eq!(ledger.compute_current_cycle_status(session.donor_id).await?, CycleStatus::Paid);

    // Last month's payment does not carry over.
    h.clock.set(Utc.with_ymd_and_hms(2026, 11, 2, 8, 0, 0).unwrap());
    assert_eq!(ledger.compute_current_cycle_status(session.donor_id).await?, CycleStatus::Unpaid);

    Ok(())
}

#[tokio::test]
async fn test_record_donation_leaves_pledges_untouched() -> anyhow::Result<()> {
    let h = harness().await?;
    let (_, session) = donor(&h, "Ada Obi", "ada@example.com").await?;
    let ledger = &h.ctx.ledger_service;

    ledger.create_or_update_pledge(&session, 10000).await?;
    let before = h.ctx.pledge_repo.list().await?;

    h.clock.advance(Duration::minutes(5));
    let donation = ledger
        .record_donation(
            Some(&session),
            RecordDonationRequest {
                amount: 10000,
                is_anonymous: false,
                message: Some("For the widows".to_string()),
                reference_id: Some("PAY-123".to_string()),
            },
        )
        .await?;

    assert_eq!(donation.user_id, Some(session.donor_id));
    assert_eq!(donation.reference_id, "PAY-123");
    assert_eq!(donation.created_at, h.clock.now());
    assert_eq!(h.ctx.pledge_repo.list().await?, before);
    assert_eq!(h.ctx.donation_repo.count().await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_gateway_issues_reference_when_missing() -> anyhow::Result<()> {
    let h = harness().await?;
    let ledger = &h.ctx.ledger_service;

    let first = ledger.record_donation(None, paid(2000)).await?;
    let second = ledger.record_donation(None, paid(2000)).await?;

    assert!(first.reference_id.starts_with("REF-"));
    assert_ne!(first.reference_id, second.reference_id);
    assert_eq!(first.user_id, None);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_reference_is_conflict() -> anyhow::Result<()> {
    let h = harness().await?;
    let ledger = &h.ctx.ledger_service;
    let request = RecordDonationRequest {
        amount: 5000,
        reference_id: Some("PAY-DUP".to_string()),
        ..Default::default()
    };

    ledger.record_donation(None, request.clone()).await?;
    let err = ledger.record_donation(None, request).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(h.ctx.donation_repo.count().await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_concurrent_pledges_leave_one_row() -> anyhow::Result<()> {
    let h = harness().await?;
    let (_, session) = donor(&h, "Ada Obi", "ada@example.com").await?;

    let mut handles = Vec::new();
    for amount in [5000, 10000, 25000, 7500, 5000, 10000] {
        let ctx = h.ctx.clone();
        handles.push(tokio::spawn(async move {
            ctx.ledger_service.create_or_update_pledge(&session, amount).await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await??.id);
    }
    ids.dedup();

    let pledges = h.ctx.pledge_repo.list().await?;
    assert_eq!(ids.len(), 1);
    assert_eq!(pledges.len(), 1);
    assert_eq!(pledges[0].status, PledgeStatus::Active);

    Ok(())
}

#[tokio::test]
async fn test_reconcile_advances_only_paid_pledges() -> anyhow::Result<()> {
    let h = harness().await?;
    let (_, payer) = donor(&h, "Ada Obi", "ada@example.com").await?;
    let (_, late) = donor(&h, "Bola Ade", "bola@example.com").await?;
    let ledger = &h.ctx.ledger_service;

    let payer_pledge = ledger.create_or_update_pledge(&payer, 10000).await?;
    let late_pledge = ledger.create_or_update_pledge(&late, 10000).await?;

    // Both pledges fall due on 5 November.
    h.clock.set(Utc.with_ymd_and_hms(2026, 11, 6, 12, 0, 0).unwrap());
    ledger.record_donation(Some(&payer), paid(10000)).await?;

    let advanced = ledger.reconcile_due_pledges().await?;
    assert_eq!(advanced.len(), 1);
    assert_eq!(advanced[0].id, payer_pledge.id);
    assert_eq!(
        advanced[0].next_payment_date,
        Utc.with_ymd_and_hms(2026, 12, 5, 10, 0, 0).unwrap()
    );

    let unchanged = h.ctx.pledge_repo.find_by_id(late_pledge.id).await?.unwrap();
    assert_eq!(unchanged.next_payment_date, late_pledge.next_payment_date);

    // The payer is next due in December; the late donor stays due but unpaid.
    assert!(ledger.reconcile_due_pledges().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_reconcile_skips_missed_cycle_then_keeps_up() -> anyhow::Result<()> {
    let h = harness().await?;
    let (_, session) = donor(&h, "Ada Obi", "ada@example.com").await?;
    let ledger = &h.ctx.ledger_service;

    // Due 5 November; nothing is paid in November.
    let pledge = ledger.create_or_update_pledge(&session, 10000).await?;

    let months = [(2026, 12), (2027, 1), (2027, 2), (2027, 3)];
    for (year, month) in months {
        h.clock.set(Utc.with_ymd_and_hms(year, month, 10, 9, 0, 0).unwrap());
        ledger.record_donation(Some(&session), paid(10000)).await?;

        let advanced = ledger.reconcile_due_pledges().await?;
        assert_eq!(advanced.len(), 1, "{}-{}", year, month);

        let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
        let stored = h.ctx.pledge_repo.find_by_id(pledge.id).await?.unwrap();
        assert_eq!(
            stored.next_payment_date,
            Utc.with_ymd_and_hms(next_year, next_month, 5, 10, 0, 0).unwrap(),
            "{}-{}",
            year,
            month
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_reconcile_leaves_open_unpaid_cycle_due() -> anyhow::Result<()> {
    let h = harness().await?;
    let (_, session) = donor(&h, "Ada Obi", "ada@example.com").await?;
    let ledger = &h.ctx.ledger_service;

    let pledge = ledger.create_or_update_pledge(&session, 10000).await?;

    // November closed unpaid; December is open and unpaid so far.
    h.clock.set(Utc.with_ymd_and_hms(2026, 12, 20, 9, 0, 0).unwrap());
    let advanced = ledger.reconcile_due_pledges().await?;
    assert_eq!(advanced.len(), 1);
    assert_eq!(
        advanced[0].next_payment_date,
        Utc.with_ymd_and_hms(2026, 12, 5, 10, 0, 0).unwrap()
    );
    assert_eq!(ledger.compute_current_cycle_status(session.donor_id).await?, CycleStatus::Unpaid);

    // Paying later in December settles it.
    ledger.record_donation(Some(&session), paid(10000)).await?;
    ledger.reconcile_due_pledges().await?;
    let stored = h.ctx.pledge_repo.find_by_id(pledge.id).await?.unwrap();
    assert_eq!(
        stored.next_payment_date,
        Utc.with_ymd_and_hms(2027, 1, 5, 10, 0, 0).unwrap()
    );

    Ok(())
}

#[tokio::test]
async fn test_reconcile_ignores_paused_and_cancelled_pledges() -> anyhow::Result<()> {
    let h = harness().await?;
    let (_, resting) = donor(&h, "Ada Obi", "ada@example.com").await?;
    let (_, gone) = donor(&h, "Bola Ade", "bola@example.com").await?;
    let ledger = &h.ctx.ledger_service;

    let paused = ledger.create_or_update_pledge(&resting, 10000).await?;
    let cancelled = ledger.create_or_update_pledge(&gone, 10000).await?;
    ledger.pause_pledge(&resting, paused.id).await?;
    ledger.pause_or_cancel_pledge(&gone, cancelled.id, true).await?;

    h.clock.set(Utc.with_ymd_and_hms(2026, 11, 6, 12, 0, 0).unwrap());
    ledger.record_donation(Some(&resting), paid(10000)).await?;
    ledger.record_donation(Some(&gone), paid(10000)).await?;

    h.clock.set(Utc.with_ymd_and_hms(2027, 2, 1, 0, 0, 0).unwrap());
    assert!(ledger.reconcile_due_pledges().await?.is_empty());

    for original in [&paused, &cancelled] {
        let stored = h.ctx.pledge_repo.find_by_id(original.id).await?.unwrap();
        assert_eq!(stored.next_payment_date, original.next_payment_date);
    }

    Ok(())
}

#[tokio::test]
async fn test_reconcile_clamps_to_month_end() -> anyhow::Result<()> {
    let h = harness().await?;
    h.clock.set(Utc.with_ymd_and_hms(2026, 12, 31, 10, 0, 0).unwrap());
    let (_, session) = donor(&h, "Ada Obi", "ada@example.com").await?;
    let ledger = &h.ctx.ledger_service;

    let pledge = ledger.create_or_update_pledge(&session, 5000).await?;
    assert_eq!(
        pledge.next_payment_date,
        Utc.with_ymd_and_hms(2027, 1, 31, 10, 0, 0).unwrap()
    );

    h.clock.set(Utc.with_ymd_and_hms(2027, 1, 31, 12, 0, 0).unwrap());
    ledger.record_donation(Some(&session), paid(5000)).await?;
    h.clock.set(Utc.with_ymd_and_hms(2027, 2, 1, 9, 0, 0).unwrap());
    let advanced = ledger.reconcile_due_pledges().await?;
    assert_eq!(
        advanced[0].next_payment_date,
        Utc.with_ymd_and_hms(2027, 2, 28, 10, 0, 0).unwrap()
    );

    h.clock.set(Utc.with_ymd_and_hms(2027, 2, 10, 9, 0, 0).unwrap());
    ledger.record_donation(Some(&session), paid(5000)).await?;
    h.clock.set(Utc.with_ymd_and_hms(2027, 3, 1, 9, 0, 0).unwrap());
    let advanced = ledger.reconcile_due_pledges().await?;
    assert_eq!(
        advanced[0].next_payment_date,
        Utc.with_ymd_and_hms(2027, 3, 28, 10, 0, 0).unwrap()
    );

    Ok(())
}

#[tokio::test]
async fn test_donate_monthly_requires_session() -> anyhow::Result<()> {
    let h = harness().await?;
    let request = DonateRequest {
        frequency: Frequency::Monthly,
        amount: 10000,
        first_name: "Ada".to_string(),
        last_name: "Obi".to_string(),
        email: "ada@example.com".to_string(),
        is_anonymous: false,
        confirm_update: false,
    };

    let err = h.ctx.ledger_service.donate(None, request.clone()).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    let (_, session) = donor(&h, "Ada Obi", "ada@example.com").await?;
    match h.ctx.ledger_service.donate(Some(&session), request).await? {
        DonateOutcome::Pledge(pledge) => assert_eq!(pledge.tier_name, "Hive Plan"),
        other => panic!("expected a pledge, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_donate_one_time() -> anyhow::Result<()> {
    let h = harness().await?;
    let request = DonateRequest {
        frequency: Frequency::OneTime,
        amount: 2500,
        first_name: " Ada ".to_string(),
        last_name: "Obi".to_string(),
        email: "ada@example.com".to_string(),
        is_anonymous: true,
        confirm_update: false,
    };

    match h.ctx.ledger_service.donate(None, request).await? {
        DonateOutcome::Donation(donation) => {
            assert_eq!(donation.amount, 2500);
            assert!(donation.is_anonymous);
            assert_eq!(donation.user_id, None);
            assert_eq!(donation.message.as_deref(), Some("Donation by Ada"));
        }
        other => panic!("expected a donation, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_donate_validates_form() -> anyhow::Result<()> {
    let h = harness().await?;
    let request = DonateRequest {
        frequency: Frequency::OneTime,
        amount: 2500,
        first_name: "   ".to_string(),
        last_name: "Obi".to_string(),
        email: "not-an-email".to_string(),
        is_anonymous: false,
        confirm_update: false,
    };

    let err = h.ctx.ledger_service.donate(None, request).await.unwrap_err();
    match err {
        AppError::Validation(msg) => {
            assert!(msg.contains("Please provide your full name."));
            assert!(msg.contains("Please provide a valid email address."));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(h.ctx.donation_repo.count().await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_dashboard() -> anyhow::Result<()> {
    let h = harness().await?;
    let (donor, session) = donor(&h, "Ada Obi", "ada@example.com").await?;
    let ledger = &h.ctx.ledger_service;

    ledger.create_or_update_pledge(&session, 5000).await?;
    ledger.record_donation(Some(&session), paid(3000)).await?;
    h.clock.advance(Duration::minutes(1));
    ledger.record_donation(Some(&session), paid(5000)).await?;

    let dashboard = ledger.dashboard(&session).await?;
    assert_eq!(dashboard.donor.id, donor.id);
    assert_eq!(dashboard.pledge.map(|p| p.amount), Some(5000));
    assert_eq!(dashboard.donations.len(), 2);
    assert_eq!(dashboard.donations[0].amount, 5000);
    assert_eq!(dashboard.current_cycle_status, CycleStatus::Paid);

    Ok(())
}

#[tokio::test]
async fn test_donate_monthly_asks_before_replacing_pledge() -> anyhow::Result<()> {
    let h = harness().await?;
    let (_, session) = donor(&h, "Ada Obi", "ada@example.com").await?;
    let ledger = &h.ctx.ledger_service;
    let mut request = DonateRequest {
        frequency: Frequency::Monthly,
        amount: 5000,
        first_name: "Ada".to_string(),
        last_name: "Obi".to_string(),
        email: "ada@example.com".to_string(),
        is_anonymous: false,
        confirm_update: false,
    };

    ledger.donate(Some(&session), request.clone()).await?;

    request.amount = 25000;
    let err = ledger.donate(Some(&session), request.clone()).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(msg) if msg.contains("already have an active pledge")));
    let stored = h.ctx.pledge_repo.find_active_by_donor(session.donor_id).await?.unwrap();
    assert_eq!(stored.amount, 5000);

    request.confirm_update = true;
    match ledger.donate(Some(&session), request).await? {
        DonateOutcome::Pledge(pledge) => {
            assert_eq!(pledge.id, stored.id);
            assert_eq!(pledge.amount, 25000);
            assert_eq!(pledge.tier_name, "Queen Plan");
        }
        other => panic!("expected a pledge, got {:?}", other),
    }

    Ok(())
}

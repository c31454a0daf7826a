// tests/integration/payment_event_tests.rs

use crate::common::app_helper::{setup_app, TestApp};
use crate::common::test_data::date;
use dusangire_backend::domain::referral_model::ReferralStatus;
use dusangire_backend::domain::vip_tier::VipTier;
use dusangire_backend::dto::referral_dto::ClaimReferralRequest;
use dusangire_backend::error::AppError;
use dusangire_backend::repository::loyalty_transaction_repository::LoyaltyTransactionRepository;
use dusangire_backend::service::payment_event_service::PaymentCompleted;
use dusangire_backend::service::referral_service::ReferralOutcome;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn payment(user_id: Uuid, amount: Decimal, completed_payment_count: u32) -> PaymentCompleted {
    PaymentCompleted {
        user_id,
        payment_id: Uuid::new_v4(),
        amount,
        description: "Meal subscription payment".to_string(),
        completed_payment_count,
        occurred_on: date(2026, 3, 1),
    }
}

/// 紹介者の招待を被紹介者が使った状態を作る
async fn claimed_referral(app: &TestApp) -> (Uuid, Uuid, Uuid) {
    let referrer_id = Uuid::new_v4();
    let referee_id = Uuid::new_v4();
    let invite = app.referrals.create_invite(referrer_id).await.unwrap();
    app.referrals
        .claim_referral(
            referee_id,
            ClaimReferralRequest {
                referral_code: invite.referral_code.clone(),
            },
        )
        .await
        .unwrap();
    (referrer_id, referee_id, invite.id)
}

#[tokio::test]
async fn test_first_large_payment_promotes_before_awarding() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();

    let outcome = app
        .payments
        .handle_payment_completed(payment(user_id, dec!(1000000), 1))
        .await
        .unwrap();

    assert!(!outcome.already_processed);
    let tier = outcome.tier.unwrap();
    assert_eq!(tier.previous, VipTier::Bronze);
    assert_eq!(tier.current, VipTier::Silver);
    // floor(1000000 / 100 * 1.05)
    assert_eq!(outcome.points_awarded, 10500);
    assert_eq!(outcome.referral, Some(ReferralOutcome::NoPendingReferral));

    let account = app.loyalty.get_account(user_id).await.unwrap().unwrap();
    assert_eq!(account.balance, 10500);
    assert_eq!(account.bonus_rate(), dec!(1.05));

    let titles = app.notifier.titles_for(user_id);
    assert!(titles.contains(&"VIP Tier Upgraded".to_string()));
    assert!(titles.contains(&"Points Earned".to_string()));
}

#[tokio::test]
async fn test_duplicate_payment_is_processed_once() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();
    let event = payment(user_id, dec!(300000), 1);

    let first = app
        .payments
        .handle_payment_completed(event.clone())
        .await
        .unwrap();
    let second = app.payments.handle_payment_completed(event).await.unwrap();

    assert_eq!(first.points_awarded, 3000);
    assert!(second.already_processed);
    assert_eq!(second.points_awarded, 0);

    let account = app.loyalty.get_account(user_id).await.unwrap().unwrap();
    assert_eq!(account.balance, 3000);
    let vip = app.vip.get_vip_status(user_id).await.unwrap().unwrap();
    assert_eq!(vip.spending_total, dec!(300000));
}

#[tokio::test]
async fn test_referral_bonus_is_awarded_exactly_once() {
    let app = setup_app().await;
    let (referrer_id, referee_id, referral_id) = claimed_referral(&app).await;

    let outcome = app
        .payments
        .handle_payment_completed(payment(referee_id, dec!(20000), 1))
        .await
        .unwrap();

    assert_eq!(
        outcome.referral,
        Some(ReferralOutcome::Completed {
            referral_id,
            referrer_id,
            bonus_points: 100,
        })
    );

    let referrer = app.loyalty.get_account(referrer_id).await.unwrap().unwrap();
    assert_eq!(referrer.balance, 100);
    assert!(app
        .notifier
        .titles_for(referrer_id)
        .contains(&"Referral Bonus".to_string()));

    let referrals = app.referrals.referrals_for(referrer_id).await.unwrap();
    assert_eq!(referrals[0].status(), Some(ReferralStatus::Completed));
    assert!(referrals[0].completed_at.is_some());

    let outcome = app
        .payments
        .handle_payment_completed(payment(referee_id, dec!(20000), 2))
        .await
        .unwrap();
    assert_eq!(outcome.referral, None);

    // 初回扱いのイベントが再度届いても保留中の紹介はもうない
    let outcome = app
        .payments
        .handle_payment_completed(payment(referee_id, dec!(20000), 1))
        .await
        .unwrap();
    assert_eq!(outcome.referral, Some(ReferralOutcome::NoPendingReferral));

    let referrer = app.loyalty.get_account(referrer_id).await.unwrap().unwrap();
    assert_eq!(referrer.balance, 100);
    let bonus_entries = LoyaltyTransactionRepository::find_all_by_user(&app.db, referrer_id)
        .await
        .unwrap();
    assert_eq!(bonus_entries.len(), 1);
}

#[tokio::test]
async fn test_negative_amount_is_rejected() {
    let app = setup_app().await;

    let result = app
        .payments
        .handle_payment_completed(payment(Uuid::new_v4(), dec!(-5), 1))
        .await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

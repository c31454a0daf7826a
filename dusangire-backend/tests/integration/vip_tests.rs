// tests/integration/vip_tests.rs

use crate::common::app_helper::setup_app;
use crate::common::test_data::date;
use dusangire_backend::domain::vip_tier::VipTier;
use dusangire_backend::error::AppError;
use rust_decimal_macros::dec;
use uuid::Uuid;

#[tokio::test]
async fn test_record_spending_promotes_and_updates_bonus_rate() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();
    let today = date(2026, 3, 1);

    let change = app
        .vip
        .record_spending(user_id, dec!(200000), today)
        .await
        .unwrap();
    assert_eq!(change.previous, VipTier::Bronze);
    assert_eq!(change.current, VipTier::Bronze);
    assert!(!change.promoted());

    let change = app
        .vip
        .record_spending(user_id, dec!(300000), date(2026, 3, 5))
        .await
        .unwrap();
    assert!(change.promoted());
    assert_eq!(change.current, VipTier::Silver);
    assert_eq!(change.bonus_rate, dec!(1.05));

    let vip = app.vip.get_vip_status(user_id).await.unwrap().unwrap();
    assert_eq!(vip.tier(), VipTier::Silver);
    assert_eq!(vip.spending_total, dec!(500000));
    assert_eq!(vip.achieved_at, date(2026, 3, 5));
    assert_eq!(vip.promotion_percentage.round_dp(2), dec!(5));

    let account = app.loyalty.get_account(user_id).await.unwrap().unwrap();
    assert_eq!(account.bonus_rate(), dec!(1.05));
}

#[tokio::test]
async fn test_large_payment_skips_intermediate_tiers() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();

    let change = app
        .vip
        .record_spending(user_id, dec!(5000000), date(2026, 3, 1))
        .await
        .unwrap();

    assert_eq!(change.previous, VipTier::Bronze);
    assert_eq!(change.current, VipTier::Platinum);
    assert_eq!(change.bonus_rate, dec!(1.15));

    let vip = app.vip.get_vip_status(user_id).await.unwrap().unwrap();
    assert_eq!(vip.next_tier_threshold(), None);
    assert_eq!(vip.progress_to_next_tier(), 100);
}

#[tokio::test]
async fn test_year_to_date_resets_but_tier_is_kept() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();

    app.vip
        .record_spending(user_id, dec!(2000000), date(2025, 12, 20))
        .await
        .unwrap();
    let change = app
        .vip
        .record_spending(user_id, dec!(10000), date(2026, 1, 3))
        .await
        .unwrap();

    assert_eq!(change.current, VipTier::Gold);
    assert!(!change.promoted());

    let vip = app.vip.get_vip_status(user_id).await.unwrap().unwrap();
    assert_eq!(vip.tier(), VipTier::Gold);
    assert_eq!(vip.spending_total, dec!(2010000));
    assert_eq!(vip.spending_ytd, dec!(10000));
    assert_eq!(vip.ytd_year, 2026);
}

#[tokio::test]
async fn test_negative_spending_is_rejected() {
    let app = setup_app().await;

    let result = app
        .vip
        .record_spending(Uuid::new_v4(), dec!(-1), date(2026, 3, 1))
        .await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

// tests/integration/checkout_tests.rs

use crate::common::app_helper::setup_app;
use crate::common::test_data::date;
use dusangire_backend::dto::checkout_dto::CheckoutQuoteRequest;
use dusangire_backend::dto::referral_dto::ClaimReferralRequest;
use dusangire_backend::error::AppError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn quote(subtotal: Decimal) -> CheckoutQuoteRequest {
    CheckoutQuoteRequest {
        subtotal,
        corporate_discount_percent: None,
        loyalty_points_to_redeem: 0,
        delivery_charge: dec!(1500),
    }
}

#[tokio::test]
async fn test_quote_for_new_user_has_no_discounts() {
    let app = setup_app().await;

    let result = app
        .checkout
        .quote_checkout(Uuid::new_v4(), quote(dec!(40000)))
        .await
        .unwrap();

    assert_eq!(result.vip_discount_percent, dec!(0));
    assert_eq!(result.referral_discount_percent, dec!(0));
    assert_eq!(result.pricing.total_discount, dec!(0));
    assert_eq!(result.pricing.grand_total, dec!(41500));
}

#[tokio::test]
async fn test_larger_corporate_discount_replaces_vip() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();
    app.vip
        .record_spending(user_id, dec!(2000000), date(2026, 3, 1))
        .await
        .unwrap();

    let mut request = quote(dec!(100000));
    request.corporate_discount_percent = Some(dec!(15));
    let result = app.checkout.quote_checkout(user_id, request).await.unwrap();

    assert_eq!(result.vip_discount_percent, dec!(10));
    assert_eq!(result.pricing.vip_amount, dec!(0));
    assert_eq!(result.pricing.corporate_amount, dec!(15000));
    assert_eq!(result.pricing.grand_total, dec!(86500));

    let mut request = quote(dec!(100000));
    request.corporate_discount_percent = Some(dec!(5));
    let result = app.checkout.quote_checkout(user_id, request).await.unwrap();
    assert_eq!(result.pricing.vip_amount, dec!(10000));
    assert_eq!(result.pricing.corporate_amount, dec!(0));
}

#[tokio::test]
async fn test_referral_discount_and_points_stack() {
    let app = setup_app().await;
    let referee_id = Uuid::new_v4();
    let invite = app.referrals.create_invite(Uuid::new_v4()).await.unwrap();
    app.referrals
        .claim_referral(
            referee_id,
            ClaimReferralRequest {
                referral_code: invite.referral_code,
            },
        )
        .await
        .unwrap();
    app.loyalty
        .adjust_points(referee_id, 200, "Welcome gift")
        .await
        .unwrap();

    let mut request = quote(dec!(50000));
    request.loyalty_points_to_redeem = 150;
    let result = app.checkout.quote_checkout(referee_id, request).await.unwrap();

    assert_eq!(result.referral_discount_percent, dec!(10));
    assert_eq!(result.loyalty_points_applied, 150);
    assert_eq!(result.pricing.referral_amount, dec!(5000));
    assert_eq!(result.pricing.loyalty_amount, dec!(15000));
    assert_eq!(result.pricing.total_discount, dec!(20000));
    assert_eq!(result.pricing.grand_total, dec!(31500));

    // 見積もりでは残高を変更しない
    let account = app.loyalty.get_account(referee_id).await.unwrap().unwrap();
    assert_eq!(account.balance, 200);
}

#[tokio::test]
async fn test_points_not_applied_when_balance_or_minimum_fails() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();
    app.loyalty.adjust_points(user_id, 120, "Gift").await.unwrap();

    let mut request = quote(dec!(50000));
    request.loyalty_points_to_redeem = 500;
    let result = app.checkout.quote_checkout(user_id, request).await.unwrap();
    assert_eq!(result.loyalty_points_applied, 0);
    assert_eq!(result.pricing.loyalty_amount, dec!(0));

    let mut request = quote(dec!(50000));
    request.loyalty_points_to_redeem = 50;
    let result = app.checkout.quote_checkout(user_id, request).await.unwrap();
    assert_eq!(result.loyalty_points_applied, 0);
}

#[tokio::test]
async fn test_discount_never_exceeds_subtotal() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();
    app.loyalty
        .adjust_points(user_id, 1000, "Gift")
        .await
        .unwrap();

    let mut request = quote(dec!(20000));
    request.loyalty_points_to_redeem = 1000;
    let result = app.checkout.quote_checkout(user_id, request).await.unwrap();

    assert_eq!(result.pricing.total_discount, dec!(20000));
    assert_eq!(result.pricing.discounted_subtotal(), dec!(0));
    assert_eq!(result.pricing.grand_total, dec!(1500));
}

#[tokio::test]
async fn test_invalid_quote_request() {
    let app = setup_app().await;

    let mut request = quote(dec!(20000));
    request.corporate_discount_percent = Some(dec!(150));
    let result = app.checkout.quote_checkout(Uuid::new_v4(), request).await;

    assert!(matches!(result, Err(AppError::ValidationFailure(_))));
}

#[tokio::test]
async fn test_place_order_redemption() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();
    let order_id = Uuid::new_v4();
    app.loyalty.adjust_points(user_id, 300, "Gift").await.unwrap();

    let entry = app
        .checkout
        .place_order_redemption(user_id, 200, order_id)
        .await
        .unwrap();
    assert_eq!(entry.related_order_id, Some(order_id));
    assert_eq!(entry.balance_after, 100);

    let result = app
        .checkout
        .place_order_redemption(user_id, 200, Uuid::new_v4())
        .await;
    assert!(matches!(result, Err(AppError::InsufficientBalance { .. })));
}

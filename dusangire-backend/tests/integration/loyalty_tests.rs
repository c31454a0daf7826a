// tests/integration/loyalty_tests.rs

use crate::common::app_helper::setup_app;
use crate::common::test_data::date;
use dusangire_backend::domain::loyalty_transaction_model::{RelatedRef, TransactionType};
use dusangire_backend::domain::vip_tier::VipTier;
use dusangire_backend::dto::loyalty_dto::TransactionHistoryQuery;
use dusangire_backend::error::AppError;
use dusangire_backend::repository::loyalty_transaction_repository::LoyaltyTransactionRepository;
use rust_decimal_macros::dec;
use uuid::Uuid;

#[tokio::test]
async fn test_award_points_applies_bonus_rate() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();
    let payment_id = Uuid::new_v4();

    let points = app
        .loyalty
        .award_points(
            user_id,
            dec!(250000),
            dec!(1.10),
            "Meal order",
            RelatedRef::payment(payment_id),
        )
        .await
        .unwrap();

    // floor(250000 / 100 * 1.10)
    assert_eq!(points, 2750);

    let account = app.loyalty.get_account(user_id).await.unwrap().unwrap();
    assert_eq!(account.balance, 2750);
    assert_eq!(account.earned_total, 2750);
    assert_eq!(account.redeemed_total, 0);
    assert!(account.is_consistent());
    assert!(app.loyalty.has_award_for_payment(payment_id).await.unwrap());

    let entries = LoyaltyTransactionRepository::find_all_by_user(&app.db, user_id)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].transaction_type, TransactionType::Earn.as_str());
    assert_eq!(entries[0].balance_before, 0);
    assert_eq!(entries[0].balance_after, 2750);
    assert_eq!(entries[0].related_payment_id, Some(payment_id));
}

#[tokio::test]
async fn test_award_points_below_one_point_writes_nothing() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();

    let points = app
        .loyalty
        .award_points(user_id, dec!(99), dec!(1.0), "Snack", RelatedRef::default())
        .await
        .unwrap();

    assert_eq!(points, 0);
    let entries = LoyaltyTransactionRepository::find_all_by_user(&app.db, user_id)
        .await
        .unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_award_points_rejects_rate_below_one() {
    let app = setup_app().await;

    let result = app
        .loyalty
        .award_points(
            Uuid::new_v4(),
            dec!(10000),
            dec!(0.5),
            "Order",
            RelatedRef::default(),
        )
        .await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[tokio::test]
async fn test_redeem_insufficient_balance_leaves_state_untouched() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();
    app.loyalty
        .adjust_points(user_id, 150, "Welcome gift")
        .await
        .unwrap();

    let result = app
        .loyalty
        .redeem_points(user_id, 200, "Order discount", RelatedRef::default())
        .await;

    match result {
        Err(AppError::InsufficientBalance {
            requested,
            available,
        }) => {
            assert_eq!(requested, 200);
            assert_eq!(available, 150);
        }
        other => panic!("Expected InsufficientBalance, got {:?}", other),
    }

    let account = app.loyalty.get_account(user_id).await.unwrap().unwrap();
    assert_eq!(account.balance, 150);
    assert_eq!(account.redeemed_total, 0);

    let entries = LoyaltyTransactionRepository::find_all_by_user(&app.db, user_id)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_redeem_without_account_is_insufficient() {
    let app = setup_app().await;

    let result = app
        .loyalty
        .redeem_points(Uuid::new_v4(), 100, "Order", RelatedRef::default())
        .await;

    assert!(matches!(
        result,
        Err(AppError::InsufficientBalance { available: 0, .. })
    ));
}

#[tokio::test]
async fn test_redeem_below_minimum_is_rejected() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();
    app.loyalty.adjust_points(user_id, 500, "Gift").await.unwrap();

    let result = app
        .loyalty
        .redeem_points(user_id, 99, "Order", RelatedRef::default())
        .await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));
    let account = app.loyalty.get_account(user_id).await.unwrap().unwrap();
    assert_eq!(account.balance, 500);
}

#[tokio::test]
async fn test_redeem_success_updates_totals() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();
    let order_id = Uuid::new_v4();
    app.loyalty.adjust_points(user_id, 400, "Gift").await.unwrap();

    let entry = app
        .loyalty
        .redeem_points(user_id, 300, "Order discount", RelatedRef::order(order_id))
        .await
        .unwrap();

    assert_eq!(entry.points_amount, -300);
    assert_eq!(entry.balance_before, 400);
    assert_eq!(entry.balance_after, 100);
    assert_eq!(entry.related_order_id, Some(order_id));

    let account = app.loyalty.get_account(user_id).await.unwrap().unwrap();
    assert_eq!(account.balance, 100);
    assert_eq!(account.earned_total, 400);
    assert_eq!(account.redeemed_total, 300);
    assert!(account.is_consistent());
}

#[tokio::test]
async fn test_negative_adjustment_cannot_overdraw() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();
    app.loyalty.adjust_points(user_id, 50, "Gift").await.unwrap();

    let result = app.loyalty.adjust_points(user_id, -80, "Correction").await;
    assert!(matches!(result, Err(AppError::InsufficientBalance { .. })));

    let entry = app
        .loyalty
        .adjust_points(user_id, -30, "Correction")
        .await
        .unwrap();
    assert_eq!(entry.transaction_type, TransactionType::Adjustment.as_str());
    assert_eq!(entry.balance_after, 20);

    let result = app.loyalty.adjust_points(user_id, 0, "Noop").await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[tokio::test]
async fn test_ledger_entries_sum_to_balance() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();

    app.loyalty
        .award_points(user_id, dec!(120000), dec!(1.0), "Order 1", RelatedRef::default())
        .await
        .unwrap();
    app.loyalty
        .redeem_points(user_id, 500, "Order 2", RelatedRef::default())
        .await
        .unwrap();
    app.loyalty
        .award_points(user_id, dec!(30000), dec!(1.05), "Order 3", RelatedRef::default())
        .await
        .unwrap();
    app.loyalty
        .adjust_points(user_id, -100, "Correction")
        .await
        .unwrap();

    let account = app.loyalty.get_account(user_id).await.unwrap().unwrap();
    let entries = LoyaltyTransactionRepository::find_all_by_user(&app.db, user_id)
        .await
        .unwrap();

    assert_eq!(entries.len(), 4);
    for entry in &entries {
        assert_eq!(entry.balance_after, entry.balance_before + entry.points_amount);
        assert!(entry.balance_after >= 0);
    }
    let sum: i64 = entries.iter().map(|e| e.points_amount).sum();
    assert_eq!(sum, account.balance);
    // 1200 - 500 + 315 - 100
    assert_eq!(account.balance, 915);
    assert!(account.is_consistent());
}

#[tokio::test]
async fn test_ledger_is_returned_in_posting_order() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();
    for i in 1..=30 {
        let points = if i % 3 == 0 { -5 } else { 7 * i };
        app.loyalty.adjust_points(user_id, points, "Gift").await.unwrap();
    }

    let account = app.loyalty.get_account(user_id).await.unwrap().unwrap();
    let entries = LoyaltyTransactionRepository::find_all_by_user(&app.db, user_id)
        .await
        .unwrap();

    // 同一時刻に記帳されても残高の連鎖どおりに並ぶ
    assert_eq!(entries.len(), 30);
    assert_eq!(entries[0].balance_before, 0);
    for pair in entries.windows(2) {
        assert_eq!(pair[1].balance_before, pair[0].balance_after);
    }
    assert_eq!(entries[29].balance_after, account.balance);

    let history = app
        .loyalty
        .transaction_history(user_id, TransactionHistoryQuery::default())
        .await
        .unwrap();
    assert_eq!(history.items[0].balance_after, account.balance);
    for pair in history.items.windows(2) {
        assert_eq!(pair[0].balance_before, pair[1].balance_after);
    }
}

#[tokio::test]
async fn test_status_defaults_to_bronze() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();

    let status = app
        .loyalty
        .get_status(user_id, date(2026, 3, 1))
        .await
        .unwrap();

    assert_eq!(status.balance, 0);
    assert_eq!(status.tier, VipTier::Bronze);
    assert_eq!(status.bonus_rate, dec!(1.00));
    assert_eq!(status.next_tier_threshold, Some(dec!(500000)));
    assert_eq!(status.progress_to_next_tier, 0);
}

#[tokio::test]
async fn test_transaction_history_pagination() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();
    for i in 1..=5 {
        app.loyalty
            .adjust_points(user_id, 10 * i, "Gift")
            .await
            .unwrap();
    }

    let history = app
        .loyalty
        .transaction_history(
            user_id,
            TransactionHistoryQuery {
                page: 1,
                page_size: 2,
            },
        )
        .await
        .unwrap();

    assert_eq!(history.total_items, 5);
    assert_eq!(history.total_pages, 3);
    assert_eq!(history.items.len(), 2);

    let last_page = app
        .loyalty
        .transaction_history(
            user_id,
            TransactionHistoryQuery {
                page: 3,
                page_size: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(last_page.items.len(), 1);

    let invalid = app
        .loyalty
        .transaction_history(
            user_id,
            TransactionHistoryQuery {
                page: 0,
                page_size: 2,
            },
        )
        .await;
    assert!(matches!(invalid, Err(AppError::ValidationFailure(_))));
}

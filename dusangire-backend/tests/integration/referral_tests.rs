// tests/integration/referral_tests.rs

use crate::common::app_helper::setup_app;
use dusangire_backend::domain::referral_model::ReferralStatus;
use dusangire_backend::dto::referral_dto::{ClaimReferralRequest, ReferralInviteResponse};
use dusangire_backend::error::AppError;
use dusangire_backend::service::referral_service::ReferralOutcome;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn claim(code: &str) -> ClaimReferralRequest {
    ClaimReferralRequest {
        referral_code: code.to_string(),
    }
}

#[tokio::test]
async fn test_create_invite_uses_configured_defaults() {
    let app = setup_app().await;
    let referrer_id = Uuid::new_v4();

    let invite = app.referrals.create_invite(referrer_id).await.unwrap();

    assert_eq!(invite.referral_code.len(), 8);
    assert_eq!(invite.referral_code, invite.referral_code.to_uppercase());
    assert_eq!(
        invite.referral_link,
        format!(
            "http://localhost:3001/accounts/signup?ref={}",
            invite.referral_code
        )
    );
    assert_eq!(invite.status(), Some(ReferralStatus::Pending));
    assert_eq!(invite.referrer_bonus_points, 100);
    assert_eq!(invite.referee_discount(), dec!(10));
    assert!(invite.referee_id.is_none());

    let response = ReferralInviteResponse::from(invite);
    assert_eq!(response.status, "pending");
}

#[tokio::test]
async fn test_claim_links_referee_and_exposes_discount() {
    let app = setup_app().await;
    let referee_id = Uuid::new_v4();
    let invite = app.referrals.create_invite(Uuid::new_v4()).await.unwrap();

    let claimed = app
        .referrals
        .claim_referral(referee_id, claim(&invite.referral_code))
        .await
        .unwrap();

    assert_eq!(claimed.referee_id, Some(referee_id));
    assert!(claimed.claimed_at.is_some());
    assert_eq!(
        app.referrals
            .pending_referee_discount(referee_id)
            .await
            .unwrap(),
        Some(dec!(10))
    );
    let pending = app
        .referrals
        .require_pending_referral(referee_id)
        .await
        .unwrap();
    assert_eq!(pending.id, invite.id);
}

#[tokio::test]
async fn test_claim_rejections() {
    let app = setup_app().await;
    let referrer_id = Uuid::new_v4();
    let referee_id = Uuid::new_v4();
    let invite = app.referrals.create_invite(referrer_id).await.unwrap();
    let other_invite = app.referrals.create_invite(Uuid::new_v4()).await.unwrap();

    let own = app
        .referrals
        .claim_referral(referrer_id, claim(&invite.referral_code))
        .await;
    assert!(matches!(own, Err(AppError::ValidationError(_))));

    let unknown = app.referrals.claim_referral(referee_id, claim("ZZZZ9999")).await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));

    let malformed = app.referrals.claim_referral(referee_id, claim("bad")).await;
    assert!(matches!(malformed, Err(AppError::ValidationFailure(_))));

    app.referrals
        .claim_referral(referee_id, claim(&invite.referral_code))
        .await
        .unwrap();

    let reused = app
        .referrals
        .claim_referral(Uuid::new_v4(), claim(&invite.referral_code))
        .await;
    assert!(matches!(reused, Err(AppError::Conflict(_))));

    let second = app
        .referrals
        .claim_referral(referee_id, claim(&other_invite.referral_code))
        .await;
    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_complete_without_pending_referral_is_benign() {
    let app = setup_app().await;
    let referee_id = Uuid::new_v4();

    let outcome = app.referrals.complete_referral(referee_id).await.unwrap();
    assert_eq!(outcome, ReferralOutcome::NoPendingReferral);

    let required = app.referrals.require_pending_referral(referee_id).await;
    assert!(matches!(required, Err(AppError::NoPendingReferral)));
    assert_eq!(
        app.referrals
            .pending_referee_discount(referee_id)
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn test_complete_then_complete_again() {
    let app = setup_app().await;
    let referrer_id = Uuid::new_v4();
    let referee_id = Uuid::new_v4();
    let invite = app.referrals.create_invite(referrer_id).await.unwrap();
    app.referrals
        .claim_referral(referee_id, claim(&invite.referral_code))
        .await
        .unwrap();

    let first = app.referrals.complete_referral(referee_id).await.unwrap();
    assert!(matches!(
        first,
        ReferralOutcome::Completed {
            bonus_points: 100,
            ..
        }
    ));

    let second = app.referrals.complete_referral(referee_id).await.unwrap();
    assert_eq!(second, ReferralOutcome::NoPendingReferral);

    let account = app.loyalty.get_account(referrer_id).await.unwrap().unwrap();
    assert_eq!(account.balance, 100);
}

#[tokio::test]
async fn test_cancel_referral() {
    let app = setup_app().await;
    let referee_id = Uuid::new_v4();
    let invite = app.referrals.create_invite(Uuid::new_v4()).await.unwrap();
    app.referrals
        .claim_referral(referee_id, claim(&invite.referral_code))
        .await
        .unwrap();

    let cancelled = app.referrals.cancel_referral(invite.id).await.unwrap();
    assert_eq!(cancelled.status(), Some(ReferralStatus::Cancelled));

    assert_eq!(
        app.referrals.complete_referral(referee_id).await.unwrap(),
        ReferralOutcome::NoPendingReferral
    );

    let again = app.referrals.cancel_referral(invite.id).await;
    assert!(matches!(again, Err(AppError::InvalidState(_))));
}

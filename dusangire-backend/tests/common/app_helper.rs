// tests/common/app_helper.rs

use super::db::TestDatabase;
use super::fakes::{ChargeBehavior, RecordingNotifier, ScriptedGateway};
use super::init_test_env;
use dusangire_backend::config::AppConfig;
use dusangire_backend::service::auto_renewal_service::AutoRenewalService;
use dusangire_backend::service::checkout_service::CheckoutService;
use dusangire_backend::service::loyalty_service::LoyaltyService;
use dusangire_backend::service::payment_event_service::PaymentEventService;
use dusangire_backend::service::referral_service::ReferralService;
use dusangire_backend::service::subscription_service::SubscriptionService;
use dusangire_backend::service::vip_service::VipService;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// 全サービスをテスト用の依存で組み立てたもの
pub struct TestApp {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub gateway: Arc<ScriptedGateway>,
    pub notifier: Arc<RecordingNotifier>,
    pub loyalty: LoyaltyService,
    pub vip: VipService,
    pub referrals: ReferralService,
    pub checkout: CheckoutService,
    pub subscriptions: SubscriptionService,
    pub renewals: AutoRenewalService,
    pub payments: PaymentEventService,
}

pub async fn setup_app() -> TestApp {
    setup_app_with(AppConfig::for_testing()).await
}

pub async fn setup_app_with(config: AppConfig) -> TestApp {
    init_test_env();

    let db = TestDatabase::new().await.connection;
    let gateway = Arc::new(ScriptedGateway::new(ChargeBehavior::Approve));
    let notifier = Arc::new(RecordingNotifier::default());

    TestApp {
        loyalty: LoyaltyService::new(db.clone()),
        vip: VipService::new(db.clone()),
        referrals: ReferralService::new(db.clone(), &config),
        checkout: CheckoutService::new(db.clone()),
        subscriptions: SubscriptionService::new(db.clone(), notifier.clone(), &config),
        renewals: AutoRenewalService::new(
            db.clone(),
            gateway.clone(),
            notifier.clone(),
            &config,
        ),
        payments: PaymentEventService::new(db.clone(), notifier.clone()),
        db,
        config,
        gateway,
        notifier,
    }
}

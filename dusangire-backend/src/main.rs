// src/main.rs
use chrono::{NaiveDate, Utc};
use dusangire_backend::config::{Config, StripeConfig};
use dusangire_backend::db::{create_db_pool, run_migrations};
use dusangire_backend::infrastructure::{DatabaseNotifier, Notifier, StripePaymentGateway};
use dusangire_backend::logging::init_tracing;
use dusangire_backend::service::auto_renewal_service::AutoRenewalService;
use dusangire_backend::service::subscription_service::SubscriptionService;
use serde_json::json;
use std::env;
use std::sync::Arc;

/// 日次メンテナンスジョブ
///
/// 引数で処理日（YYYY-MM-DD）を指定できる。省略時は UTC の今日。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let today = match env::args().nth(1) {
        Some(arg) => NaiveDate::parse_from_str(&arg, "%Y-%m-%d")?,
        None => Utc::now().date_naive(),
    };

    tracing::info!(%today, "Starting Dusangire daily maintenance job");

    // 設定を読み込む
    let app_config = Config::from_env()?;
    let stripe_config = StripeConfig::from_env()?;
    tracing::info!(
        environment = %app_config.environment,
        payment_test_mode = stripe_config.is_test_mode(),
        "Configuration loaded"
    );

    let db_pool = create_db_pool(&app_config).await?;
    tracing::info!("Database pool created successfully.");

    if app_config.run_migrations {
        run_migrations(&db_pool).await?;
        tracing::info!("Migrations applied");
    }

    let notifier: Arc<dyn Notifier> = Arc::new(DatabaseNotifier::new(db_pool.clone()));
    let gateway = Arc::new(StripePaymentGateway::new(stripe_config));

    let subscription_service =
        SubscriptionService::new(db_pool.clone(), notifier.clone(), &app_config);
    let renewal_service = AutoRenewalService::new(db_pool, gateway, notifier, &app_config);

    // 更新を先に行い、更新できなかった契約だけを期限切れにする
    let resumed = subscription_service.resume_due_paused(today).await?;
    let renewals = renewal_service.process_due_renewals(today).await?;
    let expired = subscription_service.expire_overdue(today).await?;

    let report = json!({
        "date": today,
        "expired": expired,
        "resumed": resumed,
        "renewals": renewals,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

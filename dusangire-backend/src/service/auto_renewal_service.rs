// src/service/auto_renewal_service.rs

use crate::config::{AppConfig, RenewalConfig};
use crate::db::DbPool;
use crate::domain::auto_renewal_model::{
    self, retry_at_after, ActiveModel as AutoRenewalActiveModel, RenewalStatus,
};
use crate::domain::notification_model::NotificationKind;
use crate::domain::subscription_model::{self, ActiveModel as SubscriptionActiveModel};
use crate::dto::subscription_dto::RenewalRunSummary;
use crate::error::{AppError, AppResult};
use crate::infrastructure::notification::Notifier;
use crate::infrastructure::payment_gateway::{ChargeRequest, PaymentGateway};
use crate::log_with_context;
use crate::repository::auto_renewal_repository::AutoRenewalRepository;
use crate::repository::subscription_plan_repository::SubscriptionPlanRepository;
use crate::repository::subscription_repository::SubscriptionRepository;
use crate::service::subscription_service::SubscriptionService;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DbErr, Set, TransactionTrait};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

/// 1件の更新処理の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemOutcome {
    Renewed,
    /// リトライ上限に達し自動更新を停止した
    Disabled,
    Retried,
    /// 取得後に対象外になっていた
    NotDue,
}

/// 成功時の次回更新日（当日以前にはしない）
pub fn next_renewal_date(current: NaiveDate, interval_days: i32, today: NaiveDate) -> NaiveDate {
    let interval = Duration::days(i64::from(interval_days.max(1)));
    let next = current + interval;
    if next <= today {
        today + interval
    } else {
        next
    }
}

/// 処理権の取得結果を判定する（取得時のエラーはその行だけを対象外にする）
fn claim_acquired(renewal_id: Uuid, result: Result<bool, DbErr>) -> bool {
    match result {
        Ok(acquired) => acquired,
        Err(e) => {
            error!(renewal_id = %renewal_id, error = %e, "Failed to claim renewal");
            false
        }
    }
}

/// 日次の自動更新バッチ
#[derive(Clone)]
pub struct AutoRenewalService {
    db: DbPool,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
    config: RenewalConfig,
}

impl AutoRenewalService {
    pub fn new(
        db: DbPool,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
        config: &AppConfig,
    ) -> Self {
        Self {
            db,
            gateway,
            notifier,
            config: config.renewal.clone(),
        }
    }

    /// 更新日が到来した契約を処理する
    ///
    /// 各契約は独立して処理し、1件の失敗がバッチ全体を止めることはない。
    /// 締め切りを過ぎた後の契約は着手せず、次回の実行に持ち越す。
    pub async fn process_due_renewals(&self, today: NaiveDate) -> AppResult<RenewalRunSummary> {
        let started = Instant::now();
        let lease = Duration::from_std(self.config.claim_lease)
            .map_err(|e| AppError::InternalServerError(format!("Invalid claim lease: {}", e)))?;

        let due = AutoRenewalRepository::find_due(&self.db, today).await?;
        let mut summary = RenewalRunSummary::default();

        for renewal in due {
            if started.elapsed() >= self.config.batch_deadline {
                summary.deferred += 1;
                continue;
            }

            // リトライ上限の行はバックオフに関係なく停止処理の対象
            if !renewal.retries_exhausted() && renewal.is_backing_off(today) {
                continue;
            }

            let claim = AutoRenewalRepository::try_claim(&self.db, renewal.id, Utc::now(), lease).await;
            if !claim_acquired(renewal.id, claim) {
                summary.skipped += 1;
                continue;
            }

            let outcome = self.process_claimed(renewal.id, today).await;

            if let Err(e) = AutoRenewalRepository::release_claim(&self.db, renewal.id).await {
                warn!(renewal_id = %renewal.id, error = %e, "Failed to release renewal claim");
            }

            match outcome {
                Ok(ItemOutcome::Renewed) => {
                    summary.processed += 1;
                    summary.success += 1;
                }
                Ok(ItemOutcome::Disabled) => {
                    summary.processed += 1;
                    summary.failed += 1;
                }
                Ok(ItemOutcome::Retried) => {
                    summary.processed += 1;
                    summary.retried += 1;
                }
                Ok(ItemOutcome::NotDue) => summary.skipped += 1,
                Err(e) => {
                    error!(
                        renewal_id = %renewal.id,
                        subscription_id = %renewal.subscription_id,
                        error = %e,
                        "Renewal processing aborted"
                    );
                    summary.skipped += 1;
                }
            }
        }

        info!(
            processed = summary.processed,
            success = summary.success,
            failed = summary.failed,
            retried = summary.retried,
            deferred = summary.deferred,
            skipped = summary.skipped,
            "Auto-renewal run finished"
        );

        Ok(summary)
    }

    async fn process_claimed(&self, renewal_id: Uuid, today: NaiveDate) -> AppResult<ItemOutcome> {
        let Some(renewal) = AutoRenewalRepository::find_by_id(&self.db, renewal_id).await? else {
            return Ok(ItemOutcome::NotDue);
        };
        let Some(subscription) =
            SubscriptionRepository::find_by_id(&self.db, renewal.subscription_id).await?
        else {
            return Ok(ItemOutcome::NotDue);
        };

        if !renewal.auto_renew_enabled || !subscription.is_active() {
            return Ok(ItemOutcome::NotDue);
        }

        // 前回の実行で課金済みなら延長のみ反映する
        if renewal.is_cycle_charged() {
            warn!(
                subscription_id = %subscription.id,
                renewal_date = %renewal.renewal_date,
                "Applying previously charged renewal without charging again"
            );
            self.apply_success(renewal.id, &subscription, today).await?;
            return Ok(ItemOutcome::Renewed);
        }

        if renewal.retries_exhausted() {
            self.disable_exhausted(renewal, &subscription).await?;
            return Ok(ItemOutcome::Disabled);
        }

        if renewal.renewal_date > today {
            return Ok(ItemOutcome::NotDue);
        }

        let plan = SubscriptionPlanRepository::find_by_id(&self.db, subscription.plan_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription plan not found".to_string()))?;

        match self.charge(&renewal, plan.price).await {
            Ok(()) => {
                // 延長の反映より先に課金済みの更新日を記録する
                if let Err(e) =
                    AutoRenewalRepository::mark_cycle_charged(&self.db, renewal.id, renewal.renewal_date)
                        .await
                {
                    error!(
                        renewal_id = %renewal.id,
                        error = %e,
                        "Failed to record renewal charge"
                    );
                }

                if let Err(e) = self.apply_success(renewal.id, &subscription, today).await {
                    error!(
                        subscription_id = %subscription.id,
                        renewal_date = %renewal.renewal_date,
                        error = %e,
                        "Renewal charged but the extension was not applied"
                    );
                    return Err(e);
                }
                Ok(ItemOutcome::Renewed)
            }
            Err(e) => {
                warn!(
                    subscription_id = %subscription.id,
                    failure_count = renewal.failure_count + 1,
                    error = %e,
                    "Renewal charge failed"
                );
                self.apply_failure(renewal.id, &subscription, today).await
            }
        }
    }

    /// 保存済みの支払い方法で1期間分を課金する
    async fn charge(&self, renewal: &auto_renewal_model::Model, amount: Decimal) -> AppResult<()> {
        let Some(payment_method_id) = renewal.payment_method_id.clone() else {
            return Err(AppError::PaymentChargeFailure(
                "No payment method on file".to_string(),
            ));
        };

        let request = ChargeRequest {
            payment_method_id,
            customer_id: renewal.stripe_customer_id.clone(),
            amount,
            idempotency_key: renewal.charge_idempotency_key(),
        };

        match tokio::time::timeout(self.config.charge_timeout, self.gateway.charge(request)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::PaymentChargeFailure(format!(
                "Charge timed out after {}s",
                self.config.charge_timeout.as_secs_f32()
            ))),
        }
    }

    async fn apply_success(
        &self,
        renewal_id: Uuid,
        subscription: &subscription_model::Model,
        today: NaiveDate,
    ) -> AppResult<()> {
        let txn = self.db.begin().await?;

        let renewal = AutoRenewalRepository::find_by_id_for_update(&txn, renewal_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Auto-renewal settings not found".to_string()))?;
        let extended = SubscriptionService::extend_paid_cycle_in(&txn, subscription.id).await?;

        let renewal_date =
            next_renewal_date(renewal.renewal_date, renewal.renewal_interval_days, today);

        let mut active_model: AutoRenewalActiveModel = renewal.into();
        active_model.last_renewal_at = Set(Some(Utc::now()));
        active_model.last_renewal_status = Set(Some(RenewalStatus::Success.as_str().to_string()));
        active_model.renewal_date = Set(renewal_date);
        active_model.failure_count = Set(0);
        active_model.next_retry_at = Set(None);
        active_model.charged_cycle_date = Set(None);
        AutoRenewalRepository::update(&txn, active_model).await?;

        txn.commit().await?;

        let Some(renewed) = extended else {
            log_with_context!(
                tracing::Level::ERROR,
                "Renewal charged for a subscription that has already ended",
                "subscription_id" => subscription.id,
                "user_id" => subscription.user_id,
                "status" => &subscription.status
            );
            return Ok(());
        };

        log_with_context!(
            tracing::Level::INFO,
            "Subscription auto-renewed",
            "subscription_id" => subscription.id,
            "status" => &renewed.status,
            "end_date" => renewed.end_date,
            "next_renewal_date" => renewal_date
        );

        self.notifier
            .notify(
                subscription.user_id,
                NotificationKind::Subscription,
                "Subscription Renewed",
                &format!("Your subscription now runs until {}.", renewed.end_date),
            )
            .await;

        Ok(())
    }

    async fn apply_failure(
        &self,
        renewal_id: Uuid,
        subscription: &subscription_model::Model,
        today: NaiveDate,
    ) -> AppResult<ItemOutcome> {
        let txn = self.db.begin().await?;

        let renewal = AutoRenewalRepository::find_by_id_for_update(&txn, renewal_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Auto-renewal settings not found".to_string()))?;

        let failure_count = renewal.failure_count + 1;
        let exhausted = failure_count >= renewal.max_retries;

        let mut active_model: AutoRenewalActiveModel = renewal.into();
        active_model.failure_count = Set(failure_count);
        active_model.last_renewal_status = Set(Some(RenewalStatus::Failed.as_str().to_string()));
        active_model.next_retry_at = Set(Some(retry_at_after(today)));
        if exhausted {
            active_model.auto_renew_enabled = Set(false);
        }
        AutoRenewalRepository::update(&txn, active_model).await?;

        if exhausted {
            Self::mirror_disabled(&txn, subscription).await?;
        }

        txn.commit().await?;

        if exhausted {
            self.report_exhausted(subscription, failure_count).await;
            return Ok(ItemOutcome::Disabled);
        }

        Ok(ItemOutcome::Retried)
    }

    /// リトライ上限に達した設定を停止する（課金は行わない）
    async fn disable_exhausted(
        &self,
        renewal: auto_renewal_model::Model,
        subscription: &subscription_model::Model,
    ) -> AppResult<()> {
        let txn = self.db.begin().await?;

        let renewal = AutoRenewalRepository::find_by_id_for_update(&txn, renewal.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Auto-renewal settings not found".to_string()))?;
        let failure_count = renewal.failure_count;

        let mut active_model: AutoRenewalActiveModel = renewal.into();
        active_model.auto_renew_enabled = Set(false);
        active_model.last_renewal_status = Set(Some(RenewalStatus::Failed.as_str().to_string()));
        AutoRenewalRepository::update(&txn, active_model).await?;
        Self::mirror_disabled(&txn, subscription).await?;

        txn.commit().await?;

        self.report_exhausted(subscription, failure_count).await;
        Ok(())
    }

    async fn mirror_disabled<C: ConnectionTrait>(
        db: &C,
        subscription: &subscription_model::Model,
    ) -> AppResult<()> {
        if let Some(current) = SubscriptionRepository::find_by_id_for_update(db, subscription.id).await? {
            let mut active_model: SubscriptionActiveModel = current.into();
            active_model.auto_renewal_enabled = Set(false);
            SubscriptionRepository::update(db, active_model).await?;
        }
        Ok(())
    }

    async fn report_exhausted(&self, subscription: &subscription_model::Model, failure_count: i32) {
        log_with_context!(
            tracing::Level::ERROR,
            "Auto-renewal disabled after repeated payment failures",
            "subscription_id" => subscription.id,
            "user_id" => subscription.user_id,
            "failure_count" => failure_count
        );

        self.notifier
            .notify(
                subscription.user_id,
                NotificationKind::Payment,
                "Auto-Renewal Failed",
                "We could not renew your subscription after several attempts. Please update your payment method.",
            )
            .await;
    }
}

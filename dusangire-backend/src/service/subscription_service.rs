// src/service/subscription_service.rs

use crate::config::{AppConfig, RenewalConfig};
use crate::db::DbPool;
use crate::domain::auto_renewal_model::{self, ActiveModel as AutoRenewalActiveModel};
use crate::domain::notification_model::NotificationKind;
use crate::domain::subscription_model::{self, ActiveModel as SubscriptionActiveModel};
use crate::domain::subscription_status::SubscriptionStatus;
use crate::dto::subscription_dto::{
    AutoRenewalSettingsRequest, CreateSubscriptionRequest, PauseSubscriptionRequest,
};
use crate::error::{AppError, AppResult};
use crate::infrastructure::notification::Notifier;
use crate::log_with_context;
use crate::repository::auto_renewal_repository::AutoRenewalRepository;
use crate::repository::subscription_plan_repository::SubscriptionPlanRepository;
use crate::repository::subscription_repository::SubscriptionRepository;
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{ActiveModelBehavior, ConnectionTrait, Set, TransactionTrait};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

/// サブスクリプションの状態遷移
#[derive(Clone)]
pub struct SubscriptionService {
    db: DbPool,
    notifier: Arc<dyn Notifier>,
    renewal: RenewalConfig,
}

/// 不正な遷移は呼び出し側の誤りとして warn で記録する
fn transition(
    subscription_id: Uuid,
    result: AppResult<SubscriptionStatus>,
) -> AppResult<SubscriptionStatus> {
    if let Err(e) = &result {
        warn!(subscription_id = %subscription_id, error = %e, "Rejected subscription transition");
    }
    result
}

async fn load_for_update<C: ConnectionTrait>(
    db: &C,
    subscription_id: Uuid,
) -> AppResult<subscription_model::Model> {
    SubscriptionRepository::find_by_id_for_update(db, subscription_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Subscription {} not found", subscription_id)))
}

impl SubscriptionService {
    pub fn new(db: DbPool, notifier: Arc<dyn Notifier>, config: &AppConfig) -> Self {
        Self {
            db,
            notifier,
            renewal: config.renewal.clone(),
        }
    }

    /// 契約を作成し、自動更新設定とプランの購読者数を同時に更新する
    pub async fn create_subscription(
        &self,
        user_id: Uuid,
        request: CreateSubscriptionRequest,
    ) -> AppResult<subscription_model::Model> {
        request.validate()?;

        let txn = self.db.begin().await?;

        let plan = SubscriptionPlanRepository::find_by_id(&txn, request.plan_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription plan not found".to_string()))?;

        if !plan.is_active {
            return Err(AppError::ValidationError(format!(
                "Subscription plan '{}' is not available",
                plan.name
            )));
        }
        if plan.duration_days <= 0 {
            return Err(AppError::ValidationError(
                "Subscription plan has no duration".to_string(),
            ));
        }

        let end_date = request.start_date + Duration::days(i64::from(plan.duration_days));

        let mut active_model = SubscriptionActiveModel::new();
        active_model.user_id = Set(user_id);
        active_model.plan_id = Set(plan.id);
        active_model.start_date = Set(request.start_date);
        active_model.end_date = Set(end_date);
        active_model.next_billing_date = Set(Some(end_date));
        active_model.paused_until = Set(None);
        active_model.auto_order_enabled = Set(request.auto_order_enabled);
        active_model.auto_renewal_enabled = Set(request.auto_renewal_enabled);
        active_model.cancelled_at = Set(None);
        let subscription = SubscriptionRepository::insert(&txn, active_model).await?;

        let mut renewal = AutoRenewalActiveModel::new();
        renewal.subscription_id = Set(subscription.id);
        renewal.auto_renew_enabled = Set(request.auto_renewal_enabled);
        renewal.renewal_date = Set(end_date);
        renewal.renewal_interval_days = Set(plan.duration_days);
        renewal.payment_method_id = Set(request.payment_method_id);
        renewal.stripe_customer_id = Set(request.stripe_customer_id);
        renewal.max_retries = Set(self.renewal.default_max_retries);
        AutoRenewalRepository::insert(&txn, renewal).await?;

        SubscriptionPlanRepository::adjust_subscribers_count(&txn, plan.id, 1).await?;

        txn.commit().await?;

        log_with_context!(
            tracing::Level::INFO,
            "Subscription created",
            "subscription_id" => subscription.id,
            "user_id" => user_id,
            "plan" => &plan.name,
            "end_date" => end_date
        );

        self.notifier
            .notify(
                user_id,
                NotificationKind::Subscription,
                "Subscription Activated",
                &format!(
                    "Your {} subscription is active until {}.",
                    plan.name, end_date
                ),
            )
            .await;

        Ok(subscription)
    }

    /// active → paused
    pub async fn pause(
        &self,
        subscription_id: Uuid,
        request: PauseSubscriptionRequest,
        today: NaiveDate,
    ) -> AppResult<subscription_model::Model> {
        request.validate()?;
        if request.paused_until.is_some_and(|until| until < today) {
            return Err(AppError::ValidationError(
                "paused_until must not be in the past".to_string(),
            ));
        }

        let txn = self.db.begin().await?;
        let subscription = load_for_update(&txn, subscription_id).await?;
        let next = transition(subscription_id, subscription.status()?.pause())?;

        let mut active_model: SubscriptionActiveModel = subscription.into();
        active_model.status = Set(next.as_str().to_string());
        active_model.paused_until = Set(request.paused_until);
        let subscription = SubscriptionRepository::update(&txn, active_model).await?;
        txn.commit().await?;

        let message = match subscription.paused_until {
            Some(until) => format!("Your subscription is paused until {}.", until),
            None => "Your subscription is paused.".to_string(),
        };
        self.notifier
            .notify(
                subscription.user_id,
                NotificationKind::Subscription,
                "Subscription Paused",
                &message,
            )
            .await;

        Ok(subscription)
    }

    /// paused → active
    pub async fn resume(&self, subscription_id: Uuid) -> AppResult<subscription_model::Model> {
        let txn = self.db.begin().await?;
        let subscription = Self::resume_in(&txn, subscription_id).await?;
        txn.commit().await?;
        Ok(subscription)
    }

    async fn resume_in<C: ConnectionTrait>(
        db: &C,
        subscription_id: Uuid,
    ) -> AppResult<subscription_model::Model> {
        let subscription = load_for_update(db, subscription_id).await?;
        let next = transition(subscription_id, subscription.status()?.resume())?;

        let mut active_model: SubscriptionActiveModel = subscription.into();
        active_model.status = Set(next.as_str().to_string());
        active_model.paused_until = Set(None);
        Ok(SubscriptionRepository::update(db, active_model).await?)
    }

    /// 終端状態以外 → cancelled（自動更新も停止し、購読者数を減らす）
    pub async fn cancel(&self, subscription_id: Uuid) -> AppResult<subscription_model::Model> {
        let txn = self.db.begin().await?;
        let subscription = load_for_update(&txn, subscription_id).await?;
        let next = transition(subscription_id, subscription.status()?.cancel())?;
        let plan_id = subscription.plan_id;

        let mut active_model: SubscriptionActiveModel = subscription.into();
        active_model.status = Set(next.as_str().to_string());
        active_model.cancelled_at = Set(Some(Utc::now()));
        active_model.auto_renewal_enabled = Set(false);
        let subscription = SubscriptionRepository::update(&txn, active_model).await?;

        if let Some(renewal) =
            AutoRenewalRepository::find_by_subscription_id_for_update(&txn, subscription_id).await?
        {
            let mut renewal: AutoRenewalActiveModel = renewal.into();
            renewal.auto_renew_enabled = Set(false);
            AutoRenewalRepository::update(&txn, renewal).await?;
        }

        SubscriptionPlanRepository::adjust_subscribers_count(&txn, plan_id, -1).await?;
        txn.commit().await?;

        log_with_context!(
            tracing::Level::INFO,
            "Subscription cancelled",
            "subscription_id" => subscription_id,
            "user_id" => subscription.user_id
        );

        self.notifier
            .notify(
                subscription.user_id,
                NotificationKind::Subscription,
                "Subscription Cancelled",
                "Your subscription has been cancelled and will not renew.",
            )
            .await;

        Ok(subscription)
    }

    /// アクティブな契約の終了日をプラン期間分延長する
    pub async fn renew(&self, subscription_id: Uuid) -> AppResult<subscription_model::Model> {
        let txn = self.db.begin().await?;
        let subscription = Self::renew_in(&txn, subscription_id).await?;
        txn.commit().await?;
        Ok(subscription)
    }

    async fn renew_in<C: ConnectionTrait>(
        db: &C,
        subscription_id: Uuid,
    ) -> AppResult<subscription_model::Model> {
        let subscription = load_for_update(db, subscription_id).await?;
        transition(subscription_id, subscription.status()?.renew())?;
        Self::extend_loaded(db, subscription).await
    }

    /// 課金済みの1期間分を反映する
    ///
    /// 一時停止中の契約は状態を保ったまま終了日だけ延長する。
    /// 終端状態の契約は変更せず `None` を返す。
    pub(crate) async fn extend_paid_cycle_in<C: ConnectionTrait>(
        db: &C,
        subscription_id: Uuid,
    ) -> AppResult<Option<subscription_model::Model>> {
        let subscription = load_for_update(db, subscription_id).await?;
        match subscription.status()? {
            SubscriptionStatus::Active | SubscriptionStatus::Paused => {
                Ok(Some(Self::extend_loaded(db, subscription).await?))
            }
            SubscriptionStatus::Cancelled | SubscriptionStatus::Expired => Ok(None),
        }
    }

    async fn extend_loaded<C: ConnectionTrait>(
        db: &C,
        subscription: subscription_model::Model,
    ) -> AppResult<subscription_model::Model> {
        let plan = SubscriptionPlanRepository::find_by_id(db, subscription.plan_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription plan not found".to_string()))?;

        let end_date = subscription.end_date + Duration::days(i64::from(plan.duration_days));

        let mut active_model: SubscriptionActiveModel = subscription.into();
        active_model.end_date = Set(end_date);
        active_model.next_billing_date = Set(Some(end_date));
        Ok(SubscriptionRepository::update(db, active_model).await?)
    }

    /// active → expired
    pub async fn expire(&self, subscription_id: Uuid) -> AppResult<subscription_model::Model> {
        let txn = self.db.begin().await?;
        let subscription = load_for_update(&txn, subscription_id).await?;
        let subscription = Self::expire_loaded(&txn, subscription).await?;
        txn.commit().await?;
        Ok(subscription)
    }

    async fn expire_loaded<C: ConnectionTrait>(
        db: &C,
        subscription: subscription_model::Model,
    ) -> AppResult<subscription_model::Model> {
        let next = transition(subscription.id, subscription.status()?.expire())?;
        let mut active_model: SubscriptionActiveModel = subscription.into();
        active_model.status = Set(next.as_str().to_string());
        Ok(SubscriptionRepository::update(db, active_model).await?)
    }

    /// 終了日を過ぎたアクティブな契約を期限切れにする（自動更新が有効なものは除く）
    pub async fn expire_overdue(&self, today: NaiveDate) -> AppResult<u32> {
        let ids = SubscriptionRepository::find_overdue_active_ids(&self.db, today).await?;
        let mut expired = 0;

        for subscription_id in ids {
            let txn = self.db.begin().await?;
            let subscription = load_for_update(&txn, subscription_id).await?;

            // 取得後に更新・停止された場合は対象外
            if !subscription.is_active()
                || subscription.end_date >= today
                || subscription.auto_renewal_enabled
            {
                txn.rollback().await?;
                continue;
            }

            let subscription = Self::expire_loaded(&txn, subscription).await?;
            txn.commit().await?;
            expired += 1;

            self.notifier
                .notify(
                    subscription.user_id,
                    NotificationKind::Subscription,
                    "Subscription Expired",
                    &format!("Your subscription ended on {}.", subscription.end_date),
                )
                .await;
        }

        if expired > 0 {
            log_with_context!(
                tracing::Level::INFO,
                "Expired overdue subscriptions",
                "count" => expired,
                "today" => today
            );
        }

        Ok(expired)
    }

    /// 一時停止期限が到来した契約を再開する
    pub async fn resume_due_paused(&self, today: NaiveDate) -> AppResult<u32> {
        let ids = SubscriptionRepository::find_due_paused_ids(&self.db, today).await?;
        let mut resumed = 0;

        for subscription_id in ids {
            let txn = self.db.begin().await?;
            let subscription = match Self::resume_in(&txn, subscription_id).await {
                Ok(subscription) => subscription,
                // 取得後に状態が変わった場合は対象外
                Err(AppError::InvalidState(_)) => {
                    txn.rollback().await?;
                    continue;
                }
                Err(e) => return Err(e),
            };
            txn.commit().await?;
            resumed += 1;

            self.notifier
                .notify(
                    subscription.user_id,
                    NotificationKind::Subscription,
                    "Subscription Resumed",
                    "Your paused subscription is active again.",
                )
                .await;
        }

        Ok(resumed)
    }

    /// 自動更新の有効・無効と支払い方法を設定する
    pub async fn update_auto_renewal(
        &self,
        subscription_id: Uuid,
        request: AutoRenewalSettingsRequest,
    ) -> AppResult<auto_renewal_model::Model> {
        request.validate()?;

        let txn = self.db.begin().await?;
        let subscription = load_for_update(&txn, subscription_id).await?;

        if request.enabled && subscription.status()?.is_terminal() {
            return Err(AppError::InvalidState(format!(
                "Cannot enable auto-renewal on a {} subscription",
                subscription.status
            )));
        }

        let renewal = AutoRenewalRepository::find_by_subscription_id_for_update(&txn, subscription_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Auto-renewal settings not found".to_string()))?;

        let mut renewal: AutoRenewalActiveModel = renewal.into();
        renewal.auto_renew_enabled = Set(request.enabled);
        if let Some(payment_method_id) = request.payment_method_id {
            renewal.payment_method_id = Set(Some(payment_method_id));
        }
        if let Some(stripe_customer_id) = request.stripe_customer_id {
            renewal.stripe_customer_id = Set(Some(stripe_customer_id));
        }
        if request.enabled {
            renewal.failure_count = Set(0);
            renewal.next_retry_at = Set(None);
        }
        let renewal = AutoRenewalRepository::update(&txn, renewal).await?;

        let mut active_model: SubscriptionActiveModel = subscription.into();
        active_model.auto_renewal_enabled = Set(request.enabled);
        SubscriptionRepository::update(&txn, active_model).await?;

        txn.commit().await?;
        Ok(renewal)
    }

    pub async fn get_subscription(
        &self,
        subscription_id: Uuid,
    ) -> AppResult<subscription_model::Model> {
        SubscriptionRepository::find_by_id(&self.db, subscription_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Subscription {} not found", subscription_id)))
    }

    pub async fn user_subscriptions(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<subscription_model::Model>> {
        Ok(SubscriptionRepository::find_by_user(&self.db, user_id).await?)
    }
}

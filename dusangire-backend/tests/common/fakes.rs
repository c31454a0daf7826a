// tests/common/fakes.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use dusangire_backend::domain::notification_model::NotificationKind;
use dusangire_backend::dto::subscription_dto::PauseSubscriptionRequest;
use dusangire_backend::error::{AppError, AppResult};
use dusangire_backend::infrastructure::{ChargeRequest, Notifier, PaymentGateway};
use dusangire_backend::service::subscription_service::SubscriptionService;
use rust_decimal::Decimal;
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

/// 課金結果の振る舞い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeBehavior {
    Approve,
    Decline,
    Hang(Duration),
}

/// 指定どおりに応答し、呼び出しを記録する決済ゲートウェイ
pub struct ScriptedGateway {
    behavior: Mutex<ChargeBehavior>,
    requests: Mutex<Vec<ChargeRequest>>,
}

impl ScriptedGateway {
    pub fn new(behavior: ChargeBehavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_behavior(&self, behavior: ChargeBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn charges(&self) -> Vec<(String, Decimal)> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| (r.payment_method_id.clone(), r.amount))
            .collect()
    }

    pub fn requests(&self) -> Vec<ChargeRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn charge_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn charge(&self, request: ChargeRequest) -> AppResult<()> {
        self.requests.lock().unwrap().push(request);

        let behavior = *self.behavior.lock().unwrap();
        match behavior {
            ChargeBehavior::Approve => Ok(()),
            ChargeBehavior::Decline => Err(AppError::PaymentChargeFailure(
                "card_declined".to_string(),
            )),
            ChargeBehavior::Hang(duration) => {
                tokio::time::sleep(duration).await;
                Ok(())
            }
        }
    }
}

/// 課金処理の途中で利用者が契約を一時停止した状況を再現する
///
/// 課金自体は承認する。
pub struct PausingGateway {
    subscriptions: SubscriptionService,
    subscription_id: Mutex<Option<Uuid>>,
    today: NaiveDate,
    requests: Mutex<Vec<ChargeRequest>>,
}

impl PausingGateway {
    pub fn new(subscriptions: SubscriptionService, today: NaiveDate) -> Self {
        Self {
            subscriptions,
            subscription_id: Mutex::new(None),
            today,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 次の課金時に一時停止する契約
    pub fn pause_on_charge(&self, subscription_id: Uuid) {
        *self.subscription_id.lock().unwrap() = Some(subscription_id);
    }

    pub fn charge_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentGateway for PausingGateway {
    async fn charge(&self, request: ChargeRequest) -> AppResult<()> {
        self.requests.lock().unwrap().push(request);

        let target = self.subscription_id.lock().unwrap().take();
        if let Some(subscription_id) = target {
            self.subscriptions
                .pause(subscription_id, PauseSubscriptionRequest::default(), self.today)
                .await?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

/// 送信された通知を記録する
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentNotification>>,
}

impl RecordingNotifier {
    pub fn titles_for(&self, user_id: Uuid) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == user_id)
            .map(|n| n.title.clone())
            .collect()
    }

    pub fn all(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, user_id: Uuid, kind: NotificationKind, title: &str, message: &str) {
        self.sent.lock().unwrap().push(SentNotification {
            user_id,
            kind,
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}

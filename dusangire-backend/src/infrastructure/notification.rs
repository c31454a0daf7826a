// src/infrastructure/notification.rs

use crate::db::DbPool;
use crate::domain::notification_model::NotificationKind;
use crate::repository::notification_repository::NotificationRepository;
use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

/// ユーザー通知の送信先
///
/// 送信は投げっぱなし。失敗はログに残すだけで呼び出し側には返さない。
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: Uuid, kind: NotificationKind, title: &str, message: &str);
}

/// `notifications` テーブルに保存する
pub struct DatabaseNotifier {
    db: DbPool,
}

impl DatabaseNotifier {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Notifier for DatabaseNotifier {
    async fn notify(&self, user_id: Uuid, kind: NotificationKind, title: &str, message: &str) {
        if let Err(e) = NotificationRepository::create(&self.db, user_id, kind, title, message).await
        {
            warn!(
                user_id = %user_id,
                title = %title,
                error = %e,
                "Failed to store notification"
            );
        }
    }
}

/// ログ出力のみ
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, user_id: Uuid, kind: NotificationKind, title: &str, message: &str) {
        info!(
            user_id = %user_id,
            notification_type = kind.as_str(),
            title = %title,
            message = %message,
            "Notification"
        );
    }
}

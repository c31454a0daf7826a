// src/logging/mod.rs

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 構造化フィールド付きでログを出力する
///
/// ```ignore
/// log_with_context!(tracing::Level::INFO, "Points awarded", "user_id" => user_id, "points" => 120);
/// ```
#[macro_export]
macro_rules! log_with_context {
    ($level:expr, $msg:expr $(, $($key:expr => $value:expr),* $(,)?)?) => {
        match $level {
            tracing::Level::ERROR => {
                tracing::error!(
                    message = $msg
                    $(, $($key = ?$value,)*)?
                );
            }
            tracing::Level::WARN => {
                tracing::warn!(
                    message = $msg
                    $(, $($key = ?$value,)*)?
                );
            }
            tracing::Level::INFO => {
                tracing::info!(
                    message = $msg
                    $(, $($key = ?$value,)*)?
                );
            }
            tracing::Level::DEBUG => {
                tracing::debug!(
                    message = $msg
                    $(, $($key = ?$value,)*)?
                );
            }
            _ => {
                tracing::trace!(
                    message = $msg
                    $(, $($key = ?$value,)*)?
                );
            }
        }
    };
}

pub const DEFAULT_LOG_FILTER: &str = "dusangire_backend=info,sea_orm=warn";

/// トレーシングを初期化（RUST_LOG が優先）
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(fmt::layer())
        .init();
}

// src/error.rs

use sea_orm::DbErr;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Validation failed")]
    ValidationFailure(#[from] ValidationErrors),

    /// 現在の状態では許可されない操作（呼び出し側のプログラミングエラー）
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Insufficient balance: requested {requested} points, available {available}")]
    InsufficientBalance { requested: i64, available: i64 },

    /// 保留中の紹介が存在しない（通常は無害）
    #[error("No pending referral for user")]
    NoPendingReferral,

    /// 決済の失敗（リトライ対象。エンドユーザーには直接返さない）
    #[error("Payment charge failed: {0}")]
    PaymentChargeFailure(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

impl AppError {
    /// ログやUI層で使う安定したエラー種別
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::DbErr(_) => "database_error",
            AppError::NotFound(_) => "not_found",
            AppError::ValidationError(_) => "validation_error",
            AppError::ValidationFailure(_) => "validation_errors",
            AppError::InvalidState(_) => "invalid_state",
            AppError::InsufficientBalance { .. } => "insufficient_balance",
            AppError::NoPendingReferral => "no_pending_referral",
            AppError::PaymentChargeFailure(_) => "payment_charge_failure",
            AppError::Conflict(_) => "conflict",
            AppError::InternalServerError(_) => "internal_server_error",
            AppError::ExternalServiceError(_) => "external_service_error",
        }
    }

    /// UI層で4xx相当として扱うべきエラーか
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::NotFound(_)
                | AppError::ValidationError(_)
                | AppError::ValidationFailure(_)
                | AppError::InvalidState(_)
                | AppError::InsufficientBalance { .. }
                | AppError::Conflict(_)
        )
    }

    /// フィールド別のバリデーションエラーを収集
    pub fn field_errors(&self) -> Option<HashMap<String, Vec<String>>> {
        match self {
            AppError::ValidationFailure(errors) => Some(
                errors
                    .field_errors()
                    .into_iter()
                    .map(|(field, errors)| {
                        let messages = errors
                            .iter()
                            .map(|e| {
                                e.message
                                    .as_ref()
                                    .map_or_else(|| "Invalid value".to_string(), |m| m.to_string())
                            })
                            .collect();
                        (field.to_string(), messages)
                    })
                    .collect(),
            ),
            _ => None,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            // 内部エラーの詳細は外に出さない
            AppError::DbErr(_) => "A database error occurred".to_string(),
            AppError::InternalServerError(_) => "An internal server error occurred".to_string(),
            AppError::PaymentChargeFailure(_) => "Payment could not be processed".to_string(),
            other => other.to_string(),
        };

        ErrorResponse {
            success: false,
            message,
            validation_errors: self.field_errors(),
            error_type: self.error_type().to_string(),
        }
    }
}

// Result 型のエイリアス
pub type AppResult<T> = Result<T, AppError>;

/// 呼び出し側（Web層）へ渡す統一的なエラー表現
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<HashMap<String, Vec<String>>>,
    pub error_type: String,
}

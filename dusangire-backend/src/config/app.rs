use dotenvy::dotenv;
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// 自動更新バッチの運用設定
#[derive(Clone, Debug)]
pub struct RenewalConfig {
    /// 決済呼び出しのタイムアウト
    pub charge_timeout: Duration,
    /// この時間を過ぎたら新しい更新処理を開始しない
    pub batch_deadline: Duration,
    /// 処理中マーカーの有効期間（ワーカー異常終了時の再取得用）
    pub claim_lease: Duration,
    pub default_max_retries: i32,
}

/// 紹介プログラムの既定値
#[derive(Clone, Debug)]
pub struct LoyaltyConfig {
    pub referrer_bonus_points: i64,
    pub referrer_bonus_rwf: Decimal,
    pub referee_discount_percent: Decimal,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub environment: String,
    pub database_url: String,
    pub frontend_url: String,
    pub run_migrations: bool,
    pub renewal: RenewalConfig,
    pub loyalty: LoyaltyConfig,
}

fn parse_var<T: FromStr>(key: &str, default: &str) -> Result<T, String> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| format!("Invalid {} value", key))
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok(); // .env ファイルを読み込む (存在しなくてもエラーにしない)

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        Ok(Self {
            environment,
            database_url: env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            run_migrations: parse_var("RUN_MIGRATIONS", "false")?,
            renewal: RenewalConfig {
                charge_timeout: Duration::from_secs(parse_var(
                    "RENEWAL_CHARGE_TIMEOUT_SECS",
                    "30",
                )?),
                batch_deadline: Duration::from_secs(parse_var(
                    "RENEWAL_BATCH_DEADLINE_SECS",
                    "600",
                )?),
                claim_lease: Duration::from_secs(parse_var("RENEWAL_CLAIM_LEASE_SECS", "900")?),
                default_max_retries: parse_var("RENEWAL_MAX_RETRIES", "3")?,
            },
            loyalty: LoyaltyConfig {
                referrer_bonus_points: parse_var("REFERRAL_BONUS_POINTS", "100")?,
                referrer_bonus_rwf: parse_var("REFERRAL_BONUS_RWF", "1000")?,
                referee_discount_percent: parse_var("REFERRAL_DISCOUNT_PERCENT", "10")?,
            },
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// テスト用の設定を作成
    pub fn for_testing() -> Self {
        Self {
            environment: "test".to_string(),
            database_url: "sqlite::memory:".to_string(),
            frontend_url: "http://localhost:3001".to_string(),
            run_migrations: true,
            renewal: RenewalConfig {
                charge_timeout: Duration::from_secs(2),
                batch_deadline: Duration::from_secs(60),
                claim_lease: Duration::from_secs(900),
                default_max_retries: 3,
            },
            loyalty: LoyaltyConfig {
                referrer_bonus_points: 100,
                referrer_bonus_rwf: Decimal::new(1000, 0),
                referee_discount_percent: Decimal::new(10, 0),
            },
        }
    }
}

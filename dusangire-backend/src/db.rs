// src/db.rs
use crate::config::Config;
use migration::Migrator;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;

pub type DbPool = DatabaseConnection;

pub async fn create_db_pool(config: &Config) -> Result<DbPool, DbErr> {
    let mut opt = ConnectOptions::new(config.database_url.clone());

    // SQLite のインメモリDBは接続ごとに別DBになるため単一接続に固定する
    let max_connections = if config.database_url.starts_with("sqlite:") {
        1
    } else {
        20
    };

    opt.max_connections(max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .max_lifetime(Duration::from_secs(8 * 60))
        .sqlx_logging(false);

    Database::connect(opt).await
}

/// 未適用のマイグレーションを実行
pub async fn run_migrations(conn: &DbPool) -> Result<(), DbErr> {
    Migrator::up(conn, None).await
}

//! In-memory SQLite database for integration tests.

use dusangire_backend::config::AppConfig;
use dusangire_backend::db::{create_db_pool, run_migrations};
use sea_orm::DatabaseConnection;

pub struct TestDatabase {
    pub connection: DatabaseConnection,
}

impl TestDatabase {
    /// テストごとに独立したDBを作成し、マイグレーションを適用する
    pub async fn new() -> Self {
        let config = AppConfig::for_testing();
        let connection = create_db_pool(&config)
            .await
            .expect("connect to in-memory sqlite");

        run_migrations(&connection)
            .await
            .expect("apply migrations");

        Self { connection }
    }
}

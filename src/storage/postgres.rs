//! PostgreSQL storage backend.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};

use crate::account::{Account, AccountId};
use crate::config::Config;
use crate::error::StorageError;
use crate::metrics;

use super::Storage;

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS bank (
        id SERIAL PRIMARY KEY,
        first_name VARCHAR(100) NOT NULL,
        last_name VARCHAR(100) NOT NULL,
        email VARCHAR(50) UNIQUE NOT NULL,
        phone_number VARCHAR(50) UNIQUE NOT NULL,
        account_number VARCHAR(100) UNIQUE NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const SELECT_COLUMNS: &str =
    "first_name, last_name, email, phone_number, account_number, created_at";

/// Account storage over a sqlx PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Open a pool sized from `config` and verify the database answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or the ping fails.
    pub async fn connect(config: &Config) -> Result<Self, StorageError> {
        info!(
            url = %config.redacted_database_url(),
            max_connections = config.db_max_connections,
            min_connections = config.db_min_connections,
            "Connecting to database"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .min_connections(config.db_min_connections)
            .connect(&config.database_url)
            .await?;

        let storage = Self::from_pool(pool);
        storage.ping().await?;

        info!("Connected to database");
        Ok(storage)
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Classify a sqlx failure and count it.
fn observe<T>(op: &'static str, result: Result<T, sqlx::Error>) -> Result<T, StorageError> {
    result.map_err(|e| {
        let err = StorageError::from(e);
        metrics::inc_storage_errors(op, err.label());
        warn!(op, kind = err.label(), "Storage operation failed: {}", err);
        err
    })
}

#[async_trait]
impl Storage for PostgresStorage {
    #[instrument(skip(self))]
    async fn init_db(&self) -> Result<(), StorageError> {
        let _timer = metrics::timer_storage("init_db");
        observe("init_db", sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await)?;
        info!("Account table ready");
        Ok(())
    }

    #[instrument(skip(self, account), fields(account_number = %account.account_number))]
    async fn create_account(&self, account: &Account) -> Result<AccountId, StorageError> {
        let _timer = metrics::timer_storage("create_account");
        let id = observe(
            "create_account",
            sqlx::query_scalar::<_, AccountId>(
                r#"
                INSERT INTO bank (first_name, last_name, email, phone_number, account_number)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
            )
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(&account.email)
            .bind(&account.phone_number)
            .bind(&account.account_number)
            .fetch_one(&self.pool)
            .await,
        )?;

        debug!(id, "Account inserted");
        Ok(id)
    }

    #[instrument(skip(self, first_name, last_name, email, phone_number))]
    async fn update_account(
        &self,
        id: AccountId,
        first_name: &str,
        last_name: &str,
        email: &str,
        phone_number: &str,
    ) -> Result<(), StorageError> {
        let _timer = metrics::timer_storage("update_account");
        let result = observe(
            "update_account",
            sqlx::query(
                r#"
                UPDATE bank
                SET first_name = $1, last_name = $2, email = $3, phone_number = $4
                WHERE id = $5
                "#,
            )
            .bind(first_name)
            .bind(last_name)
            .bind(email)
            .bind(phone_number)
            .bind(id)
            .execute(&self.pool)
            .await,
        )?;

        debug!(rows = result.rows_affected(), "Account updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_account(&self, id: AccountId) -> Result<(), StorageError> {
        let _timer = metrics::timer_storage("delete_account");
        let result = observe(
            "delete_account",
            sqlx::query("DELETE FROM bank WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await,
        )?;

        debug!(rows = result.rows_affected(), "Account deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_account(&self, id: AccountId) -> Result<Account, StorageError> {
        let _timer = metrics::timer_storage("get_account");
        let query = format!("SELECT {SELECT_COLUMNS} FROM bank WHERE id = $1");
        let row = observe(
            "get_account",
            sqlx::query_as::<_, Account>(&query)
                .bind(id)
                .fetch_optional(&self.pool)
                .await,
        )?;

        row.ok_or_else(|| {
            metrics::inc_storage_errors("get_account", "not_found");
            StorageError::NotFound { id }
        })
    }

    #[instrument(skip(self))]
    async fn get_accounts(&self) -> Result<Vec<Account>, StorageError> {
        let _timer = metrics::timer_storage("get_accounts");
        let query = format!("SELECT {SELECT_COLUMNS} FROM bank");
        let accounts = observe(
            "get_accounts",
            sqlx::query_as::<_, Account>(&query)
                .fetch_all(&self.pool)
                .await,
        )?;

        debug!(count = accounts.len(), "Accounts fetched");
        Ok(accounts)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        observe("ping", sqlx::query("SELECT 1").execute(&self.pool).await)?;
        Ok(())
    }
}

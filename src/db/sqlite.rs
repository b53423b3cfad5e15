use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::db::models::{Page, User};
use crate::db::schema::SQLITE_INIT;
use crate::error::ConsoleError;
use crate::service::accounts;

pub type SqlitePool = Pool<Sqlite>;

pub const SEED_LOGIN: &str = "admin";
pub const SEED_PASSWORD: &str = "admin";
pub const SEED_PAGE_SLUG: &str = "about";
pub const SEED_PAGE_CONTENT: &str = "This is the about page.";

/// Handle to the console database. Cheap to clone; all clones share one pool.
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating the file if needed) and bring the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, ConsoleError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_opts)
            .await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), ConsoleError> {
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        info!("database schema ready");
        Ok(())
    }

    /// Create the default administrator when the user table is empty.
    pub async fn seed_if_empty(&self) -> Result<(), ConsoleError> {
        if self.count_users().await? > 0 {
            return Ok(());
        }
        let user = self.seed_admin().await?;
        info!(user_id = user.id, login = %user.login, "seeded default administrator");
        Ok(())
    }

    pub async fn seed_admin(&self) -> Result<User, ConsoleError> {
        let hash = accounts::hash(SEED_PASSWORD.to_string()).await?;
        self.insert_user(&User::new(SEED_LOGIN, hash)).await
    }

    pub async fn seed_about_page(&self) -> Result<Page, ConsoleError> {
        self.insert_page(&Page::new(SEED_PAGE_SLUG, SEED_PAGE_CONTENT))
            .await
    }

    pub async fn clear_users(&self) -> Result<u64, ConsoleError> {
        let done = sqlx::query(r#"DELETE FROM "user""#)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected())
    }

    pub async fn clear_pages(&self) -> Result<u64, ConsoleError> {
        let done = sqlx::query(r#"DELETE FROM "page""#)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected())
    }
}

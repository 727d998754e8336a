pub mod db;
pub mod notifications;
pub mod orders;
pub mod products;

use std::{env, str::FromStr, time::Duration};

pub use db::SqliteDatabase;
use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Sqlite,
    SqlitePool,
    Transaction,
};

const SQLITE_DB_URL: &str = "sqlite://data/deck.db";
/// How long a writer waits for the write lock before giving up with `SQLITE_BUSY`.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

pub fn db_url() -> String {
    let result = env::var("DECK_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ DECK_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

/// Opens a connection pool, creating the database file if it does not exist yet.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options =
        SqliteConnectOptions::from_str(url)?.create_if_missing(true).foreign_keys(true).busy_timeout(BUSY_TIMEOUT);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}

/// Opens a transaction that holds the database write lock from its first statement, the way `BEGIN IMMEDIATE` does.
///
/// A plain `BEGIN` is deferred: it reads under a snapshot and only asks for the write lock at its first write. If
/// another writer committed in between, SQLite fails that write with `SQLITE_BUSY_SNAPSHOT` straight away, without
/// waiting on the busy timeout. Any transaction that reads before it writes must start here instead.
pub async fn begin_write_transaction(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    // A write that matches no rows still takes the write lock, and waits for it.
    sqlx::query("UPDATE orders SET id = id WHERE 0").execute(&mut *tx).await?;
    Ok(tx)
}

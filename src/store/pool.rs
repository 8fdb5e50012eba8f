use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;
use log::info;

use super::dialect::Dialect;
use super::error::{Result, StoreError};
use super::upgrade::{Upgrades, upgrade};

pub type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// Per-connection pragmas. `foreign_keys` is what the upgrade precondition
/// checks for, the rest keep concurrent writers from failing with SQLITE_BUSY.
pub fn apply_sqlite_pragmas(conn: &mut SqliteConnection) -> QueryResult<()> {
    diesel::sql_query("PRAGMA busy_timeout = 30000;").execute(conn)?;
    diesel::sql_query("PRAGMA synchronous = NORMAL;").execute(conn)?;
    diesel::sql_query("PRAGMA foreign_keys = ON;").execute(conn)?;
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
        apply_sqlite_pragmas(conn).map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds a connection pool for `database_url` and upgrades the schema before
/// handing it out.
pub async fn open_sqlite_pool(database_url: &str) -> Result<SqlitePool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);

    let pool_size = std::thread::available_parallelism()
        .map(|p| p.get() as u32)
        .unwrap_or(4)
        .max(4);

    let pool = Pool::builder()
        .max_size(pool_size)
        .connection_customizer(Box::new(ConnectionOptions))
        .build(manager)
        .map_err(|e| StoreError::Pool(e.to_string()))?;

    let pool_clone = pool.clone();
    let version = tokio::task::spawn_blocking(move || -> Result<u32> {
        let mut conn = pool_clone
            .get()
            .map_err(|e| StoreError::Pool(e.to_string()))?;

        diesel::sql_query("PRAGMA journal_mode = WAL;").execute(&mut *conn)?;

        upgrade(&mut *conn, Dialect::Sqlite, &Upgrades::standard())
    })
    .await
    .map_err(|e| StoreError::Task(e.to_string()))??;

    info!("SQLite pool ready at schema v{version}");
    Ok(pool)
}

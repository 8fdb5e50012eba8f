use diesel::SqliteConnection;
use log::info;

use super::dialect::Dialect;
use super::error::{Result, StoreError};
use super::executor::SqlExecutor;
use super::pool::apply_sqlite_pragmas;
use super::schema;
use super::upgrade::{Upgrades, upgrade};
use super::version::get_version;
use crate::config::StoreConfig;

/// A database connection together with the dialect it speaks and the upgrade
/// steps to bring it to the current schema.
///
/// [`Container::upgrade`] must succeed before anything else reads or writes the
/// store.
pub struct Container<C: SqlExecutor> {
    conn: C,
    dialect: Dialect,
    upgrades: Upgrades<C>,
}

impl<C: SqlExecutor> Container<C> {
    pub fn new(conn: C, dialect: Dialect) -> Self {
        Self {
            conn,
            dialect,
            upgrades: Upgrades::standard(),
        }
    }

    /// Connects to `config.database_url`.
    ///
    /// Nothing is configured on the connection, so SQLite foreign key
    /// enforcement is whatever the library was compiled with. Use
    /// [`Container::open_sqlite`] to switch it on explicitly.
    pub fn connect(config: &StoreConfig) -> Result<Self> {
        let conn = C::connect(&config.database_url)?;
        info!("Connected to {} database", config.dialect);
        Ok(Self::new(conn, config.dialect))
    }

    /// Replaces the upgrade steps, e.g. with a prefix of the standard ones.
    pub fn with_upgrades(mut self, upgrades: Upgrades<C>) -> Self {
        self.upgrades = upgrades;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn latest_version(&self) -> u32 {
        self.upgrades.latest_version()
    }

    /// Upgrades the database from its current version to the latest one.
    ///
    /// Calling it on an up to date database only re-checks the preconditions.
    pub fn upgrade(&mut self) -> Result<u32> {
        upgrade(&mut self.conn, self.dialect, &self.upgrades)
    }

    pub fn version(&mut self) -> Result<u32> {
        get_version(&mut self.conn)
    }

    /// Fails with [`StoreError::MissingTables`] unless every table of the
    /// upgraded schema exists.
    pub fn verify_tables(&mut self) -> Result<()> {
        schema::verify_tables(&mut self.conn, self.dialect)
    }

    pub fn connection(&mut self) -> &mut C {
        &mut self.conn
    }
}

impl Container<SqliteConnection> {
    /// Opens a SQLite database with the same pragmas pooled connections get,
    /// foreign key enforcement included.
    pub fn open_sqlite(database_url: &str) -> Result<Self> {
        let mut conn = SqliteConnection::connect(database_url)?;
        apply_sqlite_pragmas(&mut conn).map_err(StoreError::from)?;
        Ok(Self::new(conn, Dialect::Sqlite))
    }
}

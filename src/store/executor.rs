use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Integer, Nullable};

use super::error::{Result, StoreError};

/// The slice of a transactional SQL connection the upgrade engine needs.
///
/// Implemented for diesel's `SqliteConnection`, and for `PgConnection` /
/// `MysqlConnection` when the `postgres` / `mysql` features are enabled.
pub trait SqlExecutor: Sized {
    fn connect(database_url: &str) -> Result<Self>;

    /// Executes a single statement, returning the affected row count.
    fn exec(&mut self, sql: &str) -> Result<usize>;

    /// Executes a single statement with one integer bind parameter.
    fn exec_int(&mut self, sql: &str, value: i32) -> Result<usize>;

    /// Runs a query whose single row has a `count` column.
    fn query_count(&mut self, sql: &str) -> Result<i64>;

    /// Runs a query selecting an optional integer aliased as `value`.
    ///
    /// Returns `None` both when there is no row and when the value is NULL.
    fn query_int(&mut self, sql: &str) -> Result<Option<i32>>;

    /// Whether the connection enforces foreign keys.
    ///
    /// Server backends always do.
    fn foreign_keys_enabled(&mut self) -> Result<bool> {
        Ok(true)
    }

    /// Runs `f` inside a transaction, committing on `Ok` and rolling back on
    /// `Err`.
    fn in_transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>;
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

#[derive(QueryableByName)]
struct IntRow {
    #[diesel(sql_type = Nullable<Integer>)]
    value: Option<i32>,
}

#[derive(QueryableByName)]
struct ForeignKeysRow {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

macro_rules! impl_sql_executor {
    ($conn:ty, { $($extra:tt)* }) => {
        impl SqlExecutor for $conn {
            fn connect(database_url: &str) -> Result<Self> {
                <$conn as diesel::Connection>::establish(database_url).map_err(StoreError::from)
            }

            fn exec(&mut self, sql: &str) -> Result<usize> {
                Ok(sql_query(sql).execute(self)?)
            }

            fn exec_int(&mut self, sql: &str, value: i32) -> Result<usize> {
                Ok(sql_query(sql).bind::<Integer, _>(value).execute(self)?)
            }

            fn query_count(&mut self, sql: &str) -> Result<i64> {
                Ok(sql_query(sql).get_result::<CountRow>(self)?.count)
            }

            fn query_int(&mut self, sql: &str) -> Result<Option<i32>> {
                let row = sql_query(sql).get_result::<IntRow>(self).optional()?;
                Ok(row.and_then(|r| r.value))
            }

            fn in_transaction<T, F>(&mut self, f: F) -> Result<T>
            where
                F: FnOnce(&mut Self) -> Result<T>,
            {
                diesel::Connection::transaction::<T, StoreError, _>(self, f)
            }

            $($extra)*
        }
    };
}

impl_sql_executor!(diesel::SqliteConnection, {
    fn foreign_keys_enabled(&mut self) -> Result<bool> {
        let row = sql_query("PRAGMA foreign_keys").get_result::<ForeignKeysRow>(self)?;
        Ok(row.foreign_keys != 0)
    }
});

#[cfg(feature = "postgres")]
impl_sql_executor!(diesel::PgConnection, {});

#[cfg(feature = "mysql")]
impl_sql_executor!(diesel::MysqlConnection, {});

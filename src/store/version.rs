//! The single-row table recording which upgrade step the schema is at.

use super::dialect::Dialect;
use super::error::Result;
use super::executor::SqlExecutor;

pub const VERSION_TABLE: &str = "whatsmeow_version";

pub fn ensure_version_table<C: SqlExecutor>(conn: &mut C) -> Result<()> {
    conn.exec(&format!(
        "CREATE TABLE IF NOT EXISTS {VERSION_TABLE} (version INTEGER)"
    ))?;
    Ok(())
}

/// Reads the stored schema version, creating the table if needed.
///
/// A missing row (or a NULL or negative value) means version 0.
pub fn get_version<C: SqlExecutor>(conn: &mut C) -> Result<u32> {
    ensure_version_table(conn)?;
    let version = conn.query_int(&format!(
        "SELECT version AS value FROM {VERSION_TABLE} LIMIT 1"
    ))?;
    Ok(version.and_then(|v| u32::try_from(v).ok()).unwrap_or(0))
}

/// Replaces the stored version with `version`.
///
/// Must be called on the transaction that applied the matching upgrade step so
/// the version and the schema shape commit together.
pub fn set_version<C: SqlExecutor>(tx: &mut C, dialect: Dialect, version: u32) -> Result<()> {
    tx.exec(&format!("DELETE FROM {VERSION_TABLE}"))?;
    tx.exec_int(
        &format!(
            "INSERT INTO {VERSION_TABLE} (version) VALUES ({})",
            dialect.placeholder(1)
        ),
        version as i32,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::SqliteConnection;

    #[test]
    fn test_missing_table_reads_as_zero_and_is_created() {
        let mut conn = SqliteConnection::connect(":memory:").unwrap();
        assert_eq!(get_version(&mut conn).unwrap(), 0);

        let tables = conn
            .query_count(
                "SELECT COUNT(*) AS count FROM sqlite_master WHERE name = 'whatsmeow_version'",
            )
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn test_set_version_keeps_a_single_row() {
        let mut conn = SqliteConnection::connect(":memory:").unwrap();
        ensure_version_table(&mut conn).unwrap();
        ensure_version_table(&mut conn).unwrap();

        set_version(&mut conn, Dialect::Sqlite, 3).unwrap();
        set_version(&mut conn, Dialect::Sqlite, 4).unwrap();

        assert_eq!(get_version(&mut conn).unwrap(), 4);
        let rows = conn
            .query_count("SELECT COUNT(*) AS count FROM whatsmeow_version")
            .unwrap();
        assert_eq!(rows, 1);
    }
}

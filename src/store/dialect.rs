//! SQL text generation for the supported database backends.
//!
//! Upgrade steps never spell out backend-specific SQL themselves. Everything
//! that differs between PostgreSQL, MySQL and SQLite (column types, length
//! checks, placeholders, catalog probes, string functions) goes through
//! [`Dialect`].

use std::fmt;
use std::str::FromStr;

use super::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// PostgreSQL: strict foreign keys, `bytea`.
    Postgres,
    /// MySQL: no native boolean, fixed-size `BINARY(n)` columns.
    MySql,
    /// SQLite: embedded engine, foreign keys must be switched on per connection.
    Sqlite,
}

impl Dialect {
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Column definition for a byte string of exactly `len` bytes.
    ///
    /// PostgreSQL and SQLite get a `CHECK (length(..) = len)` constraint, MySQL
    /// relies on the fixed width of `BINARY(len)`.
    pub fn fixed_binary(self, column: &str, len: usize) -> String {
        match self {
            Dialect::MySql => format!("{column} BINARY({len})"),
            Dialect::Postgres => format!("{column} bytea CHECK (length({column}) = {len})"),
            Dialect::Sqlite => format!("{column} BLOB CHECK (length({column}) = {len})"),
        }
    }

    /// Type name for a variable-length byte string.
    pub fn blob(self) -> &'static str {
        match self {
            Dialect::Postgres => "bytea",
            Dialect::MySql | Dialect::Sqlite => "BLOB",
        }
    }

    /// Type name for a JID or other identifier column.
    ///
    /// MySQL cannot index unbounded text, so it gets `VARCHAR(width)`; callers
    /// pick a narrower width when several such columns share one primary key.
    pub fn key_text(self, width: u16) -> String {
        match self {
            Dialect::MySql => format!("VARCHAR({width})"),
            Dialect::Postgres | Dialect::Sqlite => "TEXT".to_string(),
        }
    }

    /// Type name for free-form text such as display names.
    pub fn text(self) -> String {
        self.key_text(255)
    }

    /// Bind parameter marker for the `n`-th (1-based) parameter.
    pub fn placeholder(self, n: usize) -> String {
        match self {
            Dialect::MySql => "?".to_string(),
            Dialect::Postgres | Dialect::Sqlite => format!("${n}"),
        }
    }

    /// Whether the foreign-key enforcement precondition has to be verified
    /// before upgrading.
    pub fn requires_foreign_key_check(self) -> bool {
        matches!(self, Dialect::Sqlite)
    }

    /// Query returning a single `count` column, non-zero when `table.column`
    /// exists.
    pub fn column_exists_query(self, table: &str, column: &str) -> String {
        match self {
            Dialect::Postgres => format!(
                "SELECT COUNT(*) AS count FROM information_schema.columns \
                 WHERE table_schema = current_schema() AND table_name = '{table}' AND column_name = '{column}'"
            ),
            Dialect::MySql => format!(
                "SELECT COUNT(*) AS count FROM information_schema.columns \
                 WHERE table_schema = DATABASE() AND table_name = '{table}' AND column_name = '{column}'"
            ),
            Dialect::Sqlite => format!(
                "SELECT COUNT(*) AS count FROM pragma_table_info('{table}') WHERE name = '{column}'"
            ),
        }
    }

    /// Query returning a single `count` column, non-zero when `table` exists.
    pub fn table_exists_query(self, table: &str) -> String {
        match self {
            Dialect::Postgres => format!(
                "SELECT COUNT(*) AS count FROM information_schema.tables \
                 WHERE table_schema = current_schema() AND table_name = '{table}'"
            ),
            Dialect::MySql => format!(
                "SELECT COUNT(*) AS count FROM information_schema.tables \
                 WHERE table_schema = DATABASE() AND table_name = '{table}'"
            ),
            Dialect::Sqlite => format!(
                "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = '{table}'"
            ),
        }
    }

    /// Expression turning a legacy device JID (`user.agent:device@server`) into
    /// the address its primary identity key was stored under (`user:0`).
    ///
    /// Everything up to the first `.` is kept. Each backend spells the split
    /// differently, and SQLite's `substr(x, 0, n)` yields `n - 1` characters.
    pub fn legacy_identity_address(self, jid_expr: &str) -> String {
        match self {
            Dialect::Postgres => format!("concat(split_part({jid_expr}, '.', 1), ':0')"),
            Dialect::MySql => format!("CONCAT(SUBSTRING_INDEX({jid_expr}, '.', 1), ':0')"),
            Dialect::Sqlite => format!("substr({jid_expr}, 0, instr({jid_expr}, '.')) || ':0'"),
        }
    }

    /// Statement making a fixed-width binary column `NOT NULL`.
    ///
    /// SQLite cannot alter an existing column, so it returns `None` there.
    pub fn set_not_null(self, table: &str, column: &str, len: usize) -> Option<String> {
        match self {
            Dialect::Postgres => Some(format!(
                "ALTER TABLE {table} ALTER COLUMN {column} SET NOT NULL"
            )),
            Dialect::MySql => Some(format!(
                "ALTER TABLE {table} MODIFY COLUMN {column} BINARY({len}) NOT NULL"
            )),
            Dialect::Sqlite => None,
        }
    }
}

impl FromStr for Dialect {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pgx" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::MySql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            _ => Err(StoreError::UnknownDialect(s.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dialect_aliases() {
        assert_eq!("postgres".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("pgx".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("MySQL".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert_eq!("sqlite3".parse::<Dialect>().unwrap(), Dialect::Sqlite);

        let err = "oracle".parse::<Dialect>().unwrap_err();
        assert!(matches!(err, StoreError::UnknownDialect(ref d) if d == "oracle"));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for dialect in [Dialect::Postgres, Dialect::MySql, Dialect::Sqlite] {
            assert_eq!(dialect.to_string().parse::<Dialect>().unwrap(), dialect);
        }
    }

    #[test]
    fn test_fixed_binary_is_length_checked_except_on_mysql() {
        assert_eq!(
            Dialect::Postgres.fixed_binary("noise_key", 32),
            "noise_key bytea CHECK (length(noise_key) = 32)"
        );
        assert_eq!(
            Dialect::Sqlite.fixed_binary("fingerprint", 128),
            "fingerprint BLOB CHECK (length(fingerprint) = 128)"
        );
        assert_eq!(Dialect::MySql.fixed_binary("adv_device_sig", 64), "adv_device_sig BINARY(64)");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Dialect::Postgres.placeholder(1), "$1");
        assert_eq!(Dialect::Sqlite.placeholder(2), "$2");
        assert_eq!(Dialect::MySql.placeholder(3), "?");
    }

    #[test]
    fn test_key_text_width_only_applies_to_mysql() {
        assert_eq!(Dialect::MySql.key_text(100), "VARCHAR(100)");
        assert_eq!(Dialect::MySql.text(), "VARCHAR(255)");
        assert_eq!(Dialect::Postgres.key_text(100), "TEXT");
        assert_eq!(Dialect::Sqlite.text(), "TEXT");
    }

    #[test]
    fn test_column_probe_is_scoped_per_dialect() {
        let pg = Dialect::Postgres.column_exists_query("whatsmeow_device", "lid");
        assert!(pg.contains("current_schema()"));
        assert!(pg.contains("column_name = 'lid'"));

        let my = Dialect::MySql.column_exists_query("whatsmeow_device", "lid");
        assert!(my.contains("DATABASE()"));

        let lite = Dialect::Sqlite.column_exists_query("whatsmeow_device", "lid");
        assert!(lite.contains("pragma_table_info('whatsmeow_device')"));
        assert!(lite.contains("AS count"));
    }

    #[test]
    fn test_legacy_identity_address_expressions() {
        assert_eq!(
            Dialect::Postgres.legacy_identity_address("d.jid"),
            "concat(split_part(d.jid, '.', 1), ':0')"
        );
        assert_eq!(
            Dialect::MySql.legacy_identity_address("d.jid"),
            "CONCAT(SUBSTRING_INDEX(d.jid, '.', 1), ':0')"
        );
        assert_eq!(
            Dialect::Sqlite.legacy_identity_address("d.jid"),
            "substr(d.jid, 0, instr(d.jid, '.')) || ':0'"
        );
    }

    #[test]
    fn test_set_not_null() {
        assert!(Dialect::Sqlite.set_not_null("t", "c", 32).is_none());
        assert_eq!(
            Dialect::MySql.set_not_null("t", "c", 32).unwrap(),
            "ALTER TABLE t MODIFY COLUMN c BINARY(32) NOT NULL"
        );
        assert_eq!(
            Dialect::Postgres.set_not_null("t", "c", 32).unwrap(),
            "ALTER TABLE t ALTER COLUMN c SET NOT NULL"
        );
    }

    #[test]
    fn test_only_sqlite_checks_foreign_keys() {
        assert!(Dialect::Sqlite.requires_foreign_key_check());
        assert!(!Dialect::Postgres.requires_foreign_key_check());
        assert!(!Dialect::MySql.requires_foreign_key_check());
    }
}

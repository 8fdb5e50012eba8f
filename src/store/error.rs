use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("foreign keys are not enabled")]
    ForeignKeysDisabled,

    #[error("unsupported database dialect: {0}")]
    UnknownDialect(String),

    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("Database operation error: {0}")]
    Sql(#[from] diesel::result::Error),

    #[error("failed to upgrade database to v{version}: {source}")]
    Migration {
        version: u32,
        #[source]
        source: Box<StoreError>,
    },

    #[error("database is missing tables: {}", .0.join(", "))]
    MissingTables(Vec<String>),
}

impl StoreError {
    /// The schema version whose upgrade step failed, if this is a migration error.
    pub fn failed_version(&self) -> Option<u32> {
        match self {
            StoreError::Migration { version, .. } => Some(*version),
            _ => None,
        }
    }
}

impl From<diesel::ConnectionError> for StoreError {
    fn from(e: diesel::ConnectionError) -> Self {
        StoreError::Connection(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

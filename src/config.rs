use crate::store::Dialect;

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub database_url: String,
    pub dialect: Dialect,
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            database_url: database_url.into(),
            dialect,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("whatsapp.db", Dialect::Sqlite)
    }
}

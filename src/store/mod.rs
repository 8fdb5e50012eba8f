pub mod container;
pub mod device;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod pool;
pub mod schema;
pub mod upgrade;
pub mod version;

pub use container::Container;
pub use device::DeviceRecord;
pub use dialect::Dialect;
pub use error::{Result, StoreError};
pub use executor::SqlExecutor;
pub use pool::{SqlitePool, open_sqlite_pool};
pub use upgrade::{MigrationStep, UpgradeFn, Upgrades, upgrade};

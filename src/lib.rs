//! Persistent store for a multi-device WhatsApp client.
//!
//! The schema is created and evolved by [`store::Container::upgrade`], which
//! must run before anything else touches the database. PostgreSQL, MySQL and
//! SQLite are supported; the server backends sit behind the `postgres` and
//! `mysql` cargo features.

pub mod config;
pub mod lid_migration;
pub mod store;

pub use config::StoreConfig;
pub use store::{Container, Dialect, StoreError};

//! Versioned schema upgrades.
//!
//! Steps are applied in order, each in its own transaction together with the
//! version bump, so an interrupted upgrade resumes at the last committed
//! version.

pub mod steps;

use log::{debug, info, warn};

use super::dialect::Dialect;
use super::error::{Result, StoreError};
use super::executor::SqlExecutor;
use super::version::{get_version, set_version};

pub type UpgradeFn<C> = fn(&mut C, Dialect) -> Result<()>;

pub struct MigrationStep<C> {
    version: u32,
    description: &'static str,
    apply: UpgradeFn<C>,
}

impl<C> MigrationStep<C> {
    /// The schema version this step upgrades to.
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn description(&self) -> &'static str {
        self.description
    }
}

impl<C> Clone for MigrationStep<C> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            description: self.description,
            apply: self.apply,
        }
    }
}

/// An ordered list of upgrade steps. Step `n` (1-based) upgrades version
/// `n - 1` to `n`.
pub struct Upgrades<C> {
    steps: Vec<MigrationStep<C>>,
}

impl<C> Clone for Upgrades<C> {
    fn clone(&self) -> Self {
        Self {
            steps: self.steps.clone(),
        }
    }
}

impl<C: SqlExecutor> Default for Upgrades<C> {
    fn default() -> Self {
        Self::standard()
    }
}

impl<C: SqlExecutor> Upgrades<C> {
    /// Every step this version of the library knows about.
    pub fn standard() -> Self {
        let fns: [(&'static str, UpgradeFn<C>); 7] = [
            ("create device, key and app state tables", steps::upgrade_v1),
            ("fill adv_account_sig_key from identity keys", steps::upgrade_v2),
            ("add message secrets", steps::upgrade_v3),
            ("add privacy tokens", steps::upgrade_v4),
            ("strip .0 from device JIDs", steps::upgrade_v5),
            ("add facebook_uuid to devices", steps::upgrade_v6),
            ("add lid to devices", steps::upgrade_v7),
        ];
        Self::from_fns(fns)
    }
}

impl<C> Upgrades<C> {
    /// Builds a registry from `(description, step)` pairs, numbering them from 1
    /// in iteration order.
    pub fn from_fns<I>(fns: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, UpgradeFn<C>)>,
    {
        let steps = fns
            .into_iter()
            .zip(1..)
            .map(|((description, apply), version)| MigrationStep {
                version,
                description,
                apply,
            })
            .collect();
        Self { steps }
    }

    /// The first `count` steps.
    pub fn prefix(&self, count: usize) -> Self {
        Self {
            steps: self.steps.iter().take(count).cloned().collect(),
        }
    }

    pub fn latest_version(&self) -> u32 {
        self.steps.len() as u32
    }

    pub fn steps(&self) -> &[MigrationStep<C>] {
        &self.steps
    }
}

/// Brings the schema up to `upgrades.latest_version()` and returns the version
/// the store ends at.
///
/// On SQLite foreign keys must be enabled on `conn`, otherwise nothing is
/// touched. A failing step is rolled back and reported as
/// [`StoreError::Migration`]; steps before it stay committed.
pub fn upgrade<C: SqlExecutor>(conn: &mut C, dialect: Dialect, upgrades: &Upgrades<C>) -> Result<u32> {
    if dialect.requires_foreign_key_check() && !conn.foreign_keys_enabled()? {
        return Err(StoreError::ForeignKeysDisabled);
    }

    let mut version = get_version(conn)?;
    let latest = upgrades.latest_version();
    if version > latest {
        warn!("Database is at v{version}, newer than the latest known v{latest}; leaving it as is");
        return Ok(version);
    }
    if version == latest {
        debug!("Database is up to date at v{version}");
        return Ok(version);
    }

    for step in &upgrades.steps[version as usize..] {
        info!("Upgrading database to v{} ({})", step.version, step.description);
        conn.in_transaction(|tx| {
            (step.apply)(tx, dialect)?;
            set_version(tx, dialect, step.version)
        })
        .map_err(|e| StoreError::Migration {
            version: step.version,
            source: Box::new(e),
        })?;
        version = step.version;
    }

    info!("Database upgraded to v{version}");
    Ok(version)
}

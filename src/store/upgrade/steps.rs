//! The concrete upgrade steps, in version order.
//!
//! Each step runs inside the transaction opened by the runner and only talks
//! to the backend through [`Dialect`], so the same function serves all three
//! databases.

use log::{info, warn};

use crate::store::dialect::Dialect;
use crate::store::error::Result;
use crate::store::executor::SqlExecutor;
use crate::store::schema::{
    APP_STATE_MUTATION_MACS_TABLE, APP_STATE_SYNC_KEYS_TABLE, APP_STATE_VERSION_TABLE,
    CHAT_SETTINGS_TABLE, CONTACTS_TABLE, DEVICE_TABLE, IDENTITY_KEYS_TABLE, MESSAGE_SECRETS_TABLE,
    PRE_KEYS_TABLE, PRIVACY_TOKENS_TABLE, SENDER_KEYS_TABLE, SESSIONS_TABLE, column_exists,
};

fn device_fk(column: &str) -> String {
    format!(
        "FOREIGN KEY ({column}) REFERENCES {DEVICE_TABLE}(jid) ON DELETE CASCADE ON UPDATE CASCADE"
    )
}

fn device_table(d: Dialect) -> String {
    format!(
        "CREATE TABLE {DEVICE_TABLE} (
            jid {jid} PRIMARY KEY,
            registration_id BIGINT NOT NULL CHECK (registration_id >= 0 AND registration_id < 4294967296),
            {noise_key} NOT NULL,
            {identity_key} NOT NULL,
            {signed_pre_key} NOT NULL,
            signed_pre_key_id INTEGER NOT NULL CHECK (signed_pre_key_id >= 0 AND signed_pre_key_id < 16777216),
            {signed_pre_key_sig} NOT NULL,
            {adv_key} NOT NULL,
            {adv_details} NOT NULL,
            {adv_account_sig} NOT NULL,
            {adv_account_sig_key} NOT NULL,
            {adv_device_sig} NOT NULL,
            platform {text},
            business_name {text},
            push_name {text},
            facebook_uuid {text}
        )",
        jid = d.key_text(255),
        noise_key = d.fixed_binary("noise_key", 32),
        identity_key = d.fixed_binary("identity_key", 32),
        signed_pre_key = d.fixed_binary("signed_pre_key", 32),
        signed_pre_key_sig = d.fixed_binary("signed_pre_key_sig", 64),
        adv_key = d.fixed_binary("adv_key", 32),
        adv_details = d.fixed_binary("adv_details", 32),
        adv_account_sig = d.fixed_binary("adv_account_sig", 64),
        adv_account_sig_key = d.fixed_binary("adv_account_sig_key", 32),
        adv_device_sig = d.fixed_binary("adv_device_sig", 64),
        text = d.text(),
    )
}

/// v1: device record and the first generation of key and app state tables.
pub fn upgrade_v1<C: SqlExecutor>(tx: &mut C, d: Dialect) -> Result<()> {
    let key = d.key_text(255);
    let text = d.text();
    let blob = d.blob();

    tx.exec(&device_table(d))?;

    tx.exec(&format!(
        "CREATE TABLE {IDENTITY_KEYS_TABLE} (
            our_jid {key},
            their_id {key},
            {identity} NOT NULL,
            PRIMARY KEY (our_jid, their_id),
            {fk}
        )",
        identity = d.fixed_binary("identity", 32),
        fk = device_fk("our_jid"),
    ))?;

    tx.exec(&format!(
        "CREATE TABLE {PRE_KEYS_TABLE} (
            jid {key},
            key_id INTEGER CHECK (key_id >= 0 AND key_id < 16777216),
            {key_data} NOT NULL,
            uploaded BOOLEAN NOT NULL,
            PRIMARY KEY (jid, key_id),
            {fk}
        )",
        key_data = d.fixed_binary("key_data", 32),
        fk = device_fk("jid"),
    ))?;

    tx.exec(&format!(
        "CREATE TABLE {SESSIONS_TABLE} (
            our_jid {key},
            their_id {key},
            session {blob},
            PRIMARY KEY (our_jid, their_id),
            {fk}
        )",
        fk = device_fk("our_jid"),
    ))?;

    tx.exec(&format!(
        "CREATE TABLE {SENDER_KEYS_TABLE} (
            our_jid {key},
            chat_id {key},
            sender_id {key},
            sender_key {blob} NOT NULL,
            PRIMARY KEY (our_jid, chat_id, sender_id),
            {fk}
        )",
        fk = device_fk("our_jid"),
    ))?;

    tx.exec(&format!(
        "CREATE TABLE {APP_STATE_SYNC_KEYS_TABLE} (
            jid {key},
            {key_id},
            key_data {blob} NOT NULL,
            timestamp BIGINT NOT NULL,
            {fingerprint} NOT NULL,
            PRIMARY KEY (jid, key_id),
            {fk}
        )",
        key_id = d.fixed_binary("key_id", 32),
        fingerprint = d.fixed_binary("fingerprint", 128),
        fk = device_fk("jid"),
    ))?;

    tx.exec(&format!(
        "CREATE TABLE {APP_STATE_VERSION_TABLE} (
            jid {key},
            name {key},
            version BIGINT NOT NULL,
            {hash} NOT NULL,
            PRIMARY KEY (jid, name),
            {fk}
        )",
        hash = d.fixed_binary("hash", 128),
        fk = device_fk("jid"),
    ))?;

    tx.exec(&format!(
        "CREATE TABLE {APP_STATE_MUTATION_MACS_TABLE} (
            jid {key},
            name {key},
            version BIGINT,
            {index_mac},
            {value_mac} NOT NULL,
            PRIMARY KEY (jid, name, version, index_mac),
            FOREIGN KEY (jid, name) REFERENCES {APP_STATE_VERSION_TABLE}(jid, name) ON DELETE CASCADE ON UPDATE CASCADE
        )",
        index_mac = d.fixed_binary("index_mac", 32),
        value_mac = d.fixed_binary("value_mac", 32),
    ))?;

    tx.exec(&format!(
        "CREATE TABLE {CONTACTS_TABLE} (
            our_jid {key},
            their_jid {key},
            first_name {text},
            full_name {text},
            push_name {text},
            business_name {text},
            PRIMARY KEY (our_jid, their_jid),
            {fk}
        )",
        fk = device_fk("our_jid"),
    ))?;

    tx.exec(&format!(
        "CREATE TABLE {CHAT_SETTINGS_TABLE} (
            our_jid {key},
            chat_jid {key},
            muted_until BIGINT NOT NULL DEFAULT 0,
            pinned BOOLEAN NOT NULL DEFAULT false,
            archived BOOLEAN NOT NULL DEFAULT false,
            PRIMARY KEY (our_jid, chat_jid),
            {fk}
        )",
        fk = device_fk("our_jid"),
    ))?;

    Ok(())
}

/// v2: `adv_account_sig_key` filled in from the account's primary identity key.
///
/// Devices whose identity key cannot be found are deleted, there is nothing to
/// fill the column with.
pub fn upgrade_v2<C: SqlExecutor>(tx: &mut C, d: Dialect) -> Result<()> {
    if !column_exists(tx, d, DEVICE_TABLE, "adv_account_sig_key")? {
        let column = match d {
            Dialect::MySql => "adv_account_sig_key BINARY(32) NULL".to_string(),
            _ => d.fixed_binary("adv_account_sig_key", 32),
        };
        tx.exec(&format!("ALTER TABLE {DEVICE_TABLE} ADD COLUMN {column}"))?;
    }

    let matching_identity = format!(
        "FROM {IDENTITY_KEYS_TABLE} WHERE our_jid = {DEVICE_TABLE}.jid AND their_id = {address}",
        address = d.legacy_identity_address(&format!("{DEVICE_TABLE}.jid")),
    );

    let pruned = tx.exec(&format!(
        "DELETE FROM {DEVICE_TABLE} WHERE NOT EXISTS (SELECT 1 {matching_identity})"
    ))?;
    if pruned > 0 {
        warn!("Deleted {pruned} device(s) with no identity key to fill adv_account_sig_key from");
    }

    tx.exec(&format!(
        "UPDATE {DEVICE_TABLE} SET adv_account_sig_key = (SELECT identity {matching_identity})"
    ))?;

    if let Some(sql) = d.set_not_null(DEVICE_TABLE, "adv_account_sig_key", 32) {
        tx.exec(&sql)?;
    }
    Ok(())
}

/// v3: message secrets for decrypting retries and reactions.
pub fn upgrade_v3<C: SqlExecutor>(tx: &mut C, d: Dialect) -> Result<()> {
    // Four identifier columns share the primary key, which has to stay under
    // MySQL's index length limit.
    let key = d.key_text(100);
    tx.exec(&format!(
        "CREATE TABLE {MESSAGE_SECRETS_TABLE} (
            our_jid {key},
            chat_jid {key},
            sender_jid {key},
            message_id {key},
            {key_data} NOT NULL,
            PRIMARY KEY (our_jid, chat_jid, sender_jid, message_id),
            {fk}
        )",
        key_data = d.fixed_binary("key_data", 32),
        fk = device_fk("our_jid"),
    ))?;
    Ok(())
}

/// v4: privacy tokens. No foreign key, tokens outlive a re-registered device.
pub fn upgrade_v4<C: SqlExecutor>(tx: &mut C, d: Dialect) -> Result<()> {
    let key = d.key_text(255);
    tx.exec(&format!(
        "CREATE TABLE {PRIVACY_TOKENS_TABLE} (
            our_jid {key},
            their_jid {key},
            {token} NOT NULL,
            timestamp BIGINT NOT NULL,
            PRIMARY KEY (our_jid, their_jid)
        )",
        token = d.fixed_binary("token", 32),
    ))?;
    Ok(())
}

/// v5: strip the legacy `.0` agent suffix from device JIDs.
pub fn upgrade_v5<C: SqlExecutor>(tx: &mut C, _d: Dialect) -> Result<()> {
    let updated = tx.exec(&format!(
        "UPDATE {DEVICE_TABLE} SET jid = REPLACE(jid, '.0', '')"
    ))?;
    info!("Normalized {updated} device JID(s)");
    Ok(())
}

/// v6: `facebook_uuid`, unless an older v1 already created it.
///
/// Text on every backend, the same type v1 declares, so the column maps to a
/// single diesel type whichever way it was created.
pub fn upgrade_v6<C: SqlExecutor>(tx: &mut C, d: Dialect) -> Result<()> {
    if column_exists(tx, d, DEVICE_TABLE, "facebook_uuid")? {
        return Ok(());
    }
    tx.exec(&format!(
        "ALTER TABLE {DEVICE_TABLE} ADD COLUMN facebook_uuid {}",
        d.text()
    ))?;
    Ok(())
}

/// v7: the device's own LID.
///
/// Not guarded by a column probe: running it twice fails with a duplicate
/// column, only the version table keeps that from happening.
pub fn upgrade_v7<C: SqlExecutor>(tx: &mut C, d: Dialect) -> Result<()> {
    tx.exec(&format!(
        "ALTER TABLE {DEVICE_TABLE} ADD COLUMN lid {}",
        d.text()
    ))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_table_declares_facebook_uuid_as_text() {
        assert!(device_table(Dialect::Postgres).contains("facebook_uuid TEXT"));
        assert!(device_table(Dialect::Sqlite).contains("facebook_uuid TEXT"));
        assert!(device_table(Dialect::MySql).contains("facebook_uuid VARCHAR(255)"));
        assert!(!device_table(Dialect::Postgres).contains(" uuid"));
    }
}

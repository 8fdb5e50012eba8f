//! Table definitions for the fully upgraded schema.
//!
//! The DDL lives in the upgrade steps; these declarations mirror the shape the
//! steps converge to so the rest of the client can use diesel's query builder
//! against it.

use super::dialect::Dialect;
use super::error::{Result, StoreError};
use super::executor::SqlExecutor;

pub const DEVICE_TABLE: &str = "whatsmeow_device";
pub const IDENTITY_KEYS_TABLE: &str = "whatsmeow_identity_keys";
pub const PRE_KEYS_TABLE: &str = "whatsmeow_pre_keys";
pub const SESSIONS_TABLE: &str = "whatsmeow_sessions";
pub const SENDER_KEYS_TABLE: &str = "whatsmeow_sender_keys";
pub const APP_STATE_SYNC_KEYS_TABLE: &str = "whatsmeow_app_state_sync_keys";
pub const APP_STATE_VERSION_TABLE: &str = "whatsmeow_app_state_version";
pub const APP_STATE_MUTATION_MACS_TABLE: &str = "whatsmeow_app_state_mutation_macs";
pub const MESSAGE_SECRETS_TABLE: &str = "whatsmeow_message_secrets";
pub const PRIVACY_TOKENS_TABLE: &str = "whatsmeow_privacy_tokens";
pub const CONTACTS_TABLE: &str = "whatsmeow_contacts";
pub const CHAT_SETTINGS_TABLE: &str = "whatsmeow_chat_settings";

/// Every table present once all upgrade steps have been applied.
pub const ALL_TABLES: [&str; 12] = [
    DEVICE_TABLE,
    IDENTITY_KEYS_TABLE,
    PRE_KEYS_TABLE,
    SESSIONS_TABLE,
    SENDER_KEYS_TABLE,
    APP_STATE_SYNC_KEYS_TABLE,
    APP_STATE_VERSION_TABLE,
    APP_STATE_MUTATION_MACS_TABLE,
    MESSAGE_SECRETS_TABLE,
    PRIVACY_TOKENS_TABLE,
    CONTACTS_TABLE,
    CHAT_SETTINGS_TABLE,
];

/// Returns the tables from [`ALL_TABLES`] that do not exist yet.
pub fn missing_tables<C: SqlExecutor>(conn: &mut C, dialect: Dialect) -> Result<Vec<&'static str>> {
    let mut missing = Vec::new();
    for table in ALL_TABLES {
        if conn.query_count(&dialect.table_exists_query(table))? == 0 {
            missing.push(table);
        }
    }
    Ok(missing)
}

pub fn verify_tables<C: SqlExecutor>(conn: &mut C, dialect: Dialect) -> Result<()> {
    let missing = missing_tables(conn, dialect)?;
    if missing.is_empty() {
        Ok(())
    } else {
        Err(StoreError::MissingTables(
            missing.into_iter().map(str::to_string).collect(),
        ))
    }
}

/// Whether `table.column` exists.
pub fn column_exists<C: SqlExecutor>(
    conn: &mut C,
    dialect: Dialect,
    table: &str,
    column: &str,
) -> Result<bool> {
    Ok(conn.query_count(&dialect.column_exists_query(table, column))? > 0)
}

diesel::table! {
    whatsmeow_device (jid) {
        jid -> Text,
        registration_id -> BigInt,
        noise_key -> Binary,
        identity_key -> Binary,
        signed_pre_key -> Binary,
        signed_pre_key_id -> Integer,
        signed_pre_key_sig -> Binary,
        adv_key -> Binary,
        adv_details -> Binary,
        adv_account_sig -> Binary,
        adv_account_sig_key -> Binary,
        adv_device_sig -> Binary,
        platform -> Nullable<Text>,
        business_name -> Nullable<Text>,
        push_name -> Nullable<Text>,
        facebook_uuid -> Nullable<Text>,
        lid -> Nullable<Text>,
    }
}

diesel::table! {
    whatsmeow_identity_keys (our_jid, their_id) {
        our_jid -> Text,
        their_id -> Text,
        identity -> Binary,
    }
}

diesel::table! {
    whatsmeow_pre_keys (jid, key_id) {
        jid -> Text,
        key_id -> Integer,
        key_data -> Binary,
        uploaded -> Bool,
    }
}

diesel::table! {
    whatsmeow_sessions (our_jid, their_id) {
        our_jid -> Text,
        their_id -> Text,
        session -> Nullable<Binary>,
    }
}

diesel::table! {
    whatsmeow_sender_keys (our_jid, chat_id, sender_id) {
        our_jid -> Text,
        chat_id -> Text,
        sender_id -> Text,
        sender_key -> Binary,
    }
}

diesel::table! {
    whatsmeow_app_state_sync_keys (jid, key_id) {
        jid -> Text,
        key_id -> Binary,
        key_data -> Binary,
        timestamp -> BigInt,
        fingerprint -> Binary,
    }
}

diesel::table! {
    whatsmeow_app_state_version (jid, name) {
        jid -> Text,
        name -> Text,
        version -> BigInt,
        hash -> Binary,
    }
}

diesel::table! {
    whatsmeow_app_state_mutation_macs (jid, name, version, index_mac) {
        jid -> Text,
        name -> Text,
        version -> BigInt,
        index_mac -> Binary,
        value_mac -> Binary,
    }
}

diesel::table! {
    whatsmeow_message_secrets (our_jid, chat_jid, sender_jid, message_id) {
        our_jid -> Text,
        chat_jid -> Text,
        sender_jid -> Text,
        message_id -> Text,
        key_data -> Binary,
    }
}

diesel::table! {
    whatsmeow_privacy_tokens (our_jid, their_jid) {
        our_jid -> Text,
        their_jid -> Text,
        token -> Binary,
        timestamp -> BigInt,
    }
}

diesel::table! {
    whatsmeow_contacts (our_jid, their_jid) {
        our_jid -> Text,
        their_jid -> Text,
        first_name -> Nullable<Text>,
        full_name -> Nullable<Text>,
        push_name -> Nullable<Text>,
        business_name -> Nullable<Text>,
    }
}

diesel::table! {
    whatsmeow_chat_settings (our_jid, chat_jid) {
        our_jid -> Text,
        chat_jid -> Text,
        muted_until -> BigInt,
        pinned -> Bool,
        archived -> Bool,
    }
}

diesel::joinable!(whatsmeow_identity_keys -> whatsmeow_device (our_jid));
diesel::joinable!(whatsmeow_sessions -> whatsmeow_device (our_jid));
diesel::joinable!(whatsmeow_contacts -> whatsmeow_device (our_jid));
diesel::joinable!(whatsmeow_chat_settings -> whatsmeow_device (our_jid));

diesel::allow_tables_to_appear_in_same_query!(
    whatsmeow_device,
    whatsmeow_identity_keys,
    whatsmeow_pre_keys,
    whatsmeow_sessions,
    whatsmeow_sender_keys,
    whatsmeow_app_state_sync_keys,
    whatsmeow_app_state_version,
    whatsmeow_app_state_mutation_macs,
    whatsmeow_message_secrets,
    whatsmeow_privacy_tokens,
    whatsmeow_contacts,
    whatsmeow_chat_settings,
);

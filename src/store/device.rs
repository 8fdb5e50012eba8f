use diesel::prelude::*;

use super::schema::whatsmeow_device;

/// A row of `whatsmeow_device` in its fully upgraded shape.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = whatsmeow_device)]
pub struct DeviceRecord {
    pub jid: String,
    pub registration_id: i64,
    pub noise_key: Vec<u8>,
    pub identity_key: Vec<u8>,
    pub signed_pre_key: Vec<u8>,
    pub signed_pre_key_id: i32,
    pub signed_pre_key_sig: Vec<u8>,
    pub adv_key: Vec<u8>,
    pub adv_details: Vec<u8>,
    pub adv_account_sig: Vec<u8>,
    pub adv_account_sig_key: Vec<u8>,
    pub adv_device_sig: Vec<u8>,
    pub platform: Option<String>,
    pub business_name: Option<String>,
    pub push_name: Option<String>,
    pub facebook_uuid: Option<String>,
    pub lid: Option<String>,
}

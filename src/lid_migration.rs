//! Phone number to LID mappings exchanged while an account migrates to LID
//! addressing.
//!
//! [`LidMigrationMappingSyncPayload`] is the validated form of the
//! `LIDMigrationMappingSyncPayload` protobuf: decoding fails when a mapping
//! lacks one of its required fields, unknown fields are skipped.

use prost::Message;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use waproto::lid_migration as wa;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("failed to decode LID migration payload: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("LID migration mapping #{index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LidMigrationMapping {
    pub pn: u64,
    pub assigned_lid: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_lid: Option<u64>,
}

impl LidMigrationMapping {
    pub fn new(pn: u64, assigned_lid: u64) -> Self {
        Self {
            pn,
            assigned_lid,
            latest_lid: None,
        }
    }

    pub fn with_latest_lid(mut self, latest_lid: u64) -> Self {
        self.latest_lid = Some(latest_lid);
        self
    }

    pub fn encode_to_vec(&self) -> Vec<u8> {
        wa::LidMigrationMapping::from(self).encode_to_vec()
    }

    pub fn decode(buf: &[u8]) -> Result<Self, PayloadError> {
        Self::from_proto(wa::LidMigrationMapping::decode(buf)?, 0)
    }

    fn from_proto(m: wa::LidMigrationMapping, index: usize) -> Result<Self, PayloadError> {
        let pn = m.pn.ok_or(PayloadError::MissingField { index, field: "pn" })?;
        let assigned_lid = m.assigned_lid.ok_or(PayloadError::MissingField {
            index,
            field: "assignedLid",
        })?;
        Ok(Self {
            pn,
            assigned_lid,
            latest_lid: m.latest_lid,
        })
    }
}

impl From<&LidMigrationMapping> for wa::LidMigrationMapping {
    fn from(m: &LidMigrationMapping) -> Self {
        Self {
            pn: Some(m.pn),
            assigned_lid: Some(m.assigned_lid),
            latest_lid: m.latest_lid,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LidMigrationMappingSyncPayload {
    /// In the order they were sent; the order carries no meaning.
    pub pn_to_lid_mappings: Vec<LidMigrationMapping>,
}

impl LidMigrationMappingSyncPayload {
    pub fn new(pn_to_lid_mappings: Vec<LidMigrationMapping>) -> Self {
        Self { pn_to_lid_mappings }
    }

    pub fn encode_to_vec(&self) -> Vec<u8> {
        wa::LidMigrationMappingSyncPayload::from(self).encode_to_vec()
    }

    pub fn decode(buf: &[u8]) -> Result<Self, PayloadError> {
        let payload = wa::LidMigrationMappingSyncPayload::decode(buf)?;
        let pn_to_lid_mappings = payload
            .pn_to_lid_mappings
            .into_iter()
            .enumerate()
            .map(|(index, m)| LidMigrationMapping::from_proto(m, index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { pn_to_lid_mappings })
    }

    pub fn len(&self) -> usize {
        self.pn_to_lid_mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pn_to_lid_mappings.is_empty()
    }
}

impl From<&LidMigrationMappingSyncPayload> for wa::LidMigrationMappingSyncPayload {
    fn from(p: &LidMigrationMappingSyncPayload) -> Self {
        Self {
            pn_to_lid_mappings: p.pn_to_lid_mappings.iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LidMigrationMappingSyncPayload {
        LidMigrationMappingSyncPayload::new(vec![
            LidMigrationMapping::new(1000, 2000),
            LidMigrationMapping::new(1001, 2001).with_latest_lid(2002),
        ])
    }

    #[test]
    fn test_payload_encodes_to_expected_bytes() {
        let bytes = sample().encode_to_vec();
        assert_eq!(
            bytes,
            vec![
                0x0a, 0x06, 0x08, 0xe8, 0x07, 0x10, 0xd0, 0x0f, // {pn: 1000, assignedLid: 2000}
                0x0a, 0x09, 0x08, 0xe9, 0x07, 0x10, 0xd1, 0x0f, 0x18, 0xd2, 0x0f,
            ]
        );
    }

    #[test]
    fn test_payload_round_trip() {
        let payload = sample();
        let decoded = LidMigrationMappingSyncPayload::decode(&payload.encode_to_vec()).unwrap();
        assert_eq!(decoded, payload);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.pn_to_lid_mappings[0].latest_lid, None);
        assert_eq!(decoded.pn_to_lid_mappings[1].latest_lid, Some(2002));
        assert_eq!(decoded.encode_to_vec(), payload.encode_to_vec());
    }

    #[test]
    fn test_missing_assigned_lid_is_rejected() {
        // second mapping only carries pn
        let bytes = [
            0x0a, 0x06, 0x08, 0xe8, 0x07, 0x10, 0xd0, 0x0f, 0x0a, 0x03, 0x08, 0xe9, 0x07,
        ];
        let err = LidMigrationMappingSyncPayload::decode(&bytes).unwrap_err();
        assert!(matches!(
            err,
            PayloadError::MissingField { index: 1, field: "assignedLid" }
        ));
    }

    #[test]
    fn test_missing_pn_is_rejected() {
        let err = LidMigrationMapping::decode(&[0x10, 0xd0, 0x0f]).unwrap_err();
        assert!(matches!(err, PayloadError::MissingField { index: 0, field: "pn" }));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let bytes = [
            0x0a, 0x08, 0x08, 0xe8, 0x07, 0x10, 0xd0, 0x0f, 0x20, 0x05, // field 4 in the mapping
            0x12, 0x01, 0xff, // field 2 in the payload
        ];
        let decoded = LidMigrationMappingSyncPayload::decode(&bytes).unwrap();
        assert_eq!(
            decoded.pn_to_lid_mappings,
            vec![LidMigrationMapping::new(1000, 2000)]
        );
    }

    #[test]
    fn test_truncated_input_is_a_decode_error() {
        let err = LidMigrationMappingSyncPayload::decode(&[0x0a, 0x06, 0x08]).unwrap_err();
        assert!(matches!(err, PayloadError::Decode(_)));
    }

    #[test]
    fn test_empty_payload() {
        let payload = LidMigrationMappingSyncPayload::default();
        assert!(payload.encode_to_vec().is_empty());
        assert!(LidMigrationMappingSyncPayload::decode(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_json_uses_wire_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["pnToLidMappings"][0]["assignedLid"], 2000);
        assert!(json["pnToLidMappings"][0].get("latestLid").is_none());
        assert_eq!(json["pnToLidMappings"][1]["latestLid"], 2002);
    }
}

// Message definitions for `WAWebProtobufLidMigrationSyncPayload`.
//
// `pn` and `assignedLid` are `required` in the upstream schema. They are kept
// as `Option` here so a decoder can tell an absent field from a zero value;
// the wire encoding is identical.

#[derive(serde::Serialize, serde::Deserialize)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct LidMigrationMapping {
    #[prost(uint64, optional, tag = "1")]
    pub pn: ::core::option::Option<u64>,
    #[prost(uint64, optional, tag = "2")]
    pub assigned_lid: ::core::option::Option<u64>,
    #[prost(uint64, optional, tag = "3")]
    pub latest_lid: ::core::option::Option<u64>,
}

#[derive(serde::Serialize, serde::Deserialize)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LidMigrationMappingSyncPayload {
    #[prost(message, repeated, tag = "1")]
    pub pn_to_lid_mappings: ::prost::alloc::vec::Vec<LidMigrationMapping>,
}

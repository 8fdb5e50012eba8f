//! Protobuf message types shared with the WhatsApp Web client.

pub mod lid_migration;

//! Data models shared across the relay.

pub mod alert;

pub use alert::{Alert, AlertBatch, AlertStatus};

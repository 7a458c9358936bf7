//! A set of helpers for testing

mod alert;
mod provider;
mod room;
mod server;

pub use alert::{AlertBuilder, create_test_batch};
pub use provider::RecordingProvider;
pub use room::RoomConfigBuilder;
pub use server::{CapturedRequest, ScriptedServer};

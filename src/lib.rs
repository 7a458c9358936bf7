#![warn(missing_docs)]
//! alert-relay receives Alertmanager webhooks and relays them to chat rooms,
//! keeping every update of an alert in the same chat thread for a bounded
//! time.

pub mod cmd;
pub mod config;
pub mod correlation;
pub mod delivery;
pub mod http_client;
pub mod http_server;
pub mod metrics;
pub mod models;
pub mod providers;
pub mod router;
pub mod supervisor;
pub mod template;
pub mod test_helpers;

//! Subcommands of the `alert-relay` binary.

pub mod dry_run;

pub use dry_run::DryRunArgs;

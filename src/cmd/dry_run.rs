//! The `dry-run` subcommand: render a payload without delivering it.

use std::{fs, path::PathBuf};

use clap::Parser;
use serde::Serialize;
use thiserror::Error;

use crate::{
    config::{AppConfig, RoomConfig},
    models::AlertBatch,
    template::{MessageChunk, MessageRenderer, RenderError},
};

/// Errors that can occur during a dry run.
#[derive(Error, Debug)]
pub enum Error {
    /// The alerts file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    /// The requested room is not configured.
    #[error("Room '{0}' is not configured")]
    UnknownRoom(String),
    /// The room's template could not be loaded.
    #[error("Template error: {0}")]
    Template(#[from] RenderError),
    /// The alerts file is not a valid payload, or the report could not be
    /// serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Arguments of the `dry-run` subcommand.
#[derive(Parser, Debug)]
pub struct DryRunArgs {
    /// The room whose template is used.
    #[arg(short, long)]
    pub room: String,
    /// Path to an Alertmanager webhook payload.
    #[arg(short, long)]
    pub alerts: PathBuf,
    /// Path to the configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// A failed alert of a dry run.
#[derive(Debug, Serialize)]
pub struct DryRunFailure {
    /// Position of the alert in the payload.
    pub index: usize,
    /// Fingerprint of the alert.
    pub fingerprint: String,
    /// The render error.
    pub error: String,
}

/// What a dry run would have delivered.
#[derive(Debug, Serialize)]
pub struct DryRunReport {
    /// The room rendered for.
    pub room: String,
    /// Number of alerts in the payload.
    pub alerts: usize,
    /// The chunks that would be sent, in order.
    pub chunks: Vec<MessageChunk>,
    /// Alerts that failed to render.
    pub failures: Vec<DryRunFailure>,
}

/// Renders the alerts in `payload` with the template of `room`.
pub fn render_payload(room: &RoomConfig, payload: &str) -> Result<DryRunReport, Error> {
    let batch: AlertBatch = serde_json::from_str(payload)?;
    let renderer = MessageRenderer::from_file(&room.template, room.max_message_size)?;

    let (chunks, failures) = renderer.render_batch(&batch.alerts);
    let failures = failures
        .into_iter()
        .map(|(index, e)| DryRunFailure {
            index,
            fingerprint: batch.alerts[index].fingerprint.clone(),
            error: e.to_string(),
        })
        .collect();

    Ok(DryRunReport { room: room.name.clone(), alerts: batch.alerts.len(), chunks, failures })
}

/// Executes the `dry-run` subcommand and prints the report as JSON.
pub async fn execute(args: DryRunArgs) -> Result<(), Error> {
    let config = AppConfig::new(args.config.as_deref())?;
    let room = config.room(&args.room).ok_or_else(|| Error::UnknownRoom(args.room.clone()))?;

    let payload = fs::read_to_string(&args.alerts)?;
    let report = render_payload(room, &payload)?;

    tracing::info!(
        room = %report.room,
        alerts = report.alerts,
        chunks = report.chunks.len(),
        failures = report.failures.len(),
        "Dry run complete."
    );
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

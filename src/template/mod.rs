//! Rendering of alerts into size-bounded chat messages.

mod filters;

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::Datelike;
use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use thiserror::Error;

use crate::models::Alert;

const TEMPLATE_NAME: &str = "message";

/// Errors raised while loading or rendering a message template.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template file could not be read.
    #[error("Failed to read template {path}: {source}")]
    Load {
        /// The template path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The template source is not valid.
    #[error("Failed to parse template: {0}")]
    Parse(#[source] minijinja::Error),

    /// Rendering failed for one alert.
    #[error("Failed to render alert {fingerprint}: {source}")]
    Render {
        /// Fingerprint of the alert that failed.
        fingerprint: String,
        /// The underlying template error.
        source: minijinja::Error,
    },
}

/// One outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageChunk {
    /// The message text.
    pub text: String,
}

impl MessageChunk {
    /// Returns the size of the text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns whether the text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Accumulates rendered alerts into chunks no larger than a byte limit,
/// without ever splitting a single alert's text.
///
/// An alert whose text alone exceeds the limit becomes one oversized chunk.
#[derive(Debug)]
pub struct ChunkBuilder {
    max_size: usize,
    buf: String,
    chunks: Vec<MessageChunk>,
}

impl ChunkBuilder {
    /// Creates a builder for chunks of at most `max_size` bytes.
    pub fn new(max_size: usize) -> Self {
        Self { max_size, buf: String::new(), chunks: Vec::new() }
    }

    /// Appends the rendered text of one alert. The separating newline counts
    /// towards the limit, so a chunk holding several alerts stays strictly
    /// below `max_size`.
    pub fn push(&mut self, text: &str) {
        if !self.buf.is_empty() && self.buf.len() + text.len() + 1 >= self.max_size {
            self.flush();
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    /// Flushes the remaining buffer and returns all chunks in order.
    pub fn finish(mut self) -> Vec<MessageChunk> {
        self.flush();
        self.chunks
    }

    fn flush(&mut self) {
        if !self.buf.is_empty() {
            self.chunks.push(MessageChunk { text: std::mem::take(&mut self.buf) });
        }
    }
}

/// The variables a template sees for one alert.
#[derive(Serialize)]
struct AlertContext<'a> {
    status: String,
    labels: &'a std::collections::BTreeMap<String, String>,
    annotations: &'a std::collections::BTreeMap<String, String>,
    starts_at: String,
    ends_at: Option<String>,
    generator_url: &'a str,
    fingerprint: &'a str,
}

impl<'a> From<&'a Alert> for AlertContext<'a> {
    fn from(alert: &'a Alert) -> Self {
        Self {
            status: alert.status.to_string(),
            labels: &alert.labels,
            annotations: &alert.annotations,
            starts_at: alert.starts_at.to_rfc3339(),
            // Alertmanager sends the zero time for alerts that have not ended.
            ends_at: alert.ends_at.filter(|t| t.year() > 1).map(|t| t.to_rfc3339()),
            generator_url: &alert.generator_url,
            fingerprint: &alert.fingerprint,
        }
    }
}

/// Renders alerts with a pre-parsed template into [`MessageChunk`]s.
pub struct MessageRenderer {
    env: Environment<'static>,
    max_size: usize,
}

impl MessageRenderer {
    /// Parses `source` as the message template.
    pub fn new(source: &str, max_size: usize) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Chainable);
        env.add_filter("title", filters::title);
        env.add_filter("contains", filters::contains);
        env.add_filter("re_replace_all", filters::re_replace_all);
        env.add_filter("format_time", filters::format_time);
        env.add_template_owned(TEMPLATE_NAME, source.to_string()).map_err(RenderError::Parse)?;

        Ok(Self { env, max_size })
    }

    /// Reads and parses the template at `path`.
    pub fn from_file(path: &Path, max_size: usize) -> Result<Self, RenderError> {
        let source = fs::read_to_string(path)
            .map_err(|source| RenderError::Load { path: path.to_path_buf(), source })?;
        Self::new(&source, max_size)
    }

    /// Returns the chunk size limit in bytes.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Renders the raw template output for one alert.
    pub fn render_text(&self, alert: &Alert) -> Result<String, RenderError> {
        let to_render_error =
            |source| RenderError::Render { fingerprint: alert.fingerprint.clone(), source };

        let template = self.env.get_template(TEMPLATE_NAME).map_err(to_render_error)?;
        template.render(AlertContext::from(alert)).map_err(to_render_error)
    }

    /// Renders one alert into its chunks.
    pub fn render(&self, alert: &Alert) -> Result<Vec<MessageChunk>, RenderError> {
        let text = self.render_text(alert)?;
        let mut builder = ChunkBuilder::new(self.max_size);
        builder.push(&text);
        Ok(builder.finish())
    }

    /// Renders a batch of alerts, packing them into as few chunks as the size
    /// limit allows. Alerts that fail to render are skipped and reported with
    /// their index.
    pub fn render_batch(&self, alerts: &[Alert]) -> (Vec<MessageChunk>, Vec<(usize, RenderError)>) {
        let mut builder = ChunkBuilder::new(self.max_size);
        let mut failures = Vec::new();

        for (index, alert) in alerts.iter().enumerate() {
            match self.render_text(alert) {
                Ok(text) => builder.push(&text),
                Err(e) => {
                    tracing::warn!(fingerprint = %alert.fingerprint, error = %e, "Failed to render alert.");
                    failures.push((index, e));
                }
            }
        }

        (builder.finish(), failures)
    }
}

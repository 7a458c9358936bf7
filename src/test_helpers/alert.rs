use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::models::{Alert, AlertBatch, AlertStatus};

/// A builder for creating `Alert` instances for testing.
#[derive(Debug, Clone)]
pub struct AlertBuilder {
    alert: Alert,
}

impl AlertBuilder {
    /// Creates a firing alert with the given fingerprint, started now.
    pub fn new(fingerprint: &str) -> Self {
        Self {
            alert: Alert {
                status: AlertStatus::Firing,
                labels: BTreeMap::new(),
                annotations: BTreeMap::new(),
                starts_at: Utc::now(),
                ends_at: None,
                generator_url: String::new(),
                fingerprint: fingerprint.to_string(),
            },
        }
    }

    /// Sets the status.
    pub fn status(mut self, status: AlertStatus) -> Self {
        self.alert.status = status;
        self
    }

    /// Adds a label.
    pub fn label(mut self, key: &str, value: &str) -> Self {
        self.alert.labels.insert(key.to_string(), value.to_string());
        self
    }

    /// Adds an annotation.
    pub fn annotation(mut self, key: &str, value: &str) -> Self {
        self.alert.annotations.insert(key.to_string(), value.to_string());
        self
    }

    /// Sets the start time.
    pub fn starts_at(mut self, starts_at: DateTime<Utc>) -> Self {
        self.alert.starts_at = starts_at;
        self
    }

    /// Sets the end time.
    pub fn ends_at(mut self, ends_at: DateTime<Utc>) -> Self {
        self.alert.ends_at = Some(ends_at);
        self
    }

    /// Sets the generator URL.
    pub fn generator_url(mut self, url: &str) -> Self {
        self.alert.generator_url = url.to_string();
        self
    }

    /// Builds the `Alert`.
    pub fn build(self) -> Alert {
        self.alert
    }
}

/// Wraps `alerts` in a webhook envelope addressed to `receiver`.
pub fn create_test_batch(receiver: &str, alerts: Vec<Alert>) -> AlertBatch {
    AlertBatch {
        receiver: receiver.to_string(),
        status: AlertStatus::Firing,
        alerts,
        version: "4".to_string(),
        ..Default::default()
    }
}

//! Alertmanager webhook payloads.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The state of an alert as reported by Alertmanager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// The alert condition currently holds.
    #[default]
    Firing,
    /// The alert condition no longer holds.
    Resolved,
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertStatus::Firing => write!(f, "firing"),
            AlertStatus::Resolved => write!(f, "resolved"),
        }
    }
}

/// A single alert as received from Alertmanager.
///
/// The `fingerprint` is derived from the alert's identifying labels, so every
/// update of the same logical alert carries the same value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Whether the alert is firing or resolved.
    #[serde(default)]
    pub status: AlertStatus,
    /// The identifying labels of the alert.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Additional, non-identifying information.
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    /// When the alert started firing.
    #[serde(default = "Utc::now")]
    pub starts_at: DateTime<Utc>,
    /// When the alert was resolved, if it was.
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    /// Link back to the rule that produced the alert.
    #[serde(default, rename = "generatorURL")]
    pub generator_url: String,
    /// Hash of the identifying labels.
    #[serde(default)]
    pub fingerprint: String,
}

/// The webhook envelope Alertmanager posts to receivers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertBatch {
    /// The receiver that the batch was routed to upstream.
    #[serde(default)]
    pub receiver: String,
    /// The overall status of the group.
    #[serde(default)]
    pub status: AlertStatus,
    /// The alerts in the group.
    #[serde(default)]
    pub alerts: Vec<Alert>,
    /// Labels the group was formed by.
    #[serde(default)]
    pub group_labels: BTreeMap<String, String>,
    /// Labels shared by every alert in the group.
    #[serde(default)]
    pub common_labels: BTreeMap<String, String>,
    /// Annotations shared by every alert in the group.
    #[serde(default)]
    pub common_annotations: BTreeMap<String, String>,
    /// Link back to the Alertmanager that sent the batch.
    #[serde(default, rename = "externalURL")]
    pub external_url: String,
    /// The webhook payload version.
    #[serde(default)]
    pub version: String,
    /// Key identifying the alert group.
    #[serde(default)]
    pub group_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_alertmanager_payload() {
        let json = r#"{
            "version": "4",
            "groupKey": "{}:{alertname=\"HighLatency\"}",
            "status": "firing",
            "receiver": "ops",
            "groupLabels": {"alertname": "HighLatency"},
            "commonLabels": {"alertname": "HighLatency", "severity": "high"},
            "commonAnnotations": {},
            "externalURL": "http://alertmanager:9093",
            "alerts": [
                {
                    "status": "firing",
                    "labels": {"alertname": "HighLatency", "severity": "high"},
                    "annotations": {"summary": "p99 above 2s"},
                    "startsAt": "2024-03-01T10:00:00Z",
                    "endsAt": "0001-01-01T00:00:00Z",
                    "generatorURL": "http://prometheus:9090/graph",
                    "fingerprint": "abc123"
                }
            ]
        }"#;

        let batch: AlertBatch = serde_json::from_str(json).unwrap();

        assert_eq!(batch.receiver, "ops");
        assert_eq!(batch.status, AlertStatus::Firing);
        assert_eq!(batch.external_url, "http://alertmanager:9093");
        assert_eq!(batch.alerts.len(), 1);

        let alert = &batch.alerts[0];
        assert_eq!(alert.fingerprint, "abc123");
        assert_eq!(alert.labels["severity"], "high");
        assert_eq!(alert.annotations["summary"], "p99 above 2s");
        assert_eq!(alert.starts_at.to_rfc3339(), "2024-03-01T10:00:00+00:00");
        assert_eq!(alert.generator_url, "http://prometheus:9090/graph");
    }

    #[test]
    fn test_deserialize_minimal_alert() {
        let alert: Alert =
            serde_json::from_str(r#"{"status": "resolved", "fingerprint": "f1"}"#).unwrap();

        assert_eq!(alert.status, AlertStatus::Resolved);
        assert!(alert.labels.is_empty());
        assert!(alert.ends_at.is_none());
    }

    #[test]
    fn test_alert_status_display() {
        assert_eq!(AlertStatus::Firing.to_string(), "firing");
        assert_eq!(AlertStatus::Resolved.to_string(), "resolved");
    }
}

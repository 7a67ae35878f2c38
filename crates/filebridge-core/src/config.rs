// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::NotificationVisibility;

/// How many in-flight downloads the completion correlator remembers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingMode {
    /// Only the most recent submission is tracked; a new submission
    /// displaces the previous one.
    #[default]
    SingleSlot,
    /// Every submission is tracked until its completion is observed.
    MultiSlot,
}

/// Session settings, usually supplied by the host application at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Filename and title used when the caller gives no filename.
    pub default_filename: String,
    /// Description shown in the host download notification.
    pub description: String,
    /// Host download notification visibility.
    pub notification: NotificationVisibility,
    pub tracking: TrackingMode,
    /// Forget a tracked download once its terminal completion is seen.
    pub reset_on_match: bool,
    /// Open a file automatically after it downloads successfully.
    pub auto_open: bool,
    /// Appended to the package name to form the content-grant authority.
    pub file_provider_suffix: String,
    /// MIME filter for the file chooser.
    pub chooser_mime_type: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            default_filename: "Download".into(),
            description: "Downloading file...".into(),
            notification: NotificationVisibility::VisibleNotifyCompleted,
            tracking: TrackingMode::SingleSlot,
            reset_on_match: true,
            auto_open: true,
            file_provider_suffix: ".fileprovider".into(),
            chooser_mime_type: "*/*".into(),
        }
    }
}

impl BridgeConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Like [`from_json`](Self::from_json), but a blank document means the
    /// defaults. Hosts that pass no configuration send an empty string.
    pub fn from_json_or_default(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Self::from_json(json)
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = BridgeConfig::from_json("{}").expect("parse");
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.tracking, TrackingMode::SingleSlot);
    }

    #[test]
    fn partial_document_overrides_named_fields() {
        let json = r#"{"tracking":"multi_slot","auto_open":false}"#;
        let config = BridgeConfig::from_json(json).expect("parse");
        assert_eq!(config.tracking, TrackingMode::MultiSlot);
        assert!(!config.auto_open);
        assert_eq!(config.default_filename, "Download");
    }

    #[test]
    fn blank_host_document_is_default() {
        for blank in ["", "  \n"] {
            let config = BridgeConfig::from_json_or_default(blank).expect("blank");
            assert_eq!(config, BridgeConfig::default());
        }

        let config = BridgeConfig::from_json_or_default(r#"{"file_provider_suffix":".files"}"#)
            .expect("parse");
        assert_eq!(config.file_provider_suffix, ".files");

        let err = BridgeConfig::from_json_or_default("{not json").unwrap_err();
        assert!(matches!(err, crate::BridgeError::Serialization(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("filebridge.json");
        std::fs::write(&path, r#"{"notification":"hidden"}"#).expect("write");

        let config = BridgeConfig::load(&path).expect("load");
        assert_eq!(config.notification, NotificationVisibility::Hidden);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = BridgeConfig::load("/nonexistent/filebridge.json").unwrap_err();
        assert!(matches!(err, crate::BridgeError::Io(_)));
    }
}

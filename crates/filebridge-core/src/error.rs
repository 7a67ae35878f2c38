// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Filebridge.

use thiserror::Error;

/// Top-level error type for all Filebridge operations.
///
/// The first four variants are the tags reported back to the calling
/// application layer. The remaining variants are internal causes; every
/// public operation folds them into its own tag before returning.
#[derive(Debug, Error)]
pub enum BridgeError {
    // -- Reported tags --
    #[error("{0}")]
    DownloadFailed(String),

    #[error("{0}")]
    OpenFailed(String),

    #[error("{0}")]
    ChooserFailed(String),

    #[error("method not implemented: {0}")]
    NotImplemented(String),

    // -- Internal causes --
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BridgeError {
    /// Wire tag reported to the calling application layer.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DownloadFailed(_) => "DOWNLOAD_FAILED",
            Self::OpenFailed(_) => "OPEN_FAILED",
            Self::ChooserFailed(_) => "CHOOSER_FAILED",
            Self::NotImplemented(_) => "NOT_IMPLEMENTED",
            _ => "BRIDGE_ERROR",
        }
    }

    /// Fold any cause into `DownloadFailed`, keeping the underlying message.
    pub fn into_download_failure(self) -> Self {
        match self {
            Self::DownloadFailed(_) => self,
            other => Self::DownloadFailed(other.to_string()),
        }
    }

    /// Fold any cause into `OpenFailed`, keeping the underlying message.
    pub fn into_open_failure(self) -> Self {
        match self {
            Self::OpenFailed(_) => self,
            other => Self::OpenFailed(other.to_string()),
        }
    }

    /// Fold any cause into `ChooserFailed`, keeping the underlying message.
    pub fn into_chooser_failure(self) -> Self {
        match self {
            Self::ChooserFailed(_) => self,
            other => Self::ChooserFailed(other.to_string()),
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_wire_codes() {
        assert_eq!(BridgeError::DownloadFailed("x".into()).code(), "DOWNLOAD_FAILED");
        assert_eq!(BridgeError::OpenFailed("x".into()).code(), "OPEN_FAILED");
        assert_eq!(BridgeError::ChooserFailed("x".into()).code(), "CHOOSER_FAILED");
        assert_eq!(BridgeError::NotImplemented("x".into()).code(), "NOT_IMPLEMENTED");
        assert_eq!(BridgeError::PlatformUnavailable.code(), "BRIDGE_ERROR");
    }

    #[test]
    fn folding_keeps_underlying_message() {
        let err = BridgeError::Bridge("enqueue: SecurityException".into()).into_download_failure();
        assert_eq!(err.code(), "DOWNLOAD_FAILED");
        assert_eq!(err.to_string(), "platform bridge error: enqueue: SecurityException");
    }

    #[test]
    fn folding_an_already_tagged_error_is_identity() {
        let err = BridgeError::OpenFailed("no viewer".into()).into_open_failure();
        assert_eq!(err.to_string(), "no viewer");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: BridgeError = io.into();
        assert!(matches!(err, BridgeError::Io(_)));
        assert_eq!(err.into_chooser_failure().code(), "CHOOSER_FAILED");
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Filebridge download, view and pick operations.

use serde::{Deserialize, Serialize};

/// Opaque identifier the host download service hands back on enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DownloadId(pub i64);

impl std::fmt::Display for DownloadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Arguments of a `downloadFile` call, exactly as the application sent them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequestSpec {
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl DownloadRequestSpec {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Public storage area a download lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestinationDir {
    Downloads,
    Pictures,
}

impl DestinationDir {
    /// Directory name the host uses for this area.
    pub fn host_name(&self) -> &'static str {
        match self {
            Self::Downloads => "Download",
            Self::Pictures => "Pictures",
        }
    }
}

/// Network transports a download may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkPolicy {
    /// Cellular / metered links.
    pub metered: bool,
    /// Wi-Fi / unmetered links.
    pub unmetered: bool,
}

impl NetworkPolicy {
    /// No transport restriction.
    pub fn any() -> Self {
        Self {
            metered: true,
            unmetered: true,
        }
    }

    /// Bit flags understood by the host download service
    /// (mobile = 1, wifi = 2).
    pub fn host_flags(&self) -> i32 {
        let mut flags = 0;
        if self.metered {
            flags |= 0x1;
        }
        if self.unmetered {
            flags |= 0x2;
        }
        flags
    }
}

/// Visibility of the host's own download notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationVisibility {
    /// Shown while running, removed on completion.
    Visible,
    /// Shown while running and after completion.
    VisibleNotifyCompleted,
    /// Never shown.
    Hidden,
    /// Shown only once the download completes.
    VisibleNotifyOnlyCompletion,
}

impl NotificationVisibility {
    pub fn host_value(&self) -> i32 {
        match self {
            Self::Visible => 0,
            Self::VisibleNotifyCompleted => 1,
            Self::Hidden => 2,
            Self::VisibleNotifyOnlyCompletion => 3,
        }
    }
}

/// Fully specified request handed to the host download service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    /// Extra request headers as (name, value) pairs.
    pub headers: Vec<(String, String)>,
    pub title: String,
    pub description: String,
    pub destination: DestinationDir,
    pub filename: String,
    pub mime_type: Option<String>,
    pub networks: NetworkPolicy,
    pub notification: NotificationVisibility,
}

impl DownloadRequest {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status column of a host download record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadStatus {
    Pending,
    Running,
    Paused,
    Successful,
    Failed,
    Other(i32),
}

impl DownloadStatus {
    pub fn from_host(code: i32) -> Self {
        match code {
            1 => Self::Pending,
            2 => Self::Running,
            4 => Self::Paused,
            8 => Self::Successful,
            16 => Self::Failed,
            other => Self::Other(other),
        }
    }

    /// Successful and Failed are the only states the correlator acts on.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Successful | Self::Failed)
    }
}

/// Decoded reason column of a failed host download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// The server answered with this HTTP status.
    Http(u16),
    Unknown,
    FileError,
    UnhandledHttpCode,
    HttpDataError,
    TooManyRedirects,
    InsufficientSpace,
    DeviceNotFound,
    CannotResume,
    FileAlreadyExists,
    /// A code outside the known tables.
    Unrecognised(i32),
}

impl FailureReason {
    pub fn from_code(code: i32) -> Self {
        match code {
            400..=599 => Self::Http(code as u16),
            1000 => Self::Unknown,
            1001 => Self::FileError,
            1002 => Self::UnhandledHttpCode,
            1004 => Self::HttpDataError,
            1005 => Self::TooManyRedirects,
            1006 => Self::InsufficientSpace,
            1007 => Self::DeviceNotFound,
            1008 => Self::CannotResume,
            1009 => Self::FileAlreadyExists,
            other => Self::Unrecognised(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::Http(status) => i32::from(*status),
            Self::Unknown => 1000,
            Self::FileError => 1001,
            Self::UnhandledHttpCode => 1002,
            Self::HttpDataError => 1004,
            Self::TooManyRedirects => 1005,
            Self::InsufficientSpace => 1006,
            Self::DeviceNotFound => 1007,
            Self::CannotResume => 1008,
            Self::FileAlreadyExists => 1009,
            Self::Unrecognised(code) => *code,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Http(_) => "HTTP error",
            Self::Unknown => "unknown error",
            Self::FileError => "storage error",
            Self::UnhandledHttpCode => "unhandled HTTP code",
            Self::HttpDataError => "HTTP data error",
            Self::TooManyRedirects => "too many redirects",
            Self::InsufficientSpace => "insufficient space",
            Self::DeviceNotFound => "storage device not found",
            Self::CannotResume => "cannot resume",
            Self::FileAlreadyExists => "file already exists",
            Self::Unrecognised(_) => "unrecognised reason",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code(), self.label())
    }
}

/// Host record for a download, read back once its completion is signalled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionNotification {
    pub id: DownloadId,
    pub status: DownloadStatus,
    /// Set when `status` is `Successful`.
    pub local_uri: Option<String>,
    /// Raw reason column; meaningful when `status` is `Failed`.
    pub reason: Option<i32>,
}

impl CompletionNotification {
    pub fn successful(id: DownloadId, local_uri: impl Into<String>) -> Self {
        Self {
            id,
            status: DownloadStatus::Successful,
            local_uri: Some(local_uri.into()),
            reason: None,
        }
    }

    pub fn failed(id: DownloadId, reason: i32) -> Self {
        Self {
            id,
            status: DownloadStatus::Failed,
            local_uri: None,
            reason: Some(reason),
        }
    }
}

/// A request to the host's generic "view" action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRequest {
    pub uri: String,
    /// Viewer hint; `None` lets the host infer it from the URI.
    pub mime_type: Option<String>,
    /// Grant the receiving viewer temporary read access to `uri`.
    pub grant_read: bool,
}

/// A request to the host's generic "pick content" action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerRequest {
    pub mime_type: String,
    /// Restrict to items the picker can open as a stream.
    pub openable_only: bool,
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Short user-visible acknowledgements shown by the host (toast-style).
//
// Every step of the download lifecycle that the user should hear about has
// one constructor here, so wording stays in one place.

use crate::types::FailureReason;

/// How long the host keeps a notice on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeDuration {
    Short,
    Long,
}

impl NoticeDuration {
    /// Duration constant understood by the host toast API.
    pub fn host_value(&self) -> i32 {
        match self {
            Self::Short => 0,
            Self::Long => 1,
        }
    }
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub duration: NoticeDuration,
}

impl Notice {
    pub fn short(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            duration: NoticeDuration::Short,
        }
    }

    pub fn long(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            duration: NoticeDuration::Long,
        }
    }

    /// Shown once the host download service accepted a request.
    pub fn download_started(filename: &str) -> Self {
        Self::short(format!("Download started: {filename}"))
    }

    /// Shown when a tracked download finished successfully.
    pub fn download_complete(local_uri: &str) -> Self {
        Self::long(format!("Download complete: {local_uri}"))
    }

    /// Shown when a tracked download failed.
    pub fn download_failed(reason: FailureReason) -> Self {
        Self::long(format!("Download failed: {reason}"))
    }

    /// Shown when a finished download could not be opened automatically.
    pub fn auto_open_failed() -> Self {
        Self::short("Unable to open the file automatically")
    }

    /// Shown when an explicit open request failed.
    pub fn open_failed(detail: &str) -> Self {
        Self::long(format!("Unable to open the file: {detail}"))
    }
}

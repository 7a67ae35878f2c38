// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Session-owned record of downloads awaiting a completion signal.
//
// In single-slot mode only the most recent submission is remembered, so a
// completion for an earlier one is treated as unrelated. Multi-slot mode
// remembers every submission until its completion is settled.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use filebridge_core::TrackingMode;
use filebridge_core::types::{DestinationDir, DownloadId, DownloadRequest};

/// What the session remembers about a submitted download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedDownload {
    pub id: DownloadId,
    pub filename: String,
    pub destination: DestinationDir,
    pub mime_type: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl TrackedDownload {
    pub fn new(id: DownloadId, request: &DownloadRequest) -> Self {
        Self {
            id,
            filename: request.filename.clone(),
            destination: request.destination,
            mime_type: request.mime_type.clone(),
            submitted_at: Utc::now(),
        }
    }

    /// Time since the download was submitted.
    pub fn age(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.submitted_at)
    }
}

/// Downloads submitted through this session and not yet settled.
#[derive(Debug)]
pub struct PendingDownloads {
    mode: TrackingMode,
    reset_on_match: bool,
    entries: HashMap<DownloadId, TrackedDownload>,
}

impl PendingDownloads {
    pub fn new(mode: TrackingMode, reset_on_match: bool) -> Self {
        Self {
            mode,
            reset_on_match,
            entries: HashMap::new(),
        }
    }

    /// Remember a new submission. In single-slot mode this displaces any
    /// previous entry, which is returned.
    pub fn track(&mut self, download: TrackedDownload) -> Option<TrackedDownload> {
        let displaced = match self.mode {
            TrackingMode::SingleSlot => self.entries.drain().map(|(_, d)| d).next(),
            TrackingMode::MultiSlot => None,
        };
        if let Some(old) = &displaced {
            debug!(
                displaced = %old.id,
                by = %download.id,
                "single-slot tracker displaced a download"
            );
        }
        self.entries.insert(download.id, download);
        displaced
    }

    pub fn is_tracked(&self, id: DownloadId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Record that a terminal completion for `id` was observed.
    ///
    /// Returns the entry if `id` was tracked. With `reset_on_match` the
    /// entry is forgotten, so a repeated signal for the same id no longer
    /// matches.
    pub fn settle(&mut self, id: DownloadId) -> Option<TrackedDownload> {
        if self.reset_on_match {
            self.entries.remove(&id)
        } else {
            self.entries.get(&id).cloned()
        }
    }

    /// Drop `id` regardless of `reset_on_match`, for downloads the host no
    /// longer knows about.
    pub fn forget(&mut self, id: DownloadId) -> Option<TrackedDownload> {
        self.entries.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Completion correlator: matches host download-complete signals against the
// downloads this session submitted and reports the outcome to the user.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use filebridge_bridge::events::CompletionSubscription;
use filebridge_bridge::traits::HostPlatform;
use filebridge_core::Notice;
use filebridge_core::types::{
    CompletionNotification, DownloadId, DownloadStatus, FailureReason,
};

use crate::opener::FileOpener;
use crate::tracker::{PendingDownloads, TrackedDownload};

/// Reason code assumed when the host reports a failure without one.
const UNKNOWN_REASON: i32 = 1000;

/// Classification of one completion signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correlation {
    /// Not a download this session is tracking.
    Irrelevant,
    /// Tracked, but the host record is missing or not in a terminal state.
    /// A missing record also drops the id from the tracker.
    Unresolved(Option<DownloadStatus>),
    /// Tracked download finished; `opened` tells whether auto-open worked.
    /// Without a local URI nothing is opened.
    Succeeded {
        id: DownloadId,
        local_uri: Option<String>,
        opened: bool,
    },
    /// Tracked download failed with the given reason.
    Failed { id: DownloadId, reason: FailureReason },
}

/// Consumes completion signals for the life of a session.
pub struct CompletionCorrelator<H: ?Sized> {
    host: Arc<H>,
    tracker: Arc<Mutex<PendingDownloads>>,
    opener: FileOpener<H>,
    auto_open: bool,
}

impl<H> CompletionCorrelator<H>
where
    H: HostPlatform + ?Sized,
{
    pub fn new(host: Arc<H>, tracker: Arc<Mutex<PendingDownloads>>, auto_open: bool) -> Self {
        let opener = FileOpener::new(Arc::clone(&host));
        Self {
            host,
            tracker,
            opener,
            auto_open,
        }
    }

    /// Handle a bare completion signal: filter by tracker, then read the
    /// host record and classify it.
    pub fn handle_signal(&self, id: DownloadId) -> Correlation {
        if !self.is_tracked(id) {
            debug!(%id, "completion for untracked download ignored");
            return Correlation::Irrelevant;
        }

        match self.host.query(id) {
            Ok(Some(notification)) => self.correlate(&notification),
            Ok(None) => {
                let entry = self.lock_tracker().forget(id);
                warn!(
                    %id,
                    filename = entry.as_ref().map_or("", |d| d.filename.as_str()),
                    "host has no record for tracked download; no longer tracking it"
                );
                Correlation::Unresolved(None)
            }
            Err(e) => {
                warn!(%id, error = %e, "failed to query host download record");
                Correlation::Unresolved(None)
            }
        }
    }

    /// Classify a host record and act on it.
    pub fn correlate(&self, notification: &CompletionNotification) -> Correlation {
        let id = notification.id;
        if !self.is_tracked(id) {
            debug!(%id, "completion for untracked download ignored");
            return Correlation::Irrelevant;
        }

        match notification.status {
            DownloadStatus::Successful => {
                let entry = self.lock_tracker().settle(id);
                trace_settled(id, entry.as_ref(), "successful");

                let local_uri = notification.local_uri.clone().filter(|u| !u.is_empty());
                let opened = match &local_uri {
                    Some(uri) => {
                        self.host.notify(&Notice::download_complete(uri));
                        self.auto_open && self.try_open(id, uri)
                    }
                    None => {
                        warn!(%id, "successful download has no local URI; not opening it");
                        let label = entry.map_or_else(|| id.to_string(), |d| d.filename);
                        self.host.notify(&Notice::download_complete(&label));
                        false
                    }
                };
                Correlation::Succeeded {
                    id,
                    local_uri,
                    opened,
                }
            }
            DownloadStatus::Failed => {
                let entry = self.lock_tracker().settle(id);
                trace_settled(id, entry.as_ref(), "failed");

                let reason =
                    FailureReason::from_code(notification.reason.unwrap_or(UNKNOWN_REASON));
                warn!(%id, %reason, "download failed");
                self.host.notify(&Notice::download_failed(reason));
                Correlation::Failed { id, reason }
            }
            other => {
                debug!(%id, status = ?other, "non-terminal completion status ignored");
                Correlation::Unresolved(Some(other))
            }
        }
    }

    /// Drain `subscription` until it ends or `shutdown` fires. The
    /// subscription is dropped on return, releasing the host listener.
    pub async fn run(
        self,
        mut subscription: CompletionSubscription,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        info!("completion correlator running");
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                signal = subscription.recv() => match signal {
                    Some(id) => {
                        let outcome = self.handle_signal(id);
                        debug!(%id, ?outcome, "completion handled");
                    }
                    None => break,
                },
            }
        }
        subscription.cancel();
        info!("completion correlator stopped");
    }

    fn try_open(&self, id: DownloadId, local_uri: &str) -> bool {
        match self.opener.open_downloaded(local_uri) {
            Ok(()) => true,
            Err(e) => {
                warn!(%id, error = %e, "auto-open failed");
                self.host.notify(&Notice::auto_open_failed());
                false
            }
        }
    }

    fn is_tracked(&self, id: DownloadId) -> bool {
        self.lock_tracker().is_tracked(id)
    }

    fn lock_tracker(&self) -> MutexGuard<'_, PendingDownloads> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn trace_settled(id: DownloadId, entry: Option<&TrackedDownload>, outcome: &'static str) {
    match entry {
        Some(d) => info!(
            %id,
            outcome,
            filename = %d.filename,
            destination = d.destination.host_name(),
            mime_type = d.mime_type.as_deref().unwrap_or(""),
            elapsed_ms = d.age().num_milliseconds(),
            "tracked download settled"
        ),
        None => debug!(%id, outcome, "download settled after it left the tracker"),
    }
}

/// Handle to a correlator task spawned by the session.
#[derive(Debug)]
pub struct CorrelatorHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl CorrelatorHandle {
    pub(crate) fn new(shutdown: oneshot::Sender<()>, task: JoinHandle<()>) -> Self {
        Self {
            shutdown: Some(shutdown),
            task,
        }
    }

    /// Stop the correlator and wait for it to release the host listener.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            warn!(error = %e, "correlator task ended abnormally");
        }
    }
}

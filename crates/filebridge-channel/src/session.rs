// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge session: owns the host handle, configuration and download tracker
// shared by the three public operations and the completion correlator.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;
use tracing::{info, instrument, warn};

use filebridge_bridge::capabilities::HostCapabilities;
use filebridge_bridge::events::{self, CompletionSubscription};
use filebridge_bridge::traits::HostPlatform;
use filebridge_core::{BridgeConfig, Notice};
use filebridge_core::error::{BridgeError, Result};
use filebridge_core::types::{DownloadId, DownloadRequestSpec};

use crate::correlator::{CompletionCorrelator, CorrelatorHandle};
use crate::opener::FileOpener;
use crate::tracker::PendingDownloads;
use crate::{download, picker};

/// Shared state for one application session.
pub struct BridgeSession<H: ?Sized> {
    host: Arc<H>,
    config: BridgeConfig,
    capabilities: HostCapabilities,
    tracker: Arc<Mutex<PendingDownloads>>,
}

impl<H> BridgeSession<H>
where
    H: HostPlatform + ?Sized + 'static,
{
    pub fn new(host: Arc<H>, config: BridgeConfig) -> Self {
        let capabilities = host.capabilities();
        let tracker = PendingDownloads::new(config.tracking, config.reset_on_match);
        info!(
            platform = host.platform_name(),
            api_level = capabilities.api_level,
            tracking = ?config.tracking,
            "bridge session created"
        );
        Self {
            host,
            config,
            capabilities,
            tracker: Arc::new(Mutex::new(tracker)),
        }
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn capabilities(&self) -> HostCapabilities {
        self.capabilities
    }

    /// Submit a download to the host queue and start tracking it.
    #[instrument(skip(self, spec), fields(url = %spec.url))]
    pub fn download_file(&self, spec: &DownloadRequestSpec) -> Result<DownloadId> {
        download::submit(self.host.as_ref(), &self.tracker, &self.config, spec)
            .map_err(BridgeError::into_download_failure)
    }

    /// Open a local path or remote locator in the host viewer.
    #[instrument(skip(self))]
    pub fn open_file(&self, path_or_url: &str) -> Result<()> {
        FileOpener::new(Arc::clone(&self.host))
            .open(path_or_url)
            .map_err(BridgeError::into_open_failure)
    }

    /// Report an open request rejected before it reached the opener, such
    /// as one with undecodable arguments. The user sees the same notice as
    /// for any other open failure.
    pub(crate) fn reject_open(&self, err: BridgeError) -> BridgeError {
        warn!(error = %err, "open request rejected");
        self.host.notify(&Notice::open_failed(&err.to_string()));
        err.into_open_failure()
    }

    /// Present the system content chooser.
    #[instrument(skip(self))]
    pub fn show_file_chooser(&self) -> Result<()> {
        picker::show_file_chooser(self.host.as_ref(), &self.config)
            .map_err(BridgeError::into_chooser_failure)
    }

    /// A correlator bound to this session's tracker.
    pub fn correlator(&self) -> CompletionCorrelator<H> {
        CompletionCorrelator::new(
            Arc::clone(&self.host),
            Arc::clone(&self.tracker),
            self.config.auto_open,
        )
    }

    /// Register the host completion listener with the scope this host
    /// requires.
    pub fn subscribe(&self) -> Result<CompletionSubscription> {
        events::subscribe(Arc::clone(&self.host), self.capabilities.receiver_scope)
    }

    /// Register the completion listener and spawn the correlator on the
    /// current tokio runtime.
    pub fn start(&self) -> Result<CorrelatorHandle> {
        let subscription = self.subscribe()?;
        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(self.correlator().run(subscription, rx));
        Ok(CorrelatorHandle::new(tx, task))
    }

    /// Downloads still awaiting a terminal completion.
    pub fn pending_count(&self) -> usize {
        self.tracker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use filebridge_bridge::capabilities::ReceiverScope;
    use filebridge_core::TrackingMode;
    use filebridge_core::types::CompletionNotification;

    use super::*;
    use crate::testing::FakeHost;

    const URL: &str = "https://intranet.example.com/files/report";

    fn session(api_level: u32) -> (Arc<FakeHost>, BridgeSession<FakeHost>) {
        let host = Arc::new(FakeHost::new(api_level));
        let session = BridgeSession::new(Arc::clone(&host), BridgeConfig::default());
        (host, session)
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[test]
    fn download_failure_is_tagged() {
        let (host, session) = session(34);
        *host.fail_enqueue.lock().unwrap() = Some("SecurityException".into());

        let err = session.download_file(&DownloadRequestSpec::new(URL)).unwrap_err();

        assert_eq!(err.code(), "DOWNLOAD_FAILED");
        assert!(err.to_string().contains("SecurityException"));
    }

    #[test]
    fn invalid_url_is_a_download_failure() {
        let (_host, session) = session(34);
        let err = session
            .download_file(&DownloadRequestSpec::new("ftp://example.com/a"))
            .unwrap_err();
        assert!(matches!(err, BridgeError::DownloadFailed(_)));
    }

    #[test]
    fn open_and_chooser_failures_are_tagged() {
        let (host, session) = session(34);
        *host.fail_view.lock().unwrap() = Some("no viewer".into());
        *host.fail_picker.lock().unwrap() = Some("no activity".into());

        let err = session.open_file("https://example.com/a.pdf").unwrap_err();
        assert_eq!(err.code(), "OPEN_FAILED");
        assert_eq!(session.show_file_chooser().unwrap_err().code(), "CHOOSER_FAILED");
    }

    #[test]
    fn tracker_follows_config() {
        let host = Arc::new(FakeHost::new(34));
        let config = BridgeConfig {
            tracking: TrackingMode::MultiSlot,
            ..BridgeConfig::default()
        };
        let session = BridgeSession::new(host, config);

        session.download_file(&DownloadRequestSpec::new(URL)).unwrap();
        session.download_file(&DownloadRequestSpec::new(URL)).unwrap();
        assert_eq!(session.pending_count(), 2);
    }

    #[tokio::test]
    async fn listener_scope_follows_api_level() {
        let (host, session) = session(34);
        let subscription = session.subscribe().expect("subscribe");
        assert_eq!(*host.registered_scope.lock().unwrap(), Some(ReceiverScope::NotExported));
        drop(subscription);
        assert_eq!(host.unregistered.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn older_hosts_register_implicitly() {
        let (host, session) = session(28);
        let _subscription = session.subscribe().expect("subscribe");
        assert_eq!(*host.registered_scope.lock().unwrap(), Some(ReceiverScope::Implicit));
    }

    #[tokio::test]
    async fn completion_broadcast_is_correlated_end_to_end() {
        let (host, session) = session(34);
        let handle = session.start().expect("start");

        let id = session
            .download_file(&DownloadRequestSpec::new(URL).with_filename("report.pdf"))
            .expect("download");
        assert_eq!(session.pending_count(), 1);

        assert!(host.broadcast(CompletionNotification::successful(
            id,
            "file:///storage/emulated/0/Download/report.pdf",
        )));
        wait_until(|| host.view_count() == 1).await;

        assert_eq!(session.pending_count(), 0);
        assert_eq!(
            host.notice_texts(),
            vec![
                "Download started: report.pdf".to_string(),
                "Download complete: file:///storage/emulated/0/Download/report.pdf".to_string(),
            ]
        );

        handle.shutdown().await;
        assert_eq!(host.unregistered.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_broadcast_is_ignored_end_to_end() {
        let (host, session) = session(34);
        let handle = session.start().expect("start");

        let first = session.download_file(&DownloadRequestSpec::new(URL)).unwrap();
        let second = session.download_file(&DownloadRequestSpec::new(URL)).unwrap();

        host.broadcast(CompletionNotification::failed(first, 404));
        host.broadcast(CompletionNotification::failed(second, 404));
        wait_until(|| host.notice_texts().len() == 3).await;

        let notices = host.notice_texts();
        assert!(notices[2].starts_with("Download failed: 404"));
        assert_eq!(session.pending_count(), 0);

        handle.shutdown().await;
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Request builder: turns a (url, filename, mimeType) triple into a fully
// specified host download request and submits it.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, info};
use url::Url;

use filebridge_bridge::traits::HostPlatform;
use filebridge_core::error::{BridgeError, Result};
use filebridge_core::mime::{destination_for, resolve_filename};
use filebridge_core::types::{DownloadId, DownloadRequest, DownloadRequestSpec, NetworkPolicy};
use filebridge_core::{BridgeConfig, Notice};

use crate::tracker::{PendingDownloads, TrackedDownload};

/// Header carrying the ambient session cookies.
pub const COOKIE_HEADER: &str = "Cookie";

/// Check that `url` is something the host download service accepts.
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| BridgeError::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(BridgeError::InvalidUrl(format!(
            "can only download HTTP/HTTPS URIs, got `{scheme}`"
        ))),
    }
}

/// Build the host request for `spec`, whose URL has already passed
/// [`validate_url`].
///
/// `cookie` is the ambient cookie string for the URL; it becomes a
/// `Cookie` header only when non-empty.
pub fn build_request(
    spec: &DownloadRequestSpec,
    cookie: Option<&str>,
    config: &BridgeConfig,
) -> DownloadRequest {
    let mime_type = spec.mime_type.as_deref();
    let filename = resolve_filename(spec.filename.as_deref(), mime_type, &config.default_filename);

    let mut headers = Vec::new();
    if let Some(cookie) = cookie.filter(|c| !c.is_empty()) {
        headers.push((COOKIE_HEADER.to_string(), cookie.to_string()));
    }

    DownloadRequest {
        url: spec.url.clone(),
        headers,
        title: filename.clone(),
        description: config.description.clone(),
        destination: destination_for(mime_type),
        filename,
        mime_type: spec.mime_type.clone(),
        networks: NetworkPolicy::any(),
        notification: config.notification,
    }
}

/// Build, enqueue and track a download.
///
/// Errors are returned as-is; callers fold them into `DownloadFailed`.
pub fn submit<H>(
    host: &H,
    tracker: &Mutex<PendingDownloads>,
    config: &BridgeConfig,
    spec: &DownloadRequestSpec,
) -> Result<DownloadId>
where
    H: HostPlatform + ?Sized,
{
    validate_url(&spec.url)?;
    let cookie = host.cookie_for(&spec.url)?;
    let request = build_request(spec, cookie.as_deref(), config);

    debug!(
        url = %request.url,
        filename = %request.filename,
        destination = request.destination.host_name(),
        with_cookie = request.header(COOKIE_HEADER).is_some(),
        "download request built"
    );

    let id = host.enqueue(&request)?;

    tracker
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .track(TrackedDownload::new(id, &request));

    host.notify(&Notice::download_started(&request.filename));
    info!(%id, filename = %request.filename, "download submitted");

    Ok(id)
}

#[cfg(test)]
mod tests {
    use filebridge_core::TrackingMode;
    use filebridge_core::types::{DestinationDir, NotificationVisibility};

    use super::*;
    use crate::testing::FakeHost;

    const URL: &str = "https://intranet.example.com/files/42";

    fn tracker() -> Mutex<PendingDownloads> {
        Mutex::new(PendingDownloads::new(TrackingMode::SingleSlot, true))
    }

    #[test]
    fn cookie_header_attached_when_present() {
        let spec = DownloadRequestSpec::new(URL);
        let request = build_request(&spec, Some("sid=abc; lang=fr"), &BridgeConfig::default());
        assert_eq!(request.header("Cookie"), Some("sid=abc; lang=fr"));
    }

    #[test]
    fn empty_or_absent_cookie_adds_no_header() {
        let spec = DownloadRequestSpec::new(URL);
        let config = BridgeConfig::default();
        assert!(build_request(&spec, Some(""), &config).headers.is_empty());
        assert!(build_request(&spec, None, &config).headers.is_empty());
    }

    #[test]
    fn request_fields_follow_inputs() {
        let spec = DownloadRequestSpec::new(URL)
            .with_filename("holiday")
            .with_mime_type("image/jpeg");
        let request = build_request(&spec, None, &BridgeConfig::default());

        assert_eq!(request.filename, "holiday.jpg");
        assert_eq!(request.title, "holiday.jpg");
        assert_eq!(request.destination, DestinationDir::Pictures);
        assert_eq!(request.mime_type.as_deref(), Some("image/jpeg"));
        assert_eq!(request.networks, NetworkPolicy::any());
        assert_eq!(request.notification, NotificationVisibility::VisibleNotifyCompleted);
        assert_eq!(request.description, "Downloading file...");
    }

    #[test]
    fn missing_filename_uses_default_label() {
        let spec = DownloadRequestSpec::new(URL).with_mime_type("application/pdf");
        let request = build_request(&spec, None, &BridgeConfig::default());
        assert_eq!(request.filename, "Download");
        assert_eq!(request.destination, DestinationDir::Downloads);
    }

    #[test]
    fn non_http_urls_are_rejected() {
        assert!(matches!(validate_url("ftp://example.com/a"), Err(BridgeError::InvalidUrl(_))));
        assert!(matches!(validate_url("not a url"), Err(BridgeError::InvalidUrl(_))));
        assert!(validate_url("http://example.com/a").is_ok());
    }

    #[test]
    fn submit_reads_cookie_store_and_tracks_id() {
        let host = FakeHost::new(34).with_cookie(URL, "sid=1");
        let tracker = tracker();
        let spec = DownloadRequestSpec::new(URL).with_filename("report.pdf");

        let id = submit(&host, &tracker, &BridgeConfig::default(), &spec).expect("submit");

        assert_eq!(host.last_request().header("Cookie"), Some("sid=1"));
        assert!(tracker.lock().unwrap().is_tracked(id));
        assert_eq!(host.notice_texts(), vec!["Download started: report.pdf".to_string()]);
    }

    #[test]
    fn second_submission_displaces_first() {
        let host = FakeHost::new(34);
        let tracker = tracker();
        let config = BridgeConfig::default();

        let first = submit(&host, &tracker, &config, &DownloadRequestSpec::new(URL)).unwrap();
        let second = submit(&host, &tracker, &config, &DownloadRequestSpec::new(URL)).unwrap();

        let tracker = tracker.lock().unwrap();
        assert_ne!(first, second);
        assert!(!tracker.is_tracked(first));
        assert!(tracker.is_tracked(second));
    }

    #[test]
    fn host_rejection_leaves_tracker_untouched() {
        let host = FakeHost::new(34);
        *host.fail_enqueue.lock().unwrap() = Some("storage unavailable".into());
        let tracker = tracker();

        let err = submit(&host, &tracker, &BridgeConfig::default(), &DownloadRequestSpec::new(URL))
            .unwrap_err();

        assert!(err.to_string().contains("storage unavailable"));
        assert!(tracker.lock().unwrap().is_empty());
        assert!(host.notice_texts().is_empty());
    }

    #[test]
    fn invalid_url_never_reaches_host() {
        let host = FakeHost::new(34);
        let tracker = tracker();
        let spec = DownloadRequestSpec::new("javascript:alert(1)");

        assert!(submit(&host, &tracker, &BridgeConfig::default(), &spec).is_err());
        assert!(host.enqueued.lock().unwrap().is_empty());
        assert!(host.cookie_lookups.lock().unwrap().is_empty());
    }
}

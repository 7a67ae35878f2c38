// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// File opener: hands a local file or remote locator to the host viewer.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use filebridge_bridge::traits::HostPlatform;
use filebridge_core::Notice;
use filebridge_core::error::Result;
use filebridge_core::mime::viewer_hint;
use filebridge_core::types::ViewRequest;

/// A resource ready for the host view action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    pub uri: String,
    pub mime_type: &'static str,
}

/// Opens files through the host viewer.
pub struct FileOpener<H: ?Sized> {
    host: Arc<H>,
    content_grants: bool,
}

impl<H> FileOpener<H>
where
    H: HostPlatform + ?Sized,
{
    pub fn new(host: Arc<H>) -> Self {
        let content_grants = host.capabilities().content_grants;
        Self {
            host,
            content_grants,
        }
    }

    /// Turn a path or locator into a viewable URI plus viewer hint.
    ///
    /// An existing local file is exposed through a content grant (or a
    /// `file://` URI on hosts without grants). Anything else is passed on
    /// as a locator unchanged.
    pub fn resolve(&self, path_or_url: &str) -> Result<ResolvedResource> {
        let path = Path::new(path_or_url);
        let uri = if path.exists() {
            if self.content_grants {
                self.host.grant_for_file(path)?
            } else {
                file_uri(path)
            }
        } else {
            path_or_url.to_string()
        };

        let mime_type = viewer_hint(&uri_path(&uri));
        debug!(input = path_or_url, %uri, mime_type, "resource resolved");
        Ok(ResolvedResource { uri, mime_type })
    }

    /// Open `path_or_url` in the host viewer.
    ///
    /// Failures are shown to the user and returned; callers fold them into
    /// `OpenFailed`.
    pub fn open(&self, path_or_url: &str) -> Result<()> {
        let result = self.resolve(path_or_url).and_then(|resource| self.launch(&resource));
        if let Err(e) = &result {
            warn!(input = path_or_url, error = %e, "open failed");
            self.host.notify(&Notice::open_failed(&e.to_string()));
        }
        result
    }

    /// Open a file the host download service just finished.
    ///
    /// `local_uri` is the host's `file://` URI. When it maps to a file this
    /// process can see, the same content-grant rules apply as for
    /// [`open`](Self::open); otherwise the URI itself is handed to the
    /// viewer. Failures are returned without notifying the user.
    pub fn open_downloaded(&self, local_uri: &str) -> Result<()> {
        let local_path = Url::parse(local_uri)
            .ok()
            .filter(|u| u.scheme() == "file")
            .and_then(|u| u.to_file_path().ok())
            .filter(|p| p.exists());

        let resource = match local_path {
            Some(path) => self.resolve(&path.to_string_lossy())?,
            None => self.resolve(local_uri)?,
        };
        self.launch(&resource)
    }

    fn launch(&self, resource: &ResolvedResource) -> Result<()> {
        self.host.view(&ViewRequest {
            uri: resource.uri.clone(),
            mime_type: Some(resource.mime_type.to_string()),
            grant_read: true,
        })?;
        info!(uri = %resource.uri, mime_type = resource.mime_type, "viewer launched");
        Ok(())
    }
}

/// Path component of a URI, or the input itself if it is not a URI.
fn uri_path(uri: &str) -> String {
    match Url::parse(uri) {
        Ok(url) => url.path().to_string(),
        Err(_) => uri.to_string(),
    }
}

fn file_uri(path: &Path) -> String {
    match Url::from_file_path(path) {
        Ok(url) => url.to_string(),
        Err(()) => format!("file://{}", path.display()),
    }
}

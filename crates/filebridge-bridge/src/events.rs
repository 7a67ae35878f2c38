// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Download-completion event channel.
//
// The host listener pushes the id of every finished download into a
// `CompletionSink`. The session consumes them through a
// `CompletionSubscription`, a stream that lives as long as the session and
// unregisters the host listener when cancelled or dropped.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use filebridge_core::error::Result;
use filebridge_core::types::DownloadId;

use crate::capabilities::ReceiverScope;
use crate::traits::CompletionRegistry;

/// Producer half, handed to the host listener.
#[derive(Debug, Clone)]
pub struct CompletionSink {
    tx: mpsc::UnboundedSender<DownloadId>,
}

impl CompletionSink {
    /// Forward a completion signal. Returns `false` once the subscription
    /// has gone away.
    pub fn signal(&self, id: DownloadId) -> bool {
        self.tx.send(id).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half: a lazy sequence of completion signals.
pub struct CompletionSubscription {
    rx: mpsc::UnboundedReceiver<DownloadId>,
    on_cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl CompletionSubscription {
    /// Wait for the next completion signal. `None` after cancellation once
    /// buffered signals are drained.
    pub async fn recv(&mut self) -> Option<DownloadId> {
        self.rx.recv().await
    }

    /// Stop receiving and release the host listener. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(release) = self.on_cancel.take() {
            self.rx.close();
            release();
            debug!("completion subscription cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.on_cancel.is_none()
    }
}

impl Stream for CompletionSubscription {
    type Item = DownloadId;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for CompletionSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for CompletionSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionSubscription")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Create an unregistered sink/subscription pair. `on_cancel` runs exactly
/// once, on the first `cancel()` or on drop.
pub fn completion_channel(
    on_cancel: impl FnOnce() + Send + 'static,
) -> (CompletionSink, CompletionSubscription) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        CompletionSink { tx },
        CompletionSubscription {
            rx,
            on_cancel: Some(Box::new(on_cancel)),
        },
    )
}

/// Register a completion listener with the host and return the
/// subscription that feeds from it.
///
/// The release hook is armed only after the host accepts the listener, so a
/// failed registration never triggers an unregister.
pub fn subscribe<H>(host: Arc<H>, scope: ReceiverScope) -> Result<CompletionSubscription>
where
    H: CompletionRegistry + Send + Sync + ?Sized + 'static,
{
    let (sink, mut subscription) = completion_channel(|| {});
    host.register_completion_listener(scope, sink)?;

    let registry = Arc::clone(&host);
    subscription.on_cancel = Some(Box::new(move || {
        if let Err(e) = registry.unregister_completion_listener() {
            warn!(error = %e, "failed to unregister download completion listener");
        }
    }));
    debug!(?scope, "download completion listener registered");
    Ok(subscription)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::StreamExt;

    use filebridge_core::BridgeError;

    use super::*;

    #[derive(Default)]
    struct CountingRegistry {
        sink: Mutex<Option<CompletionSink>>,
        scope: Mutex<Option<ReceiverScope>>,
        unregistered: AtomicUsize,
        refuse: bool,
    }

    impl CompletionRegistry for CountingRegistry {
        fn register_completion_listener(
            &self,
            scope: ReceiverScope,
            sink: CompletionSink,
        ) -> Result<()> {
            if self.refuse {
                return Err(BridgeError::Bridge("registerReceiver refused".into()));
            }
            *self.scope.lock().unwrap() = Some(scope);
            *self.sink.lock().unwrap() = Some(sink);
            Ok(())
        }

        fn unregister_completion_listener(&self) -> Result<()> {
            self.unregistered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn signals_arrive_in_order() {
        let registry = Arc::new(CountingRegistry::default());
        let mut sub = subscribe(Arc::clone(&registry), ReceiverScope::NotExported).unwrap();
        assert_eq!(*registry.scope.lock().unwrap(), Some(ReceiverScope::NotExported));

        let sink = registry.sink.lock().unwrap().clone().unwrap();
        assert!(sink.signal(DownloadId(7)));
        assert!(sink.signal(DownloadId(8)));

        assert_eq!(sub.recv().await, Some(DownloadId(7)));
        assert_eq!(sub.next().await, Some(DownloadId(8)));
    }

    #[tokio::test]
    async fn cancel_unregisters_once_and_closes_sink() {
        let registry = Arc::new(CountingRegistry::default());
        let mut sub = subscribe(Arc::clone(&registry), ReceiverScope::Implicit).unwrap();
        let sink = registry.sink.lock().unwrap().clone().unwrap();

        sub.cancel();
        sub.cancel();
        drop(sub);

        assert_eq!(registry.unregistered.load(Ordering::SeqCst), 1);
        assert!(sink.is_closed());
        assert!(!sink.signal(DownloadId(1)));
    }

    #[test]
    fn refused_registration_is_never_unregistered() {
        let registry = Arc::new(CountingRegistry {
            refuse: true,
            ..Default::default()
        });

        let err = subscribe(Arc::clone(&registry), ReceiverScope::NotExported).unwrap_err();
        assert!(matches!(err, BridgeError::Bridge(_)));
        assert!(registry.sink.lock().unwrap().is_none());
        assert_eq!(registry.unregistered.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn drop_releases_listener() {
        let registry = Arc::new(CountingRegistry::default());
        let sub = subscribe(Arc::clone(&registry), ReceiverScope::Implicit).unwrap();
        drop(sub);
        assert_eq!(registry.unregistered.load(Ordering::SeqCst), 1);
    }
}

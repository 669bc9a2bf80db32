//! Shared application state.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::sync::Notify;

use webtrail_capture::CapturePipeline;
use webtrail_core::{Event, EventSink, WebtrailConfig};
use webtrail_session::SessionStore;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: WebtrailConfig,
    pub store: Arc<SessionStore>,
    /// Capture pipeline, attached once the session's domain is known.
    pipeline: RwLock<Option<Arc<CapturePipeline>>>,
    /// Interaction intake: producers clone the sender, one drain task owns
    /// the receiver. Taking the sender closes the channel for shutdown.
    intake_tx: Mutex<Option<mpsc::UnboundedSender<Event>>>,
    intake_rx: Mutex<Option<mpsc::UnboundedReceiver<Event>>>,
    /// Signalled by the stop endpoint; merged with OS signals in main.
    pub shutdown: Notify,
}

impl AppState {
    pub fn new(config: WebtrailConfig, start_url: &str) -> Self {
        let store = Arc::new(SessionStore::new(start_url));
        let (tx, rx) = mpsc::unbounded_channel();

        let pipeline = store.domain().map(|domain| {
            let sink: Arc<dyn EventSink> = store.clone();
            Arc::new(CapturePipeline::new(domain, sink))
        });

        Self {
            config,
            store,
            pipeline: RwLock::new(pipeline),
            intake_tx: Mutex::new(Some(tx)),
            intake_rx: Mutex::new(Some(rx)),
            shutdown: Notify::new(),
        }
    }

    /// Current capture pipeline, if a domain is bound.
    pub fn pipeline(&self) -> Option<Arc<CapturePipeline>> {
        self.pipeline.read().clone()
    }

    /// Bind the session to its first real navigation and attach the
    /// capture pipeline. Returns the domain on the first successful bind.
    pub fn bind_start(&self, url: &str) -> Option<String> {
        let domain = self.store.bind_start(url)?;
        let sink: Arc<dyn EventSink> = self.store.clone();
        *self.pipeline.write() = Some(Arc::new(CapturePipeline::new(domain.clone(), sink)));
        Some(domain)
    }

    /// Clone the intake sender; `None` once the session is stopping.
    pub fn intake_sender(&self) -> Option<mpsc::UnboundedSender<Event>> {
        self.intake_tx.lock().clone()
    }

    /// Take the intake receiver (can only be called once, by the worker).
    pub fn take_intake_rx(&self) -> Option<mpsc::UnboundedReceiver<Event>> {
        self.intake_rx.lock().take()
    }

    /// Stop accepting interaction events; the drain task exits once the
    /// already-queued events are flushed into the store.
    pub fn close_intake(&self) {
        self.intake_tx.lock().take();
    }
}

//! Session store — the single point of truth for one recording run.
//!
//! Producers (capture pipeline, interaction intake) append concurrently in
//! arrival order; a single lock serializes appends. Ordering is only
//! established at finalize time, when events are sorted by timestamp.

use parking_lot::Mutex;
use tracing::{info, warn};

use webtrail_core::{now_ms, Event, EventSink, SessionExport, SessionMeta};
use webtrail_domain::extract_root_domain;

struct Inner {
    meta: SessionMeta,
    events: Vec<Event>,
    finalized: bool,
}

/// Append-only event buffer plus session metadata.
pub struct SessionStore {
    inner: Mutex<Inner>,
}

impl SessionStore {
    /// Start a session. The root domain is derived from the start URL;
    /// placeholder URLs (no usable host) leave it unbound until
    /// [`SessionStore::bind_start`] fires.
    pub fn new(start_url: &str) -> Self {
        let domain = derive_domain(start_url);
        Self {
            inner: Mutex::new(Inner {
                meta: SessionMeta {
                    start_time: now_ms(),
                    end_time: None,
                    start_url: start_url.to_string(),
                    domain,
                },
                events: Vec::new(),
                finalized: false,
            }),
        }
    }

    /// Append an event in arrival order. Safe to call from concurrent
    /// producers. Events arriving after finalize are dropped.
    pub fn add(&self, event: Event) {
        let mut inner = self.inner.lock();
        if inner.finalized {
            warn!("event dropped: session already finalized");
            return;
        }
        inner.events.push(event);
    }

    /// Retroactively bind the start URL and domain once the first real
    /// navigation is known. Returns the bound domain, or `None` when the
    /// domain was already set or the URL has no usable host.
    pub fn bind_start(&self, url: &str) -> Option<String> {
        let mut inner = self.inner.lock();
        if inner.meta.domain.is_some() {
            return None;
        }
        let domain = derive_domain(url)?;
        inner.meta.start_url = url.to_string();
        inner.meta.domain = Some(domain.clone());
        info!("session bound to domain: {}", domain);
        Some(domain)
    }

    /// Current session metadata snapshot.
    pub fn meta(&self) -> SessionMeta {
        self.inner.lock().meta.clone()
    }

    /// Root domain the session filters to, if bound.
    pub fn domain(&self) -> Option<String> {
        self.inner.lock().meta.domain.clone()
    }

    /// Number of buffered events.
    pub fn event_count(&self) -> usize {
        self.inner.lock().events.len()
    }

    /// Close the session: stamp the end time, sort events ascending by
    /// timestamp, and return the immutable export snapshot. Ties keep no
    /// defined relative order. The first call stamps `endTime`; later
    /// `add` calls cannot disturb the returned ordering.
    pub fn finalize(&self) -> SessionExport {
        let mut inner = self.inner.lock();
        if !inner.finalized {
            inner.finalized = true;
            inner.meta.end_time = Some(now_ms());
        }
        inner.events.sort_unstable_by_key(Event::timestamp);
        SessionExport {
            session: inner.meta.clone(),
            events: inner.events.clone(),
        }
    }
}

impl EventSink for SessionStore {
    fn emit(&self, event: Event) -> webtrail_core::Result<()> {
        self.add(event);
        Ok(())
    }
}

fn derive_domain(url: &str) -> Option<String> {
    let domain = extract_root_domain(url);
    if domain.is_empty() {
        None
    } else {
        Some(domain)
    }
}

//! Webtrail Core — shared event model, errors, configuration.

pub mod config;
pub mod error;
pub mod event;

pub use config::{DataPaths, WebtrailConfig};
pub use error::{Error, Result};
pub use event::{
    now_ms, BodyValue, Event, EventSink, InteractionEvent, NetworkEvent, SessionExport,
    SessionMeta, BINARY_MARKER,
};

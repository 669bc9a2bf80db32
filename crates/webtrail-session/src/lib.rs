//! Webtrail Session — event accumulation, chronological merge, export.

pub mod export;
pub mod store;

pub use export::{export_session, session_dir_name};
pub use store::SessionStore;

//! Session export — writes the finalized artifact to disk.

use std::path::Path;

use chrono::{DateTime, Local};
use tracing::info;

use webtrail_core::{Result, SessionExport};

/// Write the finalized session as a pretty-printed JSON artifact.
///
/// Creates the parent directory if needed and overwrites an existing file.
/// The JSON is fully serialized before a single write, so a failure never
/// leaves a partially written artifact behind a successful return. Export
/// failure is the one fatal error of the recording workflow.
pub fn export_session(export: &SessionExport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // serde_json pretty-printing is 2-space indented and leaves
    // non-ASCII characters unescaped.
    let json = serde_json::to_string_pretty(export)?;
    std::fs::write(path, json)?;

    info!("session exported to {}", path.display());
    Ok(())
}

/// Folder name for one recording run: `YYYYMMDDTHHMMSS_domain`, dots in
/// the domain replaced by underscores, `unknown` when never bound.
pub fn session_dir_name(domain: Option<&str>, at: DateTime<Local>) -> String {
    let stamp = at.format("%Y%m%dT%H%M%S");
    let domain_part = domain
        .map(|d| d.replace('.', "_"))
        .unwrap_or_else(|| "unknown".to_string());
    format!("{stamp}_{domain_part}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SessionStore;
    use chrono::TimeZone;
    use webtrail_core::{Event, InteractionEvent};

    #[test]
    fn test_export_round_trip_preserves_non_ascii() {
        let store = SessionStore::new("https://example.com");
        store.add(Event::Interaction(InteractionEvent {
            timestamp: 1000,
            event: "click".into(),
            inner_text: "日本語テスト 🎉".into(),
            ..Default::default()
        }));
        let export = store.finalize();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        export_session(&export, &path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        // Non-ASCII is written verbatim, not \u-escaped.
        assert!(raw.contains("日本語テスト 🎉"));

        let loaded: SessionExport = serde_json::from_str(&raw).unwrap();
        assert_eq!(loaded, export);
    }

    #[test]
    fn test_export_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("session.json");

        let export = SessionStore::new("https://example.com").finalize();
        export_session(&export, &path).unwrap();

        assert!(path.is_file());
    }

    #[test]
    fn test_export_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "stale").unwrap();

        let export = SessionStore::new("https://example.com").finalize();
        export_session(&export, &path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with('{'));
        assert!(!raw.contains("stale"));
    }

    #[test]
    fn test_export_artifact_shape() {
        let store = SessionStore::new("https://shop.example.com/x");
        store.add(Event::Interaction(InteractionEvent {
            timestamp: 100,
            event: "click".into(),
            ..Default::default()
        }));
        let export = store.finalize();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        export_session(&export, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["session"]["domain"], "example.com");
        assert!(value["session"]["startTime"].is_number());
        assert!(value["session"]["endTime"].is_number());
        assert_eq!(value["events"][0]["type"], "interaction");
    }

    #[test]
    fn test_session_dir_name() {
        let at = Local.with_ymd_and_hms(2026, 8, 7, 14, 30, 5).unwrap();
        assert_eq!(
            session_dir_name(Some("example.co.uk"), at),
            "20260807T143005_example_co_uk"
        );
        assert_eq!(session_dir_name(None, at), "20260807T143005_unknown");
    }
}

//! Exporting a live session to disk

use std::sync::Arc;

use chrono::{Local, TimeZone};
use logtail_core::export::{default_file_name, render_session, write_export};
use logtail_core::{MemoryExecutor, SessionRegistry, TailSettings, TargetConfig, shared_executor_factory};

#[tokio::test]
async fn test_export_uses_timestamped_raw_buffer() {
    let host = Arc::new(MemoryExecutor::new());
    host.set_file("/var/log/app.log", "started\nready\n");
    let (registry, _rx) =
        SessionRegistry::new(&TailSettings::default(), shared_executor_factory(host.clone()));
    let session = registry
        .add_target(&TargetConfig::new("web1", "/var/log/app.log"))
        .unwrap();
    registry.set_show_timestamp(session.id(), false).unwrap();
    registry.manual_refresh(session.id()).await.unwrap();

    let now = Local.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap();
    let document = render_session(&session, now);
    assert!(document.starts_with(
        "Log Export from logtail\nExported on: 2025-02-03 04:05:06\nHost: web1\nLog File: /var/log/app.log\n"
    ));

    // timestamps are hidden in the view but always kept in the export
    let content = document.split("=== Log Content ===\n\n").nth(1).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with('[') && lines[0].ends_with("] started"));
    assert!(lines[1].ends_with("] ready"));

    let dir = tempfile::tempdir().unwrap();
    let path = write_export(&dir.path().join(default_file_name(now)), &document, false).unwrap();
    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("log_export_20250203_040506.txt")
    );
    assert_eq!(std::fs::read_to_string(path).unwrap(), document);
}

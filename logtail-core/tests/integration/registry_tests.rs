//! Registry operations on top of the in-memory host

use std::sync::Arc;

use logtail_core::config::ConfigFile;
use logtail_core::{
    DisplayOptions, MemoryExecutor, RegistryError, SessionRegistry, TailError, TailSettings,
    TargetConfig, shared_executor_factory,
};

const PATH: &str = "/var/log/app.log";

fn registry_with(settings: &TailSettings) -> (SessionRegistry, Arc<MemoryExecutor>) {
    let host = Arc::new(MemoryExecutor::new());
    let (registry, _rx) = SessionRegistry::new(settings, shared_executor_factory(host.clone()));
    (registry, host)
}

#[test]
fn test_max_targets_rejects_without_mutation() {
    let settings = TailSettings::default();
    let (registry, _host) = registry_with(&settings);
    for n in 0..settings.max_targets {
        registry
            .add_target(&TargetConfig::new("web1", format!("/var/log/{n}.log")))
            .unwrap();
    }
    let before: Vec<_> = registry.list().iter().map(|s| s.id()).collect();

    let err = registry
        .add_target(&TargetConfig::new("web1", "/var/log/extra.log"))
        .unwrap_err();
    assert_eq!(err.to_string(), "Maximum number of targets reached (100)");

    let after: Vec<_> = registry.list().iter().map(|s| s.id()).collect();
    assert_eq!(before, after);
}

#[test]
fn test_sessions_are_named_after_the_file() {
    let (registry, _host) = registry_with(&TailSettings::default());
    let session = registry
        .add_target(&TargetConfig::new("web1", "/srv/app/logs/server.log"))
        .unwrap();
    assert_eq!(session.name(), "server.log");
    assert!(registry.find_by_name("server.log").is_some());
}

#[tokio::test]
async fn test_truncate_remote_then_refresh() {
    let (registry, host) = registry_with(&TailSettings::default());
    host.set_file(PATH, "old line\n");
    let id = registry
        .add_target(&TargetConfig::new("web1", PATH))
        .unwrap()
        .id();
    registry.manual_refresh(id).await.unwrap();

    registry.truncate_remote(id).await.unwrap();
    assert_eq!(registry.status(id).unwrap().to_string(), "Connected - Log cleared");
    assert!(registry.raw_buffer(id).unwrap().is_empty());

    host.append(PATH, "new line\n");
    registry.set_show_timestamp(id, false).unwrap();
    registry.manual_refresh(id).await.unwrap();
    assert_eq!(registry.rendered_view(id).unwrap(), "new line\n");
}

#[tokio::test]
async fn test_manual_refresh_surfaces_errors() {
    let (registry, host) = registry_with(&TailSettings::default());
    let id = registry
        .add_target(&TargetConfig::new("web1", PATH))
        .unwrap()
        .id();

    host.fail_next("Permission denied (publickey)");
    let err = registry.manual_refresh(id).await.unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Tail(TailError::TargetUnreachable(_))
    ));
    assert_eq!(
        registry.status(id).unwrap().to_string(),
        "Disconnected - Connection error: Permission denied (publickey)"
    );
}

#[tokio::test]
async fn test_configured_ignore_patterns_apply() {
    let config = ConfigFile::parse(
        r#"
        [settings]
        ignore_patterns = ["healthcheck"]

        [[targets]]
        host = "web1"
        path = "/var/log/app.log"
        show_timestamp = false
        "#,
    )
    .unwrap();
    let (registry, host) = registry_with(&config.settings);
    host.set_file(PATH, "GET /healthcheck 200\nJNI_OnLoad called\nreal\n");
    let id = registry.add_target(&config.targets[0]).unwrap().id();

    registry.manual_refresh(id).await.unwrap();
    assert_eq!(
        registry.rendered_view(id).unwrap(),
        "JNI_OnLoad called\nreal\n"
    );
}

#[tokio::test]
async fn test_clear_keeps_session_registered() {
    let (registry, host) = registry_with(&TailSettings::default());
    host.set_file(PATH, "a\n");
    let id = registry
        .add_target(&TargetConfig::new("web1", PATH))
        .unwrap()
        .id();
    registry.manual_refresh(id).await.unwrap();

    registry.clear(id).unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get(id).unwrap().offset(), 0);
    assert!(registry.rendered_view(id).unwrap().is_empty());
}

#[tokio::test]
async fn test_disabling_filter_restores_hidden_repeats() {
    let (registry, host) = registry_with(&TailSettings::default());
    host.set_file(PATH, "same\nsame\n");
    let id = registry
        .add_target(&TargetConfig::new("web1", PATH).with_display(DisplayOptions {
            filter_duplicates: true,
            show_timestamp: false,
        }))
        .unwrap()
        .id();

    registry.manual_refresh(id).await.unwrap();
    host.append(PATH, "same\n");
    registry.manual_refresh(id).await.unwrap();
    assert_eq!(registry.rendered_view(id).unwrap(), "same\n");

    registry.set_filter_duplicates(id, false).unwrap();
    assert_eq!(registry.rendered_view(id).unwrap(), "same\nsame\nsame\n");
}

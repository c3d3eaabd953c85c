//! Monitor loop lifecycle through the registry

use std::sync::Arc;
use std::time::Duration;

use logtail_core::{
    MemoryExecutor, MonitorEvent, SessionRegistry, TailSettings, TargetConfig,
    shared_executor_factory,
};
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

const WAIT: Duration = Duration::from_secs(5);

fn registry(host: &Arc<MemoryExecutor>) -> (SessionRegistry, UnboundedReceiver<MonitorEvent>) {
    let (registry, rx) =
        SessionRegistry::new(&TailSettings::default(), shared_executor_factory(host.clone()));
    (registry.with_interval(Duration::from_millis(10)), rx)
}

fn plain(path: &str) -> TargetConfig {
    let mut config = TargetConfig::new("web1", path);
    config.show_timestamp = false;
    config
}

async fn wait_for_line(rx: &mut UnboundedReceiver<MonitorEvent>, session: Uuid, wanted: &str) {
    tokio::time::timeout(WAIT, async {
        loop {
            match rx.recv().await {
                Some(MonitorEvent::Appended { session: id, lines })
                    if id == session && lines.iter().any(|l| l == wanted) =>
                {
                    return;
                }
                Some(_) => {}
                None => panic!("event channel closed"),
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("line {wanted:?} not rendered in time"));
}

#[tokio::test]
async fn test_loop_follows_a_growing_file() {
    let host = Arc::new(MemoryExecutor::new());
    host.set_file("/var/log/app.log", "one\n");
    let (registry, mut rx) = registry(&host);
    let id = registry.add_target(&plain("/var/log/app.log")).unwrap().id();

    registry.start(id).unwrap();
    wait_for_line(&mut rx, id, "one").await;
    host.append("/var/log/app.log", "two\n");
    wait_for_line(&mut rx, id, "two").await;

    registry.shutdown().await;
    assert_eq!(registry.rendered_view(id).unwrap(), "one\ntwo\n");
    assert!(!registry.get(id).unwrap().is_running());
}

#[tokio::test]
async fn test_restart_resumes_from_offset() {
    let host = Arc::new(MemoryExecutor::new());
    host.set_file("/var/log/app.log", "one\n");
    let (registry, mut rx) = registry(&host);
    let id = registry.add_target(&plain("/var/log/app.log")).unwrap().id();

    registry.start(id).unwrap();
    wait_for_line(&mut rx, id, "one").await;
    registry.stop(id).unwrap();

    host.append("/var/log/app.log", "two\n");
    registry.start(id).unwrap();
    wait_for_line(&mut rx, id, "two").await;
    registry.shutdown().await;

    assert_eq!(registry.rendered_view(id).unwrap(), "one\ntwo\n");
    assert_eq!(registry.get(id).unwrap().offset(), 8);
}

#[tokio::test]
async fn test_targets_are_polled_independently() {
    let host = Arc::new(MemoryExecutor::new());
    let (registry, mut rx) = registry(&host);
    let mut ids = Vec::new();
    for n in 0..5 {
        let path = format!("/var/log/app{n}.log");
        host.set_file(&path, format!("from {n}\n"));
        let id = registry
            .add_target(&plain(&path).with_auto_connect(true))
            .unwrap()
            .id();
        ids.push(id);
    }

    for (n, id) in ids.iter().enumerate() {
        wait_for_line(&mut rx, *id, &format!("from {n}")).await;
    }
    registry.shutdown().await;
}

#[tokio::test]
async fn test_failures_do_not_stop_the_loop() {
    let host = Arc::new(MemoryExecutor::new());
    let (registry, mut rx) = registry(&host);
    let id = registry
        .add_target(&plain("/var/log/late.log").with_auto_connect(true))
        .unwrap()
        .id();

    host.fail_next("ssh: Could not resolve hostname web1");
    tokio::time::sleep(Duration::from_millis(50)).await;
    host.set_file("/var/log/late.log", "finally\n");

    wait_for_line(&mut rx, id, "finally").await;
    assert!(registry.status(id).unwrap().connected);
    registry.shutdown().await;
}

#[tokio::test]
async fn test_stopped_event_is_emitted() {
    let host = Arc::new(MemoryExecutor::new());
    host.set_file("/var/log/app.log", "x\n");
    let (registry, mut rx) = registry(&host);
    let id = registry
        .add_target(&plain("/var/log/app.log").with_auto_connect(true))
        .unwrap()
        .id();
    wait_for_line(&mut rx, id, "x").await;

    registry.shutdown().await;
    let mut stopped = false;
    while let Ok(event) = rx.try_recv() {
        stopped |= event == MonitorEvent::Stopped { session: id };
    }
    assert!(stopped);
}

//! Poll-level scenarios: delta transfer, no-change polls, rotation and
//! clears racing an in-flight fetch.

use std::sync::Arc;
use std::time::Duration;

use logtail_core::{
    DisplayOptions, FetchStatus, LinePipeline, MemoryExecutor, MonitorEvent, Session, Target,
    TailError,
};
use tokio::sync::mpsc;

const PATH: &str = "/var/log/app.log";

fn plain() -> DisplayOptions {
    DisplayOptions {
        filter_duplicates: false,
        show_timestamp: false,
    }
}

fn drain(rx: &mut mpsc::UnboundedReceiver<MonitorEvent>) -> Vec<MonitorEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn appended_lines(events: &[MonitorEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            MonitorEvent::Appended { lines, .. } => Some(lines.clone()),
            _ => None,
        })
        .flatten()
        .collect()
}

#[tokio::test]
async fn test_two_polls_transfer_only_the_delta() {
    let host = MemoryExecutor::new();
    host.set_file(PATH, "hello\nworld\n");
    let session = Session::new("app", Target::ssh("web1", PATH), plain());
    let pipeline = LinePipeline::default();
    let (tx, mut rx) = mpsc::unbounded_channel();

    assert_eq!(
        session.poll(&host, &pipeline, &tx).await.unwrap(),
        FetchStatus::Updated
    );
    assert_eq!(appended_lines(&drain(&mut rx)), vec!["hello", "world"]);
    assert_eq!(session.offset(), 12);

    host.set_file(PATH, "hello\nworld\nfoo\n");
    host.clear_commands();
    session.poll(&host, &pipeline, &tx).await.unwrap();

    assert_eq!(appended_lines(&drain(&mut rx)), vec!["foo"]);
    assert_eq!(session.offset(), 16);
    assert_eq!(
        host.commands().last().map(String::as_str),
        Some("tail -c 4 /var/log/app.log | base64")
    );
}

#[tokio::test]
async fn test_unchanged_size_emits_no_lines() {
    let host = MemoryExecutor::new();
    host.set_file(PATH, "hello\n");
    let session = Session::new("app", Target::ssh("web1", PATH), plain());
    let pipeline = LinePipeline::default();
    let (tx, mut rx) = mpsc::unbounded_channel();

    session.poll(&host, &pipeline, &tx).await.unwrap();
    drain(&mut rx);

    assert_eq!(
        session.poll(&host, &pipeline, &tx).await.unwrap(),
        FetchStatus::NoChanges
    );
    let events = drain(&mut rx);
    assert!(appended_lines(&events).is_empty());
    assert_eq!(session.status().to_string(), "Connected - No changes");
    assert!(
        session
            .status()
            .last_update_text()
            .starts_with("Last Update: ")
    );
}

#[tokio::test]
async fn test_rotated_file_is_reloaded() {
    let host = MemoryExecutor::new();
    host.set_file(PATH, "a long first generation of the log\n");
    let session = Session::new("app", Target::ssh("web1", PATH), plain());
    let pipeline = LinePipeline::default();
    let (tx, _rx) = mpsc::unbounded_channel();
    session.poll(&host, &pipeline, &tx).await.unwrap();

    host.set_file(PATH, "fresh\n");
    assert_eq!(
        session.poll(&host, &pipeline, &tx).await.unwrap(),
        FetchStatus::Rotated
    );
    assert_eq!(session.offset(), 6);
    assert!(session.rendered_view().ends_with("fresh\n"));
    assert_eq!(session.status().message, "Log rotated, reloaded");
}

#[tokio::test]
async fn test_file_appearing_later_is_picked_up() {
    let host = MemoryExecutor::new();
    let session = Session::new("app", Target::ssh("web1", PATH), plain());
    let pipeline = LinePipeline::default();
    let (tx, _rx) = mpsc::unbounded_channel();

    let err = session.poll(&host, &pipeline, &tx).await.unwrap_err();
    assert!(matches!(err, TailError::FileNotFound(_)));

    host.set_file(PATH, "created\n");
    session.poll(&host, &pipeline, &tx).await.unwrap();
    assert_eq!(session.rendered_view(), "created\n");
}

#[tokio::test]
async fn test_clear_during_fetch_discards_result() {
    let host = Arc::new(MemoryExecutor::new().with_latency(Duration::from_millis(50)));
    host.set_file(PATH, "stale\n");
    let session = Arc::new(Session::new("app", Target::ssh("web1", PATH), plain()));
    let pipeline = LinePipeline::default();
    let (tx, _rx) = mpsc::unbounded_channel();

    let poll = session.poll(host.as_ref(), &pipeline, &tx);
    let clear = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        session.clear(&tx);
    };
    let (result, ()) = tokio::join!(poll, clear);

    // the dropped fetch is not reported as an update
    assert_eq!(result.unwrap(), FetchStatus::NoChanges);
    assert_eq!(session.offset(), 0);
    assert!(session.rendered_view().is_empty());
    assert!(session.raw_buffer().is_empty());

    // the next poll starts over from the beginning of the file
    session.poll(host.as_ref(), &pipeline, &tx).await.unwrap();
    assert_eq!(session.rendered_view(), "stale\n");
}

#[tokio::test]
async fn test_control_markers_from_the_remote_side() {
    let host = MemoryExecutor::new();
    host.set_file(PATH, "boot\nstep 1\n");
    let session = Session::new("app", Target::ssh("web1", PATH), plain());
    let pipeline = LinePipeline::default();
    let (tx, _rx) = mpsc::unbounded_channel();
    session.poll(&host, &pipeline, &tx).await.unwrap();

    host.append(PATH, "progress 10%\n\x1b[CB]progress 100%\n");
    session.poll(&host, &pipeline, &tx).await.unwrap();
    assert_eq!(session.rendered_view(), "boot\nstep 1\nprogress 100%\n");

    host.append(PATH, "\x1b[C]after clear\n");
    session.poll(&host, &pipeline, &tx).await.unwrap();
    assert_eq!(session.rendered_view(), "after clear\n");
    assert_eq!(session.offset(), host.file(PATH).unwrap().len() as u64);
}

#[tokio::test]
async fn test_invalid_utf8_is_rendered_lossily() {
    let host = MemoryExecutor::new();
    host.set_file(PATH, b"ok \xff\xfe bytes\n".to_vec());
    let session = Session::new("app", Target::ssh("web1", PATH), plain());
    let (tx, _rx) = mpsc::unbounded_channel();

    session
        .poll(&host, &LinePipeline::default(), &tx)
        .await
        .unwrap();
    assert_eq!(session.rendered_view(), "ok \u{fffd}\u{fffd} bytes\n");
    assert_eq!(session.offset(), 12);
}

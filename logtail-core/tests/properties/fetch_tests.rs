//! Property tests for delta fetching

use logtail_core::{DeltaFetcher, FetchStatus, MemoryExecutor};
use proptest::prelude::*;

const PATH: &str = "/var/log/app.log";

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
}

proptest! {
    /// Property: for a file that only grows, the fetched deltas concatenate to
    /// the file content and no byte is fetched twice
    #[test]
    fn growing_file_is_fetched_exactly_once(
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..200), 1..12),
    ) {
        let host = MemoryExecutor::new();
        host.set_file(PATH, Vec::new());
        let fetcher = DeltaFetcher::new();

        let (received, offset) = runtime().block_on(async {
            let mut received = Vec::new();
            let mut offset = 0u64;
            for chunk in &chunks {
                host.append(PATH, chunk);
                let outcome = fetcher.fetch(&host, PATH, offset).await.unwrap();
                assert!(outcome.new_offset >= offset);
                assert_ne!(outcome.status, FetchStatus::Rotated);
                received.extend_from_slice(&outcome.bytes);
                offset = outcome.new_offset;
            }
            (received, offset)
        });

        let file = host.file(PATH).unwrap();
        prop_assert_eq!(offset, file.len() as u64);
        prop_assert_eq!(received, file);
    }

    /// Property: a poll without growth never transfers bytes or moves the offset
    #[test]
    fn unchanged_file_reports_no_changes(content in prop::collection::vec(any::<u8>(), 1..300)) {
        let host = MemoryExecutor::new();
        host.set_file(PATH, content.clone());
        let len = content.len() as u64;

        let outcome = runtime()
            .block_on(DeltaFetcher::new().fetch(&host, PATH, len))
            .unwrap();
        prop_assert_eq!(outcome.status, FetchStatus::NoChanges);
        prop_assert!(outcome.bytes.is_empty());
        prop_assert_eq!(outcome.new_offset, len);
    }
}

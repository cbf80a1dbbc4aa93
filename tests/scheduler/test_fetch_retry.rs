use std::time::Duration;

use pretty_assertions::assert_eq;

use storepulse_backend::infrastructure::feed::{FeedError, ReviewFetcher};

use crate::scheduler::helpers::{review, ScriptedFetcher};

#[tokio::test(start_paused = true)]
async fn it_should_return_the_first_success_after_transient_failures() {
    let fetcher = ScriptedFetcher::failing_first(2, vec![review("r1", "42")]);

    let started = tokio::time::Instant::now();
    let reviews = fetcher.fetch_with_retry("42", 3).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(reviews.len(), 1);
    assert_eq!(fetcher.calls(), 3);
    // linear backoff: 1s after the first failure, 2s after the second
    assert!(elapsed >= Duration::from_secs(3), "elapsed {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn it_should_give_up_after_exactly_max_attempts() {
    let fetcher = ScriptedFetcher::always_failing();

    let err = fetcher.fetch_with_retry("42", 3).await.unwrap_err();

    assert_eq!(fetcher.calls(), 3);
    match err {
        FeedError::RetriesExhausted { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn it_should_not_retry_after_a_first_attempt_success() {
    let fetcher = ScriptedFetcher::succeeding(vec![review("r1", "42")]);

    let reviews = fetcher.fetch_with_retry("42", 3).await.unwrap();

    assert_eq!(reviews.len(), 1);
    assert_eq!(fetcher.calls(), 1);
}

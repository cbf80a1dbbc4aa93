use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use pretty_assertions::assert_eq;

use storepulse_backend::domain::polling::{PollerStatus, PollingManager};

use crate::scheduler::helpers::{review, InMemoryStore, ScriptedFetcher};

#[tokio::test(start_paused = true)]
async fn it_should_keep_at_most_one_poller_per_app() {
    let store = Arc::new(InMemoryStore::new());
    let fetcher = Arc::new(ScriptedFetcher::succeeding(vec![]));
    let manager = Arc::new(PollingManager::new(store, fetcher));

    // A storm of interleaved start/stop calls for the same id must never
    // leave more than one live poller behind.
    let calls: Vec<_> = (0..16u64)
        .map(|i| {
            let manager = manager.clone();
            tokio::spawn(async move {
                if i % 2 == 0 {
                    manager
                        .start_polling("42", Duration::from_secs(i + 1))
                        .await;
                } else {
                    manager.stop_polling("42").await;
                }
            })
        })
        .collect();
    join_all(calls).await;

    assert!(manager.polling_status().await.len() <= 1);

    manager.start_polling("42", Duration::from_secs(60)).await;
    let status = manager.polling_status().await;
    assert_eq!(status.len(), 1);
    assert_eq!(status["42"].interval_secs, 60);

    manager.stop_all().await;
}

#[tokio::test]
async fn it_should_reject_a_zero_interval() {
    let store = Arc::new(InMemoryStore::new());
    let fetcher = Arc::new(ScriptedFetcher::succeeding(vec![]));
    let manager = PollingManager::new(store, fetcher);

    manager.start_polling("42", Duration::ZERO).await;
    assert!(manager.polling_status().await.is_empty());

    // An invalid interval must not replace an existing poller either
    manager.start_polling("42", Duration::from_secs(60)).await;
    manager.start_polling("42", Duration::ZERO).await;

    let status = manager.polling_status().await;
    assert_eq!(status.len(), 1);
    assert_eq!(status["42"].interval_secs, 60);

    manager.stop_all().await;
}

#[tokio::test(start_paused = true)]
async fn it_should_replace_the_poller_on_reconfiguration() {
    let store = Arc::new(InMemoryStore::new());
    let fetcher = Arc::new(ScriptedFetcher::succeeding(vec![]));
    let manager = PollingManager::new(store, fetcher);

    manager.start_polling("42", Duration::from_secs(5)).await;
    manager.start_polling("42", Duration::from_secs(300)).await;

    let status = manager.polling_status().await;
    assert_eq!(status.len(), 1);
    assert_eq!(status["42"].interval_secs, 300);

    manager.stop_all().await;
}

#[tokio::test(start_paused = true)]
async fn it_should_fire_immediately_and_then_on_the_interval() {
    let store = Arc::new(InMemoryStore::new());
    let fetcher = Arc::new(ScriptedFetcher::succeeding(vec![]));
    let manager = PollingManager::new(store.clone(), fetcher.clone());

    manager.start_polling("42", Duration::from_secs(10)).await;

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(fetcher.calls(), 1);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(fetcher.calls(), 2);

    manager.stop_all().await;
}

#[tokio::test(start_paused = true)]
async fn it_should_store_only_new_reviews_in_a_cycle() {
    let store = Arc::new(InMemoryStore::new());
    let reviews: Vec<_> = (1..=5).map(|i| review(&format!("r{i}"), "42")).collect();
    // Two of the five candidates are already known
    store.seed_review(reviews[0].clone());
    store.seed_review(reviews[1].clone());
    let fetcher = Arc::new(ScriptedFetcher::succeeding(reviews));
    let manager = PollingManager::new(store.clone(), fetcher.clone());

    manager.start_polling("42", Duration::from_secs(3600)).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(fetcher.calls(), 1);
    assert_eq!(store.created(), 3);
    assert_eq!(store.reviews.lock().len(), 5);

    let config = store.configs.lock().get("42").cloned().unwrap();
    assert!(config.last_poll.is_some());
    assert!(config.is_active);
    assert_eq!(config.poll_interval_secs, 3600);

    manager.stop_all().await;
}

#[tokio::test(start_paused = true)]
async fn it_should_not_store_duplicates_across_cycles() {
    let store = Arc::new(InMemoryStore::new());
    let reviews: Vec<_> = (1..=2).map(|i| review(&format!("r{i}"), "42")).collect();
    let fetcher = Arc::new(ScriptedFetcher::succeeding(reviews));
    let manager = PollingManager::new(store.clone(), fetcher.clone());

    manager.start_polling("42", Duration::from_secs(10)).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(store.created(), 2);

    // The same ids come back on the second cycle and are deduplicated
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(fetcher.calls(), 2);
    assert_eq!(store.created(), 2);
    assert_eq!(store.reviews.lock().len(), 2);

    manager.stop_all().await;
}

#[tokio::test(start_paused = true)]
async fn it_should_skip_a_failing_review_without_aborting_the_batch() {
    let store = Arc::new(InMemoryStore::new());
    store.failing_review_ids.lock().insert("r2".to_string());
    let reviews: Vec<_> = (1..=3).map(|i| review(&format!("r{i}"), "42")).collect();
    let fetcher = Arc::new(ScriptedFetcher::succeeding(reviews));
    let manager = PollingManager::new(store.clone(), fetcher.clone());

    manager.start_polling("42", Duration::from_secs(3600)).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(store.created(), 3);
    let stored = store.reviews.lock();
    assert!(stored.contains_key("r1"));
    assert!(!stored.contains_key("r2"));
    assert!(stored.contains_key("r3"));
    drop(stored);

    // The cycle still records that a poll was attempted
    assert!(store.configs.lock().get("42").unwrap().last_poll.is_some());

    manager.stop_all().await;
}

#[tokio::test(start_paused = true)]
async fn it_should_leave_state_untouched_when_the_fetch_fails() {
    let store = Arc::new(InMemoryStore::new());
    let fetcher = Arc::new(ScriptedFetcher::always_failing());
    let manager = PollingManager::new(store.clone(), fetcher.clone());

    manager.start_polling("42", Duration::from_secs(3600)).await;
    // Enough virtual time for all three attempts and their backoffs
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(fetcher.calls(), 3);
    assert!(store.reviews.lock().is_empty());
    assert!(store.configs.lock().is_empty());

    manager.stop_all().await;
}

#[tokio::test(start_paused = true)]
async fn it_should_stop_all_pollers_and_start_no_further_cycles() {
    let store = Arc::new(InMemoryStore::new());
    let fetcher = Arc::new(ScriptedFetcher::succeeding(vec![]));
    let manager = PollingManager::new(store.clone(), fetcher.clone());

    manager.start_polling("42", Duration::from_secs(10)).await;
    manager.start_polling("43", Duration::from_secs(10)).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(fetcher.calls(), 2);

    manager.stop_all().await;
    let calls_at_shutdown = fetcher.calls();

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(fetcher.calls(), calls_at_shutdown);
    assert!(manager.polling_status().await.is_empty());
}

#[tokio::test]
async fn it_should_reflect_the_live_poller_set_in_status() {
    let store = Arc::new(InMemoryStore::new());
    let fetcher = Arc::new(ScriptedFetcher::succeeding(vec![]));
    let manager = PollingManager::new(store, fetcher);

    manager.start_polling("42", Duration::from_secs(300)).await;

    let status = manager.polling_status().await;
    assert_eq!(
        status["42"],
        PollerStatus {
            interval_secs: 300,
            active: true
        }
    );

    manager.stop_polling("42").await;
    assert!(manager.polling_status().await.is_empty());

    manager.stop_all().await;
}

#[tokio::test]
async fn it_should_ignore_stop_for_an_unknown_app() {
    let store = Arc::new(InMemoryStore::new());
    let fetcher = Arc::new(ScriptedFetcher::succeeding(vec![]));
    let manager = PollingManager::new(store, fetcher);

    // Stopping an app that was never started is a no-op
    manager.stop_polling("unknown").await;
    assert!(manager.polling_status().await.is_empty());
}

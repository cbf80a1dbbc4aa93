use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use storepulse_backend::domain::polling::{PollingError, PollingManager};

use crate::scheduler::helpers::{app_config, InMemoryStore, ScriptedFetcher};

#[tokio::test(start_paused = true)]
async fn it_should_start_pollers_only_for_valid_active_configs() {
    let store = Arc::new(InMemoryStore::new());
    *store.active_apps.lock() = vec![
        "good".to_string(),
        "missing".to_string(),
        "invalid".to_string(),
        "inactive".to_string(),
    ];
    store.seed_config(app_config("good", 60, true));
    store.seed_config(app_config("invalid", 0, true));
    store.seed_config(app_config("inactive", 300, false));

    let fetcher = Arc::new(ScriptedFetcher::succeeding(vec![]));
    let manager = PollingManager::new(store.clone(), fetcher);

    manager.start_all().await.unwrap();

    let status = manager.polling_status().await;
    assert_eq!(status.len(), 1);
    assert_eq!(status["good"].interval_secs, 60);

    manager.stop_all().await;
}

#[tokio::test]
async fn it_should_succeed_with_zero_active_apps() {
    let store = Arc::new(InMemoryStore::new());
    let fetcher = Arc::new(ScriptedFetcher::succeeding(vec![]));
    let manager = PollingManager::new(store, fetcher);

    manager.start_all().await.unwrap();
    assert!(manager.polling_status().await.is_empty());
}

#[tokio::test]
async fn it_should_fail_when_the_active_listing_fails() {
    let store = Arc::new(InMemoryStore::new());
    store.fail_active_apps.store(true, Ordering::SeqCst);
    let fetcher = Arc::new(ScriptedFetcher::succeeding(vec![]));
    let manager = PollingManager::new(store, fetcher);

    let err = manager.start_all().await.unwrap_err();
    assert!(matches!(err, PollingError::Store(_)));
    assert!(manager.polling_status().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn it_should_poll_started_apps_after_startup() {
    let store = Arc::new(InMemoryStore::new());
    *store.active_apps.lock() = vec!["42".to_string()];
    store.seed_config(app_config("42", 60, true));

    let fetcher = Arc::new(ScriptedFetcher::succeeding(vec![]));
    let manager = PollingManager::new(store.clone(), fetcher.clone());

    manager.start_all().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    // First cycle fires immediately and records the poll attempt
    assert_eq!(fetcher.calls(), 1);
    assert!(store.configs.lock().get("42").unwrap().last_poll.is_some());

    manager.stop_all().await;
}

use deepdive_core::config::StorageConfig;
use deepdive_core::persona::PersonaId;
use deepdive_core::session::{DeepDiveSession, Exchange, ExchangeKind, Phase, Stage};
use deepdive_core::store::KeyValueStore;
use deepdive_infrastructure::{AtomicJsonFileStore, InMemoryKeyValueStore, SessionStore};
use std::sync::Arc;
use tempfile::TempDir;

fn paused_session() -> DeepDiveSession {
    let mut session = DeepDiveSession::new("Should I move to Lisbon?");
    let persona = PersonaId::new(2).unwrap();
    session.push(Exchange::new(1, persona, ExchangeKind::Probe, "Why now?"));
    session.phase = Phase::Paused(Stage::Round1);
    session
}

#[tokio::test]
async fn test_paused_session_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let config = StorageConfig::default();
    let session = paused_session();

    {
        let store = SessionStore::new(Arc::new(AtomicJsonFileStore::new(temp_dir.path())), &config);
        store.save_active(&session).await.unwrap();
    }

    let store = SessionStore::new(Arc::new(AtomicJsonFileStore::new(temp_dir.path())), &config);
    let loaded = store.load_active().await.expect("session should load");
    assert_eq!(loaded, session);
    assert!(loaded.exchanges[0].is_open());
}

#[tokio::test]
async fn test_malformed_json_is_no_session() {
    let kv = Arc::new(InMemoryKeyValueStore::new());
    let config = StorageConfig::default();
    kv.set(&config.active_session_key, "{\"id\": 42").await.unwrap();

    let store = SessionStore::new(kv, &config);
    assert!(store.load_active().await.is_none());
    assert!(store.try_load_active().await.unwrap_err().is_unreadable());
}

#[tokio::test]
async fn test_unknown_version_is_no_session() {
    let kv = Arc::new(InMemoryKeyValueStore::new());
    let config = StorageConfig::default();
    let mut session = paused_session();
    session.version = 99;
    kv.set(&config.active_session_key, &serde_json::to_string(&session).unwrap())
        .await
        .unwrap();

    let store = SessionStore::new(kv, &config);
    assert!(store.load_active().await.is_none());
}

#[tokio::test]
async fn test_clear_active() {
    let kv = Arc::new(InMemoryKeyValueStore::new());
    let store = SessionStore::new(kv, &StorageConfig::default());
    store.save_active(&paused_session()).await.unwrap();

    store.clear_active().await.unwrap();
    assert!(store.load_active().await.is_none());
}

#[tokio::test]
async fn test_history_is_bounded_and_ordered() {
    let kv = Arc::new(InMemoryKeyValueStore::new());
    let config = StorageConfig {
        history_limit: 2,
        ..StorageConfig::default()
    };
    let store = SessionStore::new(kv, &config);

    let sessions: Vec<DeepDiveSession> = (0..3)
        .map(|i| {
            let mut s = DeepDiveSession::new(format!("problem {}", i));
            s.phase = Phase::Complete;
            s
        })
        .collect();
    for session in &sessions {
        store.archive(session).await.unwrap();
    }

    let history = store.history().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].problem, "problem 1");
    assert_eq!(history[1].problem, "problem 2");
}

use seavoice_core::models::filters::{Filters, Region};
use seavoice_core::models::language::Language;
use seavoice_core::models::message::Transcript;
use seavoice_core::models::persona::Persona;
use seavoice_core::models::snapshot::{ChatSnapshot, HighScore, SessionSnapshot};
use seavoice_core::models::visualization::VisualizationPayload;
use seavoice_storage::error::StorageError;
use seavoice_storage::slots::{Slot, SlotStore};

fn session() -> SessionSnapshot {
    let mut transcript = Transcript::default();
    transcript.push_user("Map floats near the equator");
    let reply = transcript.begin_assistant();
    transcript.update_in_flight(reply, "Here are the floats.");
    transcript.seal(reply);

    let mut filters = Filters::default();
    filters.set_region(Region::PacificOcean);

    SessionSnapshot {
        messages: transcript.into_messages(),
        filters,
        language: Language::De,
        last_visualization: VisualizationPayload::welcome("Welcome to Sea Voice"),
        last_summary: Some("Here are the floats.".to_string()),
    }
}

#[tokio::test]
async fn save_then_load_returns_same_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = SlotStore::new(dir.path().join("nested"));

    let snapshot = session();
    store.save(Slot::Explorer, &snapshot).await.unwrap();
    let loaded: SessionSnapshot = store.load(Slot::Explorer).await.unwrap();

    assert_eq!(loaded, snapshot);
    assert!(store.path(Slot::Explorer).ends_with("explorer.json"));
    assert!(!dir.path().join("nested/explorer.json.tmp").exists());
}

#[tokio::test]
async fn missing_slot_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = SlotStore::new(dir.path());

    let result = store.load::<HighScore>(Slot::TriviaHighScore).await;
    assert!(matches!(result, Err(StorageError::NotFound { .. })));
    assert_eq!(
        store.load_optional::<HighScore>(Slot::TriviaHighScore).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn document_without_required_keys_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = SlotStore::new(dir.path());
    std::fs::write(
        store.path(Slot::Explorer),
        r#"{"messages": [], "language": "en"}"#,
    )
    .unwrap();

    match store.load::<SessionSnapshot>(Slot::Explorer).await {
        Err(StorageError::MissingKeys { slot, keys }) => {
            assert_eq!(slot, "explorer");
            assert_eq!(keys, vec!["filters", "lastVisualization", "lastSummary"]);
        }
        other => panic!("expected missing keys, got {other:?}"),
    }
}

#[tokio::test]
async fn slots_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let store = SlotStore::new(dir.path());

    store
        .save(Slot::TriviaHighScore, &HighScore { high_score: 35 })
        .await
        .unwrap();
    store
        .save(
            Slot::Chat,
            &ChatSnapshot {
                messages: Vec::new(),
                language: Language::Ja,
                persona: Persona::Summarizer,
            },
        )
        .await
        .unwrap();

    let score: HighScore = store.load(Slot::TriviaHighScore).await.unwrap();
    let chat: ChatSnapshot = store.load(Slot::Chat).await.unwrap();
    assert_eq!(score.high_score, 35);
    assert_eq!(chat.persona, Persona::Summarizer);

    store.delete(Slot::Chat).await.unwrap();
    store.delete(Slot::Chat).await.unwrap();
    assert!(store.load_optional::<ChatSnapshot>(Slot::Chat).await.unwrap().is_none());
    assert!(store.load_optional::<HighScore>(Slot::TriviaHighScore).await.unwrap().is_some());
}

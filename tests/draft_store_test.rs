use coverform::adapters::{DraftAutosaver, FileDraftStore};
use coverform::domain::AnswerMap;
use coverform::drafts::DraftStore;
use coverform::session::FormSession;
use std::time::Duration;
use tempfile::TempDir;

mod common;

fn answers(owner: &str) -> AnswerMap {
    let mut answers = AnswerMap::new();
    answers.set("owner", owner);
    answers
}

#[tokio::test]
async fn test_autosave_waits_for_quiet_period() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileDraftStore::new(temp_dir.path());
    let path = store.path_for("home");

    let saver = DraftAutosaver::spawn(store.clone(), Duration::from_millis(200));
    saver.schedule("home", &answers("A")).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    saver.schedule("home", &answers("Ad")).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    saver.schedule("home", &answers("Ada")).unwrap();

    // Still inside the debounce window of the last change
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!path.exists());

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(store.load("home").unwrap(), Some(answers("Ada")));

    saver.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_draft_survives_new_session() {
    let temp_dir = TempDir::new().unwrap();

    let mut session = FormSession::new(FileDraftStore::new(temp_dir.path()));
    session.load_forms(vec![common::home_form(), common::auto_form()]).unwrap();
    session.set_answer("owner", "Ada");
    session.toggle_choice("extras", "fire", true);
    session.set_answer("newsletter", true);
    session.persist_draft().unwrap();

    let mut restored = FormSession::new(FileDraftStore::new(temp_dir.path()));
    restored.load_forms(vec![common::home_form(), common::auto_form()]).unwrap();
    assert_eq!(restored.answers(), session.answers());
    assert!(temp_dir.path().join("draft-home.json").exists());

    restored.select_form("auto").unwrap();
    assert!(restored.answers().is_empty());
}

#[tokio::test]
async fn test_corrupt_draft_file_starts_empty() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("draft-home.json"), "{ not json").unwrap();

    let mut session = FormSession::new(FileDraftStore::new(temp_dir.path()));
    session.load_forms(vec![common::home_form()]).unwrap();
    assert!(session.answers().is_empty());
}

//! Debounced draft persistence
//!
//! A background task owns the draft store and receives answer snapshots over
//! a channel. Only the newest snapshot is written, once no new snapshot has
//! arrived for the debounce window. Pending work is flushed on shutdown.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::{AnswerMap, PersistenceError};
use crate::drafts::{DraftStore, DRAFT_DEBOUNCE_MS};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(DRAFT_DEBOUNCE_MS as u64);

enum Command {
    Save { form_id: String, answers: AnswerMap },
    Discard { form_id: String },
}

pub struct DraftAutosaver<S> {
    tx: mpsc::UnboundedSender<Command>,
    handle: JoinHandle<S>,
}

impl<S> DraftAutosaver<S>
where
    S: DraftStore + Send + 'static,
{
    /// Spawns the autosave task on the current tokio runtime
    pub fn spawn(store: S, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(store, rx, debounce));
        Self { tx, handle }
    }

    /// Queues a snapshot; replaces any snapshot still waiting
    pub fn schedule(&self, form_id: &str, answers: &AnswerMap) -> Result<(), PersistenceError> {
        self.send(Command::Save {
            form_id: form_id.to_string(),
            answers: answers.clone(),
        })
    }

    /// Drops a waiting snapshot for `form_id` and removes its stored draft
    pub fn discard(&self, form_id: &str) -> Result<(), PersistenceError> {
        self.send(Command::Discard {
            form_id: form_id.to_string(),
        })
    }

    /// Flushes pending work and hands the store back
    pub async fn shutdown(self) -> Result<S, PersistenceError> {
        drop(self.tx);
        self.handle
            .await
            .map_err(|e| PersistenceError::Storage(format!("Autosave task failed: {}", e)))
    }

    fn send(&self, command: Command) -> Result<(), PersistenceError> {
        self.tx
            .send(command)
            .map_err(|_| PersistenceError::Storage("Autosave task is not running".to_string()))
    }
}

async fn run<S: DraftStore>(mut store: S, mut rx: mpsc::UnboundedReceiver<Command>, debounce: Duration) -> S {
    let mut pending: Option<(String, AnswerMap)> = None;

    loop {
        let command = if pending.is_some() {
            match tokio::time::timeout(debounce, rx.recv()).await {
                Ok(command) => command,
                Err(_) => {
                    flush(&mut store, &mut pending);
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match command {
            Some(Command::Save { form_id, answers }) => {
                // A snapshot for another form must not be lost by replacement
                if pending.as_ref().is_some_and(|(id, _)| *id != form_id) {
                    flush(&mut store, &mut pending);
                }
                pending = Some((form_id, answers));
            }
            Some(Command::Discard { form_id }) => {
                if pending.as_ref().is_some_and(|(id, _)| *id == form_id) {
                    pending = None;
                }
                if let Err(e) = store.remove(&form_id) {
                    warn!("Failed to remove draft for {}: {}", form_id, e);
                }
            }
            None => {
                flush(&mut store, &mut pending);
                return store;
            }
        }
    }
}

fn flush<S: DraftStore>(store: &mut S, pending: &mut Option<(String, AnswerMap)>) {
    if let Some((form_id, answers)) = pending.take() {
        match store.save(&form_id, &answers) {
            Ok(()) => debug!("Autosaved draft for {}", form_id),
            Err(e) => warn!("Failed to autosave draft for {}: {}", form_id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drafts::InMemoryDraftStore;

    fn answers(name: &str) -> AnswerMap {
        let mut answers = AnswerMap::new();
        answers.set("owner", name);
        answers
    }

    #[tokio::test]
    async fn test_shutdown_flushes_latest_snapshot() {
        let saver = DraftAutosaver::spawn(InMemoryDraftStore::new(), Duration::from_secs(60));
        saver.schedule("home", &answers("A")).unwrap();
        saver.schedule("home", &answers("Ada")).unwrap();

        let store = saver.shutdown().await.unwrap();
        assert_eq!(store.load("home").unwrap(), Some(answers("Ada")));
    }

    #[tokio::test]
    async fn test_switching_forms_keeps_both() {
        let saver = DraftAutosaver::spawn(InMemoryDraftStore::new(), Duration::from_secs(60));
        saver.schedule("home", &answers("Ada")).unwrap();
        saver.schedule("auto", &answers("Bob")).unwrap();

        let store = saver.shutdown().await.unwrap();
        assert_eq!(store.load("home").unwrap(), Some(answers("Ada")));
        assert_eq!(store.load("auto").unwrap(), Some(answers("Bob")));
    }

    #[tokio::test]
    async fn test_discard_drops_pending_snapshot() {
        let mut store = InMemoryDraftStore::new();
        store.save("home", &answers("Old")).unwrap();

        let saver = DraftAutosaver::spawn(store, Duration::from_secs(60));
        saver.schedule("home", &answers("Ada")).unwrap();
        saver.discard("home").unwrap();

        let store = saver.shutdown().await.unwrap();
        assert_eq!(store.load("home").unwrap(), None);
    }
}

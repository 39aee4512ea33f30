//! Ordered outcome history with optional JSON-file persistence.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use super::{ResultSink, StoreEvent};
use crate::errors::{PhotoflowError, PhotoflowResult};
use crate::models::ItemOutcome;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Outcome history, newest batch first
#[derive(Debug)]
pub struct OutcomeStore {
    outcomes: RwLock<Vec<ItemOutcome>>,
    history_path: Option<PathBuf>,
    /// Serializes snapshot + write so the file always reflects the latest mutation
    persist_lock: Mutex<()>,
    events: broadcast::Sender<StoreEvent>,
}

impl OutcomeStore {
    /// Memory-only store
    pub fn in_memory() -> Self {
        Self::with_outcomes(Vec::new(), None)
    }

    /// Store mirrored to a JSON file.
    ///
    /// A missing file starts an empty history. An unreadable or corrupt file
    /// is logged and also starts empty; it is overwritten on the next change.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let outcomes = match load_history(&path).await {
            Ok(outcomes) => {
                debug!(path = %path.display(), count = outcomes.len(), "Loaded outcome history");
                outcomes
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load outcome history, starting empty"
                );
                Vec::new()
            }
        };
        Self::with_outcomes(outcomes, Some(path))
    }

    fn with_outcomes(outcomes: Vec<ItemOutcome>, history_path: Option<PathBuf>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            outcomes: RwLock::new(outcomes),
            history_path,
            persist_lock: Mutex::new(()),
            events,
        }
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn history_path(&self) -> Option<&Path> {
        self.history_path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Snapshot of the full history
    pub fn list(&self) -> Vec<ItemOutcome> {
        self.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<ItemOutcome> {
        self.read().iter().find(|o| o.id == id).cloned()
    }

    /// Distinct categories in first-seen order
    pub fn categories(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for category in self.read().iter().flat_map(|o| o.categories.iter()) {
            if !seen.contains(category) {
                seen.push(category.clone());
            }
        }
        seen
    }

    /// Outcomes whose title, description or categories contain `term`
    pub fn search(&self, term: &str) -> Vec<ItemOutcome> {
        self.read()
            .iter()
            .filter(|o| o.matches_search(term))
            .cloned()
            .collect()
    }

    /// Outcomes tagged with exactly `category`
    pub fn filter_by_category(&self, category: &str) -> Vec<ItemOutcome> {
        self.read()
            .iter()
            .filter(|o| o.categories.iter().any(|c| c == category))
            .cloned()
            .collect()
    }

    /// Prepend a batch, keeping its internal order, and persist it
    pub async fn try_append_batch(&self, outcomes: Vec<ItemOutcome>) -> PhotoflowResult<()> {
        let count = outcomes.len();
        let _guard = self.persist_lock.lock().await;
        {
            let mut history = self.write();
            history.splice(0..0, outcomes);
        }
        let persisted = self.persist().await;
        self.notify(StoreEvent::BatchAppended { count });
        persisted
    }

    /// Remove one outcome by id; returns whether it existed
    pub async fn remove(&self, id: &str) -> PhotoflowResult<bool> {
        let _guard = self.persist_lock.lock().await;
        let removed = {
            let mut history = self.write();
            let before = history.len();
            history.retain(|o| o.id != id);
            history.len() != before
        };
        if !removed {
            return Ok(false);
        }
        self.persist().await?;
        self.notify(StoreEvent::Removed { id: id.to_string() });
        Ok(true)
    }

    /// Drop the whole history
    pub async fn clear(&self) -> PhotoflowResult<()> {
        let _guard = self.persist_lock.lock().await;
        self.write().clear();
        self.persist().await?;
        self.notify(StoreEvent::Cleared);
        Ok(())
    }

    async fn persist(&self) -> PhotoflowResult<()> {
        let Some(path) = &self.history_path else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(&*self.read())?;

        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json)
            .await
            .map_err(|e| PhotoflowError::storage("write_history", e.to_string()))?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|e| PhotoflowError::storage("replace_history", e.to_string()))?;
        Ok(())
    }

    fn notify(&self, event: StoreEvent) {
        // No subscribers is not an error
        let _ = self.events.send(event);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<ItemOutcome>> {
        self.outcomes.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<ItemOutcome>> {
        self.outcomes.write().unwrap_or_else(|p| p.into_inner())
    }
}

impl Default for OutcomeStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[async_trait]
impl ResultSink for OutcomeStore {
    async fn append_batch(&self, outcomes: Vec<ItemOutcome>) {
        let count = outcomes.len();
        match self.try_append_batch(outcomes).await {
            Ok(()) => info!(count, total = self.len(), "Outcome batch stored"),
            Err(e) => warn!(count, error = %e, "Outcome batch kept in memory but not persisted"),
        }
    }
}

async fn load_history(path: &Path) -> PhotoflowResult<Vec<ItemOutcome>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArtifactRef, ColorCorrection, OutcomeMetadata, OutcomeStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn outcome(id: &str, title: &str, categories: &[&str]) -> ItemOutcome {
        let item_id = Uuid::now_v7();
        let source = ArtifactRef::Source {
            item_id,
            file_name: format!("{id}.jpg"),
        };
        ItemOutcome {
            id: id.to_string(),
            item_id,
            status: OutcomeStatus::Succeeded,
            title: title.to_string(),
            description: format!("{title} at dawn"),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            original: source.clone(),
            processed: source,
            color_correction: ColorCorrection::default(),
            metadata: OutcomeMetadata::default(),
            error: None,
            upload_date: Utc::now(),
            recorded_at: Utc::now(),
        }
    }

    fn ids(outcomes: &[ItemOutcome]) -> Vec<&str> {
        outcomes.iter().map(|o| o.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_new_batch_is_prepended_in_order() {
        let store = OutcomeStore::in_memory();
        store
            .try_append_batch(vec![
                outcome("a", "Alps", &["snow"]),
                outcome("b", "Bay", &["water"]),
            ])
            .await
            .unwrap();
        store
            .try_append_batch(vec![
                outcome("c", "Canyon", &["rock"]),
                outcome("d", "Dunes", &["sand"]),
            ])
            .await
            .unwrap();

        assert_eq!(ids(&store.list()), vec!["c", "d", "a", "b"]);
    }

    #[tokio::test]
    async fn test_subscribers_receive_change_events() {
        let store = OutcomeStore::in_memory();
        let mut events = store.subscribe();

        store.append_batch(vec![outcome("a", "Alps", &[])]).await;
        assert!(store.remove("a").await.unwrap());
        store.clear().await.unwrap();

        assert_eq!(events.recv().await.unwrap(), StoreEvent::BatchAppended { count: 1 });
        assert_eq!(
            events.recv().await.unwrap(),
            StoreEvent::Removed { id: "a".to_string() }
        );
        assert_eq!(events.recv().await.unwrap(), StoreEvent::Cleared);
    }

    #[tokio::test]
    async fn test_remove_unknown_id_is_noop() {
        let store = OutcomeStore::in_memory();
        let mut events = store.subscribe();
        store.append_batch(vec![outcome("a", "Alps", &[])]).await;
        let _ = events.recv().await;

        assert!(!store.remove("missing").await.unwrap());
        assert_eq!(store.len(), 1);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_queries() {
        let store = OutcomeStore::in_memory();
        store
            .append_batch(vec![
                outcome("a", "Alpine Lake", &["lake", "mountains"]),
                outcome("b", "Coastline", &["ocean", "cliffs"]),
                outcome("c", "Pine Forest", &["forest", "mountains"]),
            ])
            .await;

        assert_eq!(
            store.categories(),
            vec!["lake", "mountains", "ocean", "cliffs", "forest"]
        );
        assert_eq!(ids(&store.search("PINE")), vec!["c"]);
        assert_eq!(ids(&store.search("ocean")), vec!["b"]);
        assert_eq!(ids(&store.filter_by_category("mountains")), vec!["a", "c"]);
        assert!(store.filter_by_category("mount").is_empty());
        assert_eq!(store.get("b").unwrap().title, "Coastline");
    }

    #[tokio::test]
    async fn test_history_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let store = OutcomeStore::open(&path).await;
        assert!(store.is_empty());
        store
            .append_batch(vec![outcome("a", "Alps", &["snow"]), outcome("b", "Bay", &["water"])])
            .await;
        assert!(store.remove("a").await.unwrap());

        let reopened = OutcomeStore::open(&path).await;
        assert_eq!(ids(&reopened.list()), vec!["b"]);
        assert_eq!(reopened.history_path(), Some(path.as_path()));
    }

    #[tokio::test]
    async fn test_corrupt_history_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        let store = OutcomeStore::open(&path).await;
        assert!(store.is_empty());

        store.append_batch(vec![outcome("a", "Alps", &[])]).await;
        let reopened = OutcomeStore::open(&path).await;
        assert_eq!(reopened.len(), 1);
    }

    #[tokio::test]
    async fn test_unwritable_history_keeps_batch_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("history.json");

        let store = OutcomeStore::open(&path).await;
        let result = store.try_append_batch(vec![outcome("a", "Alps", &[])]).await;

        assert!(matches!(result, Err(PhotoflowError::StorageError { .. })));
        assert_eq!(store.len(), 1);
    }
}

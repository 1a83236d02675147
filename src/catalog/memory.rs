//! Catalog served from memory, for offline play and tests.

use super::{CatalogError, CatalogErrorKind, PlayerCatalog};
use crate::player::{PlayerId, PlayerOption, PlayerRecord};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Fixed set of player records.
///
/// Supports simulated latency and injected transport failures so session
/// timeout and rollback paths can be exercised without a server.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    records: Vec<PlayerRecord>,
    latency: Option<Duration>,
    failures_pending: AtomicUsize,
    fetches: AtomicUsize,
}

impl InMemoryCatalog {
    /// Creates a catalog over `records`, listed in the given order.
    #[instrument(skip(records), fields(count = records.len()))]
    pub fn new(records: Vec<PlayerRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Loads a JSON array of player records from disk.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            CatalogError::new(
                CatalogErrorKind::Transport,
                format!("Failed to read catalog file: {}", e),
            )
        })?;
        let records: Vec<PlayerRecord> = serde_json::from_str(&content)?;
        info!(count = records.len(), "Loaded offline catalog");
        Ok(Self::new(records))
    }

    /// Delays every fetch by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes the next `count` fetches fail with a transport error.
    pub fn fail_next_fetches(&self, count: usize) {
        self.failures_pending.store(count, Ordering::SeqCst);
    }

    /// Fetches attempted so far, failed ones included.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Every record held.
    pub fn records(&self) -> &[PlayerRecord] {
        &self.records
    }

    fn take_failure(&self) -> bool {
        self.failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait::async_trait]
impl PlayerCatalog for InMemoryCatalog {
    #[instrument(skip(self))]
    async fn list_players(&self) -> Result<Vec<PlayerOption>, CatalogError> {
        Ok(self.records.iter().map(PlayerRecord::option).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_player(&self, player_id: PlayerId) -> Result<PlayerRecord, CatalogError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.take_failure() {
            warn!(player_id, "Injected fetch failure");
            return Err(CatalogError::new(
                CatalogErrorKind::Transport,
                format!("Injected failure fetching player {}", player_id),
            ));
        }

        let record = self
            .records
            .iter()
            .find(|record| *record.player_id() == player_id)
            .cloned()
            .ok_or_else(|| {
                CatalogError::new(
                    CatalogErrorKind::NotFound,
                    format!("No player with id {}", player_id),
                )
            })?;

        debug!(player_id, "Served record from memory");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(vec![
            PlayerRecord::new(1, "Hagi"),
            PlayerRecord::new(2, "Alex"),
        ])
    }

    #[tokio::test]
    async fn test_lists_in_order() {
        let names: Vec<String> = catalog()
            .list_players()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.name)
            .collect();
        assert_eq!(names, ["Hagi", "Alex"]);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let err = catalog().fetch_player(9).await.unwrap_err();
        assert_eq!(err.kind, CatalogErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed() {
        let catalog = catalog();
        catalog.fail_next_fetches(1);
        assert!(catalog.fetch_player(1).await.is_err());
        assert_eq!(catalog.fetch_player(1).await.unwrap().name(), "Hagi");
        assert_eq!(catalog.fetch_count(), 2);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("players.json");
        std::fs::write(&path, r#"[{"player_id": 3, "name": "Rüştü", "age": 51}]"#)
            .expect("Failed to write catalog");
        let catalog = InMemoryCatalog::from_json_file(&path).unwrap();
        assert_eq!(catalog.records().len(), 1);
        assert_eq!(catalog.records()[0].age(), "51");
    }
}

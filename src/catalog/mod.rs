//! Player catalog: the remote store of options and detail records.

mod http;
mod memory;

pub use http::{HttpCatalog, RecordStyle};
pub use memory::InMemoryCatalog;

use crate::player::{PlayerId, PlayerOption, PlayerRecord};
use derive_more::{Display, Error};
use std::sync::Arc;
use tracing::instrument;

/// Read access to the player catalog.
#[async_trait::async_trait]
pub trait PlayerCatalog: Send + Sync + std::fmt::Debug {
    /// Lists every selectable player.
    async fn list_players(&self) -> Result<Vec<PlayerOption>, CatalogError>;

    /// Fetches the full record for one player.
    async fn fetch_player(&self, player_id: PlayerId) -> Result<PlayerRecord, CatalogError>;
}

#[async_trait::async_trait]
impl<C: PlayerCatalog + ?Sized> PlayerCatalog for Arc<C> {
    async fn list_players(&self) -> Result<Vec<PlayerOption>, CatalogError> {
        (**self).list_players().await
    }

    async fn fetch_player(&self, player_id: PlayerId) -> Result<PlayerRecord, CatalogError> {
        (**self).fetch_player(player_id).await
    }
}

/// What went wrong talking to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CatalogErrorKind {
    /// Connection, TLS or timeout failure below HTTP.
    #[display("transport")]
    Transport,
    /// Server answered with a non-success status.
    #[display("status {}", _0)]
    Status(u16),
    /// Body did not have the expected shape.
    #[display("decode")]
    Decode,
    /// No player with the requested id.
    #[display("not found")]
    NotFound,
}

/// Catalog error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Catalog error ({}): {} at {}:{}", kind, message, file, line)]
pub struct CatalogError {
    /// Failure category.
    pub kind: CatalogErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl CatalogError {
    /// Creates a new catalog error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: CatalogErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self.kind {
            CatalogErrorKind::Transport => true,
            CatalogErrorKind::Status(code) => code >= 500 || code == 429,
            CatalogErrorKind::Decode | CatalogErrorKind::NotFound => false,
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        let kind = match err.status() {
            Some(status) => CatalogErrorKind::Status(status.as_u16()),
            None if err.is_decode() => CatalogErrorKind::Decode,
            None => CatalogErrorKind::Transport,
        };
        Self::new(kind, format!("HTTP error: {}", err))
    }
}

impl From<serde_json::Error> for CatalogError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(CatalogErrorKind::Decode, format!("JSON error: {}", err))
    }
}

//! reqwest-backed catalog client.

use super::{CatalogError, CatalogErrorKind, PlayerCatalog};
use crate::player::{PlayerId, PlayerOption, PlayerRecord};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// How the record endpoint addresses a player.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecordStyle {
    /// `GET {base}/players/{id}`
    #[default]
    Path,
    /// `GET {base}?id={id}`
    Query,
}

/// HTTP client for the remote player catalog.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    base_url: String,
    client: reqwest::Client,
    record_style: RecordStyle,
}

impl HttpCatalog {
    /// Creates a client for `base_url` with a per-request timeout.
    #[instrument(skip(base_url), fields(base_url = %base_url.as_ref()))]
    pub fn new(
        base_url: impl AsRef<str>,
        timeout: Duration,
        record_style: RecordStyle,
    ) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.as_ref().trim_end_matches('/').to_string();
        info!(base_url = %base_url, ?record_style, "Creating catalog client");
        Ok(Self {
            base_url,
            client,
            record_style,
        })
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn list_url(&self) -> String {
        format!("{}/players", self.base_url)
    }

    fn record_url(&self, player_id: PlayerId) -> String {
        match self.record_style {
            RecordStyle::Path => format!("{}/players/{}", self.base_url, player_id),
            RecordStyle::Query => format!("{}?id={}", self.base_url, player_id),
        }
    }

    async fn get_text(&self, url: &str) -> Result<String, CatalogError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            error!(error = ?e, url, "Catalog request failed");
            CatalogError::from(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = %status, url, "Catalog returned error status");
            let kind = if status == reqwest::StatusCode::NOT_FOUND {
                CatalogErrorKind::NotFound
            } else {
                CatalogErrorKind::Status(status.as_u16())
            };
            return Err(CatalogError::new(
                kind,
                format!("GET {} returned {}: {}", url, status, body),
            ));
        }

        debug!(url, bytes = body.len(), "Catalog response received");
        Ok(body)
    }
}

#[async_trait::async_trait]
impl PlayerCatalog for HttpCatalog {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn list_players(&self) -> Result<Vec<PlayerOption>, CatalogError> {
        let body = self.get_text(&self.list_url()).await?;
        let options = decode_options(&body)?;
        info!(count = options.len(), "Listed players");
        Ok(options)
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_player(&self, player_id: PlayerId) -> Result<PlayerRecord, CatalogError> {
        let body = self.get_text(&self.record_url(player_id)).await?;
        let record = decode_record(&body)?;
        debug!(player_id, name = %record.name(), "Fetched player record");
        Ok(record)
    }
}

#[derive(Deserialize)]
struct WireOption {
    id: Option<PlayerId>,
    player_id: Option<PlayerId>,
    name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody {
    Bare(Vec<WireOption>),
    Wrapped { result: ListResult },
}

#[derive(Deserialize)]
struct ListResult {
    players: Vec<WireOption>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordBody {
    Wrapped { result: RecordResult },
    Bare(serde_json::Value),
}

#[derive(Deserialize)]
struct RecordResult {
    player: serde_json::Value,
}

/// Parses the option list, bare or wrapped in `result.players`.
pub(crate) fn decode_options(body: &str) -> Result<Vec<PlayerOption>, CatalogError> {
    let wire = match serde_json::from_str::<ListBody>(body)? {
        ListBody::Bare(players) => players,
        ListBody::Wrapped { result } => result.players,
    };

    wire.into_iter()
        .map(|option| {
            let player_id = option.player_id.or(option.id).ok_or_else(|| {
                CatalogError::new(
                    CatalogErrorKind::Decode,
                    format!("Player '{}' has no id", option.name),
                )
            })?;
            Ok(PlayerOption::new(player_id, option.name))
        })
        .collect()
}

/// Parses a record, wrapped in `result.player` or bare. The id comes from
/// `player_id`, falling back to `id`.
pub(crate) fn decode_record(body: &str) -> Result<PlayerRecord, CatalogError> {
    let mut player = match serde_json::from_str::<RecordBody>(body)? {
        RecordBody::Wrapped { result } => result.player,
        RecordBody::Bare(value) => value,
    };

    let object = player.as_object_mut().ok_or_else(|| {
        CatalogError::new(CatalogErrorKind::Decode, "Player record is not an object")
    })?;
    if !object.contains_key("player_id") {
        let id = object.get("id").cloned().ok_or_else(|| {
            CatalogError::new(CatalogErrorKind::Decode, "Player record has no id")
        })?;
        object.insert("player_id".to_string(), id);
    }

    Ok(serde_json::from_value(player)?)
}

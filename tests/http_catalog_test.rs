//! Tests for the HTTP catalog client against a local axum server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use player_seeker::{
    CatalogErrorKind, GameSession, GuessOutcome, HttpCatalog, PlayerCatalog, PlayerOption,
    RecordStyle, ScriptedRandom, SessionOptions, SessionState,
};

fn player_json(id: i64) -> Option<Value> {
    match id {
        10 => Some(json!({
            "id": 10,
            "name": "Gheorghe Hagi",
            "birth_date": "05.02.1965",
            "birth_place": "Săcele",
            "position": "Attacking Midfield",
            "age": 59,
            "current_club": "Retired",
            "clubs_played": ["Farul", "Steaua", "Real Madrid", "Brescia", "Barcelona", "Galatasaray"],
            "career_timeline": [
                {"season": "1996-2001", "club": "Galatasaray"}
            ],
            "transfer_history": {
                "1996/97": [{"from": "Barcelona", "to": "Galatasaray", "date": "1996-07-01", "fee": "€2m"}]
            }
        })),
        11 => Some(json!({
            "id": 11,
            "name": "Hakan Şükür",
            "age": "52",
            "current_club": "Retired",
            "clubs_played": ["Sakaryaspor", "Bursaspor", "Galatasaray"]
        })),
        _ => None,
    }
}

async fn fetch_record(Path(id): Path<i64>) -> Result<Json<Value>, StatusCode> {
    match id {
        500 => Err(StatusCode::INTERNAL_SERVER_ERROR),
        _ => player_json(id)
            .map(|player| Json(json!({"result": {"player": player}})))
            .ok_or(StatusCode::NOT_FOUND),
    }
}

async fn fetch_by_query(
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let id: i64 = params
        .get("id")
        .and_then(|id| id.parse().ok())
        .ok_or(StatusCode::BAD_REQUEST)?;
    player_json(id)
        .map(|player| Json(json!({"result": {"player": player}})))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn spawn_server() -> SocketAddr {
    let app = Router::new()
        .route(
            "/players",
            get(|| async {
                Json(json!([
                    {"id": 10, "name": "Gheorghe Hagi"},
                    {"id": 11, "name": "Hakan Şükür"}
                ]))
            }),
        )
        .route("/players/{id}", get(fetch_record))
        .route(
            "/wrapped/players",
            get(|| async {
                Json(json!({"result": {"players": [{"id": 11, "name": "Hakan Şükür"}]}}))
            }),
        )
        .route("/worker", get(fetch_by_query))
        .route(
            "/slow/players",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!([]))
            }),
        )
        .route("/broken/players", get(|| async { "not json" }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });
    addr
}

fn client(addr: SocketAddr, path: &str, style: RecordStyle) -> HttpCatalog {
    HttpCatalog::new(
        format!("http://{}{}", addr, path),
        Duration::from_secs(5),
        style,
    )
    .expect("Failed to build client")
}

#[tokio::test]
async fn test_list_players_bare_array() {
    let addr = spawn_server().await;
    let options = client(addr, "", RecordStyle::Path)
        .list_players()
        .await
        .expect("List failed");
    assert_eq!(
        options,
        [
            PlayerOption::new(10, "Gheorghe Hagi".to_string()),
            PlayerOption::new(11, "Hakan Şükür".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_list_players_wrapped() {
    let addr = spawn_server().await;
    let options = client(addr, "/wrapped", RecordStyle::Path)
        .list_players()
        .await
        .expect("List failed");
    assert_eq!(options, [PlayerOption::new(11, "Hakan Şükür".to_string())]);
}

#[tokio::test]
async fn test_fetch_player_path_style() {
    let addr = spawn_server().await;
    let record = client(addr, "/", RecordStyle::Path)
        .fetch_player(10)
        .await
        .expect("Fetch failed");
    assert_eq!(*record.player_id(), 10);
    assert_eq!(record.age(), "59");
    assert_eq!(record.birth_place(), "Săcele");
    assert_eq!(record.distinct_club_count(), 6);
    assert_eq!(record.transfer_history()["1996/97"][0].fee, "€2m");
}

#[tokio::test]
async fn test_fetch_player_query_style() {
    let addr = spawn_server().await;
    let record = client(addr, "/worker", RecordStyle::Query)
        .fetch_player(11)
        .await
        .expect("Fetch failed");
    assert_eq!(record.name(), "Hakan Şükür");
    assert!(record.career_timeline().is_empty());
}

#[tokio::test]
async fn test_unknown_player_is_not_found() {
    let addr = spawn_server().await;
    let err = client(addr, "", RecordStyle::Path)
        .fetch_player(404)
        .await
        .unwrap_err();
    assert_eq!(err.kind, CatalogErrorKind::NotFound);
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let addr = spawn_server().await;
    let err = client(addr, "", RecordStyle::Path)
        .fetch_player(500)
        .await
        .unwrap_err();
    assert_eq!(err.kind, CatalogErrorKind::Status(500));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let addr = spawn_server().await;
    let err = client(addr, "/broken", RecordStyle::Path)
        .list_players()
        .await
        .unwrap_err();
    assert_eq!(err.kind, CatalogErrorKind::Decode);
}

#[tokio::test]
async fn test_request_timeout_is_transport_error() {
    let addr = spawn_server().await;
    let catalog = HttpCatalog::new(
        format!("http://{}/slow", addr),
        Duration::from_millis(50),
        RecordStyle::Path,
    )
    .unwrap();
    let err = catalog.list_players().await.unwrap_err();
    assert_eq!(err.kind, CatalogErrorKind::Transport);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(addr, "", RecordStyle::Path)
        .list_players()
        .await
        .unwrap_err();
    assert_eq!(err.kind, CatalogErrorKind::Transport);
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_full_game_over_http() {
    let addr = spawn_server().await;
    let catalog = Arc::new(client(addr, "", RecordStyle::Path));
    let mut session = GameSession::new(catalog, SessionOptions::default())
        .with_rng(ScriptedRandom::new([0]));

    let target = session.start().await.expect("Start failed");
    assert_eq!(target.player_id, 10);
    assert_eq!(session.remaining_hints(), 7);

    let hagi = session.search("hagi").remove(0);
    let outcome = session.submit_guess(&hagi).await.expect("Guess failed");
    assert!(matches!(outcome, GuessOutcome::Correct(_)));
    assert_eq!(session.target().map(|t| t.player_id), Some(11));

    let reveal = session.reveal_answer().await.expect("Reveal failed");
    assert_eq!(reveal.record.name(), "Hakan Şükür");
    assert_eq!(session.state(), SessionState::Exhausted);
    assert_eq!(session.score(), 100 + 100 - 120);
}

//! Tests for loading game configuration from TOML files.

use std::fs;
use std::time::Duration;
use tempfile::TempDir;

use player_seeker::{
    API_URL_ENV, ConfigOverrides, FetchFailurePolicy, GameConfig, HintLocale, RecordStyle,
    ScoreEvent, ScoreRules,
};

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("player_seeker.toml");
    fs::write(&path, content).expect("Failed to write TOML");
    path
}

#[test]
fn test_full_config_round_trips_into_session_options() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(
        &dir,
        r#"locale = "tr"
fetch_failure = "restore"
seed = 42

[catalog]
api_url = "https://kv-tutorial.example.workers.dev"
timeout_secs = 3
record_style = "query"

[scoring]
initial_score = 10
target_reward = 50
hint_penalty = 2
wrong_guess_penalty = 3
reveal_penalty = 60
"#,
    );

    let config = GameConfig::from_file(&path).expect("Load failed");
    assert_eq!(*config.locale(), HintLocale::Tr);
    assert_eq!(*config.seed(), Some(42));
    assert_eq!(
        config.catalog().api_url(),
        "https://kv-tutorial.example.workers.dev"
    );
    assert_eq!(*config.catalog().record_style(), RecordStyle::Query);

    let options = config.session_options();
    assert_eq!(options.fetch_timeout, Duration::from_secs(3));
    assert_eq!(options.fetch_failure, FetchFailurePolicy::Restore);
    assert_eq!(options.locale, HintLocale::Tr);
    assert_eq!(options.rules.delta(ScoreEvent::TargetSelected), 50);
    assert_eq!(options.rules.delta(ScoreEvent::WrongGuess), -3);
    assert_eq!(*options.rules.initial_score(), 10);
}

#[test]
fn test_empty_file_uses_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "");

    let config = GameConfig::from_file(&path).expect("Load failed");
    assert_eq!(config, GameConfig::default());
    assert_eq!(*config.scoring(), ScoreRules::default());
    assert_eq!(*config.catalog().record_style(), RecordStyle::Path);
}

#[test]
fn test_partial_catalog_section_keeps_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "[catalog]\ntimeout_secs = 30\n");

    let config = GameConfig::from_file(&path).expect("Load failed");
    assert_eq!(config.catalog().api_url(), "http://127.0.0.1:8787");
    assert_eq!(config.catalog().timeout(), Duration::from_secs(30));
}

#[test]
fn test_invalid_toml_fails() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "this is not valid toml !!!@@@");
    assert!(GameConfig::from_file(&path).is_err());
}

#[test]
fn test_unknown_locale_fails() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "locale = \"de\"\n");
    let err = GameConfig::from_file(&path).unwrap_err();
    assert!(err.message.contains("parse"));
}

#[test]
fn test_non_http_url_fails_validation() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "[catalog]\napi_url = \"kv-tutorial\"\n");
    let err = GameConfig::load_with(Some(path.as_path()), &ConfigOverrides::default(), |_| None)
        .unwrap_err();
    assert!(err.message.contains("api_url"));
}

fn env_url(key: &str) -> Option<String> {
    (key == API_URL_ENV).then(|| "https://env.example.dev".to_string())
}

#[test]
fn test_blank_file_url_filled_by_environment() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "[catalog]\napi_url = \"\"\n");

    assert!(GameConfig::from_file(&path).is_ok());
    let config = GameConfig::load_with(Some(path.as_path()), &ConfigOverrides::default(), env_url)
        .expect("Environment should supply the URL");
    assert_eq!(config.catalog().api_url(), "https://env.example.dev");
}

#[test]
fn test_blank_file_url_filled_by_command_line() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "[catalog]\napi_url = \"\"\n");

    let overrides = ConfigOverrides::default().with_api_url("https://cli.example.dev".to_string());
    let config = GameConfig::load_with(Some(path.as_path()), &overrides, |_| None)
        .expect("Command line should supply the URL");
    assert_eq!(config.catalog().api_url(), "https://cli.example.dev");
}

#[test]
fn test_layers_apply_file_then_env_then_command_line() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(
        &dir,
        "locale = \"tr\"\nseed = 1\n\n[catalog]\napi_url = \"https://file.example.dev\"\n",
    );

    let config = GameConfig::load_with(Some(path.as_path()), &ConfigOverrides::default(), env_url)
        .expect("Load failed");
    assert_eq!(config.catalog().api_url(), "https://env.example.dev");
    assert_eq!(*config.locale(), HintLocale::Tr);

    let overrides = ConfigOverrides::default()
        .with_api_url("https://cli.example.dev".to_string())
        .with_seed(9);
    let config = GameConfig::load_with(Some(path.as_path()), &overrides, env_url).expect("Load failed");
    assert_eq!(config.catalog().api_url(), "https://cli.example.dev");
    assert_eq!(*config.seed(), Some(9));
    assert_eq!(*config.locale(), HintLocale::Tr);
}

#[test]
fn test_missing_url_everywhere_fails_after_merge() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "[catalog]\napi_url = \"\"\n");
    let err = GameConfig::load_with(Some(path.as_path()), &ConfigOverrides::default(), |_| None)
        .unwrap_err();
    assert!(err.message.contains("api_url"));
}

#[test]
fn test_negative_penalty_rejected_on_load() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "[scoring]\nreveal_penalty = -5\n");
    let err = GameConfig::load_with(Some(path.as_path()), &ConfigOverrides::default(), |_| None)
        .unwrap_err();
    assert!(err.message.contains("reveal_penalty"));
}

#[test]
fn test_missing_file_fails() {
    assert!(GameConfig::from_file("/this/path/does/not/exist.toml").is_err());
}

#[test]
fn test_bundled_example_config_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("player_seeker.example.toml");
    let config = GameConfig::from_file(path).expect("Example config should load");
    assert_eq!(config, GameConfig::default());
}

#[test]
fn test_bundled_offline_catalog_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/players.json");
    let catalog = player_seeker::InMemoryCatalog::from_json_file(path).expect("Catalog should load");
    assert_eq!(catalog.records().len(), 4);
    assert!(catalog.records().iter().all(|record| !record.career_timeline().is_empty()));
}

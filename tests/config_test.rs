use clap::Parser;
use marquee::agents::ToolDispatch;
use marquee::cli::Cli;
use marquee::config::Settings;
use std::fs;
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"
[catalog]
url = "http://localhost:5055/"
api_key = "catalog-key"
timeout_seconds = 20

[engine]
model = "gemini-1.5-flash"
api_key = "engine-key"

[agent]
system_prompt = "You are a helpful media concierge."
max_rounds = 6
tool_dispatch = "all"

[usage]
cost_per_token = 0.000001
"#;

#[test]
fn test_load_from_root() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    fs::write(temp_dir.path().join("marquee.toml"), FULL_CONFIG)?;

    let settings = Settings::from_root(temp_dir.path().to_str().unwrap())?;

    assert_eq!(settings.catalog.url, "http://localhost:5055/");
    assert_eq!(settings.catalog.api_key, "catalog-key");
    assert_eq!(settings.catalog.timeout_seconds, 20);
    assert_eq!(settings.engine.model, "gemini-1.5-flash");
    assert_eq!(settings.engine.resolve_api_key().as_deref(), Some("engine-key"));
    assert_eq!(settings.agent.max_rounds, 6);
    assert_eq!(settings.agent.tool_dispatch, ToolDispatch::All);
    assert_eq!(settings.agent.search_result_limit, 5);
    assert!((settings.usage.cost_per_token - 0.000001).abs() < f64::EPSILON);

    Ok(())
}

#[test]
fn test_defaults_fill_missing_sections() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let minimal = r#"
[catalog]
url = "https://requests.example.com"
api_key = "catalog-key"

[engine]
api_key = "engine-key"
"#;
    fs::write(temp_dir.path().join("marquee.toml"), minimal)?;

    let settings = Settings::from_root(temp_dir.path().to_str().unwrap())?;

    assert_eq!(settings.catalog.timeout_seconds, 15);
    assert_eq!(settings.engine.model, "gemini-2.0-flash");
    assert_eq!(settings.agent.max_rounds, 10);
    assert_eq!(settings.agent.round_timeout_seconds, 60);
    assert_eq!(settings.agent.tool_dispatch, ToolDispatch::First);
    assert!(settings.agent.system_prompt.is_none());
    assert!((settings.usage.cost_per_token - 0.0000007).abs() < f64::EPSILON);

    Ok(())
}

#[test]
fn test_missing_credentials_fail_validation() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let incomplete = r#"
[catalog]
url = "http://localhost:5055"

[engine]
api_key_env = "MARQUEE_TEST_DEFINITELY_UNSET"
"#;
    fs::write(temp_dir.path().join("marquee.toml"), incomplete)?;

    let err = Settings::from_root(temp_dir.path().to_str().unwrap()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("catalog.api_key"));
    assert!(message.contains("MARQUEE_TEST_DEFINITELY_UNSET"));

    Ok(())
}

#[test]
fn test_cli_overrides_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("custom.toml");
    fs::write(&path, FULL_CONFIG)?;

    let cli = Cli::parse_from([
        "marquee",
        "--config",
        path.to_str().unwrap(),
        "--catalog-url",
        "http://overseerr.lan:5055",
        "--model",
        "gemini-2.5-pro",
        "--max-rounds",
        "3",
    ]);
    let settings = Settings::new_with_cli(&cli)?;

    assert_eq!(settings.catalog.url, "http://overseerr.lan:5055");
    assert_eq!(settings.catalog.api_key, "catalog-key");
    assert_eq!(settings.engine.model, "gemini-2.5-pro");
    assert_eq!(settings.agent.max_rounds, 3);

    Ok(())
}

#[test]
fn test_catalog_only_ignores_engine_key() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("probe.toml");
    let catalog_only = r#"
[catalog]
url = "http://localhost:5055"
api_key = "catalog-key"

[engine]
api_key_env = "MARQUEE_TEST_DEFINITELY_UNSET"
"#;
    fs::write(&path, catalog_only)?;

    let cli = Cli::parse_from(["marquee", "--config", path.to_str().unwrap(), "--check"]);
    let settings = Settings::catalog_only_with_cli(&cli)?;
    assert_eq!(settings.catalog.url, "http://localhost:5055");

    assert!(Settings::new_with_cli(&cli).is_err());

    Ok(())
}

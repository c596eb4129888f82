use std::fs;

use anyhow::Result;

use super::Config;
use super::ConfigKey;
use crate::application::cli;

#[test]
fn it_serializes_to_valid_toml() -> Result<()> {
    let res = Config::serialize_default(cli::build());
    let doc = res.parse::<toml_edit::Document>()?;

    assert_eq!(
        doc.get("gemini-model").and_then(|e| return e.as_str()),
        Some("gemini-2.0-flash")
    );
    assert_eq!(
        doc.get("openrouter-max-tokens").and_then(|e| return e.as_integer()),
        Some(2000)
    );
    assert_eq!(
        doc.get("openrouter-temperature").and_then(|e| return e.as_float()),
        Some(0.7)
    );
    assert!(doc.get("openrouter-token").is_none());
    assert!(res.contains("# openrouter-token = \"\""));
    assert!(!res.contains("config-file"));

    return Ok(());
}

#[tokio::test]
async fn it_loads_config_from_file_and_args() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let good = dir.path().join("config.toml");
    fs::write(
        &good,
        "gemini-model = \"gemini-1.5-pro\"\nopenrouter-max-tokens = 500\nopenrouter-temperature = 0.2\n",
    )?;

    let good_path = good.to_string_lossy().to_string();
    let matches = cli::build().try_get_matches_from(vec![
        "assessor",
        "-c",
        &good_path,
        "--openrouter-model",
        "meta-llama/llama-3-8b-instruct",
        "status",
    ])?;
    Config::load(vec![&matches]).await?;

    assert_eq!(Config::get(ConfigKey::GeminiModel), "gemini-1.5-pro");
    assert_eq!(Config::get(ConfigKey::OpenRouterMaxTokens), "500");
    assert_eq!(Config::get(ConfigKey::OpenRouterTemperature), "0.2");
    assert_eq!(
        Config::get(ConfigKey::OpenRouterModel),
        "meta-llama/llama-3-8b-instruct"
    );
    assert_eq!(
        Config::get(ConfigKey::OpenRouterURL),
        Config::default(ConfigKey::OpenRouterURL)
    );

    let bad = dir.path().join("bad-config.toml");
    fs::write(&bad, "health-check-timeout = \"soon\"\n")?;
    let bad_path = bad.to_string_lossy().to_string();
    let matches = cli::build().try_get_matches_from(vec!["assessor", "-c", &bad_path, "status"])?;
    let res = Config::load(vec![&matches]).await;
    assert!(res.is_err());

    return Ok(());
}

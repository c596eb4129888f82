#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    ConfigFile,
    CredentialsFile,
    #[strum(serialize = "gemini-model")]
    GeminiModel,
    #[strum(serialize = "gemini-url")]
    GeminiURL,
    #[strum(serialize = "health-check-timeout")]
    HealthCheckTimeout,
    #[strum(serialize = "openrouter-max-tokens")]
    OpenRouterMaxTokens,
    #[strum(serialize = "openrouter-model")]
    OpenRouterModel,
    #[strum(serialize = "openrouter-referer")]
    OpenRouterReferer,
    #[strum(serialize = "openrouter-temperature")]
    OpenRouterTemperature,
    #[strum(serialize = "openrouter-title")]
    OpenRouterTitle,
    #[strum(serialize = "openrouter-token")]
    OpenRouterToken,
    #[strum(serialize = "openrouter-url")]
    OpenRouterURL,
}

pub struct Config {}

fn app_dir(base: Option<path::PathBuf>) -> path::PathBuf {
    return base
        .unwrap_or_else(|| return path::PathBuf::from("."))
        .join("assessor");
}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        let config_path = app_dir(dirs::config_dir()).join("config.toml");
        let credentials_path = app_dir(dirs::data_dir()).join("credentials.json");

        let res = match key {
            ConfigKey::GeminiModel => "gemini-2.0-flash",
            ConfigKey::GeminiURL => "https://generativelanguage.googleapis.com",
            ConfigKey::HealthCheckTimeout => "1000",
            ConfigKey::OpenRouterMaxTokens => "2000",
            ConfigKey::OpenRouterModel => "google/gemma-3-27b-it:free",
            ConfigKey::OpenRouterReferer => "http://localhost",
            ConfigKey::OpenRouterTemperature => "0.7",
            ConfigKey::OpenRouterTitle => "Recruitment Assessment Portal",
            ConfigKey::OpenRouterToken => "",
            ConfigKey::OpenRouterURL => "https://openrouter.ai",

            // Special
            ConfigKey::ConfigFile => return config_path.to_string_lossy().to_string(),
            ConfigKey::CredentialsFile => return credentials_path.to_string_lossy().to_string(),
        };

        return res.to_string();
    }

    /// Numeric settings are kept as strings and parsed where they are used,
    /// so they are checked once here instead.
    fn validate(key: ConfigKey, val: &str) -> Result<()> {
        match key {
            ConfigKey::HealthCheckTimeout | ConfigKey::OpenRouterMaxTokens => {
                if val.parse::<u64>().is_err() {
                    bail!(format!("Invalid value for '{key}', expected a positive number: {val}"));
                }
            }
            ConfigKey::OpenRouterTemperature => {
                if val.parse::<f32>().is_err() {
                    bail!(format!("Invalid value for '{key}', expected a decimal: {val}"));
                }
            }
            _ => {}
        }

        return Ok(());
    }

    pub async fn load(clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                if let Some(val) = doc.get(&key.to_string()) {
                    if let Some(val_int) = val.as_integer() {
                        Config::set(key, &val_int.to_string());
                    } else if let Some(val_float) = val.as_float() {
                        Config::set(key, &val_float.to_string());
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        Config::set(key, val_str);
                    } else {
                        bail!(format!("config.toml has an invalid value for key '{key}'"));
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set(key, val)
                }
            }
        }

        for key in ConfigKey::iter() {
            Config::validate(key, &Config::get(key))?;
        }

        tracing::debug!(
            credentials_file = Config::get(ConfigKey::CredentialsFile),
            gemini_model = Config::get(ConfigKey::GeminiModel),
            openrouter_model = Config::get(ConfigKey::OpenRouterModel),
            openrouter_url = Config::get(ConfigKey::OpenRouterURL),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))?;

                let mut description = arg.get_help()?.to_string();

                description = description
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<i64>().is_ok() || val.parse::<f64>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}

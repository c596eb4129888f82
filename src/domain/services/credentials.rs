#[cfg(test)]
#[path = "credentials_test.rs"]
mod tests;

use std::path;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use chrono::SecondsFormat;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::CredentialEntry;
use crate::domain::models::CredentialStats;
use crate::domain::models::CredentialStore;
use crate::domain::models::CredentialSummary;

static GOOGLE_KEY_FORMAT: Lazy<Regex> = Lazy::new(|| {
    return Regex::new(r"^AIza[0-9A-Za-z\-_]{35}$").unwrap();
});

static OPENAI_KEY_FORMAT: Lazy<Regex> = Lazy::new(|| {
    return Regex::new(r"^sk-[A-Za-z0-9]{20,}$").unwrap();
});

/// API keys saved by the user, persisted as a JSON array on disk. The
/// active key is whichever entry carries `isActive`.
pub struct Credentials {
    pub file_path: path::PathBuf,
}

impl Default for Credentials {
    fn default() -> Credentials {
        return Credentials::new(path::PathBuf::from(Config::get(
            ConfigKey::CredentialsFile,
        )));
    }
}

impl Credentials {
    pub fn new(file_path: path::PathBuf) -> Credentials {
        return Credentials { file_path };
    }

    pub fn create_id() -> String {
        return Uuid::new_v4()
            .to_string()
            .split('-')
            .enumerate()
            .filter_map(|(idx, str)| {
                if idx > 1 {
                    return None;
                }
                return Some(str);
            })
            .collect::<Vec<&str>>()
            .join("-");
    }

    /// Google keys start with `AIza`, OpenAI style keys with `sk-`. Anything
    /// longer than 20 characters is accepted as well.
    pub fn is_valid_format(secret: &str) -> bool {
        return GOOGLE_KEY_FORMAT.is_match(secret)
            || OPENAI_KEY_FORMAT.is_match(secret)
            || secret.chars().count() > 20;
    }

    pub async fn list(&self) -> Result<Vec<CredentialEntry>> {
        if !self.file_path.exists() {
            return Ok(vec![]);
        }

        let payload = fs::read_to_string(&self.file_path).await?;
        if payload.trim().is_empty() {
            return Ok(vec![]);
        }

        let entries: Vec<CredentialEntry> = serde_json::from_str(&payload)?;
        return Ok(entries);
    }

    fn tmp_path(&self) -> path::PathBuf {
        let file_name = self
            .file_path
            .file_name()
            .map(|name| return name.to_string_lossy().to_string())
            .unwrap_or_else(|| return "credentials.json".to_string());

        return self.file_path.with_file_name(format!(".{file_name}.tmp"));
    }

    async fn write(&self, entries: &[CredentialEntry]) -> Result<()> {
        let payload = serde_json::to_string_pretty(entries)?;

        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }

        // Readers must never see a partially written file.
        let tmp_path = self.tmp_path();
        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(payload.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(err) = fs::rename(&tmp_path, &self.file_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            bail!(format!(
                "Failed to replace {}: {err}",
                self.file_path.to_string_lossy()
            ));
        }

        return Ok(());
    }

    pub async fn save(&self, secret: &str, name: Option<&str>) -> Result<CredentialEntry> {
        let secret = secret.trim();
        if secret.is_empty() {
            bail!("API key must not be empty");
        }
        if !Credentials::is_valid_format(secret) {
            bail!("API key format is not valid");
        }

        let now = Local::now();
        let name = match name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => format!("API Key - {}", now.format("%Y-%m-%d")),
        };

        let entry = CredentialEntry {
            id: Credentials::create_id(),
            name,
            secret: secret.to_string(),
            created_at: now.to_rfc3339_opts(SecondsFormat::Secs, false),
            last_used_at: None,
            is_active: true,
        };

        let mut entries = self.list().await?;
        for existing in entries.iter_mut() {
            existing.is_active = false;
        }
        entries.push(entry.clone());
        self.write(&entries).await?;

        tracing::debug!(id = entry.id, name = entry.name, "Saved API key");
        return Ok(entry);
    }

    pub async fn set_active(&self, id: &str) -> Result<bool> {
        let mut entries = self.list().await?;
        if !entries.iter().any(|entry| return entry.id == id) {
            tracing::warn!(id = id, "API key not found");
            return Ok(false);
        }

        let now = Local::now().to_rfc3339_opts(SecondsFormat::Secs, false);
        for entry in entries.iter_mut() {
            entry.is_active = entry.id == id;
            if entry.is_active {
                entry.last_used_at = Some(now.to_string());
            }
        }

        self.write(&entries).await?;
        return Ok(true);
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let entries = self.list().await?;
        let remaining = entries
            .into_iter()
            .filter(|entry| return entry.id != id)
            .collect::<Vec<CredentialEntry>>();

        self.write(&remaining).await?;
        return Ok(true);
    }

    pub async fn rename(&self, id: &str, name: &str) -> Result<bool> {
        let mut entries = self.list().await?;
        let entry = match entries.iter_mut().find(|entry| return entry.id == id) {
            Some(entry) => entry,
            None => return Ok(false),
        };

        if name.trim().is_empty() {
            return Ok(false);
        }
        entry.name = name.trim().to_string();

        self.write(&entries).await?;
        return Ok(true);
    }

    pub async fn clear(&self) -> Result<()> {
        if !self.file_path.exists() {
            return Ok(());
        }

        fs::remove_file(&self.file_path).await?;
        return Ok(());
    }

    pub async fn export(&self) -> Result<String> {
        let entries = self.list().await?;
        return Ok(serde_json::to_string_pretty(&entries)?);
    }

    /// Replaces every stored entry with the given backup. Returns false and
    /// leaves the store untouched when the backup is not a complete list.
    ///
    /// The currently active key stays active: its entry in the backup is
    /// flagged, or it is carried over when the backup lacks it. Without an
    /// active key the first entry the backup flags wins.
    pub async fn import(&self, payload: &str) -> Result<bool> {
        let mut entries = match serde_json::from_str::<Vec<CredentialEntry>>(payload) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(error = ?err, "Invalid API key backup");
                return Ok(false);
            }
        };

        let incomplete = entries.iter().any(|entry| {
            return entry.id.is_empty() || entry.name.is_empty() || entry.secret.is_empty();
        });
        if incomplete {
            tracing::warn!("API key backup has incomplete entries");
            return Ok(false);
        }

        let current = match self.list().await {
            Ok(existing) => existing
                .into_iter()
                .find(|entry| return entry.is_active && !entry.secret.is_empty()),
            Err(err) => {
                tracing::warn!(error = ?err, "Unable to read API keys before import");
                None
            }
        };

        let active_idx = match &current {
            Some(current) => match entries
                .iter()
                .position(|entry| return entry.secret == current.secret)
            {
                Some(idx) => Some(idx),
                None => {
                    entries.push(current.clone());
                    Some(entries.len() - 1)
                }
            },
            None => entries.iter().position(|entry| return entry.is_active),
        };

        for (idx, entry) in entries.iter_mut().enumerate() {
            entry.is_active = Some(idx) == active_idx;
        }

        self.write(&entries).await?;
        return Ok(true);
    }

    pub async fn stats(&self) -> Result<CredentialStats> {
        let entries = self.list().await?;
        let active_key = match self.get_active().await? {
            Some(secret) => format!("{}...", secret.chars().take(10).collect::<String>()),
            None => "None".to_string(),
        };

        let keys = entries
            .iter()
            .map(|entry| {
                return CredentialSummary {
                    id: entry.id.to_string(),
                    name: entry.name.to_string(),
                    is_active: entry.is_active,
                    created_at: entry.created_at.to_string(),
                    last_used_at: entry.last_used_at.clone(),
                };
            })
            .collect::<Vec<CredentialSummary>>();

        return Ok(CredentialStats {
            total_keys: entries.len(),
            active_key,
            keys,
        });
    }
}

#[async_trait]
impl CredentialStore for Credentials {
    async fn get_active(&self) -> Result<Option<String>> {
        let active = self
            .list()
            .await?
            .into_iter()
            .find(|entry| return entry.is_active && !entry.secret.is_empty())
            .map(|entry| return entry.secret);

        return Ok(active);
    }
}

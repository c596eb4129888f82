use anyhow::Result;
use test_utils::credentials_fixture;

use super::Credentials;
use crate::domain::models::CredentialEntry;
use crate::domain::models::CredentialStore;

const GOOGLE_KEY: &str = "AIzaSyA1234567890abcdefghijklmnopqrstu";
const OPENAI_KEY: &str = "sk-abcdefghijklmnopqrstuvwxyz";

fn store(dir: &tempfile::TempDir) -> Credentials {
    return Credentials::new(dir.path().join("keys/credentials.json"));
}

#[tokio::test]
async fn it_lists_nothing_without_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let credentials = store(&dir);

    assert!(credentials.list().await?.is_empty());
    assert_eq!(credentials.get_active().await?, None);

    return Ok(());
}

#[tokio::test]
async fn it_saves_and_activates_new_key() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let credentials = store(&dir);

    let first = credentials.save(GOOGLE_KEY, Some("Recruiting team")).await?;
    let second = credentials.save(&format!("  {OPENAI_KEY}  "), None).await?;

    let entries = credentials.list().await?;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, first.id);
    assert!(!entries[0].is_active);
    assert!(entries[1].is_active);
    assert_eq!(entries[1].secret, OPENAI_KEY);
    assert!(second.name.starts_with("API Key - "));
    assert_eq!(credentials.get_active().await?, Some(OPENAI_KEY.to_string()));

    return Ok(());
}

#[tokio::test]
async fn it_rejects_empty_and_short_keys() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let credentials = store(&dir);

    assert!(credentials.save("   ", None).await.is_err());
    assert!(credentials.save("short-key", None).await.is_err());
    assert!(credentials.list().await?.is_empty());

    return Ok(());
}

#[tokio::test]
async fn it_switches_active_key() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let credentials = store(&dir);

    let first = credentials.save(GOOGLE_KEY, None).await?;
    credentials.save(OPENAI_KEY, None).await?;

    assert!(credentials.set_active(&first.id).await?);

    let entries = credentials.list().await?;
    let active = entries
        .iter()
        .filter(|entry| return entry.is_active)
        .collect::<Vec<_>>();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, first.id);
    assert!(active[0].last_used_at.is_some());
    assert_eq!(credentials.get_active().await?, Some(GOOGLE_KEY.to_string()));

    return Ok(());
}

#[tokio::test]
async fn it_refuses_to_activate_unknown_key() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let credentials = store(&dir);
    credentials.save(GOOGLE_KEY, None).await?;

    assert!(!credentials.set_active("missing").await?);
    assert_eq!(credentials.get_active().await?, Some(GOOGLE_KEY.to_string()));

    return Ok(());
}

#[tokio::test]
async fn it_clears_active_key_when_deleted() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let credentials = store(&dir);

    let first = credentials.save(GOOGLE_KEY, None).await?;
    let second = credentials.save(OPENAI_KEY, None).await?;

    assert!(credentials.delete(&second.id).await?);

    let entries = credentials.list().await?;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, first.id);
    assert_eq!(credentials.get_active().await?, None);

    return Ok(());
}

#[tokio::test]
async fn it_renames_key() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let credentials = store(&dir);
    let entry = credentials.save(GOOGLE_KEY, None).await?;

    assert!(credentials.rename(&entry.id, "Production").await?);
    assert!(!credentials.rename(&entry.id, "  ").await?);
    assert!(!credentials.rename("missing", "Other").await?);

    let entries = credentials.list().await?;
    assert_eq!(entries[0].name, "Production");
    assert_eq!(entries[0].secret, GOOGLE_KEY);

    return Ok(());
}

#[tokio::test]
async fn it_imports_and_exports_backups() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let credentials = store(&dir);

    assert!(credentials.import(credentials_fixture()).await?);
    assert_eq!(credentials.get_active().await?, Some(GOOGLE_KEY.to_string()));

    let exported = credentials.export().await?;
    let other = Credentials::new(dir.path().join("other.json"));
    assert!(other.import(&exported).await?);
    assert_eq!(other.list().await?, credentials.list().await?);

    return Ok(());
}

#[tokio::test]
async fn it_rejects_incomplete_backups() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let credentials = store(&dir);
    credentials.save(GOOGLE_KEY, None).await?;

    let incomplete = r#"[{"id": "", "name": "x", "secret": "y", "createdAt": "", "isActive": true}]"#;
    assert!(!credentials.import(incomplete).await?);
    assert!(!credentials.import("{\"not\": \"a list\"}").await?);

    assert_eq!(credentials.list().await?.len(), 1);

    return Ok(());
}

fn active_ids(entries: &[CredentialEntry]) -> Vec<String> {
    return entries
        .iter()
        .filter(|entry| return entry.is_active)
        .map(|entry| return entry.id.to_string())
        .collect();
}

#[tokio::test]
async fn it_keeps_one_active_key_from_backup() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let credentials = store(&dir);

    let backup = format!(
        r#"[
            {{"id": "a1", "name": "Team", "secret": "{GOOGLE_KEY}", "createdAt": "", "isActive": true}},
            {{"id": "b2", "name": "Backup", "secret": "{OPENAI_KEY}", "createdAt": "", "isActive": true}}
        ]"#
    );
    assert!(credentials.import(&backup).await?);

    assert_eq!(active_ids(&credentials.list().await?), vec!["a1"]);
    assert_eq!(credentials.get_active().await?, Some(GOOGLE_KEY.to_string()));

    return Ok(());
}

#[tokio::test]
async fn it_keeps_current_active_key_across_import() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let credentials = store(&dir);
    credentials.save(GOOGLE_KEY, Some("Recruiting team")).await?;

    let backup = format!(
        r#"[
            {{"id": "a1", "name": "Team", "secret": "{GOOGLE_KEY}"}},
            {{"id": "b2", "name": "Backup", "secret": "{OPENAI_KEY}", "isActive": true}}
        ]"#
    );
    assert!(credentials.import(&backup).await?);

    let entries = credentials.list().await?;
    assert_eq!(entries.len(), 2);
    assert_eq!(active_ids(&entries), vec!["a1"]);
    assert_eq!(entries[0].created_at, "");
    assert_eq!(credentials.get_active().await?, Some(GOOGLE_KEY.to_string()));

    return Ok(());
}

#[tokio::test]
async fn it_carries_active_key_missing_from_backup() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let credentials = store(&dir);
    let saved = credentials.save(GOOGLE_KEY, None).await?;

    let backup = format!(r#"[{{"id": "b2", "name": "Backup", "secret": "{OPENAI_KEY}"}}]"#);
    assert!(credentials.import(&backup).await?);

    let entries = credentials.list().await?;
    assert_eq!(entries.len(), 2);
    assert_eq!(active_ids(&entries), vec![saved.id]);
    assert_eq!(credentials.get_active().await?, Some(GOOGLE_KEY.to_string()));

    return Ok(());
}

#[tokio::test]
async fn it_replaces_file_without_leftovers() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let credentials = store(&dir);
    let tmp_path = dir.path().join("keys/.credentials.json.tmp");

    std::fs::create_dir_all(dir.path().join("keys"))?;
    std::fs::write(&tmp_path, "[{\"id\": \"trunc")?;

    credentials.save(GOOGLE_KEY, None).await?;
    credentials.save(OPENAI_KEY, None).await?;

    assert!(!tmp_path.exists());
    assert_eq!(credentials.list().await?.len(), 2);

    return Ok(());
}

#[tokio::test]
async fn it_masks_active_key_in_stats() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let credentials = store(&dir);
    credentials.import(credentials_fixture()).await?;

    let stats = credentials.stats().await?;
    assert_eq!(stats.total_keys, 2);
    assert_eq!(stats.active_key, "AIzaSyA123...");
    assert_eq!(stats.keys[1].name, "Backup");
    assert_eq!(
        stats.keys[1].last_used_at,
        Some("2024-03-05T10:30:00+07:00".to_string())
    );

    credentials.clear().await?;
    let stats = credentials.stats().await?;
    assert_eq!(stats.total_keys, 0);
    assert_eq!(stats.active_key, "None");

    return Ok(());
}

#[test]
fn it_validates_key_formats() {
    assert!(Credentials::is_valid_format(GOOGLE_KEY));
    assert!(Credentials::is_valid_format(OPENAI_KEY));
    assert!(Credentials::is_valid_format("abcdefghijklmnopqrstuvwxyz"));
    assert!(!Credentials::is_valid_format("sk-short"));
    assert!(!Credentials::is_valid_format("AIza123"));
}

#[test]
fn it_creates_short_ids() {
    let id = Credentials::create_id();
    assert_eq!(id.split('-').count(), 2);
    assert_eq!(id.len(), 13);
}

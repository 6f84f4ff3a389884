//! File-backed secret and flag stores.
//!
//! JSON maps under the daemon data directory stand in for the secure store
//! and key-value store a mobile host would provide. The files are tiny and
//! written whole on every mutation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fyr_core::error::{FyrError, Result};
use fyr_core::platform::{FlagStore, SecretStore};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Get the default data directory.
///
/// On a dedicated host: `/var/lib/fyr/`
/// For development: `~/.local/share/fyr/`
pub fn default_data_dir() -> Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        Ok(PathBuf::from("/var/lib/fyr"))
    }
    #[cfg(not(target_os = "linux"))]
    {
        let dirs = directories::ProjectDirs::from("", "", "fyr")
            .ok_or_else(|| FyrError::Store("cannot determine data directory".to_string()))?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

fn load_map<V: DeserializeOwned>(path: &Path) -> Result<HashMap<String, V>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|err| FyrError::Store(err.to_string()))
}

fn save_map<V: Serialize>(path: &Path, map: &HashMap<String, V>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content =
        serde_json::to_string_pretty(map).map_err(|err| FyrError::Store(err.to_string()))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Opaque secret storage backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    /// Creates a store at `data_dir/secrets.json`.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("secrets.json"),
        }
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get_secret(&self, key: &str) -> Result<Option<String>> {
        Ok(load_map::<String>(&self.path)?.get(key).cloned())
    }

    async fn set_secret(&self, key: &str, value: &str) -> Result<()> {
        let mut map = load_map::<String>(&self.path)?;
        map.insert(key.to_string(), value.to_string());
        save_map(&self.path, &map)
    }

    async fn clear_secret(&self, key: &str) -> Result<()> {
        let mut map = load_map::<String>(&self.path)?;
        if map.remove(key).is_some() {
            save_map(&self.path, &map)?;
        }
        Ok(())
    }
}

/// Boolean flag storage backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileFlagStore {
    path: PathBuf,
}

impl FileFlagStore {
    /// Creates a store at `data_dir/flags.json`.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("flags.json"),
        }
    }
}

#[async_trait]
impl FlagStore for FileFlagStore {
    async fn get_flag(&self, key: &str) -> Result<bool> {
        Ok(load_map::<bool>(&self.path)?
            .get(key)
            .copied()
            .unwrap_or(false))
    }

    async fn set_flag(&self, key: &str, value: bool) -> Result<()> {
        let mut map = load_map::<bool>(&self.path)?;
        map.insert(key.to_string(), value);
        save_map(&self.path, &map)
    }

    async fn clear_flag(&self, key: &str) -> Result<()> {
        let mut map = load_map::<bool>(&self.path)?;
        if map.remove(key).is_some() {
            save_map(&self.path, &map)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_secret_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSecretStore::new(dir.path());

        assert!(store.get_secret("apiKey").await.unwrap().is_none());

        store.set_secret("apiKey", "s3cret").await.unwrap();
        assert_eq!(
            store.get_secret("apiKey").await.unwrap().as_deref(),
            Some("s3cret")
        );

        store.clear_secret("apiKey").await.unwrap();
        assert!(store.get_secret("apiKey").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clearing_absent_secret_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSecretStore::new(dir.path());
        store.clear_secret("nope").await.unwrap();
    }

    #[tokio::test]
    async fn test_flag_defaults_to_false() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileFlagStore::new(dir.path());
        assert!(!store.get_flag("isGeofencingEnabled").await.unwrap());
    }

    #[tokio::test]
    async fn test_flag_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileFlagStore::new(dir.path());

        store.set_flag("isGeofencingEnabled", true).await.unwrap();
        assert!(store.get_flag("isGeofencingEnabled").await.unwrap());

        store.set_flag("isGeofencingEnabled", false).await.unwrap();
        assert!(!store.get_flag("isGeofencingEnabled").await.unwrap());

        store.clear_flag("isGeofencingEnabled").await.unwrap();
        assert!(!store.get_flag("isGeofencingEnabled").await.unwrap());
    }

    #[tokio::test]
    async fn test_stores_persist_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        FileSecretStore::new(dir.path())
            .set_secret("apiKey", "k")
            .await
            .unwrap();

        let reopened = FileSecretStore::new(dir.path());
        assert_eq!(
            reopened.get_secret("apiKey").await.unwrap().as_deref(),
            Some("k")
        );
    }
}

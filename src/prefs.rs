//! Durable string key-value preferences.
//!
//! Only two keys are used. Writes to different keys are independent; there
//! is no transaction spanning both.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const SELECTED_IMAGE_URI_KEY: &str = "selectedImageUri";
pub const START_TIME_KEY: &str = "startTime";

pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Preferences kept as a flat JSON object on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents).with_context(|| {
                format!("Failed to parse preferences file {}", path.display())
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Failed to read preferences file {}", path.display())
                });
            }
        };

        Ok(Self { path, values })
    }

    /// Like [`JsonFileStore::open`], but an unreadable or corrupt file is
    /// logged and treated as empty. The next `set` rewrites it.
    pub fn open_or_empty(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::open(path.clone()).unwrap_or_else(|err| {
            log::warn!("{err:#}; starting with empty preferences");
            Self {
                path,
                values: BTreeMap::new(),
            }
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Write to a sibling then rename, so readers never see a torn file.
    fn flush(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(values)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut next = self.values.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        self.values = next;
        Ok(())
    }
}

/// In-process preferences; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("prefs.json")).unwrap();
        assert_eq!(store.get(START_TIME_KEY).unwrap(), None);
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set(START_TIME_KEY, "2020-1-15-0-0").unwrap();
        store
            .set(SELECTED_IMAGE_URI_KEY, "file:///photos/us.jpg")
            .unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get(START_TIME_KEY).unwrap().as_deref(),
            Some("2020-1-15-0-0")
        );
        assert_eq!(
            reopened.get(SELECTED_IMAGE_URI_KEY).unwrap().as_deref(),
            Some("file:///photos/us.jpg")
        );
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse preferences file"));
    }

    #[test]
    fn corrupt_file_opens_empty_and_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, r#"{"startTime": 20200115}"#).unwrap();

        let mut store = JsonFileStore::open_or_empty(&path);
        assert_eq!(store.path(), path.as_path());
        assert_eq!(store.get(START_TIME_KEY).unwrap(), None);

        store.set(START_TIME_KEY, "2020-1-15-0-0").unwrap();
        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get(START_TIME_KEY).unwrap().as_deref(),
            Some("2020-1-15-0-0")
        );
    }

    #[test]
    fn memory_store_overwrites() {
        let mut store = MemoryStore::new().with(START_TIME_KEY, "2020-1-1");
        store.set(START_TIME_KEY, "2021-2-2").unwrap();
        assert_eq!(store.get(START_TIME_KEY).unwrap().as_deref(), Some("2021-2-2"));
    }
}

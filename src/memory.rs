//! Memory Store
//!
//! Persisted personal facts, named lists and named dictionaries for one user.
//! Keys are case-insensitive; every mutation is written straight back to disk.

use crate::error::MemoryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// On-disk layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryData {
    #[serde(default)]
    pub personal_info: BTreeMap<String, String>,
    #[serde(default)]
    pub custom_lists: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub custom_dicts: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug)]
pub struct MemoryStore {
    data: MemoryData,
    /// None keeps the store in memory only
    path: Option<PathBuf>,
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

impl MemoryStore {
    /// Load from `path`. Missing file means first run; a corrupt one is moved
    /// aside to `<file>.corrupt` and the store starts empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<MemoryData>(&content) {
                Ok(data) => {
                    info!(
                        "🧠 Memory loaded: {} facts, {} lists, {} dictionaries",
                        data.personal_info.len(),
                        data.custom_lists.len(),
                        data.custom_dicts.len()
                    );
                    data
                }
                Err(e) => {
                    let backup = backup_path(&path);
                    warn!(
                        "⚠️ Memory file {} is corrupt ({}), preserving it as {} and starting empty",
                        path.display(),
                        e,
                        backup.display()
                    );
                    if let Err(e) = std::fs::rename(&path, &backup) {
                        warn!("Failed to back up corrupt memory file: {}", e);
                    }
                    MemoryData::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No memory file at {}, starting fresh", path.display());
                MemoryData::default()
            }
            Err(e) => {
                warn!("⚠️ Could not read memory file {}: {}", path.display(), e);
                MemoryData::default()
            }
        };

        Self {
            data,
            path: Some(path),
        }
    }

    /// A store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self {
            data: MemoryData::default(),
            path: None,
        }
    }

    pub fn data(&self) -> &MemoryData {
        &self.data
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the whole store (temp file + rename)
    pub fn save(&self) -> Result<(), MemoryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.data)?;
        let tmp_path = path.with_extension("json.tmp");
        {
            let mut file = std::fs::File::create(&tmp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp_path, path)?;
        debug!("💾 Memory persisted to {}", path.display());
        Ok(())
    }

    /// Apply `change` and persist it. A failed write restores the previous
    /// contents so memory never runs ahead of the file.
    fn commit<R>(
        &mut self,
        change: impl FnOnce(&mut MemoryData) -> Result<R, MemoryError>,
    ) -> Result<R, MemoryError> {
        let previous = self.data.clone();
        let result = change(&mut self.data)?;
        if let Err(e) = self.save() {
            self.data = previous;
            return Err(e);
        }
        Ok(result)
    }

    pub fn set_fact(&mut self, key: &str, value: &str) -> Result<(), MemoryError> {
        self.commit(|data| {
            data.personal_info
                .insert(normalize_key(key), value.trim().to_string());
            Ok(())
        })
    }

    pub fn get_fact(&self, key: &str) -> Option<&str> {
        self.data
            .personal_info
            .get(&normalize_key(key))
            .map(String::as_str)
    }

    /// Returns Ok(false) when the list already existed (nothing changes)
    pub fn create_list(&mut self, name: &str) -> Result<bool, MemoryError> {
        let key = normalize_key(name);
        if self.data.custom_lists.contains_key(&key) {
            return Ok(false);
        }
        self.commit(|data| {
            data.custom_lists.insert(key, Vec::new());
            Ok(true)
        })
    }

    pub fn append_to_list(&mut self, name: &str, item: &str) -> Result<(), MemoryError> {
        let key = normalize_key(name);
        self.commit(|data| {
            let list = data
                .custom_lists
                .get_mut(&key)
                .ok_or_else(|| MemoryError::NotFound {
                    kind: "list",
                    name: key.clone(),
                })?;
            list.push(item.trim().to_string());
            Ok(())
        })
    }

    pub fn list_contents(&self, name: &str) -> Result<&[String], MemoryError> {
        let key = normalize_key(name);
        self.data
            .custom_lists
            .get(&key)
            .map(Vec::as_slice)
            .ok_or(MemoryError::NotFound { kind: "list", name: key })
    }

    pub fn create_dict(&mut self, name: &str) -> Result<bool, MemoryError> {
        let key = normalize_key(name);
        if self.data.custom_dicts.contains_key(&key) {
            return Ok(false);
        }
        self.commit(|data| {
            data.custom_dicts.insert(key, BTreeMap::new());
            Ok(true)
        })
    }

    pub fn put_entry(&mut self, name: &str, key: &str, value: &str) -> Result<(), MemoryError> {
        let dict_key = normalize_key(name);
        self.commit(|data| {
            let dict = data
                .custom_dicts
                .get_mut(&dict_key)
                .ok_or_else(|| MemoryError::NotFound {
                    kind: "dictionary",
                    name: dict_key.clone(),
                })?;
            dict.insert(normalize_key(key), value.trim().to_string());
            Ok(())
        })
    }

    pub fn dict_contents(&self, name: &str) -> Result<&BTreeMap<String, String>, MemoryError> {
        let key = normalize_key(name);
        self.data.custom_dicts.get(&key).ok_or(MemoryError::NotFound {
            kind: "dictionary",
            name: key,
        })
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".corrupt");
    path.with_file_name(name)
}

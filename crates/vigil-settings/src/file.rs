use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::{SettingKey, SettingsError, SettingsStore};

/// Settings persisted as a flat TOML table of integers, e.g.
/// `camera_facing = 1`. Every write rewrites the file through a temp file
/// and a rename so a crash never leaves it half written.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, i64>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        if !path.exists() {
            debug!("settings: {} not found, starting empty", path.display());
            return Ok(Self { path, values: BTreeMap::new() });
        }
        let s = fs::read_to_string(&path).map_err(|source| SettingsError::Io { path: path.clone(), source })?;
        let values: BTreeMap<String, i64> =
            toml::from_str(&s).map_err(|source| SettingsError::Parse { path: path.clone(), source })?;
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored values for every known key, `None` where nothing is stored.
    pub fn snapshot(&self) -> Vec<(SettingKey, Option<i64>)> {
        SettingKey::ALL.into_iter().map(|k| (k, self.values.get(k.as_str()).copied())).collect()
    }

    pub fn reset(&mut self) -> Result<(), SettingsError> {
        self.values.clear();
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|source| SettingsError::Io { path: self.path.clone(), source })?;
        }
        Ok(())
    }

    pub fn set(&mut self, key: SettingKey, value: i32) -> Result<(), SettingsError> {
        self.values.insert(key.as_str().to_string(), value as i64);
        self.write()
    }

    fn write(&self) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io { path: self.path.clone(), source };
        if let Some(p) = self.path.parent() {
            if !p.as_os_str().is_empty() {
                fs::create_dir_all(p).map_err(io_err)?;
            }
        }
        let body = toml::to_string(&self.values)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, body).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl SettingsStore for FileStore {
    fn get_int(&self, key: SettingKey, default: i32) -> i32 {
        match self.values.get(key.as_str()) {
            Some(v) => i32::try_from(*v).unwrap_or_else(|_| {
                warn!("settings: {}={} out of range, using {}", key, v, default);
                default
            }),
            None => default,
        }
    }

    fn put_int(&mut self, key: SettingKey, value: i32) {
        debug!("settings: put {}={}", key, value);
        if let Err(e) = self.set(key, value) {
            warn!("settings: write failed: {:#}", e);
        }
    }
}

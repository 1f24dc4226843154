pub mod doctor;
mod file;

pub use file::FileStore;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("settings parse {}: {source}", path.display())]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("settings encode: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("unknown settings key: {0}")]
    UnknownKey(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingKey {
    Facing,
    Model,
    Backend,
    Threshold,
    Throttle,
    DetectMode,
}

impl SettingKey {
    pub const ALL: [SettingKey; 6] = [
        SettingKey::Facing,
        SettingKey::Model,
        SettingKey::Backend,
        SettingKey::Threshold,
        SettingKey::Throttle,
        SettingKey::DetectMode,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::Facing => "camera_facing",
            SettingKey::Model => "model_selection",
            SettingKey::Backend => "cpugpu_mode",
            SettingKey::Threshold => "detection_threshold",
            SettingKey::Throttle => "throttle_interval",
            SettingKey::DetectMode => "detect_mode",
        }
    }

    /// Value used when nothing has been stored yet.
    pub fn default_value(self) -> i32 {
        match self {
            SettingKey::Threshold => 40,
            _ => 0,
        }
    }

    pub fn parse(s: &str) -> Result<Self, SettingsError> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integer key/value persistence. Writes are fire-and-forget: a store logs
/// its own failures and callers never wait on them.
pub trait SettingsStore {
    fn get_int(&self, key: SettingKey, default: i32) -> i32;
    fn put_int(&mut self, key: SettingKey, value: i32);
}

impl<S: SettingsStore + ?Sized> SettingsStore for Box<S> {
    fn get_int(&self, key: SettingKey, default: i32) -> i32 {
        (**self).get_int(key, default)
    }
    fn put_int(&mut self, key: SettingKey, value: i32) {
        (**self).put_int(key, value)
    }
}

/// Volatile store; keeps a log of every write.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<SettingKey, i32>,
    writes: Vec<(SettingKey, i32)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: SettingKey, value: i32) -> Self {
        self.values.insert(key, value);
        self
    }

    pub fn writes(&self) -> &[(SettingKey, i32)] {
        &self.writes
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    pub fn get(&self, key: SettingKey) -> Option<i32> {
        self.values.get(&key).copied()
    }
}

impl SettingsStore for MemoryStore {
    fn get_int(&self, key: SettingKey, default: i32) -> i32 {
        self.get(key).unwrap_or(default)
    }

    fn put_int(&mut self, key: SettingKey, value: i32) {
        self.values.insert(key, value);
        self.writes.push((key, value));
    }
}

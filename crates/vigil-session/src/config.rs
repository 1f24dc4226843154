use serde::Serialize;
use tracing::warn;

use vigil_engine::catalog;
use vigil_proto::{DetectMode, Facing};
use vigil_settings::{SettingKey, SettingsStore};

/// Live configuration snapshot. Only the configuration controller mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionConfig {
    pub facing: Facing,
    pub model_index: u32,
    pub backend_index: u32,
    pub detect_mode: DetectMode,
    /// Slider position 0..=100; the threshold is this / 100.
    pub threshold_progress: u32,
    pub throttle_ms: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            facing: Facing::Back,
            model_index: 0,
            backend_index: 0,
            detect_mode: DetectMode::HumanOnly,
            threshold_progress: SettingKey::Threshold.default_value() as u32,
            throttle_ms: 0,
        }
    }
}

impl SessionConfig {
    /// Read persisted values. Anything the current build cannot honour
    /// (index past the table, negative throttle) falls back to its default.
    pub fn restore(store: &impl SettingsStore) -> Self {
        let d = Self::default();
        let get = |k: SettingKey| store.get_int(k, k.default_value());

        let facing = Facing::from_index(get(SettingKey::Facing)).unwrap_or_else(|| {
            warn!("settings: bad {}, using {:?}", SettingKey::Facing, d.facing);
            d.facing
        });

        let model_index = table_index(get(SettingKey::Model), catalog::MODELS.len())
            .unwrap_or_else(|| {
                warn!("settings: bad {}, using {}", SettingKey::Model, d.model_index);
                d.model_index
            });

        let backend_index = table_index(get(SettingKey::Backend), catalog::BACKENDS.len())
            .unwrap_or_else(|| {
                warn!("settings: bad {}, using {}", SettingKey::Backend, d.backend_index);
                d.backend_index
            });

        let detect_mode = DetectMode::from_index(get(SettingKey::DetectMode)).unwrap_or_else(|| {
            warn!("settings: bad {}, using {:?}", SettingKey::DetectMode, d.detect_mode);
            d.detect_mode
        });

        let threshold_progress = get(SettingKey::Threshold).clamp(0, 100) as u32;
        let throttle_ms = get(SettingKey::Throttle).max(0) as u32;

        Self { facing, model_index, backend_index, detect_mode, threshold_progress, throttle_ms }
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.threshold_progress as f32 / 100.0
    }
}

fn table_index(v: i32, len: usize) -> Option<u32> {
    usize::try_from(v).ok().filter(|i| *i < len).map(|i| i as u32)
}

pub fn threshold_label(progress: u32) -> String {
    format!("{:.2}", progress as f32 / 100.0)
}

pub fn throttle_label(ms: u32) -> String {
    format!("{} ms", ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_settings::MemoryStore;

    #[test]
    fn restore_falls_back_per_field() {
        let store = MemoryStore::new()
            .with(SettingKey::Facing, 7)
            .with(SettingKey::Model, 2)
            .with(SettingKey::Backend, -1)
            .with(SettingKey::Threshold, 250)
            .with(SettingKey::Throttle, -5);
        let cfg = SessionConfig::restore(&store);
        assert_eq!(cfg.facing, Facing::Back);
        assert_eq!(cfg.model_index, 2);
        assert_eq!(cfg.backend_index, 0);
        assert_eq!(cfg.threshold_progress, 100);
        assert_eq!(cfg.throttle_ms, 0);
    }

    #[test]
    fn labels() {
        assert_eq!(threshold_label(60), "0.60");
        assert_eq!(threshold_label(5), "0.05");
        assert_eq!(threshold_label(100), "1.00");
        assert_eq!(throttle_label(50), "50 ms");
    }
}

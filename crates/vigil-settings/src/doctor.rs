use anyhow::Result;

use crate::{SettingKey, SettingsStore};

/// Table sizes the stored indices are checked against.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub models: u32,
    pub backends: u32,
    pub detect_modes: u32,
}

pub fn check_store(store: &impl SettingsStore, limits: Limits) -> Result<()> {
    let get = |k: SettingKey| store.get_int(k, k.default_value());

    let facing = get(SettingKey::Facing);
    anyhow::ensure!(facing == 0 || facing == 1, "{} must be 0 or 1 (got {})", SettingKey::Facing, facing);

    let in_table = |k: SettingKey, n: u32| {
        let v = get(k);
        anyhow::ensure!(v >= 0 && (v as u32) < n, "{} out of range 0..{} (got {})", k, n, v);
        Ok(())
    };
    in_table(SettingKey::Model, limits.models)?;
    in_table(SettingKey::Backend, limits.backends)?;
    in_table(SettingKey::DetectMode, limits.detect_modes)?;

    let th = get(SettingKey::Threshold);
    anyhow::ensure!((0..=100).contains(&th), "{} must be 0..=100 (got {})", SettingKey::Threshold, th);
    let throttle = get(SettingKey::Throttle);
    anyhow::ensure!(throttle >= 0, "{} must be >= 0 (got {})", SettingKey::Throttle, throttle);
    Ok(())
}

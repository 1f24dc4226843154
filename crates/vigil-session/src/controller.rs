use tracing::{debug, error, info, warn};

use vigil_engine::{catalog, AssetSource, DetectionEngine};
use vigil_proto::event::UiEvent;
use vigil_proto::{ControllerMode, DetectMode, Facing};
use vigil_settings::{SettingKey, SettingsStore};

use crate::config::{threshold_label, throttle_label, SessionConfig};
use crate::ports::{Fault, Presenter};
use crate::SessionError;

/// What a selection event did to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Unchanged,
    HotApplied,
    Reloaded { loaded: bool },
}

/// Single owner of [`SessionConfig`]. Decides reload vs hot-apply and
/// persists every change it makes.
#[derive(Debug)]
pub struct ConfigController {
    config: SessionConfig,
    mode: ControllerMode,
    assets: AssetSource,
    reloads: u64,
    suppressed: u64,
}

impl ConfigController {
    pub fn new(config: SessionConfig, assets: AssetSource) -> Self {
        Self { config, mode: ControllerMode::Initializing, assets, reloads: 0, suppressed: 0 }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn mode(&self) -> ControllerMode {
        self.mode
    }

    pub fn reloads(&self) -> u64 {
        self.reloads
    }

    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }

    pub(crate) fn set_mode(&mut self, mode: ControllerMode) {
        debug!("controller: mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
    }

    pub(crate) fn suppress(&mut self, ev: &UiEvent) {
        self.suppressed += 1;
        debug!("controller: initializing, ignoring {:?}", ev);
    }

    pub fn set_model(
        &mut self,
        engine: &mut impl DetectionEngine,
        store: &mut impl SettingsStore,
        presenter: &mut impl Presenter,
        index: u32,
    ) -> Result<Applied, SessionError> {
        check_index("model", index, catalog::MODELS.len())?;
        if index == self.config.model_index {
            return Ok(Applied::Unchanged);
        }
        info!("controller: model {} -> {}", self.config.model_index, index);
        self.config.model_index = index;
        let loaded = self.reload(engine, presenter);
        store.put_int(SettingKey::Model, index as i32);
        Ok(Applied::Reloaded { loaded })
    }

    pub fn set_backend(
        &mut self,
        engine: &mut impl DetectionEngine,
        store: &mut impl SettingsStore,
        presenter: &mut impl Presenter,
        index: u32,
    ) -> Result<Applied, SessionError> {
        check_index("backend", index, catalog::BACKENDS.len())?;
        if index == self.config.backend_index {
            return Ok(Applied::Unchanged);
        }
        info!("controller: backend {} -> {}", self.config.backend_index, index);
        self.config.backend_index = index;
        let loaded = self.reload(engine, presenter);
        store.put_int(SettingKey::Backend, index as i32);
        Ok(Applied::Reloaded { loaded })
    }

    pub fn set_detect_mode(
        &mut self,
        engine: &mut impl DetectionEngine,
        store: &mut impl SettingsStore,
        index: u32,
    ) -> Result<Applied, SessionError> {
        let mode = i32::try_from(index)
            .ok()
            .and_then(DetectMode::from_index)
            .ok_or(SessionError::InvalidSelection { what: "detect mode", index, available: DetectMode::ALL.len() })?;
        if mode == self.config.detect_mode {
            return Ok(Applied::Unchanged);
        }
        info!("controller: detect mode {:?} -> {:?}", self.config.detect_mode, mode);
        self.config.detect_mode = mode;
        engine.set_detect_mode(mode);
        store.put_int(SettingKey::DetectMode, mode.index());
        Ok(Applied::HotApplied)
    }

    pub fn set_confidence_threshold(
        &mut self,
        engine: &mut impl DetectionEngine,
        store: &mut impl SettingsStore,
        presenter: &mut impl Presenter,
        progress: u32,
    ) -> Applied {
        let progress = self.preview_confidence_threshold(engine, presenter, progress);
        // the slider position, not the float, so the label comes back exact
        store.put_int(SettingKey::Threshold, progress as i32);
        Applied::HotApplied
    }

    /// Slider still moving: apply and relabel without a write. Returns the
    /// clamped progress.
    pub fn preview_confidence_threshold(
        &mut self,
        engine: &mut impl DetectionEngine,
        presenter: &mut impl Presenter,
        progress: u32,
    ) -> u32 {
        if progress > 100 {
            warn!("controller: threshold progress {} clamped to 100", progress);
        }
        let progress = progress.min(100);
        self.config.threshold_progress = progress;
        let threshold = self.config.confidence_threshold();
        debug!("controller: threshold progress={} threshold={}", progress, threshold);
        engine.set_confidence_threshold(threshold);
        presenter.show_threshold(&threshold_label(progress));
        progress
    }

    pub fn set_throttle_interval(
        &mut self,
        engine: &mut impl DetectionEngine,
        store: &mut impl SettingsStore,
        presenter: &mut impl Presenter,
        ms: u32,
    ) -> Applied {
        let ms = self.preview_throttle_interval(engine, presenter, ms);
        store.put_int(SettingKey::Throttle, ms as i32);
        Applied::HotApplied
    }

    pub fn preview_throttle_interval(
        &mut self,
        engine: &mut impl DetectionEngine,
        presenter: &mut impl Presenter,
        ms: u32,
    ) -> u32 {
        // must fit the store's int
        let ms = ms.min(i32::MAX as u32);
        self.config.throttle_ms = ms;
        debug!("controller: throttle {} ms", ms);
        engine.set_throttle_interval(ms);
        presenter.show_throttle(&throttle_label(ms));
        ms
    }

    /// Load the current model/backend, then push throttle and detect mode
    /// again: a load gives no guarantee about runtime parameters.
    pub fn reload(&mut self, engine: &mut impl DetectionEngine, presenter: &mut impl Presenter) -> bool {
        self.reloads += 1;
        let (model, backend) = (self.config.model_index, self.config.backend_index);
        info!("controller: reload model={} backend={}", model, backend);

        let loaded = match engine.load_model(&self.assets, model, backend) {
            Ok(()) => true,
            Err(e) => {
                error!("controller: loadModel failed: {}", e);
                presenter.report(&Fault::EngineLoad(e));
                false
            }
        };

        engine.set_throttle_interval(self.config.throttle_ms);
        engine.set_detect_mode(self.config.detect_mode);
        loaded
    }

    /// One reload plus one push of every runtime parameter.
    pub(crate) fn sync_engine(&mut self, engine: &mut impl DetectionEngine, presenter: &mut impl Presenter) {
        self.reload(engine, presenter);
        engine.set_confidence_threshold(self.config.confidence_threshold());
        engine.set_throttle_interval(self.config.throttle_ms);
        engine.set_detect_mode(self.config.detect_mode);
    }

    pub(crate) fn commit_facing(&mut self, store: &mut impl SettingsStore, facing: Facing) {
        self.config.facing = facing;
        store.put_int(SettingKey::Facing, facing.index());
    }
}

fn check_index(what: &'static str, index: u32, len: usize) -> Result<(), SessionError> {
    if (index as usize) < len {
        Ok(())
    } else {
        Err(SessionError::InvalidSelection { what, index, available: len })
    }
}

use std::collections::HashSet;
use tracing::{debug, warn};

use vigil_proto::event::SurfaceHandle;
use vigil_proto::{DetectMode, Facing};

use crate::catalog::{self, Backend};
use crate::{AssetSource, DetectionEngine, EngineError};

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub gpu_available: bool,
    pub unavailable_facings: Vec<Facing>,
    /// Loading a model resets throttle/detect mode to engine defaults,
    /// like the native detector does.
    pub reset_on_load: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { gpu_available: true, unavailable_facings: Vec::new(), reset_on_load: true }
    }
}

/// One call across the binding surface, in the order it was made.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    LoadModel { model: u32, backend: u32 },
    OpenCamera(Facing),
    CloseCamera,
    SetOutputWindow(SurfaceHandle),
    SetConfidenceThreshold(f32),
    SetThrottleInterval(u32),
    SetDetectMode(DetectMode),
}

impl EngineCall {
    pub fn is_load(&self) -> bool {
        matches!(self, EngineCall::LoadModel { .. })
    }

    /// Threshold, throttle and detect-mode updates.
    pub fn is_hot_apply(&self) -> bool {
        matches!(
            self,
            EngineCall::SetConfidenceThreshold(_) | EngineCall::SetThrottleInterval(_) | EngineCall::SetDetectMode(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedModel {
    pub model: u32,
    pub backend: Backend,
    pub throttle_ms: u32,
    pub detect_mode: DetectMode,
}

/// In-process stand-in for the native detector: keeps the same observable
/// state and records every call.
#[derive(Debug)]
pub struct SimEngine {
    gpu_available: bool,
    unavailable: HashSet<Facing>,
    reset_on_load: bool,

    loaded: Option<LoadedModel>,
    camera: Option<Facing>,
    window: Option<SurfaceHandle>,
    threshold: f32,
    calls: Vec<EngineCall>,
}

impl Default for SimEngine {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl SimEngine {
    pub fn new(cfg: SimConfig) -> Self {
        Self {
            gpu_available: cfg.gpu_available,
            unavailable: cfg.unavailable_facings.into_iter().collect(),
            reset_on_load: cfg.reset_on_load,
            loaded: None,
            camera: None,
            window: None,
            threshold: 0.4,
            calls: Vec::new(),
        }
    }

    pub fn set_facing_available(&mut self, facing: Facing, available: bool) {
        if available {
            self.unavailable.remove(&facing);
        } else {
            self.unavailable.insert(facing);
        }
    }

    pub fn set_gpu_available(&mut self, available: bool) {
        self.gpu_available = available;
    }

    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<EngineCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn loaded(&self) -> Option<LoadedModel> {
        self.loaded
    }

    pub fn camera(&self) -> Option<Facing> {
        self.camera
    }

    pub fn output_window(&self) -> Option<SurfaceHandle> {
        self.window
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl DetectionEngine for SimEngine {
    fn load_model(&mut self, assets: &AssetSource, model: u32, backend: u32) -> Result<(), EngineError> {
        self.calls.push(EngineCall::LoadModel { model, backend });
        debug!("engine: load_model model={} backend={}", model, backend);

        let spec = catalog::model(model).ok_or(EngineError::UnknownModel(model))?;
        let be = catalog::backend(backend).ok_or(EngineError::UnknownBackend(backend))?;
        if let Some(missing) = assets.missing_files(spec).into_iter().next() {
            return Err(EngineError::MissingAsset(missing));
        }

        if be == Backend::Gpu && !self.gpu_available {
            // the detector is torn down, not kept
            warn!("engine: no gpu, dropping loaded model");
            self.loaded = None;
            return Err(EngineError::BackendUnavailable(be));
        }

        let (throttle_ms, detect_mode) = match self.loaded {
            Some(prev) if !self.reset_on_load => (prev.throttle_ms, prev.detect_mode),
            _ => (0, DetectMode::default()),
        };
        self.loaded = Some(LoadedModel { model, backend: be, throttle_ms, detect_mode });
        Ok(())
    }

    fn open_camera(&mut self, facing: Facing) -> Result<(), EngineError> {
        self.calls.push(EngineCall::OpenCamera(facing));
        debug!("engine: open_camera facing={:?}", facing);
        if self.unavailable.contains(&facing) {
            self.camera = None;
            return Err(EngineError::CameraOpen(facing));
        }
        self.camera = Some(facing);
        Ok(())
    }

    fn close_camera(&mut self) {
        self.calls.push(EngineCall::CloseCamera);
        debug!("engine: close_camera");
        self.camera = None;
    }

    fn set_output_window(&mut self, surface: SurfaceHandle) {
        self.calls.push(EngineCall::SetOutputWindow(surface));
        self.window = Some(surface);
    }

    fn set_confidence_threshold(&mut self, threshold: f32) {
        self.calls.push(EngineCall::SetConfidenceThreshold(threshold));
        self.threshold = threshold;
    }

    fn set_throttle_interval(&mut self, ms: u32) {
        self.calls.push(EngineCall::SetThrottleInterval(ms));
        if let Some(m) = self.loaded.as_mut() {
            m.throttle_ms = ms;
            debug!("engine: throttle_interval {} ms", ms);
        }
    }

    fn set_detect_mode(&mut self, mode: DetectMode) {
        self.calls.push(EngineCall::SetDetectMode(mode));
        if let Some(m) = self.loaded.as_mut() {
            m.detect_mode = mode;
            debug!("engine: detect_mode {:?}", mode);
        }
    }

    fn throttle_interval(&self) -> u32 {
        self.loaded.map(|m| m.throttle_ms).unwrap_or(0)
    }

    fn detect_mode(&self) -> DetectMode {
        self.loaded.map(|m| m.detect_mode).unwrap_or_default()
    }
}

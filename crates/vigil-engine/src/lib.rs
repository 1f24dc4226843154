pub mod catalog;
pub mod sim;
#[cfg(feature = "engine-native")]
pub mod native;

use std::path::{Path, PathBuf};
use thiserror::Error;

use vigil_proto::event::SurfaceHandle;
use vigil_proto::{DetectMode, Facing};

pub use catalog::{Backend, ModelSpec};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("model index {0} is not in the bundled model table")]
    UnknownModel(u32),
    #[error("backend index {0} is not in the backend table")]
    UnknownBackend(u32),
    #[error("backend {0} is not available on this device")]
    BackendUnavailable(Backend),
    #[error("model asset missing: {}", .0.display())]
    MissingAsset(PathBuf),
    #[error("native loadModel failed (model={model} backend={backend})")]
    LoadFailed { model: u32, backend: u32 },
    #[error("camera {0:?} could not be opened")]
    CameraOpen(Facing),
}

/// Where the engine reads model files from. `bundled()` means the engine
/// resolves assets itself (packaged with the native library).
#[derive(Debug, Clone, Default)]
pub struct AssetSource {
    root: Option<PathBuf>,
}

impl AssetSource {
    pub fn bundled() -> Self {
        Self { root: None }
    }

    pub fn dir(root: impl Into<PathBuf>) -> Self {
        Self { root: Some(root.into()) }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Files of `spec` that are expected under the asset root but absent.
    pub fn missing_files(&self, spec: &ModelSpec) -> Vec<PathBuf> {
        let Some(root) = &self.root else { return Vec::new(); };
        [spec.param_file(), spec.bin_file()]
            .into_iter()
            .map(|f| root.join(f))
            .filter(|p| !p.exists())
            .collect()
    }
}

/// Binding surface of the native detector. The engine owns its own threads
/// and memory; every call returns before the next UI event is handled.
pub trait DetectionEngine {
    fn load_model(&mut self, assets: &AssetSource, model: u32, backend: u32) -> Result<(), EngineError>;
    fn open_camera(&mut self, facing: Facing) -> Result<(), EngineError>;
    /// Idempotent.
    fn close_camera(&mut self);
    fn set_output_window(&mut self, surface: SurfaceHandle);
    fn set_confidence_threshold(&mut self, threshold: f32);
    fn set_throttle_interval(&mut self, ms: u32);
    fn set_detect_mode(&mut self, mode: DetectMode);

    /// 0 while no model is loaded.
    fn throttle_interval(&self) -> u32;
    /// `HumanOnly` while no model is loaded.
    fn detect_mode(&self) -> DetectMode;
}

impl<E: DetectionEngine + ?Sized> DetectionEngine for Box<E> {
    fn load_model(&mut self, assets: &AssetSource, model: u32, backend: u32) -> Result<(), EngineError> {
        (**self).load_model(assets, model, backend)
    }
    fn open_camera(&mut self, facing: Facing) -> Result<(), EngineError> {
        (**self).open_camera(facing)
    }
    fn close_camera(&mut self) {
        (**self).close_camera()
    }
    fn set_output_window(&mut self, surface: SurfaceHandle) {
        (**self).set_output_window(surface)
    }
    fn set_confidence_threshold(&mut self, threshold: f32) {
        (**self).set_confidence_threshold(threshold)
    }
    fn set_throttle_interval(&mut self, ms: u32) {
        (**self).set_throttle_interval(ms)
    }
    fn set_detect_mode(&mut self, mode: DetectMode) {
        (**self).set_detect_mode(mode)
    }
    fn throttle_interval(&self) -> u32 {
        (**self).throttle_interval()
    }
    fn detect_mode(&self) -> DetectMode {
        (**self).detect_mode()
    }
}

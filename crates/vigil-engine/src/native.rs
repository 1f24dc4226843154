use std::ffi::CString;
use std::marker::PhantomData;
use std::os::raw::{c_char, c_float, c_int, c_void};
use std::ptr;
use tracing::{info, warn};

use vigil_proto::event::SurfaceHandle;
use vigil_proto::{DetectMode, Facing};

use crate::catalog::{self, Backend};
use crate::{AssetSource, DetectionEngine, EngineError};

// C shim over the ncnn detector and NDK camera. All state lives in the
// library (one detector, one camera per process).
#[link(name = "vigil_ncnn")]
extern "C" {
    fn vigil_load_model(
        asset_root: *const c_char,
        model_name: *const c_char,
        target_size: c_int,
        mean_vals: *const c_float,
        norm_vals: *const c_float,
        use_gpu: c_int,
    ) -> c_int;
    fn vigil_open_camera(facing: c_int) -> c_int;
    fn vigil_close_camera();
    fn vigil_set_output_window(window: *mut c_void);
    fn vigil_set_confidence_threshold(threshold: c_float);
    fn vigil_set_throttle_interval(ms: c_int);
    fn vigil_get_throttle_interval() -> c_int;
    fn vigil_set_detect_mode(mode: c_int);
    fn vigil_get_detect_mode() -> c_int;
}

pub struct NativeEngine {
    // process-global native state: keep the handle on the thread that made it
    _not_send: PhantomData<*mut ()>,
}

impl NativeEngine {
    pub fn new() -> Self {
        info!("engine: using native vigil_ncnn binding");
        Self { _not_send: PhantomData }
    }
}

impl Default for NativeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionEngine for NativeEngine {
    fn load_model(&mut self, assets: &AssetSource, model: u32, backend: u32) -> Result<(), EngineError> {
        let spec = catalog::model(model).ok_or(EngineError::UnknownModel(model))?;
        let be = catalog::backend(backend).ok_or(EngineError::UnknownBackend(backend))?;
        let name = CString::new(spec.name).map_err(|_| EngineError::LoadFailed { model, backend })?;

        let root = match assets.root() {
            Some(p) => Some(
                CString::new(p.to_string_lossy().into_owned())
                    .map_err(|_| EngineError::MissingAsset(p.to_path_buf()))?,
            ),
            None => None,
        };
        let root_ptr = root.as_ref().map(|c| c.as_ptr()).unwrap_or(ptr::null());

        // the shim reads `<root>/<name>.param|.bin` and copies the preprocessing constants
        let rc = unsafe {
            vigil_load_model(
                root_ptr,
                name.as_ptr(),
                spec.target_size as c_int,
                spec.mean_vals.as_ptr(),
                spec.norm_vals.as_ptr(),
                (be == Backend::Gpu) as c_int,
            )
        };
        if rc != 0 {
            warn!("engine: vigil_load_model rc={}", rc);
            return Err(EngineError::LoadFailed { model, backend });
        }
        Ok(())
    }

    fn open_camera(&mut self, facing: Facing) -> Result<(), EngineError> {
        let rc = unsafe { vigil_open_camera(facing.index() as c_int) };
        if rc != 0 {
            return Err(EngineError::CameraOpen(facing));
        }
        Ok(())
    }

    fn close_camera(&mut self) {
        unsafe { vigil_close_camera() }
    }

    fn set_output_window(&mut self, surface: SurfaceHandle) {
        unsafe { vigil_set_output_window(surface.0 as usize as *mut c_void) }
    }

    fn set_confidence_threshold(&mut self, threshold: f32) {
        unsafe { vigil_set_confidence_threshold(threshold as c_float) }
    }

    fn set_throttle_interval(&mut self, ms: u32) {
        let ms = ms.min(c_int::MAX as u32) as c_int;
        unsafe { vigil_set_throttle_interval(ms) }
    }

    fn set_detect_mode(&mut self, mode: DetectMode) {
        unsafe { vigil_set_detect_mode(mode.index() as c_int) }
    }

    fn throttle_interval(&self) -> u32 {
        let ms = unsafe { vigil_get_throttle_interval() };
        ms.max(0) as u32
    }

    fn detect_mode(&self) -> DetectMode {
        let raw = unsafe { vigil_get_detect_mode() };
        DetectMode::from_index(raw).unwrap_or_default()
    }
}

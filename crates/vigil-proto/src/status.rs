use serde::{Deserialize, Serialize};

use crate::{CameraState, ControllerMode, DetectMode, Facing};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub ts_unix_ms: i64,
    pub mode: ControllerMode,
    pub camera: CameraState,
    pub facing: Facing,
    pub model_index: u32,
    pub backend_index: u32,
    pub detect_mode: DetectMode,
    pub threshold_progress: u32,
    pub throttle_ms: u32,
    pub error_indicator: bool,
    pub reloads: u64,
    pub suppressed_events: u64,
}

use serde::{Deserialize, Serialize};

/// Opaque render target handed over by the display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SurfaceHandle(pub u64);

/// Everything the UI layer can tell the session. Controls only emit these;
/// they never hold configuration themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UiEvent {
    SwitchCamera,

    ModelSelected { index: u32 },
    BackendSelected { index: u32 },
    DetectModeSelected { index: u32 },

    // slider moving: apply + relabel, no write
    ThresholdDragged { progress: u32 },
    // slider released
    ThresholdSet { progress: u32 },
    ThrottleDragged { ms: u32 },
    ThrottleSet { ms: u32 },

    Resume,
    Pause,
    PermissionResult { granted: bool },

    SurfaceCreated,
    SurfaceChanged {
        #[serde(default)]
        handle: SurfaceHandle,
        format: i32,
        width: u32,
        height: u32,
    },
    SurfaceDestroyed,
}

impl UiEvent {
    /// Value-changed notifications coming from bound controls. These are the
    /// events dropped while persisted state is being restored.
    pub fn is_control_change(&self) -> bool {
        matches!(
            self,
            UiEvent::ModelSelected { .. }
                | UiEvent::BackendSelected { .. }
                | UiEvent::DetectModeSelected { .. }
                | UiEvent::ThresholdDragged { .. }
                | UiEvent::ThresholdSet { .. }
                | UiEvent::ThrottleDragged { .. }
                | UiEvent::ThrottleSet { .. }
        )
    }
}

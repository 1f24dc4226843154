use thiserror::Error;

use vigil_engine::EngineError;
use vigil_proto::Facing;

use crate::config::SessionConfig;

/// Failures surfaced to the user. None of them stop the session.
#[derive(Debug, Error)]
pub enum Fault {
    #[error("model load failed: {0}")]
    EngineLoad(#[source] EngineError),
    #[error("camera {facing:?} could not be opened")]
    CameraOpen { facing: Facing },
    #[error("camera permission denied")]
    PermissionDenied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    CameraError,
    PermissionRequired,
}

impl Dialog {
    pub fn title(self) -> &'static str {
        match self {
            Dialog::CameraError => "Camera error",
            Dialog::PermissionRequired => "Camera permission required",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Dialog::CameraError => {
                "The camera could not be opened. Possible causes:\n\n\
                 1. The device does not support the native camera API\n\
                 2. Camera permission has not been granted\n\
                 3. Another app is using the camera"
            }
            Dialog::PermissionRequired => {
                "This app needs the camera permission to run. Enable it in the system settings."
            }
        }
    }
}

/// Display side of the session: the bound controls, the error indicator and
/// modal dialogs.
pub trait Presenter {
    /// Put restored values into the bound controls. Controls may echo change
    /// notifications back; those arrive while the controller is initializing.
    fn restore_controls(&mut self, cfg: &SessionConfig);
    fn show_threshold(&mut self, text: &str);
    fn show_throttle(&mut self, text: &str);
    fn set_error_indicator(&mut self, visible: bool);
    fn show_dialog(&mut self, dialog: Dialog);
    fn report(&mut self, fault: &Fault);
}

pub trait Permissions {
    fn camera_granted(&self) -> bool;
    /// Asynchronous: the answer comes back later as a `PermissionResult` event.
    fn request_camera(&mut self);
}

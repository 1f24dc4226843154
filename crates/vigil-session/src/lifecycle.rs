use tracing::{debug, info, warn};

use vigil_engine::DetectionEngine;
use vigil_proto::{CameraState, Facing};
use vigil_settings::SettingsStore;

use crate::controller::ConfigController;
use crate::ports::{Dialog, Fault, Permissions, Presenter};

/// Camera open/close against the engine, with the facing-switch fallback and
/// the permission round trip.
#[derive(Debug, Default)]
pub struct CameraLifecycle {
    state: CameraState,
    error_visible: bool,
    awaiting_permission: bool,
    // between Resume and Pause
    resumed: bool,
}

impl CameraLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn error_visible(&self) -> bool {
        self.error_visible
    }

    pub fn awaiting_permission(&self) -> bool {
        self.awaiting_permission
    }

    /// Try the other camera; on failure go back to the one that was working.
    /// `facing` is committed and persisted only when the new camera opens.
    pub fn switch_facing(
        &mut self,
        ctl: &mut ConfigController,
        engine: &mut impl DetectionEngine,
        store: &mut impl SettingsStore,
        presenter: &mut impl Presenter,
    ) -> CameraState {
        let prev = ctl.config().facing;
        let next = prev.opposite();
        info!("camera: switch {:?} -> {:?}", prev, next);

        self.close(engine);
        match engine.open_camera(next) {
            Ok(()) => {
                self.state = CameraState::Open;
                ctl.commit_facing(store, next);
                self.clear_error(presenter);
            }
            Err(e) => {
                warn!("camera: {}, reopening {:?}", e, prev);
                match engine.open_camera(prev) {
                    Ok(()) => {
                        self.state = CameraState::Open;
                        self.clear_error(presenter);
                    }
                    Err(e) => {
                        warn!("camera: fallback failed: {}", e);
                        self.fail(presenter, prev);
                    }
                }
            }
        }
        self.state
    }

    pub fn on_resume(
        &mut self,
        ctl: &ConfigController,
        engine: &mut impl DetectionEngine,
        permissions: &mut impl Permissions,
        presenter: &mut impl Presenter,
    ) {
        self.resumed = true;
        if !permissions.camera_granted() {
            if self.awaiting_permission {
                debug!("camera: permission request already pending");
            } else {
                info!("camera: permission not granted, requesting");
                self.awaiting_permission = true;
                permissions.request_camera();
            }
            return;
        }
        if self.state == CameraState::Open {
            debug!("camera: already open");
            return;
        }
        self.open_current(ctl.config().facing, engine, presenter);
    }

    pub fn on_permission_result(
        &mut self,
        granted: bool,
        ctl: &ConfigController,
        engine: &mut impl DetectionEngine,
        presenter: &mut impl Presenter,
    ) {
        self.awaiting_permission = false;
        if granted {
            info!("camera: permission granted");
            if !self.resumed {
                // paused since the request; the next resume opens it
                debug!("camera: paused, not opening");
                return;
            }
            if self.state == CameraState::Open {
                debug!("camera: already open");
                return;
            }
            self.open_current(ctl.config().facing, engine, presenter);
        } else {
            warn!("camera: permission denied");
            self.state = CameraState::Closed;
            presenter.report(&Fault::PermissionDenied);
            presenter.show_dialog(Dialog::PermissionRequired);
        }
    }

    pub fn on_pause(&mut self, engine: &mut impl DetectionEngine) {
        debug!("camera: pause from {:?}", self.state);
        self.resumed = false;
        self.close(engine);
    }

    /// Idempotent.
    pub fn close(&mut self, engine: &mut impl DetectionEngine) {
        engine.close_camera();
        self.state = CameraState::Closed;
    }

    // No fallback here: nothing was open before.
    fn open_current(&mut self, facing: Facing, engine: &mut impl DetectionEngine, presenter: &mut impl Presenter) {
        match engine.open_camera(facing) {
            Ok(()) => {
                self.state = CameraState::Open;
                self.clear_error(presenter);
            }
            Err(e) => {
                warn!("camera: {}", e);
                self.fail(presenter, facing);
            }
        }
    }

    fn fail(&mut self, presenter: &mut impl Presenter, facing: Facing) {
        self.state = CameraState::Failed;
        self.error_visible = true;
        presenter.report(&Fault::CameraOpen { facing });
        presenter.set_error_indicator(true);
        presenter.show_dialog(Dialog::CameraError);
    }

    fn clear_error(&mut self, presenter: &mut impl Presenter) {
        self.error_visible = false;
        presenter.set_error_indicator(false);
    }
}

pub mod config;
pub mod controller;
pub mod lifecycle;
pub mod ports;
mod init;

use thiserror::Error;
use tracing::debug;

use vigil_engine::{AssetSource, DetectionEngine};
use vigil_proto::event::UiEvent;
use vigil_proto::status::StatusReport;
use vigil_proto::{CameraState, ControllerMode};
use vigil_settings::SettingsStore;

pub use config::SessionConfig;
pub use controller::{Applied, ConfigController};
pub use lifecycle::CameraLifecycle;
pub use ports::{Dialog, Fault, Permissions, Presenter};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{what} index {index} out of range (available: {available})")]
    InvalidSelection { what: &'static str, index: u32, available: usize },
}

/// One app instance: the engine, the settings store and the UI ports, driven
/// by [`UiEvent`]s on a single thread.
pub struct Session<E, S, P, G> {
    engine: E,
    store: S,
    presenter: P,
    permissions: G,
    controller: ConfigController,
    camera: CameraLifecycle,
}

impl<E, S, P, G> Session<E, S, P, G>
where
    E: DetectionEngine,
    S: SettingsStore,
    P: Presenter,
    G: Permissions,
{
    /// The config is read from `store` here; call [`Session::initialize`]
    /// before feeding events.
    pub fn new(engine: E, store: S, presenter: P, permissions: G, assets: AssetSource) -> Self {
        let config = SessionConfig::restore(&store);
        Self {
            engine,
            store,
            presenter,
            permissions,
            controller: ConfigController::new(config, assets),
            camera: CameraLifecycle::new(),
        }
    }

    pub fn handle(&mut self, ev: UiEvent) -> Result<(), SessionError> {
        if ev.is_control_change() && self.controller.mode() == ControllerMode::Initializing {
            self.controller.suppress(&ev);
            return Ok(());
        }
        debug!("session: {:?}", ev);

        let ctl = &mut self.controller;
        let (engine, store, presenter) = (&mut self.engine, &mut self.store, &mut self.presenter);
        match ev {
            UiEvent::SwitchCamera => {
                self.camera.switch_facing(ctl, engine, store, presenter);
            }
            UiEvent::ModelSelected { index } => {
                ctl.set_model(engine, store, presenter, index)?;
            }
            UiEvent::BackendSelected { index } => {
                ctl.set_backend(engine, store, presenter, index)?;
            }
            UiEvent::DetectModeSelected { index } => {
                ctl.set_detect_mode(engine, store, index)?;
            }
            UiEvent::ThresholdDragged { progress } => {
                ctl.preview_confidence_threshold(engine, presenter, progress);
            }
            UiEvent::ThresholdSet { progress } => {
                ctl.set_confidence_threshold(engine, store, presenter, progress);
            }
            UiEvent::ThrottleDragged { ms } => {
                ctl.preview_throttle_interval(engine, presenter, ms);
            }
            UiEvent::ThrottleSet { ms } => {
                ctl.set_throttle_interval(engine, store, presenter, ms);
            }
            UiEvent::Resume => {
                self.camera.on_resume(ctl, engine, &mut self.permissions, presenter);
            }
            UiEvent::Pause => self.camera.on_pause(engine),
            UiEvent::PermissionResult { granted } => {
                self.camera.on_permission_result(granted, ctl, engine, presenter);
            }
            UiEvent::SurfaceChanged { handle, format, width, height } => {
                debug!("session: surface changed format={} {}x{}", format, width, height);
                engine.set_output_window(handle);
            }
            UiEvent::SurfaceCreated | UiEvent::SurfaceDestroyed => {}
        }
        Ok(())
    }

    /// Idempotent.
    pub fn close_camera(&mut self) {
        self.camera.close(&mut self.engine);
    }

    pub fn reload(&mut self) -> bool {
        self.controller.reload(&mut self.engine, &mut self.presenter)
    }

    pub fn config(&self) -> &SessionConfig {
        self.controller.config()
    }

    pub fn mode(&self) -> ControllerMode {
        self.controller.mode()
    }

    pub fn camera_state(&self) -> CameraState {
        self.camera.state()
    }

    pub fn error_visible(&self) -> bool {
        self.camera.error_visible()
    }

    /// A camera permission request is out and its answer has not arrived.
    pub fn awaiting_permission(&self) -> bool {
        self.camera.awaiting_permission()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn permissions_mut(&mut self) -> &mut G {
        &mut self.permissions
    }

    pub fn status(&self, ts_unix_ms: i64) -> StatusReport {
        let cfg = self.controller.config();
        StatusReport {
            ts_unix_ms,
            mode: self.controller.mode(),
            camera: self.camera.state(),
            facing: cfg.facing,
            model_index: cfg.model_index,
            backend_index: cfg.backend_index,
            detect_mode: cfg.detect_mode,
            threshold_progress: cfg.threshold_progress,
            throttle_ms: cfg.throttle_ms,
            error_indicator: self.camera.error_visible(),
            reloads: self.controller.reloads(),
            suppressed_events: self.controller.suppressed(),
        }
    }
}

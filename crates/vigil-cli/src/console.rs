use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};

use vigil_proto::event::UiEvent;
use vigil_session::{Dialog, Fault, Permissions, Presenter, SessionConfig};

/// What the event loop consumes: UI events, then an end-of-script marker.
#[derive(Debug)]
pub enum Msg {
    Event(UiEvent),
    End,
}

/// Presenter that writes to the log instead of drawing widgets.
#[derive(Debug, Default)]
pub struct ConsolePresenter {
    indicator: bool,
}

impl Presenter for ConsolePresenter {
    fn restore_controls(&mut self, cfg: &SessionConfig) {
        info!(
            "ui: controls facing={:?} model={} backend={} detect_mode={:?}",
            cfg.facing, cfg.model_index, cfg.backend_index, cfg.detect_mode
        );
    }

    fn show_threshold(&mut self, text: &str) {
        info!("ui: threshold {}", text);
    }

    fn show_throttle(&mut self, text: &str) {
        info!("ui: throttle {}", text);
    }

    fn set_error_indicator(&mut self, visible: bool) {
        if visible != self.indicator {
            info!("ui: camera error indicator {}", if visible { "shown" } else { "hidden" });
        }
        self.indicator = visible;
    }

    fn show_dialog(&mut self, dialog: Dialog) {
        warn!("ui: dialog [{}] {}", dialog.title(), dialog.message());
    }

    fn report(&mut self, fault: &Fault) {
        error!("ui: {:#}", fault);
    }
}

/// Permission source driven by config. A request is answered by queueing a
/// `PermissionResult` behind whatever is already pending.
pub struct ScriptPermissions {
    granted: bool,
    grant_on_request: bool,
    tx: UnboundedSender<Msg>,
}

impl ScriptPermissions {
    pub fn new(granted: bool, grant_on_request: bool, tx: UnboundedSender<Msg>) -> Self {
        Self { granted, grant_on_request, tx }
    }
}

impl Permissions for ScriptPermissions {
    fn camera_granted(&self) -> bool {
        self.granted
    }

    fn request_camera(&mut self) {
        let granted = self.grant_on_request;
        info!("permission: camera requested, answering granted={}", granted);
        if granted {
            self.granted = true;
        }
        if self.tx.send(Msg::Event(UiEvent::PermissionResult { granted })).is_err() {
            warn!("permission: event loop gone, result dropped");
        }
    }
}

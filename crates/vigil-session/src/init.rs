//! Startup restore. Bound controls echo change notifications while they are
//! being filled in; the controller stays in `Initializing` until every
//! restored value is in place, then runs a single engine sync.

use tracing::{info, warn};

use vigil_engine::DetectionEngine;
use vigil_proto::ControllerMode;
use vigil_settings::SettingsStore;

use crate::config::{threshold_label, throttle_label};
use crate::ports::{Permissions, Presenter};
use crate::Session;

impl<E, S, P, G> Session<E, S, P, G>
where
    E: DetectionEngine,
    S: SettingsStore,
    P: Presenter,
    G: Permissions,
{
    /// Enter suppression and fill the controls from the restored config.
    pub fn begin_restore(&mut self) {
        self.controller.set_mode(ControllerMode::Initializing);
        let cfg = *self.controller.config();
        info!(
            "init: restoring facing={:?} model={} backend={} detect_mode={:?} threshold={} throttle={}",
            cfg.facing, cfg.model_index, cfg.backend_index, cfg.detect_mode, cfg.threshold_progress, cfg.throttle_ms
        );
        self.presenter.restore_controls(&cfg);
        self.presenter.show_threshold(&threshold_label(cfg.threshold_progress));
        self.presenter.show_throttle(&throttle_label(cfg.throttle_ms));
    }

    /// Leave suppression and bring the engine in line with the config.
    pub fn finish_restore(&mut self) {
        if self.controller.mode() == ControllerMode::Ready {
            warn!("init: finish_restore without begin_restore, skipping sync");
            return;
        }
        self.controller.set_mode(ControllerMode::Ready);
        info!("init: ready ({} notifications suppressed)", self.controller.suppressed());
        self.controller.sync_engine(&mut self.engine, &mut self.presenter);
    }

    pub fn initialize(&mut self) {
        self.begin_restore();
        self.finish_restore();
    }
}

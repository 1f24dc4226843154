#![allow(dead_code)]

use vigil_engine::sim::{SimConfig, SimEngine};
use vigil_engine::AssetSource;
use vigil_session::{Dialog, Fault, Permissions, Presenter, Session, SessionConfig};
use vigil_settings::MemoryStore;

#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub restored: Vec<SessionConfig>,
    pub threshold_text: Option<String>,
    pub throttle_text: Option<String>,
    pub indicator: bool,
    pub dialogs: Vec<Dialog>,
    pub faults: Vec<String>,
}

impl Presenter for RecordingPresenter {
    fn restore_controls(&mut self, cfg: &SessionConfig) {
        self.restored.push(*cfg);
    }
    fn show_threshold(&mut self, text: &str) {
        self.threshold_text = Some(text.to_string());
    }
    fn show_throttle(&mut self, text: &str) {
        self.throttle_text = Some(text.to_string());
    }
    fn set_error_indicator(&mut self, visible: bool) {
        self.indicator = visible;
    }
    fn show_dialog(&mut self, dialog: Dialog) {
        self.dialogs.push(dialog);
    }
    fn report(&mut self, fault: &Fault) {
        self.faults.push(fault.to_string());
    }
}

#[derive(Debug)]
pub struct FakePermissions {
    pub granted: bool,
    pub requests: u32,
}

impl Permissions for FakePermissions {
    fn camera_granted(&self) -> bool {
        self.granted
    }
    fn request_camera(&mut self) {
        self.requests += 1;
    }
}

pub type TestSession = Session<SimEngine, MemoryStore, RecordingPresenter, FakePermissions>;

pub fn session_with(store: MemoryStore, engine: SimConfig, granted: bool) -> TestSession {
    Session::new(
        SimEngine::new(engine),
        store,
        RecordingPresenter::default(),
        FakePermissions { granted, requests: 0 },
        AssetSource::bundled(),
    )
}

/// Initialized session with the call log and write log emptied.
pub fn ready(store: MemoryStore) -> TestSession {
    ready_with(store, SimConfig::default())
}

pub fn ready_with(store: MemoryStore, engine: SimConfig) -> TestSession {
    let mut s = session_with(store, engine, true);
    s.initialize();
    s.engine_mut().take_calls();
    s.store_mut().clear_writes();
    s
}

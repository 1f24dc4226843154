mod common;

use common::{ready, ready_with, RecordingPresenter};
use vigil_engine::sim::{EngineCall, SimConfig, SimEngine};
use vigil_engine::{AssetSource, DetectionEngine};
use vigil_proto::event::UiEvent;
use vigil_proto::DetectMode;
use vigil_session::{Applied, ConfigController, SessionConfig, SessionError};
use vigil_settings::{MemoryStore, SettingKey};

#[test]
fn same_model_is_a_no_op() {
    let mut s = ready(MemoryStore::new());
    s.handle(UiEvent::ModelSelected { index: 0 }).unwrap();
    s.handle(UiEvent::BackendSelected { index: 0 }).unwrap();
    assert!(s.engine().calls().is_empty());
    assert!(s.store().writes().is_empty());
}

#[test]
fn model_change_reloads_then_persists() {
    let mut s = ready(MemoryStore::new().with(SettingKey::Throttle, 30));
    s.handle(UiEvent::ModelSelected { index: 1 }).unwrap();

    assert_eq!(
        s.engine().calls(),
        &[
            EngineCall::LoadModel { model: 1, backend: 0 },
            EngineCall::SetThrottleInterval(30),
            EngineCall::SetDetectMode(DetectMode::HumanOnly),
        ]
    );
    assert_eq!(s.store().writes(), &[(SettingKey::Model, 1)]);
    assert_eq!(s.config().model_index, 1);
}

#[test]
fn backend_change_reloads_with_current_model() {
    let mut s = ready(MemoryStore::new().with(SettingKey::Model, 2));
    s.handle(UiEvent::BackendSelected { index: 1 }).unwrap();
    assert_eq!(s.engine().calls()[0], EngineCall::LoadModel { model: 2, backend: 1 });
    assert_eq!(s.store().writes(), &[(SettingKey::Backend, 1)]);
}

#[test]
fn runtime_parameters_survive_every_reload() {
    let mut s = ready(MemoryStore::new());
    s.handle(UiEvent::ThrottleSet { ms: 75 }).unwrap();
    s.handle(UiEvent::DetectModeSelected { index: 1 }).unwrap();
    s.handle(UiEvent::ThresholdSet { progress: 30 }).unwrap();

    for (ev, model) in [
        (UiEvent::ModelSelected { index: 2 }, 2),
        (UiEvent::BackendSelected { index: 1 }, 2),
        (UiEvent::ModelSelected { index: 0 }, 0),
    ] {
        s.handle(ev).unwrap();
        let eng = s.engine();
        assert_eq!(eng.loaded().map(|m| m.model), Some(model));
        assert_eq!(eng.throttle_interval(), s.config().throttle_ms);
        assert_eq!(eng.detect_mode(), s.config().detect_mode);
        assert!((eng.threshold() - s.config().confidence_threshold()).abs() < 1e-6);
    }
    assert_eq!(s.engine().throttle_interval(), 75);
    assert_eq!(s.engine().detect_mode(), DetectMode::HumanAndVehicle);
}

#[test]
fn threshold_label_and_no_reload() {
    let mut s = ready(MemoryStore::new());
    for progress in [0u32, 1, 29, 40, 60, 99, 100] {
        s.handle(UiEvent::ThresholdSet { progress }).unwrap();
        assert_eq!(
            s.presenter().threshold_text.as_deref(),
            Some(format!("{:.2}", progress as f32 / 100.0).as_str())
        );
        assert_eq!(s.store().writes().last(), Some(&(SettingKey::Threshold, progress as i32)));
    }
    assert_eq!(s.presenter().threshold_text.as_deref(), Some("1.00"));
    assert!(s.engine().calls().iter().all(|c| c.is_hot_apply()));
}

#[test]
fn threshold_drag_does_not_persist() {
    let mut s = ready(MemoryStore::new());
    s.handle(UiEvent::ThresholdDragged { progress: 55 }).unwrap();
    s.handle(UiEvent::ThresholdDragged { progress: 57 }).unwrap();
    assert!(s.store().writes().is_empty());
    assert_eq!(s.presenter().threshold_text.as_deref(), Some("0.57"));
    assert!((s.engine().threshold() - 0.57).abs() < 1e-6);

    s.handle(UiEvent::ThresholdSet { progress: 57 }).unwrap();
    assert_eq!(s.store().writes(), &[(SettingKey::Threshold, 57)]);
}

#[test]
fn threshold_progress_is_clamped() {
    let mut s = ready(MemoryStore::new());
    s.handle(UiEvent::ThresholdSet { progress: 140 }).unwrap();
    assert_eq!(s.config().threshold_progress, 100);
    assert_eq!(s.store().writes(), &[(SettingKey::Threshold, 100)]);
}

#[test]
fn throttle_is_hot_applied() {
    let mut s = ready(MemoryStore::new());
    s.handle(UiEvent::ThrottleDragged { ms: 10 }).unwrap();
    assert!(s.store().writes().is_empty());
    s.handle(UiEvent::ThrottleSet { ms: 200 }).unwrap();

    assert_eq!(
        s.engine().calls(),
        &[EngineCall::SetThrottleInterval(10), EngineCall::SetThrottleInterval(200)]
    );
    assert_eq!(s.engine().throttle_interval(), 200);
    assert_eq!(s.presenter().throttle_text.as_deref(), Some("200 ms"));
    assert_eq!(s.store().writes(), &[(SettingKey::Throttle, 200)]);
}

#[test]
fn detect_mode_changes_without_reload() {
    let mut s = ready(MemoryStore::new());
    s.handle(UiEvent::DetectModeSelected { index: 0 }).unwrap();
    assert!(s.engine().calls().is_empty());

    s.handle(UiEvent::DetectModeSelected { index: 1 }).unwrap();
    assert_eq!(s.engine().calls(), &[EngineCall::SetDetectMode(DetectMode::HumanAndVehicle)]);
    assert_eq!(s.store().writes(), &[(SettingKey::DetectMode, 1)]);
}

#[test]
fn out_of_table_selection_is_rejected() {
    let mut s = ready(MemoryStore::new());
    let err = s.handle(UiEvent::ModelSelected { index: 3 }).unwrap_err();
    assert!(matches!(err, SessionError::InvalidSelection { what: "model", index: 3, .. }));
    assert!(s.handle(UiEvent::BackendSelected { index: 2 }).is_err());
    assert!(s.handle(UiEvent::DetectModeSelected { index: 2 }).is_err());

    assert_eq!(s.config().model_index, 0);
    assert!(s.engine().calls().is_empty());
    assert!(s.store().writes().is_empty());
}

#[test]
fn failed_load_is_reported_not_fatal() {
    let mut s = ready_with(
        MemoryStore::new().with(SettingKey::Throttle, 40),
        SimConfig { gpu_available: false, ..SimConfig::default() },
    );
    s.handle(UiEvent::BackendSelected { index: 1 }).unwrap();

    assert_eq!(s.presenter().faults.len(), 1);
    assert!(s.presenter().faults[0].contains("model load failed"));
    assert!(s.engine().loaded().is_none());
    // re-application still happens and the selection is kept
    assert_eq!(
        &s.engine().calls()[1..],
        &[EngineCall::SetThrottleInterval(40), EngineCall::SetDetectMode(DetectMode::HumanOnly)]
    );
    assert_eq!(s.store().writes(), &[(SettingKey::Backend, 1)]);

    s.handle(UiEvent::BackendSelected { index: 0 }).unwrap();
    assert!(s.engine().loaded().is_some());
    assert_eq!(s.engine().throttle_interval(), 40);
}

#[test]
fn structural_changes_complete_in_arrival_order() {
    let mut s = ready(MemoryStore::new());
    s.handle(UiEvent::ModelSelected { index: 1 }).unwrap();
    s.handle(UiEvent::ModelSelected { index: 2 }).unwrap();

    let loads: Vec<usize> = s
        .engine()
        .calls()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_load())
        .map(|(i, _)| i)
        .collect();
    assert_eq!(loads, vec![0, 3]);
    assert_eq!(s.engine().calls().len(), 6);
    assert_eq!(s.store().writes(), &[(SettingKey::Model, 1), (SettingKey::Model, 2)]);
}

#[test]
fn controller_reports_what_it_did() {
    let mut ctl = ConfigController::new(SessionConfig::default(), AssetSource::bundled());
    let mut engine = SimEngine::new(SimConfig { gpu_available: false, ..SimConfig::default() });
    let mut store = MemoryStore::new();
    let mut presenter = RecordingPresenter::default();

    assert_eq!(ctl.set_model(&mut engine, &mut store, &mut presenter, 0).unwrap(), Applied::Unchanged);
    assert_eq!(
        ctl.set_model(&mut engine, &mut store, &mut presenter, 1).unwrap(),
        Applied::Reloaded { loaded: true }
    );
    assert_eq!(
        ctl.set_backend(&mut engine, &mut store, &mut presenter, 1).unwrap(),
        Applied::Reloaded { loaded: false }
    );
    assert_eq!(ctl.set_detect_mode(&mut engine, &mut store, 1).unwrap(), Applied::HotApplied);
    assert_eq!(ctl.set_detect_mode(&mut engine, &mut store, 1).unwrap(), Applied::Unchanged);
    assert_eq!(
        ctl.set_throttle_interval(&mut engine, &mut store, &mut presenter, 20),
        Applied::HotApplied
    );
    assert_eq!(ctl.reloads(), 2);
    assert_eq!(presenter.faults.len(), 1);
}

#[test]
fn explicit_reload_reapplies_runtime_parameters() {
    let mut s = ready(MemoryStore::new().with(SettingKey::Throttle, 90).with(SettingKey::DetectMode, 1));
    assert!(s.reload());
    assert_eq!(
        s.engine().calls(),
        &[
            EngineCall::LoadModel { model: 0, backend: 0 },
            EngineCall::SetThrottleInterval(90),
            EngineCall::SetDetectMode(DetectMode::HumanAndVehicle),
        ]
    );
    assert!(s.store().writes().is_empty());

    // gpu goes away under a gpu selection: the load fails, parameters are still pushed
    s.handle(UiEvent::BackendSelected { index: 1 }).unwrap();
    s.engine_mut().set_gpu_available(false);
    s.engine_mut().take_calls();
    assert!(!s.reload());
    assert!(s.engine().loaded().is_none());
    assert_eq!(
        &s.engine().calls()[1..],
        &[EngineCall::SetThrottleInterval(90), EngineCall::SetDetectMode(DetectMode::HumanAndVehicle)]
    );
    // init sync, explicit, backend change, explicit
    assert_eq!(s.status(0).reloads, 4);
}

#[test]
fn engine_keeping_parameters_across_loads_still_matches_config() {
    let mut s = ready_with(MemoryStore::new(), SimConfig { reset_on_load: false, ..SimConfig::default() });
    s.handle(UiEvent::ThrottleSet { ms: 25 }).unwrap();
    s.handle(UiEvent::DetectModeSelected { index: 1 }).unwrap();
    s.handle(UiEvent::ModelSelected { index: 2 }).unwrap();

    let eng = s.engine();
    assert_eq!(eng.loaded().map(|m| m.model), Some(2));
    assert_eq!(eng.throttle_interval(), s.config().throttle_ms);
    assert_eq!(eng.detect_mode(), s.config().detect_mode);
    // the reload still pushes both, whether or not the engine reset them
    let tail: Vec<_> = eng.calls().iter().rev().take(2).cloned().collect();
    assert_eq!(
        tail,
        vec![EngineCall::SetDetectMode(DetectMode::HumanAndVehicle), EngineCall::SetThrottleInterval(25)]
    );
}

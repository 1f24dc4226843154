pub mod event;
pub mod status;

use serde::{Deserialize, Serialize};

/// Which physical camera is active. Persisted as 0 (back) / 1 (front).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    #[default]
    Back,
    Front,
}

impl Facing {
    pub fn opposite(self) -> Self {
        match self {
            Facing::Back => Facing::Front,
            Facing::Front => Facing::Back,
        }
    }

    pub fn index(self) -> i32 {
        match self {
            Facing::Back => 0,
            Facing::Front => 1,
        }
    }

    pub fn from_index(i: i32) -> Option<Self> {
        match i {
            0 => Some(Facing::Back),
            1 => Some(Facing::Front),
            _ => None,
        }
    }
}

/// Class filter applied by the detector. Switching it does not need a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectMode {
    #[default]
    HumanOnly,
    HumanAndVehicle,
}

impl DetectMode {
    pub const ALL: [DetectMode; 2] = [DetectMode::HumanOnly, DetectMode::HumanAndVehicle];

    pub fn index(self) -> i32 {
        match self {
            DetectMode::HumanOnly => 0,
            DetectMode::HumanAndVehicle => 1,
        }
    }

    pub fn from_index(i: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.index() == i)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraState {
    #[default]
    Closed,
    Open,
    Failed,
}

/// Whether control notifications reach the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerMode {
    #[default]
    Initializing,
    Ready,
}

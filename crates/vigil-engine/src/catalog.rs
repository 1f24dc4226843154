use std::fmt;

#[derive(Debug, Clone, Copy)]
pub struct ModelSpec {
    pub name: &'static str,
    pub kind: &'static str,
    pub target_size: u32,
    pub mean_vals: [f32; 3],
    pub norm_vals: [f32; 3],
}

impl ModelSpec {
    pub fn param_file(&self) -> String {
        format!("yolov8{}.param", self.kind)
    }

    pub fn bin_file(&self) -> String {
        format!("yolov8{}.bin", self.kind)
    }
}

const MEAN: [f32; 3] = [103.53, 116.28, 123.675];
const NORM: [f32; 3] = [1.0 / 255.0, 1.0 / 255.0, 1.0 / 255.0];

/// Bundled model table; the model selector shows these in order.
pub const MODELS: &[ModelSpec] = &[
    ModelSpec { name: "yolov8n", kind: "n", target_size: 320, mean_vals: MEAN, norm_vals: NORM },
    ModelSpec { name: "yolov8s", kind: "s", target_size: 320, mean_vals: MEAN, norm_vals: NORM },
    ModelSpec { name: "yolov8m", kind: "m", target_size: 320, mean_vals: MEAN, norm_vals: NORM },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Cpu,
    Gpu,
}

pub const BACKENDS: &[Backend] = &[Backend::Cpu, Backend::Gpu];

impl Backend {
    pub fn index(self) -> u32 {
        match self {
            Backend::Cpu => 0,
            Backend::Gpu => 1,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Cpu => f.write_str("cpu"),
            Backend::Gpu => f.write_str("gpu"),
        }
    }
}

pub fn model(index: u32) -> Option<&'static ModelSpec> {
    MODELS.get(index as usize)
}

pub fn backend(index: u32) -> Option<Backend> {
    BACKENDS.get(index as usize).copied()
}

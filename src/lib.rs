pub mod errors;
pub mod export;
pub mod ingestion;
pub mod mel_script;
pub mod parts;
pub mod rig_config;
pub mod systems;

pub type Point3D = nalgebra::Vector3<f64>;

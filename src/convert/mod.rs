// One-shot 3D asset conversion pipeline

pub mod config;
pub mod devices;
pub mod formats;
pub mod host;
#[cfg(test)]
pub mod host_mock;
pub mod job;

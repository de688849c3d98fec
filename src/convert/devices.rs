//! Render device selection.
//!
//! Policy: enable every accelerator device and disable everything else
//! (pure-accelerator rendering rather than hybrid; a deliberate policy
//! choice, not a requirement of the backend). Zero accelerators, or a failed
//! enumeration, degrade to software rendering and the job continues.

use super::host::{DeviceKind, RenderDevice, RenderHost, RendererConfig, SceneDevice};
use crate::{log_info, log_warn};

/// Outcome of device configuration. The degraded path is an explicit variant
/// so callers can observe and test it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelection {
    Configured { enabled: Vec<String> },
    SoftwareFallback { reason: String },
}

impl DeviceSelection {
    pub fn to_renderer_config(&self) -> RendererConfig {
        match self {
            DeviceSelection::Configured { enabled } => RendererConfig {
                enabled_devices: enabled.clone(),
                scene_device: SceneDevice::Accelerator,
            },
            DeviceSelection::SoftwareFallback { .. } => RendererConfig::software_only(),
        }
    }
}

/// Pick the devices to enable from an enumerated list.
pub fn select_render_devices(devices: &[RenderDevice]) -> DeviceSelection {
    let enabled: Vec<String> = devices
        .iter()
        .filter(|d| d.kind == DeviceKind::Accelerator)
        .map(|d| d.id.clone())
        .collect();

    if enabled.is_empty() {
        return DeviceSelection::SoftwareFallback {
            reason: "no accelerator device found".to_string(),
        };
    }

    DeviceSelection::Configured { enabled }
}

/// Enumerate devices on the host and build the per-job renderer config.
///
/// The config is built atomically from the selection and only then applied at
/// export time, so a failed enumeration can never leave partial enable state
/// behind (full rollback by construction).
pub fn configure_renderer(host: &dyn RenderHost) -> (DeviceSelection, RendererConfig) {
    let selection = match host.list_devices() {
        Ok(devices) => {
            for device in &devices {
                log_info!("Found device: {} ({:?})", device.name, device.kind);
            }
            select_render_devices(&devices)
        }
        Err(e) => DeviceSelection::SoftwareFallback {
            reason: e.to_string(),
        },
    };

    match &selection {
        DeviceSelection::Configured { enabled } => {
            log_info!("Accelerator rendering with {} device(s)", enabled.len());
        }
        DeviceSelection::SoftwareFallback { reason } => {
            log_warn!("Falling back to software rendering: {}", reason);
        }
    }

    let config = selection.to_renderer_config();
    (selection, config)
}

//! Render host seam.
//!
//! The 3D content tool is an external collaborator: it enumerates compute
//! devices, imports an asset into a scene and exports the scene as GLB.
//! `BridgeHost` drives the real tool as a one-shot background subprocess;
//! tests use the recording mock in `host_mock`.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use super::formats::AssetFormat;
use crate::{log_debug, log_info};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("input file not found: {}", .0.display())]
    MissingInput(PathBuf),
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),
    #[error("device enumeration failed: {0}")]
    DeviceEnumeration(String),
    #[error("import failed: {0}")]
    Import(String),
    #[error("export failed: {0}")]
    Export(String),
    #[error("render host error: {0}")]
    Host(String),
}

/// One compute device reported by the render host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderDevice {
    pub id: String,
    pub name: String,
    pub kind: DeviceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Accelerator,
    Cpu,
}

/// Render device the scene is set to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneDevice {
    Accelerator,
    Software,
}

impl SceneDevice {
    pub fn as_str(&self) -> &'static str {
        match self {
            SceneDevice::Accelerator => "accelerator",
            SceneDevice::Software => "software",
        }
    }
}

/// Explicit per-job renderer configuration. Built once from the device
/// selection and passed into the export call; the host never mutates global
/// preference state on our behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererConfig {
    /// Ids of devices left enabled; every other device is disabled.
    pub enabled_devices: Vec<String>,
    pub scene_device: SceneDevice,
}

impl RendererConfig {
    pub fn software_only() -> Self {
        Self {
            enabled_devices: Vec::new(),
            scene_device: SceneDevice::Software,
        }
    }
}

/// Fixed export options; mesh compression is a static flag, not decided at
/// runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Apply all pending scene modifiers.
    pub apply_modifiers: bool,
    /// Export the whole scene, not the current selection.
    pub selection_only: bool,
    pub draco_compression: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            apply_modifiers: true,
            selection_only: false,
            draco_compression: false,
        }
    }
}

/// The opaque content-creation tool.
pub trait RenderHost {
    /// Enumerate the compute devices the render backend can use.
    fn list_devices(&self) -> Result<Vec<RenderDevice>, ConvertError>;

    /// Reset to an empty scene (drops the default cube/light/camera).
    fn reset_scene(&mut self) -> Result<(), ConvertError>;

    /// Import one asset with the already-dispatched format.
    fn import(&mut self, path: &Path, format: AssetFormat) -> Result<(), ConvertError>;

    /// Force the editing context out of any non-default interaction mode;
    /// precondition of the exporter.
    fn ensure_object_mode(&mut self) -> Result<(), ConvertError>;

    /// Export the whole scene as binary GLB.
    fn export_glb(
        &mut self,
        path: &Path,
        opts: &ExportOptions,
        renderer: &RendererConfig,
    ) -> Result<(), ConvertError>;
}

/// Drives the external tool in background mode. The tool is one-shot, so the
/// scene ops are buffered and executed as a single batch when the export is
/// requested; the job is described by a JSON file handed to the driver script.
pub struct BridgeHost {
    tool_bin: String,
    driver_script: String,
    reset_requested: bool,
    object_mode_requested: bool,
    pending_import: Option<(PathBuf, AssetFormat)>,
}

impl BridgeHost {
    pub fn new(tool_bin: &str, driver_script: &str) -> Self {
        Self {
            tool_bin: tool_bin.to_string(),
            driver_script: driver_script.to_string(),
            reset_requested: false,
            object_mode_requested: false,
            pending_import: None,
        }
    }

    fn run_tool(&self, job: &serde_json::Value) -> Result<String, ConvertError> {
        let job_path = std::env::temp_dir().join(format!("convert_job_{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&job_path, job.to_string())
            .map_err(|e| ConvertError::Host(format!("cannot write job file: {e}")))?;

        log_debug!("Running {} with job {}", self.tool_bin, job_path.display());

        let output = Command::new(&self.tool_bin)
            .args(["--background", "--python", &self.driver_script, "--"])
            .arg(&job_path)
            .output();

        let _ = std::fs::remove_file(&job_path);

        let output = output.map_err(|e| {
            ConvertError::Host(format!("failed to launch {}: {e}", self.tool_bin))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        // The driver script reports failures via stdout markers so the bridge
        // can tell an import failure apart from an export failure
        for line in stdout.lines() {
            if let Some(msg) = line.strip_prefix("IMPORT_FAILED: ") {
                return Err(ConvertError::Import(msg.to_string()));
            }
            if let Some(msg) = line.strip_prefix("EXPORT_FAILED: ") {
                return Err(ConvertError::Export(msg.to_string()));
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConvertError::Host(format!(
                "{} exited with {}: {}",
                self.tool_bin,
                output.status,
                stderr.trim()
            )));
        }

        Ok(stdout)
    }
}

impl RenderHost for BridgeHost {
    fn list_devices(&self) -> Result<Vec<RenderDevice>, ConvertError> {
        let stdout = self
            .run_tool(&serde_json::json!({ "op": "probe" }))
            .map_err(|e| ConvertError::DeviceEnumeration(e.to_string()))?;

        // One line per device: DEVICE<TAB>id<TAB>name<TAB>kind
        let mut devices = Vec::new();
        for line in stdout.lines() {
            let Some(rest) = line.strip_prefix("DEVICE\t") else {
                continue;
            };
            let mut fields = rest.split('\t');
            let (Some(id), Some(name), Some(kind)) =
                (fields.next(), fields.next(), fields.next())
            else {
                return Err(ConvertError::DeviceEnumeration(format!(
                    "malformed device line: {line}"
                )));
            };
            let kind = match kind {
                "accelerator" => DeviceKind::Accelerator,
                _ => DeviceKind::Cpu,
            };
            devices.push(RenderDevice {
                id: id.to_string(),
                name: name.to_string(),
                kind,
            });
        }

        log_info!("Render host reported {} compute device(s)", devices.len());
        Ok(devices)
    }

    fn reset_scene(&mut self) -> Result<(), ConvertError> {
        self.reset_requested = true;
        Ok(())
    }

    fn import(&mut self, path: &Path, format: AssetFormat) -> Result<(), ConvertError> {
        self.pending_import = Some((path.to_path_buf(), format));
        Ok(())
    }

    fn ensure_object_mode(&mut self) -> Result<(), ConvertError> {
        self.object_mode_requested = true;
        Ok(())
    }

    fn export_glb(
        &mut self,
        path: &Path,
        opts: &ExportOptions,
        renderer: &RendererConfig,
    ) -> Result<(), ConvertError> {
        let (input, format) = self
            .pending_import
            .take()
            .ok_or_else(|| ConvertError::Host("export requested before import".to_string()))?;

        let job = serde_json::json!({
            "op": "convert",
            "reset_scene": self.reset_requested,
            "ensure_object_mode": self.object_mode_requested,
            "input": input.to_string_lossy(),
            "format": format.as_str(),
            "output": path.to_string_lossy(),
            "renderer": {
                "enabled_devices": renderer.enabled_devices,
                "scene_device": renderer.scene_device.as_str(),
            },
            "export": {
                "apply_modifiers": opts.apply_modifiers,
                "selection_only": opts.selection_only,
                "draco_compression": opts.draco_compression,
            },
        });

        self.run_tool(&job)?;
        log_info!("Exported {}", path.display());
        Ok(())
    }
}

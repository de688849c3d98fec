// Recording mock of the render host for unit tests.

use std::path::{Path, PathBuf};

use super::formats::AssetFormat;
use super::host::{
    ConvertError, ExportOptions, RenderDevice, RenderHost, RendererConfig,
};

#[derive(Default)]
pub struct MockRenderHost {
    pub devices: Vec<RenderDevice>,
    pub device_failure: Option<String>,
    pub import_failure: Option<String>,
    pub export_failure: Option<String>,

    pub resets: u32,
    pub object_mode_calls: u32,
    pub imports: Vec<(PathBuf, AssetFormat)>,
    pub exports: Vec<(PathBuf, ExportOptions, RendererConfig)>,
}

impl MockRenderHost {
    pub fn with_devices(devices: Vec<RenderDevice>) -> Self {
        Self {
            devices,
            ..Self::default()
        }
    }

    pub fn with_device_failure(message: &str) -> Self {
        Self {
            device_failure: Some(message.to_string()),
            ..Self::default()
        }
    }
}

impl RenderHost for MockRenderHost {
    fn list_devices(&self) -> Result<Vec<RenderDevice>, ConvertError> {
        match &self.device_failure {
            Some(message) => Err(ConvertError::DeviceEnumeration(message.clone())),
            None => Ok(self.devices.clone()),
        }
    }

    fn reset_scene(&mut self) -> Result<(), ConvertError> {
        self.resets += 1;
        Ok(())
    }

    fn import(&mut self, path: &Path, format: AssetFormat) -> Result<(), ConvertError> {
        if let Some(message) = &self.import_failure {
            return Err(ConvertError::Import(message.clone()));
        }
        self.imports.push((path.to_path_buf(), format));
        Ok(())
    }

    fn ensure_object_mode(&mut self) -> Result<(), ConvertError> {
        self.object_mode_calls += 1;
        Ok(())
    }

    fn export_glb(
        &mut self,
        path: &Path,
        opts: &ExportOptions,
        renderer: &RendererConfig,
    ) -> Result<(), ConvertError> {
        if let Some(message) = &self.export_failure {
            return Err(ConvertError::Export(message.clone()));
        }
        self.exports
            .push((path.to_path_buf(), opts.clone(), renderer.clone()));
        Ok(())
    }
}

//! The conversion job: one input file in, one GLB out, process terminates.

use std::path::{Path, PathBuf};

use super::config::ConvertConfig;
use super::devices::{configure_renderer, DeviceSelection};
use super::formats::AssetFormat;
use super::host::{ConvertError, ExportOptions, RenderHost};
use crate::log_info;

/// At most one job exists per process lifetime.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: AssetFormat,
}

impl ConversionJob {
    /// Build the job, validating the input up front: a missing file or an
    /// unsupported extension is fatal before any host call is made.
    pub fn new(input: &Path, output: &Path) -> Result<Self, ConvertError> {
        if !input.exists() {
            return Err(ConvertError::MissingInput(input.to_path_buf()));
        }
        let format = AssetFormat::from_path(input)?;
        Ok(Self {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            format,
        })
    }

    pub fn from_config(config: &ConvertConfig) -> Result<Self, ConvertError> {
        Self::new(
            Path::new(&config.input_file),
            Path::new(&config.output_file),
        )
    }
}

/// Run the whole pipeline: device configuration (degraded fallback allowed),
/// scene reset, import, mode precondition, export. Import and export failures
/// are fatal; no retry or partial-output cleanup.
pub fn run(job: &ConversionJob, host: &mut dyn RenderHost) -> Result<DeviceSelection, ConvertError> {
    let (selection, renderer) = configure_renderer(&*host);

    host.reset_scene()?;

    log_info!("Importing {} as {}", job.input.display(), job.format.as_str());
    host.import(&job.input, job.format)?;

    // The exporter requires the default interaction mode
    host.ensure_object_mode()?;

    log_info!("Exporting {}", job.output.display());
    host.export_glb(&job.output, &ExportOptions::default(), &renderer)?;

    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::host::{DeviceKind, RenderDevice, SceneDevice};
    use crate::convert::host_mock::MockRenderHost;

    fn temp_asset(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("med_assist_{}_{}", std::process::id(), name));
        std::fs::write(&path, b"asset bytes").unwrap();
        path
    }

    fn accelerator_host() -> MockRenderHost {
        MockRenderHost::with_devices(vec![RenderDevice {
            id: "cuda0".to_string(),
            name: "GTX 1050".to_string(),
            kind: DeviceKind::Accelerator,
        }])
    }

    #[test]
    fn test_missing_input_is_fatal_before_host_calls() {
        let err = ConversionJob::new(Path::new("no_such_file.fbx"), Path::new("out.glb"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::MissingInput(_)));
    }

    #[test]
    fn test_unsupported_extension_is_fatal_with_no_import() {
        let input = temp_asset("model.dae");
        let err = ConversionJob::new(&input, Path::new("out.glb")).unwrap_err();
        std::fs::remove_file(&input).ok();
        assert!(matches!(err, ConvertError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_happy_path_runs_all_steps_in_order() {
        let input = temp_asset("house.fbx");
        let job = ConversionJob::new(&input, Path::new("out.glb")).unwrap();
        let mut host = accelerator_host();

        let selection = run(&job, &mut host).unwrap();
        std::fs::remove_file(&input).ok();

        assert!(matches!(selection, DeviceSelection::Configured { .. }));
        assert_eq!(host.resets, 1);
        assert_eq!(host.object_mode_calls, 1);
        assert_eq!(host.imports.len(), 1);
        assert_eq!(host.imports[0].1, AssetFormat::Fbx);
        assert_eq!(host.exports.len(), 1);
    }

    #[test]
    fn test_export_receives_fixed_options() {
        let input = temp_asset("scene.glb");
        let job = ConversionJob::new(&input, Path::new("out.glb")).unwrap();
        let mut host = accelerator_host();

        run(&job, &mut host).unwrap();
        std::fs::remove_file(&input).ok();

        let (_, opts, renderer) = &host.exports[0];
        assert!(opts.apply_modifiers);
        assert!(!opts.selection_only);
        assert!(!opts.draco_compression);
        assert_eq!(renderer.scene_device, SceneDevice::Accelerator);
    }

    #[test]
    fn test_degraded_device_config_still_converts() {
        let input = temp_asset("house.obj");
        let job = ConversionJob::new(&input, Path::new("out.glb")).unwrap();
        let mut host = MockRenderHost::with_device_failure("enumeration exploded");

        let selection = run(&job, &mut host).unwrap();
        std::fs::remove_file(&input).ok();

        assert!(matches!(selection, DeviceSelection::SoftwareFallback { .. }));
        assert_eq!(host.exports.len(), 1);
        assert_eq!(host.exports[0].2.scene_device, SceneDevice::Software);
    }

    #[test]
    fn test_import_failure_is_fatal() {
        let input = temp_asset("broken.fbx");
        let job = ConversionJob::new(&input, Path::new("out.glb")).unwrap();
        let mut host = accelerator_host();
        host.import_failure = Some("corrupt file".to_string());

        let err = run(&job, &mut host).unwrap_err();
        std::fs::remove_file(&input).ok();

        assert!(matches!(err, ConvertError::Import(_)));
        assert!(host.exports.is_empty());
    }

    #[test]
    fn test_export_failure_is_fatal() {
        let input = temp_asset("fine.fbx");
        let job = ConversionJob::new(&input, Path::new("out.glb")).unwrap();
        let mut host = accelerator_host();
        host.export_failure = Some("disk full".to_string());

        let err = run(&job, &mut host).unwrap_err();
        std::fs::remove_file(&input).ok();

        assert!(matches!(err, ConvertError::Export(_)));
    }
}

//! Input format dispatch: file extension → importer.

use std::path::Path;

use super::host::ConvertError;

/// Supported import formats. GLB and GLTF share one importer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetFormat {
    Fbx,
    Obj,
    /// Native scene file, opened rather than imported.
    Blend,
    Gltf,
}

impl AssetFormat {
    /// Detect the format from the file extension, case-insensitive.
    /// Unrecognized extensions are a fatal error; no import is attempted.
    pub fn from_path(path: &Path) -> Result<Self, ConvertError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "fbx" => Ok(AssetFormat::Fbx),
            "obj" => Ok(AssetFormat::Obj),
            "blend" => Ok(AssetFormat::Blend),
            "glb" | "gltf" => Ok(AssetFormat::Gltf),
            _ => Err(ConvertError::UnsupportedFormat(
                path.to_string_lossy().into_owned(),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetFormat::Fbx => "fbx",
            AssetFormat::Obj => "obj",
            AssetFormat::Blend => "blend",
            AssetFormat::Gltf => "gltf",
        }
    }
}

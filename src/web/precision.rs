//! Adaptive precision selection.
//!
//! Picks the model loading precision from the total memory of the first
//! accelerator, so the same deployment runs anywhere from a 2GB laptop GPU to
//! an 80GB datacenter card. The thresholds are a fixed lookup, first match
//! wins, lower bound inclusive.

use std::process::Command;

use crate::{log_info, log_warn};

/// Minimum total accelerator memory for full float16 loading.
pub const FLOAT16_MIN_GB: f64 = 14.0;
/// Minimum total accelerator memory for 8-bit quantized loading.
pub const INT8_MIN_GB: f64 = 8.0;

pub const MB_TO_GB: f64 = 1024.0;

/// Numeric precision the model is loaded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecisionMode {
    /// Full 16-bit float weights, best quality.
    Float16,
    /// 8-bit quantized weights.
    Int8,
    /// 4-bit NF4 quantized weights with float16 compute dtype.
    Nf4,
    /// Full precision on the CPU (no accelerator present).
    CpuFallback,
}

impl PrecisionMode {
    /// Wire name used in backend load requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrecisionMode::Float16 => "float16",
            PrecisionMode::Int8 => "int8",
            PrecisionMode::Nf4 => "nf4",
            PrecisionMode::CpuFallback => "float32",
        }
    }

    /// Compute dtype override carried by quantized modes (NF4 computes in f16).
    pub fn compute_dtype(&self) -> Option<&'static str> {
        match self {
            PrecisionMode::Nf4 => Some("float16"),
            _ => None,
        }
    }
}

/// Where the loaded weights are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevicePlacement {
    /// Let the backend spread the model across available accelerators.
    AutoAccelerator,
    /// Everything on the CPU.
    Cpu,
}

impl DevicePlacement {
    pub fn as_str(&self) -> &'static str {
        match self {
            DevicePlacement::AutoAccelerator => "auto",
            DevicePlacement::Cpu => "cpu",
        }
    }
}

/// Loading configuration derived once per process, immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadPolicy {
    pub mode: PrecisionMode,
    pub placement: DevicePlacement,
}

impl LoadPolicy {
    /// Human-readable description of the chosen branch.
    pub fn describe(&self) -> &'static str {
        match self.mode {
            PrecisionMode::Float16 => "full Float16 (best quality)",
            PrecisionMode::Int8 => "8-bit (good quality, reduced memory)",
            PrecisionMode::Nf4 => "4-bit NF4 (compressed, fits low VRAM)",
            PrecisionMode::CpuFallback => "CPU fallback (slow but works)",
        }
    }
}

/// Detect total memory of the first accelerator using nvidia-smi.
/// Returns GB, or None if no accelerator is present or detection fails.
pub fn detect_total_vram_gb() -> Option<f64> {
    let output = Command::new("nvidia-smi")
        .args(["--query-gpu=memory.total", "--format=csv,noheader,nounits"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let output_str = String::from_utf8(output.stdout).ok()?;
    // Multi-GPU machines report one line per device; device 0 drives the policy
    let first_line = output_str.lines().next()?;
    let vram_mb: f64 = first_line.trim().parse().ok()?;
    Some(vram_mb / MB_TO_GB)
}

/// Select the load policy for a given total accelerator memory reading.
///
/// `None` means no accelerator was detected. The table is ordered and the
/// thresholds are lower-bound inclusive:
///
/// - no accelerator → CPU fallback, full precision
/// - >= 14 GB       → float16, automatic accelerator placement
/// - 8..14 GB       → 8-bit, automatic accelerator placement
/// - < 8 GB         → 4-bit NF4 (f16 compute), automatic accelerator placement
pub fn select_load_policy(total_vram_gb: Option<f64>) -> LoadPolicy {
    let policy = match total_vram_gb {
        None => LoadPolicy {
            mode: PrecisionMode::CpuFallback,
            placement: DevicePlacement::Cpu,
        },
        Some(gb) if gb >= FLOAT16_MIN_GB => LoadPolicy {
            mode: PrecisionMode::Float16,
            placement: DevicePlacement::AutoAccelerator,
        },
        Some(gb) if gb >= INT8_MIN_GB => LoadPolicy {
            mode: PrecisionMode::Int8,
            placement: DevicePlacement::AutoAccelerator,
        },
        Some(_) => LoadPolicy {
            mode: PrecisionMode::Nf4,
            placement: DevicePlacement::AutoAccelerator,
        },
    };

    match total_vram_gb {
        None => {
            log_warn!("No accelerator detected, falling back to CPU (inference will be slow)");
        }
        Some(gb) => {
            log_info!("Detected accelerator with {:.1} GB total memory", gb);
        }
    }
    log_info!("Loading in {}", policy.describe());

    policy
}

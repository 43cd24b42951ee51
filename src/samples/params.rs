//! Stain-normalization parameter sets written next to the color samples.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacenkoParams {
    pub luminosity_threshold: f64,
    pub alpha: f64,
    pub beta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReinhardParams {
    pub target_mu: [f64; 3],
    pub target_sigma: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VahadaneParams {
    pub lambda1: f64,
    pub lambda2: f64,
    pub fast_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParams {
    pub macenko: MacenkoParams,
    pub reinhard: ReinhardParams,
    pub vahadane: VahadaneParams,
}

pub const NORMALIZATION_PARAMS: NormalizationParams = NormalizationParams {
    macenko: MacenkoParams {
        luminosity_threshold: 0.8,
        alpha: 1.0,
        beta: 0.15,
    },
    reinhard: ReinhardParams {
        target_mu: [8.74108109, -0.12440419, 0.0444982],
        target_sigma: [0.6135447, 0.10989545, 0.0286032],
    },
    vahadane: VahadaneParams {
        lambda1: 0.01,
        lambda2: 0.01,
        fast_mode: true,
    },
};

pub const PARAMS_FILE: &str = "normalization_params.json";

/// Write `params` as two-space-indented JSON.
pub fn write_params(path: &Path, params: &NormalizationParams) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(params)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn read_params(path: &Path) -> anyhow::Result<NormalizationParams> {
    let data = std::fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}

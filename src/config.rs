use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{ReticleError, ReticleResult};
use crate::scan::types::BarcodeFormat;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReticleConfig {
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Formats the analyzer lets through. Detections outside the allowlist
    /// are dropped before mapping.
    #[serde(default = "default_formats")]
    pub formats: Vec<BarcodeFormat>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            formats: default_formats(),
        }
    }
}

fn default_formats() -> Vec<BarcodeFormat> {
    vec![BarcodeFormat::QrCode]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Consecutive source/detector failures tolerated before the scan loop
    /// gives up.
    #[serde(default = "default_max_failures")]
    pub max_consecutive_failures: u32,
    /// Buffer size for channel-backed overlay sinks.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Write non-empty scan results to a JSONL session log.
    #[serde(default)]
    pub record_sessions: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_consecutive_failures: default_max_failures(),
            channel_capacity: default_channel_capacity(),
            record_sessions: false,
        }
    }
}

fn default_max_failures() -> u32 {
    5
}

fn default_channel_capacity() -> usize {
    32
}

fn resolve_config_path() -> ReticleResult<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join("reticle.toml");
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Ok(candidate);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    let candidate = cwd.join("reticle.toml");
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in working directory");
        return Ok(candidate);
    }

    Err(ReticleError::Config(
        "reticle.toml not found next to executable or in working directory".into(),
    ))
}

pub fn load_config() -> ReticleResult<ReticleConfig> {
    let path = resolve_config_path()?;
    let content = std::fs::read_to_string(&path)?;
    let config: ReticleConfig = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), formats = config.scanner.formats.len(), "config loaded");
    Ok(config)
}

pub fn save_config(config: &ReticleConfig) -> ReticleResult<()> {
    let path = resolve_config_path()?;
    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content)?;
    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: ReticleConfig = toml::from_str("").unwrap();
        assert_eq!(config.scanner.formats, vec![BarcodeFormat::QrCode]);
        assert_eq!(config.pipeline.max_consecutive_failures, 5);
        assert_eq!(config.pipeline.channel_capacity, 32);
        assert!(!config.pipeline.record_sessions);
    }

    #[test]
    fn formats_parse_snake_case() {
        let config: ReticleConfig = toml::from_str(
            r#"
            [scanner]
            formats = ["qr_code", "ean_13", "data_matrix"]

            [pipeline]
            max_consecutive_failures = 2
            "#,
        )
        .unwrap();
        assert_eq!(
            config.scanner.formats,
            vec![
                BarcodeFormat::QrCode,
                BarcodeFormat::Ean13,
                BarcodeFormat::DataMatrix
            ]
        );
        assert_eq!(config.pipeline.max_consecutive_failures, 2);
        assert_eq!(config.pipeline.channel_capacity, 32);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut config = ReticleConfig::default();
        config.scanner.formats.push(BarcodeFormat::Pdf417);
        config.pipeline.record_sessions = true;

        let text = toml::to_string_pretty(&config).unwrap();
        let back: ReticleConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.scanner.formats, config.scanner.formats);
        assert!(back.pipeline.record_sessions);
    }
}

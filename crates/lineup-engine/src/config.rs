// Engine configuration loading and validation (engine.toml).

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::lineup::position::Position;
use crate::lineup::requirements::SlotRequirements;
use crate::projections::ScoringFormat;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Public config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Format used when the caller does not name one.
    pub scoring_format: ScoringFormat,
    pub waiver: WaiverConfig,
    /// Last-resort lineup shape when neither league settings nor current
    /// starters describe one.
    pub default_lineup: SlotRequirements,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scoring_format: ScoringFormat::Ppr,
            waiver: WaiverConfig::default(),
            default_lineup: SlotRequirements::default_nfl(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaiverConfig {
    /// A pickup must beat the dropped player by strictly more than this.
    pub threshold: f64,
    pub candidates_per_position: usize,
    pub positions: Vec<Position>,
}

impl Default for WaiverConfig {
    fn default() -> Self {
        Self {
            threshold: 3.0,
            candidates_per_position: 5,
            positions: vec![
                Position::Quarterback,
                Position::RunningBack,
                Position::WideReceiver,
                Position::TightEnd,
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// engine.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
struct EngineFile {
    #[serde(default)]
    engine: EngineSection,
    #[serde(default)]
    waiver: WaiverConfig,
    #[serde(default)]
    default_lineup: Option<HashMap<String, usize>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EngineSection {
    #[serde(default)]
    scoring_format: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate an engine config file.
pub fn load_config_from(path: &Path) -> Result<EngineConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    parse_config(&text, path)
}

/// Parse and validate config text. `path` is only used in error messages.
pub fn parse_config(text: &str, path: &Path) -> Result<EngineConfig, ConfigError> {
    let file: EngineFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let scoring_format = file
        .engine
        .scoring_format
        .as_deref()
        .map(ScoringFormat::from_str_lossy)
        .unwrap_or_default();

    let default_lineup = match &file.default_lineup {
        Some(labels) => SlotRequirements::from_label_counts(labels),
        None => SlotRequirements::default_nfl(),
    };

    let config = EngineConfig {
        scoring_format,
        waiver: file.waiver,
        default_lineup,
    };

    validate(&config)?;

    Ok(config)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &EngineConfig) -> Result<(), ConfigError> {
    let threshold = config.waiver.threshold;
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(ConfigError::ValidationError {
            field: "waiver.threshold".into(),
            message: format!("must be a finite value >= 0, got {threshold}"),
        });
    }

    if config.waiver.candidates_per_position == 0 {
        return Err(ConfigError::ValidationError {
            field: "waiver.candidates_per_position".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.default_lineup.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "default_lineup".into(),
            message: "must contain at least one starting slot".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

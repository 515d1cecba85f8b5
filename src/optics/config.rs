use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// How the engine decides whether a lens hit enters or leaves the glass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediumTracking {
    /// Angle between the reported normal and the ray: above 90 degrees means exiting.
    #[default]
    Geometric,
    /// Each branch keeps a stack of the lenses it is inside.
    Explicit,
}

/// Arrow-head markers attached to segments for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowConfig {
    pub enabled: bool,
    /// Arrow length, the marker is centred on its anchor point
    pub length: f64,
    /// Distance from the origin of an escaping segment to its arrow
    pub escape_distance: f64,
}

impl Default for ArrowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            length: 0.2,
            escape_distance: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Branches deeper than this terminate
    pub max_depth: usize,
    /// Length of the segment drawn for a ray that hits nothing
    pub escape_length: f64,
    /// Offset of every continuation origin along its new direction
    pub epsilon: f64,
    pub medium_tracking: MediumTracking,
    pub arrows: ArrowConfig,
}

impl TraceConfig {
    pub fn new() -> Self {
        Self {
            max_depth: 100,
            escape_length: 1000.0,
            epsilon: 1e-3,
            medium_tracking: MediumTracking::Geometric,
            arrows: ArrowConfig::default(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.escape_length.is_finite() && self.escape_length > 0.,
            "escape_length must be positive, got {}",
            self.escape_length
        );
        ensure!(
            self.epsilon.is_finite() && self.epsilon > 0.,
            "epsilon must be positive, got {}",
            self.epsilon
        );
        ensure!(
            self.epsilon < self.escape_length,
            "epsilon ({}) must be smaller than escape_length ({})",
            self.epsilon,
            self.escape_length
        );
        ensure!(
            self.arrows.length.is_finite() && self.arrows.length >= 0.,
            "arrow length must be non-negative, got {}",
            self.arrows.length
        );
        ensure!(
            self.arrows.escape_distance.is_finite() && self.arrows.escape_distance >= 0.,
            "arrow escape_distance must be non-negative, got {}",
            self.arrows.escape_distance
        );
        Ok(())
    }

    /// Parses and validates a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).context("Failed to deserialize trace config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize trace config")
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads and validates a trace configuration from a JSON file.
pub fn read_config(path: &Path) -> Result<TraceConfig> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let config: TraceConfig = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to deserialize trace config from: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid trace config in: {}", path.display()))?;

    Ok(config)
}

//! Configuration types and management for seqsketch-rs.
//!
//! A single YAML document carries every section. Each section falls back to
//! its defaults when omitted, so a partial file is always valid input.

pub mod validation;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::errors::{Result, SketchError};
pub use crate::sketch::config::{
    AmbiguousBasePolicy, ComparisonConfig, ComputeConfig, KmerPolicy,
};

pub use validation::{validate_positive_u64, validate_positive_usize, validate_unit_range};

/// File names probed in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAMES: [&str; 2] = [".seqsketch.yml", ".seqsketch.yaml"];

/// Environment variable naming the external plot renderer.
pub const PLOT_RENDERER_ENV: &str = "SEQSKETCH_PLOT_RENDERER";

/// Main configuration for the sketching engine and CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SketchConfig {
    /// Signature computation settings
    #[serde(default)]
    pub compute: ComputeConfig,

    /// K-mer size limits and ambiguous-base handling
    #[serde(default)]
    pub tokenizer: KmerPolicy,

    /// Comparison and search settings
    #[serde(default)]
    pub comparison: ComparisonConfig,

    /// Performance and resource limits
    #[serde(default)]
    pub performance: PerformanceConfig,

    /// Plot rendering settings
    #[serde(default)]
    pub plot: PlotConfig,
}

impl SketchConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            SketchError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        serde_yaml::from_str(&content).map_err(Into::into)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content).map_err(|e| {
            SketchError::io(format!("Failed to write config file: {}", path.display()), e)
        })
    }

    /// Locate a configuration file.
    ///
    /// An explicit path wins. Otherwise `.seqsketch.yml` / `.seqsketch.yaml`
    /// in `dir` are probed, then `seqsketch/config.yml` under the user
    /// configuration directory.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        let local = CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file());
        if local.is_some() {
            return local;
        }

        dirs::config_dir()
            .map(|base| base.join("seqsketch").join("config.yml"))
            .filter(|candidate| candidate.is_file())
    }

    /// Load the discovered configuration, or defaults when none exists
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        match Self::discover(explicit, dir) {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                Self::from_yaml_file(path)
            }
            None => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        self.tokenizer.validate()?;
        self.compute.validate(&self.tokenizer)?;
        self.comparison.validate()?;
        self.performance.validate()?;
        self.plot.validate()?;
        Ok(())
    }
}

/// Performance and resource configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PerformanceConfig {
    /// Maximum number of parallel threads
    #[serde(default)]
    pub max_threads: Option<usize>,

    /// Wall-clock limit for processing a single input file (seconds)
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl PerformanceConfig {
    /// Validate performance configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(threads) = self.max_threads {
            validate_positive_usize(threads, "performance.max_threads")?;
        }
        if let Some(timeout) = self.timeout_seconds {
            validate_positive_u64(timeout, "performance.timeout_seconds")?;
        }
        Ok(())
    }

    /// Per-file deadline as a duration
    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.timeout_seconds.map(std::time::Duration::from_secs)
    }
}

/// Image format produced by the plot renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlotFormat {
    /// PNG image
    #[default]
    Png,
    /// PDF document
    Pdf,
}

impl PlotFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }
}

/// Plot rendering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlotConfig {
    /// External program invoked to draw the dendrogram and heatmap
    #[serde(default)]
    pub renderer: Option<PathBuf>,

    /// Default output format
    #[serde(default)]
    pub format: PlotFormat,
}

impl PlotConfig {
    /// Validate plot configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(renderer) = &self.renderer {
            if renderer.as_os_str().is_empty() {
                return Err(SketchError::config_field(
                    "renderer must not be empty",
                    "plot.renderer",
                ));
            }
        }
        Ok(())
    }

    /// Renderer from the configuration, falling back to the environment
    pub fn resolve_renderer(&self) -> Option<PathBuf> {
        self.renderer.clone().or_else(|| {
            std::env::var_os(PLOT_RENDERER_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        })
    }
}

#[cfg(test)]
mod tests;

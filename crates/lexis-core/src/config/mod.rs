//! Configuration system for lexis.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use strum::{Display, EnumString};

use crate::error::{LexisError, LexisResult};

/// Tunable constants of the continuous half-life model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryModelParams {
    /// Regression intercept.
    pub intercept: f64,
    /// Difficulty coefficient.
    pub k_difficulty: f64,
    /// Success-count coefficient.
    pub k_success: f64,
    /// Failure-count coefficient.
    pub k_failure: f64,
    /// Exponent applied to the previous half-life.
    pub k_half_life: f64,
    /// Lower clamp for half-life and interval, in hours.
    pub min_half_life_hours: f64,
    /// Upper clamp for half-life and interval, in hours.
    pub max_half_life_hours: f64,
    /// Recall probability the optimal interval aims for.
    pub target_recall: f64,
    /// Difficulty used when neither the sense nor the item has one.
    pub default_difficulty: f64,
    /// Multiplier applied to the new half-life after a fuzzy judgment.
    pub fuzzy_penalty: f64,
    /// Fraction of the optimal interval used after a failed recall.
    pub failure_interval_factor: f64,
}

impl Default for MemoryModelParams {
    fn default() -> Self {
        Self {
            intercept: -0.5,
            k_difficulty: 1.2,
            k_success: 0.2,
            k_failure: 0.1,
            k_half_life: 0.5,
            min_half_life_hours: 4.0,
            max_half_life_hours: 720.0,
            target_recall: 0.9,
            default_difficulty: 0.5,
            fuzzy_penalty: 0.8,
            failure_interval_factor: 0.25,
        }
    }
}

/// Interval table of the legacy stage scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageParams {
    /// Interval for stage 0, in hours.
    pub initial_interval_hours: f64,
    /// Interval for stage 1, in hours.
    pub base_interval_hours: f64,
    /// Growth per stage above 1.
    pub growth_factor: f64,
    /// Longest interval any stage may reach, in hours.
    pub max_interval_hours: f64,
}

impl Default for StageParams {
    fn default() -> Self {
        Self {
            initial_interval_hours: 4.0,
            base_interval_hours: 24.0,
            growth_factor: 2.5,
            // 100 years
            max_interval_hours: 876_000.0,
        }
    }
}

/// How plan-scoped selection orders candidates.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum PlanOrdering {
    /// Earliest `next_review_at` first, never-reviewed last, then shuffled.
    #[default]
    DueAware,
    /// Lowest sense id first.
    Sequential,
}

/// Selection settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub plan_ordering: PlanOrdering,
}

/// Main lexis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexisConfig {
    /// Path to the SQLite database.
    pub database_path: PathBuf,
    pub memory_model: MemoryModelParams,
    pub stage: StageParams,
    pub selection: SelectionConfig,
}

impl Default for LexisConfig {
    fn default() -> Self {
        let lexis_dir = dirs::home_dir()
            .map(|h| h.join(".lexis"))
            .unwrap_or_else(|| PathBuf::from(".lexis"));

        Self {
            database_path: lexis_dir.join("lexis.db"),
            memory_model: MemoryModelParams::default(),
            stage: StageParams::default(),
            selection: SelectionConfig::default(),
        }
    }
}

impl LexisConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> LexisResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        let config: Self = match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| LexisError::Configuration(e.to_string()))?
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| LexisError::Configuration(e.to_string()))?,
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| LexisError::Configuration(e.to_string()))?,
            _ => {
                return Err(LexisError::Configuration(
                    "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    ///
    /// Unparseable values are ignored and the default kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("LEXIS_DB_PATH") {
            config.database_path = PathBuf::from(path);
        }
        if let Ok(order) = std::env::var("LEXIS_PLAN_ORDER") {
            match order.parse() {
                Ok(ordering) => config.selection.plan_ordering = ordering,
                Err(_) => tracing::warn!(value = %order, "Ignoring unknown LEXIS_PLAN_ORDER"),
            }
        }
        if let Ok(target) = std::env::var("LEXIS_TARGET_RECALL") {
            match target.parse::<f64>() {
                Ok(t) if t > 0.0 && t < 1.0 => config.memory_model.target_recall = t,
                _ => tracing::warn!(value = %target, "Ignoring invalid LEXIS_TARGET_RECALL"),
            }
        }

        config
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> LexisConfigBuilder {
        LexisConfigBuilder::default()
    }

    /// Check that the numeric parameters describe a usable model.
    pub fn validate(&self) -> LexisResult<()> {
        let m = &self.memory_model;
        if m.min_half_life_hours <= 0.0 || m.min_half_life_hours > m.max_half_life_hours {
            return Err(LexisError::Configuration(format!(
                "Half-life bounds must satisfy 0 < min <= max (got {} and {})",
                m.min_half_life_hours, m.max_half_life_hours
            )));
        }
        if !(m.target_recall > 0.0 && m.target_recall < 1.0) {
            return Err(LexisError::Configuration(format!(
                "target_recall must be in (0, 1), got {}",
                m.target_recall
            )));
        }
        if self.stage.initial_interval_hours <= 0.0 || self.stage.base_interval_hours <= 0.0 {
            return Err(LexisError::Configuration(
                "Stage intervals must be positive".to_string(),
            ));
        }
        if self.stage.max_interval_hours < self.stage.initial_interval_hours
            || self.stage.max_interval_hours < self.stage.base_interval_hours
        {
            return Err(LexisError::Configuration(format!(
                "Stage max interval must cover the initial and base intervals, got {}",
                self.stage.max_interval_hours
            )));
        }
        if self.stage.growth_factor < 1.0 {
            return Err(LexisError::Configuration(format!(
                "Stage growth factor must be at least 1, got {}",
                self.stage.growth_factor
            )));
        }
        Ok(())
    }
}

/// Builder for LexisConfig.
#[derive(Default)]
pub struct LexisConfigBuilder {
    config: LexisConfig,
}

impl LexisConfigBuilder {
    /// Set the database path.
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.database_path = path.into();
        self
    }

    /// Set the memory model parameters.
    pub fn memory_model(mut self, params: MemoryModelParams) -> Self {
        self.config.memory_model = params;
        self
    }

    /// Set the stage scheduler parameters.
    pub fn stage(mut self, params: StageParams) -> Self {
        self.config.stage = params;
        self
    }

    /// Set plan ordering.
    pub fn plan_ordering(mut self, ordering: PlanOrdering) -> Self {
        self.config.selection.plan_ordering = ordering;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> LexisConfig {
        self.config
    }
}

//! Process-wide choice of scheduling algorithm.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::{LexisError, LexisResult};
use crate::store::SettingsStore;

/// Settings key holding the active algorithm name.
pub const ALGORITHM_SETTING_KEY: &str = "srs_algorithm";

/// Scheduling algorithm applied by the progress updater.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Continuous half-life model with cost-optimal intervals.
    #[default]
    Sspmmc,
    /// Discrete stage ladder.
    Legacy,
}

impl Algorithm {
    /// Parse an algorithm name.
    pub fn parse(name: &str) -> LexisResult<Self> {
        name.trim()
            .parse()
            .map_err(|_| LexisError::invalid_algorithm(name))
    }

    /// Human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            Algorithm::Sspmmc => {
                "Half-life regression over difficulty and recall history; each review \
                 is scheduled at the interval where predicted recall falls to the target \
                 probability, shortened after a failed recall."
            }
            Algorithm::Legacy => {
                "Stage-based spaced repetition: each successful recall climbs one stage \
                 and the interval grows geometrically from one day; forgetting resets to \
                 a four-hour interval."
            }
        }
    }
}

/// Active algorithm with its description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmInfo {
    pub algorithm: Algorithm,
    pub info: String,
}

/// Reads and writes the algorithm setting.
#[derive(Clone)]
pub struct AlgorithmSettings {
    store: Arc<dyn SettingsStore>,
}

impl AlgorithmSettings {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Active algorithm. Falls back to [`Algorithm::Sspmmc`] when unset or unreadable.
    pub fn current(&self) -> Algorithm {
        match self.store.get_setting(ALGORITHM_SETTING_KEY) {
            Ok(Some(name)) => match name.parse() {
                Ok(algorithm) => algorithm,
                Err(_) => {
                    tracing::warn!(value = %name, "Unrecognized stored algorithm, using default");
                    Algorithm::default()
                }
            },
            Ok(None) => Algorithm::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read algorithm setting, using default");
                Algorithm::default()
            }
        }
    }

    /// Persist a new active algorithm.
    pub fn set(&self, algorithm: Algorithm) -> LexisResult<()> {
        let name: &'static str = algorithm.into();
        self.store.set_setting(ALGORITHM_SETTING_KEY, name)?;
        tracing::info!(algorithm = %algorithm, "Scheduling algorithm changed");
        Ok(())
    }

    /// Active algorithm and its description.
    pub fn info(&self) -> AlgorithmInfo {
        let algorithm = self.current();
        AlgorithmInfo {
            algorithm,
            info: algorithm.description().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockSettingsStore;
    use mockall::predicate::eq;

    #[test]
    fn test_parse_names() {
        assert_eq!(Algorithm::parse("sspmmc").unwrap(), Algorithm::Sspmmc);
        assert_eq!(Algorithm::parse("Legacy").unwrap(), Algorithm::Legacy);
        assert!(Algorithm::parse("fsrs").is_err());
        assert_eq!(Algorithm::Legacy.to_string(), "legacy");
    }

    #[test]
    fn test_current_reads_store() {
        let mut store = MockSettingsStore::new();
        store
            .expect_get_setting()
            .with(eq(ALGORITHM_SETTING_KEY))
            .returning(|_| Ok(Some("legacy".to_string())));
        let settings = AlgorithmSettings::new(Arc::new(store));
        assert_eq!(settings.current(), Algorithm::Legacy);
    }

    #[test]
    fn test_current_defaults_when_unset() {
        let mut store = MockSettingsStore::new();
        store.expect_get_setting().returning(|_| Ok(None));
        let settings = AlgorithmSettings::new(Arc::new(store));
        assert_eq!(settings.current(), Algorithm::Sspmmc);
    }

    #[test]
    fn test_current_falls_back_on_read_error() {
        let mut store = MockSettingsStore::new();
        store
            .expect_get_setting()
            .returning(|_| Err(LexisError::connection("database is locked")));
        let settings = AlgorithmSettings::new(Arc::new(store));
        assert_eq!(settings.current(), Algorithm::Sspmmc);
    }

    #[test]
    fn test_current_falls_back_on_garbage() {
        let mut store = MockSettingsStore::new();
        store
            .expect_get_setting()
            .returning(|_| Ok(Some("sm2".to_string())));
        let settings = AlgorithmSettings::new(Arc::new(store));
        assert_eq!(settings.current(), Algorithm::Sspmmc);
    }

    #[test]
    fn test_set_writes_lowercase_name() {
        let mut store = MockSettingsStore::new();
        store
            .expect_set_setting()
            .with(eq(ALGORITHM_SETTING_KEY), eq("legacy"))
            .times(1)
            .returning(|_, _| Ok(()));
        let settings = AlgorithmSettings::new(Arc::new(store));
        settings.set(Algorithm::Legacy).unwrap();
    }

    #[test]
    fn test_set_propagates_store_failure() {
        let mut store = MockSettingsStore::new();
        store
            .expect_set_setting()
            .returning(|_, _| Err(LexisError::database("disk full")));
        let settings = AlgorithmSettings::new(Arc::new(store));
        assert!(settings.set(Algorithm::Sspmmc).unwrap_err().is_storage());
    }
}

//! Discrete stage ladder with a fixed interval table.

use crate::config::StageParams;
use crate::types::Judgment;

/// Legacy stage-based scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct StageScheduler {
    params: StageParams,
}

impl Default for StageScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl StageScheduler {
    pub fn new() -> Self {
        Self::with_params(StageParams::default())
    }

    pub fn with_params(params: StageParams) -> Self {
        Self { params }
    }

    /// Next stage: known climbs one, fuzzy drops one (floor 0), unknown resets.
    pub fn transition(&self, stage: u32, judgment: Judgment) -> u32 {
        match judgment {
            Judgment::Known => stage.saturating_add(1),
            Judgment::Fuzzy => stage.saturating_sub(1),
            Judgment::Unknown => 0,
        }
    }

    /// Interval in hours for a stage. Stages at or below zero use the initial interval.
    /// Capped at `max_interval_hours`.
    pub fn interval_hours(&self, stage: i64) -> f64 {
        let hours = if stage <= 0 {
            self.params.initial_interval_hours
        } else {
            let exponent = i32::try_from(stage - 1).unwrap_or(i32::MAX);
            self.params.base_interval_hours * self.params.growth_factor.powi(exponent)
        };
        hours.min(self.params.max_interval_hours)
    }
}

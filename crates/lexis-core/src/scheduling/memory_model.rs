//! Continuous half-life memory model.
//!
//! Half-life follows a DHP-style regression over difficulty, lifetime
//! success/failure counts and the previous half-life. Intervals are chosen
//! so that recall probability decays to the target at review time.

use crate::config::MemoryModelParams;

/// Half-life model with tunable coefficients. All methods are pure.
#[derive(Debug, Clone, PartialEq)]
pub struct HalfLifeModel {
    params: MemoryModelParams,
}

impl Default for HalfLifeModel {
    fn default() -> Self {
        Self::new()
    }
}

impl HalfLifeModel {
    /// Create a model with default coefficients.
    pub fn new() -> Self {
        Self::with_params(MemoryModelParams::default())
    }

    /// Create a model with custom coefficients.
    pub fn with_params(params: MemoryModelParams) -> Self {
        Self { params }
    }

    /// Get the model coefficients.
    pub fn params(&self) -> &MemoryModelParams {
        &self.params
    }

    /// New half-life in hours.
    ///
    /// # Arguments
    /// * `difficulty` - Intrinsic difficulty in [0, 1]; non-positive disables the term
    /// * `successes` - Lifetime successful recalls
    /// * `failures` - Lifetime failed recalls
    /// * `previous` - Previous half-life in hours; non-positive disables the term
    pub fn half_life(&self, difficulty: f64, successes: u32, failures: u32, previous: f64) -> f64 {
        let p = &self.params;
        if successes == 0 && failures == 0 {
            return p.min_half_life_hours;
        }

        let difficulty_factor = if difficulty > 0.0 {
            (p.k_difficulty * difficulty).exp()
        } else {
            1.0
        };
        let history_factor =
            (p.k_success * f64::from(successes) - p.k_failure * f64::from(failures)).exp();
        let previous_factor = if previous > 0.0 {
            (p.k_half_life * previous.ln()).exp()
        } else {
            1.0
        };

        let h = p.intercept.exp() * difficulty_factor * history_factor * previous_factor;
        self.clamp(h)
    }

    /// Probability of recall after `elapsed_hours` given `half_life` hours.
    pub fn recall_probability(&self, elapsed_hours: f64, half_life: f64) -> f64 {
        if half_life <= 0.0 {
            return 0.0;
        }
        2f64.powf(-elapsed_hours / half_life)
    }

    /// Interval in hours at which recall probability reaches the target.
    pub fn optimal_interval(&self, half_life: f64) -> f64 {
        self.clamp(-half_life * self.params.target_recall.log2())
    }

    fn clamp(&self, hours: f64) -> f64 {
        hours.clamp(
            self.params.min_half_life_hours,
            self.params.max_half_life_hours,
        )
    }
}

//! Daily plans and learner-level counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A curated list of senses a learner intends to review on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPlan {
    pub id: Uuid,
    pub learner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub sense_ids: Vec<i64>,
}

/// How far a learner is through today's plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanProgress {
    pub total: u32,
    pub completed: u32,
}

impl PlanProgress {
    /// A non-empty plan whose every item was reviewed today.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

/// Learner-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerStats {
    /// Senses with a progress row.
    pub learned_senses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_plan_is_never_complete() {
        assert!(!PlanProgress::default().is_complete());
    }

    #[test]
    fn test_plan_completion() {
        let partial = PlanProgress {
            total: 3,
            completed: 2,
        };
        assert!(!partial.is_complete());
        let done = PlanProgress {
            total: 3,
            completed: 3,
        };
        assert!(done.is_complete());
    }
}

//! Per-learner memory state for a sense.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Half-life assigned to a sense that has never been reviewed, in hours.
pub const DEFAULT_HALF_LIFE_HOURS: f64 = 4.0;

/// One entry of the append-only review history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewHistoryEntry {
    pub reviewed_at: DateTime<Utc>,
    /// Stage held when the review happened.
    pub stage: u32,
}

/// One entry of the append-only recall history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecallHistoryEntry {
    pub reviewed_at: DateTime<Utc>,
    pub success: bool,
}

/// Memory state of one (learner, sense) pair.
///
/// A missing row means the sense was never reviewed and is immediately
/// eligible. `next_review_at` is the only gate for re-selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub learner_id: Uuid,
    pub sense_id: i64,
    /// Discrete stage used by the legacy scheduler.
    pub stage: u32,
    /// Estimated memory half-life in hours.
    pub memory_half_life: f64,
    pub review_count: u32,
    pub last_recall_success: bool,
    /// Interval last computed by the continuous model, in hours.
    pub optimal_interval: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub review_history: Vec<ReviewHistoryEntry>,
    #[serde(default)]
    pub recall_history: Vec<RecallHistoryEntry>,
}

impl Progress {
    /// Fresh state for a sense the learner has not reviewed yet.
    pub fn new(learner_id: Uuid, sense_id: i64) -> Self {
        Self {
            learner_id,
            sense_id,
            stage: 0,
            memory_half_life: DEFAULT_HALF_LIFE_HOURS,
            review_count: 0,
            last_recall_success: false,
            optimal_interval: 0.0,
            last_reviewed_at: None,
            next_review_at: None,
            review_history: Vec::new(),
            recall_history: Vec::new(),
        }
    }

    /// Lifetime (successes, failures) from the recall history.
    pub fn recall_counts(&self) -> (u32, u32) {
        self.recall_history
            .iter()
            .fold((0, 0), |(s, f), entry| {
                if entry.success {
                    (s + 1, f)
                } else {
                    (s, f + 1)
                }
            })
    }

    /// Whether the sense may be selected at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at.map_or(true, |next| next <= now)
    }

    /// Whether the sense was reviewed at or after `since`.
    pub fn reviewed_since(&self, since: DateTime<Utc>) -> bool {
        self.last_reviewed_at.is_some_and(|at| at >= since)
    }
}

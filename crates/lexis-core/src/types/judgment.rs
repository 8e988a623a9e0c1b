//! The learner's self-assessment after viewing a card.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::{LexisError, LexisResult};

/// Ternary recall judgment supplied by the learner.
#[derive(
    Debug,
    Clone,
    Copy,
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
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Judgment {
    /// Recalled without trouble.
    Known,
    /// Partially recalled.
    Fuzzy,
    /// Not recalled.
    Unknown,
}

impl Judgment {
    /// Parse a judgment label, rejecting anything outside the three known labels.
    pub fn parse(label: &str) -> LexisResult<Self> {
        label
            .trim()
            .parse()
            .map_err(|_| LexisError::invalid_judgment(label))
    }

    /// Only `Known` counts as a successful recall.
    pub fn is_success(self) -> bool {
        self == Judgment::Known
    }
}

//! Selection outcomes handed to callers.

use serde::{Deserialize, Serialize};

use super::lexicon::SenseBrief;

/// Where a selected sense came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SelectionOrigin {
    /// Today's daily plan.
    Plan,
    /// The global due pool.
    Pool,
}

/// A card ready to show to the learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewUnit {
    /// The sense that triggered selection.
    pub sense_id: i64,
    pub item_id: i64,
    pub lemma: String,
    /// Form of the lemma as it appears in the example sentence.
    pub word_form: String,
    pub example_sentence: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_translation: Option<String>,
    /// Every sense of the lexical item, triggering sense included.
    pub senses: Vec<SenseBrief>,
    pub origin: SelectionOrigin,
}

/// Result of asking for the next card.
///
/// `Exhausted` and `NoneDue` are normal terminal outcomes, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Review(ReviewUnit),
    /// Today's plan has no unreviewed items left.
    Exhausted,
    /// Nothing in the pool is due.
    NoneDue,
}

impl Selection {
    /// The selected unit, if any.
    pub fn unit(&self) -> Option<&ReviewUnit> {
        match self {
            Selection::Review(unit) => Some(unit),
            _ => None,
        }
    }

    pub fn into_unit(self) -> Option<ReviewUnit> {
        match self {
            Selection::Review(unit) => Some(unit),
            _ => None,
        }
    }

    /// Status label for terminal outcomes.
    pub fn status(&self) -> &'static str {
        match self {
            Selection::Review(_) => "review",
            Selection::Exhausted => "exhausted",
            Selection::NoneDue => "none_due",
        }
    }

    /// Learner-facing message for terminal outcomes.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Selection::Review(_) => None,
            Selection::Exhausted => Some("Today's plan is complete"),
            Selection::NoneDue => Some("No words are due for review"),
        }
    }
}

//! Catalog types: lexical items and their senses.

use serde::{Deserialize, Serialize};

/// A word in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexicalItem {
    /// Catalog identifier.
    pub id: i64,
    /// Dictionary form.
    pub lemma: String,
    /// Origin tag (e.g. a textbook or exam list).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Intrinsic difficulty in [0, 1]; `None` means unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<f64>,
}

/// One meaning of a lexical item. The schedulable unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sense {
    /// Catalog identifier.
    pub id: i64,
    /// Owning lexical item.
    pub item_id: i64,
    /// Part-of-speech label (may be empty in the catalog).
    pub part_of_speech: String,
    /// Definition text.
    pub definition: String,
    /// Example sentence containing some form of the lemma.
    pub example_sentence: String,
    /// Translation of the example sentence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_translation: Option<String>,
    /// Unit label inside the source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Sense-level difficulty, overriding the item's.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<f64>,
}

/// Difficulty values stored for a sense and its lexical item.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Difficulty {
    pub sense: Option<f64>,
    pub item: Option<f64>,
}

impl Difficulty {
    /// Effective difficulty: the sense value, then the item value, then `default`.
    /// A stored zero counts as unset.
    pub fn resolve(&self, default: f64) -> f64 {
        [self.sense, self.item]
            .into_iter()
            .flatten()
            .find(|d| *d > 0.0)
            .unwrap_or(default)
    }
}

/// A sense picked by a selection query, joined with its lemma.
#[derive(Debug, Clone, PartialEq)]
pub struct SenseCandidate {
    pub sense: Sense,
    pub lemma: String,
}

/// A sense with its lemma, for direct lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SenseDetail {
    #[serde(flatten)]
    pub sense: Sense,
    pub lemma: String,
}

impl From<SenseCandidate> for SenseDetail {
    fn from(candidate: SenseCandidate) -> Self {
        Self {
            sense: candidate.sense,
            lemma: candidate.lemma,
        }
    }
}

/// Short form of a sense shown alongside a review card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SenseBrief {
    pub id: i64,
    pub part_of_speech: String,
    pub definition: String,
}

/// A sense listed for plan building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SenseSummary {
    pub sense_id: i64,
    pub item_id: i64,
    pub lemma: String,
    pub part_of_speech: String,
    pub definition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Senses of one source grouped under a unit label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitGroup {
    pub unit: String,
    pub senses: Vec<SenseSummary>,
}

/// Order of senses offered for plan building.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrder {
    /// Ascending sense id.
    #[default]
    Sequential,
    Random,
}

/// A lexical item to add to the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewLexicalItem {
    pub lemma: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub difficulty: Option<f64>,
    #[serde(default)]
    pub senses: Vec<NewSense>,
}

impl NewLexicalItem {
    /// Create a new item with no senses.
    pub fn new(lemma: impl Into<String>) -> Self {
        Self {
            lemma: lemma.into(),
            ..Default::default()
        }
    }

    /// Set the source tag.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the item difficulty.
    pub fn with_difficulty(mut self, difficulty: f64) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// Append a sense.
    pub fn with_sense(mut self, sense: NewSense) -> Self {
        self.senses.push(sense);
        self
    }
}

/// A sense to add alongside a [`NewLexicalItem`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSense {
    #[serde(default)]
    pub part_of_speech: String,
    pub definition: String,
    #[serde(default)]
    pub example_sentence: String,
    #[serde(default)]
    pub example_translation: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub difficulty: Option<f64>,
}

impl NewSense {
    /// Create a sense with a definition and example sentence.
    pub fn new(definition: impl Into<String>, example_sentence: impl Into<String>) -> Self {
        Self {
            definition: definition.into(),
            example_sentence: example_sentence.into(),
            ..Default::default()
        }
    }

    pub fn with_part_of_speech(mut self, pos: impl Into<String>) -> Self {
        self.part_of_speech = pos.into();
        self
    }

    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.example_translation = Some(translation.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: f64) -> Self {
        self.difficulty = Some(difficulty);
        self
    }
}

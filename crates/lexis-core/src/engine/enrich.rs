//! Turns a selected sense into a review card.

use regex::Regex;

use crate::error::LexisResult;
use crate::store::CatalogStore;
use crate::types::{ReviewUnit, SelectionOrigin, SenseBrief, SenseCandidate};

/// Leading definition abbreviations and the part of speech they denote.
const POS_ABBREVIATIONS: &[(&str, &str)] = &[
    ("interj.", "interjection"),
    ("prep.", "preposition"),
    ("conj.", "conjunction"),
    ("pron.", "pronoun"),
    ("adj.", "adjective"),
    ("adv.", "adverb"),
    ("num.", "numeral"),
    ("art.", "article"),
    ("vt.", "transitive verb"),
    ("vi.", "intransitive verb"),
    ("n.", "noun"),
    ("v.", "verb"),
];

/// Form of `lemma` as written in `sentence`.
///
/// Tries a case-insensitive whole-word match, then the lemma followed by one
/// of `s`, `es`, `ed`, `ing`, `d`. Falls back to the lemma itself. This is a
/// suffix heuristic, not a stemmer.
pub fn find_word_form(sentence: &str, lemma: &str) -> String {
    if lemma.is_empty() {
        return String::new();
    }
    let quoted = regex::escape(lemma);

    let exact = Regex::new(&format!(r"(?i)\b{}\b", quoted));
    if let Ok(re) = &exact {
        if let Some(m) = re.find(sentence) {
            return m.as_str().to_string();
        }
    }

    let inflected = Regex::new(&format!(r"(?i)\b{}(s|es|ed|ing|d)?\b", quoted));
    if let Ok(re) = &inflected {
        if let Some(m) = re.find(sentence) {
            return m.as_str().to_string();
        }
    }

    lemma.to_string()
}

/// Part of speech implied by a leading abbreviation in a definition.
pub fn part_of_speech_from_definition(definition: &str) -> Option<&'static str> {
    let definition = definition.trim_start();
    POS_ABBREVIATIONS
        .iter()
        .find(|(abbrev, _)| definition.starts_with(abbrev))
        .map(|(_, name)| *name)
}

fn repaired_part_of_speech(part_of_speech: &str, definition: &str) -> String {
    if !part_of_speech.trim().is_empty() {
        return part_of_speech.to_string();
    }
    part_of_speech_from_definition(definition)
        .unwrap_or_default()
        .to_string()
}

/// Build the card for `candidate`, gathering every sense of its lexical item.
pub(crate) fn build_review_unit(
    catalog: &dyn CatalogStore,
    candidate: SenseCandidate,
    origin: SelectionOrigin,
) -> LexisResult<ReviewUnit> {
    let SenseCandidate { sense, lemma } = candidate;
    let word_form = find_word_form(&sense.example_sentence, &lemma);

    let senses = catalog
        .senses_of_item(sense.item_id)?
        .into_iter()
        .map(|s| SenseBrief {
            id: s.id,
            part_of_speech: repaired_part_of_speech(&s.part_of_speech, &s.definition),
            definition: s.definition,
        })
        .collect();

    Ok(ReviewUnit {
        sense_id: sense.id,
        item_id: sense.item_id,
        lemma,
        word_form,
        example_sentence: sense.example_sentence,
        example_translation: sense.example_translation,
        senses,
        origin,
    })
}

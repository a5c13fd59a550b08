//! Trigram string similarity compatible with PostgreSQL `pg_trgm`.
//!
//! # Responsibility
//! - Split text into lower-cased alphanumeric words.
//! - Extract padded trigrams per word.
//! - Score whole-string and best-extent (word) similarity in `0.0..=1.0`.
//! - Render names as padded word text for the substring index.
//!
//! # Invariants
//! - Metrics are symmetric in case: `"ABC"` and `"abc"` score identically.
//! - Text without any alphanumeric character has no trigrams and scores 0.0.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("valid word regex"));

/// Three consecutive characters of one padded word.
pub type Trigram = [char; 3];

/// Returns lower-cased words of `text` in order of appearance.
pub fn words(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(text)
        .map(|word| word.as_str().to_lowercase())
        .collect()
}

/// Returns the ordered trigram sequence of `text`, duplicates kept.
///
/// Each word is padded with two leading blanks and one trailing blank, so
/// `"cat"` yields `"  c"`, `" ca"`, `"cat"`, `"at "`.
pub fn trigram_sequence(text: &str) -> Vec<Trigram> {
    let mut sequence = Vec::new();
    for word in words(text) {
        let padded: Vec<char> = "  "
            .chars()
            .chain(word.chars())
            .chain(std::iter::once(' '))
            .collect();
        sequence.extend(padded.windows(3).map(|window| [window[0], window[1], window[2]]));
    }
    sequence
}

/// Returns the distinct trigram set of `text`.
pub fn trigram_set(text: &str) -> HashSet<Trigram> {
    trigram_sequence(text).into_iter().collect()
}

/// Returns the words of `text` each padded the way trigrams are taken,
/// concatenated: `"Old School"` becomes `"  old   school "`.
///
/// Every trigram of `text` is a substring of the result, which lets a
/// substring index stand in for a trigram index.
pub fn padded_words(text: &str) -> String {
    words(text)
        .iter()
        .map(|word| format!("  {word} "))
        .collect()
}

/// Trigram set of a search query, built once and scored against many names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryTrigrams {
    set: HashSet<Trigram>,
}

impl QueryTrigrams {
    pub fn new(query: &str) -> Self {
        Self {
            set: trigram_set(query),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Distinct trigrams in a fixed order.
    pub fn sorted(&self) -> Vec<Trigram> {
        let mut trigrams: Vec<Trigram> = self.set.iter().copied().collect();
        trigrams.sort_unstable();
        trigrams
    }

    /// `max(similarity(name, query), word_similarity(query, name))`.
    pub fn best_score(&self, name: &str) -> f64 {
        let sequence = trigram_sequence(name);
        let set: HashSet<Trigram> = sequence.iter().copied().collect();
        self.similarity_to(&set).max(self.word_similarity_in(&sequence))
    }

    fn similarity_to(&self, other: &HashSet<Trigram>) -> f64 {
        if self.set.is_empty() || other.is_empty() {
            return 0.0;
        }
        let common = self.set.intersection(other).count();
        ratio(common, self.set.len() + other.len() - common)
    }

    fn word_similarity_in(&self, sequence: &[Trigram]) -> f64 {
        if self.set.is_empty() || sequence.is_empty() {
            return 0.0;
        }

        let mut best = 0.0_f64;
        for start in 0..sequence.len() {
            if !self.set.contains(&sequence[start]) {
                // An extent starting on a foreign trigram is dominated by the
                // same extent starting one position later.
                continue;
            }
            let mut extent = HashSet::new();
            let mut common = 0usize;
            for trigram in &sequence[start..] {
                if extent.insert(*trigram) && self.set.contains(trigram) {
                    common += 1;
                }
                let score = ratio(common, self.set.len() + extent.len() - common);
                if score > best {
                    best = score;
                }
                if common == self.set.len() {
                    break;
                }
            }
        }
        best
    }
}

/// Whole-string similarity: shared trigrams over the union of both sets.
pub fn similarity(left: &str, right: &str) -> f64 {
    QueryTrigrams::new(right).similarity_to(&trigram_set(left))
}

/// Greatest similarity between the trigram set of `needle` and any
/// contiguous extent of the ordered trigram sequence of `haystack`.
///
/// Scores how well `needle` matches the best-fitting words of `haystack`
/// regardless of the surrounding text.
pub fn word_similarity(needle: &str, haystack: &str) -> f64 {
    QueryTrigrams::new(needle).word_similarity_in(&trigram_sequence(haystack))
}

/// Fuzzy score of `name` against `query`: the better of both metrics.
pub fn best_score(name: &str, query: &str) -> f64 {
    QueryTrigrams::new(query).best_score(name)
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

#[cfg(test)]
mod tests {
    use super::{
        best_score, padded_words, similarity, trigram_sequence, trigram_set, word_similarity,
        words, QueryTrigrams,
    };

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn words_split_on_punctuation_and_lowercase() {
        assert_eq!(words("School #5, Almaty"), vec!["school", "5", "almaty"]);
        assert_eq!(words("ШКОЛА-лицей"), vec!["школа", "лицей"]);
    }

    #[test]
    fn trigram_sequence_pads_each_word() {
        let sequence = trigram_sequence("cat");
        assert_eq!(
            sequence,
            vec![[' ', ' ', 'c'], [' ', 'c', 'a'], ['c', 'a', 't'], ['a', 't', ' ']]
        );
    }

    #[test]
    fn similarity_matches_pg_trgm_reference_values() {
        assert_close(similarity("word", "two words"), 4.0 / 11.0);
        assert_close(similarity("Word", "word"), 1.0);
        assert_close(similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn word_similarity_matches_pg_trgm_reference_value() {
        assert_close(word_similarity("word", "two words"), 0.8);
    }

    #[test]
    fn word_similarity_rewards_matching_word_inside_long_name() {
        let whole = similarity("201", "School 201");
        let word = word_similarity("201", "School 201");
        assert_close(word, 1.0);
        assert!(whole < word);
    }

    #[test]
    fn word_similarity_tolerates_typos() {
        let score = word_similarity("almati", "Akimat of Almaty region");
        assert!(score > 0.2, "score {score} should pass default threshold");
    }

    #[test]
    fn text_without_words_scores_zero() {
        assert_close(similarity("!!!", "abc"), 0.0);
        assert_close(word_similarity("", "abc"), 0.0);
    }

    #[test]
    fn best_score_takes_the_better_metric() {
        let score = best_score("School 201", "201");
        assert_close(score, word_similarity("201", "School 201"));
        assert_close(
            best_score("word", "Word"),
            similarity("word", "Word").max(word_similarity("Word", "word")),
        );
    }

    #[test]
    fn query_trigrams_are_reusable_across_names() {
        let query = QueryTrigrams::new("almati");
        assert_close(
            query.best_score("Akimat of Almaty region"),
            best_score("Akimat of Almaty region", "almati"),
        );
        assert_close(
            query.best_score("Water utility"),
            best_score("Water utility", "almati"),
        );
        assert_eq!(query.sorted().len(), 7);
        assert!(QueryTrigrams::new("?!").is_empty());
    }

    #[test]
    fn padded_words_contain_every_trigram() {
        let padded = padded_words("Old School-5");
        assert_eq!(padded, "  old   school   5 ");
        for trigram in trigram_set("Old School-5") {
            let trigram: String = trigram.iter().collect();
            assert!(padded.contains(&trigram), "missing `{trigram}`");
        }
    }
}

//! Automatic hyphenation capability.

use smallvec::SmallVec;
use std::collections::HashMap;

/// Hyphenation points as byte offsets into a word, in ascending order.
pub type HyphenLocations = SmallVec<usize, 8>;

/// Language-aware hyphenation, provided by the embedder.
pub trait Hyphenator {
    fn can_hyphenate(&self, locale: Option<&str>) -> bool;

    /// Every hyphenation point in `word` strictly before byte offset `before`.
    fn hyphenation_points_before(
        &self,
        word: &str,
        before: usize,
        locale: Option<&str>,
    ) -> HyphenLocations;
}

/// Hyphenator for builds without dictionaries.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHyphenation;

impl Hyphenator for NoHyphenation {
    fn can_hyphenate(&self, _locale: Option<&str>) -> bool {
        false
    }

    fn hyphenation_points_before(
        &self,
        _word: &str,
        _before: usize,
        _locale: Option<&str>,
    ) -> HyphenLocations {
        HyphenLocations::new()
    }
}

/// Exception-list hyphenator: words registered as `"hy-phen-ation"`.
///
/// Lookups are case-insensitive. Languages match by prefix, so `"en"` covers
/// `"en-US"` and `"en-GB"`.
#[derive(Clone, Debug, Default)]
pub struct WordListHyphenator {
    languages: Vec<String>,
    words: HashMap<String, HyphenLocations>,
}

impl WordListHyphenator {
    pub fn new<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            languages: languages.into_iter().map(Into::into).collect(),
            words: HashMap::new(),
        }
    }

    /// Register a word with its hyphenation points marked by `-`.
    pub fn insert(&mut self, hyphenated: &str) {
        let mut word = String::with_capacity(hyphenated.len());
        let mut points = HyphenLocations::new();
        for character in hyphenated.chars() {
            if character == '-' {
                if !word.is_empty() {
                    points.push(word.len());
                }
            } else {
                word.extend(character.to_lowercase());
            }
        }
        self.words.insert(word, points);
    }

    #[must_use]
    pub fn with_word(mut self, hyphenated: &str) -> Self {
        self.insert(hyphenated);
        self
    }
}

impl Hyphenator for WordListHyphenator {
    fn can_hyphenate(&self, locale: Option<&str>) -> bool {
        locale.is_some_and(|tag| {
            let tag = tag.to_ascii_lowercase();
            self.languages
                .iter()
                .any(|language| tag.starts_with(&language.to_ascii_lowercase()))
        })
    }

    fn hyphenation_points_before(
        &self,
        word: &str,
        before: usize,
        locale: Option<&str>,
    ) -> HyphenLocations {
        if !self.can_hyphenate(locale) {
            return HyphenLocations::new();
        }
        let key = word.to_lowercase();
        // Lowercasing may change byte lengths; only trust offsets when it did not.
        if key.len() != word.len() {
            return HyphenLocations::new();
        }
        self.words.get(&key).map_or_else(HyphenLocations::new, |points| {
            points
                .iter()
                .copied()
                .filter(|&point| point < before)
                .collect()
        })
    }
}

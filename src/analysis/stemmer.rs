use std::{borrow::Cow, collections::{HashMap, HashSet}, rc::Rc};

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::{Token, TokenKind};

/// Canonical term string. Shared between the n-gram window and the grams it emits.
pub type Term = Rc<str>;

/// Morphological reduction capability.
///
/// Must be deterministic and pure: the same word always yields the same stem.
pub trait Stemmer {
    fn stem<'a>(&self, word: &'a str) -> Cow<'a, str>;
}

impl<S: Stemmer + ?Sized> Stemmer for &S {
    #[inline]
    fn stem<'a>(&self, word: &'a str) -> Cow<'a, str> {
        (**self).stem(word)
    }
}

impl<S: Stemmer + ?Sized> Stemmer for Box<S> {
    #[inline]
    fn stem<'a>(&self, word: &'a str) -> Cow<'a, str> {
        (**self).stem(word)
    }
}

/// Snowball stemmers, e.g. `rust_stemmers::Stemmer::create(Algorithm::English)`
impl Stemmer for rust_stemmers::Stemmer {
    #[inline]
    fn stem<'a>(&self, word: &'a str) -> Cow<'a, str> {
        rust_stemmers::Stemmer::stem(self, word)
    }
}

/// No stemming.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityStemmer;

impl Stemmer for IdentityStemmer {
    #[inline]
    fn stem<'a>(&self, word: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(word)
    }
}

/// Explicit word -> stem table; words missing from the table are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct MapStemmer {
    table: HashMap<String, String, RandomState>,
}

impl MapStemmer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, word: &str, stem: &str) -> Self {
        self.table.insert(word.to_string(), stem.to_string());
        self
    }
}

impl<W: Into<String>, S: Into<String>> FromIterator<(W, S)> for MapStemmer {
    fn from_iter<T: IntoIterator<Item = (W, S)>>(iter: T) -> Self {
        Self {
            table: iter.into_iter().map(|(w, s)| (w.into(), s.into())).collect(),
        }
    }
}

impl Stemmer for MapStemmer {
    fn stem<'a>(&self, word: &'a str) -> Cow<'a, str> {
        match self.table.get(word) {
            Some(stem) => Cow::Owned(stem.clone()),
            None => Cow::Borrowed(word),
        }
    }
}

/// Closure adapter: `FnStemmer(|w: &str| w.trim_end_matches('s').to_string())`
pub struct FnStemmer<F>(pub F);

impl<F> Stemmer for FnStemmer<F>
where
    F: Fn(&str) -> String,
{
    fn stem<'a>(&self, word: &'a str) -> Cow<'a, str> {
        Cow::Owned((self.0)(word))
    }
}

/// Fixed set of lowercase, unstemmed stop words.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<Box<str>, RandomState>,
}

impl StopWords {
    pub fn new() -> Self {
        Self {
            words: HashSet::with_hasher(RandomState::new()),
        }
    }

    #[inline]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(|w| w.as_ref())
    }
}

impl<T: AsRef<str>> FromIterator<T> for StopWords {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().map(|w| Box::from(w.as_ref())).collect(),
        }
    }
}

/// Order in which stop-word filtering and stemming are applied to a word.
///
/// The orders yield different vocabularies: with an English stemmer
/// `others` stems to `other`, which is itself a stop word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StemOrderPolicy {
    /// stem first; drop when the stem is in the stop-word set
    StemThenFilter,
    /// drop when the raw word matches the stop-word set expanded with the
    /// stems of its words; keep the stem otherwise.
    ///
    /// With stop word `studies` stemming to `stud`, the raw word `stud` is
    /// dropped as well. The token's own stem is never consulted.
    FilterThenStem,
    /// drop when the raw word is in the stop-word set exactly as supplied; keep the stem otherwise
    #[default]
    FilterRawOnly,
}

/// Outcome of classifying one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Keep(Term),
    /// token removed; breaks n-gram adjacency
    Drop,
    /// separator, neither term nor drop
    Skip,
}

/// Applies stop words and stemming to tokens according to a [`StemOrderPolicy`].
pub struct StemmerAdapter<'s, S> {
    stemmer: S,
    stopwords: &'s StopWords,
    /// stemmed stop words, only populated for `FilterThenStem`
    stemmed_stopwords: HashSet<Box<str>, RandomState>,
    policy: StemOrderPolicy,
    drop_punctuation: bool,
    drop_numbers: bool,
}

impl<'s, S: Stemmer> StemmerAdapter<'s, S> {
    pub fn new(stemmer: S, stopwords: &'s StopWords, policy: StemOrderPolicy) -> Self {
        let mut stemmed_stopwords = HashSet::with_hasher(RandomState::new());
        if policy == StemOrderPolicy::FilterThenStem {
            for word in stopwords.iter() {
                let stem = stemmer.stem(word);
                if !stopwords.contains(&stem) {
                    stemmed_stopwords.insert(Box::from(stem.as_ref()));
                }
            }
        }
        Self {
            stemmer,
            stopwords,
            stemmed_stopwords,
            policy,
            drop_punctuation: true,
            drop_numbers: true,
        }
    }

    /// Set whether punctuation and number tokens are dropped (both default to true)
    pub fn with_drops(mut self, drop_punctuation: bool, drop_numbers: bool) -> Self {
        self.drop_punctuation = drop_punctuation;
        self.drop_numbers = drop_numbers;
        self
    }

    pub fn policy(&self) -> StemOrderPolicy {
        self.policy
    }

    /// Classify one token.
    /// Numbers and punctuation that are not dropped are kept verbatim.
    pub fn classify(&self, token: &Token<'_>) -> Classified {
        match token.kind {
            TokenKind::Whitespace => Classified::Skip,
            TokenKind::Number if self.drop_numbers => Classified::Drop,
            TokenKind::Punctuation if self.drop_punctuation => Classified::Drop,
            TokenKind::Number | TokenKind::Punctuation => Classified::Keep(Term::from(token.text)),
            TokenKind::Word => self.classify_word(token.text),
        }
    }

    /// Apply the order policy to a single word.
    pub fn classify_word(&self, word: &str) -> Classified {
        match self.policy {
            StemOrderPolicy::StemThenFilter => {
                let stem = self.stemmer.stem(word);
                if self.stopwords.contains(&stem) {
                    Classified::Drop
                } else {
                    Classified::Keep(Term::from(stem.as_ref()))
                }
            }
            StemOrderPolicy::FilterThenStem => {
                if self.stopwords.contains(word) || self.stemmed_stopwords.contains(word) {
                    Classified::Drop
                } else {
                    Classified::Keep(Term::from(self.stemmer.stem(word).as_ref()))
                }
            }
            StemOrderPolicy::FilterRawOnly => {
                if self.stopwords.contains(word) {
                    Classified::Drop
                } else {
                    Classified::Keep(Term::from(self.stemmer.stem(word).as_ref()))
                }
            }
        }
    }
}

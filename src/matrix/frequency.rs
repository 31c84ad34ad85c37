use ahash::RandomState;
use indexmap::IndexMap;

use crate::analysis::ngram::{Gram, GramOrder};
use crate::matrix::vocabulary::{GramKey, GramKeyRef};

/// GramFrequency struct
/// Counts the grams of a single document.
///
/// Keeps grams in order of first occurrence inside the document, so that
/// merging documents in input order reproduces the column order of a
/// sequential pass.
///
/// # Examples
/// ```
/// use term_matrix::matrix::frequency::GramFrequency;
/// use term_matrix::analysis::ngram::{Gram, GramOrder};
/// let mut freq = GramFrequency::new();
/// freq.add_gram(&Gram::Unigram("cat".into()));
/// freq.add_gram(&Gram::Unigram("cat".into()));
/// assert_eq!(freq.gram_count(GramOrder::Unigram, "cat"), 2);
/// ```
#[derive(Debug, Clone)]
pub struct GramFrequency {
    gram_count: IndexMap<GramKey, u32, RandomState>,
    total_gram_count: u64,
    key_buf: String,
}

impl Default for GramFrequency {
    fn default() -> Self {
        Self::new()
    }
}

/// Implementation for adding grams
impl GramFrequency {
    /// Create a new GramFrequency
    pub fn new() -> Self {
        GramFrequency {
            gram_count: IndexMap::with_hasher(RandomState::new()),
            total_gram_count: 0,
            key_buf: String::new(),
        }
    }

    /// Add a gram
    ///
    /// # Arguments
    /// * `gram` - gram to add
    #[inline]
    pub fn add_gram(&mut self, gram: &Gram) -> &mut Self {
        let mut buf = std::mem::take(&mut self.key_buf);
        let key = GramKeyRef::of(gram, &mut buf);
        self.add_key(key, 1);
        self.key_buf = buf;
        self
    }

    /// Add multiple grams
    ///
    /// # Arguments
    /// * `grams` - iterator of grams to add
    pub fn add_grams<I>(&mut self, grams: I) -> &mut Self
    where
        I: IntoIterator<Item = Gram>,
    {
        for gram in grams {
            self.add_gram(&gram);
        }
        self
    }

    /// Add `n` occurrences of a key
    ///
    /// # Arguments
    /// * `key` - vocabulary key
    /// * `n` - occurrence count
    #[inline]
    pub fn add_key(&mut self, key: GramKeyRef<'_>, n: u32) -> &mut Self {
        if let Some(count) = self.gram_count.get_mut(&key) {
            *count += n;
        } else {
            self.gram_count.insert(key.to_owned_key(), n);
        }
        self.total_gram_count += n as u64;
        self
    }
}

/// Implementation for retrieving information from GramFrequency
impl GramFrequency {
    /// Iterate over grams and their counts in first-occurrence order
    ///
    /// # Returns
    /// * `impl Iterator<Item=(GramKeyRef, u32)>` - keys and counts
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (GramKeyRef<'_>, u32)> {
        self.gram_count
            .iter()
            .map(|(k, &n)| (GramKeyRef::new(k.order, &k.key), n))
    }

    /// Get the occurrence count of a gram
    ///
    /// # Arguments
    /// * `order` - gram order
    /// * `key` - gram key (`"a b"` for bigrams)
    ///
    /// # Returns
    /// * `u32` - occurrence count, 0 if absent
    #[inline]
    pub fn gram_count(&self, order: GramOrder, key: &str) -> u32 {
        self.gram_count
            .get(&GramKeyRef::new(order, key))
            .copied()
            .unwrap_or(0)
    }

    /// Total number of grams added
    #[inline]
    pub fn gram_sum(&self) -> u64 {
        self.total_gram_count
    }

    /// Number of distinct grams
    #[inline]
    pub fn gram_num(&self) -> usize {
        self.gram_count.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.gram_count.is_empty()
    }

    /// Reset all counts
    #[inline]
    pub fn clear(&mut self) {
        self.gram_count.clear();
        self.total_gram_count = 0;
    }
}

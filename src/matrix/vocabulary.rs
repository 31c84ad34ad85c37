use ahash::RandomState;
use indexmap::{Equivalent, IndexSet};
use serde::{Deserialize, Serialize};

use crate::analysis::ngram::{Gram, GramOrder};

/// Owned vocabulary key.
///
/// Unigram and bigram keys live in separate key spaces: a stemmer that emits
/// `"new york"` as a single term never collides with the bigram `new york`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GramKey {
    pub order: GramOrder,
    pub key: Box<str>,
}

/// Borrowed lookup form of [`GramKey`]; hashes identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GramKeyRef<'a> {
    pub order: GramOrder,
    pub key: &'a str,
}

impl Equivalent<GramKey> for GramKeyRef<'_> {
    #[inline]
    fn equivalent(&self, other: &GramKey) -> bool {
        self.order == other.order && self.key == &*other.key
    }
}

impl<'a> GramKeyRef<'a> {
    pub fn new(order: GramOrder, key: &'a str) -> Self {
        Self { order, key }
    }

    /// Key of `gram`, using `buf` to join bigram terms.
    pub fn of(gram: &'a Gram, buf: &'a mut String) -> Self {
        match gram {
            Gram::Unigram(t) => GramKeyRef::new(GramOrder::Unigram, t),
            Gram::Bigram(..) => {
                gram.write_key(buf);
                let joined: &'a String = buf;
                GramKeyRef::new(GramOrder::Bigram, joined.as_str())
            }
        }
    }

    pub fn to_owned_key(&self) -> GramKey {
        GramKey {
            order: self.order,
            key: Box::from(self.key),
        }
    }
}

/// Gram key -> column index.
///
/// The column of a key is its insertion position: dense, zero-based, never
/// reused or changed until the matrix is finalized.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    keys: IndexSet<GramKey, RandomState>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

impl Vocabulary {
    pub fn new() -> Self {
        Self {
            keys: IndexSet::with_hasher(RandomState::new()),
        }
    }

    /// Column of `key`, assigning the next free column on first sight.
    #[inline]
    pub fn intern(&mut self, key: GramKeyRef<'_>) -> u32 {
        if let Some(col) = self.keys.get_index_of(&key) {
            return col as u32;
        }
        let (col, _) = self.keys.insert_full(key.to_owned_key());
        col as u32
    }

    #[inline]
    pub fn get(&self, key: GramKeyRef<'_>) -> Option<u32> {
        self.keys.get_index_of(&key).map(|c| c as u32)
    }

    pub fn key(&self, col: u32) -> Option<&GramKey> {
        self.keys.get_index(col as usize)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in column order
    pub fn iter(&self) -> impl Iterator<Item = &GramKey> {
        self.keys.iter()
    }

    pub(crate) fn into_keys(self) -> Vec<GramKey> {
        self.keys.into_iter().collect()
    }
}

use std::{fmt, mem};

use serde::{Deserialize, Serialize};

use crate::analysis::stemmer::{Classified, Term};
use crate::error::{Error, Result};

/// Separator between the two terms of a bigram key.
pub const BIGRAM_SEPARATOR: char = ' ';

/// Gram order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GramOrder {
    Unigram = 1,
    Bigram = 2,
}

/// Requested n-gram orders, a non-empty subset of {1, 2}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct NgramOrders {
    unigrams: bool,
    bigrams: bool,
}

impl NgramOrders {
    pub const UNIGRAMS: NgramOrders = NgramOrders { unigrams: true, bigrams: false };
    pub const UNI_AND_BIGRAMS: NgramOrders = NgramOrders { unigrams: true, bigrams: true };
    pub const BIGRAMS: NgramOrders = NgramOrders { unigrams: false, bigrams: true };

    /// Build from a list of orders such as `[1, 2]`.
    pub fn from_orders(orders: &[u8]) -> Result<Self> {
        if orders.is_empty() {
            return Err(Error::config("ngram_orders", "at least one order is required"));
        }
        let mut out = NgramOrders { unigrams: false, bigrams: false };
        for &order in orders {
            match order {
                1 => out.unigrams = true,
                2 => out.bigrams = true,
                other => {
                    return Err(Error::config(
                        "ngram_orders",
                        format!("order {} is not supported, expected 1 or 2", other),
                    ))
                }
            }
        }
        Ok(out)
    }

    pub fn unigrams(&self) -> bool {
        self.unigrams
    }

    pub fn bigrams(&self) -> bool {
        self.bigrams
    }

    pub fn max_order(&self) -> u8 {
        if self.bigrams { 2 } else { 1 }
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(2);
        if self.unigrams {
            v.push(1);
        }
        if self.bigrams {
            v.push(2);
        }
        v
    }
}

impl Default for NgramOrders {
    fn default() -> Self {
        Self::UNIGRAMS
    }
}

impl TryFrom<Vec<u8>> for NgramOrders {
    type Error = Error;

    fn try_from(value: Vec<u8>) -> Result<Self> {
        NgramOrders::from_orders(&value)
    }
}

impl From<NgramOrders> for Vec<u8> {
    fn from(value: NgramOrders) -> Self {
        value.to_vec()
    }
}

/// A unigram or a bigram of consecutive kept terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Gram {
    Unigram(Term),
    Bigram(Term, Term),
}

impl Gram {
    pub fn order(&self) -> GramOrder {
        match self {
            Gram::Unigram(_) => GramOrder::Unigram,
            Gram::Bigram(..) => GramOrder::Bigram,
        }
    }

    /// Vocabulary key: the term itself, or both terms joined by [`BIGRAM_SEPARATOR`].
    pub fn key(&self) -> String {
        match self {
            Gram::Unigram(t) => t.to_string(),
            Gram::Bigram(a, b) => {
                let mut key = String::with_capacity(a.len() + b.len() + 1);
                key.push_str(a);
                key.push(BIGRAM_SEPARATOR);
                key.push_str(b);
                key
            }
        }
    }

    /// Write the key into `buf` (cleared first), reusing its allocation.
    pub fn write_key(&self, buf: &mut String) {
        buf.clear();
        match self {
            Gram::Unigram(t) => buf.push_str(t),
            Gram::Bigram(a, b) => {
                buf.push_str(a);
                buf.push(BIGRAM_SEPARATOR);
                buf.push_str(b);
            }
        }
    }
}

impl fmt::Display for Gram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gram::Unigram(t) => f.write_str(t),
            Gram::Bigram(a, b) => write!(f, "{}{}{}", a, BIGRAM_SEPARATOR, b),
        }
    }
}

/// Sliding window over the last kept terms.
#[derive(Debug, Clone, Default)]
enum Window {
    #[default]
    Empty,
    HasOne(Term),
    HasTwo(Term, Term),
}

/// Turns a stream of classified tokens into grams.
///
/// A dropped token resets the window, so no gram ever spans a drop.
/// Whitespace (`Skip`) leaves the window untouched.
pub struct NgramAssembler<I> {
    input: I,
    orders: NgramOrders,
    window: Window,
    /// bigram waiting behind the unigram emitted for the same term
    pending: Option<Gram>,
}

pub fn assemble<I>(input: I, orders: NgramOrders) -> NgramAssembler<I::IntoIter>
where
    I: IntoIterator<Item = Classified>,
{
    NgramAssembler::new(input.into_iter(), orders)
}

impl<I> NgramAssembler<I>
where
    I: Iterator<Item = Classified>,
{
    pub fn new(input: I, orders: NgramOrders) -> Self {
        Self {
            input,
            orders,
            window: Window::Empty,
            pending: None,
        }
    }

    /// Push a kept term; returns the bigram it closes, if any.
    fn push(&mut self, term: Term) -> Option<Gram> {
        let window = mem::take(&mut self.window);
        let (next, bigram) = match window {
            Window::Empty => (Window::HasOne(term), None),
            Window::HasOne(prev) | Window::HasTwo(_, prev) => {
                let bigram = self
                    .orders
                    .bigrams()
                    .then(|| Gram::Bigram(Term::clone(&prev), Term::clone(&term)));
                (Window::HasTwo(prev, term), bigram)
            }
        };
        self.window = next;
        bigram
    }
}

impl<I> Iterator for NgramAssembler<I>
where
    I: Iterator<Item = Classified>,
{
    type Item = Gram;

    fn next(&mut self) -> Option<Gram> {
        if let Some(gram) = self.pending.take() {
            return Some(gram);
        }
        loop {
            match self.input.next()? {
                Classified::Skip => continue,
                Classified::Drop => self.window = Window::Empty,
                Classified::Keep(term) => {
                    let unigram = self.orders.unigrams().then(|| Gram::Unigram(Term::clone(&term)));
                    let bigram = self.push(term);
                    match (unigram, bigram) {
                        (Some(u), b) => {
                            self.pending = b;
                            return Some(u);
                        }
                        (None, Some(b)) => return Some(b),
                        (None, None) => continue,
                    }
                }
            }
        }
    }
}

//! This crate builds pruned sparse document-term matrices from raw text in a single pass.
pub mod analysis;
pub mod document;
pub mod error;
pub mod matrix;
pub mod utils;

/// Build a document-term matrix in one call
/// Streams every document through the pipeline
/// (normalize -> tokenize -> stem/filter -> n-grams) straight into a sparse
/// accumulator, then prunes columns whose total count is below `min_count`.
///
/// No intermediate token list is built for the corpus or for a document.
///
/// # Examples
/// ```
/// use term_matrix::{build_term_matrix, BuildOptions, IdentityStemmer, StopWords};
/// let m = build_term_matrix(
///     ["a cat sat", "a cat ran"],
///     &StopWords::new(),
///     IdentityStemmer,
///     BuildOptions::new().min_count(2),
/// ).unwrap();
/// assert_eq!(m.col_labels().collect::<Vec<_>>(), vec!["a", "cat"]);
/// assert_eq!(m.count_at(1, 1), 1);
/// ```
pub use matrix::builder::build_term_matrix;

/// Term-Matrix Builder
/// A configured pipeline (stop words, stemmer, options) that can run many builds.
/// `build` processes documents sequentially; `build_par` tokenizes them on the
/// rayon pool and merges the partial counts in input order, producing the
/// same matrix.
pub use matrix::builder::TermMatrixBuilder;

/// Pruned Matrix
/// The result of a build: documents by grams, compressed sparse rows.
/// - rows: input documents, input order, labelled by [`DocumentId`]
/// - columns: surviving unigrams, then surviving bigrams (`"term1 term2"`),
///   each group in first-seen order
/// - `count_at(row, col)` returns 0 for absent entries
///
/// # Serialization
/// Supported through serde; the crate defines no file format of its own.
pub use matrix::pruned::PrunedMatrix;

/// Build Options
/// n-gram orders, `min_count` (default 5), punctuation/number dropping,
/// stop-word/stem order policy, case folding and the encoding-error policy.
/// Loadable from (partial) JSON.
pub use matrix::options::{BuildOptions, EncodingPolicy};

/// Stemming capability and stop words
/// `Stemmer` is the pluggable `stem(word) -> stem` capability. Provided
/// implementations:
/// - `IdentityStemmer`: no stemming
/// - `MapStemmer`: explicit word -> stem table
/// - `FnStemmer`: any `Fn(&str) -> String`
/// - `rust_stemmers::Stemmer`: Snowball stemmers
///
/// `StemOrderPolicy` selects whether stop words are filtered before or after
/// stemming; the choice changes the vocabulary.
pub use analysis::stemmer::{FnStemmer, IdentityStemmer, MapStemmer, StemOrderPolicy, Stemmer, StopWords};

/// N-gram orders and grams
pub use analysis::ngram::{Gram, GramOrder, NgramOrders};

/// Case folding mode of the normalizer
pub use analysis::normalizer::CaseFold;

/// Input documents and their identifiers
pub use document::{Document, DocumentId};

/// Error type of the crate
pub use error::{Error, Result};

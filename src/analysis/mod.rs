//! Per-document text pipeline: normalize, tokenize, stem/filter, assemble n-grams.
//! Holds no shared mutable state; every stage is safe to run on many documents at once.
pub mod normalizer;
pub mod tokenizer;
pub mod stemmer;
pub mod ngram;

use serde::{Deserialize, Serialize};

use crate::analysis::ngram::NgramOrders;
use crate::analysis::normalizer::{CaseFold, Normalizer};
use crate::analysis::stemmer::StemOrderPolicy;
use crate::error::{Error, Result};

/// What to do with a document that is not valid UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingPolicy {
    /// fail the whole build
    #[default]
    Abort,
    /// keep the row empty and record it in [`PrunedMatrix::failed_rows`](crate::PrunedMatrix::failed_rows)
    Skip,
}

/// Options of a term-matrix build.
///
/// Every field has a default, so a partial JSON object is a valid configuration:
/// ```
/// use term_matrix::BuildOptions;
/// let opts = BuildOptions::from_json(r#"{"ngram_orders": [1, 2], "min_count": 1}"#).unwrap();
/// assert!(opts.ngram_orders.bigrams());
/// assert!(opts.drop_punctuation);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildOptions {
    pub ngram_orders: NgramOrders,
    /// columns whose total count is below this are pruned
    pub min_count: u64,
    pub drop_punctuation: bool,
    pub drop_numbers: bool,
    pub stem_order_policy: StemOrderPolicy,
    pub case_fold: CaseFold,
    pub strip_invisible: bool,
    pub on_encoding_error: EncodingPolicy,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            ngram_orders: NgramOrders::UNIGRAMS,
            min_count: 5,
            drop_punctuation: true,
            drop_numbers: true,
            stem_order_policy: StemOrderPolicy::default(),
            case_fold: CaseFold::default(),
            strip_invisible: true,
            on_encoding_error: EncodingPolicy::default(),
        }
    }
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from JSON.
    /// Malformed input, unknown fields or out-of-range values
    /// (a negative `min_count`, order 3, no order at all) are configuration
    /// errors; `NgramOrders` checks its own orders while deserializing.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::config("options", e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::config("options", e.to_string()))
    }

    pub fn ngram_orders(mut self, orders: NgramOrders) -> Self {
        self.ngram_orders = orders;
        self
    }

    pub fn min_count(mut self, min_count: u64) -> Self {
        self.min_count = min_count;
        self
    }

    pub fn drop_punctuation(mut self, drop: bool) -> Self {
        self.drop_punctuation = drop;
        self
    }

    pub fn drop_numbers(mut self, drop: bool) -> Self {
        self.drop_numbers = drop;
        self
    }

    pub fn stem_order_policy(mut self, policy: StemOrderPolicy) -> Self {
        self.stem_order_policy = policy;
        self
    }

    pub fn case_fold(mut self, case_fold: CaseFold) -> Self {
        self.case_fold = case_fold;
        self
    }

    pub fn strip_invisible(mut self, strip: bool) -> Self {
        self.strip_invisible = strip;
        self
    }

    pub fn on_encoding_error(mut self, policy: EncodingPolicy) -> Self {
        self.on_encoding_error = policy;
        self
    }

    pub(crate) fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.case_fold, self.strip_invisible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = BuildOptions::default();
        assert_eq!(opts.ngram_orders, NgramOrders::UNIGRAMS);
        assert_eq!(opts.min_count, 5);
        assert!(opts.drop_punctuation && opts.drop_numbers);
        assert_eq!(opts.on_encoding_error, EncodingPolicy::Abort);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let opts = BuildOptions::from_json(
            r#"{"stem_order_policy": "stem_then_filter", "on_encoding_error": "skip"}"#,
        )
        .unwrap();
        assert_eq!(opts.stem_order_policy, StemOrderPolicy::StemThenFilter);
        assert_eq!(opts.on_encoding_error, EncodingPolicy::Skip);
        assert_eq!(opts.min_count, 5);
    }

    #[test]
    fn json_rejects_bad_values() {
        for bad in [
            r#"{"min_count": -1}"#,
            r#"{"ngram_orders": [1, 3]}"#,
            r#"{"ngram_orders": []}"#,
            r#"{"min_cnt": 2}"#,
            "not json",
        ] {
            match BuildOptions::from_json(bad) {
                Err(Error::Configuration { option, .. }) => assert_eq!(option, "options"),
                other => panic!("{bad}: expected configuration error, got {other:?}"),
            }
        }
    }

    #[test]
    fn json_roundtrip() {
        let opts = BuildOptions::new()
            .ngram_orders(NgramOrders::UNI_AND_BIGRAMS)
            .min_count(1)
            .case_fold(CaseFold::Ascii);
        assert_eq!(BuildOptions::from_json(&opts.to_json().unwrap()).unwrap(), opts);
    }
}

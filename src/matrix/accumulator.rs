use std::collections::HashMap;

use ahash::RandomState;
use tracing::debug;

use crate::analysis::ngram::{Gram, GramOrder};
use crate::document::DocumentId;
use crate::matrix::frequency::GramFrequency;
use crate::matrix::pruned::PrunedMatrix;
use crate::matrix::vocabulary::{GramKeyRef, Vocabulary};
use crate::utils::sort::radix_sort_u32_soa;

/// One matrix row while counting: column -> count.
#[derive(Debug, Clone)]
struct RowCounts {
    label: DocumentId,
    counts: HashMap<u32, u32, RandomState>,
}

impl RowCounts {
    fn new(label: DocumentId) -> Self {
        Self {
            label,
            counts: HashMap::with_hasher(RandomState::new()),
        }
    }
}

/// Vocabulary plus sparse (row, column) -> count accumulation.
///
/// Each observation is an expected O(1) hash update; no dense matrix is ever
/// allocated. Consumed by [`SparseAccumulator::finalize`].
#[derive(Debug, Clone)]
pub struct SparseAccumulator {
    vocab: Vocabulary,
    rows: Vec<RowCounts>,
    key_buf: String,
    failed_rows: Vec<usize>,
}

impl Default for SparseAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl SparseAccumulator {
    pub fn new() -> Self {
        Self {
            vocab: Vocabulary::new(),
            rows: Vec::new(),
            key_buf: String::new(),
            failed_rows: Vec::new(),
        }
    }

    /// Append a row and return its index
    pub fn push_row(&mut self, label: DocumentId) -> usize {
        self.rows.push(RowCounts::new(label));
        self.rows.len() - 1
    }

    /// Mark a row as failed; it stays in the matrix with no entries
    pub fn mark_failed(&mut self, row: usize) {
        self.ensure_row(row);
        self.failed_rows.push(row);
    }

    /// Rows that were never pushed explicitly are labelled by position.
    fn ensure_row(&mut self, row: usize) {
        while self.rows.len() <= row {
            let idx = self.rows.len();
            self.rows.push(RowCounts::new(DocumentId::Index(idx as u64)));
        }
    }

    /// Count one occurrence of `gram` in `row`.
    #[inline]
    pub fn observe(&mut self, row: usize, gram: &Gram) {
        let mut buf = std::mem::take(&mut self.key_buf);
        let key = GramKeyRef::of(gram, &mut buf);
        self.observe_key(row, key, 1);
        self.key_buf = buf;
    }

    /// Count `n` occurrences of `key` in `row`.
    #[inline]
    pub fn observe_key(&mut self, row: usize, key: GramKeyRef<'_>, n: u32) {
        self.ensure_row(row);
        let col = self.vocab.intern(key);
        *self.rows[row].counts.entry(col).or_insert(0) += n;
    }

    /// Merge the per-document counts of `row`, in the document's first-occurrence order.
    pub fn observe_frequency(&mut self, row: usize, freq: &GramFrequency) {
        for (key, n) in freq.iter() {
            self.observe_key(row, key, n);
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Current count at (row, column), before pruning
    pub fn count(&self, row: usize, col: u32) -> u32 {
        self.rows
            .get(row)
            .and_then(|r| r.counts.get(&col).copied())
            .unwrap_or(0)
    }

    /// number of stored (row, column) entries
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(|r| r.counts.len()).sum()
    }

    /// Prune columns whose total count is below `min_count` and freeze the result.
    ///
    /// Survivors are renumbered densely: unigram columns first, then bigram
    /// columns, each group in ascending pre-prune column order. Rows are
    /// never dropped. Linear in nnz plus vocabulary size.
    pub fn finalize(self, min_count: u64) -> PrunedMatrix {
        let n_cols = self.vocab.len();

        let mut totals = vec![0u64; n_cols];
        for row in &self.rows {
            for (&col, &n) in row.counts.iter() {
                totals[col as usize] += n as u64;
            }
        }

        let keys = self.vocab.into_keys();
        let mut remap = vec![u32::MAX; n_cols];
        let mut col_labels: Vec<Box<str>> = Vec::new();
        let mut n_unigrams = 0;
        for order in [GramOrder::Unigram, GramOrder::Bigram] {
            for (old, key) in keys.iter().enumerate() {
                if key.order == order && totals[old] >= min_count {
                    remap[old] = col_labels.len() as u32;
                    col_labels.push(key.key.clone());
                }
            }
            if order == GramOrder::Unigram {
                n_unigrams = col_labels.len();
            }
        }

        let nnz: usize = self.rows.iter().map(|r| r.counts.len()).sum();
        let mut indptr = Vec::with_capacity(self.rows.len() + 1);
        let mut indices: Vec<u32> = Vec::with_capacity(nnz);
        let mut counts: Vec<u32> = Vec::with_capacity(nnz);
        let mut row_labels = Vec::with_capacity(self.rows.len());
        indptr.push(0);
        for row in self.rows {
            let start = indices.len();
            for (col, n) in row.counts {
                let new = remap[col as usize];
                if new != u32::MAX {
                    indices.push(new);
                    counts.push(n);
                }
            }
            radix_sort_u32_soa(&mut indices[start..], &mut counts[start..]);
            indptr.push(indices.len());
            row_labels.push(row.label);
        }

        debug!(
            rows = row_labels.len(),
            vocabulary = n_cols,
            kept = col_labels.len(),
            pruned = n_cols - col_labels.len(),
            nnz = indices.len(),
            min_count,
            "finalized term matrix"
        );

        let mut failed_rows = self.failed_rows;
        failed_rows.sort_unstable();
        failed_rows.dedup();

        PrunedMatrix {
            row_labels,
            col_labels,
            n_unigrams,
            indptr,
            indices,
            counts,
            failed_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::stemmer::Term;

    fn uni(t: &str) -> Gram {
        Gram::Unigram(Term::from(t))
    }

    fn bi(a: &str, b: &str) -> Gram {
        Gram::Bigram(Term::from(a), Term::from(b))
    }

    #[test]
    fn observe_assigns_columns_on_first_sight() {
        let mut acc = SparseAccumulator::new();
        let r0 = acc.push_row(DocumentId::Index(0));
        acc.observe(r0, &uni("cat"));
        acc.observe(r0, &uni("sat"));
        acc.observe(r0, &uni("cat"));
        assert_eq!(acc.vocabulary().len(), 2);
        assert_eq!(acc.count(r0, 0), 2);
        assert_eq!(acc.count(r0, 1), 1);
        assert_eq!(acc.nnz(), 2);
    }

    #[test]
    fn finalize_prunes_exactly_and_keeps_empty_rows() {
        let mut acc = SparseAccumulator::new();
        for label in ["d0", "d1", "d2"] {
            acc.push_row(DocumentId::from(label));
        }
        acc.observe(0, &uni("a"));
        acc.observe(0, &uni("rare"));
        acc.observe(1, &uni("a"));
        acc.observe(1, &uni("b"));
        acc.observe(1, &uni("b"));
        // row 2 stays empty

        let m = acc.finalize(2);
        assert_eq!(m.n_rows(), 3);
        assert_eq!(m.col_labels().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(m.col_sums(), vec![2, 2]);
        assert_eq!(m.row(2).unwrap().nnz(), 0);
        assert_eq!(m.row_labels()[2], DocumentId::from("d2"));
    }

    #[test]
    fn unigrams_precede_bigrams_after_finalize() {
        let mut acc = SparseAccumulator::new();
        let r = acc.push_row(DocumentId::Index(0));
        acc.observe(r, &uni("x"));
        acc.observe(r, &uni("y"));
        acc.observe(r, &bi("x", "y"));
        acc.observe(r, &uni("z"));
        acc.observe(r, &bi("y", "z"));
        let m = acc.finalize(0);
        assert_eq!(
            m.col_labels().collect::<Vec<_>>(),
            vec!["x", "y", "z", "x y", "y z"]
        );
        assert_eq!(m.n_unigram_cols(), 3);
    }

    #[test]
    fn observing_unknown_row_grows_matrix() {
        let mut acc = SparseAccumulator::new();
        acc.observe(2, &uni("late"));
        let m = acc.finalize(1);
        assert_eq!(m.n_rows(), 3);
        assert_eq!(m.row_labels()[0], DocumentId::Index(0));
        assert_eq!(m.count_at(2, 0), 1);
    }

    #[test]
    fn row_columns_are_sorted() {
        let mut acc = SparseAccumulator::new();
        let r = acc.push_row(DocumentId::Index(0));
        let words: Vec<String> = (0..100).map(|i| format!("w{i}")).collect();
        for w in words.iter().rev() {
            acc.observe(r, &uni(w));
        }
        let m = acc.finalize(1);
        let view = m.row(0).unwrap();
        assert!(view.indices.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(m.col_label(0), Some("w99"));
    }

    #[test]
    fn failed_rows_are_recorded() {
        let mut acc = SparseAccumulator::new();
        acc.push_row(DocumentId::Index(0));
        acc.mark_failed(1);
        let m = acc.finalize(1);
        assert_eq!(m.n_rows(), 2);
        assert_eq!(m.failed_rows(), &[1]);
    }
}

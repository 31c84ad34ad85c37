use std::fmt;

use num::{Num, NumCast};
use serde::{Deserialize, Serialize};

use crate::document::DocumentId;
use crate::error::Error;

/// Final document-by-term count matrix.
///
/// Rows are the input documents in input order. Columns are the surviving
/// grams: unigrams first, then bigrams, each group in first-seen order.
/// Stored row-major in compressed sparse row form; column indices inside a
/// row are ascending.
///
/// Deserialization checks the sparse layout and rejects inconsistent input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPrunedMatrix")]
pub struct PrunedMatrix {
    pub(crate) row_labels: Vec<DocumentId>,
    pub(crate) col_labels: Vec<Box<str>>,
    /// number of unigram columns; columns `n_unigrams..` are bigrams
    pub(crate) n_unigrams: usize,
    /// row `r` owns `indices[indptr[r]..indptr[r + 1]]`
    pub(crate) indptr: Vec<usize>,
    pub(crate) indices: Vec<u32>,
    pub(crate) counts: Vec<u32>,
    /// rows whose document failed to decode and was skipped
    pub(crate) failed_rows: Vec<usize>,
}

/// Unchecked wire form of [`PrunedMatrix`]
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPrunedMatrix {
    row_labels: Vec<DocumentId>,
    col_labels: Vec<Box<str>>,
    n_unigrams: usize,
    indptr: Vec<usize>,
    indices: Vec<u32>,
    counts: Vec<u32>,
    failed_rows: Vec<usize>,
}

impl TryFrom<RawPrunedMatrix> for PrunedMatrix {
    type Error = Error;

    fn try_from(raw: RawPrunedMatrix) -> Result<Self, Self::Error> {
        let invalid = |reason: String| Error::config("matrix", reason);
        let n_rows = raw.row_labels.len();
        let n_cols = raw.col_labels.len();
        let nnz = raw.indices.len();

        if raw.counts.len() != nnz {
            return Err(invalid(format!(
                "{} counts for {} column indices",
                raw.counts.len(),
                nnz
            )));
        }
        if raw.n_unigrams > n_cols {
            return Err(invalid(format!(
                "{} unigram columns out of {}",
                raw.n_unigrams, n_cols
            )));
        }
        if raw.indptr.len() != n_rows + 1 {
            return Err(invalid(format!(
                "indptr has {} entries for {} rows",
                raw.indptr.len(),
                n_rows
            )));
        }
        if raw.indptr.first() != Some(&0) || raw.indptr.last() != Some(&nnz) {
            return Err(invalid(format!("indptr must run from 0 to {}", nnz)));
        }
        if let Some(row) = raw.indptr.windows(2).position(|w| w[0] > w[1]) {
            return Err(invalid(format!("indptr decreases at row {}", row)));
        }
        for (row, bounds) in raw.indptr.windows(2).enumerate() {
            let cols = &raw.indices[bounds[0]..bounds[1]];
            if cols.iter().any(|&c| c as usize >= n_cols) {
                return Err(invalid(format!("row {} has a column beyond {}", row, n_cols)));
            }
            if cols.windows(2).any(|w| w[0] >= w[1]) {
                return Err(invalid(format!("row {} columns are not ascending", row)));
            }
        }
        if raw.counts.contains(&0) {
            return Err(invalid("stored counts must be nonzero".to_string()));
        }
        if raw.failed_rows.iter().any(|&r| r >= n_rows)
            || raw.failed_rows.windows(2).any(|w| w[0] >= w[1])
        {
            return Err(invalid("failed rows must be ascending row indices".to_string()));
        }

        Ok(PrunedMatrix {
            row_labels: raw.row_labels,
            col_labels: raw.col_labels,
            n_unigrams: raw.n_unigrams,
            indptr: raw.indptr,
            indices: raw.indices,
            counts: raw.counts,
            failed_rows: raw.failed_rows,
        })
    }
}

/// Sparse view of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowView<'a> {
    pub indices: &'a [u32],
    pub counts: &'a [u32],
}

impl<'a> RowView<'a> {
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + 'a {
        let (indices, counts) = (self.indices, self.counts);
        indices
            .iter()
            .zip(counts.iter())
            .map(|(&c, &n)| (c as usize, n))
    }

    pub fn sum(&self) -> u64 {
        self.counts.iter().map(|&n| n as u64).sum()
    }
}

impl PrunedMatrix {
    pub fn n_rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_labels.len()
    }

    /// number of stored (nonzero) entries
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn row_labels(&self) -> &[DocumentId] {
        &self.row_labels
    }

    /// Column labels: the term, or `"term1 term2"` for bigrams
    pub fn col_labels(&self) -> impl ExactSizeIterator<Item = &str> {
        self.col_labels.iter().map(|l| l.as_ref())
    }

    pub fn col_label(&self, col: usize) -> Option<&str> {
        self.col_labels.get(col).map(|l| l.as_ref())
    }

    /// Number of unigram columns; the remaining columns hold bigrams
    pub fn n_unigram_cols(&self) -> usize {
        self.n_unigrams
    }

    /// Rows whose document could not be decoded (skip policy only)
    pub fn failed_rows(&self) -> &[usize] {
        &self.failed_rows
    }

    /// Column of a label.
    /// Searches unigram columns first; linear in the number of columns.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.col_labels.iter().position(|l| l.as_ref() == label)
    }

    pub fn row(&self, row: usize) -> Option<RowView<'_>> {
        if row >= self.n_rows() {
            return None;
        }
        let range = self.indptr[row]..self.indptr[row + 1];
        Some(RowView {
            indices: &self.indices[range.clone()],
            counts: &self.counts[range],
        })
    }

    /// Count at (row, col); 0 when absent or out of range.
    pub fn count_at(&self, row: usize, col: usize) -> u32 {
        let Some(view) = self.row(row) else {
            return 0;
        };
        let Ok(col) = u32::try_from(col) else {
            return 0;
        };
        match view.indices.binary_search(&col) {
            Ok(pos) => view.counts[pos],
            Err(_) => 0,
        }
    }

    /// All nonzero entries as (row, col, count), row-major, columns ascending
    pub fn iter_nonzero(&self) -> impl Iterator<Item = (usize, usize, u32)> + '_ {
        (0..self.n_rows()).flat_map(move |r| {
            let range = self.indptr[r]..self.indptr[r + 1];
            self.indices[range.clone()]
                .iter()
                .zip(self.counts[range].iter())
                .map(move |(&c, &n)| (r, c as usize, n))
        })
    }

    /// Total count per row (document length after filtering)
    pub fn row_sums(&self) -> Vec<u64> {
        (0..self.n_rows())
            .map(|r| self.row(r).map_or(0, |v| v.sum()))
            .collect()
    }

    /// Total count per column
    pub fn col_sums(&self) -> Vec<u64> {
        let mut sums = vec![0u64; self.n_cols()];
        for (&c, &n) in self.indices.iter().zip(self.counts.iter()) {
            sums[c as usize] += n as u64;
        }
        sums
    }

    /// Dense row-major copy. Meant for small matrices and inspection.
    ///
    /// # Returns
    /// * `Vec<Vec<N>>` - `n_rows` rows of `n_cols` values; `None` if a count does not fit in `N`
    pub fn to_dense<N>(&self) -> Option<Vec<Vec<N>>>
    where
        N: Num + NumCast + Copy,
    {
        let mut dense = vec![vec![N::zero(); self.n_cols()]; self.n_rows()];
        for (r, c, n) in self.iter_nonzero() {
            dense[r][c] = N::from(n)?;
        }
        Some(dense)
    }
}

impl fmt::Display for PrunedMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "PrunedMatrix: {} documents x {} features ({} nonzero)",
            self.n_rows(),
            self.n_cols(),
            self.nnz()
        )?;
        for r in 0..self.n_rows() {
            write!(f, "{}:", self.row_labels[r])?;
            if let Some(view) = self.row(r) {
                for (c, n) in view.iter() {
                    write!(f, " {}={}", self.col_labels[c], n)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PrunedMatrix {
        // a cat | cat cat dog
        PrunedMatrix {
            row_labels: vec![DocumentId::Index(0), DocumentId::from("second")],
            col_labels: vec!["a".into(), "cat".into(), "dog".into()],
            n_unigrams: 3,
            indptr: vec![0, 2, 4],
            indices: vec![0, 1, 1, 2],
            counts: vec![1, 1, 2, 1],
            failed_rows: vec![],
        }
    }

    #[test]
    fn lookups() {
        let m = sample();
        assert_eq!(m.n_rows(), 2);
        assert_eq!(m.n_cols(), 3);
        assert_eq!(m.count_at(1, 1), 2);
        assert_eq!(m.count_at(0, 2), 0);
        assert_eq!(m.count_at(9, 0), 0);
        assert_eq!(m.count_at(0, 99), 0);
        // would alias column 1 if truncated to 32 bits
        assert_eq!(m.count_at(1, (1usize << 32) + 1), 0);
        assert_eq!(m.column_index("dog"), Some(2));
        assert_eq!(m.column_index("bird"), None);
    }

    #[test]
    fn sums_and_nonzero() {
        let m = sample();
        assert_eq!(m.row_sums(), vec![2, 3]);
        assert_eq!(m.col_sums(), vec![1, 3, 1]);
        let nz: Vec<_> = m.iter_nonzero().collect();
        assert_eq!(nz, vec![(0, 0, 1), (0, 1, 1), (1, 1, 2), (1, 2, 1)]);
    }

    #[test]
    fn dense_copy() {
        let dense: Vec<Vec<f32>> = sample().to_dense().unwrap();
        assert_eq!(dense, vec![vec![1.0, 1.0, 0.0], vec![0.0, 2.0, 1.0]]);
    }

    #[test]
    fn display_lists_rows() {
        let text = sample().to_string();
        assert!(text.contains("2 documents x 3 features"));
        assert!(text.contains("second: cat=2 dog=1"));
    }

    #[test]
    fn serde_roundtrip_json() {
        let m = sample();
        let json = serde_json::to_string(&m).unwrap();
        let back: PrunedMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn deserialize_rejects_broken_layout() {
        let good = serde_json::to_value(sample()).unwrap();
        let broken = [
            ("indptr", serde_json::json!([0])),
            ("indptr", serde_json::json!([0, 5, 4])),
            ("indptr", serde_json::json!([1, 2, 4])),
            ("counts", serde_json::json!([1, 1, 2])),
            ("indices", serde_json::json!([0, 1, 1, 7])),
            ("indices", serde_json::json!([1, 0, 1, 2])),
            ("counts", serde_json::json!([1, 0, 2, 1])),
            ("n_unigrams", serde_json::json!(4)),
            ("failed_rows", serde_json::json!([2])),
        ];
        for (field, value) in broken {
            let mut json = good.clone();
            json[field] = value.clone();
            let parsed: Result<PrunedMatrix, _> = serde_json::from_value(json);
            assert!(parsed.is_err(), "{field} = {value} was accepted");
        }
    }
}

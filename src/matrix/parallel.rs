use rayon::prelude::*;
use tracing::debug;

use crate::analysis::stemmer::Stemmer;
use crate::document::Document;
use crate::error::Result;
use crate::matrix::accumulator::SparseAccumulator;
use crate::matrix::builder::TermMatrixBuilder;
use crate::matrix::frequency::GramFrequency;
use crate::matrix::pruned::PrunedMatrix;

/// Parallel ingestion on the rayon pool
impl<'s, S> TermMatrixBuilder<'s, S>
where
    S: Stemmer + Sync,
{
    /// Same result as [`build`](TermMatrixBuilder::build), with documents
    /// normalized, tokenized and counted in parallel.
    ///
    /// Each worker produces a [`GramFrequency`] per document. The partial
    /// counts are merged in input order into one accumulator, so column
    /// order is the one a sequential pass would produce, whatever order the
    /// workers finish in.
    pub fn build_par(&self, documents: &[Document<'_>]) -> Result<PrunedMatrix> {
        let span = tracing::debug_span!(
            "build_term_matrix_par",
            documents = documents.len(),
            threads = rayon::current_num_threads()
        );
        let _guard = span.enter();

        let adapter = self.adapter();
        let normalizer = self.options.normalizer();

        let partials: Vec<Result<GramFrequency>> = documents
            .par_iter()
            .enumerate()
            .map(|(index, doc)| {
                let mut freq = GramFrequency::new();
                self.stream_document(&adapter, &normalizer, index, doc, |gram| {
                    freq.add_gram(gram);
                })?;
                Ok(freq)
            })
            .collect();

        let mut acc = SparseAccumulator::new();
        for (index, (doc, partial)) in documents.iter().zip(partials).enumerate() {
            let row = acc.push_row(doc.label(index));
            let outcome = partial.map(|freq| acc.observe_frequency(row, &freq));
            self.settle(&mut acc, row, outcome)?;
        }

        debug!(
            documents = acc.n_rows(),
            vocabulary = acc.vocabulary().len(),
            nnz = acc.nnz(),
            "partial counts merged"
        );
        Ok(acc.finalize(self.options.min_count))
    }
}

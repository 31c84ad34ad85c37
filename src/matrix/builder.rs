use tracing::{debug, trace, warn};

use crate::analysis::ngram::{Gram, NgramAssembler};
use crate::analysis::normalizer::Normalizer;
use crate::analysis::stemmer::{StemmerAdapter, Stemmer, StopWords};
use crate::analysis::tokenizer::tokenize;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::matrix::accumulator::SparseAccumulator;
use crate::matrix::options::{BuildOptions, EncodingPolicy};
use crate::matrix::pruned::PrunedMatrix;

/// Term-matrix builder
/// Holds the stop words, the stemmer and the options of a build,
/// and streams documents through
/// normalize -> tokenize -> stem/filter -> n-grams -> accumulate.
///
/// A builder can run any number of builds; each build owns a fresh
/// vocabulary and accumulator.
///
/// # Examples
/// ```
/// use term_matrix::{BuildOptions, IdentityStemmer, StopWords, TermMatrixBuilder};
/// let stop: StopWords = ["the"].into_iter().collect();
/// let builder = TermMatrixBuilder::new(&stop, IdentityStemmer, BuildOptions::new().min_count(1));
/// let m = builder.build(["The cat", "the dog"]).unwrap();
/// assert_eq!(m.col_labels().collect::<Vec<_>>(), vec!["cat", "dog"]);
/// ```
pub struct TermMatrixBuilder<'s, S> {
    pub(crate) stopwords: &'s StopWords,
    pub(crate) stemmer: S,
    pub(crate) options: BuildOptions,
}

impl<'s, S: Stemmer> TermMatrixBuilder<'s, S> {
    /// Create a builder. `BuildOptions` cannot hold an invalid combination,
    /// so only documents can make a build fail.
    pub fn new(stopwords: &'s StopWords, stemmer: S, options: BuildOptions) -> Self {
        Self {
            stopwords,
            stemmer,
            options,
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub(crate) fn adapter(&self) -> StemmerAdapter<'s, &S> {
        StemmerAdapter::new(&self.stemmer, self.stopwords, self.options.stem_order_policy)
            .with_drops(self.options.drop_punctuation, self.options.drop_numbers)
    }

    /// Run one document through the pipeline and hand every gram to `sink`.
    /// Nothing is buffered: grams are produced and consumed one at a time.
    ///
    /// # Returns
    /// * `Result<usize>` - number of grams emitted
    pub(crate) fn stream_document<F>(
        &self,
        adapter: &StemmerAdapter<'_, &S>,
        normalizer: &Normalizer,
        index: usize,
        doc: &Document<'_>,
        mut sink: F,
    ) -> Result<usize>
    where
        F: FnMut(&Gram),
    {
        let text = normalizer.normalize_bytes(index, doc.bytes())?;
        let classified = tokenize(&text).map(|token| adapter.classify(&token));
        let mut grams = 0usize;
        for gram in NgramAssembler::new(classified, self.options.ngram_orders) {
            sink(&gram);
            grams += 1;
        }
        trace!(document = index, grams, "document streamed");
        Ok(grams)
    }

    /// Apply the encoding policy to the outcome of one document.
    pub(crate) fn settle(
        &self,
        acc: &mut SparseAccumulator,
        row: usize,
        outcome: Result<()>,
    ) -> Result<()> {
        match outcome {
            Ok(()) => Ok(()),
            Err(err @ Error::Encoding { .. })
                if self.options.on_encoding_error == EncodingPolicy::Skip =>
            {
                warn!(document = row, error = %err, "skipping undecodable document");
                acc.mark_failed(row);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Build the pruned matrix of `documents`, one streaming pass per document.
    ///
    /// Rows follow input order. Columns follow first sight (unigrams before
    /// bigrams) and survive when their total count reaches `min_count`.
    pub fn build<'d, I, D>(&self, documents: I) -> Result<PrunedMatrix>
    where
        I: IntoIterator<Item = D>,
        D: Into<Document<'d>>,
    {
        let span = tracing::debug_span!(
            "build_term_matrix",
            policy = ?self.options.stem_order_policy,
            min_count = self.options.min_count
        );
        let _guard = span.enter();

        let adapter = self.adapter();
        let normalizer = self.options.normalizer();
        let mut acc = SparseAccumulator::new();

        for (index, doc) in documents.into_iter().enumerate() {
            let doc: Document<'d> = doc.into();
            let row = acc.push_row(doc.label(index));
            let outcome = self
                .stream_document(&adapter, &normalizer, index, &doc, |gram| {
                    acc.observe(row, gram)
                })
                .map(|_| ());
            self.settle(&mut acc, row, outcome)?;
        }

        debug!(
            documents = acc.n_rows(),
            vocabulary = acc.vocabulary().len(),
            nnz = acc.nnz(),
            "documents accumulated"
        );
        Ok(acc.finalize(self.options.min_count))
    }
}

/// Build a pruned document-term matrix in one call.
///
/// # Arguments
/// * `documents` - input documents (`&str`, `String` or [`Document`])
/// * `stopwords` - lowercase, unstemmed stop words
/// * `stemmer` - stemming capability ([`IdentityStemmer`](crate::IdentityStemmer) for none)
/// * `options` - build options
pub fn build_term_matrix<'d, I, D, S>(
    documents: I,
    stopwords: &StopWords,
    stemmer: S,
    options: BuildOptions,
) -> Result<PrunedMatrix>
where
    I: IntoIterator<Item = D>,
    D: Into<Document<'d>>,
    S: Stemmer,
{
    TermMatrixBuilder::new(stopwords, stemmer, options).build(documents)
}

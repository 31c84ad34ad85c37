use thiserror::Error;

/// Errors surfaced by a term-matrix build.
#[derive(Debug, Error)]
pub enum Error {
    /// Options or a serialized matrix failed to load.
    /// Raised before any document is processed.
    #[error("invalid option `{option}`: {reason}")]
    Configuration {
        option: &'static str,
        reason: String,
    },

    /// A document could not be decoded as UTF-8 text.
    #[error("document {index} is not valid UTF-8: {source}")]
    Encoding {
        /// zero-based position of the document in the input
        index: usize,
        #[source]
        source: std::str::Utf8Error,
    },
}

impl Error {
    pub(crate) fn config(option: &'static str, reason: impl Into<String>) -> Self {
        Error::Configuration {
            option,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

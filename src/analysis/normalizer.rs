use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Case folding applied by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseFold {
    /// keep the input casing
    None,
    /// fold `A-Z` only; locale invariant
    Ascii,
    /// full `char::to_lowercase`; one char may expand into several
    #[default]
    Unicode,
}

/// Turns raw document text into the canonical character stream the tokenizer scans.
///
/// Pure: holds only its configuration and can be shared freely between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    pub case_fold: CaseFold,
    /// remove control characters (except whitespace) and invisible format characters
    pub strip_invisible: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            case_fold: CaseFold::Unicode,
            strip_invisible: true,
        }
    }
}

/// Characters no token class accepts.
/// Whitespace controls (`\t`, `\n`, `\r`...) are separators and always pass.
#[inline]
fn is_invisible(c: char) -> bool {
    if c.is_whitespace() {
        return false;
    }
    c.is_control()
        || matches!(
            c,
            '\u{00AD}' | '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}'
        )
}

impl Normalizer {
    pub fn new(case_fold: CaseFold, strip_invisible: bool) -> Self {
        Self {
            case_fold,
            strip_invisible,
        }
    }

    /// Normalize text.
    /// Borrows the input when it is already canonical.
    pub fn normalize<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        if self.is_canonical(raw) {
            return Cow::Borrowed(raw);
        }
        let mut out = String::with_capacity(raw.len());
        for c in raw.chars() {
            if self.strip_invisible && is_invisible(c) {
                continue;
            }
            match self.case_fold {
                CaseFold::None => out.push(c),
                CaseFold::Ascii => out.push(c.to_ascii_lowercase()),
                CaseFold::Unicode => out.extend(c.to_lowercase()),
            }
        }
        Cow::Owned(out)
    }

    /// Decode raw bytes strictly as UTF-8 and normalize.
    ///
    /// # Arguments
    /// * `index` - position of the document, reported in the error
    pub fn normalize_bytes<'a>(&self, index: usize, raw: &'a [u8]) -> Result<Cow<'a, str>> {
        let text = std::str::from_utf8(raw).map_err(|source| Error::Encoding { index, source })?;
        Ok(self.normalize(text))
    }

    fn is_canonical(&self, raw: &str) -> bool {
        raw.chars().all(|c| {
            let visible = !(self.strip_invisible && is_invisible(c));
            let folded = match self.case_fold {
                CaseFold::None => true,
                CaseFold::Ascii => !c.is_ascii_uppercase(),
                CaseFold::Unicode => {
                    let mut lower = c.to_lowercase();
                    lower.next() == Some(c) && lower.next().is_none()
                }
            };
            visible && folded
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_case_and_keeps_punctuation() {
        let n = Normalizer::default();
        assert_eq!(n.normalize("Above Ground."), "above ground.");
    }

    #[test]
    fn canonical_input_is_borrowed() {
        let n = Normalizer::default();
        assert!(matches!(n.normalize("already lower, 42!"), Cow::Borrowed(_)));
        assert!(matches!(n.normalize("Not lower"), Cow::Owned(_)));
    }

    #[test]
    fn ascii_folding_leaves_non_ascii_alone() {
        let n = Normalizer::new(CaseFold::Ascii, true);
        assert_eq!(n.normalize("ÉCOLE Rust"), "École rust");
        let n = Normalizer::new(CaseFold::Unicode, true);
        assert_eq!(n.normalize("ÉCOLE Rust"), "école rust");
    }

    #[test]
    fn no_folding() {
        let n = Normalizer::new(CaseFold::None, true);
        assert_eq!(n.normalize("MiXeD"), "MiXeD");
    }

    #[test]
    fn strips_invisible_but_not_whitespace() {
        let n = Normalizer::default();
        assert_eq!(n.normalize("co\u{00AD}op\u{200B}\tnext\u{0007}\n"), "coop\tnext\n");
        let keep = Normalizer::new(CaseFold::None, false);
        assert_eq!(keep.normalize("a\u{200B}b"), "a\u{200B}b");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(Normalizer::default().normalize(""), "");
    }

    #[test]
    fn invalid_utf8_reports_index() {
        let n = Normalizer::default();
        let err = n.normalize_bytes(2, &[b'a', 0xc3, 0x28]).unwrap_err();
        match err {
            Error::Encoding { index, .. } => assert_eq!(index, 2),
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(n.normalize_bytes(0, "Ok".as_bytes()).unwrap(), "ok");
    }
}

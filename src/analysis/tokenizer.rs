use unicode_normalization::char::is_combining_mark;

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// alphanumeric run containing at least one letter (`word1` included);
    /// combining marks inside the run belong to it
    Word,
    /// alphanumeric run made only of digits
    Number,
    Punctuation,
    Whitespace,
}

/// A slice of the canonical text with its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub kind: TokenKind,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Alnum,
    Space,
    Other,
}

#[inline]
fn char_class(c: char) -> CharClass {
    if c.is_alphanumeric() {
        CharClass::Alnum
    } else if c.is_whitespace() {
        CharClass::Space
    } else {
        CharClass::Other
    }
}

/// Lazy maximal-munch tokenizer.
///
/// Each token is the longest run of characters sharing one class; a
/// combining mark continues an alphanumeric run. Scans
/// left to right once; never backtracks.
///
/// # Examples
/// ```
/// use term_matrix::analysis::tokenizer::{tokenize, TokenKind};
/// let kinds: Vec<TokenKind> = tokenize("hi, 42").map(|t| t.kind).collect();
/// assert_eq!(kinds, vec![TokenKind::Word, TokenKind::Punctuation, TokenKind::Whitespace, TokenKind::Number]);
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    text: &'a str,
    pos: usize,
}

pub fn tokenize(text: &str) -> Tokenizer<'_> {
    Tokenizer::new(text)
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.text[self.pos..];
        let mut chars = rest.char_indices();
        let (_, first) = chars.next()?;
        let class = char_class(first);
        let mut has_alpha = first.is_alphabetic();
        let mut end = rest.len();
        for (i, c) in chars {
            // combining marks stay with the word they decorate
            let continues = char_class(c) == class
                || (class == CharClass::Alnum && is_combining_mark(c));
            if !continues {
                end = i;
                break;
            }
            has_alpha |= c.is_alphabetic();
        }
        let text = &rest[..end];
        self.pos += end;
        let kind = match class {
            CharClass::Alnum if has_alpha => TokenKind::Word,
            CharClass::Alnum => TokenKind::Number,
            CharClass::Space => TokenKind::Whitespace,
            CharClass::Other => TokenKind::Punctuation,
        };
        Some(Token { text, kind })
    }
}

impl std::iter::FusedIterator for Tokenizer<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(text: &str) -> Vec<(&str, TokenKind)> {
        tokenize(text).map(|t| (t.text, t.kind)).collect()
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(tokenize("").next().is_none());
    }

    #[test]
    fn classifies_runs() {
        use TokenKind::*;
        assert_eq!(
            pairs("word1. word2"),
            vec![
                ("word1", Word),
                (".", Punctuation),
                (" ", Whitespace),
                ("word2", Word),
            ]
        );
        assert_eq!(
            pairs("in 2024...  (cats)"),
            vec![
                ("in", Word),
                (" ", Whitespace),
                ("2024", Number),
                ("...", Punctuation),
                ("  ", Whitespace),
                ("(", Punctuation),
                ("cats", Word),
                (")", Punctuation),
            ]
        );
    }

    #[test]
    fn tokens_cover_the_input() {
        let text = "don't stop — über 3x\tnow\n";
        let joined: String = tokenize(text).map(|t| t.text).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn combining_marks_stay_in_words() {
        use TokenKind::*;
        let dotted = "İstanbul".to_lowercase();
        assert_eq!(pairs(&dotted), vec![(dotted.as_str(), Word)]);
        assert_eq!(
            pairs("cafe\u{301} au"),
            vec![("cafe\u{301}", Word), (" ", Whitespace), ("au", Word)]
        );
        assert_eq!(pairs(" \u{301}"), vec![(" ", Whitespace), ("\u{301}", Punctuation)]);
    }

    #[test]
    fn restart_gives_same_sequence() {
        let text = "a b, c";
        assert_eq!(pairs(text), pairs(text));
    }
}

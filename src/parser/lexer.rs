/// `Lexer` - Splits configuration text into words, punctuation and quoted literals
///
/// Both input formats share this tokenizer. A [`Dialect`] picks the comment
/// marker, the characters that count as part of a word on top of ASCII
/// alphanumerics and `_`, and the clean-ups applied to each token.
use std::iter::Peekable;
use std::str::Chars;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, ScanError};

/// Newline plus the indentation that follows it inside a token
static CONTINUATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*").unwrap());

/// The quote character every namelist literal is normalized to
const CANONICAL_QUOTE: &str = "'";

/// Lexical settings for one input format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    /// Starts a comment that runs to end of line
    pub comment_marker: char,
    /// Characters treated as word characters in addition to `[A-Za-z0-9_]`
    pub extra_word_chars: &'static str,
    /// Rewrite a leading/trailing `"` to `'`
    pub normalize_quotes: bool,
    /// Drop embedded newlines and the indentation following them
    pub collapse_continuations: bool,
}

impl Dialect {
    /// `MOM_parameter_doc` files: `%` is part of a word so scope markers stay attached.
    pub const PARAMETER_DOC: Dialect = Dialect {
        comment_marker: '!',
        extra_word_chars: ".+-%",
        normalize_quotes: false,
        collapse_continuations: false,
    };

    /// Fortran namelists: `&` is part of a word so `&name` is one token.
    pub const NAMELIST: Dialect = Dialect {
        comment_marker: '!',
        extra_word_chars: ".+-&",
        normalize_quotes: true,
        collapse_continuations: true,
    };

    fn is_word_char(&self, c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_' || self.extra_word_chars.contains(c)
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}

/// A token and the (1-based) line it started on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub line: usize,
}

impl Token {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Lazy token stream over a borrowed text
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    dialect: Dialect,
    label: &'a str,
    line: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new `Lexer`
    ///
    /// # Arguments
    /// * `text` - Source text
    /// * `dialect` - Lexical settings
    /// * `label` - Source label used in error messages
    #[must_use]
    pub fn new(text: &'a str, dialect: Dialect, label: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            dialect,
            label,
            line: 1,
        }
    }

    fn skip_comment(&mut self) {
        for c in self.chars.by_ref() {
            if c == '\n' {
                self.line += 1;
                break;
            }
        }
    }

    /// Quote characters inside a word are kept as part of it
    fn read_word(&mut self, first: char) -> String {
        let mut word = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if self.dialect.is_word_char(c) || is_quote(c) {
                word.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        word
    }

    fn read_quoted(&mut self, quote: char, start_line: usize) -> Result<String> {
        let mut literal = String::from(quote);
        loop {
            let Some(c) = self.chars.next() else {
                return Err(ScanError::UnterminatedQuote {
                    label: self.label.to_string(),
                    line: start_line,
                });
            };
            if c == '\n' {
                self.line += 1;
            }
            literal.push(c);
            if c == quote {
                return Ok(literal);
            }
        }
    }

    fn finish(&self, mut text: String) -> String {
        if self.dialect.collapse_continuations && text.contains('\n') {
            text = CONTINUATION_RE.replace_all(&text, "").into_owned();
        }
        if self.dialect.normalize_quotes {
            if text.starts_with('"') {
                text.replace_range(..1, CANONICAL_QUOTE);
            }
            if text.ends_with('"') {
                let last = text.len() - 1;
                text.replace_range(last.., CANONICAL_QUOTE);
            }
        }
        text
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let c = self.chars.next()?;
            if c == '\n' {
                self.line += 1;
                continue;
            }
            if is_whitespace(c) {
                continue;
            }
            if c == self.dialect.comment_marker {
                self.skip_comment();
                continue;
            }

            let line = self.line;
            let raw = if self.dialect.is_word_char(c) {
                self.read_word(c)
            } else if is_quote(c) {
                match self.read_quoted(c, line) {
                    Ok(literal) => literal,
                    Err(e) => return Some(Err(e)),
                }
            } else {
                c.to_string()
            };
            return Some(Ok(Token {
                text: self.finish(raw),
                line,
            }));
        }
    }
}

/// Tokenize a whole text eagerly (used by tests and debugging output)
pub fn tokenize(text: &str, dialect: Dialect) -> Result<Vec<String>> {
    Lexer::new(text, dialect, "<text>")
        .map(|t| t.map(|t| t.text))
        .collect()
}

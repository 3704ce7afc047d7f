//! On-demand tokenizer with a single token of lookahead.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

/// A single token of the language. Only identifiers carry their text.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Token {
    EndOfFile,
    StartOfFile,
    Backslash,
    Dot,
    Identifier(String),
    NewLine,
    LeftParen,
    RightParen,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Identifier(token_text) => {
                return write!(f, "Identifier({})", token_text);
            }
            Token::EndOfFile => return write!(f, "EndOfFile"),
            Token::StartOfFile => return write!(f, "StartOfFile"),
            Token::Backslash => return write!(f, "Backslash"),
            Token::Dot => return write!(f, "Dot"),
            Token::NewLine => return write!(f, "NewLine"),
            Token::LeftParen => return write!(f, "LeftParen"),
            Token::RightParen => return write!(f, "RightParen"),
        }
    }
}

/// Raised when the scanner meets a character that cannot begin any token.
/// There is no recovering from this for the current input.
#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum LexicalError {
    #[error("unhandled character {character:?} in source text")]
    UnhandledCharacter { character: char },
}

// Identifiers are maximal runs of printable, non-whitespace characters that
// are not one of the single-character tokens.
lazy_static! {
    static ref IDENTIFIER_REGEX: Regex = Regex::new(r"^[^\s\p{C}\\.()]+")
        .expect("Unable to compile Identifier rule regex.");
}

/// Turns source text into tokens lazily. `peek` shows the current lookahead
/// and `advance` scans the next one.
#[derive(Debug)]
pub struct Tokenizer<'a> {
    source: &'a str,
    curr_idx: usize,
    peek_token: Token,
}

impl<'a> Tokenizer<'a> {
    /// Creates a tokenizer positioned before the first real token. The
    /// lookahead is `Token::StartOfFile` until the first `advance`.
    pub fn new(source: &'a str) -> Self {
        return Tokenizer {
            source,
            curr_idx: 0,
            peek_token: Token::StartOfFile,
        };
    }

    /// The current lookahead token.
    pub fn peek(&self) -> &Token {
        return &self.peek_token;
    }

    /// Consumes the current lookahead and scans the one after it. Once the
    /// end of input is reached the lookahead stays `Token::EndOfFile`.
    pub fn advance(&mut self) -> Result<(), LexicalError> {
        if self.peek_token == Token::EndOfFile {
            return Ok(());
        }

        self.skip_space();

        let source: &'a str = self.source;
        let remaining = &source[self.curr_idx..];

        let next_token = match remaining.chars().next() {
            None => Token::EndOfFile,
            Some('\n') => self.single_char_token(Token::NewLine),
            Some('\\') => self.single_char_token(Token::Backslash),
            Some('.') => self.single_char_token(Token::Dot),
            Some('(') => self.single_char_token(Token::LeftParen),
            Some(')') => self.single_char_token(Token::RightParen),
            Some(character) => match IDENTIFIER_REGEX.find(remaining) {
                Some(match_obj) => {
                    self.curr_idx += match_obj.end();
                    Token::Identifier(String::from(match_obj.as_str()))
                }
                None => {
                    return Err(LexicalError::UnhandledCharacter { character });
                }
            },
        };

        trace!(token = %next_token, "scanned token");

        self.peek_token = next_token;
        return Ok(());
    }

    // Consumes one ASCII character and yields the given token.
    fn single_char_token(&mut self, token: Token) -> Token {
        self.curr_idx += 1;
        return token;
    }

    // Skips spaces, tabs and carriage returns. Newlines are tokens and are
    // left alone.
    fn skip_space(&mut self) {
        let skipped = self.source[self.curr_idx..]
            .bytes()
            .take_while(|byte| matches!(byte, b' ' | b'\t' | b'\r'))
            .count();

        self.curr_idx += skipped;
    }
}

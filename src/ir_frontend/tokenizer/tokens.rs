use crate::ir_frontend::compiler_errors::ErrorLocation;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, PartialOrd, Ord)]
pub struct CharPosition {
    pub line_number: i32,
    pub char_column: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TextLocation {
    pub start_pos: CharPosition,
    pub end_pos: CharPosition,
}

impl TextLocation {
    pub fn new(start: CharPosition, end: CharPosition) -> Self {
        Self {
            start_pos: start,
            end_pos: end,
        }
    }

    pub fn new_just_line(line: i32) -> Self {
        Self {
            start_pos: CharPosition {
                line_number: line,
                char_column: 0,
            },
            end_pos: CharPosition {
                line_number: line,
                char_column: 120, // Arbitrary number
            },
        }
    }

    pub fn to_error_location(self, scope: &Path) -> ErrorLocation {
        ErrorLocation {
            scope: scope.to_path_buf(),
            start_pos: self.start_pos,
            end_pos: self.end_pos,
        }
    }

    /// One-based line for humans
    pub fn display_line(&self) -> i32 {
        self.start_pos.line_number + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Words without a sigil: keywords, type names, labels, flags
    Reserved(String),

    // @name
    GlobalId(String),

    // %name
    LocalId(String),

    // -?[0-9]+ (kept as text, the parser decides how wide it is)
    Digits(String),

    // #0 attribute group references
    GroupNum(String),

    Equal,
    Comma,
    Colon,
    Asterisk,
    LeftRound,
    RightRound,
    LeftCurly,
    RightCurly,

    Eof,
}

impl TokenKind {
    pub fn is_reserved(&self, word: &str) -> bool {
        matches!(self, TokenKind::Reserved(value) if value == word)
    }

    /// Short description used in "expected X, found Y" messages
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Reserved(word) => format!("'{word}'"),
            TokenKind::GlobalId(name) => format!("global '@{name}'"),
            TokenKind::LocalId(name) => format!("local '%{name}'"),
            TokenKind::Digits(digits) => format!("number '{digits}'"),
            TokenKind::GroupNum(group) => format!("attribute group '#{group}'"),
            TokenKind::Equal => String::from("'='"),
            TokenKind::Comma => String::from("','"),
            TokenKind::Colon => String::from("':'"),
            TokenKind::Asterisk => String::from("'*'"),
            TokenKind::LeftRound => String::from("'('"),
            TokenKind::RightRound => String::from("')'"),
            TokenKind::LeftCurly => String::from("'{'"),
            TokenKind::RightCurly => String::from("'}'"),
            TokenKind::Eof => String::from("end of file"),
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.describe())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: TextLocation,
}

impl Token {
    pub fn new(kind: TokenKind, location: TextLocation) -> Self {
        Token { kind, location }
    }
}

/// All tokens of one source file plus a cursor the parser walks forward.
#[derive(Debug)]
pub struct FileTokens {
    pub tokens: Vec<Token>,
    pub index: usize,
    pub length: usize,
}

impl FileTokens {
    pub fn new(tokens: Vec<Token>) -> FileTokens {
        let length = tokens.len();
        FileTokens {
            tokens,
            index: 0,
            length,
        }
    }

    pub fn current_token_kind(&self) -> &TokenKind {
        self.peek_kind(0)
    }

    pub fn current_location(&self) -> TextLocation {
        match self.tokens.get(self.index) {
            Some(token) => token.location,
            None => self
                .tokens
                .last()
                .map(|token| token.location)
                .unwrap_or_default(),
        }
    }

    /// Looks `offset` tokens ahead. Runs past the end resolve to the final Eof token.
    pub fn peek_kind(&self, offset: usize) -> &TokenKind {
        match self.tokens.get(self.index + offset) {
            Some(token) => &token.kind,
            None => &TokenKind::Eof,
        }
    }

    pub fn advance(&mut self) -> Token {
        let token = match self.tokens.get(self.index) {
            Some(token) => token.clone(),
            None => Token::new(TokenKind::Eof, self.current_location()),
        };

        if self.index < self.length {
            self.index += 1;
        }

        token
    }
}

pub struct TokenStream<'a> {
    pub chars: Peekable<Chars<'a>>,
    pub position: CharPosition,
    pub start_position: CharPosition,
}

impl<'a> TokenStream<'a> {
    pub fn new(source_code: &'a str) -> Self {
        Self {
            chars: source_code.chars().peekable(),
            position: CharPosition::default(),
            start_position: CharPosition::default(),
        }
    }

    pub fn next(&mut self) -> Option<char> {
        let next = self.chars.next();

        if let Some(ch) = next {
            if ch == '\n' {
                self.position.line_number += 1;
                self.position.char_column = 0;
            } else {
                self.position.char_column += 1;
            }
        }

        next
    }

    pub fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    pub fn new_location(&mut self) -> TextLocation {
        TextLocation::new(self.start_position, self.position)
    }

    pub fn update_start_position(&mut self) {
        self.start_position = self.position;
    }

    /// Drops everything up to and including the next newline
    pub fn skip_line(&mut self) {
        while let Some(ch) = self.next() {
            if ch == '\n' {
                break;
            }
        }
    }

    pub fn skip_to_end(&mut self) {
        while self.next().is_some() {}
    }
}

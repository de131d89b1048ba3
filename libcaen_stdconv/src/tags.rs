//! Parsing of BORE tag values.
//!
//! The producer writes every tag with Python's `repr`, so the values this
//! module has to accept are a small subset of Python literals: integers,
//! quoted strings (single or double quotes) and arbitrarily nested lists of
//! those, e.g. `1024`, `'DUT one'` or `[['CH4', 'CH5'], ['CH6', 'CH7']]`.
//! One parser handles all of them instead of ad-hoc splitting per tag.

use std::fmt;

use super::error::TagError;

/// A parsed tag value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Str(String),
    List(Vec<Literal>),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(value) => write!(f, "{value}"),
            Literal::Str(value) => write!(f, "'{value}'"),
            Literal::List(items) => {
                write!(f, "[")?;
                for (n, item) in items.iter().enumerate() {
                    if n != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

struct Parser {
    chars: Vec<char>,
    position: usize,
}

impl Parser {
    fn new(value: &str) -> Self {
        Self {
            chars: value.chars().collect(),
            position: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.position += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.position += 1;
        }
    }

    fn parse_value(&mut self) -> Result<Literal, TagError> {
        match self.peek() {
            None => Err(TagError::Empty),
            Some('[') => self.parse_list(),
            Some(quote) if quote == '\'' || quote == '"' => self.parse_string(quote),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' => self.parse_int(),
            Some(c) => Err(TagError::UnexpectedCharacter(c, self.position)),
        }
    }

    fn parse_list(&mut self) -> Result<Literal, TagError> {
        let start = self.position;
        self.advance(); // Consume the [
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(']') => {
                    self.advance();
                    return Ok(Literal::List(items));
                }
                Some(',') if !items.is_empty() => {
                    self.advance();
                    self.skip_whitespace();
                    items.push(self.parse_value()?);
                }
                Some(_) if items.is_empty() => {
                    items.push(self.parse_value()?);
                }
                Some(c) => return Err(TagError::UnexpectedCharacter(c, self.position)),
                None => return Err(TagError::UnterminatedList(start)),
            }
        }
    }

    fn parse_string(&mut self, quote: char) -> Result<Literal, TagError> {
        let start = self.position;
        self.advance(); // Consume the opening quote
        let mut value = String::new();
        loop {
            match self.advance() {
                Some(c) if c == quote => return Ok(Literal::Str(value)),
                Some(c) => value.push(c),
                None => return Err(TagError::UnterminatedString(start)),
            }
        }
    }

    fn parse_int(&mut self) -> Result<Literal, TagError> {
        let start = self.position;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.advance();
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        let text: String = self.chars[start..self.position].iter().collect();
        text.parse::<i64>()
            .map(Literal::Int)
            .map_err(|_| TagError::NotAnInteger(text))
    }
}

/// Parse a complete tag value into a [`Literal`].
///
/// The whole value must be consumed; `"[1] junk"` is an error.
pub fn parse_literal(value: &str) -> Result<Literal, TagError> {
    let mut parser = Parser::new(value);
    parser.skip_whitespace();
    if parser.peek().is_none() {
        return Err(TagError::Empty);
    }
    let literal = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.peek().is_some() {
        return Err(TagError::TrailingData(parser.position));
    }
    Ok(literal)
}

/// Parse an integer tag such as `n_samples_per_waveform`.
///
/// Accepts either a bare integer or a quoted one, since tags written by hand
/// in config files sometimes carry quotes.
pub fn parse_int(value: &str) -> Result<i64, TagError> {
    match parse_literal(value)? {
        Literal::Int(n) => Ok(n),
        Literal::Str(s) => s.trim().parse().map_err(|_| TagError::NotAnInteger(s)),
        other => Err(TagError::NotAnInteger(other.to_string())),
    }
}

/// Parse a string tag such as `DUT_0_name`.
///
/// Quoted values lose their quotes; unquoted values are taken verbatim
/// (trimmed), so a tag set without `repr` still round-trips.
pub fn parse_string(value: &str) -> Result<String, TagError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TagError::Empty);
    }
    if trimmed.starts_with('\'') || trimmed.starts_with('"') {
        match parse_literal(trimmed)? {
            Literal::Str(s) => Ok(s),
            other => Err(TagError::NotAString(other.to_string())),
        }
    } else {
        Ok(trimmed.to_string())
    }
}

/// Parse a flat list of strings such as `channels_names_list`.
pub fn parse_string_list(value: &str) -> Result<Vec<String>, TagError> {
    match parse_literal(value)? {
        Literal::List(items) => items
            .into_iter()
            .map(|item| match item {
                Literal::Str(s) => Ok(s),
                other => Err(TagError::NotAString(other.to_string())),
            })
            .collect(),
        other => Err(TagError::NotAList(other.to_string())),
    }
}

/// Parse a nested list of strings such as `DUT_n_channels_matrix`.
pub fn parse_string_matrix(value: &str) -> Result<Vec<Vec<String>>, TagError> {
    match parse_literal(value)? {
        Literal::List(rows) => rows
            .into_iter()
            .map(|row| match row {
                Literal::List(items) => items
                    .into_iter()
                    .map(|item| match item {
                        Literal::Str(s) => Ok(s),
                        other => Err(TagError::NotAString(other.to_string())),
                    })
                    .collect(),
                other => Err(TagError::NotAList(other.to_string())),
            })
            .collect(),
        other => Err(TagError::NotAList(other.to_string())),
    }
}

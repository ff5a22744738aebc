//! Type-annotation grammar.
//!
//! Parses the textual type declaration attached to a model property into a
//! small closed tree. Precedence, outermost first:
//!
//! ```text
//! annotation := member ( '|' member )*
//! member     := '?' member                       // nullable sugar: T|null
//!             | primary ( '[' ']' )*             // array-of sugar
//! primary    := ident
//!             | ident '<' annotation ( ',' annotation )* '>'
//!             | 'array' '{' [ annotation ( ',' annotation )* ] '}'
//! ```
//!
//! Whitespace between tokens is ignored. Multi-argument generics are parsed
//! far enough to be reported, never truncated.
pub mod doc;

use std::fmt;
use thiserror::Error;

// ------------------------------- Types ----------------------------------- //

/// Base name of the only generic the generator understands.
pub const ARRAY: &str = "array";

/// Deepest type nesting (`<`, `{`, `?`, `[]`) a single annotation may use.
pub const MAX_NESTING: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Identifier(String),                              // scalar, class, or enum name
    Generic { base: String, arg: Box<TypeExpr> },    // single argument only
    Union(Vec<TypeExpr>),                            // declared order, no dedup
    Tuple(Vec<TypeExpr>),                            // `array{..}`, may be empty
}

impl TypeExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    /// `T[]` desugars to this.
    pub fn array_of(arg: TypeExpr) -> Self {
        Self::Generic { base: ARRAY.to_string(), arg: Box::new(arg) }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Self::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name) => f.write_str(name),
            Self::Generic { base, arg } => write!(f, "{base}<{arg}>"),
            Self::Union(members) => write_joined(f, members, "|"),
            Self::Tuple(elements) => {
                f.write_str("array{")?;
                write_joined(f, elements, ",")?;
                f.write_str("}")
            }
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, xs: &[TypeExpr], sep: &str) -> fmt::Result {
    for (i, x) in xs.iter().enumerate() {
        if i > 0 { f.write_str(sep)?; }
        write!(f, "{x}")?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty type annotation")]
    Empty,
    #[error("unexpected `{found}` at offset {offset} in `{input}`")]
    Unexpected { input: String, offset: usize, found: char },
    #[error("unexpected end of `{input}`, expected {expected}")]
    UnexpectedEnd { input: String, expected: &'static str },
    #[error("`{base}{{..}}` is not a shape; only `array{{..}}` takes elements")]
    ShapeBase { base: String },
    #[error("generic `{base}` takes one argument, found {count}")]
    TooManyArguments { base: String, count: usize },
    #[error("type nesting deeper than {limit} levels")]
    TooDeep { limit: usize },
}

impl ParseError {
    /// Well-formed text the type system refuses (as opposed to bad syntax).
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::TooManyArguments { .. })
    }
}

// ------------------------------- Parser ---------------------------------- //

/// Parse one property annotation.
pub fn parse(annotation: &str) -> Result<TypeExpr, ParseError> {
    let mut p = Parser {
        input: annotation,
        chars: annotation.char_indices().collect(),
        pos: 0,
        depth: 0,
    };
    p.skip_ws();
    if p.peek().is_none() {
        return Err(ParseError::Empty);
    }
    let expr = p.union()?;
    p.skip_ws();
    match p.peek() {
        None => Ok(expr),
        Some(_) => Err(p.unexpected()),
    }
}

struct Parser<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    depth: usize, // open `member` frames, bounds recursion
}

impl<'a> Parser<'a> {
    fn union(&mut self) -> Result<TypeExpr, ParseError> {
        let mut members = vec![self.member()?];
        while self.eat('|') {
            members.push(self.member()?);
        }
        Ok(match members.len() {
            1 => members.remove(0),
            _ => TypeExpr::Union(members),
        })
    }

    fn member(&mut self) -> Result<TypeExpr, ParseError> {
        self.descend()?;
        let out = self.member_inner();
        self.depth -= 1;
        out
    }

    fn member_inner(&mut self) -> Result<TypeExpr, ParseError> {
        if self.eat('?') {
            let inner = self.member()?;
            return Ok(TypeExpr::Union(vec![inner, TypeExpr::ident("null")]));
        }
        let mut expr = self.primary()?;
        // each `[]` wraps once more; counted so the tree stays as shallow as the limit
        let mut wrapped = 0;
        while self.eat('[') {
            self.expect(']', "`]`")?;
            wrapped += 1;
            if self.depth + wrapped > MAX_NESTING {
                return Err(ParseError::TooDeep { limit: MAX_NESTING });
            }
            expr = TypeExpr::array_of(expr);
        }
        Ok(expr)
    }

    fn descend(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::TooDeep { limit: MAX_NESTING });
        }
        self.depth += 1;
        Ok(())
    }

    fn primary(&mut self) -> Result<TypeExpr, ParseError> {
        let name = self.ident()?;
        if self.eat('<') {
            let mut args = self.list('>')?;
            return match args.len() {
                0 => Err(self.unexpected_at(self.pos.saturating_sub(1))),
                1 => Ok(TypeExpr::Generic { base: name, arg: Box::new(args.remove(0)) }),
                count => Err(ParseError::TooManyArguments { base: name, count }),
            };
        }
        if self.peek_is('{') {
            if !name.eq_ignore_ascii_case(ARRAY) {
                return Err(ParseError::ShapeBase { base: name });
            }
            self.eat('{');
            return Ok(TypeExpr::Tuple(self.list('}')?));
        }
        Ok(TypeExpr::Identifier(name))
    }

    /// Comma-separated annotations up to `close`; the opener is already eaten.
    fn list(&mut self, close: char) -> Result<Vec<TypeExpr>, ParseError> {
        let mut items = Vec::new();
        if self.eat(close) {
            return Ok(items);
        }
        loop {
            items.push(self.union()?);
            if self.eat(',') { continue; }
            let expected = if close == '>' { "`,` or `>`" } else { "`,` or `}`" };
            self.expect(close, expected)?;
            return Ok(items);
        }
    }

    fn ident(&mut self) -> Result<String, ParseError> {
        self.skip_ws();
        let start = self.pos;
        while let Some(c) = self.peek() {
            let interior_dash = c == '-' && self.pos > start;
            if c.is_ascii_alphanumeric() || c == '_' || interior_dash {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return match self.peek() {
                Some(_) => Err(self.unexpected()),
                None => Err(self.end("a type name")),
            };
        }
        let name: String = self.chars[start..self.pos].iter().map(|(_, c)| *c).collect();
        if name.ends_with('-') {
            return Err(self.unexpected_at(self.pos - 1));
        }
        Ok(name)
    }

    // ---- token helpers ----

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn peek_is(&mut self, c: char) -> bool {
        self.skip_ws();
        self.peek() == Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek_is(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char, expected: &'static str) -> Result<(), ParseError> {
        if self.eat(c) {
            return Ok(());
        }
        match self.peek() {
            Some(_) => Err(self.unexpected()),
            None => Err(self.end(expected)),
        }
    }

    fn unexpected(&self) -> ParseError {
        self.unexpected_at(self.pos)
    }

    fn unexpected_at(&self, pos: usize) -> ParseError {
        match self.chars.get(pos) {
            Some(&(offset, found)) => ParseError::Unexpected {
                input: self.input.to_string(),
                offset,
                found,
            },
            None => self.end("a type name"),
        }
    }

    fn end(&self, expected: &'static str) -> ParseError {
        ParseError::UnexpectedEnd { input: self.input.to_string(), expected }
    }
}

// ------------------------------- Tests ------------------------------------ //

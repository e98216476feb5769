//! Provide the recursive-descent parser of model paths.
//!
//! # Grammar
//!
//! ```text
//! path        := WS expr (expr)* WS
//! expr        := attrExpr | indexExpr
//! attrExpr    := ("." )? identifier        ; "." required except for the first expr
//! identifier  := [A-Za-z_][A-Za-z_0-9]*
//! indexExpr   := "[" integer "]"
//! integer     := [0-9]+
//! WS          := ASCII whitespace, zero or more
//! ```
//!
//! Whitespace is only tolerated around the whole path, never between
//! two expressions nor inside the brackets of an index.

use alloc::borrow::Cow;
use alloc::format;
use alloc::vec::Vec;

use crate::{Expr, ExprNode, ParseError};

// -----------------------------------------------------------------------------
// Descriptions

const UNEXPECTED_WHITESPACE: &str = "Unexpected whitespace in middle of path";
const INVALID_NAME_START: &str =
    "Names used to access an attribute must start with a letter or underscore";
const EXPECTED_INTEGER: &str = "Expected a non-negative integer";
const INDEX_OVERFLOW: &str = "Collection index is too large";

// -----------------------------------------------------------------------------
// PathParser

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Running,
    Done,
}

/// A streaming parser over a model path.
///
/// Yields one [`ExprNode`] per expression, in source order. After the first
/// error it yields that error once and then stops.
///
/// # Examples
///
/// ```
/// use vc_path::{Expr, PathParser};
///
/// let exprs: Vec<_> = PathParser::new("reviews[1].title")
///     .map(|res| res.unwrap().expr)
///     .collect();
///
/// assert_eq!(exprs, [
///     Expr::Attribute("reviews".into()),
///     Expr::CollectionItem(1),
///     Expr::Attribute("title".into()),
/// ]);
/// ```
#[derive(Debug, Clone)]
pub struct PathParser<'a> {
    path: &'a str,
    /// Byte position of the cursor.
    pos: usize,
    /// Character position of the cursor.
    offset: usize,
    first: bool,
    state: State,
}

impl<'a> PathParser<'a> {
    /// Creates a parser over `path`.
    #[inline]
    pub const fn new(path: &'a str) -> Self {
        Self {
            path,
            pos: 0,
            offset: 0,
            first: true,
            state: State::Start,
        }
    }

    #[inline]
    fn current(&self) -> Option<char> {
        self.path[self.pos..].chars().next()
    }

    #[inline]
    fn bump(&mut self, c: char) {
        self.pos += c.len_utf8();
        self.offset += 1;
    }

    #[inline]
    fn error(&self, error: impl Into<Cow<'static, str>>) -> ParseError<'a> {
        ParseError::new(self.offset, self.path, error)
    }

    /// Skips whitespace, returns `true` if anything was skipped.
    fn white(&mut self) -> bool {
        let start = self.pos;
        while let Some(c) = self.current() {
            if !c.is_ascii_whitespace() {
                break;
            }
            self.bump(c);
        }
        self.pos != start
    }

    /// Consumes `expected` or fails naming what was found instead.
    fn next_char(&mut self, expected: char) -> Result<(), ParseError<'a>> {
        match self.current() {
            Some(c) if c == expected => {
                self.bump(c);
                Ok(())
            }
            Some(c) => Err(self.error(format!("Expected `{expected}` instead of `{c}`"))),
            None => Err(self.error(format!("Expected `{expected}` instead of end of path"))),
        }
    }

    fn expression(&mut self) -> Result<ExprNode<'a>, ParseError<'a>> {
        match self.current() {
            Some('[') => self.collection_item_access(),
            _ => self.attribute_access(),
        }
    }

    fn collection_item_access(&mut self) -> Result<ExprNode<'a>, ParseError<'a>> {
        let (start, offset) = (self.pos, self.offset);
        self.next_char('[')?;
        let index = self.integer()?;
        self.next_char(']')?;
        Ok(ExprNode {
            expr: Expr::CollectionItem(index),
            text: Cow::Borrowed(&self.path[start..self.pos]),
            offset,
        })
    }

    fn integer(&mut self) -> Result<usize, ParseError<'a>> {
        let (start, offset) = (self.pos, self.offset);
        while let Some(c) = self.current() {
            if !c.is_ascii_digit() {
                break;
            }
            self.bump(c);
        }
        if self.pos == start {
            return Err(self.error(EXPECTED_INTEGER));
        }
        self.path[start..self.pos]
            .parse::<usize>()
            .map_err(|_| ParseError::new(offset, self.path, INDEX_OVERFLOW))
    }

    fn attribute_access(&mut self) -> Result<ExprNode<'a>, ParseError<'a>> {
        let (start, offset) = (self.pos, self.offset);
        if !self.first {
            self.next_char('.')?;
        }
        let name = self.name()?;
        Ok(ExprNode {
            expr: Expr::Attribute(Cow::Borrowed(name)),
            text: Cow::Borrowed(&self.path[start..self.pos]),
            offset,
        })
    }

    fn name(&mut self) -> Result<&'a str, ParseError<'a>> {
        let start = self.pos;
        match self.current() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => self.bump(c),
            _ => return Err(self.error(INVALID_NAME_START)),
        }
        while let Some(c) = self.current() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            self.bump(c);
        }
        Ok(&self.path[start..self.pos])
    }

    fn step(&mut self) -> Option<Result<ExprNode<'a>, ParseError<'a>>> {
        if self.state == State::Start {
            self.white();
            self.state = State::Running;
        }
        self.current()?;

        let node = match self.expression() {
            Ok(node) => node,
            Err(err) => return Some(Err(err)),
        };

        let offset = self.offset;
        if self.white() && self.current().is_some() {
            return Some(Err(ParseError::new(offset, self.path, UNEXPECTED_WHITESPACE)));
        }

        self.first = false;
        Some(Ok(node))
    }
}

impl<'a> Iterator for PathParser<'a> {
    type Item = Result<ExprNode<'a>, ParseError<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == State::Done {
            return None;
        }
        let res = self.step();
        if !matches!(res, Some(Ok(_))) {
            self.state = State::Done;
        }
        res
    }
}

impl core::iter::FusedIterator for PathParser<'_> {}

// -----------------------------------------------------------------------------
// parse

/// Parses a model path into its sequence of [`ExprNode`]s.
///
/// An empty (or whitespace only) path is valid and yields no node.
///
/// # Examples
///
/// ```
/// use vc_path::{parse, Expr};
///
/// let nodes = parse("  manufacturer.phones[0]").unwrap();
/// assert_eq!(nodes.len(), 3);
/// assert_eq!(nodes[2].expr, Expr::CollectionItem(0));
/// assert_eq!(nodes[1].text, ".phones");
///
/// assert!(parse("manufacturer.").is_err());
/// assert!(parse("").unwrap().is_empty());
/// ```
pub fn parse(path: &str) -> Result<Vec<ExprNode<'_>>, ParseError<'_>> {
    PathParser::new(path).collect()
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{PathParser, parse};
    use crate::{Expr, ParseError};
    use alloc::string::String;
    use alloc::vec::Vec;

    fn exprs(path: &str) -> Vec<Expr<'_>> {
        parse(path).unwrap().into_iter().map(|n| n.expr).collect()
    }

    fn bad(path: &str) -> ParseError<'_> {
        match parse(path) {
            Ok(nodes) => panic!("`{path}` should not parse, got {nodes:?}"),
            Err(err) => err,
        }
    }

    #[test]
    fn empty_path() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("   ").unwrap().is_empty());
    }

    #[test]
    fn single_attribute() {
        assert_eq!(exprs("name"), [Expr::Attribute("name".into())]);
        assert_eq!(exprs("_x9"), [Expr::Attribute("_x9".into())]);
    }

    #[test]
    fn surrounding_whitespace_is_stripped() {
        assert_eq!(exprs("  name"), [Expr::Attribute("name".into())]);
        assert_eq!(exprs("name  "), [Expr::Attribute("name".into())]);
        assert_eq!(exprs("\tname\n"), [Expr::Attribute("name".into())]);
    }

    #[test]
    fn nested_chain() {
        assert_eq!(
            exprs("manufacturer.address.phones[0].number"),
            [
                Expr::Attribute("manufacturer".into()),
                Expr::Attribute("address".into()),
                Expr::Attribute("phones".into()),
                Expr::CollectionItem(0),
                Expr::Attribute("number".into()),
            ]
        );
    }

    #[test]
    fn leading_index() {
        assert_eq!(
            exprs("[1].title"),
            [Expr::CollectionItem(1), Expr::Attribute("title".into())]
        );
        assert_eq!(exprs("[0][2]"), [Expr::CollectionItem(0), Expr::CollectionItem(2)]);
    }

    #[test]
    fn node_text_and_offset() {
        let nodes = parse(" a.bc[12]").unwrap();
        let texts: Vec<_> = nodes.iter().map(|n| (&*n.text, n.offset)).collect();
        assert_eq!(texts, [("a", 1), (".bc", 2), ("[12]", 5)]);
    }

    #[test]
    fn reject_digit_leading_name() {
        let err = bad("9asdf");
        assert_eq!(err.offset, 0);
        assert_eq!(err.error, super::INVALID_NAME_START);
    }

    #[test]
    fn reject_whitespace_in_middle() {
        let err = bad("reviews name");
        assert_eq!(err.offset, 7);
        assert_eq!(err.error, super::UNEXPECTED_WHITESPACE);
        bad("reviews [0]");
        bad("a. b");
    }

    #[test]
    fn reject_letters_in_index() {
        assert_eq!(bad("reviews[asdf]").offset, 8);
        assert_eq!(bad("reviews[0ddf]").offset, 9);
        assert_eq!(bad("reviews[asd0]").offset, 8);
    }

    #[test]
    fn reject_whitespace_in_index() {
        assert_eq!(bad("reviews[  0]").error, super::EXPECTED_INTEGER);
        assert_eq!(bad("reviews[0  ]").offset, 9);
        bad("reviews[ 0 ]");
    }

    #[test]
    fn reject_dots() {
        assert_eq!(bad("manufacturer.").offset, 13);
        assert_eq!(bad(".manufacturer").offset, 0);
        bad("a..b");
        bad("[0].");
    }

    #[test]
    fn reject_missing_separator() {
        let err = bad("a$b");
        assert_eq!(err.offset, 1);
        assert_eq!(err.error, "Expected `.` instead of `$`");
    }

    #[test]
    fn reject_unclosed_index() {
        let err = bad("tags[1");
        assert_eq!(err.offset, 6);
        assert_eq!(err.error, "Expected `]` instead of end of path");
        bad("tags[");
        bad("tags]");
    }

    #[test]
    fn reject_index_overflow() {
        let mut path = String::from("tags[");
        path.push_str("99999999999999999999999999999999");
        path.push(']');
        let err = bad(&path);
        assert_eq!(err.offset, 5);
        assert_eq!(err.error, super::INDEX_OVERFLOW);
    }

    #[test]
    fn offset_counts_characters() {
        let err = bad("é.x");
        assert_eq!(err.offset, 0);
        let err = bad("ab.é");
        assert_eq!(err.offset, 3);
    }

    #[test]
    fn parser_stops_after_error() {
        let mut parser = PathParser::new("a.9.b");
        assert!(parser.next().unwrap().is_ok());
        assert!(parser.next().unwrap().is_err());
        assert!(parser.next().is_none());
        assert!(parser.next().is_none());
    }
}

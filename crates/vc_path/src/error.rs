//! Provide the error type of path parsing.

use alloc::borrow::Cow;
use alloc::string::String;
use core::fmt;

// -----------------------------------------------------------------------------
// ParseError

/// A syntax error found while parsing a model path.
///
/// One fault aborts the whole parse, there is never a partial result.
///
/// # Examples
///
/// ```
/// use vc_path::parse;
///
/// let err = parse("reviews[0x]").unwrap_err();
/// assert_eq!(err.offset, 9);
/// assert_eq!(err.path, "reviews[0x]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError<'a> {
    /// 0-based character offset of the fault in `path`.
    pub offset: usize,
    /// The path that the error occurred in.
    pub path: Cow<'a, str>,
    /// Description of the violated rule.
    pub error: Cow<'static, str>,
}

impl<'a> ParseError<'a> {
    #[inline]
    pub(crate) fn new(offset: usize, path: &'a str, error: impl Into<Cow<'static, str>>) -> Self {
        Self {
            offset,
            path: Cow::Borrowed(path),
            error: error.into(),
        }
    }

    /// Converts this into an "owned" value.
    #[inline]
    pub fn into_owned(self) -> ParseError<'static> {
        ParseError {
            offset: self.offset,
            path: Cow::Owned(String::from(self.path)),
            error: self.error,
        }
    }
}

impl fmt::Display for ParseError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Encountered an error at offset {} while parsing `{}`: {}",
            self.offset, self.path, self.error,
        )
    }
}

impl core::error::Error for ParseError<'_> {}

// -----------------------------------------------------------------------------
// Tests

//! Error types for framing and codec operations.

use std::{error, fmt, io};

use crate::models::value::Value;

/// Unified error type for all codec operations.
///
/// Insufficient input is *not* represented here: a decoder that runs out of
/// bytes mid-frame suspends via `ReadResult::NeedMore`. `Incomplete` only
/// appears when the input is known to be final (end of stream, or a bounded
/// body) and a frame is still unfinished.
#[derive(Debug)]
pub enum CodecError {
    /// I/O failure surfaced through a byte source.
    Io(io::Error),

    /// Input ended while a frame was still being decoded.
    Incomplete,

    /// Decoding finished but unconsumed bytes remain at the top level.
    Residual {
        /// Number of bytes left over.
        remaining: usize,
    },

    /// A literal frame saw a value differing from its constant.
    LiteralMismatch {
        /// The constant the codec expects.
        expected: Value,
        /// The value actually read or written.
        found: Value,
    },

    /// Decoded wire value has no tag in the enumeration.
    UnknownEnumValue(i64),

    /// Tag has no wire value in the enumeration.
    UnknownEnumTag(String),

    /// A finite or delimited body was not consumed exactly.
    BodyOverrun(String),

    /// Unresolvable charset label, or bytes invalid in the declared charset.
    Charset(String),

    /// Value shape incompatible with the codec (arity, missing key, wrong
    /// variant, out-of-range numeric).
    ShapeMismatch(String),

    /// Numeric-string parse failure.
    InvalidNumber(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Io(e) => write!(f, "I/O error: {}", e),
            CodecError::Incomplete => write!(f, "input ended mid-frame"),
            CodecError::Residual { remaining } => {
                write!(f, "{} residual bytes after decoding", remaining)
            }
            CodecError::LiteralMismatch { expected, found } => {
                write!(
                    f,
                    "literal mismatch: expected {:?}, found {:?}",
                    expected, found
                )
            }
            CodecError::UnknownEnumValue(v) => write!(f, "unknown enum wire value: {}", v),
            CodecError::UnknownEnumTag(t) => write!(f, "unknown enum tag: {}", t),
            CodecError::BodyOverrun(s) => write!(f, "body overrun: {}", s),
            CodecError::Charset(s) => write!(f, "charset error: {}", s),
            CodecError::ShapeMismatch(s) => write!(f, "shape mismatch: {}", s),
            CodecError::InvalidNumber(s) => write!(f, "invalid number: {}", s),
        }
    }
}

impl error::Error for CodecError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            CodecError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(e: io::Error) -> Self {
        CodecError::Io(e)
    }
}

//! # Codec Contract
//!
//! Turn in-memory values into wire bytes and a (possibly incrementally
//! arriving) byte sequence back into values.
//!
//! **Why this is useful**
//! - One object-safe trait covers primitives, strings, blocks, and every
//!   combinator; user codecs plug in by implementing the same three methods.
//! - Suspension is *data*, not a blocked task: a decoder that runs out of
//!   bytes returns a [`Resume`] continuation, so decode state can be parked,
//!   moved across threads, or dropped to cancel.
//!
//! Implement [`Codec`] for a custom wire form; compose with [`and_then`] when
//! one decoded value determines how the following bytes are read.

use std::fmt;
use std::sync::Arc;

use bytes::BytesMut;

use crate::enums::ReadResult;
use crate::error::CodecError;
use crate::models::byte_seq::ByteSeq;
use crate::models::value::Value;

/// Shared handle to a compiled codec.
pub type DynCodec = Arc<dyn Codec>;

/// A bidirectional, suspension-aware codec.
///
/// Compiled codecs are immutable and freely shared across threads and across
/// concurrent decodes; all per-decode state lives in the [`Resume`] values a
/// read hands back.
///
/// ### Contract
/// - `read` must never fail on short input: it returns
///   [`ReadResult::NeedMore`] carrying a continuation that picks up exactly
///   where the read stopped once the caller has appended more bytes onto the
///   returned remainder. For any valid encoding, every split of the input
///   decodes to the same value (split-invariance).
/// - `write` appends the encoding to `out` and must not retain references to
///   the value.
/// - `sizeof` returns `Some(n)` only when **every** value this codec encodes
///   occupies exactly `n` bytes.
pub trait Codec: Send + Sync {
    /// Attempt to decode one value from the front of `bs`.
    fn read(&self, bs: ByteSeq) -> Result<ReadResult, CodecError>;

    /// Append the encoding of `value` to `out`.
    fn write(&self, value: &Value, out: &mut BytesMut) -> Result<(), CodecError>;

    /// Exact encoded width shared by all values of this codec, if any.
    fn sizeof(&self) -> Option<usize>;
}

/// A parked decode continuation.
///
/// Feeding it the previous remainder with the next chunk appended continues
/// the decode where it stopped, carrying any partial state (elements decoded
/// so far, scan positions) inside the closure.
pub struct Resume(Box<dyn FnOnce(ByteSeq) -> Result<ReadResult, CodecError> + Send>);

impl Resume {
    /// Wrap a continuation closure.
    pub fn new(
        f: impl FnOnce(ByteSeq) -> Result<ReadResult, CodecError> + Send + 'static,
    ) -> Self {
        Resume(Box::new(f))
    }

    /// A continuation that restarts `codec` from scratch on the grown input.
    /// Correct for codecs that inspect nothing before their byte requirement
    /// is met.
    pub fn codec(codec: DynCodec) -> Self {
        Resume::new(move |bs| codec.read(bs))
    }

    /// Continue the decode with the grown input.
    pub fn run(self, bs: ByteSeq) -> Result<ReadResult, CodecError> {
        (self.0)(bs)
    }
}

impl fmt::Debug for Resume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resume(..)")
    }
}

/// Attach a callback to a read outcome.
///
/// On `Done` the callback runs immediately with the value and remainder; on
/// `NeedMore` the callback is re-attached around the continuation, so it
/// still runs once the suspended read completes. This is the threading
/// primitive every combinator uses to chain child reads.
pub fn and_then<F>(step: ReadResult, f: F) -> Result<ReadResult, CodecError>
where
    F: FnOnce(Value, ByteSeq) -> Result<ReadResult, CodecError> + Send + 'static,
{
    match step {
        ReadResult::Done { value, rest } => f(value, rest),
        ReadResult::NeedMore { resume, rest } => Ok(ReadResult::NeedMore {
            resume: Resume::new(move |bs| and_then(resume.run(bs)?, f)),
            rest,
        }),
    }
}


//! Content-dependent framing.
//!
//! A header codec decodes a leading value and lets it choose the codec for
//! what follows; on write the header is derived from the body value. The
//! decoded result is the body's value alone; the header is wire plumbing.
//!
//! [`Prefix`] is the header specialized to byte counts: its decoded value is
//! the length of the following repetition or region. Integer frames get
//! identity conversions; anything else supplies its own.

use std::fmt;
use std::sync::Arc;

use bytes::BytesMut;

use crate::enums::ReadResult;
use crate::error::CodecError;
use crate::models::byte_seq::ByteSeq;
use crate::models::codecs::literal::LiteralCodec;
use crate::models::frame::{compile, Frame};
use crate::models::value::Value;
use crate::traits::codec::{and_then, Codec, DynCodec};

type BodyFn = dyn Fn(&Value) -> Result<DynCodec, CodecError> + Send + Sync;
type HeadFn = dyn Fn(&Value) -> Result<Value, CodecError> + Send + Sync;

pub struct HeaderCodec {
    head: DynCodec,
    head_to_body: Arc<BodyFn>,
    body_to_head: Arc<HeadFn>,
}

impl Codec for HeaderCodec {
    fn read(&self, bs: ByteSeq) -> Result<ReadResult, CodecError> {
        let head_to_body = Arc::clone(&self.head_to_body);
        and_then(self.head.read(bs)?, move |head, rest| {
            (head_to_body)(&head)?.read(rest)
        })
    }

    fn write(&self, value: &Value, out: &mut BytesMut) -> Result<(), CodecError> {
        let head = (self.body_to_head)(value)?;
        let body = (self.head_to_body)(&head)?;
        if let (Some(h), Some(b)) = (self.head.sizeof(), body.sizeof()) {
            out.reserve(h + b);
        }
        self.head.write(&head, out)?;
        body.write(value, out)
    }

    fn sizeof(&self) -> Option<usize> {
        // The body codec varies with the header value.
        None
    }
}

/// Header combinator: `head_to_body` picks the body codec from the decoded
/// header; `body_to_head` recovers the header value when writing.
pub fn header(
    head: impl Into<Frame>,
    head_to_body: impl Fn(&Value) -> Result<DynCodec, CodecError> + Send + Sync + 'static,
    body_to_head: impl Fn(&Value) -> Result<Value, CodecError> + Send + Sync + 'static,
) -> DynCodec {
    Arc::new(HeaderCodec {
        head: compile(&head.into()),
        head_to_body: Arc::new(head_to_body),
        body_to_head: Arc::new(body_to_head),
    })
}

type ToLenFn = dyn Fn(&Value) -> Result<usize, CodecError> + Send + Sync;
type FromLenFn = dyn Fn(usize) -> Result<Value, CodecError> + Send + Sync;

/// A header whose decoded value is a byte or element count.
#[derive(Clone)]
pub struct Prefix {
    codec: DynCodec,
    to_len: Arc<ToLenFn>,
    from_len: Arc<FromLenFn>,
}

impl Prefix {
    /// Prefix with identity conversions; the frame must decode to an
    /// integer.
    pub fn new(frame: impl Into<Frame>) -> Self {
        Prefix::with(
            frame,
            |value| value.as_len(),
            |len| {
                i64::try_from(len)
                    .map(Value::Int)
                    .map_err(|_| CodecError::ShapeMismatch(format!("length {} overflows", len)))
            },
        )
    }

    /// Prefix with explicit conversions in both directions.
    pub fn with(
        frame: impl Into<Frame>,
        to_len: impl Fn(&Value) -> Result<usize, CodecError> + Send + Sync + 'static,
        from_len: impl Fn(usize) -> Result<Value, CodecError> + Send + Sync + 'static,
    ) -> Self {
        Prefix {
            codec: compile(&frame.into()),
            to_len: Arc::new(to_len),
            from_len: Arc::new(from_len),
        }
    }

    /// Zero-byte prefix that always reads as `len`. Writing asserts the
    /// region really is that long.
    pub fn constant(len: usize) -> Self {
        let expected = i64::try_from(len).unwrap_or(i64::MAX);
        Prefix::with(
            Frame::Codec(Arc::new(LiteralCodec::new(Value::Int(expected)))),
            |value| value.as_len(),
            move |n| {
                i64::try_from(n)
                    .map(Value::Int)
                    .map_err(|_| CodecError::ShapeMismatch(format!("length {} overflows", n)))
            },
        )
    }

    /// Decode the count; the resulting value is always an unsigned integer.
    pub(crate) fn read_len(&self, bs: ByteSeq) -> Result<ReadResult, CodecError> {
        let to_len = Arc::clone(&self.to_len);
        and_then(self.codec.read(bs)?, move |value, rest| {
            let len = (to_len)(&value)?;
            Ok(ReadResult::Done {
                value: Value::UInt(len as u64),
                rest,
            })
        })
    }

    /// Encode the count.
    pub(crate) fn write_len(&self, len: usize, out: &mut BytesMut) -> Result<(), CodecError> {
        let value = (self.from_len)(len)?;
        self.codec.write(&value, out)
    }

    /// Exact width of the prefix itself, if known.
    pub fn sizeof(&self) -> Option<usize> {
        self.codec.sizeof()
    }
}

impl fmt::Debug for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Prefix(..)")
    }
}

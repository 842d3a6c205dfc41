//! # Codec Driver
//!
//! Convenience entry points over the reader protocol: one-shot
//! [`encode`]/[`decode`], their `_all` variants, and the incremental
//! [`FrameReader`] session that the streaming adapter builds on.
//!
//! The driver is where insufficiency becomes an error: inside the codec tree
//! running out of bytes is an ordinary suspension, but a caller handing over
//! *final* input gets [`CodecError::Incomplete`] for a mid-flight frame and
//! [`CodecError::Residual`] for unconsumed trailing bytes. The two are never
//! conflated.

use std::mem;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::constants::DEFAULT_ENCODE_CAPACITY;
use crate::enums::{ReadResult, ReaderState};
use crate::error::CodecError;
use crate::models::byte_seq::ByteSeq;
use crate::models::value::Value;
use crate::traits::codec::DynCodec;

/// Encode one value into a single buffer, pre-sized when the codec's width
/// is known.
pub fn encode(codec: &DynCodec, value: &Value) -> Result<Bytes, CodecError> {
    let mut out = BytesMut::with_capacity(codec.sizeof().unwrap_or(DEFAULT_ENCODE_CAPACITY));
    codec.write(value, &mut out)?;
    Ok(out.freeze())
}

/// Encode a series of values back to back. An empty series yields an empty
/// buffer.
pub fn encode_all(codec: &DynCodec, values: &[Value]) -> Result<Bytes, CodecError> {
    let capacity = codec
        .sizeof()
        .map(|size| size * values.len())
        .unwrap_or(DEFAULT_ENCODE_CAPACITY);
    let mut out = BytesMut::with_capacity(capacity);
    for value in values {
        codec.write(value, &mut out)?;
    }
    Ok(out.freeze())
}

/// Decode exactly one value from final input.
pub fn decode(codec: &DynCodec, input: impl Into<ByteSeq>) -> Result<Value, CodecError> {
    match codec.read(input.into())? {
        ReadResult::Done { value, rest } => {
            if rest.is_empty() {
                Ok(value)
            } else {
                Err(CodecError::Residual {
                    remaining: rest.len(),
                })
            }
        }
        ReadResult::NeedMore { .. } => Err(CodecError::Incomplete),
    }
}

/// Decode values from final input until it is exhausted.
pub fn decode_all(codec: &DynCodec, input: impl Into<ByteSeq>) -> Result<Vec<Value>, CodecError> {
    let mut reader = FrameReader::new(Arc::clone(codec));
    let values = reader.feed(input)?;
    reader.finish()?;
    Ok(values)
}

/// Materialize a byte sequence into one buffer.
pub fn contiguous(bs: &ByteSeq) -> Bytes {
    bs.contiguous()
}

/// Adopt any byte source as a byte sequence, without copying owned buffers.
pub fn to_buf_seq(input: impl Into<ByteSeq>) -> ByteSeq {
    input.into()
}

/// Adopt any byte source and materialize it as one buffer.
pub fn to_byte_buffer(input: impl Into<ByteSeq>) -> Bytes {
    input.into().contiguous()
}

/// An incremental decode session.
///
/// Feed chunks as they arrive; each call drains every value that completes
/// and parks the suspension of a frame caught mid-flight. `finish` declares
/// the input final and reports what, if anything, was left hanging.
pub struct FrameReader {
    codec: DynCodec,
    state: ReaderState,
    pending: ByteSeq,
}

impl FrameReader {
    pub fn new(codec: DynCodec) -> Self {
        Self {
            codec,
            state: ReaderState::Ready,
            pending: ByteSeq::new(),
        }
    }

    /// Append a chunk and drain every frame it completes.
    pub fn feed(&mut self, chunk: impl Into<ByteSeq>) -> Result<Vec<Value>, CodecError> {
        let mut bs = mem::take(&mut self.pending);
        bs.append(chunk.into());
        let mut values = Vec::new();
        loop {
            let before = bs.len();
            let step = match mem::replace(&mut self.state, ReaderState::Ready) {
                ReaderState::Suspended(resume) => resume.run(bs)?,
                ReaderState::Ready => {
                    if bs.is_empty() {
                        break;
                    }
                    self.codec.read(bs)?
                }
            };
            match step {
                ReadResult::Done { value, rest } => {
                    // A value that consumed nothing would spin forever
                    // against a non-empty tail.
                    if rest.len() == before && !rest.is_empty() {
                        return Err(CodecError::Residual {
                            remaining: rest.len(),
                        });
                    }
                    values.push(value);
                    bs = rest;
                }
                ReadResult::NeedMore { resume, rest } => {
                    trace!(drained = values.len(), parked = rest.len(), "decode suspended");
                    self.state = ReaderState::Suspended(resume);
                    self.pending = rest;
                    return Ok(values);
                }
            }
        }
        trace!(drained = values.len(), "chunk fully decoded");
        Ok(values)
    }

    /// Whether a frame is currently suspended mid-decode.
    pub fn is_suspended(&self) -> bool {
        matches!(self.state, ReaderState::Suspended(_))
    }

    /// Declare the input final.
    pub fn finish(self) -> Result<(), CodecError> {
        match self.state {
            ReaderState::Suspended(_) => Err(CodecError::Incomplete),
            ReaderState::Ready => {
                if self.pending.is_empty() {
                    Ok(())
                } else {
                    Err(CodecError::Residual {
                        remaining: self.pending.len(),
                    })
                }
            }
        }
    }
}

//! Zero-byte constant codec.
//!
//! A literal embedded in a frame occupies no wire bytes: it reads as its
//! constant and, on write, asserts that the supplied value equals it. Tuples
//! use literals to tag positions without spending bytes on them.

use bytes::BytesMut;

use crate::enums::ReadResult;
use crate::error::CodecError;
use crate::models::byte_seq::ByteSeq;
use crate::models::value::Value;
use crate::traits::codec::Codec;

pub struct LiteralCodec {
    value: Value,
}

impl LiteralCodec {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl Codec for LiteralCodec {
    fn read(&self, bs: ByteSeq) -> Result<ReadResult, CodecError> {
        Ok(ReadResult::Done {
            value: self.value.clone(),
            rest: bs,
        })
    }

    fn write(&self, value: &Value, _out: &mut BytesMut) -> Result<(), CodecError> {
        if *value != self.value {
            return Err(CodecError::LiteralMismatch {
                expected: self.value.clone(),
                found: value.clone(),
            });
        }
        Ok(())
    }

    fn sizeof(&self) -> Option<usize> {
        Some(0)
    }
}

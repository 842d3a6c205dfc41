//! Symbol enumerations over a 16-bit wire form.
//!
//! An enumeration is a bijection between symbolic tags and signed 16-bit
//! integers, stored big-endian. Assignment is dense (`0..n-1`) unless an
//! explicit mapping is given. Both directions fail fatally on unknown
//! members; the bijection is validated at construction.

use std::sync::Arc;

use bytes::BytesMut;

use crate::constants::ENUM_WIRE;
use crate::enums::ReadResult;
use crate::error::CodecError;
use crate::models::byte_seq::ByteSeq;
use crate::models::value::Value;
use crate::traits::codec::{and_then, Codec, DynCodec};

pub struct EnumCodec {
    members: Arc<Vec<(String, i16)>>,
}

impl EnumCodec {
    fn lookup_tag(&self, tag: &str) -> Option<i16> {
        self.members
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| *v)
    }

    fn lookup_value(&self, value: i16) -> Option<&str> {
        self.members
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(t, _)| t.as_str())
    }
}

impl Codec for EnumCodec {
    fn read(&self, bs: ByteSeq) -> Result<ReadResult, CodecError> {
        let members = Arc::clone(&self.members);
        and_then(ENUM_WIRE.read(bs)?, move |value, rest| {
            let wire = value.as_i64()?;
            let tag = members
                .iter()
                .find(|(_, v)| *v as i64 == wire)
                .map(|(t, _)| t.clone())
                .ok_or(CodecError::UnknownEnumValue(wire))?;
            Ok(ReadResult::Done {
                value: Value::Symbol(tag),
                rest,
            })
        })
    }

    fn write(&self, value: &Value, out: &mut BytesMut) -> Result<(), CodecError> {
        let tag = value.as_symbol()?;
        let wire = self
            .lookup_tag(tag)
            .ok_or_else(|| CodecError::UnknownEnumTag(tag.to_string()))?;
        ENUM_WIRE.write(&Value::Int(wire as i64), out)
    }

    fn sizeof(&self) -> Option<usize> {
        Some(ENUM_WIRE.width())
    }
}

/// Enumeration with dense assignment `0..n-1` in declaration order.
pub fn enumeration(tags: &[&str]) -> Result<DynCodec, CodecError> {
    if tags.len() > i16::MAX as usize + 1 {
        return Err(CodecError::ShapeMismatch(format!(
            "{} enumeration members exceed the 16-bit wire form",
            tags.len()
        )));
    }
    let pairs: Vec<(&str, i16)> = tags
        .iter()
        .enumerate()
        .map(|(i, t)| (*t, i as i16))
        .collect();
    enumeration_map(&pairs)
}

/// Enumeration with explicit wire values; each must fit a signed 16-bit
/// integer and both tags and values must be unique.
pub fn enumeration_map(pairs: &[(&str, i16)]) -> Result<DynCodec, CodecError> {
    let mut members = Vec::with_capacity(pairs.len());
    for (tag, value) in pairs {
        if members.iter().any(|(t, _): &(String, i16)| t == tag) {
            return Err(CodecError::ShapeMismatch(format!(
                "duplicate enumeration tag {}",
                tag
            )));
        }
        if members.iter().any(|(_, v)| v == value) {
            return Err(CodecError::ShapeMismatch(format!(
                "duplicate enumeration value {}",
                value
            )));
        }
        members.push((tag.to_string(), *value));
    }
    Ok(Arc::new(EnumCodec {
        members: Arc::new(members),
    }))
}

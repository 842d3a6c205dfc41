//! Charset-tagged string codecs.
//!
//! Charset conversion is delegated to `encoding_rs`: labels resolve through
//! the WHATWG registry (`utf-8`, `ascii`, `iso-8859-1`, …) when the codec is
//! *constructed*, so a bad label fails at frame-compile time rather than on
//! the first decode. Conversion errors during encode/decode are fatal.
//!
//! Three bounds are offered: unbounded (consumes the whole view, so it is
//! only meaningful inside a finite or delimited wrapper), exact byte length, and
//! delimiter-terminated. The numeric adapters layer decimal parsing on top
//! of any string codec.

use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use encoding_rs::Encoding;

use crate::enums::ReadResult;
use crate::error::CodecError;
use crate::models::byte_seq::ByteSeq;
use crate::models::codecs::blocks::{delimiter_set, read_delimited};
use crate::models::value::Value;
use crate::traits::codec::{and_then, Codec, DynCodec, Resume};

/// A resolved charset: registry label plus its converter.
#[derive(Clone)]
pub struct Charset {
    label: String,
    encoding: &'static Encoding,
}

impl Charset {
    /// Resolve a registry label. Unknown labels fail here, not at decode
    /// time.
    pub fn resolve(label: &str) -> Result<Charset, CodecError> {
        let encoding = Encoding::for_label(label.as_bytes())
            .ok_or_else(|| CodecError::Charset(format!("unknown charset label {}", label)))?;
        Ok(Charset {
            label: label.to_string(),
            encoding,
        })
    }

    /// Registry label this charset was resolved from.
    pub fn label(&self) -> &str {
        &self.label
    }

    fn decode(&self, raw: &[u8]) -> Result<String, CodecError> {
        let (text, malformed) = self.encoding.decode_without_bom_handling(raw);
        if malformed {
            return Err(CodecError::Charset(format!(
                "bytes are not valid {}",
                self.label
            )));
        }
        Ok(text.into_owned())
    }

    fn encode(&self, text: &str) -> Result<Vec<u8>, CodecError> {
        let (raw, _, unmappable) = self.encoding.encode(text);
        if unmappable {
            return Err(CodecError::Charset(format!(
                "string is not representable in {}",
                self.label
            )));
        }
        Ok(raw.into_owned())
    }
}

#[derive(Clone)]
enum StringBound {
    /// Consume everything available. Only used inside bounded wrappers.
    Unbounded,
    /// Exactly this many bytes.
    Length(usize),
    /// Up to the first delimiter; write appends the first of the set.
    Delimited(Arc<Vec<Bytes>>),
}

#[derive(Clone)]
pub struct StringCodec {
    charset: Charset,
    bound: StringBound,
}

impl Codec for StringCodec {
    fn read(&self, bs: ByteSeq) -> Result<ReadResult, CodecError> {
        match &self.bound {
            StringBound::Unbounded => {
                let text = self.charset.decode(&bs.contiguous())?;
                Ok(ReadResult::Done {
                    value: Value::Str(text),
                    rest: ByteSeq::new(),
                })
            }
            StringBound::Length(len) => {
                let len = *len;
                if bs.len() < len {
                    let codec = self.clone();
                    return Ok(ReadResult::NeedMore {
                        resume: Resume::new(move |grown| codec.read(grown)),
                        rest: bs,
                    });
                }
                let text = self.charset.decode(&bs.take_contiguous(len)?)?;
                Ok(ReadResult::Done {
                    value: Value::Str(text),
                    rest: bs.drop_front(len)?,
                })
            }
            StringBound::Delimited(delims) => {
                let charset = self.charset.clone();
                and_then(
                    read_delimited(Arc::clone(delims), true, 0, bs)?,
                    move |body, rest| {
                        let text = charset.decode(body.as_bytes()?)?;
                        Ok(ReadResult::Done {
                            value: Value::Str(text),
                            rest,
                        })
                    },
                )
            }
        }
    }

    fn write(&self, value: &Value, out: &mut BytesMut) -> Result<(), CodecError> {
        let raw = self.charset.encode(value.as_str()?)?;
        match &self.bound {
            StringBound::Unbounded => out.extend_from_slice(&raw),
            StringBound::Length(len) => {
                if raw.len() != *len {
                    return Err(CodecError::ShapeMismatch(format!(
                        "string encodes to {} bytes, codec is fixed at {}",
                        raw.len(),
                        len
                    )));
                }
                out.extend_from_slice(&raw);
            }
            StringBound::Delimited(delims) => {
                out.extend_from_slice(&raw);
                out.extend_from_slice(&delims[0]);
            }
        }
        Ok(())
    }

    fn sizeof(&self) -> Option<usize> {
        match self.bound {
            StringBound::Length(len) => Some(len),
            _ => None,
        }
    }
}

/// Unbounded string in the given charset. Consumes the whole view, so it
/// belongs inside a finite or delimited wrapper, never at the top of an
/// unbounded stream.
pub fn string(charset: &str) -> Result<DynCodec, CodecError> {
    Ok(Arc::new(StringCodec {
        charset: Charset::resolve(charset)?,
        bound: StringBound::Unbounded,
    }))
}

/// String occupying exactly `len` bytes.
pub fn string_with_length(charset: &str, len: usize) -> Result<DynCodec, CodecError> {
    Ok(Arc::new(StringCodec {
        charset: Charset::resolve(charset)?,
        bound: StringBound::Length(len),
    }))
}

/// String terminated by the first occurrence of any delimiter; the
/// delimiter is stripped on read and the first of the set is appended on
/// write.
pub fn string_delimited(charset: &str, delims: &[&[u8]]) -> Result<DynCodec, CodecError> {
    Ok(Arc::new(StringCodec {
        charset: Charset::resolve(charset)?,
        bound: StringBound::Delimited(delimiter_set(delims)?),
    }))
}

#[derive(Clone, Copy)]
enum NumericKind {
    Integer,
    Float,
}

/// Decimal number spelled as text by an inner string codec.
pub struct NumericStringCodec {
    inner: DynCodec,
    kind: NumericKind,
}

impl Codec for NumericStringCodec {
    fn read(&self, bs: ByteSeq) -> Result<ReadResult, CodecError> {
        let kind = self.kind;
        and_then(self.inner.read(bs)?, move |value, rest| {
            let text = value.as_str()?;
            let value = match kind {
                NumericKind::Integer => Value::Int(text.parse::<i64>().map_err(|_| {
                    CodecError::InvalidNumber(format!("not a decimal integer: {:?}", text))
                })?),
                NumericKind::Float => Value::Float(text.parse::<f64>().map_err(|_| {
                    CodecError::InvalidNumber(format!("not a decimal float: {:?}", text))
                })?),
            };
            Ok(ReadResult::Done { value, rest })
        })
    }

    fn write(&self, value: &Value, out: &mut BytesMut) -> Result<(), CodecError> {
        let text = match self.kind {
            NumericKind::Integer => value.as_i64()?.to_string(),
            NumericKind::Float => value.as_f64()?.to_string(),
        };
        self.inner.write(&Value::Str(text), out)
    }

    fn sizeof(&self) -> Option<usize> {
        // Digit count varies even when the inner codec is fixed-width.
        None
    }
}

/// Decimal integer written as text through `inner`.
pub fn string_integer(inner: DynCodec) -> DynCodec {
    Arc::new(NumericStringCodec {
        inner,
        kind: NumericKind::Integer,
    })
}

/// Decimal float written as text through `inner`.
pub fn string_float(inner: DynCodec) -> DynCodec {
    Arc::new(NumericStringCodec {
        inner,
        kind: NumericKind::Float,
    })
}

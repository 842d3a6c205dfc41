//! Finite and delimiter-terminated byte regions.
//!
//! Two ways of bounding a stretch of wire bytes:
//! - **finite**: the length is known up front, either as a constant or from a
//!   decoded prefix; the region's body codec must consume it exactly.
//! - **delimited**: the region ends at the first occurrence of any delimiter
//!   in a declared set; ties at one position resolve in declaration order.
//!
//! Delimiter scanning is incremental: a suspended scan remembers how far it
//! got, so no byte is inspected twice and a delimiter straddling two chunks
//! is still found exactly once.

use std::sync::Arc;

use bytes::{Bytes, BytesMut};

use crate::enums::ReadResult;
use crate::error::CodecError;
use crate::models::byte_seq::{ByteSeq, Scan};
use crate::models::codecs::header::Prefix;
use crate::models::frame::{compile, Frame};
use crate::models::value::Value;
use crate::traits::codec::{and_then, Codec, DynCodec, Resume};

/// Exactly `len` raw bytes.
pub struct FiniteBlockCodec {
    len: usize,
}

impl Codec for FiniteBlockCodec {
    fn read(&self, bs: ByteSeq) -> Result<ReadResult, CodecError> {
        let len = self.len;
        if bs.len() < len {
            return Ok(ReadResult::NeedMore {
                resume: Resume::new(move |grown| FiniteBlockCodec { len }.read(grown)),
                rest: bs,
            });
        }
        let raw = bs.take_contiguous(len)?;
        let rest = bs.drop_front(len)?;
        Ok(ReadResult::Done {
            value: Value::Bytes(raw),
            rest,
        })
    }

    fn write(&self, value: &Value, out: &mut BytesMut) -> Result<(), CodecError> {
        let raw = value.as_bytes()?;
        if raw.len() != self.len {
            return Err(CodecError::ShapeMismatch(format!(
                "block of {} bytes given {}",
                self.len,
                raw.len()
            )));
        }
        out.extend_from_slice(raw);
        Ok(())
    }

    fn sizeof(&self) -> Option<usize> {
        Some(self.len)
    }
}

/// Exactly `len` raw bytes as `Value::Bytes`.
pub fn finite_block(len: usize) -> DynCodec {
    Arc::new(FiniteBlockCodec { len })
}

/// Raw bytes up to the first delimiter occurrence.
pub struct DelimitedBlockCodec {
    delims: Arc<Vec<Bytes>>,
    strip: bool,
}

impl Codec for DelimitedBlockCodec {
    fn read(&self, bs: ByteSeq) -> Result<ReadResult, CodecError> {
        read_delimited(Arc::clone(&self.delims), self.strip, 0, bs)
    }

    fn write(&self, value: &Value, out: &mut BytesMut) -> Result<(), CodecError> {
        let raw = value.as_bytes()?;
        out.extend_from_slice(raw);
        // A stripped value needs its terminator restored; an unstripped one
        // still carries the delimiter it was read with.
        if self.strip {
            out.extend_from_slice(&self.delims[0]);
        }
        Ok(())
    }

    fn sizeof(&self) -> Option<usize> {
        None
    }
}

/// Bytes up to (and, when `strip` is false, including) the first delimiter.
/// The write side appends the first delimiter of the set.
pub fn delimited_block(delims: &[&[u8]], strip: bool) -> Result<DynCodec, CodecError> {
    Ok(Arc::new(DelimitedBlockCodec {
        delims: delimiter_set(delims)?,
        strip,
    }))
}

/// A length-prefixed region decoded by `frame`; the body must consume the
/// region exactly.
pub struct FiniteFrameCodec {
    prefix: Prefix,
    body: DynCodec,
}

impl Codec for FiniteFrameCodec {
    fn read(&self, bs: ByteSeq) -> Result<ReadResult, CodecError> {
        let body = Arc::clone(&self.body);
        and_then(self.prefix.read_len(bs)?, move |len, rest| {
            read_region(body, len.as_len()?, rest)
        })
    }

    fn write(&self, value: &Value, out: &mut BytesMut) -> Result<(), CodecError> {
        let mut body = BytesMut::new();
        if let Some(size) = self.body.sizeof() {
            body.reserve(size);
        }
        self.body.write(value, &mut body)?;
        self.prefix.write_len(body.len(), out)?;
        out.extend_from_slice(&body);
        Ok(())
    }

    fn sizeof(&self) -> Option<usize> {
        match (self.prefix.sizeof(), self.body.sizeof()) {
            (Some(p), Some(b)) => Some(p + b),
            _ => None,
        }
    }
}

/// Wait for the region's bytes, then run the body codec against exactly
/// that slice.
fn read_region(body: DynCodec, len: usize, bs: ByteSeq) -> Result<ReadResult, CodecError> {
    if bs.len() < len {
        return Ok(ReadResult::NeedMore {
            resume: Resume::new(move |grown| read_region(body, len, grown)),
            rest: bs,
        });
    }
    let (region, rest) = bs.split_at(len)?;
    let value = read_body_exact(&*body, region)?;
    Ok(ReadResult::Done { value, rest })
}

/// Region sized by a decoded prefix.
pub fn finite_frame(prefix: Prefix, frame: impl Into<Frame>) -> DynCodec {
    Arc::new(FiniteFrameCodec {
        prefix,
        body: compile(&frame.into()),
    })
}

/// Region of a constant byte length.
pub fn finite_frame_len(len: usize, frame: impl Into<Frame>) -> DynCodec {
    finite_frame(Prefix::constant(len), frame)
}

/// One frame inside a delimited body; the body must be consumed exactly.
pub struct DelimitedFrameCodec {
    delims: Arc<Vec<Bytes>>,
    inner: DynCodec,
}

impl Codec for DelimitedFrameCodec {
    fn read(&self, bs: ByteSeq) -> Result<ReadResult, CodecError> {
        let inner = Arc::clone(&self.inner);
        and_then(
            read_delimited(Arc::clone(&self.delims), true, 0, bs)?,
            move |body, rest| {
                let body = ByteSeq::from(body.as_bytes()?.clone());
                let value = read_body_exact(&*inner, body)?;
                Ok(ReadResult::Done { value, rest })
            },
        )
    }

    fn write(&self, value: &Value, out: &mut BytesMut) -> Result<(), CodecError> {
        self.inner.write(value, out)?;
        out.extend_from_slice(&self.delims[0]);
        Ok(())
    }

    fn sizeof(&self) -> Option<usize> {
        None
    }
}

/// One `frame` terminated by a delimiter from the set.
pub fn delimited_frame(delims: &[&[u8]], frame: impl Into<Frame>) -> Result<DynCodec, CodecError> {
    Ok(Arc::new(DelimitedFrameCodec {
        delims: delimiter_set(delims)?,
        inner: compile(&frame.into()),
    }))
}

/// Validate and intern a delimiter set.
pub(crate) fn delimiter_set(delims: &[&[u8]]) -> Result<Arc<Vec<Bytes>>, CodecError> {
    if delims.is_empty() {
        return Err(CodecError::ShapeMismatch(
            "delimiter set must not be empty".to_string(),
        ));
    }
    if delims.iter().any(|d| d.is_empty()) {
        return Err(CodecError::ShapeMismatch(
            "empty delimiter".to_string(),
        ));
    }
    Ok(Arc::new(
        delims.iter().map(|d| Bytes::copy_from_slice(d)).collect(),
    ))
}

/// Scan for the region's terminator, suspending with the scan position when
/// the input ends before a delimiter is ruled in or out.
pub(crate) fn read_delimited(
    delims: Arc<Vec<Bytes>>,
    strip: bool,
    from: usize,
    bs: ByteSeq,
) -> Result<ReadResult, CodecError> {
    match bs.scan_delimiters(&delims, from) {
        Scan::Hit { at, delim } => {
            let end = at + delims[delim].len();
            let body = bs.take_contiguous(if strip { at } else { end })?;
            let rest = bs.drop_front(end)?;
            Ok(ReadResult::Done {
                value: Value::Bytes(body),
                rest,
            })
        }
        Scan::Partial { at } => Ok(ReadResult::NeedMore {
            resume: Resume::new(move |grown| read_delimited(delims, strip, at, grown)),
            rest: bs,
        }),
        Scan::Clear => {
            let scanned = bs.len();
            Ok(ReadResult::NeedMore {
                resume: Resume::new(move |grown| read_delimited(delims, strip, scanned, grown)),
                rest: bs,
            })
        }
    }
}

/// Run `codec` against a body whose extent is final; the body must be
/// consumed exactly.
pub(crate) fn read_body_exact(codec: &dyn Codec, body: ByteSeq) -> Result<Value, CodecError> {
    let total = body.len();
    match codec.read(body)? {
        ReadResult::Done { value, rest } => {
            if rest.is_empty() {
                Ok(value)
            } else {
                Err(CodecError::BodyOverrun(format!(
                    "body of {} bytes leaves {} unconsumed",
                    total,
                    rest.len()
                )))
            }
        }
        ReadResult::NeedMore { .. } => Err(CodecError::BodyOverrun(format!(
            "body codec needs more than its {} bytes",
            total
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::codecs::primitive::Prim;

    fn read_done(codec: &dyn Codec, bs: ByteSeq) -> (Value, ByteSeq) {
        match codec.read(bs).unwrap() {
            ReadResult::Done { value, rest } => (value, rest),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn finite_block_roundtrip() {
        let codec = finite_block(3);
        let (value, rest) = read_done(&*codec, ByteSeq::from(&b"abcde"[..]));
        assert_eq!(value, Value::Bytes(Bytes::from_static(b"abc")));
        assert_eq!(rest, b"de"[..]);

        let mut out = BytesMut::new();
        codec.write(&value, &mut out).unwrap();
        assert_eq!(&out[..], b"abc");
        assert!(codec
            .write(&Value::Bytes(Bytes::from_static(b"ab")), &mut out)
            .is_err());
    }

    #[test]
    fn delimited_block_strips_and_positions_after_delimiter() {
        let codec = delimited_block(&[b"\r\n", b"\n"], true).unwrap();
        let (value, rest) = read_done(&*codec, ByteSeq::from(&b"foo\nbar"[..]));
        assert_eq!(value, Value::Bytes(Bytes::from_static(b"foo")));
        assert_eq!(rest, b"bar"[..]);
    }

    #[test]
    fn delimited_block_unstripped_keeps_delimiter() {
        let codec = delimited_block(&[b"\n"], false).unwrap();
        let (value, _) = read_done(&*codec, ByteSeq::from(&b"foo\nbar"[..]));
        assert_eq!(value, Value::Bytes(Bytes::from_static(b"foo\n")));

        // Unstripped values already carry their terminator.
        let mut out = BytesMut::new();
        codec.write(&value, &mut out).unwrap();
        assert_eq!(&out[..], b"foo\n");
    }

    #[test]
    fn delimited_block_suspends_and_resumes_across_chunks() {
        let codec = delimited_block(&[b"\r\n"], true).unwrap();
        let (resume, mut rest) = match codec.read(ByteSeq::from(&b"foo\r"[..])).unwrap() {
            ReadResult::NeedMore { resume, rest } => (resume, rest),
            other => panic!("unexpected outcome {:?}", other),
        };
        rest.push_chunk(Bytes::from_static(b"\nbar"));
        match resume.run(rest).unwrap() {
            ReadResult::Done { value, rest } => {
                assert_eq!(value, Value::Bytes(Bytes::from_static(b"foo")));
                assert_eq!(rest, b"bar"[..]);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn finite_frame_requires_exact_consumption() {
        // Prefix says 5 bytes, body decodes 4: overrun.
        let codec = finite_frame(Prefix::constant(5), Frame::Prim(Prim::Int32));
        let err = codec.read(ByteSeq::from(&[0u8, 0, 0, 1, 9][..])).unwrap_err();
        assert!(matches!(err, CodecError::BodyOverrun(_)));

        let codec = finite_frame(Prefix::constant(4), Frame::Prim(Prim::Int32));
        let (value, rest) = read_done(&*codec, ByteSeq::from(&[0u8, 0, 0, 1, 9][..]));
        assert_eq!(value, Value::Int(1));
        assert_eq!(rest, [9u8][..]);
    }

    #[test]
    fn delimited_frame_decodes_body_exactly() {
        let codec = delimited_frame(&[b"\0"], Frame::Prim(Prim::UInt16)).unwrap();
        let (value, rest) = read_done(&*codec, ByteSeq::from(&[1u8, 7, 0, 9][..]));
        assert_eq!(value, Value::UInt(0x0107));
        assert_eq!(rest, [9u8][..]);

        let mut out = BytesMut::new();
        codec.write(&Value::UInt(0x0107), &mut out).unwrap();
        assert_eq!(&out[..], &[1, 7, 0]);
    }
}

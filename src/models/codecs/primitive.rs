//! Fixed-width numeric codecs.
//!
//! Big-endian is the wire default; every multi-byte tag has an `-Le` twin.
//! The single `Byte` is signed. Widths are exact, so `sizeof` is always
//! known and short input suspends without inspecting anything.

use bytes::BytesMut;

use crate::enums::ReadResult;
use crate::error::CodecError;
use crate::models::byte_seq::ByteSeq;
use crate::models::value::Value;
use crate::traits::codec::{Codec, Resume};

/// Fixed-width primitive tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prim {
    /// Signed single byte.
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    /// IEEE-754 binary32.
    Float32,
    /// IEEE-754 binary64.
    Float64,
    Int16Le,
    UInt16Le,
    Int32Le,
    UInt32Le,
    Int64Le,
    UInt64Le,
    Float32Le,
    Float64Le,
}

impl Prim {
    /// Encoded width in bytes.
    pub const fn width(self) -> usize {
        match self {
            Prim::Byte => 1,
            Prim::Int16 | Prim::UInt16 | Prim::Int16Le | Prim::UInt16Le => 2,
            Prim::Int32 | Prim::UInt32 | Prim::Int32Le | Prim::UInt32Le => 4,
            Prim::Int64 | Prim::UInt64 | Prim::Int64Le | Prim::UInt64Le => 8,
            Prim::Float32 | Prim::Float32Le => 4,
            Prim::Float64 | Prim::Float64Le => 8,
        }
    }

    fn decode(self, raw: &[u8]) -> Value {
        match self {
            Prim::Byte => Value::Int(raw[0] as i8 as i64),
            Prim::Int16 => Value::Int(i16::from_be_bytes([raw[0], raw[1]]) as i64),
            Prim::Int16Le => Value::Int(i16::from_le_bytes([raw[0], raw[1]]) as i64),
            Prim::UInt16 => Value::UInt(u16::from_be_bytes([raw[0], raw[1]]) as u64),
            Prim::UInt16Le => Value::UInt(u16::from_le_bytes([raw[0], raw[1]]) as u64),
            Prim::Int32 => Value::Int(i32::from_be_bytes(four(raw)) as i64),
            Prim::Int32Le => Value::Int(i32::from_le_bytes(four(raw)) as i64),
            Prim::UInt32 => Value::UInt(u32::from_be_bytes(four(raw)) as u64),
            Prim::UInt32Le => Value::UInt(u32::from_le_bytes(four(raw)) as u64),
            Prim::Int64 => Value::Int(i64::from_be_bytes(eight(raw))),
            Prim::Int64Le => Value::Int(i64::from_le_bytes(eight(raw))),
            Prim::UInt64 => Value::UInt(u64::from_be_bytes(eight(raw))),
            Prim::UInt64Le => Value::UInt(u64::from_le_bytes(eight(raw))),
            Prim::Float32 => Value::Float(f32::from_be_bytes(four(raw)) as f64),
            Prim::Float32Le => Value::Float(f32::from_le_bytes(four(raw)) as f64),
            Prim::Float64 => Value::Float(f64::from_be_bytes(eight(raw))),
            Prim::Float64Le => Value::Float(f64::from_le_bytes(eight(raw))),
        }
    }

    const fn is_le(self) -> bool {
        matches!(
            self,
            Prim::Int16Le
                | Prim::UInt16Le
                | Prim::Int32Le
                | Prim::UInt32Le
                | Prim::Int64Le
                | Prim::UInt64Le
                | Prim::Float32Le
                | Prim::Float64Le
        )
    }

    fn encode(self, value: &Value, out: &mut BytesMut) -> Result<(), CodecError> {
        let le = self.is_le();
        macro_rules! put {
            ($v:expr) => {{
                let v = $v;
                if le {
                    out.extend_from_slice(&v.to_le_bytes());
                } else {
                    out.extend_from_slice(&v.to_be_bytes());
                }
            }};
        }
        match self {
            Prim::Byte => {
                put!(narrow_i(value.as_i64()?, i8::MIN as i64, i8::MAX as i64, "byte")? as i8)
            }
            Prim::Int16 | Prim::Int16Le => {
                put!(narrow_i(value.as_i64()?, i16::MIN as i64, i16::MAX as i64, "int16")? as i16)
            }
            Prim::UInt16 | Prim::UInt16Le => {
                put!(narrow_u(value.as_u64()?, u16::MAX as u64, "uint16")? as u16)
            }
            Prim::Int32 | Prim::Int32Le => {
                put!(narrow_i(value.as_i64()?, i32::MIN as i64, i32::MAX as i64, "int32")? as i32)
            }
            Prim::UInt32 | Prim::UInt32Le => {
                put!(narrow_u(value.as_u64()?, u32::MAX as u64, "uint32")? as u32)
            }
            Prim::Int64 | Prim::Int64Le => put!(value.as_i64()?),
            Prim::UInt64 | Prim::UInt64Le => put!(value.as_u64()?),
            Prim::Float32 | Prim::Float32Le => put!(value.as_f64()? as f32),
            Prim::Float64 | Prim::Float64Le => put!(value.as_f64()?),
        }
        Ok(())
    }
}

impl Codec for Prim {
    fn read(&self, bs: ByteSeq) -> Result<ReadResult, CodecError> {
        let width = self.width();
        if bs.len() < width {
            let prim = *self;
            return Ok(ReadResult::NeedMore {
                resume: Resume::new(move |grown| prim.read(grown)),
                rest: bs,
            });
        }
        let raw = bs.take_contiguous(width)?;
        let rest = bs.drop_front(width)?;
        Ok(ReadResult::Done {
            value: self.decode(&raw),
            rest,
        })
    }

    fn write(&self, value: &Value, out: &mut BytesMut) -> Result<(), CodecError> {
        self.encode(value, out)
    }

    fn sizeof(&self) -> Option<usize> {
        Some(self.width())
    }
}

#[inline]
fn four(raw: &[u8]) -> [u8; 4] {
    [raw[0], raw[1], raw[2], raw[3]]
}

#[inline]
fn eight(raw: &[u8]) -> [u8; 8] {
    [
        raw[0], raw[1], raw[2], raw[3], raw[4], raw[5], raw[6], raw[7],
    ]
}

fn narrow_i(v: i64, min: i64, max: i64, tag: &str) -> Result<i64, CodecError> {
    if v < min || v > max {
        return Err(CodecError::ShapeMismatch(format!(
            "{} does not fit {}",
            v, tag
        )));
    }
    Ok(v)
}

fn narrow_u(v: u64, max: u64, tag: &str) -> Result<u64, CodecError> {
    if v > max {
        return Err(CodecError::ShapeMismatch(format!(
            "{} does not fit {}",
            v, tag
        )));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(prim: Prim, value: Value) -> Vec<u8> {
        let mut out = BytesMut::new();
        prim.write(&value, &mut out).unwrap();
        assert_eq!(out.len(), prim.width());
        match prim.read(ByteSeq::from(out.freeze())).unwrap() {
            ReadResult::Done { value: got, rest } => {
                assert!(rest.is_empty());
                assert_eq!(got, value);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        let mut out = BytesMut::new();
        prim.write(&value, &mut out).unwrap();
        out.to_vec()
    }

    #[test]
    fn big_endian_layout() {
        assert_eq!(roundtrip(Prim::Int32, Value::Int(1)), [0, 0, 0, 1]);
        assert_eq!(roundtrip(Prim::UInt16, Value::UInt(0x1234)), [0x12, 0x34]);
        assert_eq!(
            roundtrip(Prim::Float32, Value::Float(1.0)),
            [0x3f, 0x80, 0, 0]
        );
    }

    #[test]
    fn little_endian_layout() {
        assert_eq!(roundtrip(Prim::Int32Le, Value::Int(1)), [1, 0, 0, 0]);
        assert_eq!(
            roundtrip(Prim::UInt16Le, Value::UInt(0x1234)),
            [0x34, 0x12]
        );
    }

    #[test]
    fn signed_extremes() {
        roundtrip(Prim::Byte, Value::Int(i8::MIN as i64));
        roundtrip(Prim::Byte, Value::Int(i8::MAX as i64));
        roundtrip(Prim::Int16, Value::Int(i16::MIN as i64));
        roundtrip(Prim::Int64, Value::Int(i64::MIN));
        roundtrip(Prim::Int64, Value::Int(i64::MAX));
        roundtrip(Prim::UInt64, Value::UInt(u64::MAX));
    }

    #[test]
    fn out_of_range_write_fails() {
        let mut out = BytesMut::new();
        assert!(Prim::Byte.write(&Value::Int(128), &mut out).is_err());
        assert!(Prim::Int16.write(&Value::Int(40_000), &mut out).is_err());
        assert!(Prim::UInt16.write(&Value::Int(-1), &mut out).is_err());
    }

    #[test]
    fn short_input_suspends() {
        let bs = ByteSeq::from(&[0u8, 0, 0][..]);
        match Prim::Int32.read(bs).unwrap() {
            ReadResult::NeedMore { resume, mut rest } => {
                rest.push_chunk(bytes::Bytes::from_static(&[7]));
                match resume.run(rest).unwrap() {
                    ReadResult::Done { value, rest } => {
                        assert_eq!(value, Value::Int(7));
                        assert!(rest.is_empty());
                    }
                    other => panic!("unexpected outcome {:?}", other),
                }
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }
}

//! Sequence combinators: fixed-shape tuples, keyed maps, and repetition.
//!
//! All of them thread child reads through `and_then`, so partial progress
//! (fields or elements decoded so far, plus a child's own suspension)
//! survives a chunk boundary without re-reading anything.
//!
//! The count-prefixed repetition decoder follows a three-state machine:
//! reading-prefix, reading-element(i), done. When the element width is known
//! it checks the remaining byte budget up front and suspends before touching
//! any element.

use std::sync::Arc;

use bytes::{Bytes, BytesMut};

use crate::constants::DEFAULT_PREFIX;
use crate::enums::ReadResult;
use crate::error::CodecError;
use crate::models::byte_seq::ByteSeq;
use crate::models::codecs::blocks::{delimiter_set, read_delimited};
use crate::models::codecs::header::Prefix;
use crate::models::frame::{compile, Frame};
use crate::models::value::{OrderedMap, Value};
use crate::traits::codec::{and_then, Codec, DynCodec, Resume};

/// Fixed-shape list: children in declared order.
pub struct TupleCodec {
    children: Arc<Vec<DynCodec>>,
}

impl TupleCodec {
    pub fn new(children: Vec<DynCodec>) -> Self {
        Self {
            children: Arc::new(children),
        }
    }
}

impl Codec for TupleCodec {
    fn read(&self, bs: ByteSeq) -> Result<ReadResult, CodecError> {
        let children = Arc::clone(&self.children);
        let capacity = children.len();
        read_fields(children, 0, Vec::with_capacity(capacity), bs)
    }

    fn write(&self, value: &Value, out: &mut BytesMut) -> Result<(), CodecError> {
        let items = value.as_list()?;
        if items.len() != self.children.len() {
            return Err(CodecError::ShapeMismatch(format!(
                "tuple of {} fields given {} values",
                self.children.len(),
                items.len()
            )));
        }
        for (child, item) in self.children.iter().zip(items) {
            child.write(item, out)?;
        }
        Ok(())
    }

    fn sizeof(&self) -> Option<usize> {
        sum_sizes(&self.children)
    }
}

/// Keyed fields: a tuple that decodes into an ordered map.
pub struct MapCodec {
    keys: Arc<Vec<String>>,
    children: Arc<Vec<DynCodec>>,
}

impl MapCodec {
    pub fn new(fields: Vec<(String, DynCodec)>) -> Self {
        let (keys, children) = fields.into_iter().unzip();
        Self {
            keys: Arc::new(keys),
            children: Arc::new(children),
        }
    }
}

impl Codec for MapCodec {
    fn read(&self, bs: ByteSeq) -> Result<ReadResult, CodecError> {
        let children = Arc::clone(&self.children);
        let keys = Arc::clone(&self.keys);
        let capacity = children.len();
        and_then(
            read_fields(children, 0, Vec::with_capacity(capacity), bs)?,
            move |fields, rest| {
                let fields = match fields {
                    Value::List(fields) => fields,
                    other => {
                        return Err(CodecError::ShapeMismatch(format!(
                            "map fields decoded as {:?}",
                            other
                        )))
                    }
                };
                let map: OrderedMap = keys.iter().cloned().zip(fields).collect();
                Ok(ReadResult::Done {
                    value: Value::Map(map),
                    rest,
                })
            },
        )
    }

    fn write(&self, value: &Value, out: &mut BytesMut) -> Result<(), CodecError> {
        let map = value.as_map()?;
        if map.len() != self.keys.len() {
            return Err(CodecError::ShapeMismatch(format!(
                "map of {} fields given {} values",
                self.keys.len(),
                map.len()
            )));
        }
        for (key, child) in self.keys.iter().zip(self.children.iter()) {
            let field = map
                .get(key)
                .ok_or_else(|| CodecError::ShapeMismatch(format!("missing field {}", key)))?;
            child.write(field, out)?;
        }
        Ok(())
    }

    fn sizeof(&self) -> Option<usize> {
        sum_sizes(&self.children)
    }
}

/// Count-prefixed repetition of one element codec.
pub struct RepeatedCodec {
    elem: DynCodec,
    prefix: Prefix,
}

impl Codec for RepeatedCodec {
    fn read(&self, bs: ByteSeq) -> Result<ReadResult, CodecError> {
        let elem = Arc::clone(&self.elem);
        and_then(self.prefix.read_len(bs)?, move |count, rest| {
            let count = count.as_len()?;
            read_elements(elem, count, Vec::with_capacity(count.min(64)), rest)
        })
    }

    fn write(&self, value: &Value, out: &mut BytesMut) -> Result<(), CodecError> {
        let items = value.as_list()?;
        if let (Some(p), Some(e)) = (self.prefix.sizeof(), self.elem.sizeof()) {
            out.reserve(p + e * items.len());
        }
        self.prefix.write_len(items.len(), out)?;
        for item in items {
            self.elem.write(item, out)?;
        }
        Ok(())
    }

    fn sizeof(&self) -> Option<usize> {
        // Element count varies by value.
        None
    }
}

/// Repetition terminated by a delimiter instead of a count.
pub struct DelimitedRepeatCodec {
    elem: DynCodec,
    delims: Arc<Vec<Bytes>>,
}

impl Codec for DelimitedRepeatCodec {
    fn read(&self, bs: ByteSeq) -> Result<ReadResult, CodecError> {
        let elem = Arc::clone(&self.elem);
        and_then(
            read_delimited(Arc::clone(&self.delims), true, 0, bs)?,
            move |body, rest| {
                let mut body = ByteSeq::from(body.as_bytes()?.clone());
                let mut items = Vec::new();
                while !body.is_empty() {
                    let before = body.len();
                    match elem.read(body)? {
                        ReadResult::Done { value, rest } => {
                            if rest.len() == before {
                                return Err(CodecError::ShapeMismatch(
                                    "zero-size element in delimited repetition".to_string(),
                                ));
                            }
                            items.push(value);
                            body = rest;
                        }
                        ReadResult::NeedMore { .. } => {
                            return Err(CodecError::BodyOverrun(format!(
                                "element truncated at the end of a {} byte body",
                                before
                            )));
                        }
                    }
                }
                Ok(ReadResult::Done {
                    value: Value::List(items),
                    rest,
                })
            },
        )
    }

    fn write(&self, value: &Value, out: &mut BytesMut) -> Result<(), CodecError> {
        for item in value.as_list()? {
            self.elem.write(item, out)?;
        }
        out.extend_from_slice(&self.delims[0]);
        Ok(())
    }

    fn sizeof(&self) -> Option<usize> {
        None
    }
}

/// Repetition with the default `int32` big-endian count prefix.
pub fn repeated(elem: impl Into<Frame>) -> DynCodec {
    repeated_with_prefix(elem, Prefix::new(Frame::Prim(DEFAULT_PREFIX)))
}

/// Repetition with an explicit count prefix.
pub fn repeated_with_prefix(elem: impl Into<Frame>, prefix: Prefix) -> DynCodec {
    Arc::new(RepeatedCodec {
        elem: compile(&elem.into()),
        prefix,
    })
}

/// Repetition of elements inside a delimited body.
pub fn repeated_delimited(
    elem: impl Into<Frame>,
    delims: &[&[u8]],
) -> Result<DynCodec, CodecError> {
    Ok(Arc::new(DelimitedRepeatCodec {
        elem: compile(&elem.into()),
        delims: delimiter_set(delims)?,
    }))
}

/// Decode the fields of a tuple starting at `idx`, accumulating into `acc`.
fn read_fields(
    children: Arc<Vec<DynCodec>>,
    mut idx: usize,
    mut acc: Vec<Value>,
    mut bs: ByteSeq,
) -> Result<ReadResult, CodecError> {
    loop {
        if idx == children.len() {
            return Ok(ReadResult::Done {
                value: Value::List(acc),
                rest: bs,
            });
        }
        match children[idx].read(bs)? {
            ReadResult::Done { value, rest } => {
                acc.push(value);
                idx += 1;
                bs = rest;
            }
            ReadResult::NeedMore { resume, rest } => {
                let children = Arc::clone(&children);
                return Ok(ReadResult::NeedMore {
                    resume: Resume::new(move |grown| {
                        and_then(resume.run(grown)?, move |value, rest| {
                            let mut acc = acc;
                            acc.push(value);
                            read_fields(children, idx + 1, acc, rest)
                        })
                    }),
                    rest,
                });
            }
        }
    }
}

/// Decode `remaining` more elements, accumulating into `acc`.
fn read_elements(
    elem: DynCodec,
    mut remaining: usize,
    mut acc: Vec<Value>,
    mut bs: ByteSeq,
) -> Result<ReadResult, CodecError> {
    loop {
        if remaining == 0 {
            return Ok(ReadResult::Done {
                value: Value::List(acc),
                rest: bs,
            });
        }
        // Fast path: with a known element width the whole tail is either
        // present or it is not; suspend without touching elements.
        if let Some(size) = elem.sizeof() {
            if bs.len() < size.saturating_mul(remaining) {
                let elem = Arc::clone(&elem);
                return Ok(ReadResult::NeedMore {
                    resume: Resume::new(move |grown| read_elements(elem, remaining, acc, grown)),
                    rest: bs,
                });
            }
        }
        match elem.read(bs)? {
            ReadResult::Done { value, rest } => {
                acc.push(value);
                remaining -= 1;
                bs = rest;
            }
            ReadResult::NeedMore { resume, rest } => {
                let elem = Arc::clone(&elem);
                return Ok(ReadResult::NeedMore {
                    resume: Resume::new(move |grown| {
                        and_then(resume.run(grown)?, move |value, rest| {
                            let mut acc = acc;
                            acc.push(value);
                            read_elements(elem, remaining - 1, acc, rest)
                        })
                    }),
                    rest,
                });
            }
        }
    }
}

fn sum_sizes(children: &[DynCodec]) -> Option<usize> {
    children.iter().map(|c| c.sizeof()).sum()
}

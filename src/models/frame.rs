//! # Frame Descriptions
//!
//! A frame is the user-level, declarative description of a binary layout:
//! primitive tags, ordered tuples, keyed maps, zero-byte literals, and
//! already-compiled codecs. [`compile`] reifies a frame tree into a concrete
//! codec tree; combinator constructors (`repeated`, `header`, `string`, …)
//! return compiled codecs that embed back into frames via [`Frame::Codec`].
//!
//! Compilation is pure and idempotent: compiling a `Frame::Codec` returns
//! the codec it wraps, so `compile(compile(f).into())` is `compile(f)`.

use std::fmt;
use std::sync::Arc;

use crate::models::codecs::literal::LiteralCodec;
use crate::models::codecs::primitive::Prim;
use crate::models::codecs::sequence::{MapCodec, TupleCodec};
use crate::models::value::Value;
use crate::traits::codec::DynCodec;

/// Declarative description of a binary layout.
#[derive(Clone)]
pub enum Frame {
    /// Fixed-width primitive tag.
    Prim(Prim),
    /// Ordered, fixed-shape sequence of sub-frames.
    Tuple(Vec<Frame>),
    /// Keyed sub-frames; bytes follow declaration order.
    Map(Vec<(String, Frame)>),
    /// Constant occupying zero wire bytes.
    Literal(Value),
    /// Already-compiled codec, passed through untouched.
    Codec(DynCodec),
}

impl Frame {
    /// Ordered tuple of sub-frames.
    pub fn tuple(children: impl IntoIterator<Item = Frame>) -> Self {
        Frame::Tuple(children.into_iter().collect())
    }

    /// Keyed map of sub-frames in declaration order.
    pub fn map<K: Into<String>>(fields: impl IntoIterator<Item = (K, Frame)>) -> Self {
        Frame::Map(fields.into_iter().map(|(k, f)| (k.into(), f)).collect())
    }

    /// Zero-byte literal constant.
    pub fn literal(value: impl Into<Value>) -> Self {
        Frame::Literal(value.into())
    }

    /// Zero-byte symbolic literal, the common tuple tag.
    pub fn symbol(tag: impl Into<String>) -> Self {
        Frame::Literal(Value::Symbol(tag.into()))
    }
}

impl From<Prim> for Frame {
    fn from(prim: Prim) -> Self {
        Frame::Prim(prim)
    }
}

impl From<DynCodec> for Frame {
    fn from(codec: DynCodec) -> Self {
        Frame::Codec(codec)
    }
}

impl From<Value> for Frame {
    fn from(value: Value) -> Self {
        Frame::Literal(value)
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Prim(p) => f.debug_tuple("Prim").field(p).finish(),
            Frame::Tuple(children) => f.debug_tuple("Tuple").field(children).finish(),
            Frame::Map(fields) => f.debug_tuple("Map").field(fields).finish(),
            Frame::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Frame::Codec(_) => f.write_str("Codec(..)"),
        }
    }
}

/// Reify a frame tree into a codec tree.
pub fn compile(frame: &Frame) -> DynCodec {
    match frame {
        Frame::Codec(codec) => Arc::clone(codec),
        Frame::Prim(prim) => Arc::new(*prim),
        Frame::Literal(value) => Arc::new(LiteralCodec::new(value.clone())),
        Frame::Tuple(children) => Arc::new(TupleCodec::new(children.iter().map(compile).collect())),
        Frame::Map(fields) => Arc::new(MapCodec::new(
            fields
                .iter()
                .map(|(k, f)| (k.clone(), compile(f)))
                .collect(),
        )),
    }
}

/// Bind a name to a lazily compiled codec.
///
/// ```ignore
/// defcodec!(POINT = Frame::tuple([Frame::Prim(Prim::Float64), Frame::Prim(Prim::Float64)]));
/// let bytes = encode(&POINT, &value)?;
/// ```
#[macro_export]
macro_rules! defcodec {
    ($(#[$meta:meta])* $vis:vis $name:ident = $frame:expr) => {
        $(#[$meta])*
        $vis static $name: $crate::once_cell::sync::Lazy<$crate::DynCodec> =
            $crate::once_cell::sync::Lazy::new(|| $crate::compile(&($frame)));
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::codecs::primitive::Prim;
    use crate::traits::codec::Codec;

    #[test]
    fn compile_is_idempotent() {
        let frame = Frame::tuple([Frame::Prim(Prim::Int32), Frame::symbol("tag")]);
        let once = compile(&frame);
        let twice = compile(&Frame::Codec(Arc::clone(&once)));
        assert!(Arc::ptr_eq(&once, &twice));
    }

    #[test]
    fn composite_sizeof_sums_known_children() {
        let frame = Frame::tuple([
            Frame::symbol("a"),
            Frame::Prim(Prim::Byte),
            Frame::Prim(Prim::Float64),
        ]);
        assert_eq!(compile(&frame).sizeof(), Some(9));

        let unknown = Frame::tuple([
            Frame::Prim(Prim::Byte),
            Frame::Codec(crate::models::codecs::string::string("utf-8").unwrap()),
        ]);
        assert_eq!(compile(&unknown).sizeof(), None);
    }

    #[test]
    fn map_frame_compiles_in_declaration_order() {
        let frame = Frame::map([("x", Frame::Prim(Prim::Byte)), ("y", Frame::Prim(Prim::Byte))]);
        let codec = compile(&frame);
        let mut out = bytes::BytesMut::new();
        let value = Value::Map(
            [("x", Value::Int(1)), ("y", Value::Int(2))]
                .into_iter()
                .collect(),
        );
        codec.write(&value, &mut out).unwrap();
        assert_eq!(&out[..], &[1, 2]);
    }
}

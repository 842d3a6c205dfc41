//! Feeding any partition of a valid encoding to a resumable decode session
//! must yield exactly the values the whole buffer yields.
//!
//! Every scenario runs three ways: whole buffer, split at every intermediate
//! position, and one byte at a time.

use std::sync::Arc;

use byteframe::{
    compile, decode_all, encode_all, enumeration_map, finite_frame, header, repeated,
    repeated_delimited, repeated_with_prefix, string, string_delimited, string_integer,
    CodecError, DynCodec, Frame, FrameReader, Prefix, Prim, Value,
};

fn assert_split_invariant(codec: &DynCodec, wire: &[u8], expected: &[Value]) {
    // Whole buffer.
    assert_eq!(decode_all(codec, wire).unwrap(), expected, "whole buffer");

    // Every two-way split.
    for cut in 0..=wire.len() {
        let mut reader = FrameReader::new(Arc::clone(codec));
        let mut got = reader.feed(&wire[..cut]).unwrap();
        got.extend(reader.feed(&wire[cut..]).unwrap());
        reader.finish().unwrap();
        assert_eq!(got, expected, "split at {}", cut);
    }

    // One byte at a time.
    let mut reader = FrameReader::new(Arc::clone(codec));
    let mut got = Vec::new();
    for (i, byte) in wire.iter().enumerate() {
        got.extend(
            reader
                .feed(&[*byte][..])
                .unwrap_or_else(|e| panic!("byte {} of {}: {}", i, wire.len(), e)),
        );
    }
    reader.finish().unwrap();
    assert_eq!(got, expected, "byte by byte");
}

fn roundtrip_under_all_splits(codec: &DynCodec, values: &[Value]) {
    let wire = encode_all(codec, values).unwrap();
    assert_split_invariant(codec, &wire, values);
}

#[test]
fn fixed_width_tuples() {
    let codec = compile(&Frame::tuple([
        Frame::Prim(Prim::Float32),
        Frame::Prim(Prim::Float32),
    ]));
    roundtrip_under_all_splits(
        &codec,
        &[Value::List(vec![Value::Float(1.0), Value::Float(2.0)])],
    );
}

#[test]
fn literal_tagged_tuples() {
    let codec = compile(&Frame::tuple([
        Frame::symbol("a"),
        Frame::Prim(Prim::Byte),
        Frame::Prim(Prim::Float64),
        Frame::symbol("b"),
    ]));
    roundtrip_under_all_splits(
        &codec,
        &[Value::List(vec![
            Value::symbol("a"),
            Value::Int(1),
            Value::Float(2.0),
            Value::symbol("b"),
        ])],
    );
}

#[test]
fn counted_repetition() {
    let codec = repeated(Frame::Prim(Prim::Int32));
    roundtrip_under_all_splits(
        &codec,
        &[Value::List((0..10).map(Value::Int).collect())],
    );
}

#[test]
fn nested_delimited_sequences() {
    let elem = string_delimited("utf-8", &[b"\n"]).unwrap();
    let codec = repeated_delimited(Frame::Codec(elem), &[b"\0"]).unwrap();
    roundtrip_under_all_splits(
        &codec,
        &[Value::List(vec![
            Value::str("foo"),
            Value::str("bar"),
            Value::str("baz"),
        ])],
    );
}

#[test]
fn header_routed_frames() {
    let codec = header(
        Frame::Prim(Prim::Byte),
        |head| match head.as_i64()? {
            1 => Ok(compile(&Frame::tuple([
                Frame::symbol("a"),
                Frame::Prim(Prim::Int16),
            ]))),
            3 => Ok(compile(&Frame::tuple([
                Frame::symbol("c"),
                Frame::Codec(string_delimited("utf-8", &[b"\0"]).unwrap()),
            ]))),
            other => Err(CodecError::ShapeMismatch(format!("unknown tag {}", other))),
        },
        |body| match body.as_list()?.first() {
            Some(Value::Symbol(tag)) if tag == "a" => Ok(Value::Int(1)),
            Some(Value::Symbol(tag)) if tag == "c" => Ok(Value::Int(3)),
            other => Err(CodecError::ShapeMismatch(format!(
                "unroutable body {:?}",
                other
            ))),
        },
    );
    roundtrip_under_all_splits(
        &codec,
        &[
            Value::List(vec![Value::symbol("c"), Value::str("abc")]),
            Value::List(vec![Value::symbol("a"), Value::Int(-7)]),
        ],
    );
}

#[test]
fn enumerations() {
    let codec = enumeration_map(&[("a", 100), ("b", 1000)]).unwrap();
    roundtrip_under_all_splits(&codec, &[Value::symbol("b"), Value::symbol("a")]);
}

#[test]
fn custom_prefixed_repetition() {
    let prefix = Prefix::with(
        Frame::tuple([Frame::Prim(Prim::Byte), Frame::Prim(Prim::Byte)]),
        |head| match head.as_list()? {
            [_, count] => count.as_len(),
            other => Err(CodecError::ShapeMismatch(format!(
                "prefix decoded as {:?}",
                other
            ))),
        },
        |len| {
            Ok(Value::List(vec![
                Value::Int(b'$' as i64),
                Value::Int(len as i64),
            ]))
        },
    );
    let codec = repeated_with_prefix(Frame::Prim(Prim::Int32), prefix);
    roundtrip_under_all_splits(
        &codec,
        &[Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])],
    );
}

#[test]
fn self_delimiting_numeric_strings() {
    let codec = string_integer(string_delimited("ascii", &[b"x"]).unwrap());
    roundtrip_under_all_splits(
        &codec,
        &[
            Value::Int(1),
            Value::Int(23),
            Value::Int(456),
            Value::Int(7890),
        ],
    );
}

#[test]
fn length_prefixed_string_regions() {
    let codec = finite_frame(
        Prefix::new(Frame::Prim(Prim::Int32)),
        Frame::Codec(string("utf-8").unwrap()),
    );
    roundtrip_under_all_splits(&codec, &[Value::str("héllo"), Value::str("x")]);
}

#[test]
fn multibyte_utf8_straddling_every_boundary() {
    let codec = string_delimited("utf-8", &[b"\n"]).unwrap();
    roundtrip_under_all_splits(&codec, &[Value::str("héllo ☃"), Value::str("wörld")]);
}

#[test]
fn empty_repetition_under_splits() {
    let codec = repeated(Frame::Prim(Prim::Int32));
    roundtrip_under_all_splits(&codec, &[Value::List(vec![])]);
}

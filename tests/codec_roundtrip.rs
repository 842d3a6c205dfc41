//! End-to-end wire-format scenarios: exact encoded bytes and full round
//! trips through the public API.

use byteframe::{
    compile, decode, decode_all, encode, encode_all, enumeration_map, finite_frame,
    finite_frame_len, header, repeated, repeated_delimited, repeated_with_prefix, string,
    string_delimited, string_integer, CodecError, DynCodec, Frame, Prefix, Prim, Value,
};

fn ints(range: std::ops::Range<i64>) -> Vec<Value> {
    range.map(Value::Int).collect()
}

#[test]
fn two_float32s() {
    let codec = compile(&Frame::tuple([
        Frame::Prim(Prim::Float32),
        Frame::Prim(Prim::Float32),
    ]));
    let value = Value::List(vec![Value::Float(1.0), Value::Float(2.0)]);

    let wire = encode(&codec, &value).unwrap();
    assert_eq!(&wire[..], &[0x3f, 0x80, 0, 0, 0x40, 0, 0, 0]);
    assert_eq!(decode(&codec, wire).unwrap(), value);
}

#[test]
fn symbol_literals_occupy_no_bytes() {
    let codec = compile(&Frame::tuple([
        Frame::symbol("a"),
        Frame::Prim(Prim::Byte),
        Frame::Prim(Prim::Float64),
        Frame::symbol("b"),
    ]));
    let value = Value::List(vec![
        Value::symbol("a"),
        Value::Int(1),
        Value::Float(2.0),
        Value::symbol("b"),
    ]);

    let wire = encode(&codec, &value).unwrap();
    assert_eq!(wire.len(), 9);
    assert_eq!(&wire[..], &[1, 0x40, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(decode(&codec, wire).unwrap(), value);
}

#[test]
fn counted_int32_repetition() {
    let codec = repeated(Frame::Prim(Prim::Int32));
    let value = Value::List(ints(0..10));

    let wire = encode(&codec, &value).unwrap();
    assert_eq!(wire.len(), 4 + 40);
    assert_eq!(&wire[..4], &[0, 0, 0, 10]);
    assert_eq!(&wire[4..8], &[0, 0, 0, 0]);
    assert_eq!(&wire[40..44], &[0, 0, 0, 9]);
    assert_eq!(decode(&codec, wire).unwrap(), value);
}

#[test]
fn delimited_strings_inside_delimited_sequence() {
    let elem = string_delimited("utf-8", &[b"\n"]).unwrap();
    let codec = repeated_delimited(Frame::Codec(elem), &[b"\0"]).unwrap();
    let value = Value::List(vec![
        Value::str("foo"),
        Value::str("bar"),
        Value::str("baz"),
    ]);

    let wire = encode(&codec, &value).unwrap();
    assert_eq!(&wire[..], b"foo\nbar\nbaz\n\0");
    assert_eq!(decode(&codec, wire).unwrap(), value);
}

fn tagged_codec() -> DynCodec {
    header(
        Frame::Prim(Prim::Byte),
        |head| match head.as_i64()? {
            1 => Ok(compile(&Frame::tuple([
                Frame::symbol("a"),
                Frame::Prim(Prim::Int16),
            ]))),
            2 => Ok(compile(&Frame::tuple([
                Frame::symbol("b"),
                Frame::Prim(Prim::Float32),
            ]))),
            3 => Ok(compile(&Frame::tuple([
                Frame::symbol("c"),
                Frame::Codec(string_delimited("utf-8", &[b"\0"]).unwrap()),
            ]))),
            other => Err(CodecError::ShapeMismatch(format!("unknown tag {}", other))),
        },
        |body| match body.as_list()?.first() {
            Some(Value::Symbol(tag)) if tag == "a" => Ok(Value::Int(1)),
            Some(Value::Symbol(tag)) if tag == "b" => Ok(Value::Int(2)),
            Some(Value::Symbol(tag)) if tag == "c" => Ok(Value::Int(3)),
            other => Err(CodecError::ShapeMismatch(format!(
                "unroutable body {:?}",
                other
            ))),
        },
    )
}

#[test]
fn header_routes_on_decoded_tag() {
    let codec = tagged_codec();
    let value = Value::List(vec![Value::symbol("c"), Value::str("abc")]);

    let wire = encode(&codec, &value).unwrap();
    assert_eq!(&wire[..], &[3, b'a', b'b', b'c', 0]);
    assert_eq!(decode(&codec, wire).unwrap(), value);

    let fixed = Value::List(vec![Value::symbol("a"), Value::Int(-2)]);
    let wire = encode(&codec, &fixed).unwrap();
    assert_eq!(&wire[..], &[1, 0xff, 0xfe]);
    assert_eq!(decode(&codec, wire).unwrap(), fixed);
}

#[test]
fn enumeration_wire_form() {
    let codec = enumeration_map(&[("a", 100), ("b", 1000)]).unwrap();
    let wire = encode(&codec, &Value::symbol("b")).unwrap();
    assert_eq!(&wire[..], &[0x03, 0xe8]);
    assert_eq!(decode(&codec, wire).unwrap(), Value::symbol("b"));
}

#[test]
fn custom_tuple_prefix() {
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
    let value = Value::List(ints(1..4));

    let wire = encode(&codec, &value).unwrap();
    assert_eq!(
        &wire[..],
        &[b'$', 3, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3]
    );
    assert_eq!(decode(&codec, wire).unwrap(), value);
}

#[test]
fn self_delimiting_numeric_strings() {
    let codec = string_integer(string_delimited("ascii", &[b"x"]).unwrap());
    let values = vec![
        Value::Int(1),
        Value::Int(23),
        Value::Int(456),
        Value::Int(7890),
    ];

    let wire = encode_all(&codec, &values).unwrap();
    assert_eq!(&wire[..], b"1x23x456x7890x");
    assert_eq!(decode_all(&codec, wire).unwrap(), values);
}

#[test]
fn length_prefixed_string_region() {
    let codec = finite_frame(
        Prefix::new(Frame::Prim(Prim::Int32)),
        Frame::Codec(string("utf-8").unwrap()),
    );
    let wire = encode(&codec, &Value::str("héllo")).unwrap();
    assert_eq!(&wire[..4], &[0, 0, 0, 6]);
    assert_eq!(decode(&codec, wire).unwrap(), Value::str("héllo"));
}

#[test]
fn constant_length_string_region() {
    let codec = finite_frame_len(2, Frame::Codec(string("ascii").unwrap()));
    let wire = encode(&codec, &Value::str("ok")).unwrap();
    assert_eq!(&wire[..], b"ok");
    assert_eq!(decode(&codec, wire).unwrap(), Value::str("ok"));
}

#[test]
fn primitive_extremes_survive_the_full_pipeline() {
    let codec = compile(&Frame::tuple([
        Frame::Prim(Prim::Int64),
        Frame::Prim(Prim::Int64),
        Frame::Prim(Prim::UInt64),
        Frame::Prim(Prim::Byte),
    ]));
    let value = Value::List(vec![
        Value::Int(i64::MIN),
        Value::Int(i64::MAX),
        Value::UInt(u64::MAX),
        Value::Int(i8::MIN as i64),
    ]);
    let wire = encode(&codec, &value).unwrap();
    assert_eq!(wire.len(), 25);
    assert_eq!(decode(&codec, wire).unwrap(), value);
}

#[test]
fn enumeration_extremes() {
    let codec = enumeration_map(&[("lo", i16::MIN), ("hi", i16::MAX)]).unwrap();
    for tag in ["lo", "hi"] {
        let wire = encode(&codec, &Value::symbol(tag)).unwrap();
        assert_eq!(decode(&codec, wire).unwrap(), Value::symbol(tag));
    }
}

byteframe::defcodec!(GREETING = Frame::tuple([Frame::symbol("hello"), Frame::Prim(Prim::UInt16)]));

#[test]
fn defcodec_binds_a_lazily_compiled_codec() {
    let value = Value::List(vec![Value::symbol("hello"), Value::UInt(258)]);
    let wire = encode(&GREETING, &value).unwrap();
    assert_eq!(&wire[..], &[1, 2]);
    assert_eq!(decode(&GREETING, wire).unwrap(), value);
}

#[test]
fn empty_repetition_is_a_bare_prefix() {
    let codec = repeated(Frame::Prim(Prim::Float64));
    let wire = encode(&codec, &Value::List(vec![])).unwrap();
    assert_eq!(&wire[..], &[0, 0, 0, 0]);
    assert_eq!(decode(&codec, wire).unwrap(), Value::List(vec![]));
}

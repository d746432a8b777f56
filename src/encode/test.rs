//! Tests for encoding.
#![cfg(test)]

use std::sync::Arc;
use bytes::Bytes;
use crate::model::{Format, Model};
use crate::names::IntNames;
use crate::oid::{Oid, OidNames};
use crate::schema::{Definer, Registry};
use crate::time::Time;
use crate::value::{BitString, Object, Value};
use super::*;

fn model<F: FnOnce(&Definer)>(op: F) -> Model {
    let mut registry = Registry::new();
    let id = registry.define("Test", op).unwrap();
    Model::new(Arc::new(registry), id).unwrap()
}

fn encode(model: &Model, value: impl Into<Value>) -> Vec<u8> {
    model.encode(&value.into(), Format::Der).unwrap()
}

fn encode_err(model: &Model, value: impl Into<Value>) -> EncodeError {
    model.encode(&value.into(), Format::Der).unwrap_err()
}

/// Encodes a value, checks the result, and decodes it again.
fn round_trip(model: &Model, value: Value, expected: &[u8]) {
    let data = model.encode(&value, Format::Der).unwrap();
    assert_eq!(data, expected);
    assert_eq!(model.decode(data, Format::Der).unwrap(), value);
}

fn obj<const N: usize>(fields: [(&str, Value); N]) -> Value {
    fields.into_iter().collect::<Object>().into()
}

#[test]
fn explicit_tag() {
    let m = model(|d| { d.explicit(2).octstr(); });
    assert_eq!(encode(&m, &b"X"[..]), b"\xa2\x03\x04\x01X");
    assert_eq!(encode(&m, "X"), b"\xa2\x03\x04\x01X");
}

#[test]
fn tagged_seqof() {
    let mut registry = Registry::new();
    let int = registry.define("Int", |d| { d.int(); }).unwrap();
    let implicit = registry.define("Implicit", |d| {
        d.implicit(0).seqof(int);
    }).unwrap();
    let explicit = registry.define("Explicit", |d| {
        d.explicit(0).seqof(int);
    }).unwrap();
    let registry = Arc::new(registry);

    round_trip(
        &Model::new(registry.clone(), implicit).unwrap(),
        vec![Value::from(1u8)].into(),
        b"\xa0\x03\x02\x01\x01"
    );
    round_trip(
        &Model::new(registry, explicit).unwrap(),
        vec![Value::from(1u8)].into(),
        b"\xa0\x05\x30\x03\x02\x01\x01"
    );
}

#[test]
fn integers() {
    let m = model(|d| { d.int(); });
    assert_eq!(encode(&m, 0u8), b"\x02\x01\x00");
    assert_eq!(encode(&m, 127u8), b"\x02\x01\x7f");
    assert_eq!(encode(&m, 128u8), b"\x02\x01\x80");
    assert_eq!(encode(&m, 0x8011u16), b"\x02\x02\x80\x11");
    assert_eq!(encode(&m, 0x0100u32), b"\x02\x02\x01\x00");

    let err = encode_err(&m, "hello");
    assert_eq!(
        err.to_string(),
        "Encoder error at object path: \"\": \
         string int or enum given, but no values map"
    );

    let m = model(|d| {
        d.enumerated_with(IntNames::new().with(0, "hello").with(1, "world"));
    });
    round_trip(&m, "world".into(), b"\x0a\x01\x01");
    let err = encode_err(&m, "gosh");
    assert_eq!(err.error().to_string(), "values map doesn't contain: \"gosh\"");
}

#[test]
fn default_omitted() {
    let m = model(|d| {
        d.seq().obj([
            d.key("required").def(false).bool(),
            d.key("value").int(),
        ]);
    });
    assert_eq!(
        encode(&m, obj([("required", false.into()), ("value", 1u8.into())])),
        b"\x30\x03\x02\x01\x01"
    );
    assert_eq!(
        encode(&m, obj([("required", true.into()), ("value", 1u8.into())])),
        b"\x30\x06\x01\x01\xff\x02\x01\x01"
    );

    let m = model(|d| {
        d.seq().obj([
            d.key("key").bool(),
            d.key("opt").octstr().def("default"),
        ]);
    });
    let value = obj([("key", true.into()), ("opt", "default".into())]);
    assert_eq!(encode(&m, value), b"\x30\x03\x01\x01\xff");
    let value = obj([("key", true.into()), ("opt", (&b"default"[..]).into())]);
    round_trip(&m, value, b"\x30\x03\x01\x01\xff");
    assert_eq!(
        encode(&m, obj([("key", true.into()), ("opt", "other".into())])),
        b"\x30\x0a\x01\x01\xff\x04\x05other"
    );
}

#[test]
fn default_object_in_any_order() {
    let m = model(|d| {
        d.seq().obj([
            d.key("flag").bool(),
            d.key("opts").seq().obj([
                d.key("x").bool(),
                d.key("y").bool(),
            ]).def(Object::new().with("x", true).with("y", false)),
        ]);
    });
    let opts = Object::new().with("y", false).with("x", true);
    assert_eq!(
        encode(&m, obj([("flag", true.into()), ("opts", opts.into())])),
        b"\x30\x03\x01\x01\xff"
    );
    let opts = Object::new().with("y", true).with("x", true);
    assert_eq!(
        encode(&m, obj([("flag", true.into()), ("opts", opts.into())])),
        b"\x30\x0b\x01\x01\xff\x30\x06\x01\x01\xff\x01\x01\xff"
    );
}

#[test]
fn fields_in_any_order() {
    let m = model(|d| {
        d.seq().obj([d.key("a").bool(), d.key("b").bool()]);
    });
    round_trip(
        &m, obj([("b", false.into()), ("a", true.into())]),
        b"\x30\x06\x01\x01\xff\x01\x01\x00"
    );
}

#[test]
fn optional_fields() {
    let m = model(|d| {
        d.seq().obj([
            d.key("key").bool(),
            d.key("opt").bool().optional(),
            d.key("null").null(),
        ]);
    });
    assert_eq!(
        encode(&m, obj([("key", true.into())])),
        b"\x30\x05\x01\x01\xff\x05\x00"
    );
    assert_eq!(
        encode(&m, obj([("key", true.into()), ("opt", false.into())])),
        b"\x30\x08\x01\x01\xff\x01\x01\x00\x05\x00"
    );
}

#[test]
fn choice() {
    let m = model(|d| {
        d.choice([("apple", d.bool()), ("pear", d.int())]);
    });
    round_trip(&m, Value::choice("apple", true), b"\x01\x01\xff");
    round_trip(&m, Value::choice("pear", 2u8), b"\x02\x01\x02");
    assert_eq!(
        encode_err(&m, Value::choice("plum", true)).error().to_string(),
        "unknown choice alternative \"plum\""
    );
    assert!(m.encode(&true.into(), Format::Der).is_err());
}

#[test]
fn object_identifiers() {
    let data = b"\x06\x0a\x2a\x83\x0e\x03\x0a\x01\x01\x01\x02\x02";
    let oid: Oid = "1.2.398.3.10.1.1.1.2.2".parse().unwrap();

    let m = model(|d| { d.objid(); });
    round_trip(&m, oid.clone().into(), data);
    assert_eq!(encode(&m, "1.2.398.3.10.1.1.1.2.2"), data);
    assert_eq!(
        encode(&m,
            "1.2.398.3.10.1.1.1.2.2".split('.').map(Value::from)
                .collect::<Vec<_>>()
        ),
        data
    );
    assert_eq!(
        encode(&m,
            oid.arcs().iter().map(|&arc| Value::from(arc))
                .collect::<Vec<_>>()
        ),
        data
    );
    assert_eq!(
        encode_err(&m, 1u8).error().to_string(),
        "objid() should be either array or string, got: 1"
    );
    assert!(m.encode(&"1.40".into(), Format::Der).is_err());
    assert!(m.encode(&"foo".into(), Format::Der).is_err());

    let m = model(|d| { d.objid_with(OidNames::new().with(oid, "yes")); });
    round_trip(&m, "yes".into(), data);

    let m = model(|d| { d.relobjid(); });
    round_trip(&m, Oid::new([8571, 3, 2]).into(), b"\x0d\x04\xc2\x7b\x03\x02");
}

#[test]
fn strings() {
    round_trip(
        &model(|d| { d.ia5str(); }),
        "dog and bone".into(),
        b"\x16\x0cdog and bone"
    );
    round_trip(
        &model(|d| { d.printstr(); }),
        "Brahms and Liszt".into(),
        b"\x13\x10Brahms and Liszt"
    );
    round_trip(
        &model(|d| { d.t61str(); }),
        "Oliver Twist".into(),
        b"\x14\x0cOliver Twist"
    );
    round_trip(
        &model(|d| { d.iso646str(); }),
        "septic tank".into(),
        b"\x1a\x0bseptic tank"
    );
    round_trip(
        &model(|d| { d.bmpstr(); }),
        "CertificateTemplate".into(),
        b"\x1e\x26\
          \x00C\x00e\x00r\x00t\x00i\x00f\x00i\x00c\x00a\x00t\x00e\
          \x00T\x00e\x00m\x00p\x00l\x00a\x00t\x00e"
    );
    round_trip(
        &model(|d| { d.bmpstr(); }),
        "Привет".into(),
        b"\x1e\x0c\x04\x1f\x04\x40\x04\x38\x04\x32\x04\x35\x04\x42"
    );
    round_trip(
        &model(|d| { d.utf8str(); }),
        "Grüße".into(),
        b"\x0c\x07Gr\xc3\xbc\xc3\x9fe"
    );
    round_trip(
        &model(|d| { d.objdesc(); }),
        Value::from(&b"280"[..]),
        b"\x07\x03280"
    );
    assert!(
        model(|d| { d.ia5str(); }).encode(&"Привет".into(), Format::Der)
            .is_err()
    );
    assert!(
        model(|d| { d.numstr(); }).encode(&"12a".into(), Format::Der)
            .is_err()
    );
}

#[test]
fn times() {
    let time = Time::new(2024, 1, 2, 3, 4, 5).unwrap();
    round_trip(
        &model(|d| { d.gentime(); }), time.into(),
        b"\x18\x0f20240102030405Z"
    );
    round_trip(
        &model(|d| { d.utctime(); }), time.into(),
        b"\x17\x0d240102030405Z"
    );
    assert!(
        model(|d| { d.utctime(); }).encode(
            &Time::new(2070, 1, 1, 0, 0, 0).unwrap().into(), Format::Der
        ).is_err()
    );
}

#[test]
fn bit_strings() {
    let m = model(|d| { d.bitstr(); });
    round_trip(
        &m, BitString::new(4, Bytes::from_static(b"\xf0")).into(),
        b"\x03\x02\x04\xf0"
    );
    assert_eq!(encode(&m, &b"\xaa"[..]), b"\x03\x02\x00\xaa");
    assert!(
        m.encode(
            &BitString::new(9, Bytes::from_static(b"\x00")).into(),
            Format::Der
        ).is_err()
    );
}

#[test]
fn set_of_is_sorted() {
    let mut registry = Registry::new();
    let int = registry.define("Int", |d| { d.int(); }).unwrap();
    let set = registry.define("Set", |d| { d.setof(int); }).unwrap();
    let m = Model::new(Arc::new(registry), set).unwrap();
    assert_eq!(
        encode(&m, vec![Value::from(3u8), 1u8.into(), 2u8.into()]),
        b"\x31\x09\x02\x01\x01\x02\x01\x02\x02\x01\x03"
    );
}

#[test]
fn long_lengths() {
    let m = model(|d| { d.octstr(); });
    let data = encode(&m, &[0u8; 127][..]);
    assert_eq!(&data[..2], b"\x04\x7f");
    let data = encode(&m, &[0u8; 128][..]);
    assert_eq!(&data[..3], b"\x04\x81\x80");
    assert_eq!(data.len(), 131);
}

#[test]
fn multi_octet_tag() {
    let m = model(|d| { d.implicit(31).int(); });
    assert_eq!(
        encode_err(&m, 1u8).error().to_string(),
        "multi-octet tag encoding unsupported"
    );
}

#[test]
fn any_is_verbatim() {
    let m = model(|d| {
        d.seq().obj([
            d.key("algorithm").objid(),
            d.key("parameters").any().optional(),
        ]);
    });
    let oid: Oid = "1.2.840.113549.1.1.11".parse().unwrap();
    round_trip(
        &m,
        obj([
            ("algorithm", oid.into()),
            ("parameters", Value::from(&b"\x05\x00"[..])),
        ]),
        b"\x30\x0d\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0b\x05\x00"
    );
}

#[test]
fn encapsulated_schema() {
    let mut registry = Registry::new();
    let b = registry.define("B", |d| {
        d.seq().obj([d.key("nested").int()]);
    }).unwrap();
    let a = registry.define("A", |d| { d.octstr().contains(b); }).unwrap();
    let m = Model::new(Arc::new(registry), a).unwrap();
    round_trip(
        &m, obj([("nested", 5u8.into())]), b"\x04\x05\x30\x03\x02\x01\x05"
    );
}

#[test]
fn use_schema() {
    let mut registry = Registry::new();
    let sub = registry.define("Sub", |d| {
        d.seq().obj([d.key("x").octstr()]);
    }).unwrap();
    let plain = registry.define("Plain", |d| {
        d.seq().obj([d.key("a").int(), d.key("sub").use_schema(sub)]);
    }).unwrap();
    let implicit = registry.define("Implicit", |d| {
        d.seq().obj([
            d.key("a").int(),
            d.key("sub").use_schema(sub).implicit(0),
        ]);
    }).unwrap();
    let explicit = registry.define("Explicit", |d| {
        d.seq().obj([
            d.key("a").int(),
            d.key("sub").use_schema(sub).explicit(0),
        ]);
    }).unwrap();
    let dynamic = registry.define("Dynamic", |d| {
        d.seq().obj([
            d.key("a").int(),
            d.key("sub").use_with(move |obj| {
                assert_eq!(obj.get("a"), Some(&Value::from(1u8)));
                Some(sub)
            }),
        ]);
    }).unwrap();
    let registry = Arc::new(registry);
    let value = obj([
        ("a", 1u8.into()),
        ("sub", obj([("x", Value::from(&b"123"[..]))])),
    ]);

    round_trip(
        &Model::new(registry.clone(), plain).unwrap(), value.clone(),
        b"\x30\x0a\x02\x01\x01\x30\x05\x04\x03123"
    );
    round_trip(
        &Model::new(registry.clone(), implicit).unwrap(), value.clone(),
        b"\x30\x0a\x02\x01\x01\xa0\x05\x04\x03123"
    );
    round_trip(
        &Model::new(registry.clone(), explicit).unwrap(), value.clone(),
        b"\x30\x0c\x02\x01\x01\xa0\x07\x30\x05\x04\x03123"
    );
    round_trip(
        &Model::new(registry, dynamic).unwrap(), value,
        b"\x30\x0a\x02\x01\x01\x30\x05\x04\x03123"
    );
}

#[test]
fn optional_use() {
    let mut registry = Registry::new();
    let b = registry.define("B", |d| { d.int(); }).unwrap();
    let a = registry.define("A", |d| { d.use_schema(b).optional(); }).unwrap();
    let m = Model::new(Arc::new(registry), a).unwrap();
    round_trip(&m, 1u8.into(), b"\x02\x01\x01");
}

#[test]
fn recursive_schema() {
    let mut registry = Registry::new();
    let recursive = registry.declare("Recursive");
    let plain = registry.define("Plain", |d| { d.int(); }).unwrap();
    registry.define("Recursive", |d| {
        d.seq().obj([
            d.key("plain").bool(),
            d.key("content").use_with(move |obj| {
                if obj.get("plain") == Some(&Value::Bool(true)) {
                    Some(plain)
                }
                else {
                    Some(recursive)
                }
            }),
        ]);
    }).unwrap();
    let m = Model::new(Arc::new(registry), recursive).unwrap();
    round_trip(
        &m,
        obj([
            ("plain", false.into()),
            ("content", obj([
                ("plain", true.into()),
                ("content", 1u8.into()),
            ])),
        ]),
        b"\x30\x0b\x01\x01\x00\x30\x06\x01\x01\xff\x02\x01\x01"
    );
}

#[test]
fn selector_sees_preceding_fields() {
    let mut registry = Registry::new();
    let int = registry.define("Int", |d| { d.int(); }).unwrap();
    let text = registry.define("Text", |d| { d.utf8str(); }).unwrap();
    let id = registry.define("Test", |d| {
        d.seq().obj([
            d.key("kind").int(),
            d.key("content").use_with(move |obj| {
                assert!(obj.get("trailer").is_none());
                match obj.get("kind").and_then(Value::as_int)?.to_u64()? {
                    0 => Some(int),
                    _ => Some(text),
                }
            }),
            d.key("trailer").bool(),
        ]);
    }).unwrap();
    let m = Model::new(Arc::new(registry), id).unwrap();
    round_trip(
        &m,
        obj([
            ("trailer", true.into()),
            ("content", "a".into()),
            ("kind", 1u8.into()),
        ]),
        b"\x30\x09\x02\x01\x01\x0c\x01a\x01\x01\xff"
    );
    let err = encode_err(
        &m, obj([("content", "a".into()), ("trailer", true.into())])
    );
    assert_eq!(err.path(), "kind");
}

#[test]
fn error_paths() {
    let m = model(|d| {
        d.seq().obj([d.key("key").int()]);
    });
    let err = encode_err(&m, obj([("key", "hello".into())]));
    assert_eq!(err.path(), "key");
    assert!(err.to_string().starts_with("Encoder error at object path: \"key\""));

    let m = model(|d| {
        d.seq().obj([
            d.key("a").seq().obj([
                d.key("b").seq().obj([d.key("c").int()])
            ])
        ]);
    });
    assert_eq!(encode_err(&m, Object::new()).path(), "a");
    assert_eq!(
        encode_err(&m,
            obj([("a", obj([("b", obj([("c", "hello".into())]))]))])
        ).path(),
        "a.b.c"
    );

    let mut registry = Registry::new();
    let s = registry.define("S", |d| {
        d.seq().obj([d.key("x").int()]);
    }).unwrap();
    let id = registry.define("Test", |d| {
        d.seq().obj([d.key("a").seq().obj([d.key("b").use_schema(s)])]);
    }).unwrap();
    let m = Model::new(Arc::new(registry), id).unwrap();
    assert_eq!(
        encode_err(&m,
            obj([("a", obj([("b", obj([("x", "hello".into())]))]))])
        ).path(),
        "a.b.x"
    );

    let mut registry = Registry::new();
    let int = registry.define("Int", |d| { d.int(); }).unwrap();
    let id = registry.define("Test", |d| {
        d.seq().obj([d.key("list").seqof(int)]);
    }).unwrap();
    let m = Model::new(Arc::new(registry), id).unwrap();
    assert_eq!(
        encode_err(&m,
            obj([("list", vec![Value::from(1u8), "x".into()].into())])
        ).path(),
        "list.1"
    );
}

#[test]
fn encode_to_target() {
    let m = model(|d| { d.bool(); });
    let mut target = Vec::new();
    m.encode_to(&true.into(), Format::Der, &mut target).unwrap().unwrap();
    assert_eq!(target, b"\x01\x01\xff");

    let mut target = IoTarget::new(Vec::new());
    m.encode_to(&false.into(), Format::Der, &mut target).unwrap().unwrap();
    m.encode_to(&true.into(), Format::Der, &mut target).unwrap().unwrap();
    assert_eq!(target.written(), 6);
    assert_eq!(target.into_writer(), b"\x01\x01\x00\x01\x01\xff");

    let mut target = bytes::BytesMut::new();
    m.encode_to(&true.into(), Format::Der, &mut target).unwrap().unwrap();
    assert_eq!(target.freeze(), Bytes::from_static(b"\x01\x01\xff"));

    let mut target = IoTarget::new(Vec::new());
    assert!(m.encode_to(&1u8.into(), Format::Der, &mut target).is_err());
    assert_eq!(target.written(), 0);
}

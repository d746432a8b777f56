//! Tests for decoding.
#![cfg(test)]

use std::sync::Arc;
use bytes::Bytes;
use crate::model::{DecodeOptions, Format, Model};
use crate::oid::{Oid, OidNames};
use crate::schema::{Definer, Registry};
use crate::time::Time;
use crate::names::IntNames;
use crate::value::{BitString, Object, Value};
use super::*;

fn model<F: FnOnce(&Definer)>(op: F) -> Model {
    let mut registry = Registry::new();
    let id = registry.define("Test", op).unwrap();
    Model::new(Arc::new(registry), id).unwrap()
}

fn decode(model: &Model, data: &'static [u8]) -> Result<Value, DecodeError> {
    model.decode(data, Format::Der)
}

fn obj<const N: usize>(fields: [(&str, Value); N]) -> Value {
    fields.into_iter().collect::<Object>().into()
}

#[test]
fn optional_fields() {
    let m = model(|d| {
        d.seq().obj([
            d.key("key").bool(),
            d.key("opt").bool().optional(),
        ]);
    });
    assert_eq!(
        decode(&m, b"\x30\x03\x01\x01\xff").unwrap(),
        obj([("key", true.into())])
    );
    assert_eq!(
        decode(&m, b"\x30\x06\x01\x01\xff\x01\x01\x00").unwrap(),
        obj([("key", true.into()), ("opt", false.into())])
    );
}

#[test]
fn default_value() {
    let m = model(|d| {
        d.seq().obj([
            d.key("key").bool(),
            d.key("opt").octstr().def("default"),
        ]);
    });
    assert_eq!(
        decode(&m, b"\x30\x03\x01\x01\xff").unwrap(),
        obj([("key", true.into()), ("opt", (&b"default"[..]).into())])
    );
    assert_eq!(
        decode(&m, b"\x30\x0c\x01\x01\xff\x04\x07default").unwrap(),
        obj([("key", true.into()), ("opt", (&b"default"[..]).into())])
    );
}

#[test]
fn default_in_decoded_form() {
    let names = IntNames::new().with(1, "one");
    let m = model(|d| {
        d.seq().obj([
            d.key("bits").bitstr().def(&b"\xa0"[..]),
            d.key("num").int_with(names).def(1u8),
            d.key("alg").objid().def("1.2.3"),
        ]);
    });
    assert_eq!(
        decode(&m, b"\x30\x00").unwrap(),
        obj([
            ("bits", BitString::new(0, Bytes::from_static(b"\xa0")).into()),
            ("num", "one".into()),
            ("alg", Oid::new([1, 2, 3]).into()),
        ])
    );
}

#[test]
fn indefinite_length() {
    let m = model(|d| {
        d.seq().obj([d.key("key").bool()]);
    });
    assert_eq!(
        decode(&m, b"\x30\x80\x01\x01\xff\x00\x00").unwrap(),
        obj([("key", true.into())])
    );
    assert!(decode(&m, b"\x30\x80\x01\x01\xff").is_err());
    assert!(decode(&m, b"\x30\x80\x01\x01\xff\x00\x01\x00").is_err());
}

#[test]
fn implicit_tag_propagates_into_use() {
    let mut registry = Registry::new();
    let b = registry.define("B", |d| {
        d.seq().obj([d.key("b").octstr()]);
    }).unwrap();
    let a = registry.define("A", |d| {
        d.seq().obj([d.key("a").implicit(0).use_schema(b)]);
    }).unwrap();
    let m = Model::new(Arc::new(registry), a).unwrap();
    assert_eq!(
        decode(&m, b"\x30\x07\xa0\x05\x04\x03123").unwrap(),
        obj([("a", obj([("b", Value::from(&b"123"[..]))]))])
    );
}

#[test]
fn optional_use() {
    let mut registry = Registry::new();
    let b = registry.define("B", |d| { d.int(); }).unwrap();
    let a = registry.define("A", |d| { d.use_schema(b).optional(); }).unwrap();
    let m = Model::new(Arc::new(registry), a).unwrap();
    assert_eq!(decode(&m, b"\x02\x01\x01").unwrap(), 1u8.into());
}

#[test]
fn optional_seqof() {
    let mut registry = Registry::new();
    let b = registry.define("B", |d| {
        d.seq().obj([d.key("num").int()]);
    }).unwrap();
    let a = registry.define("A", |d| {
        d.seq().obj([
            d.key("test1").seqof(b),
            d.key("test2").seqof(b).optional(),
        ]);
    }).unwrap();
    let m = Model::new(Arc::new(registry), a).unwrap();
    let num = |n: u8| obj([("num", n.into())]);

    assert_eq!(
        decode(&m,
            b"\x30\x18\
              \x30\x0a\x30\x03\x02\x01\x01\x30\x03\x02\x01\x02\
              \x30\x0a\x30\x03\x02\x01\x03\x30\x03\x02\x01\x04"
        ).unwrap(),
        obj([
            ("test1", vec![num(1), num(2)].into()),
            ("test2", vec![num(3), num(4)].into()),
        ])
    );
    assert_eq!(
        decode(&m,
            b"\x30\x0c\x30\x0a\x30\x03\x02\x01\x01\x30\x03\x02\x01\x02"
        ).unwrap(),
        obj([("test1", vec![num(1), num(2)].into())])
    );
}

#[test]
fn choice() {
    let m = model(|d| {
        d.choice([("num", d.int()), ("apple", d.bool())]);
    });
    assert_eq!(
        decode(&m, b"\x01\x01\xff").unwrap(),
        Value::choice("apple", true)
    );
    assert_eq!(
        decode(&m, b"\x02\x01\x07").unwrap(),
        Value::choice("num", 7u8)
    );
    let err = decode(&m, b"\x04\x00").unwrap_err();
    assert_eq!(err.error().to_string(), "choice not matched");
    assert_eq!(err.pos(), 0.into());
}

#[test]
fn tag_mismatch_names_field() {
    let m = model(|d| {
        d.seq().obj([
            d.key("a").seq().obj([d.key("b").int()]),
        ]);
    });
    let err = decode(&m, b"\x30\x05\x30\x03\x04\x01\x00").unwrap_err();
    assert_eq!(err.path(), "a.b");
    assert_eq!(err.pos(), 4.into());
    assert_eq!(
        err.to_string(),
        "failed to match tag: expected INTEGER, got OCTET STRING \
         at path \"a.b\" (offset 4)"
    );
}

#[test]
fn explicit_tag() {
    let m = model(|d| { d.explicit(2).octstr(); });
    assert_eq!(
        decode(&m, b"\xa2\x03\x04\x01X").unwrap(),
        Value::from(&b"X"[..])
    );
    assert!(decode(&m, b"\x82\x03\x04\x01X").is_err());
    assert!(decode(&m, b"\x04\x01X").is_err());
}

#[test]
fn trailing_data() {
    let m = model(|d| { d.bool(); });
    let err = decode(&m, b"\x01\x01\xff\x00").unwrap_err();
    assert_eq!(err.error().to_string(), "trailing data");
    assert_eq!(err.pos(), 3.into());
}

#[test]
fn lengths() {
    let m = model(|d| { d.octstr(); });
    let mut data = vec![0x04, 0x7f];
    data.extend_from_slice(&[0xaa; 127]);
    assert_eq!(
        m.decode(data, Format::Der).unwrap().as_bytes().unwrap().len(),
        127
    );
    let mut data = vec![0x04, 0x81, 0x80];
    data.extend_from_slice(&[0xaa; 128]);
    assert_eq!(
        m.decode(data, Format::Der).unwrap().as_bytes().unwrap().len(),
        128
    );
    assert!(decode(&m, b"\x04\x84\x00\x00\x00\x01\x00").is_err());
    assert!(decode(&m, b"\x04\x05abc").is_err());
}

#[test]
fn strings() {
    assert_eq!(
        decode(&model(|d| { d.ia5str(); }),
            b"\x16\x0cdog and bone"
        ).unwrap(),
        "dog and bone".into()
    );
    assert_eq!(
        decode(&model(|d| { d.printstr(); }),
            b"\x13\x10Brahms and Liszt"
        ).unwrap(),
        "Brahms and Liszt".into()
    );
    assert_eq!(
        decode(&model(|d| { d.t61str(); }),
            b"\x14\x0cOliver Twist"
        ).unwrap(),
        "Oliver Twist".into()
    );
    assert_eq!(
        decode(&model(|d| { d.iso646str(); }),
            b"\x1a\x0bseptic tank"
        ).unwrap(),
        "septic tank".into()
    );
    assert_eq!(
        decode(&model(|d| { d.bmpstr(); }),
            b"\x1e\x26\
              \x00C\x00e\x00r\x00t\x00i\x00f\x00i\x00c\x00a\x00t\x00e\
              \x00T\x00e\x00m\x00p\x00l\x00a\x00t\x00e"
        ).unwrap(),
        "CertificateTemplate".into()
    );
    assert_eq!(
        decode(&model(|d| { d.bmpstr(); }),
            b"\x1e\x0c\x04\x1f\x04\x40\x04\x38\x04\x32\x04\x35\x04\x42"
        ).unwrap(),
        "Привет".into()
    );
    assert!(
        decode(&model(|d| { d.printstr(); }), b"\x13\x01@").is_err()
    );
    assert_eq!(
        decode(&model(|d| { d.objdesc(); }), b"\x07\x03280").unwrap(),
        Value::from(&b"280"[..])
    );
}

#[test]
fn object_identifiers() {
    let oid: Oid = "1.2.398.3.10.1.1.1.2.2".parse().unwrap();
    let data = b"\x06\x0a\x2a\x83\x0e\x03\x0a\x01\x01\x01\x02\x02";
    assert_eq!(
        decode(&model(|d| { d.objid(); }), data).unwrap(),
        oid.clone().into()
    );
    assert_eq!(
        decode(
            &model(|d| { d.objid_with(OidNames::new().with(oid, "yes")); }),
            data
        ).unwrap(),
        "yes".into()
    );
    assert_eq!(
        decode(&model(|d| { d.relobjid(); }), b"\x0d\x04\xc2\x7b\x03\x02")
            .unwrap(),
        Oid::new([8571, 3, 2]).into()
    );
}

#[test]
fn scalars() {
    let m = model(|d| {
        d.seq().obj([
            d.key("int").int(),
            d.key("null").null(),
            d.key("time").gentime(),
            d.key("bits").bitstr(),
        ]);
    });
    let value = decode(&m,
        b"\x30\x1b\
          \x02\x02\x01\x00\
          \x05\x00\
          \x18\x0f20240102030405Z\
          \x03\x02\x04\xf0"
    ).unwrap();
    assert_eq!(value.get("int").unwrap().as_int().unwrap().to_u64(), Some(256));
    assert_eq!(value.get("null"), Some(&Value::Null));
    assert_eq!(
        value.get("time").unwrap().as_time(),
        Time::new(2024, 1, 2, 3, 4, 5)
    );
    match value.get("bits") {
        Some(Value::BitString(bits)) => {
            assert_eq!(bits.unused(), 4);
            assert_eq!(bits.bit_len(), 4);
        }
        _ => panic!("not a bit string")
    }

    let m = model(|d| { d.bool(); });
    assert!(decode(&m, b"\x01\x02\xff\xff").is_err());
    assert!(decode(&m, b"\x21\x01\xff").is_err());
    let m = model(|d| { d.null(); });
    assert!(decode(&m, b"\x05\x01\x00").is_err());
}

#[test]
fn any_captures_raw_value() {
    let m = model(|d| {
        d.seq().obj([
            d.key("algorithm").objid(),
            d.key("parameters").any().optional(),
        ]);
    });
    let oid: Oid = "1.2.840.113549.1.1.11".parse().unwrap();
    assert_eq!(
        decode(&m,
            b"\x30\x0d\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0b\x05\x00"
        ).unwrap(),
        obj([
            ("algorithm", oid.clone().into()),
            ("parameters", Value::from(&b"\x05\x00"[..])),
        ])
    );
    assert_eq!(
        decode(&m, b"\x30\x0b\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0b")
            .unwrap(),
        obj([("algorithm", oid.into())])
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
    assert_eq!(
        decode(&m, b"\x04\x05\x30\x03\x02\x01\x05").unwrap(),
        obj([("nested", 5u8.into())])
    );
    assert!(decode(&m, b"\x04\x06\x30\x03\x02\x01\x05\x00").is_err());
}

#[test]
fn tracking() {
    let mut registry = Registry::new();
    let b = registry.define("B", |d| {
        d.seq().obj([d.key("x").int(), d.key("y").int()]);
    }).unwrap();
    let a = registry.define("A", |d| {
        d.seq().obj([
            d.key("a").explicit(0).use_schema(b),
            d.key("b").use_schema(b),
        ]);
    }).unwrap();
    let m = Model::new(Arc::new(registry), a).unwrap();

    let mut tracked = Vec::new();
    let value = m.decode_with(
        &b"\x30\x12\
           \xa0\x08\x30\x06\x02\x01\x01\x02\x01\x02\
           \x30\x06\x02\x01\x03\x02\x01\x04"[..],
        Format::Der,
        DecodeOptions::new().track(|path, start, end| {
            tracked.push((path.to_string(), start, end))
        })
    ).unwrap();
    assert_eq!(
        value,
        obj([
            ("a", obj([("x", 1u8.into()), ("y", 2u8.into())])),
            ("b", obj([("x", 3u8.into()), ("y", 4u8.into())])),
        ])
    );
    let expected = [
        ("a/x", 6, 9), ("a/y", 9, 12), ("a", 4, 12),
        ("b/x", 14, 17), ("b/y", 17, 20), ("b", 12, 20),
        ("", 0, 20),
    ];
    assert_eq!(tracked.len(), expected.len());
    for (item, expected) in tracked.iter().zip(expected) {
        assert_eq!((item.0.as_str(), item.1, item.2), expected);
    }
}

#[test]
fn tracking_drops_failed_alternatives() {
    let m = model(|d| {
        d.choice([
            ("pair", d.seq().obj([d.key("x").int(), d.key("y").int()])),
            ("single", d.seq().obj([d.key("x").int()])),
        ]);
    });
    let mut tracked = Vec::new();
    m.decode_with(
        &b"\x30\x03\x02\x01\x01"[..],
        Format::Der,
        DecodeOptions::new().track(|path, start, end| {
            tracked.push((path.to_string(), start, end))
        })
    ).unwrap();
    assert_eq!(
        tracked,
        [("x".to_string(), 2, 5), (String::new(), 0, 5)]
    );
}

#[test]
fn partial_decode() {
    let m = model(|d| {
        d.seq().obj([
            d.key("a").int(),
            d.key("b").bool(),
            d.key("c").int(),
        ]);
    });
    let res = m.decode_partial(
        &b"\x30\x09\x02\x01\x01\x04\x01\x00\x02\x01\x03"[..],
        Format::Der, DecodeOptions::new()
    );
    assert!(!res.is_complete());
    assert_eq!(
        res.result,
        Some(obj([("a", 1u8.into()), ("c", 3u8.into())]))
    );
    assert_eq!(res.errors.len(), 1);
    assert_eq!(res.errors[0].path(), "b");

    let res = m.decode_partial(
        &b"\x04\x00"[..], Format::Der, DecodeOptions::new()
    );
    assert!(res.result.is_none());
    assert_eq!(res.errors.len(), 1);

    let res = m.decode_partial(
        &b"\x30\x09\x02\x01\x01\x01\x01\x00\x02\x01\x03"[..],
        Format::Der, DecodeOptions::new()
    );
    assert!(res.is_complete());
}

#[test]
fn cursor() {
    let mut cursor = Cursor::new(&b"\x01\x02\x03\x04\x05"[..]);
    assert_eq!(cursor.take_u8().unwrap(), 1);
    let mark = cursor.save();
    let mut sub = cursor.skip(2).unwrap();
    assert_eq!(sub.offset(), 1);
    assert_eq!(sub.take_remaining().as_ref(), b"\x02\x03");
    assert!(sub.is_empty());
    assert_eq!(cursor.span(mark).as_ref(), b"\x02\x03");
    assert!(cursor.skip(3).is_err());
    cursor.restore(mark);
    assert_eq!(cursor.raw_remaining().as_ref(), b"\x02\x03\x04\x05");
}

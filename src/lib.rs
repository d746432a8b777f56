//! Schema-driven encoding and decoding of DER data.
//!
//! This crate allows defining the structure of ASN.1 types at runtime and
//! then encoding and decoding values of these types in the Distinguished
//! Encoding Rules (DER) as defined in ITU-T recommendation X.690.
//!
//! Types are described by schemas which are defined and collected in a
//! [`Registry`]. The [`schema`] module explains how this works. Values are
//! represented by the dynamically typed [`Value`] which mirrors the shape of
//! the schema: sequences with keyed fields become [`Object`]s, sequences of
//! become arrays, choices become a [`Choice`] naming the alternative, and
//! everything else becomes a scalar value.
//!
//! Once all schemas are defined, a [`Model`] for one of them does the
//! actual encoding and decoding:
//!
//! ```
//! use std::sync::Arc;
//! use derschema::{Format, Model, Object, Oid, Registry, Value};
//!
//! let mut registry = Registry::new();
//! let id = registry.define("AlgorithmIdentifier", |d| {
//!     d.seq().obj([
//!         d.key("algorithm").objid(),
//!         d.key("parameters").null().optional(),
//!     ]);
//! }).unwrap();
//! let model = Model::new(Arc::new(registry), id).unwrap();
//!
//! let oid: Oid = "1.2.840.113549.1.1.11".parse().unwrap();
//! let value = Value::from(Object::new().with("algorithm", oid));
//! let data = model.encode(&value, Format::Der).unwrap();
//! assert_eq!(model.decode(data, Format::Der).unwrap(), value);
//! ```
//!
//! Integers are handled as unsigned numbers only. Their content octets are
//! interpreted as a big-endian magnitude without sign.

pub use self::int::Integer;
pub use self::model::{DecodeOptions, Format, Model, PartialDecode};
pub use self::names::IntNames;
pub use self::oid::{Oid, OidNames, ParseOidError};
pub use self::schema::{
    Definer, DefinitionError, DefinitionErrorKind, NodeRef, Registry, SchemaId
};
pub use self::string::StringKind;
pub use self::tag::{Class, Tag};
pub use self::time::Time;
pub use self::value::{BitString, Choice, Object, Value};
pub use self::decode::DecodeError;
pub use self::encode::EncodeError;

pub mod decode;
pub mod encode;
pub mod schema;
pub mod tag;

mod int;
mod length;
mod model;
mod names;
mod oid;
mod string;
mod time;
mod value;
mod walk;

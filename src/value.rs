//! Decoded values.
//!
//! This module contains [`Value`], the dynamically typed result of decoding
//! data with a schema and the input to encoding, together with the types
//! for its composite variants.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::slice;
use bytes::Bytes;
use crate::decode::{Cursor, DecodeError};
use crate::encode::{EncodeError, EncodeNode};
use crate::int::Integer;
use crate::oid::Oid;
use crate::time::Time;


//------------ Value ---------------------------------------------------------

/// A value described by a schema.
///
/// The shape of a value follows the schema it was decoded with: sequences
/// and sets with fields become [`Object`]s, repeated fields become arrays,
/// choices become [`Choice`]s, and everything else becomes a scalar.
///
/// Values compare structurally. This is used when encoding to check whether
/// a field holds its default value and can be left out.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// No value.
    ///
    /// This is the result of a `NULL` as well as of a sequence or set
    /// without any fields.
    Null,

    /// A boolean.
    Bool(bool),

    /// An integer or enumerated value.
    Int(Integer),

    /// Raw octets.
    ///
    /// This is used for octet strings, object descriptors, and the raw
    /// encoded value of `any` nodes.
    Bytes(Bytes),

    /// A bit string.
    BitString(BitString),

    /// A character string or a symbolic name.
    ///
    /// Integers and object identifiers that have a name in the table of
    /// their node decode into their name.
    String(String),

    /// An object identifier.
    Oid(Oid),

    /// A point in time.
    Time(Time),

    /// The elements of a `SEQUENCE OF` or `SET OF`.
    Array(Vec<Value>),

    /// The fields of a `SEQUENCE` or `SET`.
    Object(Object),

    /// The selected alternative of a `CHOICE`.
    Choice(Choice),
}

impl Value {
    /// Creates a choice value.
    pub fn choice(kind: impl Into<String>, value: impl Into<Value>) -> Self {
        Value::Choice(Choice::new(kind, value))
    }

    /// Returns the name of the variant for use in error messages.
    pub fn type_name(&self) -> &'static str {
        match *self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Bytes(_) => "bytes",
            Value::BitString(_) => "bit string",
            Value::String(_) => "string",
            Value::Oid(_) => "oid",
            Value::Time(_) => "time",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Choice(_) => "choice",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(*self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(value) => Some(value),
            _ => None
        }
    }

    pub fn as_int(&self) -> Option<&Integer> {
        match *self {
            Value::Int(ref value) => Some(value),
            _ => None
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match *self {
            Value::Bytes(ref value) => Some(value),
            _ => None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Value::String(ref value) => Some(value.as_str()),
            _ => None
        }
    }

    pub fn as_oid(&self) -> Option<&Oid> {
        match *self {
            Value::Oid(ref value) => Some(value),
            _ => None
        }
    }

    pub fn as_time(&self) -> Option<Time> {
        match *self {
            Value::Time(value) => Some(value),
            _ => None
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match *self {
            Value::Array(ref value) => Some(value.as_slice()),
            _ => None
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match *self {
            Value::Object(ref value) => Some(value),
            _ => None
        }
    }

    pub fn as_choice(&self) -> Option<&Choice> {
        match *self {
            Value::Choice(ref value) => Some(value),
            _ => None
        }
    }

    /// Returns the value of a field if this is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|obj| obj.get(key))
    }
}


//--- From

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Integer> for Value {
    fn from(value: Integer) -> Self {
        Value::Int(value)
    }
}

macro_rules! from_int {
    ( $( $type:ident ),* ) => {
        $(
            impl From<$type> for Value {
                fn from(value: $type) -> Self {
                    Value::Int(value.into())
                }
            }
        )*
    }
}

from_int!(u8, u16, u32, u64, u128, usize);

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Value::Bytes(value)
    }
}

impl<'a> From<&'a [u8]> for Value {
    fn from(value: &'a [u8]) -> Self {
        Value::Bytes(Bytes::copy_from_slice(value))
    }
}

impl From<BitString> for Value {
    fn from(value: BitString) -> Self {
        Value::BitString(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl<'a> From<&'a str> for Value {
    fn from(value: &'a str) -> Self {
        Value::String(value.into())
    }
}

impl From<Oid> for Value {
    fn from(value: Oid) -> Self {
        Value::Oid(value)
    }
}

impl From<Time> for Value {
    fn from(value: Time) -> Self {
        Value::Time(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}

impl From<Choice> for Value {
    fn from(value: Choice) -> Self {
        Value::Choice(value)
    }
}


//------------ Object --------------------------------------------------------

/// The fields of a sequence or set.
///
/// An object is an ordered list of keys and their values. Keys are unique.
/// Decoding adds fields in the order they appear in the schema. The order
/// is only kept for iterating, two objects with the same fields are equal
/// no matter which order their fields were added in.
#[derive(Clone, Debug, Default)]
pub struct Object {
    fields: Vec<(String, Value)>,
}

impl Object {
    /// Creates a new, empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, replacing the value of an existing field with the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|item| item.0 == key) {
            Some(item) => item.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Adds a field and returns the object.
    pub fn with(
        mut self, key: impl Into<String>, value: impl Into<Value>
    ) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the value of a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|item| item.0 == key).map(|item| &item.1)
    }

    /// Removes a field and returns its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.fields.iter().position(|item| item.0 == key)?;
        Some(self.fields.remove(idx).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns an iterator over the keys and values in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|item| (item.0.as_str(), &item.1))
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(key, value)| {
            other.get(key) == Some(value)
        })
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut res = Self::new();
        for (key, value) in iter {
            res.insert(key, value)
        }
        res
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = &'a (String, Value);
    type IntoIter = slice::Iter<'a, (String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}


//------------ Choice --------------------------------------------------------

/// The selected alternative of a choice.
#[derive(Clone, Debug, PartialEq)]
pub struct Choice {
    kind: String,
    value: Box<Value>,
}

impl Choice {
    /// Creates a new choice from the alternative’s name and value.
    pub fn new(kind: impl Into<String>, value: impl Into<Value>) -> Self {
        Choice { kind: kind.into(), value: Box::new(value.into()) }
    }

    /// Returns the name of the selected alternative.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the value of the selected alternative.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Converts the choice into the value of the selected alternative.
    pub fn into_value(self) -> Value {
        *self.value
    }
}


//------------ BitString -----------------------------------------------------

/// A bit string.
///
/// Bit strings are encoded as a sequence of octets with the bits filled
/// from the most significant bit of the first octet. Since the number of
/// bits doesn’t need to be divisible by eight, the value also knows how
/// many bits at the end of the last octet are unused. This count is always
/// between zero and seven and zero if there are no octets.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BitString {
    unused: u8,
    bits: Bytes,
}

impl BitString {
    /// Creates a new bit string.
    ///
    /// The number of unused bits is checked when the bit string is encoded.
    pub fn new(unused: u8, bits: Bytes) -> Self {
        BitString { unused, bits }
    }

    /// Returns the number of unused bits in the last octet.
    pub fn unused(&self) -> u8 {
        self.unused
    }

    /// Returns the octets of the bit string.
    pub fn octet_bytes(&self) -> &Bytes {
        &self.bits
    }

    /// Returns the number of bits in the bit string.
    pub fn bit_len(&self) -> usize {
        (self.bits.len() * 8).saturating_sub(usize::from(self.unused))
    }

    /// Returns the value of the bit at `index`.
    ///
    /// Bits past the end of the string are `false`.
    pub fn bit(&self, index: usize) -> bool {
        if index >= self.bit_len() {
            return false
        }
        self.bits[index / 8] & (0x80 >> (index % 8)) != 0
    }

    /// Takes a bit string from the content octets of a value.
    pub(crate) fn take_content_from(
        cursor: &mut Cursor
    ) -> Result<Self, DecodeError> {
        let pos = cursor.pos();
        let unused = cursor.take_u8()?;
        let bits = cursor.take_remaining();
        if unused > 7 || (bits.is_empty() && unused != 0) {
            return Err(DecodeError::content(
                "invalid bit string with large initial octet", pos
            ))
        }
        Ok(BitString { unused, bits })
    }

    /// Returns the content octets of the encoded bit string.
    pub(crate) fn encode_content(&self) -> Result<EncodeNode, EncodeError> {
        if self.unused > 7 || (self.bits.is_empty() && self.unused != 0) {
            return Err(EncodeError::from_static(
                "invalid number of unused bits in bit string"
            ))
        }
        Ok(EncodeNode::composite(vec![
            self.unused.into(), self.bits.clone().into()
        ]))
    }
}


//============ Tests =========================================================

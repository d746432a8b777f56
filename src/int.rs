//! DER encoded integers.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::{fmt, hash};
use bytes::Bytes;
use crate::decode::{Cursor, DecodeError};
use crate::encode::EncodeNode;


//------------ Integer -------------------------------------------------------

/// An integer of arbitrary size.
///
/// As integers are variable length, this type is just a simple wrapper
/// atop a `Bytes` value containing the big-endian octets of the integer’s
/// magnitude. No arithmetic is provided. Values that fit can be converted
/// into native integers via [`to_u64`][Self::to_u64] and
/// [`to_u128`][Self::to_u128].
///
/// # Limitations
///
/// The value is an unsigned magnitude. When decoding, all content octets are
/// accumulated as a big-endian number without considering the sign bit,
/// and when encoding, the minimal magnitude octets are written without a
/// leading zero octet. Because of this, values with the high bit of their
/// first octet set encode as negative numbers for any two’s complement
/// reader.
//
//  The octets are always kept in their shortest form, i.e., without leading
//  zeros except for the value zero itself, which is a single zero octet.
//  This makes the derived comparisons structural.
#[derive(Clone, Eq, PartialEq)]
pub struct Integer(Bytes);

impl Integer {
    /// Creates an integer from its big-endian magnitude octets.
    ///
    /// Leading zero octets are dropped.
    pub fn from_bytes(bytes: Bytes) -> Self {
        let start = bytes.iter().position(|&x| x != 0);
        match start {
            Some(start) => Integer(bytes.slice(start..)),
            None => Integer(Bytes::from_static(b"\0")),
        }
    }

    /// Creates an integer from a slice with its big-endian magnitude.
    pub fn from_be_slice(slice: &[u8]) -> Self {
        Self::from_bytes(Bytes::copy_from_slice(slice))
    }

    /// Returns the big-endian magnitude octets.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns whether the integer is zero.
    pub fn is_zero(&self) -> bool {
        self.0.as_ref() == b"\0"
    }

    /// Converts the integer into a `u64` if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.0.len() > 8 {
            return None
        }
        Some(self.0.iter().fold(0, |res, &x| (res << 8) | u64::from(x)))
    }

    /// Converts the integer into a `u128` if it fits.
    pub fn to_u128(&self) -> Option<u128> {
        if self.0.len() > 16 {
            return None
        }
        Some(self.0.iter().fold(0, |res, &x| (res << 8) | u128::from(x)))
    }

    /// Takes the integer from the content octets of a value.
    pub(crate) fn take_content_from(
        cursor: &mut Cursor
    ) -> Result<Self, DecodeError> {
        if cursor.is_empty() {
            return Err(DecodeError::content(
                "invalid integer: no content octets", cursor.pos()
            ))
        }
        Ok(Self::from_bytes(cursor.take_remaining()))
    }

    /// Returns the content octets of the encoded integer.
    pub(crate) fn encode_content(&self) -> EncodeNode {
        EncodeNode::Bytes(self.0.clone())
    }
}


//--- From

macro_rules! from_impl {
    ( $( $type:ident ),* ) => {
        $(
            impl From<$type> for Integer {
                fn from(value: $type) -> Self {
                    Self::from_be_slice(&value.to_be_bytes())
                }
            }
        )*
    }
}

from_impl!(u8, u16, u32, u64, u128, usize);


//--- Hash

impl hash::Hash for Integer {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.0.as_ref().hash(state)
    }
}


//--- Display and Debug

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.to_u128() {
            Some(value) => value.fmt(f),
            None => {
                f.write_str("0x")?;
                for octet in self.0.iter() {
                    write!(f, "{:02x}", octet)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Integer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Integer({})", self)
    }
}


//============ Tests =========================================================

//! The length octets.
//!
//! This is a private module. Its public items are re-exported by the parent.

use crate::decode::{Cursor, DecodeError};


//------------ Length -------------------------------------------------------

/// The length octets of an encoded value.
///
/// A length value can either be definite, meaning it provides the actual
/// number of content octets in the value, or indefinite, in which case the
/// content is delimited by a special end-of-contents marker.
///
/// # Encoding
///
/// The length can be encoded in one of two basic ways. Which one is used is
/// determined by the most significant bit of the first octet. If it is not
/// set, the length octets is one octet long and the remaining bits of this
/// first octet provide the definite length. Thus, if the first octet is
/// less than 128, it provides the definite length already.
///
/// If the most significant bit is set, the remaining bits of the first
/// octet specify the number of octets that follow to encode the actual
/// length. If they specify that there are zero more octets, i.e., the
/// value of the first octet is 128, the length is indefinite. Otherwise,
/// those following octets give the big-endian encoding of the definite
/// length of the content octets.
///
/// DER only ever produces definite lengths in their shortest form. When
/// decoding, we accept indefinite lengths on constructed values and don’t
/// insist on the shortest form.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Length {
    /// A definite length.
    Definite(usize),

    /// An indefinite length.
    Indefinite,
}

impl Length {
    /// The maximum number of octets following a long form first octet.
    const MAX_LONG_OCTETS: usize = 3;

    /// Returns the length if it is definite.
    pub fn definite(self) -> Option<usize> {
        match self {
            Length::Definite(len) => Some(len),
            Length::Indefinite => None,
        }
    }

    /// Takes the length octets from the beginning of a cursor.
    ///
    /// The indefinite form is only allowed for constructed values. Long
    /// forms with four or more length octets are rejected.
    pub fn take_from(
        cursor: &mut Cursor, constructed: bool
    ) -> Result<Self, DecodeError> {
        let pos = cursor.pos();
        let first = cursor.take_u8()?;

        // Bit 7 clear: single.
        if first & 0x80 == 0 {
            return Ok(Length::Definite(usize::from(first)))
        }

        let octets = usize::from(first & 0x7f);
        if octets == 0 {
            if constructed {
                return Ok(Length::Indefinite)
            }
            return Err(DecodeError::content(
                "indefinite length in primitive value", pos
            ))
        }
        if octets > Self::MAX_LONG_OCTETS {
            return Err(DecodeError::content("length octets too long", pos))
        }

        let mut len = 0usize;
        for _ in 0..octets {
            len = (len << 8) | usize::from(cursor.take_u8()?);
        }
        Ok(Length::Definite(len))
    }

    /// Returns the length of the encoded representation of a definite length.
    pub fn encoded_len(len: usize) -> usize {
        if len > 0x7F {
            Self::LEN - Self::encoded_start_idx(len) + 1
        }
        else {
            1
        }
    }

    /// Appends the encoded definite length to the end of `target`.
    pub fn append_encoded(len: usize, target: &mut Vec<u8>) {
        if len > 0x7F {
            let idx = Self::encoded_start_idx(len);
            debug_assert!(idx < Self::LEN);

            // LEN will never be greater than 126 bytes. Also, `idx` won’t be
            // greater than LEN, so the subtraction here is fine.
            target.push(((Self::LEN - idx) | 0x80) as u8);
            target.extend_from_slice(&len.to_be_bytes()[idx..])
        }
        else {
            target.push(len as u8)
        }
    }

    /// The number of octets in a `usize`.
    const LEN: usize = std::mem::size_of::<usize>();

    /// Returns the index of the first non-zero octet of `len`.
    fn encoded_start_idx(len: usize) -> usize {
        (len.leading_zeros() / 8) as usize
    }
}


//============ Tests =========================================================

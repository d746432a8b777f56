//! The byte cursor all decoding reads from.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::{fmt, ops};
use bytes::Bytes;
use super::error::DecodeError;


//------------ Cursor --------------------------------------------------------

/// A bounded, forward-only read position within a byte sequence.
///
/// The cursor keeps the complete underlying data as a [`Bytes`] value and
/// its current offset and bound as absolute indexes into that data. Because
/// of this, sub-cursors created via [`skip`][Self::skip] alias the same
/// storage without copying and all positions reported by any cursor derived
/// from the same data are comparable.
///
/// The cursor only ever moves forward except when it is explicitly reset to
/// an earlier [`Mark`] via [`restore`][Self::restore].
#[derive(Clone)]
pub struct Cursor {
    /// The complete data.
    data: Bytes,

    /// The offset of the next octet to read.
    offset: usize,

    /// The offset one past the last octet we are allowed to read.
    end: usize,
}

impl Cursor {
    /// Creates a new cursor covering all of `data`.
    pub fn new(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let end = data.len();
        Cursor { data, offset: 0, end }
    }

    /// Returns the current position for diagnostics.
    pub fn pos(&self) -> Pos {
        Pos(self.offset)
    }

    /// Returns the absolute offset of the next octet.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the absolute offset of the bound of the cursor.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Returns the number of octets left before the bound.
    pub fn remaining(&self) -> usize {
        self.end - self.offset
    }

    /// Returns whether the cursor has reached its bound.
    pub fn is_empty(&self) -> bool {
        self.offset == self.end
    }

    /// Returns the next octet without advancing.
    pub fn peek_u8(&self) -> Option<u8> {
        if self.is_empty() {
            None
        }
        else {
            Some(self.data[self.offset])
        }
    }

    /// Takes a single octet from the cursor.
    ///
    /// If there aren’t any more octets available, returns a content error.
    pub fn take_u8(&mut self) -> Result<u8, DecodeError> {
        match self.peek_u8() {
            Some(octet) => {
                self.offset += 1;
                Ok(octet)
            }
            None => {
                Err(DecodeError::content("unexpected end of data", self.pos()))
            }
        }
    }

    /// Advances over `len` octets and returns a cursor covering them.
    ///
    /// If fewer than `len` octets are left, returns an error and leaves the
    /// cursor where it was.
    pub fn skip(&mut self, len: usize) -> Result<Cursor, DecodeError> {
        if len > self.remaining() {
            return Err(DecodeError::content(
                "unexpected end of data", self.pos()
            ))
        }
        let res = Cursor {
            data: self.data.clone(),
            offset: self.offset,
            end: self.offset + len,
        };
        self.offset += len;
        Ok(res)
    }

    /// Takes all remaining octets.
    pub fn take_remaining(&mut self) -> Bytes {
        let res = self.raw_remaining();
        self.offset = self.end;
        res
    }

    /// Returns a mark for the current position.
    pub fn save(&self) -> Mark {
        Mark(self.offset)
    }

    /// Resets the cursor to a previously saved mark.
    ///
    /// The mark must have been taken from this cursor or from the cursor it
    /// was created from.
    pub fn restore(&mut self, mark: Mark) {
        debug_assert!(mark.0 <= self.end);
        self.offset = mark.0;
    }

    /// Returns the octets consumed since `mark` was taken.
    pub fn span(&self, mark: Mark) -> Bytes {
        self.data.slice(mark.0..self.offset)
    }

    /// Returns the unconsumed octets without advancing.
    pub fn raw_remaining(&self) -> Bytes {
        self.data.slice(self.offset..self.end)
    }

    /// Returns a cursor for the range between `start` and `end`.
    ///
    /// This is used for the content of indefinite length values where the
    /// content ends before the end-of-contents marker.
    pub(crate) fn sub(&self, start: Mark, end: Mark) -> Cursor {
        debug_assert!(start.0 <= end.0 && end.0 <= self.data.len());
        Cursor { data: self.data.clone(), offset: start.0, end: end.0 }
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("offset", &self.offset)
            .field("end", &self.end)
            .finish()
    }
}


//------------ Mark ----------------------------------------------------------

/// A saved position of a cursor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Mark(usize);

impl Mark {
    /// Returns the absolute offset of the mark.
    pub fn offset(self) -> usize {
        self.0
    }
}


//------------ Pos -----------------------------------------------------------

/// The logical position within the data.
///
/// Values of this type are only used for diagnostics.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Pos(usize);

impl From<usize> for Pos {
    fn from(pos: usize) -> Pos {
        Pos(pos)
    }
}

impl From<Pos> for usize {
    fn from(pos: Pos) -> usize {
        pos.0
    }
}

impl ops::Add for Pos {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Pos(self.0 + rhs.0)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}


//============ Tests =========================================================

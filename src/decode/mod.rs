//! Decoding data in DER.
//!
//! This module contains the types used while reading encoded data. All
//! decoding starts out with a [`Cursor`] over the complete data. Since the
//! data is kept in a [`Bytes`][bytes::Bytes] value, values such as octet
//! strings can be handed out without copying.
//!
//! The actual decoder walks a schema and is used through
//! [`Model::decode`][crate::Model::decode] and friends. If anything goes
//! wrong, a [`DecodeError`] describes what happened, where in the data it
//! happened, and which field of the value was affected.

pub use self::cursor::{Cursor, Mark, Pos};
pub use self::error::{ContentError, DecodeError};

pub(crate) use self::der::{DecodeContext, TrackEvent};

mod cursor;
mod der;
mod error;

#[cfg(test)]
mod test;

//! The tree of encoded data.
//!
//! This is an internal module. The relevant items are re-exported by the
//! parent.

use bytes::Bytes;
use crate::length::Length;
use crate::tag::Ident;
use super::error::EncodeError;
use super::target::{Target, infallible};


//------------ EncodeNode ----------------------------------------------------

/// A piece of encoded output.
///
/// The encoder doesn’t write its output directly into a buffer. Because the
/// length of a constructed value has to be written before its content, the
/// encoder instead builds a tree of nodes. Each node knows its exact length
/// when it is created, so a parent can produce its length octets right
/// away. Once the tree for the whole value is complete, it is flattened
/// into a target via [`write_encoded`][Self::write_encoded].
#[derive(Clone, Debug)]
pub enum EncodeNode {
    /// A single octet.
    Octet(u8),

    /// A sequence of octets.
    Bytes(Bytes),

    /// An ordered list of other nodes.
    Composite {
        /// The sum of the lengths of all items.
        len: usize,

        /// The items.
        items: Vec<EncodeNode>,
    },
}

impl EncodeNode {
    /// Returns a node without any content.
    pub fn empty() -> Self {
        EncodeNode::Bytes(Bytes::new())
    }

    /// Creates a composite node from a list of nodes.
    pub fn composite(items: Vec<EncodeNode>) -> Self {
        let len = items.iter().map(EncodeNode::encoded_len).sum();
        EncodeNode::Composite { len, items }
    }

    /// Creates a complete value from its identifier and content.
    ///
    /// The result is a composite of the identifier and length octets and
    /// the content.
    pub fn value(ident: Ident, content: EncodeNode) -> Result<Self, EncodeError> {
        let len = content.encoded_len();
        let mut header = Vec::with_capacity(1 + Length::encoded_len(len));
        header.push(ident.to_octet()?);
        Length::append_encoded(len, &mut header);
        Ok(Self::composite(vec![header.into(), content]))
    }

    /// Returns the number of octets the node will produce.
    pub fn encoded_len(&self) -> usize {
        match *self {
            EncodeNode::Octet(_) => 1,
            EncodeNode::Bytes(ref bytes) => bytes.len(),
            EncodeNode::Composite { len, .. } => len,
        }
    }

    /// Writes the encoded data to `target`.
    pub fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        target.reserve(self.encoded_len());
        self.put_into(target)
    }

    fn put_into<T: Target>(&self, target: &mut T) -> Result<(), T::Error> {
        match *self {
            EncodeNode::Octet(octet) => target.put_u8(octet),
            EncodeNode::Bytes(ref bytes) => target.put_slice(bytes),
            EncodeNode::Composite { ref items, .. } => {
                for item in items {
                    item.put_into(target)?
                }
                Ok(())
            }
        }
    }

    /// Flattens the tree into a new vec.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut target = Vec::new();
        infallible(self.write_encoded(&mut target));
        target
    }
}


//--- From

impl From<u8> for EncodeNode {
    fn from(octet: u8) -> Self {
        EncodeNode::Octet(octet)
    }
}

impl From<Bytes> for EncodeNode {
    fn from(bytes: Bytes) -> Self {
        EncodeNode::Bytes(bytes)
    }
}

impl From<Vec<u8>> for EncodeNode {
    fn from(vec: Vec<u8>) -> Self {
        EncodeNode::Bytes(vec.into())
    }
}

impl<'a> From<&'a str> for EncodeNode {
    fn from(s: &'a str) -> Self {
        EncodeNode::Bytes(Bytes::copy_from_slice(s.as_bytes()))
    }
}


//============ Tests =========================================================

//! Encoding data in DER.
//!
//! Encoding happens in two steps. First, the value is walked alongside its
//! schema and turned into a tree of [`EncodeNode`]s. Because every node
//! knows its length, the length octets of constructed values can be
//! produced without any further passes. Second, the tree is written out
//! into a [`Target`].
//!
//! The encoder is used through [`Model::encode`][crate::Model::encode]. If
//! a value doesn’t fit its schema, an [`EncodeError`] names the field that
//! failed.

pub use self::error::EncodeError;
pub use self::target::{IoTarget, Target};
pub use self::tree::EncodeNode;

pub(crate) use self::der::EncodeContext;

mod der;
mod error;
mod target;
mod tree;

#[cfg(test)]
mod test;

//! Defining schemas.
//!
//! A schema describes the structure of a value using the types of ASN.1.
//! It is a tree of [`Node`]s, each describing one type. Schemas are defined
//! through a [`Registry`] which collects all the schemas that refer to each
//! other.
//!
//! The nodes of a schema are created inside the closure given to
//! [`Registry::define`] using the [`Definer`] it receives. For example,
//! the ASN.1 type
//!
//! ```text
//! AlgorithmIdentifier ::= SEQUENCE {
//!     algorithm   OBJECT IDENTIFIER,
//!     parameters  ANY OPTIONAL
//! }
//! ```
//!
//! is defined like this:
//!
//! ```
//! use derschema::Registry;
//!
//! let mut registry = Registry::new();
//! registry.define("AlgorithmIdentifier", |d| {
//!     d.seq().obj([
//!         d.key("algorithm").objid(),
//!         d.key("parameters").any().optional(),
//!     ]);
//! }).unwrap();
//! ```
//!
//! Schemas can use other schemas via [`NodeRef::use_schema`]. A schema that
//! needs to refer to itself, or to a schema that will be defined later,
//! can get its identifier beforehand via [`Registry::declare`]:
//!
//! ```
//! use derschema::Registry;
//!
//! let mut registry = Registry::new();
//! let list = registry.declare("List");
//! registry.define("List", |d| {
//!     d.seq().obj([
//!         d.key("head").int(),
//!         d.key("tail").use_schema(list).optional(),
//!     ]);
//! }).unwrap();
//! ```

pub use self::builder::{Definer, NodeRef};
pub use self::node::{Kind, Node, NodeId, Selector, Use};
pub use self::registry::{
    DefinitionError, DefinitionErrorKind, Registry, SchemaId, Tree
};

mod builder;
mod node;
mod registry;

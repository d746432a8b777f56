//! The nodes of a schema tree.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::{fmt, sync::Arc};
use bytes::Bytes;
use crate::names::IntNames;
use crate::oid::{Oid, OidNames};
use crate::string::StringKind;
use crate::tag::Tag;
use crate::value::{BitString, Object, Value};
use super::registry::SchemaId;


//------------ NodeId --------------------------------------------------------

/// The index of a node within the tree of a schema.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}


//------------ Node ----------------------------------------------------------

/// A node of a schema tree.
///
/// Each node describes one ASN.1 type together with its use as a field:
/// the field’s key, whether it is optional, and how it is tagged.
///
/// A node either has a type of its own, available through
/// [`kind`][Self::kind], or delegates to another schema via
/// [`uses`][Self::uses]. Nodes are created by a
/// [`Definer`][super::Definer] and are immutable once the schema has been
/// defined.
#[derive(Clone, Debug, Default)]
pub struct Node {
    pub(crate) kind: Option<Kind>,
    pub(crate) key: Option<String>,
    pub(crate) optional: bool,
    pub(crate) default: Option<Value>,
    pub(crate) explicit: Option<u32>,
    pub(crate) implicit: Option<u32>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) uses: Option<Use>,
    pub(crate) contains: Option<SchemaId>,
}

impl Node {
    /// Returns the type of the node.
    ///
    /// This is `None` for nodes that use another schema.
    pub fn kind(&self) -> Option<&Kind> {
        self.kind.as_ref()
    }

    /// Returns the key of the field described by the node.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns whether the field may be absent.
    ///
    /// This is also true for fields with a default value.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns the default value of the field.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns the number of the explicit context specific tag.
    pub fn explicit(&self) -> Option<u32> {
        self.explicit
    }

    /// Returns the number of the implicit context specific tag.
    pub fn implicit(&self) -> Option<u32> {
        self.implicit
    }

    /// Returns the fields of a sequence or set node.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns whether the node’s value is an object of its fields.
    pub fn is_obj(&self) -> bool {
        !self.children.is_empty()
    }

    /// Returns the schema the node delegates to.
    pub fn uses(&self) -> Option<&Use> {
        self.uses.as_ref()
    }

    /// Returns the schema of the value encapsulated in an octet string.
    pub fn contains(&self) -> Option<SchemaId> {
        self.contains
    }

    /// Returns a short description of the node for error messages.
    pub(crate) fn describe(&self) -> String {
        match (self.key(), self.kind()) {
            (Some(key), _) => format!("\"{}\"", key),
            (None, Some(kind)) => kind.name().into(),
            (None, None) if self.uses.is_some() => "use".into(),
            (None, None) => "untyped node".into(),
        }
    }
}


//------------ Kind ----------------------------------------------------------

/// The type of a schema node.
#[derive(Clone, Debug)]
pub enum Kind {
    /// A `SEQUENCE` with the node’s children as fields.
    Seq,

    /// A `SET` with the node’s children as fields.
    ///
    /// The fields are expected in the order of the children.
    Set,

    /// A `SEQUENCE OF` the given schema.
    SeqOf(SchemaId),

    /// A `SET OF` the given schema.
    SetOf(SchemaId),

    /// A `CHOICE` between the named alternatives.
    Choice(Vec<(String, NodeId)>),

    /// Any value, kept as its raw encoding.
    Any,

    /// An `OCTET STRING`.
    OctStr,

    /// A `BIT STRING`.
    BitStr,

    /// An `INTEGER` with optional names for its values.
    Int(Option<IntNames>),

    /// An `ENUMERATED` with optional names for its values.
    Enum(Option<IntNames>),

    /// A `BOOLEAN`.
    Bool,

    /// A `NULL`.
    Null,

    /// An `OBJECT IDENTIFIER` or `RELATIVE-OID`.
    ObjId {
        /// Optional names for object identifiers.
        names: Option<OidNames>,

        /// Whether this is a relative object identifier.
        relative: bool,
    },

    /// A `GeneralizedTime`.
    GenTime,

    /// A `UTCTime`.
    UtcTime,

    /// A character string.
    Str(StringKind),

    /// An `ObjectDescriptor`.
    ObjDesc,
}

impl Kind {
    /// Returns the name of the kind as used by the builder.
    pub fn name(&self) -> &'static str {
        match *self {
            Kind::Seq => "seq",
            Kind::Set => "set",
            Kind::SeqOf(_) => "seqof",
            Kind::SetOf(_) => "setof",
            Kind::Choice(_) => "choice",
            Kind::Any => "any",
            Kind::OctStr => "octstr",
            Kind::BitStr => "bitstr",
            Kind::Int(_) => "int",
            Kind::Enum(_) => "enum",
            Kind::Bool => "bool",
            Kind::Null => "null",
            Kind::ObjId { relative: false, .. } => "objid",
            Kind::ObjId { relative: true, .. } => "relobjid",
            Kind::GenTime => "gentime",
            Kind::UtcTime => "utctime",
            Kind::Str(kind) => kind.name(),
            Kind::ObjDesc => "objDesc",
        }
    }

    /// Returns the universal tag of values of this kind.
    ///
    /// Choices and `any` don’t have a tag of their own.
    pub fn tag(&self) -> Option<Tag> {
        match *self {
            Kind::Seq | Kind::SeqOf(_) => Some(Tag::SEQUENCE),
            Kind::Set | Kind::SetOf(_) => Some(Tag::SET),
            Kind::Choice(_) | Kind::Any => None,
            Kind::OctStr => Some(Tag::OCTET_STRING),
            Kind::BitStr => Some(Tag::BIT_STRING),
            Kind::Int(_) => Some(Tag::INTEGER),
            Kind::Enum(_) => Some(Tag::ENUMERATED),
            Kind::Bool => Some(Tag::BOOLEAN),
            Kind::Null => Some(Tag::NULL),
            Kind::ObjId { relative: false, .. } => Some(Tag::OID),
            Kind::ObjId { relative: true, .. } => Some(Tag::RELATIVE_OID),
            Kind::GenTime => Some(Tag::GENERALIZED_TIME),
            Kind::UtcTime => Some(Tag::UTC_TIME),
            Kind::Str(kind) => Some(kind.tag()),
            Kind::ObjDesc => Some(Tag::OBJECT_DESCRIPTOR),
        }
    }

    /// Returns whether values of this kind use the constructed encoding.
    pub fn is_constructed(&self) -> bool {
        matches!(
            *self,
            Kind::Seq | Kind::Set | Kind::SeqOf(_) | Kind::SetOf(_)
        )
    }

    /// Returns whether the kind can have fields.
    pub fn is_composite(&self) -> bool {
        matches!(*self, Kind::Seq | Kind::Set)
    }

    /// Converts a default value into the shape decoding produces.
    ///
    /// Values given in any of the other forms the encoder accepts are
    /// converted so that an absent field decodes the same as a present
    /// one. Everything else is returned unchanged.
    pub(crate) fn decoded_form(&self, value: Value) -> Value {
        match (self, value) {
            (Kind::OctStr | Kind::ObjDesc, Value::String(s)) => {
                Value::Bytes(Bytes::from(s.into_bytes()))
            }
            (Kind::BitStr, Value::Bytes(bytes)) => {
                Value::BitString(BitString::new(0, bytes))
            }
            (Kind::Int(Some(names)) | Kind::Enum(Some(names)),
             Value::Int(int)) => {
                match names.name(&int) {
                    Some(name) => Value::String(name.into()),
                    None => Value::Int(int),
                }
            }
            (Kind::ObjId { names, .. }, value) => {
                let oid = match value {
                    Value::Oid(oid) => oid,
                    Value::String(s) => {
                        let known = names.as_ref().map(|names| {
                            names.oid(&s).is_some()
                        }).unwrap_or(false);
                        match s.parse::<Oid>() {
                            Ok(oid) if !known => oid,
                            _ => return Value::String(s),
                        }
                    }
                    value => return value,
                };
                match names.as_ref().and_then(|names| names.name(&oid)) {
                    Some(name) => Value::String(name.into()),
                    None => Value::Oid(oid),
                }
            }
            (_, value) => value,
        }
    }

    /// Returns the schemas referenced by the kind.
    pub(crate) fn schema_ref(&self) -> Option<SchemaId> {
        match *self {
            Kind::SeqOf(id) | Kind::SetOf(id) => Some(id),
            _ => None
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}


//------------ Use -----------------------------------------------------------

/// The schema a node delegates to.
#[derive(Clone)]
pub enum Use {
    /// Always the given schema.
    Fixed(SchemaId),

    /// A schema chosen while walking.
    ///
    /// The selector receives the fields of the enclosing object that
    /// precede the node. If it returns `None`, the walk fails.
    Dynamic(Selector),
}

impl fmt::Debug for Use {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Use::Fixed(id) => f.debug_tuple("Fixed").field(&id).finish(),
            Use::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}


//------------ Selector ------------------------------------------------------

/// A function choosing a schema based on the enclosing object.
pub type Selector = Arc<dyn Fn(&Object) -> Option<SchemaId> + Send + Sync>;

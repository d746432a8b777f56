//! Encoding values as DER according to a schema.
//!
//! This is a private module. The encoder is used via
//! [`Model`][crate::Model].

use crate::oid::{Oid, OidNames};
use crate::schema::{Kind, Node, NodeId, Registry, SchemaId, Tree, Use};
use crate::tag::{Ident, Tag};
use crate::value::{BitString, Object, Value};
use crate::walk::{Path, Segment, Tagging};
use super::error::EncodeError;
use super::tree::EncodeNode;


//------------ EncodeContext -------------------------------------------------

/// The state of encoding a single value.
pub(crate) struct EncodeContext<'a> {
    /// The registry with all the schemas.
    registry: &'a Registry,

    /// The keys and indexes leading to the current node.
    path: Path<'a>,
}

impl<'a> EncodeContext<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        EncodeContext { registry, path: Path::default() }
    }

    /// Encodes a complete value of the given schema.
    pub fn encode(
        &mut self, value: &Value, schema: SchemaId
    ) -> Result<EncodeNode, EncodeError> {
        self.encode_schema(value, schema, None, &Object::new())
    }

    fn encode_schema(
        &mut self,
        value: &Value,
        schema: SchemaId,
        implicit: Option<u32>,
        parent: &Object,
    ) -> Result<EncodeNode, EncodeError> {
        let tree = self.registry.tree(schema).ok_or_else(|| {
            EncodeError::from_static("undefined schema")
        })?;
        let node = tree.node(tree.root());
        self.scoped(node.key().map(Segment::Key), |ctx| {
            ctx.encode_value(
                value, tree, node, Tagging::new(node, implicit), parent
            )
        })
    }

    /// Encodes a node that may be omitted.
    ///
    /// Returns `Ok(None)` if the node isn’t to be present in the output:
    /// if there is no value for an optional node or the value encodes the
    /// same as the node’s default.
    fn encode_node(
        &mut self,
        value: Option<&Value>,
        tree: &'a Tree,
        id: NodeId,
        parent: &Object,
    ) -> Result<Option<EncodeNode>, EncodeError> {
        let node = tree.node(id);
        self.scoped(node.key().map(Segment::Key), |ctx| {
            if let (Some(value), Some(default)) = (value, node.default_value()) {
                if value == default {
                    return Ok(None)
                }
            }
            let value = match value {
                Some(value) => value,
                None if node.is_optional() => return Ok(None),
                None if accepts_null(node) => &NULL,
                None => {
                    return Err(EncodeError::from_static(
                        "missing required value"
                    ))
                }
            };
            let res = ctx.encode_value(
                value, tree, node, Tagging::new(node, None), parent
            )?;
            if ctx.is_default(&res, tree, node, parent) {
                return Ok(None)
            }
            Ok(Some(res))
        })
    }

    /// Returns whether `encoded` is the encoding of the node’s default.
    ///
    /// The same value can be given in different forms, e.g., octets as a
    /// string or bytes, so the encodings are compared.
    fn is_default(
        &mut self,
        encoded: &EncodeNode,
        tree: &'a Tree,
        node: &'a Node,
        parent: &Object,
    ) -> bool {
        let default = match node.default_value() {
            Some(default) => default,
            None => return false,
        };
        match self.encode_value(
            default, tree, node, Tagging::new(node, None), parent
        ) {
            Ok(default) => {
                default.encoded_len() == encoded.encoded_len()
                    && default.to_vec() == encoded.to_vec()
            }
            Err(_) => false,
        }
    }

    /// Encodes a value including its explicit tag.
    fn encode_value(
        &mut self,
        value: &Value,
        tree: &'a Tree,
        node: &'a Node,
        tagging: Tagging,
        parent: &Object,
    ) -> Result<EncodeNode, EncodeError> {
        let inner = self.encode_inner(
            value, tree, node, tagging.implicit, parent
        )?;
        match tagging.explicit {
            Some(number) => {
                EncodeNode::value(Ident::new(Tag::ctx(number), true), inner)
            }
            None => Ok(inner)
        }
    }

    fn encode_inner(
        &mut self,
        value: &Value,
        tree: &'a Tree,
        node: &'a Node,
        implicit: Option<u32>,
        parent: &Object,
    ) -> Result<EncodeNode, EncodeError> {
        let kind = match node.kind() {
            Some(kind) => kind,
            None => {
                let schema = resolve(node, parent)?;
                return self.encode_schema(value, schema, implicit, parent)
            }
        };
        match *kind {
            Kind::Choice(ref alternatives) => {
                if implicit.is_some() {
                    return Err(EncodeError::from_static(
                        "implicit tag on choice"
                    ))
                }
                let choice = value.as_choice().ok_or_else(|| {
                    mismatch("choice", value)
                })?;
                let alt = alternatives.iter().find(|item| {
                    item.0 == choice.kind()
                }).ok_or_else(|| {
                    EncodeError::new(format!(
                        "unknown choice alternative \"{}\"", choice.kind()
                    ))
                })?;
                self.encode_node(
                    Some(choice.value()), tree, alt.1, parent
                )?.ok_or_else(|| {
                    EncodeError::from_static("choice alternative omitted")
                })
            }
            Kind::Any => {
                match *value {
                    Value::Bytes(ref bytes) => Ok(bytes.clone().into()),
                    _ => Err(mismatch("bytes", value))
                }
            }
            _ => {
                let tag = match implicit {
                    Some(number) => Tag::ctx(number),
                    None => kind.tag().ok_or_else(|| {
                        EncodeError::from_static("untagged value")
                    })?
                };
                let content = self.encode_content(value, tree, node, kind)?;
                EncodeNode::value(
                    Ident::new(tag, kind.is_constructed()), content
                )
            }
        }
    }

    /// Encodes the content octets of a node.
    fn encode_content(
        &mut self,
        value: &Value,
        tree: &'a Tree,
        node: &'a Node,
        kind: &'a Kind,
    ) -> Result<EncodeNode, EncodeError> {
        match *kind {
            Kind::Seq | Kind::Set => self.encode_fields(value, tree, node),
            Kind::SeqOf(element) => {
                self.encode_elements(value, element).map(EncodeNode::composite)
            }
            Kind::SetOf(element) => {
                let mut items = self.encode_elements(value, element)?;
                items.sort_by_cached_key(EncodeNode::to_vec);
                Ok(EncodeNode::composite(items))
            }
            Kind::Choice(_) | Kind::Any => {
                Err(EncodeError::from_static("untagged value"))
            }
            Kind::OctStr => {
                if let Some(schema) = node.contains() {
                    return self.encode_schema(
                        value, schema, None, &Object::new()
                    )
                }
                match *value {
                    Value::Bytes(ref bytes) => Ok(bytes.clone().into()),
                    Value::String(ref s) => Ok(s.as_str().into()),
                    _ => Err(mismatch("bytes", value))
                }
            }
            Kind::BitStr => {
                match *value {
                    Value::BitString(ref bits) => bits.encode_content(),
                    Value::Bytes(ref bytes) => {
                        BitString::new(0, bytes.clone()).encode_content()
                    }
                    _ => Err(mismatch("bit string", value))
                }
            }
            Kind::Int(ref names) | Kind::Enum(ref names) => {
                match *value {
                    Value::Int(ref int) => Ok(int.encode_content()),
                    Value::String(ref name) => {
                        let names = names.as_ref().ok_or_else(|| {
                            EncodeError::from_static(
                                "string int or enum given, but no values map"
                            )
                        })?;
                        let int = names.value(name).ok_or_else(|| {
                            EncodeError::new(format!(
                                "values map doesn't contain: \"{}\"", name
                            ))
                        })?;
                        Ok(int.encode_content())
                    }
                    _ => Err(mismatch("integer", value))
                }
            }
            Kind::Bool => {
                match *value {
                    Value::Bool(true) => Ok(EncodeNode::Octet(0xFF)),
                    Value::Bool(false) => Ok(EncodeNode::Octet(0)),
                    _ => Err(mismatch("bool", value))
                }
            }
            Kind::Null => {
                match *value {
                    Value::Null => Ok(EncodeNode::empty()),
                    _ => Err(mismatch("null", value))
                }
            }
            Kind::ObjId { ref names, relative } => {
                to_oid(value, names.as_ref())?.encode_content(relative)
            }
            Kind::GenTime => {
                match *value {
                    Value::Time(time) => Ok(time.encode_generalized()),
                    _ => Err(mismatch("time", value))
                }
            }
            Kind::UtcTime => {
                match *value {
                    Value::Time(time) => time.encode_utc(),
                    _ => Err(mismatch("time", value))
                }
            }
            Kind::Str(string) => {
                match *value {
                    Value::String(ref s) => {
                        string.encode(s).map(Into::into)
                            .map_err(EncodeError::new)
                    }
                    _ => Err(mismatch("string", value))
                }
            }
            Kind::ObjDesc => {
                match *value {
                    Value::Bytes(ref bytes) => Ok(bytes.clone().into()),
                    Value::String(ref s) => Ok(s.as_str().into()),
                    _ => Err(mismatch("bytes", value))
                }
            }
        }
    }

    /// Encodes the fields of a sequence or set in the order of definition.
    ///
    /// Like when decoding, a field only gets to see the fields before it
    /// as its parent object.
    fn encode_fields(
        &mut self,
        value: &Value,
        tree: &'a Tree,
        node: &'a Node,
    ) -> Result<EncodeNode, EncodeError> {
        if !node.is_obj() {
            return match *value {
                Value::Null => Ok(EncodeNode::empty()),
                _ => Err(mismatch("null", value))
            }
        }
        let obj = value.as_object().ok_or_else(|| {
            mismatch("object", value)
        })?;
        let mut items = Vec::with_capacity(node.children().len());
        let mut seen = Object::new();
        for &child in node.children() {
            let (key, field) = match tree.node(child).key() {
                Some(key) => (key, obj.get(key)),
                None if tree.node(child).is_optional() => continue,
                None => {
                    return Err(EncodeError::from_static(
                        "required field without a key"
                    ))
                }
            };
            if let Some(item) = self.encode_node(field, tree, child, &seen)? {
                items.push(item)
            }
            if let Some(field) = field.or(tree.node(child).default_value()) {
                seen.insert(key, field.clone())
            }
        }
        Ok(EncodeNode::composite(items))
    }

    /// Encodes the elements of a sequence of or set of.
    fn encode_elements(
        &mut self,
        value: &Value,
        element: SchemaId,
    ) -> Result<Vec<EncodeNode>, EncodeError> {
        let items = value.as_array().ok_or_else(|| {
            mismatch("array", value)
        })?;
        items.iter().enumerate().map(|(idx, item)| {
            self.scoped(Some(Segment::Index(idx)), |ctx| {
                ctx.encode_schema(item, element, None, &Object::new())
            })
        }).collect()
    }

    /// Runs `op` with `segment` added to the path.
    ///
    /// Errors returned by `op` receive the path unless they already have
    /// one.
    fn scoped<T, F>(
        &mut self, segment: Option<Segment<'a>>, op: F
    ) -> Result<T, EncodeError>
    where F: FnOnce(&mut Self) -> Result<T, EncodeError> {
        if let Some(segment) = segment {
            self.path.push(segment);
        }
        let res = op(self).map_err(|err| err.with_path(|| self.path.join('.')));
        if segment.is_some() {
            self.path.pop();
        }
        res
    }
}


//------------ Helper Functions ----------------------------------------------

static NULL: Value = Value::Null;

/// Returns whether a missing value can be encoded as null.
fn accepts_null(node: &Node) -> bool {
    match node.kind() {
        Some(Kind::Null) => true,
        Some(Kind::Seq) | Some(Kind::Set) => !node.is_obj(),
        _ => false,
    }
}

fn resolve(node: &Node, parent: &Object) -> Result<SchemaId, EncodeError> {
    match node.uses() {
        Some(Use::Fixed(id)) => Ok(*id),
        Some(Use::Dynamic(selector)) => {
            selector(parent).ok_or_else(|| {
                EncodeError::from_static("no schema selected")
            })
        }
        None => Err(EncodeError::from_static("node without type"))
    }
}

/// Converts a value into an object identifier.
///
/// Accepts an OID, a name from `names`, a string in dotted notation, or an
/// array of arcs given as integers or strings of digits.
fn to_oid(
    value: &Value, names: Option<&OidNames>
) -> Result<Oid, EncodeError> {
    match *value {
        Value::Oid(ref oid) => Ok(oid.clone()),
        Value::String(ref s) => {
            if let Some(oid) = names.and_then(|names| names.oid(s)) {
                return Ok(oid.clone())
            }
            s.parse().map_err(|_| {
                EncodeError::new(format!(
                    "objid not found in values map: \"{}\"", s
                ))
            })
        }
        Value::Array(ref items) => {
            items.iter().map(|item| {
                let arc = match *item {
                    Value::Int(ref int) => int.to_u64(),
                    Value::String(ref s) => s.parse().ok(),
                    _ => None
                };
                arc.ok_or_else(|| {
                    EncodeError::new(format!(
                        "invalid object identifier arc: {}", brief(item)
                    ))
                })
            }).collect::<Result<Vec<_>, _>>().map(Oid::new)
        }
        _ => {
            Err(EncodeError::new(format!(
                "objid() should be either array or string, got: {}",
                brief(value)
            )))
        }
    }
}

fn mismatch(expected: &str, value: &Value) -> EncodeError {
    EncodeError::new(format!(
        "expected {}, got {}", expected, value.type_name()
    ))
}

/// Returns a short description of a value for error messages.
fn brief(value: &Value) -> String {
    match *value {
        Value::Int(ref int) => int.to_string(),
        Value::String(ref s) => format!("\"{}\"", s),
        _ => value.type_name().into()
    }
}

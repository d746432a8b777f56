//! Building schema trees.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::cell::RefCell;
use std::sync::Arc;
use crate::names::IntNames;
use crate::oid::OidNames;
use crate::string::StringKind;
use crate::value::{Object, Value};
use super::node::{Kind, Node, NodeId, Use};
use super::registry::{DefinitionError, DefinitionErrorKind, SchemaId, Tree};


//------------ Definer -------------------------------------------------------

/// The context for defining a schema.
///
/// A value of this type is handed to the closure given to
/// [`Registry::define`][super::Registry::define]. Each of its methods
/// creates a new node and returns a [`NodeRef`] for it. The methods of
/// `NodeRef` modify the node and return the reference again, so the
/// definition of a node is a chain of method calls:
///
/// ```
/// use derschema::Registry;
///
/// let mut registry = Registry::new();
/// registry.define("Pair", |d| {
///     d.seq().obj([
///         d.key("first").int(),
///         d.key("second").explicit(0).octstr().optional(),
///     ]);
/// }).unwrap();
/// ```
///
/// Nodes passed to [`obj`][NodeRef::obj] or [`choice`][NodeRef::choice]
/// become children of the node they are passed to. Exactly one node must be
/// left over as the root of the schema.
///
/// Mistakes such as setting the type of a node twice don’t fail right
/// away. Instead, the first one is remembered and returned by `define`.
pub struct Definer {
    /// The name of the schema being defined.
    schema: String,

    /// The number of schemas declared in the registry.
    schemas: usize,

    /// The nodes created so far.
    nodes: RefCell<Vec<NodeState>>,

    /// The first error encountered.
    error: RefCell<Option<DefinitionError>>,
}

/// A node under construction.
struct NodeState {
    node: Node,

    /// The node this node is a field or alternative of.
    ///
    /// If this is `None`, the node is a root candidate.
    parent: Option<NodeId>,
}

impl Definer {
    pub(crate) fn new(schema: &str, schemas: usize) -> Self {
        Definer {
            schema: schema.into(),
            schemas,
            nodes: RefCell::new(Vec::new()),
            error: RefCell::new(None),
        }
    }

    /// Creates a new, empty node.
    pub fn node(&self) -> NodeRef {
        let mut nodes = self.nodes.borrow_mut();
        let id = NodeId(nodes.len());
        nodes.push(NodeState { node: Node::default(), parent: None });
        NodeRef { definer: self, id }
    }

    /// Creates a new node with fields.
    pub fn obj<'d, I>(&'d self, children: I) -> NodeRef<'d>
    where I: IntoIterator<Item = NodeRef<'d>> {
        self.node().obj(children)
    }

    /// Creates a new choice node.
    pub fn choice<'d, S, I>(&'d self, alternatives: I) -> NodeRef<'d>
    where S: Into<String>, I: IntoIterator<Item = (S, NodeRef<'d>)> {
        self.node().choice(alternatives)
    }

    /// Creates a new node using a schema chosen during the walk.
    pub fn use_with<F>(&self, selector: F) -> NodeRef
    where F: Fn(&Object) -> Option<SchemaId> + Send + Sync + 'static {
        self.node().use_with(selector)
    }

    /// Records an error unless there already is one.
    fn fail(&self, id: NodeId, kind: DefinitionErrorKind) {
        let mut error = self.error.borrow_mut();
        if error.is_none() {
            let node = self.nodes.borrow()[id.index()].node.describe();
            *error = Some(DefinitionError::new(&self.schema, Some(node), kind));
        }
    }

    /// Finishes the definition and produces the tree.
    pub(crate) fn finish(self) -> Result<Tree, DefinitionError> {
        if let Some(err) = self.error.into_inner() {
            return Err(err)
        }
        let states = self.nodes.into_inner();
        let mut roots = states.iter().enumerate().filter_map(|(idx, state)| {
            state.parent.is_none().then_some(idx)
        });
        let root = match (roots.next(), roots.count()) {
            (Some(root), 0) => NodeId(root),
            (first, rest) => {
                return Err(DefinitionError::new(
                    &self.schema, None,
                    DefinitionErrorKind::RootArity(
                        rest + usize::from(first.is_some())
                    )
                ))
            }
        };
        let nodes: Vec<_> = states.into_iter().map(|state| {
            let mut node = state.node;
            if node.contains.is_none() {
                if let (Some(kind), Some(value)) = (
                    node.kind.as_ref(), node.default.take()
                ) {
                    node.default = Some(kind.decoded_form(value));
                }
            }
            node
        }).collect();
        for node in &nodes {
            if let Err(kind) = Self::check_node(node, self.schemas) {
                return Err(DefinitionError::new(
                    &self.schema, Some(node.describe()), kind
                ))
            }
        }
        Ok(Tree::new(nodes, root))
    }

    /// Checks the consistency of a finished node.
    fn check_node(
        node: &Node, schemas: usize
    ) -> Result<(), DefinitionErrorKind> {
        let kind = match (node.kind.as_ref(), node.uses.as_ref()) {
            (Some(_), Some(_)) => {
                return Err(DefinitionErrorKind::UseWithType)
            }
            (None, None) => return Err(DefinitionErrorKind::NoType),
            (kind, _) => kind,
        };
        if !node.children.is_empty()
            && !kind.map(Kind::is_composite).unwrap_or(false)
        {
            return Err(DefinitionErrorKind::FieldsOnNonComposite)
        }
        if node.implicit.is_some()
            && matches!(kind, Some(Kind::Choice(_)) | Some(Kind::Any))
        {
            return Err(DefinitionErrorKind::ImplicitOnUntagged)
        }
        if node.contains.is_some() && !matches!(kind, Some(Kind::OctStr)) {
            return Err(DefinitionErrorKind::ContainsOnNonOctetString)
        }
        let fixed = match node.uses {
            Some(Use::Fixed(id)) => Some(id),
            _ => None
        };
        let refs = [kind.and_then(Kind::schema_ref), fixed, node.contains];
        if refs.iter().flatten().any(|id| id.index() >= schemas) {
            return Err(DefinitionErrorKind::UnknownSchema)
        }
        Ok(())
    }
}

/// Creates methods on `Definer` that create a node and forward to the
/// method of the same name on `NodeRef`.
macro_rules! forward {
    ( $( $(#[$attr:meta])* fn $name:ident($($arg:ident: $ty:ty),*); )* ) => {
        impl Definer {
            $(
                $(#[$attr])*
                pub fn $name(&self, $($arg: $ty),*) -> NodeRef {
                    self.node().$name($($arg),*)
                }
            )*
        }
    }
}

forward! {
    /// Creates a new node with a key.
    fn key(key: impl Into<String>);
    /// Creates a new optional node.
    fn optional();
    /// Creates a new node with a default value.
    fn def(value: impl Into<Value>);
    /// Creates a new explicitly tagged node.
    fn explicit(number: u32);
    /// Creates a new implicitly tagged node.
    fn implicit(number: u32);
    /// Creates a new node using another schema.
    fn use_schema(id: SchemaId);
    fn seq();
    fn set();
    fn seqof(element: SchemaId);
    fn setof(element: SchemaId);
    fn any();
    fn octstr();
    fn bitstr();
    fn int();
    fn int_with(names: IntNames);
    fn enumerated();
    fn enumerated_with(names: IntNames);
    fn bool();
    fn null();
    fn objid();
    fn objid_with(names: OidNames);
    fn relobjid();
    fn gentime();
    fn utctime();
    fn utf8str();
    fn ia5str();
    fn printstr();
    fn numstr();
    fn t61str();
    fn iso646str();
    fn bmpstr();
    fn unistr();
    fn objdesc();
}


//------------ NodeRef -------------------------------------------------------

/// A reference to a node under construction.
///
/// The methods of this type modify the node and return the reference so
/// they can be chained. See [`Definer`] for an example.
#[derive(Clone, Copy)]
pub struct NodeRef<'d> {
    definer: &'d Definer,
    id: NodeId,
}

impl<'d> NodeRef<'d> {
    /// Returns the identifier of the node.
    pub fn id(self) -> NodeId {
        self.id
    }

    /// Applies a change to the node.
    fn update<F>(self, op: F) -> Self
    where F: FnOnce(&mut Node) -> Result<(), DefinitionErrorKind> {
        let res = op(&mut self.definer.nodes.borrow_mut()[self.id.index()].node);
        if let Err(kind) = res {
            self.definer.fail(self.id, kind)
        }
        self
    }

    /// Makes `child` a child of this node.
    ///
    /// Returns `false` if the child already has a parent.
    fn adopt(self, child: NodeRef) -> bool {
        let mut nodes = self.definer.nodes.borrow_mut();
        let state = &mut nodes[child.id.index()];
        if state.parent.is_some() || child.id == self.id {
            return false
        }
        state.parent = Some(self.id);
        true
    }

    fn set_kind(self, kind: Kind) -> Self {
        self.update(|node| {
            if node.kind.is_some() {
                return Err(DefinitionErrorKind::TypeSetTwice)
            }
            node.kind = Some(kind);
            Ok(())
        })
    }
}

/// # Modifiers
///
impl<'d> NodeRef<'d> {
    /// Sets the key of the field described by the node.
    pub fn key(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.update(|node| {
            if node.key.is_some() {
                return Err(DefinitionErrorKind::KeySetTwice)
            }
            node.key = Some(key);
            Ok(())
        })
    }

    /// Marks the field as optional.
    pub fn optional(self) -> Self {
        self.update(|node| {
            node.optional = true;
            Ok(())
        })
    }

    /// Sets the default value of the field.
    ///
    /// A field with a default value is optional. When decoding, an absent
    /// field gets the default value. When encoding, a field whose value
    /// encodes the same as the default value is left out.
    ///
    /// The value is stored in the form decoding produces for the field’s
    /// type, so `def("abc")` on an `octstr` becomes the octets `abc`.
    pub fn def(self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.update(|node| {
            if node.default.is_some() {
                return Err(DefinitionErrorKind::DefaultSetTwice)
            }
            node.default = Some(value);
            node.optional = true;
            Ok(())
        })
    }

    /// Wraps the value into a constructed context specific tag.
    pub fn explicit(self, number: u32) -> Self {
        self.update(|node| {
            if node.implicit.is_some() {
                return Err(DefinitionErrorKind::ExplicitAndImplicit)
            }
            if node.explicit.is_some() {
                return Err(DefinitionErrorKind::TagSetTwice)
            }
            node.explicit = Some(number);
            Ok(())
        })
    }

    /// Replaces the tag of the value with a context specific tag.
    pub fn implicit(self, number: u32) -> Self {
        self.update(|node| {
            if node.explicit.is_some() {
                return Err(DefinitionErrorKind::ExplicitAndImplicit)
            }
            if node.implicit.is_some() {
                return Err(DefinitionErrorKind::TagSetTwice)
            }
            node.implicit = Some(number);
            Ok(())
        })
    }

    /// Sets the fields of a sequence or set.
    ///
    /// The value of the node becomes an object with the values of all
    /// fields that have a key.
    pub fn obj<I>(self, children: I) -> Self
    where I: IntoIterator<Item = NodeRef<'d>> {
        let mut ids = Vec::new();
        for child in children {
            if !self.adopt(child) {
                self.definer.fail(child.id, DefinitionErrorKind::NodeReused);
            }
            ids.push(child.id);
        }
        self.update(|node| {
            if !node.children.is_empty() {
                return Err(DefinitionErrorKind::FieldsSetTwice)
            }
            node.children = ids;
            Ok(())
        })
    }

    /// Delegates the node to another schema.
    ///
    /// Tagging of the node is applied to the root of the other schema.
    pub fn use_schema(self, id: SchemaId) -> Self {
        self.set_use(Use::Fixed(id))
    }

    /// Delegates the node to a schema chosen during the walk.
    ///
    /// The selector is called with the fields of the enclosing object that
    /// come before this node. This is the same when encoding and decoding,
    /// later fields are never visible.
    pub fn use_with<F>(self, selector: F) -> Self
    where F: Fn(&Object) -> Option<SchemaId> + Send + Sync + 'static {
        self.set_use(Use::Dynamic(Arc::new(selector)))
    }

    fn set_use(self, uses: Use) -> Self {
        self.update(|node| {
            if node.uses.is_some() {
                return Err(DefinitionErrorKind::UseSetTwice)
            }
            node.uses = Some(uses);
            Ok(())
        })
    }

    /// Makes an octet string contain a value of another schema.
    pub fn contains(self, id: SchemaId) -> Self {
        self.update(|node| {
            if node.contains.is_some() {
                return Err(DefinitionErrorKind::ContainsSetTwice)
            }
            node.contains = Some(id);
            Ok(())
        })
    }
}

/// # Types
///
impl<'d> NodeRef<'d> {
    /// Makes the node a `SEQUENCE`.
    pub fn seq(self) -> Self {
        self.set_kind(Kind::Seq)
    }

    /// Makes the node a `SET`.
    pub fn set(self) -> Self {
        self.set_kind(Kind::Set)
    }

    /// Makes the node a `SEQUENCE OF` the given schema.
    pub fn seqof(self, element: SchemaId) -> Self {
        self.set_kind(Kind::SeqOf(element))
    }

    /// Makes the node a `SET OF` the given schema.
    pub fn setof(self, element: SchemaId) -> Self {
        self.set_kind(Kind::SetOf(element))
    }

    /// Makes the node a `CHOICE` between the given alternatives.
    ///
    /// Alternatives are tried in the given order when decoding.
    pub fn choice<S, I>(self, alternatives: I) -> Self
    where S: Into<String>, I: IntoIterator<Item = (S, NodeRef<'d>)> {
        let mut alts = Vec::new();
        for (name, alt) in alternatives {
            if !self.adopt(alt) {
                self.definer.fail(alt.id, DefinitionErrorKind::NodeReused);
            }
            alts.push((name.into(), alt.id));
        }
        self.set_kind(Kind::Choice(alts))
    }

    /// Makes the node accept any value.
    pub fn any(self) -> Self {
        self.set_kind(Kind::Any)
    }

    pub fn octstr(self) -> Self {
        self.set_kind(Kind::OctStr)
    }

    pub fn bitstr(self) -> Self {
        self.set_kind(Kind::BitStr)
    }

    pub fn int(self) -> Self {
        self.set_kind(Kind::Int(None))
    }

    /// Makes the node an `INTEGER` with named values.
    pub fn int_with(self, names: IntNames) -> Self {
        self.set_kind(Kind::Int(Some(names)))
    }

    pub fn enumerated(self) -> Self {
        self.set_kind(Kind::Enum(None))
    }

    /// Makes the node an `ENUMERATED` with named values.
    pub fn enumerated_with(self, names: IntNames) -> Self {
        self.set_kind(Kind::Enum(Some(names)))
    }

    pub fn bool(self) -> Self {
        self.set_kind(Kind::Bool)
    }

    pub fn null(self) -> Self {
        self.set_kind(Kind::Null)
    }

    pub fn objid(self) -> Self {
        self.set_kind(Kind::ObjId { names: None, relative: false })
    }

    /// Makes the node an `OBJECT IDENTIFIER` with named values.
    pub fn objid_with(self, names: OidNames) -> Self {
        self.set_kind(Kind::ObjId { names: Some(names), relative: false })
    }

    pub fn relobjid(self) -> Self {
        self.set_kind(Kind::ObjId { names: None, relative: true })
    }

    pub fn gentime(self) -> Self {
        self.set_kind(Kind::GenTime)
    }

    pub fn utctime(self) -> Self {
        self.set_kind(Kind::UtcTime)
    }

    pub fn utf8str(self) -> Self {
        self.set_kind(Kind::Str(StringKind::Utf8))
    }

    pub fn ia5str(self) -> Self {
        self.set_kind(Kind::Str(StringKind::Ia5))
    }

    pub fn printstr(self) -> Self {
        self.set_kind(Kind::Str(StringKind::Printable))
    }

    pub fn numstr(self) -> Self {
        self.set_kind(Kind::Str(StringKind::Numeric))
    }

    pub fn t61str(self) -> Self {
        self.set_kind(Kind::Str(StringKind::Teletex))
    }

    pub fn iso646str(self) -> Self {
        self.set_kind(Kind::Str(StringKind::Visible))
    }

    pub fn bmpstr(self) -> Self {
        self.set_kind(Kind::Str(StringKind::Bmp))
    }

    pub fn unistr(self) -> Self {
        self.set_kind(Kind::Str(StringKind::Universal))
    }

    pub fn objdesc(self) -> Self {
        self.set_kind(Kind::ObjDesc)
    }
}

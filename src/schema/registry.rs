//! The registry of schemas.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::{error, fmt};
use std::collections::HashMap;
use super::builder::Definer;
use super::node::{Node, NodeId};


//------------ SchemaId ------------------------------------------------------

/// The identifier of a schema within a registry.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SchemaId(usize);

impl SchemaId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}


//------------ Tree ----------------------------------------------------------

/// The finished tree of nodes of a schema.
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    pub(crate) fn new(nodes: Vec<Node>, root: NodeId) -> Self {
        Tree { nodes, root }
    }

    /// Returns the identifier of the root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the node with the given identifier.
    ///
    /// # Panics
    ///
    /// The method panics if `id` is not from this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Returns the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}


//------------ Registry ------------------------------------------------------

/// A collection of named schemas.
///
/// Schemas are added to the registry via [`define`][Self::define]. Since
/// schemas refer to each other by their [`SchemaId`], a schema must be known
/// to the registry before it can be used by another schema. In order to
/// allow recursive schemas, [`declare`][Self::declare] reserves an
/// identifier for a name before the schema is actually defined.
///
/// Once all schemas have been defined, the registry is typically wrapped in
/// an `Arc` and shared by all the [`Model`][crate::Model]s created from it.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    entries: Vec<Entry>,
    names: HashMap<String, SchemaId>,
}

#[derive(Clone, Debug)]
struct Entry {
    name: String,
    tree: Option<Tree>,
}

impl Registry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identifier for a name, reserving it if necessary.
    ///
    /// If the name hasn’t been used before, a new identifier is reserved
    /// for it. The schema has to be defined via [`define`][Self::define]
    /// before a model using it can be created.
    pub fn declare(&mut self, name: &str) -> SchemaId {
        if let Some(&id) = self.names.get(name) {
            return id
        }
        let id = SchemaId(self.entries.len());
        self.entries.push(Entry { name: name.into(), tree: None });
        self.names.insert(name.into(), id);
        id
    }

    /// Defines a schema.
    ///
    /// The closure `op` receives a [`Definer`] for creating the nodes of
    /// the schema. Every node it creates must end up as a field or
    /// alternative of another node except for exactly one, the root of the
    /// schema.
    ///
    /// Returns the identifier of the schema. If the name has been declared
    /// before, this is the declared identifier.
    pub fn define<F: FnOnce(&Definer)>(
        &mut self, name: &str, op: F
    ) -> Result<SchemaId, DefinitionError> {
        if let Some(&id) = self.names.get(name) {
            if self.entries[id.0].tree.is_some() {
                return Err(DefinitionError::new(
                    name, None, DefinitionErrorKind::DuplicateName
                ))
            }
        }
        let id = self.declare(name);
        let definer = Definer::new(name, self.entries.len());
        op(&definer);
        let tree = definer.finish()?;
        log::debug!("defined schema \"{}\" with {} nodes", name, tree.len());
        self.entries[id.0].tree = Some(tree);
        Ok(id)
    }

    /// Returns the identifier of the schema with the given name.
    pub fn lookup(&self, name: &str) -> Option<SchemaId> {
        self.names.get(name).copied()
    }

    /// Returns the name of a schema.
    pub fn name(&self, id: SchemaId) -> Option<&str> {
        self.entries.get(id.0).map(|entry| entry.name.as_str())
    }

    /// Returns the tree of a defined schema.
    pub fn tree(&self, id: SchemaId) -> Option<&Tree> {
        self.entries.get(id.0).and_then(|entry| entry.tree.as_ref())
    }

    /// Returns the number of declared schemas.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks that `id` and all declared schemas have been defined.
    pub(crate) fn check_complete(
        &self, id: SchemaId
    ) -> Result<(), DefinitionError> {
        if id.0 >= self.entries.len() {
            return Err(DefinitionError::new(
                "", None, DefinitionErrorKind::UnknownSchema
            ))
        }
        match self.entries.iter().find(|entry| entry.tree.is_none()) {
            Some(entry) => Err(DefinitionError::new(
                &entry.name, None, DefinitionErrorKind::Undefined
            )),
            None => Ok(())
        }
    }
}


//------------ DefinitionError -----------------------------------------------

/// A schema definition was malformed.
#[derive(Clone, Debug)]
pub struct DefinitionError {
    schema: String,
    node: Option<String>,
    kind: DefinitionErrorKind,
}

impl DefinitionError {
    pub(crate) fn new(
        schema: &str, node: Option<String>, kind: DefinitionErrorKind
    ) -> Self {
        DefinitionError { schema: schema.into(), node, kind }
    }

    /// Returns the name of the schema that failed.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Returns a description of the node that failed, if available.
    pub fn node(&self) -> Option<&str> {
        self.node.as_deref()
    }

    /// Returns what exactly went wrong.
    pub fn kind(&self) -> DefinitionErrorKind {
        self.kind
    }
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid definition of schema \"{}\"", self.schema)?;
        if let Some(node) = self.node.as_ref() {
            write!(f, " at node {}", node)?;
        }
        write!(f, ": {}", self.kind)
    }
}

impl error::Error for DefinitionError { }


//------------ DefinitionErrorKind -------------------------------------------

/// The reason a schema definition was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum DefinitionErrorKind {
    /// The schema didn’t have exactly one root node.
    RootArity(usize),

    /// The type of a node was set more than once.
    TypeSetTwice,

    /// A node has both an explicit and an implicit tag.
    ExplicitAndImplicit,

    /// The explicit or implicit tag of a node was set more than once.
    TagSetTwice,

    /// The key of a node was set more than once.
    KeySetTwice,

    /// The schema used by a node was set more than once.
    UseSetTwice,

    /// The default value of a node was set more than once.
    DefaultSetTwice,

    /// The fields of a node were set more than once.
    FieldsSetTwice,

    /// The encapsulated schema of a node was set more than once.
    ContainsSetTwice,

    /// A node was made a field or alternative of more than one node.
    NodeReused,

    /// A node that isn’t a sequence or set has fields.
    FieldsOnNonComposite,

    /// A node uses another schema but also has a type of its own.
    UseWithType,

    /// A node has neither a type nor uses another schema.
    NoType,

    /// A choice or any node has an implicit tag.
    ImplicitOnUntagged,

    /// A node that isn’t an octet string encapsulates another schema.
    ContainsOnNonOctetString,

    /// A node refers to a schema unknown to the registry.
    UnknownSchema,

    /// A schema with this name has already been defined.
    DuplicateName,

    /// A declared schema was never defined.
    Undefined,
}

impl fmt::Display for DefinitionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DefinitionErrorKind::RootArity(count) => {
                write!(f, "expected exactly one root node, got {}", count)
            }
            DefinitionErrorKind::TypeSetTwice => {
                f.write_str("type already set")
            }
            DefinitionErrorKind::ExplicitAndImplicit => {
                f.write_str("explicit and implicit tags are exclusive")
            }
            DefinitionErrorKind::TagSetTwice => {
                f.write_str("tag already set")
            }
            DefinitionErrorKind::KeySetTwice => {
                f.write_str("key already set")
            }
            DefinitionErrorKind::UseSetTwice => {
                f.write_str("use already set")
            }
            DefinitionErrorKind::DefaultSetTwice => {
                f.write_str("default value already set")
            }
            DefinitionErrorKind::FieldsSetTwice => {
                f.write_str("fields already set")
            }
            DefinitionErrorKind::ContainsSetTwice => {
                f.write_str("encapsulated schema already set")
            }
            DefinitionErrorKind::NodeReused => {
                f.write_str("node already has a parent")
            }
            DefinitionErrorKind::FieldsOnNonComposite => {
                f.write_str("fields on a node that is not a seq or set")
            }
            DefinitionErrorKind::UseWithType => {
                f.write_str("use combined with a type")
            }
            DefinitionErrorKind::NoType => {
                f.write_str("node without type")
            }
            DefinitionErrorKind::ImplicitOnUntagged => {
                f.write_str("implicit tag on a choice or any")
            }
            DefinitionErrorKind::ContainsOnNonOctetString => {
                f.write_str("contains on a node that is not an octstr")
            }
            DefinitionErrorKind::UnknownSchema => {
                f.write_str("reference to an unknown schema")
            }
            DefinitionErrorKind::DuplicateName => {
                f.write_str("schema already defined")
            }
            DefinitionErrorKind::Undefined => {
                f.write_str("schema declared but never defined")
            }
        }
    }
}

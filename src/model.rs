//! Encoding and decoding values of a schema.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::fmt;
use std::sync::Arc;
use bytes::Bytes;
use crate::decode::{Cursor, DecodeContext, DecodeError};
use crate::encode::{EncodeContext, EncodeError, EncodeNode, Target};
use crate::schema::{
    DefinitionError, DefinitionErrorKind, Registry, SchemaId
};
use crate::value::Value;


//------------ Model ---------------------------------------------------------

/// A schema ready for encoding and decoding.
///
/// A model combines a registry with the identifier of one of its schemas.
/// It can only be created once all schemas declared in the registry have
/// been defined, so walking the schema will never run into a missing
/// definition.
///
/// Models are cheap to clone and can be shared between threads.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use derschema::{Format, Model, Object, Registry, Value};
///
/// let mut registry = Registry::new();
/// let id = registry.define("Flag", |d| {
///     d.seq().obj([d.key("flag").bool()]);
/// }).unwrap();
/// let model = Model::new(Arc::new(registry), id).unwrap();
///
/// let value = Value::from(Object::new().with("flag", true));
/// let data = model.encode(&value, Format::Der).unwrap();
/// assert_eq!(data, b"\x30\x03\x01\x01\xff");
/// assert_eq!(model.decode(data, Format::Der).unwrap(), value);
/// ```
#[derive(Clone, Debug)]
pub struct Model {
    registry: Arc<Registry>,
    schema: SchemaId,
}

impl Model {
    /// Creates a new model for the given schema.
    ///
    /// Fails if `schema` isn’t from this registry or if any schema declared
    /// in the registry is still undefined.
    pub fn new(
        registry: Arc<Registry>, schema: SchemaId
    ) -> Result<Self, DefinitionError> {
        registry.check_complete(schema)?;
        Ok(Model { registry, schema })
    }

    /// Creates a new model for the schema with the given name.
    pub fn by_name(
        registry: Arc<Registry>, name: &str
    ) -> Result<Self, DefinitionError> {
        let schema = registry.lookup(name).ok_or_else(|| {
            DefinitionError::new(name, None, DefinitionErrorKind::UnknownSchema)
        })?;
        Self::new(registry, schema)
    }

    /// Returns the name of the model’s schema.
    pub fn name(&self) -> &str {
        self.registry.name(self.schema).unwrap_or_default()
    }

    /// Returns the identifier of the model’s schema.
    pub fn schema(&self) -> SchemaId {
        self.schema
    }

    /// Returns the registry the model’s schema lives in.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

/// # Encoding
///
impl Model {
    /// Encodes a value into a new vec.
    pub fn encode(
        &self, value: &Value, format: Format
    ) -> Result<Vec<u8>, EncodeError> {
        self.encode_node(value, format).map(|node| node.to_vec())
    }

    /// Encodes a value and writes it to a target.
    ///
    /// The value is completely encoded before anything is written, so
    /// nothing is written to the target if encoding fails.
    pub fn encode_to<T: Target>(
        &self, value: &Value, format: Format, target: &mut T
    ) -> Result<Result<(), T::Error>, EncodeError> {
        self.encode_node(value, format).map(|node| node.write_encoded(target))
    }

    fn encode_node(
        &self, value: &Value, format: Format
    ) -> Result<EncodeNode, EncodeError> {
        match format {
            Format::Der => {
                EncodeContext::new(&self.registry).encode(value, self.schema)
            }
        }
    }
}

/// # Decoding
///
impl Model {
    /// Decodes a value.
    ///
    /// The data must contain exactly one value of the schema.
    pub fn decode(
        &self, data: impl Into<Bytes>, format: Format
    ) -> Result<Value, DecodeError> {
        self.decode_with(data, format, DecodeOptions::new())
    }

    /// Decodes a value using the given options.
    ///
    /// If the options contain a tracking hook, it is called for every node
    /// once decoding has succeeded.
    pub fn decode_with(
        &self, data: impl Into<Bytes>, format: Format,
        mut options: DecodeOptions
    ) -> Result<Value, DecodeError> {
        let Format::Der = format;
        let mut ctx = DecodeContext::new(
            &self.registry, false, options.is_tracking()
        );
        let res = ctx.decode(&mut Cursor::new(data), self.schema)?;
        options.deliver(&mut ctx);
        Ok(res)
    }

    /// Decodes as much of a value as possible.
    ///
    /// Instead of failing on the first error, errors in fields and
    /// elements are collected and the failed value is skipped. The result
    /// contains the value decoded so far, if any, and all errors
    /// encountered.
    pub fn decode_partial(
        &self, data: impl Into<Bytes>, format: Format,
        mut options: DecodeOptions
    ) -> PartialDecode {
        let Format::Der = format;
        let mut ctx = DecodeContext::new(
            &self.registry, true, options.is_tracking()
        );
        let res = ctx.decode(&mut Cursor::new(data), self.schema);
        let mut errors = ctx.take_errors();
        let result = match res {
            Ok(value) => Some(value),
            Err(err) => {
                errors.push(err);
                None
            }
        };
        options.deliver(&mut ctx);
        PartialDecode { result, errors }
    }
}


//------------ Format --------------------------------------------------------

/// The encoding rules to use.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Format {
    /// Distinguished Encoding Rules.
    ///
    /// When decoding, indefinite length values are accepted, too.
    Der,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Format::Der => f.write_str("der")
        }
    }
}


//------------ DecodeOptions -------------------------------------------------

/// Options for decoding.
#[derive(Default)]
pub struct DecodeOptions<'a> {
    track: Option<Box<dyn FnMut(&str, usize, usize) + 'a>>,
}

impl<'a> DecodeOptions<'a> {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tracking hook.
    ///
    /// The hook is called for every node that was successfully decoded
    /// with the path of the node, its keys and element indexes separated
    /// by slashes, and the start and end offsets of its encoded value in
    /// the data. For explicitly tagged values, the range covers the inner
    /// value only.
    ///
    /// Nodes are reported in the order they were completed, so fields are
    /// reported before the sequence containing them.
    pub fn track(
        mut self, hook: impl FnMut(&str, usize, usize) + 'a
    ) -> Self {
        self.track = Some(Box::new(hook));
        self
    }

    fn is_tracking(&self) -> bool {
        self.track.is_some()
    }

    fn deliver(&mut self, ctx: &mut DecodeContext) {
        if let Some(track) = self.track.as_mut() {
            for event in ctx.take_events() {
                track(&event.path, event.start, event.end)
            }
        }
    }
}

impl<'a> fmt::Debug for DecodeOptions<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DecodeOptions")
            .field("track", &self.track.is_some())
            .finish()
    }
}


//------------ PartialDecode -------------------------------------------------

/// The result of a partial decode.
#[derive(Debug)]
pub struct PartialDecode {
    /// The value decoded so far.
    ///
    /// This is `None` if not even the outermost value could be decoded.
    pub result: Option<Value>,

    /// The errors that happened during decoding.
    pub errors: Vec<DecodeError>,
}

impl PartialDecode {
    /// Returns whether decoding succeeded without any errors.
    pub fn is_complete(&self) -> bool {
        self.result.is_some() && self.errors.is_empty()
    }
}

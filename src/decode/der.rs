//! Decoding DER data according to a schema.
//!
//! This is a private module. The decoder is used via
//! [`Model`][crate::Model].

use std::mem;
use crate::int::Integer;
use crate::length::Length;
use crate::oid::Oid;
use crate::schema::{Kind, Node, NodeId, Registry, SchemaId, Tree, Use};
use crate::tag::{Ident, Tag};
use crate::time::Time;
use crate::value::{BitString, Object, Value};
use crate::walk::{Path, Segment, Tagging};
use super::cursor::{Cursor, Mark};
use super::error::DecodeError;


//------------ DecodeContext -------------------------------------------------

/// The state of decoding a single value.
pub(crate) struct DecodeContext<'a> {
    /// The registry with all the schemas.
    registry: &'a Registry,

    /// The keys and indexes leading to the current node.
    path: Path<'a>,

    /// Whether to continue after errors in fields and elements.
    partial: bool,

    /// The errors collected in partial mode.
    errors: Vec<DecodeError>,

    /// Whether to record the ranges of decoded nodes.
    tracking: bool,

    /// The recorded ranges.
    ///
    /// Ranges recorded while trying a choice alternative or an optional
    /// value are dropped again if the attempt fails.
    events: Vec<TrackEvent>,
}

/// The path and range of a successfully decoded node.
pub(crate) struct TrackEvent {
    pub path: String,
    pub start: usize,
    pub end: usize,
}

impl<'a> DecodeContext<'a> {
    pub fn new(registry: &'a Registry, partial: bool, tracking: bool) -> Self {
        DecodeContext {
            registry,
            path: Path::default(),
            partial,
            errors: Vec::new(),
            tracking,
            events: Vec::new(),
        }
    }

    /// Decodes a complete value of the given schema.
    ///
    /// The cursor must be exhausted afterwards.
    pub fn decode(
        &mut self, cursor: &mut Cursor, schema: SchemaId
    ) -> Result<Value, DecodeError> {
        let res = self.decode_schema(cursor, schema, None, &Object::new())?;
        if !cursor.is_empty() {
            let err = DecodeError::content("trailing data", cursor.pos());
            if !self.partial {
                return Err(err)
            }
            self.push_error(err);
        }
        Ok(res)
    }

    /// Returns the errors collected in partial mode.
    pub fn take_errors(&mut self) -> Vec<DecodeError> {
        mem::take(&mut self.errors)
    }

    /// Returns the recorded node ranges in the order they completed.
    pub fn take_events(&mut self) -> Vec<TrackEvent> {
        mem::take(&mut self.events)
    }
}

/// # Walking the Tree
///
impl<'a> DecodeContext<'a> {
    fn decode_schema(
        &mut self,
        cursor: &mut Cursor,
        schema: SchemaId,
        implicit: Option<u32>,
        parent: &Object,
    ) -> Result<Value, DecodeError> {
        let tree = self.tree(schema, cursor)?;
        let value = self.decode_node(
            cursor, tree, tree.root(), implicit, parent
        )?;
        Ok(value.unwrap_or(Value::Null))
    }

    /// Decodes the value of a node.
    ///
    /// Returns `Ok(None)` if the node is optional, absent, and doesn’t have
    /// a default value. The `implicit` argument is the implicit tag of a
    /// node using the node’s schema which overrides the node’s own tag.
    fn decode_node(
        &mut self,
        cursor: &mut Cursor,
        tree: &'a Tree,
        id: NodeId,
        implicit: Option<u32>,
        parent: &Object,
    ) -> Result<Option<Value>, DecodeError> {
        let node = tree.node(id);
        let key = node.key();
        if let Some(key) = key {
            self.path.push(Segment::Key(key));
        }
        let res = self.decode_present(cursor, tree, node, implicit, parent);
        let res = res.map_err(|err| err.with_path(|| self.path.join('.')));
        if key.is_some() {
            self.path.pop();
        }
        res
    }

    /// Checks whether an optional node is present and decodes it.
    fn decode_present(
        &mut self,
        cursor: &mut Cursor,
        tree: &'a Tree,
        node: &'a Node,
        implicit: Option<u32>,
        parent: &Object,
    ) -> Result<Option<Value>, DecodeError> {
        let tagging = Tagging::new(node, implicit);
        if !node.is_optional() {
            return self.decode_value(
                cursor, tree, node, tagging, parent
            ).map(Some)
        }
        if cursor.is_empty() {
            return Ok(node.default.clone())
        }
        let present = match tagging.outer(node) {
            Some(tag) => peek_tag(cursor)? == tag,
            None if matches!(node.kind, Some(Kind::Any)) => true,
            None => {
                // Choices and uses without a tag: simply try.
                let res = self.attempt(cursor, |ctx, cursor| {
                    ctx.decode_value(cursor, tree, node, tagging, parent)
                });
                return match res {
                    Ok(value) => Ok(Some(value)),
                    Err(err) => {
                        log::trace!("optional value absent: {}", err);
                        Ok(node.default.clone())
                    }
                }
            }
        };
        if present {
            self.decode_value(cursor, tree, node, tagging, parent).map(Some)
        }
        else {
            Ok(node.default.clone())
        }
    }

    /// Decodes the value of a node that is present.
    fn decode_value(
        &mut self,
        cursor: &mut Cursor,
        tree: &'a Tree,
        node: &'a Node,
        tagging: Tagging,
        parent: &Object,
    ) -> Result<Value, DecodeError> {
        match tagging.explicit {
            Some(number) => {
                let mut content = take_header(cursor, Tag::ctx(number), true)?;
                self.decode_inner(
                    &mut content, tree, node, tagging.implicit, parent
                )
            }
            None => {
                self.decode_inner(cursor, tree, node, tagging.implicit, parent)
            }
        }
    }

    /// Decodes the value of a node after an explicit tag.
    fn decode_inner(
        &mut self,
        cursor: &mut Cursor,
        tree: &'a Tree,
        node: &'a Node,
        implicit: Option<u32>,
        parent: &Object,
    ) -> Result<Value, DecodeError> {
        let kind = match node.kind.as_ref() {
            Some(kind) => kind,
            None => {
                let schema = self.resolve(node, parent, cursor)?;
                return self.decode_schema(cursor, schema, implicit, parent)
            }
        };
        match *kind {
            Kind::Choice(ref alternatives) => {
                if implicit.is_some() {
                    return Err(DecodeError::content(
                        "implicit tag on choice", cursor.pos()
                    ))
                }
                self.decode_choice(cursor, tree, alternatives, parent)
            }
            Kind::Any => {
                let start = cursor.save();
                skip_value(cursor)?;
                self.track(start.offset(), cursor.offset());
                Ok(Value::Bytes(cursor.span(start)))
            }
            _ => {
                let tag = match implicit {
                    Some(number) => Tag::ctx(number),
                    None => kind.tag().ok_or_else(|| {
                        DecodeError::content("untagged value", cursor.pos())
                    })?
                };
                let start = cursor.offset();
                let mut content = take_header(
                    cursor, tag, kind.is_constructed()
                )?;
                let value = self.decode_content(
                    &mut content, tree, node, kind
                )?;
                self.track(start, cursor.offset());
                Ok(value)
            }
        }
    }

    /// Decodes the content octets of a node.
    fn decode_content(
        &mut self,
        content: &mut Cursor,
        tree: &'a Tree,
        node: &'a Node,
        kind: &'a Kind,
    ) -> Result<Value, DecodeError> {
        let pos = content.pos();
        match *kind {
            Kind::Seq | Kind::Set => self.decode_fields(content, tree, node),
            Kind::SeqOf(element) | Kind::SetOf(element) => {
                self.decode_elements(content, element).map(Value::Array)
            }
            Kind::Choice(_) | Kind::Any => {
                Err(DecodeError::content("untagged value", pos))
            }
            Kind::OctStr => {
                match node.contains {
                    Some(schema) => self.decode_contained(content, schema),
                    None => Ok(Value::Bytes(content.take_remaining()))
                }
            }
            Kind::BitStr => {
                BitString::take_content_from(content).map(Value::BitString)
            }
            Kind::Int(ref names) | Kind::Enum(ref names) => {
                let int = Integer::take_content_from(content)?;
                let name = names.as_ref().and_then(|names| names.name(&int));
                Ok(match name {
                    Some(name) => Value::String(name.into()),
                    None => Value::Int(int),
                })
            }
            Kind::Bool => {
                if content.remaining() != 1 {
                    return Err(DecodeError::content("invalid boolean", pos))
                }
                Ok(Value::Bool(content.take_u8()? != 0))
            }
            Kind::Null => {
                if !content.is_empty() {
                    return Err(DecodeError::content("invalid NULL", pos))
                }
                Ok(Value::Null)
            }
            Kind::ObjId { ref names, relative } => {
                let oid = Oid::take_content_from(content, relative)?;
                let name = names.as_ref().and_then(|names| names.name(&oid));
                Ok(match name {
                    Some(name) => Value::String(name.into()),
                    None => Value::Oid(oid),
                })
            }
            Kind::GenTime => {
                Time::take_generalized_from(content).map(Value::Time)
            }
            Kind::UtcTime => Time::take_utc_from(content).map(Value::Time),
            Kind::Str(string) => {
                string.decode(&content.take_remaining()).map(Value::String)
                    .map_err(|err| DecodeError::content(err, pos))
            }
            Kind::ObjDesc => Ok(Value::Bytes(content.take_remaining())),
        }
    }

    /// Decodes the fields of a sequence or set.
    ///
    /// Octets left over after the last field are ignored.
    fn decode_fields(
        &mut self,
        content: &mut Cursor,
        tree: &'a Tree,
        node: &'a Node,
    ) -> Result<Value, DecodeError> {
        if !node.is_obj() {
            return Ok(Value::Null)
        }
        let mut obj = Object::new();
        for &child in node.children() {
            let mark = content.save();
            match self.decode_node(content, tree, child, None, &obj) {
                Ok(Some(value)) => {
                    if let Some(key) = tree.node(child).key() {
                        obj.insert(key, value)
                    }
                }
                Ok(None) => { }
                Err(err) => {
                    if !self.partial {
                        return Err(err)
                    }
                    self.recover(content, mark, err);
                }
            }
        }
        Ok(Value::Object(obj))
    }

    /// Decodes the elements of a sequence of or set of.
    fn decode_elements(
        &mut self,
        content: &mut Cursor,
        element: SchemaId,
    ) -> Result<Vec<Value>, DecodeError> {
        let tree = self.tree(element, content)?;
        let mut res = Vec::new();
        let mut idx = 0;
        while !content.is_empty() {
            let mark = content.save();
            self.path.push(Segment::Index(idx));
            let item = self.decode_node(
                content, tree, tree.root(), None, &Object::new()
            ).and_then(|item| {
                match item {
                    Some(item) if content.offset() > mark.offset() => Ok(item),
                    _ => {
                        Err(DecodeError::content(
                            "element without content", content.pos()
                        ).with_path(|| self.path.join('.')))
                    }
                }
            });
            self.path.pop();
            match item {
                Ok(item) => res.push(item),
                Err(err) => {
                    if !self.partial {
                        return Err(err)
                    }
                    self.recover(content, mark, err);
                }
            }
            idx += 1;
        }
        Ok(res)
    }

    /// Decodes an octet string containing a value of another schema.
    fn decode_contained(
        &mut self,
        content: &mut Cursor,
        schema: SchemaId,
    ) -> Result<Value, DecodeError> {
        let mut inner = content.clone();
        content.take_remaining();
        let res = self.decode_schema(
            &mut inner, schema, None, &Object::new()
        )?;
        if !inner.is_empty() {
            return Err(DecodeError::content(
                "trailing data in encapsulated value", inner.pos()
            ))
        }
        Ok(res)
    }

    /// Decodes a choice by trying all alternatives in order.
    fn decode_choice(
        &mut self,
        cursor: &mut Cursor,
        tree: &'a Tree,
        alternatives: &'a [(String, NodeId)],
        parent: &Object,
    ) -> Result<Value, DecodeError> {
        let pos = cursor.pos();
        for (name, alt) in alternatives {
            let res = self.attempt(cursor, |ctx, cursor| {
                ctx.decode_node(cursor, tree, *alt, None, parent)
            });
            match res {
                Ok(value) => {
                    return Ok(Value::choice(
                        name.as_str(), value.unwrap_or(Value::Null)
                    ))
                }
                Err(err) => {
                    log::trace!(
                        "choice alternative \"{}\" not matched: {}", name, err
                    );
                }
            }
        }
        Err(DecodeError::content("choice not matched", pos))
    }
}

/// # Helpers
///
impl<'a> DecodeContext<'a> {
    /// Runs `op` and rolls back its effects if it fails.
    ///
    /// While `op` runs, partial mode is disabled so that any error makes
    /// the attempt fail.
    fn attempt<T, F>(
        &mut self, cursor: &mut Cursor, op: F
    ) -> Result<T, DecodeError>
    where F: FnOnce(&mut Self, &mut Cursor) -> Result<T, DecodeError> {
        let mark = cursor.save();
        let events = self.events.len();
        let partial = mem::replace(&mut self.partial, false);
        let res = op(self, cursor);
        self.partial = partial;
        if res.is_err() {
            cursor.restore(mark);
            self.events.truncate(events);
        }
        res
    }

    /// Records an error in partial mode and skips the failed value.
    ///
    /// If the value can’t be skipped, the rest of the content is dropped.
    fn recover(&mut self, content: &mut Cursor, mark: Mark, err: DecodeError) {
        self.push_error(err);
        content.restore(mark);
        if skip_value(content).is_err() {
            content.restore(mark);
            content.take_remaining();
        }
    }

    fn push_error(&mut self, err: DecodeError) {
        log::debug!("collecting decode error: {}", err);
        self.errors.push(err);
    }

    fn track(&mut self, start: usize, end: usize) {
        if self.tracking {
            let path = self.path.join('/');
            self.events.push(TrackEvent { path, start, end });
        }
    }

    fn tree(
        &self, schema: SchemaId, cursor: &Cursor
    ) -> Result<&'a Tree, DecodeError> {
        self.registry.tree(schema).ok_or_else(|| {
            DecodeError::content("undefined schema", cursor.pos())
        })
    }

    fn resolve(
        &self, node: &Node, parent: &Object, cursor: &Cursor
    ) -> Result<SchemaId, DecodeError> {
        match node.uses {
            Some(Use::Fixed(id)) => Ok(id),
            Some(Use::Dynamic(ref selector)) => {
                selector(parent).ok_or_else(|| {
                    DecodeError::content("no schema selected", cursor.pos())
                })
            }
            None => Err(DecodeError::content("node without type", cursor.pos()))
        }
    }
}


//------------ Helper Functions ----------------------------------------------

/// Takes the identifier and length octets of a value.
///
/// Checks that the value has the expected tag and encoding and returns a
/// cursor over its content octets.
fn take_header(
    cursor: &mut Cursor, expected: Tag, constructed: bool
) -> Result<Cursor, DecodeError> {
    let pos = cursor.pos();
    let ident = Ident::take_from(cursor)?;
    if ident.tag() != expected {
        return Err(DecodeError::content(
            format!(
                "failed to match tag: expected {}, got {}",
                expected, ident.tag()
            ),
            pos
        ))
    }
    if ident.is_constructed() != constructed {
        return Err(DecodeError::content(
            if constructed {
                "expected constructed value"
            }
            else {
                "expected primitive value"
            },
            pos
        ))
    }
    let length = Length::take_from(cursor, constructed)?;
    take_content(cursor, length)
}

/// Takes the content octets of a value with the given length.
///
/// For an indefinite length, the content ends before the end-of-contents
/// marker and the cursor is moved past the marker.
fn take_content(
    cursor: &mut Cursor, length: Length
) -> Result<Cursor, DecodeError> {
    match length {
        Length::Definite(len) => cursor.skip(len),
        Length::Indefinite => {
            let start = cursor.save();
            let end = skip_until_end_of_contents(cursor)?;
            Ok(cursor.sub(start, end))
        }
    }
}

/// Skips over values until and including an end-of-contents marker.
///
/// Returns a mark for the start of the marker.
fn skip_until_end_of_contents(cursor: &mut Cursor) -> Result<Mark, DecodeError> {
    loop {
        if cursor.is_empty() {
            return Err(DecodeError::content(
                "missing end-of-contents marker", cursor.pos()
            ))
        }
        let mark = cursor.save();
        let pos = cursor.pos();
        let ident = Ident::take_from(cursor)?;
        let length = Length::take_from(cursor, ident.is_constructed())?;
        if ident == Ident::END_OF_CONTENTS {
            if length != Length::Definite(0) {
                return Err(DecodeError::content(
                    "invalid end-of-contents marker", pos
                ))
            }
            return Ok(mark)
        }
        take_content(cursor, length)?;
    }
}

/// Returns the tag of the next value without advancing the cursor.
fn peek_tag(cursor: &Cursor) -> Result<Tag, DecodeError> {
    Ident::take_from(&mut cursor.clone()).map(Ident::tag)
}

/// Skips over a complete value.
fn skip_value(cursor: &mut Cursor) -> Result<(), DecodeError> {
    let ident = Ident::take_from(cursor)?;
    let length = Length::take_from(cursor, ident.is_constructed())?;
    take_content(cursor, length).map(|_| ())
}

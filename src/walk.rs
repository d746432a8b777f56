//! Helpers shared by the encoder and the decoder.
//!
//! Both walk a schema tree node by node. This module contains the state
//! they need to keep track of where they are.

use smallvec::SmallVec;
use crate::schema::{Kind, Node};
use crate::tag::Tag;


//------------ Path ----------------------------------------------------------

/// The keys and indexes leading from the top-level value to a node.
#[derive(Clone, Debug, Default)]
pub(crate) struct Path<'a> {
    segments: SmallVec<[Segment<'a>; 8]>,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

impl<'a> Path<'a> {
    pub fn push(&mut self, segment: Segment<'a>) {
        self.segments.push(segment)
    }

    pub fn pop(&mut self) {
        self.segments.pop();
    }

    /// Returns the path as a string with the segments separated by `sep`.
    pub fn join(&self, sep: char) -> String {
        let mut res = String::new();
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                res.push(sep);
            }
            match *segment {
                Segment::Key(key) => res.push_str(key),
                Segment::Index(idx) => res.push_str(&idx.to_string()),
            }
        }
        res
    }
}


//------------ Tagging -------------------------------------------------------

/// The effective tagging of a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Tagging {
    pub explicit: Option<u32>,
    pub implicit: Option<u32>,
}

impl Tagging {
    /// Determines the tagging of a node.
    ///
    /// An implicit tag given by a node using the node’s schema replaces the
    /// node’s own tag. If the node is explicitly tagged, it replaces the
    /// explicit tag instead.
    pub fn new(node: &Node, implicit: Option<u32>) -> Self {
        match (implicit, node.explicit()) {
            (Some(number), Some(_)) => {
                Tagging { explicit: Some(number), implicit: None }
            }
            (Some(number), None) => {
                Tagging { explicit: None, implicit: Some(number) }
            }
            (None, explicit) => {
                Tagging { explicit, implicit: node.implicit() }
            }
        }
    }

    /// Returns the outermost tag if it is known without looking further.
    pub fn outer(self, node: &Node) -> Option<Tag> {
        match (self.explicit, self.implicit) {
            (Some(number), _) | (None, Some(number)) => Some(Tag::ctx(number)),
            (None, None) => node.kind().and_then(Kind::tag),
        }
    }
}


//============ Tests =========================================================

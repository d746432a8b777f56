//! The encoding error.
//!
//! This is a private module. Its public content is being re-exported by the
//! parent module.

use std::{error, fmt};
use crate::decode::ContentError;


//------------ EncodeError ---------------------------------------------------

/// An error happened while encoding a value.
///
/// Encoding fails if the value given for a node doesn’t fit the node. The
/// error keeps the dotted path of field keys leading to the failing node
/// together with the original cause.
#[derive(Debug)]
pub struct EncodeError {
    error: ContentError,
    path: Option<String>,
}

impl EncodeError {
    /// Creates an encode error from a static str.
    pub fn from_static(msg: &'static str) -> Self {
        Self::new(ContentError::from_static(msg))
    }

    /// Creates an encode error from a content error.
    pub fn new(error: impl Into<ContentError>) -> Self {
        EncodeError { error: error.into(), path: None }
    }

    /// Returns the dotted path of the failing node.
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or("")
    }

    /// Returns the original cause of the error.
    pub fn error(&self) -> &ContentError {
        &self.error
    }

    /// Attaches a path unless the error already has one.
    pub(crate) fn with_path<F: FnOnce() -> String>(mut self, path: F) -> Self {
        if self.path.is_none() {
            self.path = Some(path())
        }
        self
    }
}

impl From<ContentError> for EncodeError {
    fn from(error: ContentError) -> Self {
        Self::new(error)
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "Encoder error at object path: \"{}\": {}",
            self.path(), self.error
        )
    }
}

impl error::Error for EncodeError { }

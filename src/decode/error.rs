//! Error Handling.
//!
//! This is a private module. Its public content is being re-exported by the
//! parent module.

use std::{error, fmt};
use std::borrow::Cow;
use super::cursor::Pos;


//------------ ContentError --------------------------------------------------

/// An error happened while interpreting data.
///
/// This is the error shared by decoding and encoding. It only carries a
/// message. The position in the data or the path within the value is added
/// by [`DecodeError`] and [`EncodeError`][crate::encode::EncodeError].
pub struct ContentError {
    message: ErrorMessage,
}

impl ContentError {
    /// Creates a content error from a static str.
    pub fn from_static(msg: &'static str) -> Self {
        ContentError {
            message: ErrorMessage::Static(msg)
        }
    }

    /// Creates a content error from a boxed trait object.
    pub fn from_boxed(
        msg: Box<dyn fmt::Display + Send + Sync + 'static>
    ) -> Self {
        ContentError {
            message: ErrorMessage::Boxed(msg)
        }
    }
}

impl From<&'static str> for ContentError {
    fn from(msg: &'static str) -> Self {
        Self::from_static(msg)
    }
}

impl From<String> for ContentError {
    fn from(msg: String) -> Self {
        Self::from_boxed(Box::new(msg))
    }
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.message {
            ErrorMessage::Static(msg) => f.write_str(msg),
            ErrorMessage::Boxed(ref msg) => msg.fmt(f),
        }
    }
}

impl fmt::Debug for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("ContentError")
            .field(&format_args!("{}", self))
            .finish()
    }
}

impl error::Error for ContentError { }


//------------ ErrorMessage --------------------------------------------------

/// The actual error message as a string.
///
/// This is a private type in order to be able to change the representation.
enum ErrorMessage {
    Static(&'static str),
    Boxed(Box<dyn fmt::Display + Send + Sync + 'static>),
}


//------------ DecodeError ---------------------------------------------------

/// An error happened while decoding data.
///
/// The error knows where in the data it happened and, once it has left the
/// node that caused it, the dotted path of field keys leading to that node.
#[derive(Debug)]
pub struct DecodeError {
    error: ContentError,
    pos: Pos,
    path: Option<Cow<'static, str>>,
}

impl DecodeError {
    /// Creates a decode error from a content error and a position.
    pub fn content(error: impl Into<ContentError>, pos: Pos) -> Self {
        DecodeError { error: error.into(), pos, path: None }
    }

    /// Returns the position in the data where the error happened.
    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// Returns the dotted path of the node that failed.
    ///
    /// The path is empty for errors at the root of a value.
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or("")
    }

    /// Returns the underlying content error.
    pub fn error(&self) -> &ContentError {
        &self.error
    }

    /// Attaches a path unless the error already has one.
    ///
    /// The innermost node that fails attaches its path, so the first call
    /// wins.
    pub(crate) fn with_path<F: FnOnce() -> String>(mut self, path: F) -> Self {
        if self.path.is_none() {
            self.path = Some(Cow::Owned(path()))
        }
        self
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.path.as_deref() {
            Some(path) if !path.is_empty() => {
                write!(
                    f, "{} at path \"{}\" (offset {})",
                    self.error, path, self.pos
                )
            }
            _ => write!(f, "{} (offset {})", self.error, self.pos)
        }
    }
}

impl error::Error for DecodeError { }


//============ Tests =========================================================

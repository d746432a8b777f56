//! Character strings.
//!
//! ASN.1 knows a whole zoo of character string types. They differ in the
//! characters they allow and in how these characters are encoded. This
//! module contains [`StringKind`] which describes the character string types
//! supported by schemas and converts between their content octets and Rust
//! strings.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::{char, fmt, str};
use crate::decode::ContentError;
use crate::tag::Tag;


//------------ StringKind ----------------------------------------------------

/// The kind of a character string.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StringKind {
    /// A `UTF8String`: any Unicode characters encoded in UTF-8.
    Utf8,

    /// A `NumericString`: the digits and the space character.
    Numeric,

    /// A `PrintableString`: a subset of ASCII.
    ///
    /// This allows the letters `A` to `Z` and `a` to `z`, the digits, the
    /// space character, and the symbols `'`, `(`, `)`, `+`, `,`, `-`, `.`,
    /// `/`, `:`, `=`, and `?`.
    Printable,

    /// A `TeletexString`, also known as `T61String`.
    ///
    /// The actual T.61 character set is a mess of escape sequences. Like
    /// most implementations, we treat each octet as a Latin-1 character.
    Teletex,

    /// An `IA5String`: the ASCII character set.
    Ia5,

    /// A `VisibleString`, also known as `ISO646String`.
    ///
    /// This is the printing characters of ASCII and the space character.
    Visible,

    /// A `UniversalString`: Unicode characters encoded in UTF-32BE.
    Universal,

    /// A `BMPString`: characters of the Basic Multilingual Plane encoded in
    /// UTF-16BE.
    Bmp,
}

impl StringKind {
    /// Returns the universal tag of the string kind.
    pub fn tag(self) -> Tag {
        match self {
            StringKind::Utf8 => Tag::UTF8_STRING,
            StringKind::Numeric => Tag::NUMERIC_STRING,
            StringKind::Printable => Tag::PRINTABLE_STRING,
            StringKind::Teletex => Tag::TELETEX_STRING,
            StringKind::Ia5 => Tag::IA5_STRING,
            StringKind::Visible => Tag::VISIBLE_STRING,
            StringKind::Universal => Tag::UNIVERSAL_STRING,
            StringKind::Bmp => Tag::BMP_STRING,
        }
    }

    /// Returns the name used for the kind in schema definitions.
    pub fn name(self) -> &'static str {
        match self {
            StringKind::Utf8 => "utf8str",
            StringKind::Numeric => "numstr",
            StringKind::Printable => "printstr",
            StringKind::Teletex => "t61str",
            StringKind::Ia5 => "ia5str",
            StringKind::Visible => "iso646str",
            StringKind::Universal => "unistr",
            StringKind::Bmp => "bmpstr",
        }
    }

    /// Converts content octets into a string.
    pub fn decode(self, content: &[u8]) -> Result<String, ContentError> {
        match self {
            StringKind::Utf8 => {
                str::from_utf8(content).map(Into::into).map_err(|_| {
                    self.invalid()
                })
            }
            StringKind::Teletex => {
                Ok(content.iter().map(|&ch| char::from(ch)).collect())
            }
            StringKind::Universal => {
                if content.len() % 4 != 0 {
                    return Err(self.invalid())
                }
                content.chunks_exact(4).map(|chunk| {
                    char::from_u32(u32::from_be_bytes([
                        chunk[0], chunk[1], chunk[2], chunk[3]
                    ])).ok_or_else(|| self.invalid())
                }).collect()
            }
            StringKind::Bmp => {
                if content.len() % 2 != 0 {
                    return Err(self.invalid())
                }
                // UCS-2 only, surrogates are not characters.
                content.chunks_exact(2).map(|chunk| {
                    char::from_u32(u32::from(u16::from_be_bytes([
                        chunk[0], chunk[1]
                    ]))).ok_or_else(|| self.invalid())
                }).collect()
            }
            StringKind::Numeric
            | StringKind::Printable
            | StringKind::Ia5
            | StringKind::Visible => {
                if !content.iter().all(|&ch| self.allows_ascii(ch)) {
                    return Err(self.invalid())
                }
                // All allowed octets are ASCII.
                str::from_utf8(content).map(Into::into).map_err(|_| {
                    self.invalid()
                })
            }
        }
    }

    /// Converts a string into content octets.
    pub fn encode(self, s: &str) -> Result<Vec<u8>, ContentError> {
        match self {
            StringKind::Utf8 => Ok(s.as_bytes().into()),
            StringKind::Teletex => {
                s.chars().map(|ch| {
                    u8::try_from(u32::from(ch)).map_err(|_| self.invalid())
                }).collect()
            }
            StringKind::Universal => {
                Ok(s.chars().flat_map(|ch| u32::from(ch).to_be_bytes()).collect())
            }
            StringKind::Bmp => {
                let mut res = Vec::with_capacity(s.len() * 2);
                for ch in s.chars() {
                    if ch.len_utf16() != 1 {
                        return Err(self.invalid())
                    }
                    res.extend_from_slice(
                        &(u32::from(ch) as u16).to_be_bytes()
                    );
                }
                Ok(res)
            }
            StringKind::Numeric
            | StringKind::Printable
            | StringKind::Ia5
            | StringKind::Visible => {
                if !s.bytes().all(|ch| self.allows_ascii(ch)) {
                    return Err(self.invalid())
                }
                Ok(s.as_bytes().into())
            }
        }
    }

    /// Returns whether an octet is allowed in a ASCII-based string kind.
    fn allows_ascii(self, ch: u8) -> bool {
        match self {
            StringKind::Numeric => ch.is_ascii_digit() || ch == b' ',
            StringKind::Printable => {
                ch.is_ascii_alphanumeric() || matches!(ch,
                    b' ' | b'\'' | b'(' | b')' | b'+' | b',' | b'-' | b'.'
                    | b'/' | b':' | b'=' | b'?'
                )
            }
            StringKind::Ia5 => ch.is_ascii(),
            StringKind::Visible => ch.is_ascii_graphic() || ch == b' ',
            _ => true,
        }
    }

    fn invalid(self) -> ContentError {
        ContentError::from(format!("invalid characters in {}", self.tag()))
    }
}

impl fmt::Display for StringKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ascii_kinds() {
        assert_eq!(
            StringKind::Ia5.decode(b"dog and bone").unwrap(), "dog and bone"
        );
        assert!(StringKind::Ia5.decode(b"\xc3\xa4").is_err());
        assert!(StringKind::Ia5.encode("d\u{f6}g").is_err());
        assert_eq!(StringKind::Numeric.encode("12 34").unwrap(), b"12 34");
        assert!(StringKind::Numeric.encode("12a").is_err());
        assert_eq!(
            StringKind::Printable.decode(b"Hello, World.").unwrap(),
            "Hello, World."
        );
        assert!(StringKind::Printable.decode(b"a@b").is_err());
        assert!(StringKind::Visible.decode(b"tab\t").is_err());
        assert_eq!(StringKind::Visible.decode(b"a@b").unwrap(), "a@b");
    }

    #[test]
    fn utf8() {
        assert_eq!(
            StringKind::Utf8.decode(b"gr\xc3\xbc\xc3\x9f").unwrap(),
            "gr\u{fc}\u{df}"
        );
        assert!(StringKind::Utf8.decode(b"\xc3").is_err());
        assert_eq!(StringKind::Utf8.encode("\u{fc}").unwrap(), b"\xc3\xbc");
    }

    #[test]
    fn wide_kinds() {
        assert_eq!(
            StringKind::Bmp.encode("a\u{20ac}").unwrap(), b"\x00a\x20\xac"
        );
        assert_eq!(
            StringKind::Bmp.decode(b"\x00a\x20\xac").unwrap(), "a\u{20ac}"
        );
        assert!(StringKind::Bmp.decode(b"\x00").is_err());
        assert!(StringKind::Bmp.decode(b"\xd8\x3d\xde\x00").is_err());
        assert!(StringKind::Bmp.encode("\u{1f600}").is_err());
        assert_eq!(
            StringKind::Universal.encode("a\u{1f600}").unwrap(),
            b"\x00\x00\x00a\x00\x01\xf6\x00"
        );
        assert_eq!(
            StringKind::Universal.decode(b"\x00\x00\x00a\x00\x01\xf6\x00")
                .unwrap(),
            "a\u{1f600}"
        );
        assert!(StringKind::Universal.decode(b"\x00\x11\x00\x00").is_err());
    }

    #[test]
    fn teletex() {
        assert_eq!(StringKind::Teletex.decode(b"caf\xe9").unwrap(), "caf\u{e9}");
        assert_eq!(StringKind::Teletex.encode("caf\u{e9}").unwrap(), b"caf\xe9");
        assert!(StringKind::Teletex.encode("\u{20ac}").is_err());
    }
}

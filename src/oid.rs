//! ASN.1 Object Identifiers.
//!
//! This module contains the [`Oid`] type that implements object identifiers,
//! a construct used by ANS.1 to uniquely identify all sorts of things, and
//! [`OidNames`], a table giving object identifiers symbolic names. Both types
//! are also re-exported at the top-level.

use std::{error, fmt};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use smallvec::SmallVec;
use crate::decode::{Cursor, DecodeError};
use crate::encode::{EncodeError, EncodeNode};


//------------ Oid -----------------------------------------------------------

/// An object identifer.
///
/// Object identifiers are globally unique, hierarchical values that are used
/// to identify objects or their type. When written, they are presented as a
/// sequence of integers separated by dots such as ‘1.3.6.1.5.5.7.1’. The
/// type keeps these integers, called arcs, as native integers.
///
/// The same type is used for relative object identifiers. These lack the
/// special encoding of the first two arcs.
///
/// # Encoding
///
/// Each arc, with the exception of the first two, is encoded as a
/// subidentifier: the arc’s value in base 128, most significant group first,
/// with the high bit of all octets but the last set. The first two arcs
/// `x` and `y` are combined into a single subidentifier `x * 40 + y`.
#[derive(Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Oid(SmallVec<[u64; 10]>);

impl Oid {
    /// Creates an object identifier from its arcs.
    pub fn new<I: IntoIterator<Item = u64>>(arcs: I) -> Self {
        Oid(arcs.into_iter().collect())
    }

    /// Returns the arcs of the object identifier.
    pub fn arcs(&self) -> &[u64] {
        self.0.as_slice()
    }

    /// Takes an object identifier from the content octets of a value.
    pub(crate) fn take_content_from(
        cursor: &mut Cursor, relative: bool
    ) -> Result<Self, DecodeError> {
        let pos = cursor.pos();
        if cursor.is_empty() {
            return Err(DecodeError::content(
                "invalid object identifier: no content octets", pos
            ))
        }
        let mut subidentifiers = SmallVec::<[u64; 10]>::new();
        let mut ident = 0u64;
        let mut pending = false;
        while !cursor.is_empty() {
            let octet = cursor.take_u8()?;
            if ident > (u64::MAX >> 7) {
                return Err(DecodeError::content(
                    "object identifier arc too large", pos
                ))
            }
            ident = (ident << 7) | u64::from(octet & 0x7f);
            pending = octet & 0x80 != 0;
            if !pending {
                subidentifiers.push(ident);
                ident = 0;
            }
        }
        if pending {
            return Err(DecodeError::content(
                "invalid object identifier: truncated subidentifier", pos
            ))
        }

        if relative {
            return Ok(Oid(subidentifiers))
        }

        let mut res = SmallVec::with_capacity(subidentifiers.len() + 1);
        let first = subidentifiers[0];
        if first < 80 {
            res.push(first / 40);
            res.push(first % 40);
        }
        else {
            res.push(2);
            res.push(first - 80);
        }
        res.extend_from_slice(&subidentifiers[1..]);
        Ok(Oid(res))
    }

    /// Returns the content octets of the encoded object identifier.
    pub(crate) fn encode_content(
        &self, relative: bool
    ) -> Result<EncodeNode, EncodeError> {
        let mut subidentifiers = SmallVec::<[u64; 10]>::new();
        if relative {
            subidentifiers.extend_from_slice(self.arcs());
        }
        else {
            let (first, second) = match *self.arcs() {
                [first, second, ..] => (first, second),
                _ => {
                    return Err(EncodeError::from_static(
                        "object identifier needs at least two arcs"
                    ))
                }
            };
            if first > 2 {
                return Err(EncodeError::from_static(
                    "first object identifier arc out of range"
                ))
            }
            if first < 2 && second >= 40 {
                return Err(EncodeError::from_static(
                    "second object identifier arc out of range"
                ))
            }
            let packed = (first * 40).checked_add(second).ok_or_else(|| {
                EncodeError::from_static(
                    "second object identifier arc out of range"
                )
            })?;
            subidentifiers.push(packed);
            subidentifiers.extend_from_slice(&self.arcs()[2..]);
        }
        if subidentifiers.is_empty() {
            return Err(EncodeError::from_static(
                "empty relative object identifier"
            ))
        }

        // Fill the octets from the back, least significant group first.
        let size: usize = subidentifiers.iter().map(|&x| groups(x)).sum();
        let mut res = vec![0u8; size];
        let mut offset = size;
        for &ident in subidentifiers.iter().rev() {
            offset -= 1;
            res[offset] = (ident & 0x7f) as u8;
            let mut ident = ident >> 7;
            while ident > 0 {
                offset -= 1;
                res[offset] = 0x80 | (ident & 0x7f) as u8;
                ident >>= 7;
            }
        }
        Ok(res.into())
    }
}

/// Returns the number of base 128 groups necessary for `ident`.
fn groups(mut ident: u64) -> usize {
    let mut res = 1;
    while ident >= 0x80 {
        ident >>= 7;
        res += 1;
    }
    res
}


//--- FromStr

impl FromStr for Oid {
    type Err = ParseOidError;

    /// Parses an object identifier from its ‘dot integer’ notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseOidError(()))
        }
        s.split('.').map(|arc| {
            arc.parse::<u64>().map_err(|_| ParseOidError(()))
        }).collect::<Result<SmallVec<_>, _>>().map(Oid)
    }
}


//--- Display and Debug

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut arcs = self.0.iter();
        if let Some(first) = arcs.next() {
            write!(f, "{}", first)?;
        }
        for arc in arcs {
            write!(f, ".{}", arc)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}


//------------ OidNames ------------------------------------------------------

/// A table of symbolic names for object identifiers.
///
/// A schema node for object identifiers can carry such a table. When
/// decoding, an identifier found in the table is replaced by its name.
/// When encoding, a name is translated back into its identifier.
#[derive(Clone, Debug, Default)]
pub struct OidNames {
    names: BTreeMap<Oid, String>,
    oids: HashMap<String, Oid>,
}

impl OidNames {
    /// Creates a new, empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a name for an object identifier.
    pub fn with(mut self, oid: Oid, name: impl Into<String>) -> Self {
        self.insert(oid, name);
        self
    }

    /// Adds a name for an object identifier.
    pub fn insert(&mut self, oid: Oid, name: impl Into<String>) {
        let name = name.into();
        self.oids.insert(name.clone(), oid.clone());
        self.names.insert(oid, name);
    }

    /// Returns the name of an object identifier.
    pub fn name(&self, oid: &Oid) -> Option<&str> {
        self.names.get(oid).map(String::as_str)
    }

    /// Returns the object identifier for a name.
    pub fn oid(&self, name: &str) -> Option<&Oid> {
        self.oids.get(name)
    }
}

impl<S: Into<String>> FromIterator<(Oid, S)> for OidNames {
    fn from_iter<I: IntoIterator<Item = (Oid, S)>>(iter: I) -> Self {
        let mut res = Self::new();
        for (oid, name) in iter {
            res.insert(oid, name)
        }
        res
    }
}


//------------ ParseOidError -------------------------------------------------

/// A string didn’t contain an object identifier in dotted notation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ParseOidError(());

impl fmt::Display for ParseOidError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid object identifier")
    }
}

impl error::Error for ParseOidError { }


//============ Tests =========================================================

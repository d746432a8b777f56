//! Symbolic names for integer values.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::collections::{BTreeMap, HashMap};
use crate::int::Integer;


//------------ IntNames ------------------------------------------------------

/// A table of symbolic names for the values of an integer.
///
/// Integer and enumerated nodes can carry such a table. A decoded value
/// found in the table is replaced by its name and a name given as the value
/// when encoding is translated back into its number.
#[derive(Clone, Debug, Default)]
pub struct IntNames {
    names: BTreeMap<u64, String>,
    values: HashMap<String, u64>,
}

impl IntNames {
    /// Creates a new, empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a name for a value.
    pub fn with(mut self, value: u64, name: impl Into<String>) -> Self {
        self.insert(value, name);
        self
    }

    /// Adds a name for a value.
    pub fn insert(&mut self, value: u64, name: impl Into<String>) {
        let name = name.into();
        self.values.insert(name.clone(), value);
        self.names.insert(value, name);
    }

    /// Returns the name for an integer.
    pub fn name(&self, value: &Integer) -> Option<&str> {
        value.to_u64().and_then(|value| {
            self.names.get(&value).map(String::as_str)
        })
    }

    /// Returns the value for a name.
    pub fn value(&self, name: &str) -> Option<Integer> {
        self.values.get(name).map(|&value| value.into())
    }
}

impl<S: Into<String>> FromIterator<(u64, S)> for IntNames {
    fn from_iter<I: IntoIterator<Item = (u64, S)>>(iter: I) -> Self {
        let mut res = Self::new();
        for (value, name) in iter {
            res.insert(value, name)
        }
        res
    }
}


//============ Tests =========================================================

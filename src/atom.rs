// Copyright (c) 2018 Fabian Schuiki

//! Interning of names.
//!
//! An `AtomTable` hands out one `Atom` per distinct name. Two atoms are equal
//! if and only if their names are equal, so everything downstream compares
//! names by handle instead of by content.

use std::fmt;

use error::{Error, Result};
use table::{hash_bytes, Policy, Table};

/// A handle to an interned name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Atom(usize);

impl Atom {
    /// Create an atom from a usize.
    pub fn from_usize(id: usize) -> Atom {
        Atom(id)
    }

    /// Obtain the atom as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct NamePolicy;

impl Policy<Box<str>> for NamePolicy {
    fn hash(&self, o: &Box<str>) -> u64 {
        hash_bytes(0, o.as_bytes())
    }

    fn eq(&self, a: &Box<str>, b: &Box<str>) -> bool {
        a == b
    }
}

/// A table of interned names.
#[derive(Debug, Clone)]
pub struct AtomTable {
    names: Table<Box<str>, NamePolicy>,
}

impl AtomTable {
    /// Create a new empty atom table.
    pub fn new() -> AtomTable {
        AtomTable {
            names: Table::new(NamePolicy),
        }
    }

    /// Intern a name.
    ///
    /// Returns the existing atom if the name has been seen before.
    pub fn intern(&mut self, name: &str) -> Result<Atom> {
        if let Some(atom) = self.get(name) {
            return Ok(atom);
        }
        let mut copy = String::new();
        copy.try_reserve_exact(name.len())?;
        copy.push_str(name);
        match self.names.insert(copy.into_boxed_str()) {
            Ok(index) => Ok(Atom(index)),
            Err(Error::AlreadyExists(index)) => Ok(Atom(index)),
            Err(e) => Err(e),
        }
    }

    /// Look up the atom of a name without interning it.
    pub fn get(&self, name: &str) -> Option<Atom> {
        self.names
            .find(hash_bytes(0, name.as_bytes()), |n| &**n == name)
            .map(Atom)
    }

    /// The name behind an atom.
    ///
    /// The returned string lives in the table and is the same for every call
    /// with the same atom.
    pub fn name(&self, atom: Atom) -> &str {
        &self.names[atom.0]
    }

    /// The number of interned names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no names have been interned yet.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// Copyright (c) 2018 Fabian Schuiki

//! An open-addressing hash table with caller-supplied hashing and equality.
//!
//! Every set and map in the crate is a `Table`: the names of a grammar, its
//! symbols, the rules of each nonterminal, the items and arrows of each state,
//! and the item and state pools of an automaton. The behaviour of a table is
//! bound at construction through a `Policy`, which decides how elements are
//! hashed and when two of them count as equal. The table owns its elements
//! and drops them together with itself.
//!
//! Elements are stored densely in insertion order and the probe array only
//! holds indices into that storage. An element's index is therefore stable for
//! the lifetime of the table and doubles as its handle. A map is a table whose
//! policy only looks at the key part of its elements.

use std;
use std::ops::Index;

use error::{Error, Result};

/// Hashing and equality for the elements of a table.
pub trait Policy<T> {
    /// Compute the hash of an element.
    fn hash(&self, o: &T) -> u64;

    /// Check whether two elements are equal.
    ///
    /// Equal elements must have equal hashes.
    fn eq(&self, a: &T, b: &T) -> bool;
}

/// Jenkins' one-at-a-time hash over a byte slice, continuing from `seed`.
pub fn hash_bytes(seed: u64, data: &[u8]) -> u64 {
    let mut hash = seed;
    for &b in data {
        hash = hash.wrapping_add(b as u64);
        hash = hash.wrapping_add(hash << 10);
        hash ^= hash >> 6;
    }
    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash = hash.wrapping_add(hash << 15);
    hash
}

/// Hash an index-like value, continuing from `seed`.
pub fn hash_usize(seed: u64, value: usize) -> u64 {
    hash_bytes(seed, &(value as u64).to_le_bytes())
}

const INITIAL_SIZE: usize = 4;

/// An insert/lookup-only hash table with open addressing and linear probing.
#[derive(Debug, Clone)]
pub struct Table<T, P> {
    policy: P,
    entries: Vec<T>,
    slots: Vec<Option<usize>>,
    sum: u64,
}

enum Slot {
    Occupied(usize),
    Vacant(usize),
}

/// Walk the probe sequence for `hash` until a matching entry or an empty slot
/// is found. The table never exceeds 50% load, so an empty slot always exists.
fn probe<T, F>(slots: &[Option<usize>], entries: &[T], hash: u64, eq: F) -> Slot
where
    F: Fn(&T) -> bool,
{
    let mask = slots.len() - 1;
    let mut i = (hash as usize) & mask;
    loop {
        match slots[i] {
            None => return Slot::Vacant(i),
            Some(index) if eq(&entries[index]) => return Slot::Occupied(index),
            Some(_) => i = (i + 1) & mask,
        }
    }
}

fn alloc_slots(size: usize) -> Result<Vec<Option<usize>>> {
    let mut slots = Vec::new();
    slots.try_reserve_exact(size)?;
    slots.resize(size, None);
    Ok(slots)
}

impl<T, P: Policy<T>> Table<T, P> {
    /// Create a new empty table governed by `policy`.
    pub fn new(policy: P) -> Table<T, P> {
        Table {
            policy: policy,
            entries: Vec::new(),
            slots: vec![None; INITIAL_SIZE],
            sum: 0,
        }
    }

    /// The policy this table was created with.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// The number of elements in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number of probe slots. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Find the index of the element with the given hash for which `eq`
    /// returns true.
    ///
    /// This allows lookups by a borrowed key without constructing a full
    /// element. `hash` must agree with the policy's hash of the element.
    pub fn find<F>(&self, hash: u64, eq: F) -> Option<usize>
    where
        F: Fn(&T) -> bool,
    {
        match probe(&self.slots, &self.entries, hash, eq) {
            Slot::Occupied(index) => Some(index),
            Slot::Vacant(_) => None,
        }
    }

    /// The index of the stored element equal to `o`.
    pub fn index_of(&self, o: &T) -> Option<usize> {
        let policy = &self.policy;
        self.find(policy.hash(o), |e| policy.eq(e, o))
    }

    /// The stored element equal to `o`.
    pub fn lookup(&self, o: &T) -> Option<&T> {
        self.index_of(o).map(|index| &self.entries[index])
    }

    /// Whether an element equal to `o` is present.
    pub fn contains(&self, o: &T) -> bool {
        self.index_of(o).is_some()
    }

    /// Insert an element and return its index.
    ///
    /// Fails with `Error::AlreadyExists` if an equal element is present; the
    /// table is left untouched and `o` is dropped. Fails with
    /// `Error::AllocationFailure` if the table cannot grow.
    pub fn insert(&mut self, o: T) -> Result<usize> {
        let hash = self.policy.hash(&o);
        if let Some(index) = self.find(hash, |e| self.policy.eq(e, &o)) {
            return Err(Error::AlreadyExists(index));
        }
        self.reserve_one()?;
        let slot = match probe(&self.slots, &self.entries, hash, |_| false) {
            Slot::Vacant(slot) => slot,
            Slot::Occupied(_) => unreachable!(),
        };
        let index = self.entries.len();
        self.entries.push(o);
        self.slots[slot] = Some(index);
        self.sum = self.sum.wrapping_add(hash);
        Ok(index)
    }

    /// Make room for one more element, doubling the probe array if the load
    /// factor would otherwise exceed 50%.
    fn reserve_one(&mut self) -> Result<()> {
        self.entries.try_reserve(1)?;
        if (self.entries.len() + 1) * 2 <= self.slots.len() {
            return Ok(());
        }
        let mut slots = alloc_slots(self.slots.len() * 2)?;
        for (index, entry) in self.entries.iter().enumerate() {
            let hash = self.policy.hash(entry);
            match probe(&slots, &self.entries, hash, |_| false) {
                Slot::Vacant(slot) => slots[slot] = Some(index),
                Slot::Occupied(_) => unreachable!(),
            }
        }
        self.slots = slots;
        Ok(())
    }

    /// The element at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    /// Mutable access to the element at `index`.
    ///
    /// The caller must not change anything the policy's hash or equality
    /// looks at.
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index)
    }

    /// Iterate over the elements in insertion order.
    pub fn iter(&self) -> std::slice::Iter<T> {
        self.entries.iter()
    }

    /// The hash of the table as a whole: the wrapping sum of the element
    /// hashes, which does not depend on insertion order.
    pub fn hash_sum(&self) -> u64 {
        self.sum
    }

    /// Whether two tables hold equal elements, regardless of order.
    pub fn set_eq(&self, other: &Table<T, P>) -> bool {
        self.len() == other.len() && self.sum == other.sum
            && self.entries.iter().all(|e| other.contains(e))
    }
}

impl<T, P: Policy<T>> Index<usize> for Table<T, P> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.entries[index]
    }
}

impl<'a, T, P: Policy<T>> IntoIterator for &'a Table<T, P> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Str;

    impl Policy<&'static str> for Str {
        fn hash(&self, o: &&'static str) -> u64 {
            hash_bytes(0, o.as_bytes())
        }

        fn eq(&self, a: &&'static str, b: &&'static str) -> bool {
            a == b
        }
    }

    /// Hashes by the first byte only, to force long probe chains.
    #[derive(Debug, Clone)]
    struct FirstByte;

    impl Policy<&'static str> for FirstByte {
        fn hash(&self, o: &&'static str) -> u64 {
            o.as_bytes().first().cloned().unwrap_or(0) as u64
        }

        fn eq(&self, a: &&'static str, b: &&'static str) -> bool {
            a == b
        }
    }

    const STRINGS: [&'static str; 6] = [
        "test string #1",
        "Lorem ipsum dolor sit amet",
        "consectetur adipiscing elit",
        "sed do eiusmod tempor incididunt",
        "ut labore et dolore magna aliqua",
        "test string #2",
    ];

    #[test]
    fn insert_and_lookup() {
        let mut t = Table::new(Str);
        for (i, s) in STRINGS.iter().enumerate() {
            assert_eq!(t.insert(*s), Ok(i));
        }
        assert_eq!(t.len(), 6);
        assert_eq!(t.insert("test string #1"), Err(Error::AlreadyExists(0)));
        assert_eq!(t.len(), 6);
        for (i, s) in STRINGS.iter().enumerate() {
            assert_eq!(t.index_of(s), Some(i));
            assert_eq!(t.lookup(s), Some(s));
        }
        assert_eq!(t.lookup(&"missing"), None);
    }

    #[test]
    fn load_factor_stays_at_most_half() {
        let mut t = Table::new(Str);
        assert_eq!(t.capacity(), 4);
        for s in STRINGS.iter() {
            t.insert(*s).unwrap();
            assert!(t.len() * 2 <= t.capacity());
            assert!(t.capacity().is_power_of_two());
        }
        assert_eq!(t.capacity(), 16);
    }

    #[test]
    fn collisions_probe_linearly() {
        let mut t = Table::new(FirstByte);
        let words = ["tea", "ten", "tin", "toe", "top", "tub", "tux", "xyz"];
        for w in words.iter() {
            t.insert(*w).unwrap();
        }
        for (i, w) in words.iter().enumerate() {
            assert_eq!(t.index_of(w), Some(i));
        }
        assert_eq!(t.insert("tin"), Err(Error::AlreadyExists(2)));
        assert!(!t.contains(&"tan"));
    }

    #[test]
    fn indices_survive_growth() {
        let mut t = Table::new(Str);
        let first = t.insert("first").unwrap();
        for s in STRINGS.iter() {
            t.insert(*s).unwrap();
        }
        assert_eq!(t[first], "first");
        assert_eq!(t.index_of(&"first"), Some(first));
    }

    #[test]
    fn set_identity_ignores_order() {
        let mut a = Table::new(Str);
        let mut b = Table::new(Str);
        for s in STRINGS.iter() {
            a.insert(*s).unwrap();
        }
        for s in STRINGS.iter().rev() {
            b.insert(*s).unwrap();
        }
        assert_eq!(a.hash_sum(), b.hash_sum());
        assert!(a.set_eq(&b));
        b.insert("one more").unwrap();
        assert!(!a.set_eq(&b));
        assert!(!b.set_eq(&a));
    }

    #[test]
    fn one_at_a_time_hash() {
        assert_eq!(hash_bytes(0, b""), 0);
        assert_eq!(hash_bytes(0, b"a"), hash_bytes(0, b"a"));
        assert!(hash_bytes(0, b"a") != hash_bytes(0, b"b"));
        assert!(hash_bytes(0, b"ab") != hash_bytes(0, b"ba"));
    }
}

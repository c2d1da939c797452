//! The trie facade and its hybrid iterator.
//!
//! `Fst` composes the two LOUDS sections. A point lookup walks the dense
//! levels first and hands the child node number across the boundary when
//! the walk survives them; node numbers are contiguous across the two
//! sections, so the hand-off needs no translation.
//!
//! The hybrid `Iter` pairs a dense and a sparse cursor. Every dense
//! operation reports how it ended through [`DenseStep`], and the hybrid
//! driver matches on that: `Done` keeps the cursor in the dense levels,
//! the continuation variants seed the sparse cursor with the send-out node
//! number, and `Invalid` ends the iteration.

#[cfg(not(test))]
use alloc::vec::Vec;

use core::cmp::Ordering;

use crate::binary::{Reader, Writer};
use crate::builder::Builder;
use crate::dense::{DenseIter, DenseLookup, DenseStep, LoudsDense};
use crate::error::{FstError, Result};
use crate::sparse::{LoudsSparse, SparseIter};
use crate::{DEFAULT_INCLUDE_DENSE, DEFAULT_SPARSE_DENSE_RATIO};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const MAGIC: u32 = u32::from_le_bytes(*b"FSTr");
const VERSION: u32 = 1;

/// An immutable, ordered map from byte-string keys to `u64` values.
///
/// Built once from sorted input, then read-only; all read operations are
/// safe to call concurrently. The lifetime parameter tracks borrowed
/// storage: a trie built in memory is `Fst<'static>`, a trie deserialized
/// with [`Fst::from_bytes`] borrows the blob.
///
/// # Input contract
///
/// Keys must be non-empty, strictly increasing, and free of duplicates.
/// The byte `0x00` doubles as the internal terminator for keys that are
/// proper prefixes of other keys; a key whose *distinguishing final byte*
/// is `0x00` (for example storing both `"ab"` and `"ab\0"`) collides with
/// that encoding and is unsupported. Interior `0x00` bytes are fine.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Fst<'a> {
    dense: LoudsDense<'a>,
    sparse: LoudsSparse<'a>,
}

/// A trie node surfaced by [`Fst::get_node`].
///
/// `prefix` holds the labels of any single-branch run compacted on the way
/// down. Each entry of `slots` is tagged in its low two bits: `...01` is a
/// stored value, `...11` is a child node number; the payload sits in the
/// upper 62 bits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeRef {
    /// Labels of the compacted single-branch run above the node
    pub prefix: Vec<u8>,
    /// One label byte per slot
    pub labels: Vec<u8>,
    /// Tagged value-or-child words, parallel to `labels`
    pub slots: Vec<u64>,
}

impl Fst<'static> {
    /// Build a trie from sorted keys and their values with the default
    /// dense/sparse split.
    pub fn new<K: AsRef<[u8]>>(keys: &[K], values: &[u64]) -> Result<Self> {
        Self::with_options(keys, values, DEFAULT_INCLUDE_DENSE, DEFAULT_SPARSE_DENSE_RATIO)
    }

    /// Build with explicit split parameters.
    ///
    /// `include_dense = false` encodes every level sparsely. Otherwise the
    /// dense section grows while its accumulated size times
    /// `sparse_dense_ratio` stays below the remaining sparse size; a ratio
    /// of `0` therefore encodes every level densely.
    pub fn with_options<K: AsRef<[u8]>>(
        keys: &[K],
        values: &[u64],
        include_dense: bool,
        sparse_dense_ratio: u32,
    ) -> Result<Self> {
        let mut builder = Builder::new(include_dense, sparse_dense_ratio);
        builder.build(keys, values)?;
        let (dense, sparse) = builder.finish();
        Ok(Fst { dense, sparse })
    }

    /// Build from `u32` keys, byte-swapped to big-endian strings so that
    /// unsigned integer order matches lexicographic order.
    pub fn from_u32_keys(keys: &[u32], values: &[u64]) -> Result<Self> {
        let transformed: Vec<[u8; 4]> = keys.iter().map(|k| k.to_be_bytes()).collect();
        Self::new(&transformed, values)
    }

    /// Build from `u64` keys, byte-swapped to big-endian strings.
    pub fn from_u64_keys(keys: &[u64], values: &[u64]) -> Result<Self> {
        let transformed: Vec<[u8; 8]> = keys.iter().map(|k| k.to_be_bytes()).collect();
        Self::new(&transformed, values)
    }
}

impl<'a> Fst<'a> {
    /// Look up a key, returning its value if stored.
    pub fn lookup(&self, key: &[u8]) -> Option<u64> {
        if self.dense.height() == 0 {
            if self.sparse.is_empty() {
                return None;
            }
            return self.sparse.lookup_key(key, 0);
        }
        match self.dense.lookup_key(key) {
            DenseLookup::Found(v) => Some(v),
            DenseLookup::NotPresent => None,
            DenseLookup::ContinueInSparse(node) => self.sparse.lookup_key(key, node),
        }
    }

    /// Look up a `u32` key (big-endian byte order).
    pub fn lookup_u32(&self, key: u32) -> Option<u64> {
        self.lookup(&key.to_be_bytes())
    }

    /// Look up a `u64` key (big-endian byte order).
    pub fn lookup_u64(&self, key: u64) -> Option<u64> {
        self.lookup(&key.to_be_bytes())
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.dense.num_values() + self.sparse.num_values()
    }

    /// Returns true if the trie stores no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Trie height: the length of the longest stored key, counting the
    /// terminator level of prefix keys.
    pub fn height(&self) -> usize {
        self.sparse.height()
    }

    /// First sparsely encoded level.
    pub fn sparse_start_level(&self) -> usize {
        self.sparse.start_level()
    }

    /// Iterator on the smallest key.
    pub fn move_to_first(&self) -> Iter<'_> {
        let mut iter = Iter::new(self);
        if self.dense.height() > 0 {
            iter.dense.set_to_first_label_in_root();
            match iter.dense.move_to_leftmost_key() {
                DenseStep::Done => iter.active = Active::Dense,
                DenseStep::ContinueLeftmost(node) => {
                    iter.sparse.set_start_node(node);
                    iter.sparse.move_to_leftmost_key();
                    iter.active = Active::Sparse;
                }
                _ => {}
            }
        } else if !self.sparse.is_empty() {
            iter.sparse.set_start_node(0);
            iter.sparse.move_to_leftmost_key();
            if iter.sparse.valid {
                iter.active = Active::Sparse;
            }
        }
        iter
    }

    /// Iterator on the largest key.
    pub fn move_to_last(&self) -> Iter<'_> {
        let mut iter = Iter::new(self);
        if self.dense.height() > 0 {
            iter.dense.set_to_last_label_in_root();
            match iter.dense.move_to_rightmost_key() {
                DenseStep::Done => iter.active = Active::Dense,
                DenseStep::ContinueRightmost(node) => {
                    iter.sparse.set_start_node(node);
                    iter.sparse.move_to_rightmost_key();
                    iter.active = Active::Sparse;
                }
                _ => {}
            }
        } else if !self.sparse.is_empty() {
            iter.sparse.set_start_node(0);
            iter.sparse.move_to_rightmost_key();
            if iter.sparse.valid {
                iter.active = Active::Sparse;
            }
        }
        iter
    }

    /// Iterator on the smallest key `>= key` (`> key` when `inclusive` is
    /// false); invalid if no such key exists.
    pub fn move_to_key_greater_than(&self, key: &[u8], inclusive: bool) -> Iter<'_> {
        let mut iter = Iter::new(self);
        if self.dense.height() == 0 {
            if !self.sparse.is_empty() {
                iter.sparse.set_start_node(0);
                if self.sparse.move_to_key_greater_than(key, inclusive, &mut iter.sparse) {
                    iter.active = Active::Sparse;
                }
            }
            return iter;
        }

        match iter.dense.move_to_key_greater_than(key, inclusive) {
            DenseStep::Done => iter.active = Active::Dense,
            DenseStep::Invalid => {}
            DenseStep::ContinueGreaterThan(node) => {
                iter.sparse.set_start_node(node);
                if self.sparse.move_to_key_greater_than(key, inclusive, &mut iter.sparse) {
                    iter.active = Active::Sparse;
                } else {
                    // Nothing at or above the probe below this subtree:
                    // step the dense cursor to the next subtree's minimum.
                    iter.increment_dense();
                }
            }
            DenseStep::ContinueLeftmost(node) => {
                iter.sparse.set_start_node(node);
                iter.sparse.move_to_leftmost_key();
                iter.active = Active::Sparse;
            }
            DenseStep::ContinueRightmost(_) => unreachable!(),
        }
        iter
    }

    /// Iterator on the largest key `< key` (`<= key` when `inclusive`);
    /// invalid if no such key exists.
    pub fn move_to_key_less_than(&self, key: &[u8], inclusive: bool) -> Iter<'_> {
        let mut iter = self.move_to_key_greater_than(key, !inclusive);
        if !iter.is_valid() {
            return self.move_to_last();
        }
        iter.prev();
        iter
    }

    /// Range scan: `begin` sits on the first key inside the boundary,
    /// `end` one past the last (walk with `while begin != end`).
    ///
    /// `end` steps past the right key only when `right_inclusive` holds
    /// and the right key is itself stored. An inverted range yields two
    /// invalid iterators.
    pub fn lookup_range(
        &self,
        left_key: &[u8],
        left_inclusive: bool,
        right_key: &[u8],
        right_inclusive: bool,
    ) -> (Iter<'_>, Iter<'_>) {
        let begin = self.move_to_key_greater_than(left_key, left_inclusive);
        if !begin.is_valid() {
            // Nothing at or above the left boundary.
            return (Iter::new(self), Iter::new(self));
        }
        let mut end = self.move_to_key_greater_than(right_key, true);
        if right_inclusive && end.is_valid() && end.compare(right_key) == Ordering::Equal {
            end.next();
        }
        if end.is_valid() && begin.compare(&end.key()) == Ordering::Greater {
            return (Iter::new(self), Iter::new(self));
        }
        (begin, end)
    }

    /// Resolve `(level, node_num)` to the first node at or below it that
    /// is a leaf or has at least two branches, compacting single-label
    /// runs into the returned prefix.
    ///
    /// Child slots (`...11` tag) name node numbers at level
    /// `level + prefix.len() + 1`, which is how hybrid-trie consumers walk
    /// the structure node by node. `(0, 0)` is the root. Node numbers not
    /// produced by a previous call are a contract violation.
    pub fn get_node(&self, level: usize, node_num: usize) -> NodeRef {
        let mut level = level;
        let mut node = node_num;
        let mut prefix = Vec::new();

        while level < self.sparse.start_level() {
            match self.dense.compact_single_branch(node) {
                Some((label, child)) => {
                    prefix.push(label);
                    node = child;
                    level += 1;
                }
                None => {
                    let (labels, slots) = self.dense.node_entries(node);
                    return NodeRef {
                        prefix,
                        labels,
                        slots,
                    };
                }
            }
        }
        while let Some((label, child)) = self.sparse.compact_single_branch(node) {
            prefix.push(label);
            node = child;
        }
        let (labels, slots) = self.sparse.node_entries(node);
        NodeRef {
            prefix,
            labels,
            slots,
        }
    }

    /// Serialize into a little-endian byte blob.
    ///
    /// The blob is position-independent and 8-byte aligned internally;
    /// store it on an 8-byte boundary (a mapped file or
    /// [`crate::binary::AlignedBlob`]) to deserialize it zero-copy.
    pub fn serialize(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.put_u32(MAGIC);
        w.put_u32(VERSION);
        self.dense.write_into(&mut w);
        self.sparse.write_into(&mut w);
        w.finish()
    }

    /// Deserialize a trie view borrowing from `blob`.
    ///
    /// The view holds references into the blob and cannot outlive it. The
    /// blob storage must be 8-byte aligned.
    pub fn from_bytes(blob: &'a [u8]) -> Result<Fst<'a>> {
        let mut r = Reader::new(blob)?;
        if r.u32()? != MAGIC {
            return Err(FstError::DeserializeFormat {
                context: "bad magic",
            });
        }
        if r.u32()? != VERSION {
            return Err(FstError::DeserializeFormat {
                context: "unsupported version",
            });
        }
        let dense = LoudsDense::read_from(&mut r)?;
        let sparse = LoudsSparse::read_from(&mut r)?;
        Ok(Fst { dense, sparse })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Active {
    Invalid,
    Dense,
    Sparse,
}

/// Bidirectional cursor over the stored keys.
///
/// An invalid iterator marks the position past either end; check
/// [`Iter::is_valid`] before reading. Each iterator owns its cursor state,
/// so concurrent readers each create their own.
#[derive(Clone, Debug)]
pub struct Iter<'t> {
    dense: DenseIter<'t>,
    sparse: SparseIter<'t>,
    active: Active,
    dense_skipped: bool,
}

impl<'t> Iter<'t> {
    fn new(fst: &'t Fst<'t>) -> Self {
        Iter {
            dense: DenseIter::new(&fst.dense),
            sparse: SparseIter::new(&fst.sparse),
            active: Active::Invalid,
            dense_skipped: fst.dense.height() == 0,
        }
    }

    /// Returns true while the iterator points at a stored key.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.active != Active::Invalid
    }

    /// The key under the cursor (empty if invalid).
    pub fn key(&self) -> Vec<u8> {
        match self.active {
            Active::Invalid => Vec::new(),
            Active::Dense => self.dense.key_bytes().to_vec(),
            Active::Sparse => {
                let mut key = if self.dense_skipped {
                    Vec::new()
                } else {
                    self.dense.key_bytes().to_vec()
                };
                key.extend_from_slice(self.sparse.key_bytes());
                key
            }
        }
    }

    /// The value under the cursor.
    ///
    /// # Panics
    ///
    /// Panics if the iterator is invalid.
    pub fn value(&self) -> u64 {
        match self.active {
            Active::Invalid => panic!("value() called on an invalid iterator"),
            Active::Dense => self.dense.value(),
            Active::Sparse => self.sparse.value(),
        }
    }

    /// Compare the key under the cursor against `key` without
    /// materialising it.
    pub fn compare(&self, key: &[u8]) -> Ordering {
        debug_assert!(self.is_valid());
        let dense_part: &[u8] = if self.dense_skipped {
            &[]
        } else {
            self.dense.key_bytes()
        };
        match self.active {
            Active::Dense | Active::Invalid => dense_part.cmp(key),
            Active::Sparse => {
                let shared = dense_part.len().min(key.len());
                match dense_part[..shared].cmp(&key[..shared]) {
                    Ordering::Equal if dense_part.len() > key.len() => Ordering::Greater,
                    Ordering::Equal => self.sparse.key_bytes().cmp(&key[dense_part.len()..]),
                    other => other,
                }
            }
        }
    }

    /// Advance to the next key. Returns the validity afterwards.
    pub fn next(&mut self) -> bool {
        match self.active {
            Active::Invalid => false,
            Active::Dense => self.increment_dense(),
            Active::Sparse => {
                self.sparse.next();
                if self.sparse.valid {
                    true
                } else {
                    self.increment_dense()
                }
            }
        }
    }

    /// Step back to the previous key. Returns the validity afterwards.
    pub fn prev(&mut self) -> bool {
        match self.active {
            Active::Invalid => false,
            Active::Dense => self.decrement_dense(),
            Active::Sparse => {
                self.sparse.prev();
                if self.sparse.valid {
                    true
                } else {
                    self.decrement_dense()
                }
            }
        }
    }

    /// Advance the dense cursor and refill the sparse cursor when the new
    /// position continues below the boundary.
    fn increment_dense(&mut self) -> bool {
        if self.dense_skipped {
            self.active = Active::Invalid;
            return false;
        }
        match self.dense.next() {
            DenseStep::Done => {
                self.active = Active::Dense;
                true
            }
            DenseStep::ContinueLeftmost(node) => {
                self.sparse.set_start_node(node);
                self.sparse.move_to_leftmost_key();
                self.active = Active::Sparse;
                true
            }
            _ => {
                self.active = Active::Invalid;
                false
            }
        }
    }

    fn decrement_dense(&mut self) -> bool {
        if self.dense_skipped {
            self.active = Active::Invalid;
            return false;
        }
        match self.dense.prev() {
            DenseStep::Done => {
                self.active = Active::Dense;
                true
            }
            DenseStep::ContinueRightmost(node) => {
                self.sparse.set_start_node(node);
                self.sparse.move_to_rightmost_key();
                self.active = Active::Sparse;
                true
            }
            _ => {
                self.active = Active::Invalid;
                false
            }
        }
    }
}

impl PartialEq for Iter<'_> {
    /// Two iterators are equal when they reference the same position, or
    /// are both invalid.
    fn eq(&self, other: &Self) -> bool {
        match (self.is_valid(), other.is_valid()) {
            (false, false) => true,
            (true, true) => {
                if !self.dense_skipped && !other.dense_skipped {
                    if self.dense.last_pos() != other.dense.last_pos()
                        || self.dense.at_prefix_key() != other.dense.at_prefix_key()
                    {
                        return false;
                    }
                    match (self.active, other.active) {
                        (Active::Dense, Active::Dense) => true,
                        (Active::Sparse, Active::Sparse) => {
                            self.sparse.last_pos() == other.sparse.last_pos()
                        }
                        _ => false,
                    }
                } else {
                    self.sparse.last_pos() == other.sparse.last_pos()
                }
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 96 three-byte keys sized so the default builder splits them into
    /// two dense levels and one sparse level.
    fn split_keys() -> Vec<Vec<u8>> {
        let mut keys = Vec::new();
        for a in b'a'..b'e' {
            for b in b'a'..b'i' {
                for c in b'x'..b'{' {
                    keys.push(alloc::vec![a, b, c]);
                }
            }
        }
        keys
    }

    fn split_fst() -> Fst<'static> {
        let keys = split_keys();
        let values: Vec<u64> = (0..keys.len() as u64).collect();
        let fst = Fst::with_options(&keys, &values, true, 1).unwrap();
        // The point of this fixture: both sections are in play.
        assert_eq!(fst.sparse_start_level(), 2);
        assert_eq!(fst.height(), 3);
        fst
    }

    #[test]
    fn test_lookup_across_boundary() {
        let keys = split_keys();
        let fst = split_fst();
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(fst.lookup(key), Some(i as u64), "key {:?}", key);
        }
        assert_eq!(fst.lookup(b"aaa"), None);
        assert_eq!(fst.lookup(b"aax\0"), None);
        assert_eq!(fst.lookup(b"aa"), None);
        assert_eq!(fst.lookup(b"zzz"), None);
    }

    #[test]
    fn test_forward_iteration_crosses_boundary() {
        let keys = split_keys();
        let fst = split_fst();
        let mut iter = fst.move_to_first();
        for (i, key) in keys.iter().enumerate() {
            assert!(iter.is_valid(), "died at {}", i);
            assert_eq!(iter.key(), *key);
            assert_eq!(iter.value(), i as u64);
            iter.next();
        }
        assert!(!iter.is_valid());
    }

    #[test]
    fn test_backward_iteration_crosses_boundary() {
        let keys = split_keys();
        let fst = split_fst();
        let mut iter = fst.move_to_last();
        for (i, key) in keys.iter().enumerate().rev() {
            assert!(iter.is_valid(), "died at {}", i);
            assert_eq!(iter.key(), *key);
            assert_eq!(iter.value(), i as u64);
            iter.prev();
        }
        assert!(!iter.is_valid());
    }

    #[test]
    fn test_greater_than_at_boundary() {
        let keys = split_keys();
        let fst = split_fst();

        // Probe equal to a stored key.
        let iter = fst.move_to_key_greater_than(&keys[10], true);
        assert_eq!(iter.key(), keys[10]);
        let iter = fst.move_to_key_greater_than(&keys[10], false);
        assert_eq!(iter.key(), keys[11]);

        // Probe that dies inside the sparse node ("aay" is between "aax"
        // and "aaz").
        let iter = fst.move_to_key_greater_than(b"aayq", true);
        assert_eq!(iter.key(), b"aaz");

        // Probe below everything / above everything.
        let iter = fst.move_to_key_greater_than(b"a", true);
        assert_eq!(iter.key(), keys[0]);
        let iter = fst.move_to_key_greater_than(b"z", true);
        assert!(!iter.is_valid());
    }

    #[test]
    fn test_less_than() {
        let keys = split_keys();
        let fst = split_fst();

        let iter = fst.move_to_key_less_than(&keys[10], true);
        assert_eq!(iter.key(), keys[10]);
        let iter = fst.move_to_key_less_than(&keys[10], false);
        assert_eq!(iter.key(), keys[9]);

        // Everything is smaller than "z": lands on the last key.
        let iter = fst.move_to_key_less_than(b"z", false);
        assert_eq!(iter.key(), *keys.last().unwrap());

        // Nothing is smaller than "a".
        let iter = fst.move_to_key_less_than(b"a", false);
        assert!(!iter.is_valid());
    }

    #[test]
    fn test_range_walk() {
        let keys = split_keys();
        let fst = split_fst();

        let (mut begin, end) = fst.lookup_range(&keys[5], true, &keys[9], false);
        let mut seen = Vec::new();
        while begin != end {
            seen.push(begin.value());
            begin.next();
        }
        assert_eq!(seen, alloc::vec![5, 6, 7, 8]);

        let (mut begin, end) = fst.lookup_range(&keys[5], true, &keys[9], true);
        let mut seen = Vec::new();
        while begin != end {
            seen.push(begin.value());
            begin.next();
        }
        assert_eq!(seen, alloc::vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let keys = split_keys();
        let fst = split_fst();
        let (begin, end) = fst.lookup_range(&keys[50], false, &keys[3], false);
        assert!(!begin.is_valid());
        assert!(!end.is_valid());
        assert!(!(begin != end));
    }

    #[test]
    fn test_empty_trie() {
        let fst = Fst::new::<&[u8]>(&[], &[]).unwrap();
        assert!(fst.is_empty());
        assert_eq!(fst.lookup(b"anything"), None);
        assert!(!fst.move_to_first().is_valid());
        assert!(!fst.move_to_last().is_valid());
        assert!(!fst.move_to_key_greater_than(b"a", true).is_valid());

        let blob = fst.serialize();
        let aligned = crate::binary::AlignedBlob::copy_from(&blob);
        let view = Fst::from_bytes(aligned.as_bytes()).unwrap();
        assert!(view.is_empty());
    }

    #[test]
    fn test_single_key() {
        let fst = Fst::new(&[b"hello"], &[99]).unwrap();
        assert_eq!(fst.len(), 1);
        assert_eq!(fst.lookup(b"hello"), Some(99));
        assert_eq!(fst.lookup(b"hell"), None);
        assert_eq!(fst.lookup(b"hello!"), None);

        let mut iter = fst.move_to_first();
        assert_eq!((iter.key(), iter.value()), (b"hello".to_vec(), 99));
        assert!(!iter.next());
    }

    #[test]
    fn test_serialize_roundtrip_with_boundary() {
        let keys = split_keys();
        let fst = split_fst();
        let blob = fst.serialize();
        let aligned = crate::binary::AlignedBlob::copy_from(&blob);
        let view = Fst::from_bytes(aligned.as_bytes()).unwrap();

        assert_eq!(view.len(), fst.len());
        assert_eq!(view.sparse_start_level(), fst.sparse_start_level());
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(view.lookup(key), Some(i as u64));
        }
        let mut iter = view.move_to_first();
        for key in &keys {
            assert_eq!(iter.key(), *key);
            iter.next();
        }
        assert!(!iter.is_valid());
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let aligned = crate::binary::AlignedBlob::copy_from(&[0u8; 32]);
        assert!(matches!(
            Fst::from_bytes(aligned.as_bytes()),
            Err(FstError::DeserializeFormat { .. })
        ));
    }

    #[test]
    fn test_get_node_walk() {
        let fst = split_fst();
        let root = fst.get_node(0, 0);
        assert!(root.prefix.is_empty());
        assert_eq!(root.labels, alloc::vec![b'a', b'b', b'c', b'd']);
        assert!(root.slots.iter().all(|s| s & 3 == 3));

        // Follow 'b' down: the level-1 node fans out on 8 labels.
        let b_node = (root.slots[1] >> 2) as usize;
        let mid = fst.get_node(1, b_node);
        assert!(mid.prefix.is_empty());
        assert_eq!(mid.labels.len(), 8);

        // A leaf-level node holds the three terminal slots.
        let leaf_node = (mid.slots[0] >> 2) as usize;
        let leaf = fst.get_node(2, leaf_node);
        assert_eq!(leaf.labels, alloc::vec![b'x', b'y', b'z']);
        assert!(leaf.slots.iter().all(|s| s & 3 == 1));
    }

    #[test]
    fn test_u32_wrappers() {
        let keys: Vec<u32> = (0..100u32).map(|i| i * 7 + 3).collect();
        let values: Vec<u64> = (0..100u64).rev().collect();
        let fst = Fst::from_u32_keys(&keys, &values).unwrap();

        for (i, &k) in keys.iter().enumerate() {
            assert_eq!(fst.lookup_u32(k), Some(values[i]));
        }
        assert_eq!(fst.lookup_u32(4), None);

        // Big-endian transformation preserves integer order.
        let mut iter = fst.move_to_first();
        for &k in &keys {
            assert_eq!(iter.key(), k.to_be_bytes());
            iter.next();
        }
    }

    #[test]
    fn test_u64_wrappers() {
        let keys: Vec<u64> = (0..50u64).map(|i| i * 1_000_003).collect();
        let values: Vec<u64> = (0..50u64).collect();
        let fst = Fst::from_u64_keys(&keys, &values).unwrap();
        for (i, &k) in keys.iter().enumerate() {
            assert_eq!(fst.lookup_u64(k), Some(i as u64));
        }
        assert_eq!(fst.lookup_u64(17), None);
    }
}

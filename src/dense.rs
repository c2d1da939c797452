//! LOUDS-Dense: the upper trie section.
//!
//! Node `n` occupies the 256 slots `[256n, 256(n+1))`; the slot for label
//! byte `b` is `256n + b`. The label and child-indicator planes live in one
//! interleaved rank bitvector, and one prefix-key bit per node marks nodes
//! whose incoming path is itself a stored key.
//!
//! Child numbering is the inclusive child rank of the slot, which makes
//! node numbers contiguous across the dense/sparse boundary: the first
//! sparse node continues the sequence, so a child pointer crossing the
//! boundary needs no translation.
//!
//! Values are indexed by terminator encounters in bitmap order, with
//! prefix-key slots interleaved per node:
//! `rank_label(p) - rank_child(p) + rank_prefix(node(p)) - 1` for a
//! terminator slot, and everything before the node's window for its
//! prefix-key slot.

#[cfg(not(test))]
use alloc::vec::Vec;

use alloc::borrow::Cow;

use crate::binary::{Reader, Writer};
use crate::error::Result;
use crate::rank::{BitvectorRank, InterleavedBitvectorRank};
use crate::FANOUT;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of a dense point lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DenseLookup {
    /// The key terminates in the dense levels with this value.
    Found(u64),
    /// The key cannot be in the trie.
    NotPresent,
    /// The walk crossed the section boundary; continue in the sparse
    /// section at this node.
    ContinueInSparse(usize),
}

/// Outcome of a dense iterator operation.
///
/// The send-out node number travels inside the continuation variants, so
/// the hybrid driver is a plain match instead of a completion-flag
/// protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DenseStep {
    /// The iterator rests on a key inside the dense levels.
    Done,
    /// The greater-than walk crossed the boundary while still matching the
    /// probe; the sparse section must continue the search at this node.
    ContinueGreaterThan(usize),
    /// A leftmost descent ran off the dense bottom; the sparse section
    /// must descend to the leftmost leaf of this node.
    ContinueLeftmost(usize),
    /// Mirror of `ContinueLeftmost` for rightmost descent.
    ContinueRightmost(usize),
    /// The iterator ran off the trie.
    Invalid,
}

/// The dense trie section.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub(crate) struct LoudsDense<'a> {
    height: usize,
    bitmaps: InterleavedBitvectorRank<'a>,
    prefixkey_bits: BitvectorRank<'a>,
    values: Cow<'a, [u64]>,
}

impl<'a> LoudsDense<'a> {
    pub(crate) fn from_parts(
        height: usize,
        bitmaps: InterleavedBitvectorRank<'a>,
        prefixkey_bits: BitvectorRank<'a>,
        values: Cow<'a, [u64]>,
    ) -> Self {
        LoudsDense {
            height,
            bitmaps,
            prefixkey_bits,
            values,
        }
    }

    /// Number of dense levels.
    #[inline]
    pub(crate) fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub(crate) fn num_values(&self) -> usize {
        self.values.len()
    }

    /// Walk the dense levels for `key`.
    pub(crate) fn lookup_key(&self, key: &[u8]) -> DenseLookup {
        let mut node = 0usize;
        for level in 0..self.height {
            if level >= key.len() {
                // The probe ends at this node: it is stored iff the node
                // carries the prefix-key bit.
                if self.prefixkey_bits.read_bit(node) {
                    return DenseLookup::Found(self.values[self.prefix_value_index(node)]);
                }
                return DenseLookup::NotPresent;
            }
            let pos = node * FANOUT + key[level] as usize;
            if !self.bitmaps.read_label_bit(pos) {
                return DenseLookup::NotPresent;
            }
            if !self.bitmaps.read_child_bit(pos) {
                // The stored key is exactly the path walked so far; a probe
                // with bytes left over only extends it.
                if level + 1 == key.len() {
                    return DenseLookup::Found(self.values[self.terminator_value_index(pos)]);
                }
                return DenseLookup::NotPresent;
            }
            node = self.child_node_num(pos);
        }
        DenseLookup::ContinueInSparse(node)
    }

    /// Child node number of the edge at `pos`; contiguous across the
    /// dense/sparse boundary.
    #[inline]
    pub(crate) fn child_node_num(&self, pos: usize) -> usize {
        self.bitmaps.rank_child(pos)
    }

    /// Value index of the terminator slot at `pos`.
    fn terminator_value_index(&self, pos: usize) -> usize {
        let node = pos / FANOUT;
        self.bitmaps.rank_label(pos) - self.bitmaps.rank_child(pos)
            + self.prefixkey_bits.rank1(node)
            - 1
    }

    /// Value index of the prefix-key slot of `node`: every terminator and
    /// prefix-key slot strictly before the node's window.
    fn prefix_value_index(&self, node: usize) -> usize {
        if node == 0 {
            return 0;
        }
        let before = node * FANOUT - 1;
        self.bitmaps.rank_label(before) - self.bitmaps.rank_child(before)
            + self.prefixkey_bits.rank1(node - 1)
    }

    /// First set label position at or after `base`.
    fn next_label_pos_from(&self, base: usize) -> usize {
        if self.bitmaps.read_label_bit(base) {
            base
        } else {
            base + self.bitmaps.distance_to_next_label_bit(base)
        }
    }

    /// Single-branch compaction step: if `node` has exactly one label and
    /// that label continues, yield it and the child node.
    pub(crate) fn compact_single_branch(&self, node: usize) -> Option<(u8, usize)> {
        let (count, first) = self.bitmaps.num_set_bits_in_dense_node(node);
        if count != 1 {
            return None;
        }
        let pos = node * FANOUT + first as usize;
        if !self.bitmaps.read_child_bit(pos) {
            return None;
        }
        Some((first, self.child_node_num(pos)))
    }

    /// Enumerate a node's labels, packing each slot as a tagged word:
    /// `(value << 2) | 1` for a terminator, `(child << 2) | 3` for a child
    /// pointer.
    pub(crate) fn node_entries(&self, node: usize) -> (Vec<u8>, Vec<u64>) {
        let base = node * FANOUT;
        let mut labels = Vec::new();
        let mut slots = Vec::new();
        for b in 0..FANOUT {
            let pos = base + b;
            if !self.bitmaps.read_label_bit(pos) {
                continue;
            }
            labels.push(b as u8);
            if self.bitmaps.read_child_bit(pos) {
                slots.push(((self.child_node_num(pos) as u64) << 2) | 3);
            } else {
                slots.push((self.values[self.terminator_value_index(pos)] << 2) | 1);
            }
        }
        (labels, slots)
    }

    pub(crate) fn write_into(&self, w: &mut Writer) {
        w.put_u32(self.height as u32);
        w.put_u32(0);
        self.bitmaps.write_into(w);
        self.prefixkey_bits.write_into(w);
        w.put_u64(self.values.len() as u64);
        w.put_words(&self.values);
    }

    pub(crate) fn read_from(r: &mut Reader<'a>) -> Result<Self> {
        let height = r.u32()? as usize;
        let _pad = r.u32()?;
        let bitmaps = InterleavedBitvectorRank::read_from(r)?;
        let prefixkey_bits = BitvectorRank::read_from(r)?;
        let num_values = r.u64()? as usize;
        let values = r.words(num_values)?;
        Ok(LoudsDense {
            height,
            bitmaps,
            prefixkey_bits,
            values: Cow::Borrowed(values),
        })
    }
}

/// Stateful cursor over the dense levels.
///
/// Holds one `(label, position)` pair per level plus a lazily maintained
/// value-index cache: the first value visit at a level pays the rank, and
/// later forward visits at that level just increment, because forward
/// traversal encounters a level's values consecutively. Backward visits
/// re-rank, which keeps mixed-direction traversal exact and re-seeds the
/// cache for subsequent forward steps.
#[derive(Clone, Debug)]
pub(crate) struct DenseIter<'t> {
    trie: &'t LoudsDense<'t>,
    key: Vec<u8>,
    pos_in_trie: Vec<usize>,
    value_pos: Vec<usize>,
    value_pos_valid: Vec<bool>,
    depth: usize,
    at_prefix_key: bool,
}

impl<'t> DenseIter<'t> {
    pub(crate) fn new(trie: &'t LoudsDense<'t>) -> Self {
        let h = trie.height();
        DenseIter {
            trie,
            key: alloc::vec![0; h],
            pos_in_trie: alloc::vec![0; h],
            value_pos: alloc::vec![0; h],
            value_pos_valid: alloc::vec![false; h],
            depth: 0,
            at_prefix_key: false,
        }
    }

    /// Key bytes of the current position (prefix-key marker excluded).
    pub(crate) fn key_bytes(&self) -> &[u8] {
        &self.key[..self.depth - self.at_prefix_key as usize]
    }

    /// The value under the cursor; only meaningful after a `Done` step.
    pub(crate) fn value(&self) -> u64 {
        self.trie.values[self.value_pos[self.depth - 1]]
    }

    /// Trie position of the deepest recorded level, for iterator equality.
    pub(crate) fn last_pos(&self) -> usize {
        self.pos_in_trie[self.depth - 1]
    }

    pub(crate) fn at_prefix_key(&self) -> bool {
        self.at_prefix_key
    }

    fn append(&mut self, pos: usize) {
        debug_assert!(self.depth < self.key.len());
        self.key[self.depth] = (pos % FANOUT) as u8;
        self.pos_in_trie[self.depth] = pos;
        self.depth += 1;
    }

    fn set(&mut self, level: usize, pos: usize) {
        self.key[level] = (pos % FANOUT) as u8;
        self.pos_in_trie[level] = pos;
    }

    /// Forward value visit at the current depth: increment the cached
    /// index, or seed it with the terminator rank on first use.
    fn visit_value_fwd_terminator(&mut self, pos: usize) {
        let level = self.depth - 1;
        if self.value_pos_valid[level] {
            self.value_pos[level] += 1;
        } else {
            self.value_pos[level] = self.trie.terminator_value_index(pos);
            self.value_pos_valid[level] = true;
        }
    }

    /// Forward value visit for the prefix key of `node`.
    fn visit_value_fwd_prefix(&mut self, node: usize) {
        let level = self.depth - 1;
        if self.value_pos_valid[level] {
            self.value_pos[level] += 1;
        } else {
            self.value_pos[level] = self.trie.prefix_value_index(node);
            self.value_pos_valid[level] = true;
        }
    }

    /// Backward visits re-rank unconditionally.
    fn visit_value_bwd_terminator(&mut self, pos: usize) {
        let level = self.depth - 1;
        self.value_pos[level] = self.trie.terminator_value_index(pos);
        self.value_pos_valid[level] = true;
    }

    fn visit_value_bwd_prefix(&mut self, node: usize) {
        let level = self.depth - 1;
        self.value_pos[level] = self.trie.prefix_value_index(node);
        self.value_pos_valid[level] = true;
    }

    /// Position the cursor on the root's first label.
    pub(crate) fn set_to_first_label_in_root(&mut self) {
        debug_assert!(self.trie.height() > 0);
        self.append(self.trie.next_label_pos_from(0));
    }

    /// Position the cursor on the root's last label.
    pub(crate) fn set_to_last_label_in_root(&mut self) {
        debug_assert!(self.trie.height() > 0);
        let d = self
            .trie
            .bitmaps
            .distance_to_prev_label_bit(FANOUT)
            .expect("root node has at least one label");
        self.append(FANOUT - d);
    }

    /// Descend to the smallest key below the current position.
    pub(crate) fn move_to_leftmost_key(&mut self) -> DenseStep {
        debug_assert!(self.depth > 0);
        let mut level = self.depth - 1;
        let mut pos = self.pos_in_trie[level];
        if !self.trie.bitmaps.read_child_bit(pos) {
            self.visit_value_fwd_terminator(pos);
            return DenseStep::Done;
        }

        while level < self.trie.height() - 1 {
            let node = self.trie.child_node_num(pos);
            if self.trie.prefixkey_bits.read_bit(node) {
                // The path into the child node is itself the smallest key
                // below it.
                let first = self.trie.next_label_pos_from(node * FANOUT);
                self.append(first);
                self.at_prefix_key = true;
                self.visit_value_fwd_prefix(node);
                return DenseStep::Done;
            }
            pos = self.trie.next_label_pos_from(node * FANOUT);
            self.append(pos);
            if !self.trie.bitmaps.read_child_bit(pos) {
                self.visit_value_fwd_terminator(pos);
                return DenseStep::Done;
            }
            level += 1;
        }
        DenseStep::ContinueLeftmost(self.trie.child_node_num(pos))
    }

    /// Descend to the largest key below the current position.
    pub(crate) fn move_to_rightmost_key(&mut self) -> DenseStep {
        debug_assert!(self.depth > 0);
        let mut level = self.depth - 1;
        let mut pos = self.pos_in_trie[level];
        if !self.trie.bitmaps.read_child_bit(pos) {
            self.visit_value_bwd_terminator(pos);
            return DenseStep::Done;
        }

        while level < self.trie.height() - 1 {
            let node = self.trie.child_node_num(pos);
            let end = (node + 1) * FANOUT;
            pos = match self.trie.bitmaps.distance_to_prev_label_bit(end) {
                Some(d) if end - d >= node * FANOUT => end - d,
                _ => {
                    self.depth = 0;
                    return DenseStep::Invalid;
                }
            };
            self.append(pos);
            if !self.trie.bitmaps.read_child_bit(pos) {
                self.visit_value_bwd_terminator(pos);
                return DenseStep::Done;
            }
            level += 1;
        }
        DenseStep::ContinueRightmost(self.trie.child_node_num(pos))
    }

    /// Position the cursor on the smallest key `>= key` (or `> key` when
    /// not inclusive) within the dense levels.
    pub(crate) fn move_to_key_greater_than(&mut self, key: &[u8], inclusive: bool) -> DenseStep {
        let mut node = 0usize;
        for level in 0..self.trie.height() {
            let base = node * FANOUT;
            if level >= key.len() {
                // The probe ran out of bytes at this node. Its prefix key,
                // if present, equals the probe exactly; everything else
                // below is strictly greater.
                if self.trie.prefixkey_bits.read_bit(node) {
                    let first = self.trie.next_label_pos_from(base);
                    self.append(first);
                    self.at_prefix_key = true;
                    self.visit_value_fwd_prefix(node);
                    if !inclusive {
                        return self.next();
                    }
                    return DenseStep::Done;
                }
                let pos = self.trie.next_label_pos_from(base);
                self.append(pos);
                return self.move_to_leftmost_key();
            }

            let pos = base + key[level] as usize;
            self.append(pos);
            if !self.trie.bitmaps.read_label_bit(pos) {
                // No exact branch: advance from the recorded miss position.
                return self.next();
            }
            if !self.trie.bitmaps.read_child_bit(pos) {
                // The stored key equals the probe bytes walked so far.
                self.visit_value_fwd_terminator(pos);
                if level + 1 == key.len() && inclusive {
                    return DenseStep::Done;
                }
                // Either a shorter stored key (< probe) or an exclusive
                // exact match: move past it.
                return self.next();
            }
            node = self.trie.child_node_num(pos);
        }
        DenseStep::ContinueGreaterThan(node)
    }

    /// Advance to the next key in order.
    pub(crate) fn next(&mut self) -> DenseStep {
        debug_assert!(self.depth > 0);
        if self.at_prefix_key {
            self.at_prefix_key = false;
            return self.move_to_leftmost_key();
        }
        let mut pos = self.pos_in_trie[self.depth - 1];
        loop {
            let next_pos = pos + self.trie.bitmaps.distance_to_next_label_bit(pos);
            if next_pos < self.trie.bitmaps.num_bits() && next_pos / FANOUT == pos / FANOUT {
                self.set(self.depth - 1, next_pos);
                return self.move_to_leftmost_key();
            }
            // Crossed the node boundary: climb out of this level.
            self.depth -= 1;
            if self.depth == 0 {
                return DenseStep::Invalid;
            }
            pos = self.pos_in_trie[self.depth - 1];
        }
    }

    /// Step back to the previous key in order.
    pub(crate) fn prev(&mut self) -> DenseStep {
        debug_assert!(self.depth > 0);
        if self.at_prefix_key {
            self.at_prefix_key = false;
            self.depth -= 1;
            if self.depth == 0 {
                return DenseStep::Invalid;
            }
        }
        let mut pos = self.pos_in_trie[self.depth - 1];
        loop {
            match self.trie.bitmaps.distance_to_prev_label_bit(pos) {
                Some(d) if (pos - d) / FANOUT == pos / FANOUT => {
                    self.set(self.depth - 1, pos - d);
                    return self.move_to_rightmost_key();
                }
                _ => {
                    // Leaving the node backward: its prefix key, if any,
                    // is the immediately preceding key.
                    let node = pos / FANOUT;
                    if self.trie.prefixkey_bits.read_bit(node) {
                        self.at_prefix_key = true;
                        self.visit_value_bwd_prefix(node);
                        return DenseStep::Done;
                    }
                    self.depth -= 1;
                    if self.depth == 0 {
                        return DenseStep::Invalid;
                    }
                    pos = self.pos_in_trie[self.depth - 1];
                }
            }
        }
    }
}

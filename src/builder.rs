//! Build-time ingestion of sorted key/value pairs.
//!
//! The builder walks adjacent keys, emitting one item per key byte into
//! per-level scratch arrays: a label byte, a has-child bit, and a LOUDS
//! node-boundary bit. A key that is a proper prefix of its successor
//! terminates with an extra in-band terminator item one level below its
//! last byte. Values are collected per level in item order, which is
//! exactly the order the rank arithmetic of the finished sections expects.
//!
//! After ingestion the builder picks the sparse start level from the
//! sparse/dense size ratio, converts the levels above it into 256-slot
//! bitmaps, and hands both sections their final arrays.

#[cfg(not(test))]
use alloc::vec::Vec;

use alloc::borrow::Cow;

use crate::bitvec::{BitsWriter, Bitvector};
use crate::dense::LoudsDense;
use crate::error::{FstError, Result};
use crate::labels::LabelVector;
use crate::rank::{BitvectorRank, InterleavedBitvectorRank};
use crate::select::BitvectorSelect;
use crate::sparse::LoudsSparse;
use crate::{DENSE_RANK_BLOCK, FANOUT, SELECT_SAMPLE_INTERVAL, SPARSE_RANK_BLOCK, TERMINATOR};

pub(crate) struct Builder {
    include_dense: bool,
    sparse_dense_ratio: u32,

    // Per-level scratch arrays, one item per trie slot.
    labels: Vec<Vec<u8>>,
    child_indicator_bits: Vec<BitsWriter>,
    louds_bits: Vec<BitsWriter>,
    values: Vec<Vec<u64>>,
    node_counts: Vec<usize>,
    is_last_item_terminator: Vec<bool>,

    // Dense conversion output for levels below the cutoff.
    bitmap_labels: Vec<BitsWriter>,
    bitmap_child_indicator_bits: Vec<BitsWriter>,
    prefixkey_indicator_bits: Vec<BitsWriter>,

    sparse_start_level: usize,
}

impl Builder {
    pub(crate) fn new(include_dense: bool, sparse_dense_ratio: u32) -> Self {
        Builder {
            include_dense,
            sparse_dense_ratio,
            labels: Vec::new(),
            child_indicator_bits: Vec::new(),
            louds_bits: Vec::new(),
            values: Vec::new(),
            node_counts: Vec::new(),
            is_last_item_terminator: Vec::new(),
            bitmap_labels: Vec::new(),
            bitmap_child_indicator_bits: Vec::new(),
            prefixkey_indicator_bits: Vec::new(),
            sparse_start_level: 0,
        }
    }

    /// Ingest the sorted key/value pairs and fix the dense/sparse split.
    pub(crate) fn build<K: AsRef<[u8]>>(&mut self, keys: &[K], values: &[u64]) -> Result<()> {
        if keys.len() != values.len() {
            return Err(FstError::ValueCountMismatch {
                keys: keys.len(),
                values: values.len(),
            });
        }
        for (i, key) in keys.iter().enumerate() {
            if key.as_ref().is_empty() {
                return Err(FstError::EmptyKey { index: i });
            }
            if i > 0 && keys[i - 1].as_ref() >= key.as_ref() {
                return Err(FstError::DuplicateOrUnsortedKey { index: i });
            }
        }

        for i in 0..keys.len() {
            let key = keys[i].as_ref();
            let next = if i + 1 < keys.len() {
                keys[i + 1].as_ref()
            } else {
                &[]
            };
            let term_level = self.insert_key(key, next);
            self.values[term_level].push(values[i]);
        }

        self.determine_cutoff_level();
        self.build_dense();
        Ok(())
    }

    /// Number of levels seen so far.
    pub(crate) fn height(&self) -> usize {
        self.labels.len()
    }

    fn num_items(&self, level: usize) -> usize {
        self.labels[level].len()
    }

    fn is_level_empty(&self, level: usize) -> bool {
        level >= self.height() || self.labels[level].is_empty()
    }

    fn add_level(&mut self) {
        self.labels.push(Vec::new());
        self.child_indicator_bits.push(BitsWriter::new());
        self.louds_bits.push(BitsWriter::new());
        self.values.push(Vec::new());
        self.node_counts.push(0);
        self.is_last_item_terminator.push(false);
    }

    /// Insert one key, returning the level of its terminating item.
    fn insert_key(&mut self, key: &[u8], next: &[u8]) -> usize {
        let mut level = self.skip_common_prefix(key);
        debug_assert!(level < key.len(), "key duplicates the previous trie path");

        // The first byte after the shared path joins the previous key's
        // node at this level; every byte below it opens a fresh subtree.
        let mut is_start_of_node = self.is_level_empty(level);
        while level < key.len() {
            self.insert_key_byte(key[level], level, is_start_of_node, false);
            level += 1;
            is_start_of_node = true;
        }

        if next.len() > key.len() && &next[..key.len()] == key {
            // The key is a proper prefix of its successor: it terminates
            // with the in-band terminator, opening the node the successor
            // continues into.
            self.insert_key_byte(TERMINATOR, level, true, true);
            level
        } else {
            level - 1
        }
    }

    /// Walk the prefix shared with the previous key, marking the shared
    /// items as having children.
    fn skip_common_prefix(&mut self, key: &[u8]) -> usize {
        let mut level = 0;
        while level < key.len() && self.is_char_common_prefix(key[level], level) {
            let last = self.num_items(level) - 1;
            self.child_indicator_bits[level].set(last);
            level += 1;
        }
        level
    }

    fn is_char_common_prefix(&self, c: u8, level: usize) -> bool {
        level < self.height()
            && !self.is_last_item_terminator[level]
            && self.labels[level].last() == Some(&c)
    }

    fn insert_key_byte(&mut self, c: u8, level: usize, is_start_of_node: bool, is_term: bool) {
        while level >= self.height() {
            self.add_level();
        }
        // The parent's most recent item gains a child.
        if level > 0 {
            let parent_last = self.num_items(level - 1) - 1;
            self.child_indicator_bits[level - 1].set(parent_last);
        }
        self.labels[level].push(c);
        self.child_indicator_bits[level].push(false);
        self.louds_bits[level].push(is_start_of_node);
        if is_start_of_node {
            self.node_counts[level] += 1;
        }
        self.is_last_item_terminator[level] = is_term;
    }

    /// Accumulated dense encoding size (bits) of levels `[0, downto)`.
    fn dense_size_upto(&self, downto: usize) -> u64 {
        let mut bits = 0u64;
        for level in 0..downto {
            // Two 256-slot bitmaps plus one prefix-key bit per node.
            bits += (2 * FANOUT as u64 + 1) * self.node_counts[level] as u64;
        }
        bits
    }

    /// Accumulated sparse encoding size (bits) of levels `[from, height)`.
    fn sparse_size_from(&self, from: usize) -> u64 {
        let mut bits = 0u64;
        for level in from..self.height() {
            // Label byte plus has-child and LOUDS bits per item.
            bits += 10 * self.num_items(level) as u64;
        }
        bits
    }

    /// Grow the dense section while its accumulated size times the ratio
    /// stays below the size of the remaining sparse levels.
    fn determine_cutoff_level(&mut self) {
        if !self.include_dense {
            self.sparse_start_level = 0;
            return;
        }
        let ratio = self.sparse_dense_ratio as u64;
        let mut cutoff = 0;
        while cutoff < self.height()
            && self.dense_size_upto(cutoff) * ratio < self.sparse_size_from(cutoff)
        {
            cutoff += 1;
        }
        self.sparse_start_level = cutoff;
    }

    /// Convert the levels below the cutoff into 256-slot bitmaps.
    fn build_dense(&mut self) {
        for level in 0..self.sparse_start_level {
            let nodes = self.node_counts[level];
            let mut label_bitmap = BitsWriter::with_len(nodes * FANOUT);
            let mut child_bitmap = BitsWriter::with_len(nodes * FANOUT);
            let mut prefix_bits = BitsWriter::with_len(nodes);

            let mut node_num = 0usize;
            for pos in 0..self.num_items(level) {
                if pos > 0 && self.louds_bits[level].get(pos) {
                    node_num += 1;
                }
                if self.is_terminator_item(level, pos) {
                    prefix_bits.set(node_num);
                    continue;
                }
                let slot = node_num * FANOUT + self.labels[level][pos] as usize;
                label_bitmap.set(slot);
                if self.child_indicator_bits[level].get(pos) {
                    child_bitmap.set(slot);
                }
            }

            self.bitmap_labels.push(label_bitmap);
            self.bitmap_child_indicator_bits.push(child_bitmap);
            self.prefixkey_indicator_bits.push(prefix_bits);
        }
    }

    /// An item is a prefix-key terminator when it carries the terminator
    /// label and no child. A genuine `0x00` key byte in that position is
    /// indistinguishable; see the input contract on [`crate::Fst::new`].
    fn is_terminator_item(&self, level: usize, pos: usize) -> bool {
        self.labels[level][pos] == TERMINATOR && !self.child_indicator_bits[level].get(pos)
    }

    /// Assemble the two finished sections, consuming the builder.
    pub(crate) fn finish(mut self) -> (LoudsDense<'static>, LoudsSparse<'static>) {
        let hd = self.sparse_start_level;
        let h = self.height();

        let label_bv = Bitvector::from_levels(&self.bitmap_labels);
        let child_bv = Bitvector::from_levels(&self.bitmap_child_indicator_bits);
        let bitmaps = InterleavedBitvectorRank::interleave(&label_bv, &child_bv, DENSE_RANK_BLOCK);
        let prefixkey = BitvectorRank::new(
            Bitvector::from_levels(&self.prefixkey_indicator_bits),
            DENSE_RANK_BLOCK,
        );
        let dense_values: Vec<u64> = self.values[..hd].concat();
        let dense = LoudsDense::from_parts(hd, bitmaps, prefixkey, Cow::Owned(dense_values));

        let node_count_dense: usize = self.node_counts[..hd].iter().sum();
        let child_count_dense = if hd == 0 {
            0
        } else if hd < h {
            node_count_dense + self.node_counts[hd] - 1
        } else {
            // Fully dense trie: the sparse section is empty and never
            // entered, only the totals matter for serialization.
            self.node_counts.iter().sum::<usize>().saturating_sub(1)
        };

        let labels = LabelVector::from_levels(&self.labels[hd..]);
        let child = BitvectorRank::new(
            Bitvector::from_levels(&self.child_indicator_bits[hd..]),
            SPARSE_RANK_BLOCK,
        );
        let louds = BitvectorSelect::new(
            Bitvector::from_levels(&self.louds_bits[hd..]),
            SELECT_SAMPLE_INTERVAL,
        );
        let sparse_values: Vec<u64> = self.values.split_off(hd).concat();
        let sparse = LoudsSparse::from_parts(
            h,
            hd,
            node_count_dense,
            child_count_dense,
            labels,
            child,
            louds,
            Cow::Owned(sparse_values),
        );

        (dense, sparse)
    }
}

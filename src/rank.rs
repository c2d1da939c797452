//! Bitvectors with O(1) rank through basic-block lookup tables.
//!
//! [`BitvectorRank`] pairs a [`Bitvector`] with one precomputed cumulative
//! popcount per basic block. [`InterleavedBitvectorRank`] fuses two
//! equal-length bitvectors (the dense section's label and child-indicator
//! planes) into a single word array whose even words hold the label plane
//! and odd words the child plane, with a likewise paired lookup table. A
//! dense-node probe needs both bits at the same position, so interleaving
//! puts them on the same cache line.
//!
//! Rank here is inclusive, the convention of the trie arithmetic:
//! `rank1(p)` counts the set bits in positions `[0, p]`.

#[cfg(not(test))]
use alloc::vec::Vec;

use alloc::borrow::Cow;

use crate::binary::{Reader, Writer};
use crate::bitvec::Bitvector;
use crate::error::{FstError, Result};
use crate::popcount::{popcount_linear, popcount_linear_interleaved, popcount_word};
use crate::FANOUT;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Build one rank lookup table: entry `i` is the popcount of `[0, i * block)`.
///
/// There are `ceil(num_bits / block) + 1` entries, so the final entry holds
/// the total popcount.
fn build_rank_lut(words: &[u64], num_bits: usize, block: u32) -> Vec<u32> {
    let block = block as usize;
    let words_per_block = block / 64;
    let num_entries = num_bits.div_ceil(block) + 1;
    let mut lut = Vec::with_capacity(num_entries);

    let mut cumulative = 0u32;
    for i in 0..num_entries {
        lut.push(cumulative);
        let start = i * words_per_block;
        if start < words.len() {
            let end = (start + words_per_block).min(words.len());
            for &w in &words[start..end] {
                cumulative += popcount_word(w);
            }
        }
    }
    lut
}

/// A packed bitvector with O(1) inclusive rank.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BitvectorRank<'a> {
    bv: Bitvector<'a>,
    basic_block_size: u32,
    rank_lut: Cow<'a, [u32]>,
}

impl<'a> BitvectorRank<'a> {
    /// Build the rank directory over a bitvector.
    pub fn new(bv: Bitvector<'a>, basic_block_size: u32) -> Self {
        debug_assert!(basic_block_size >= 64 && basic_block_size % 64 == 0);
        let lut = build_rank_lut(bv.words(), bv.num_bits(), basic_block_size);
        BitvectorRank {
            bv,
            basic_block_size,
            rank_lut: Cow::Owned(lut),
        }
    }

    /// Number of bits in the underlying bitvector.
    #[inline]
    pub fn num_bits(&self) -> usize {
        self.bv.num_bits()
    }

    /// The underlying bitvector.
    #[inline]
    pub fn bitvector(&self) -> &Bitvector<'a> {
        &self.bv
    }

    /// Read the bit at `pos`.
    #[inline]
    pub fn read_bit(&self, pos: usize) -> bool {
        self.bv.read_bit(pos)
    }

    /// Number of set bits in positions `[0, pos]` (inclusive).
    #[inline]
    pub fn rank1(&self, pos: usize) -> usize {
        debug_assert!(pos < self.num_bits());
        let block = self.basic_block_size as usize;
        let block_idx = pos / block;
        let offset = pos % block;
        self.rank_lut[block_idx] as usize
            + popcount_linear(self.bv.words(), block_idx * (block / 64), offset + 1) as usize
    }

    /// Total number of set bits.
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.rank_lut[self.rank_lut.len() - 1] as usize
    }

    pub(crate) fn write_into(&self, w: &mut Writer) {
        w.put_u32(self.bv.num_bits() as u32);
        w.put_u32(self.basic_block_size);
        w.put_words(self.bv.words());
        w.put_u32s(&self.rank_lut);
        w.pad8();
    }

    pub(crate) fn read_from(r: &mut Reader<'a>) -> Result<Self> {
        let num_bits = r.u32()? as usize;
        let basic_block_size = r.u32()?;
        if basic_block_size < 64 || basic_block_size % 64 != 0 {
            return Err(FstError::DeserializeFormat {
                context: "bad rank basic block size",
            });
        }
        let words = r.words(num_bits.div_ceil(64))?;
        let lut = r.u32s(num_bits.div_ceil(basic_block_size as usize) + 1)?;
        r.pad8()?;
        Ok(BitvectorRank {
            bv: Bitvector::from_parts(Cow::Borrowed(words), num_bits),
            basic_block_size,
            rank_lut: Cow::Borrowed(lut),
        })
    }
}

/// Two equal-length rank bitvectors stored with interleaved words.
///
/// Word `2i` holds label word `i`, word `2i + 1` holds child word `i`; the
/// rank lookup table alternates the same way. Positions are logical plane
/// positions, so `read_label_bit(p)` and `read_child_bit(p)` address the
/// same dense slot.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InterleavedBitvectorRank<'a> {
    num_bits: usize,
    basic_block_size: u32,
    words: Cow<'a, [u64]>,
    rank_lut: Cow<'a, [u32]>,
}

impl<'a> InterleavedBitvectorRank<'a> {
    /// Interleave a label and a child bitvector of equal length.
    pub fn interleave(
        labels: &Bitvector<'_>,
        children: &Bitvector<'_>,
        basic_block_size: u32,
    ) -> InterleavedBitvectorRank<'static> {
        assert_eq!(labels.num_bits(), children.num_bits());
        debug_assert!(basic_block_size >= 64 && basic_block_size % 64 == 0);

        let num_words = labels.num_words();
        let mut words = Vec::with_capacity(num_words * 2);
        for i in 0..num_words {
            words.push(labels.word(i));
            words.push(children.word(i));
        }

        let num_bits = labels.num_bits();
        let block = basic_block_size as usize;
        let words_per_block = block / 64;
        let num_entries = num_bits.div_ceil(block) + 1;
        let mut lut = Vec::with_capacity(num_entries * 2);

        let mut cum_label = 0u32;
        let mut cum_child = 0u32;
        for i in 0..num_entries {
            lut.push(cum_label);
            lut.push(cum_child);
            let start = i * words_per_block;
            if start < num_words {
                let end = (start + words_per_block).min(num_words);
                for j in start..end {
                    cum_label += popcount_word(words[2 * j]);
                    cum_child += popcount_word(words[2 * j + 1]);
                }
            }
        }

        InterleavedBitvectorRank {
            num_bits,
            basic_block_size,
            words: Cow::Owned(words),
            rank_lut: Cow::Owned(lut),
        }
    }

    /// Number of logical bits per plane.
    #[inline]
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// The interleaved word array.
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Read the label-plane bit at `pos`.
    #[inline]
    pub fn read_label_bit(&self, pos: usize) -> bool {
        debug_assert!(pos < self.num_bits);
        self.words[(pos / 64) * 2] & (1u64 << (63 - (pos % 64))) != 0
    }

    /// Read the child-plane bit at `pos`.
    #[inline]
    pub fn read_child_bit(&self, pos: usize) -> bool {
        debug_assert!(pos < self.num_bits);
        self.words[(pos / 64) * 2 + 1] & (1u64 << (63 - (pos % 64))) != 0
    }

    /// Inclusive rank over the label plane.
    #[inline]
    pub fn rank_label(&self, pos: usize) -> usize {
        self.rank_plane(pos, 0)
    }

    /// Inclusive rank over the child plane.
    #[inline]
    pub fn rank_child(&self, pos: usize) -> usize {
        self.rank_plane(pos, 1)
    }

    #[inline]
    fn rank_plane(&self, pos: usize, plane: usize) -> usize {
        debug_assert!(pos < self.num_bits);
        let block = self.basic_block_size as usize;
        let block_idx = pos / block;
        let offset = pos % block;
        self.rank_lut[block_idx * 2 + plane] as usize
            + popcount_linear_interleaved(&self.words, block_idx * (block / 64), plane, offset + 1)
                as usize
    }

    /// Distance from `pos` to the next set label bit strictly after it.
    ///
    /// If no later label bit is set, the returned distance lands one past
    /// the end.
    pub fn distance_to_next_label_bit(&self, pos: usize) -> usize {
        debug_assert!(pos < self.num_bits);
        let start = pos + 1;
        if start >= self.num_bits {
            return self.num_bits - pos;
        }

        let mut word_idx = start / 64;
        let offset = start % 64;
        let num_plane_words = self.words.len() / 2;

        let first = self.words[word_idx * 2] << offset;
        if first != 0 {
            return start + first.leading_zeros() as usize - pos;
        }
        loop {
            word_idx += 1;
            if word_idx >= num_plane_words {
                return self.num_bits - pos;
            }
            let w = self.words[word_idx * 2];
            if w != 0 {
                return word_idx * 64 + w.leading_zeros() as usize - pos;
            }
        }
    }

    /// Distance from `pos` back to the nearest set label bit strictly
    /// before it, or `None` if no label bit below `pos` is set.
    pub fn distance_to_prev_label_bit(&self, pos: usize) -> Option<usize> {
        debug_assert!(pos <= self.num_bits);
        if pos == 0 {
            return None;
        }
        let last = pos - 1;
        let mut word_idx = last / 64;
        let offset = last % 64;

        let first = self.words[word_idx * 2] >> (63 - offset);
        if first != 0 {
            let q = word_idx * 64 + offset - first.trailing_zeros() as usize;
            return Some(pos - q);
        }
        while word_idx > 0 {
            word_idx -= 1;
            let w = self.words[word_idx * 2];
            if w != 0 {
                let q = word_idx * 64 + 63 - w.trailing_zeros() as usize;
                return Some(pos - q);
            }
        }
        None
    }

    /// Count the set label bits in the 256-slot window of `node`, reporting
    /// the first set label byte.
    ///
    /// The reported label is meaningful only when the count is non-zero.
    pub fn num_set_bits_in_dense_node(&self, node: usize) -> (u32, u8) {
        let word_base = node * (FANOUT / 64);
        let mut count = 0u32;
        let mut first_label = 0u8;
        let mut seen = false;

        for i in 0..FANOUT / 64 {
            let w = self.words[(word_base + i) * 2];
            if w != 0 && !seen {
                first_label = (i * 64 + w.leading_zeros() as usize) as u8;
                seen = true;
            }
            count += popcount_word(w);
        }
        (count, first_label)
    }

    pub(crate) fn write_into(&self, w: &mut Writer) {
        w.put_u32(self.num_bits as u32);
        w.put_u32(self.basic_block_size);
        w.put_words(&self.words);
        w.put_u32s(&self.rank_lut);
        w.pad8();
    }

    pub(crate) fn read_from(r: &mut Reader<'a>) -> Result<Self> {
        let num_bits = r.u32()? as usize;
        let basic_block_size = r.u32()?;
        if basic_block_size < 64 || basic_block_size % 64 != 0 {
            return Err(FstError::DeserializeFormat {
                context: "bad interleaved basic block size",
            });
        }
        let words = r.words(num_bits.div_ceil(64) * 2)?;
        let lut = r.u32s((num_bits.div_ceil(basic_block_size as usize) + 1) * 2)?;
        r.pad8()?;
        Ok(InterleavedBitvectorRank {
            num_bits,
            basic_block_size,
            words: Cow::Borrowed(words),
            rank_lut: Cow::Borrowed(lut),
        })
    }
}

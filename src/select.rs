//! Bitvector with sampled select-1.
//!
//! The LOUDS bits of the sparse section are navigated by select: the first
//! position of node `n` is the position of the `(n + 1)`-th set bit. The
//! index stores the position of every `interval`-th set bit plus the first
//! one, giving an O(1) jump followed by a short word scan.

#[cfg(not(test))]
use alloc::vec::Vec;

use alloc::borrow::Cow;

use crate::binary::{Reader, Writer};
use crate::bitvec::Bitvector;
use crate::broadword::select_in_word_msb;
use crate::error::Result;
use crate::popcount::popcount_word;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A packed bitvector with sampled select-1 support.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BitvectorSelect<'a> {
    bv: Bitvector<'a>,
    sample_interval: u32,
    num_ones: u32,
    select_lut: Cow<'a, [u32]>,
}

impl<'a> BitvectorSelect<'a> {
    /// Build the select index over a bitvector.
    pub fn new(bv: Bitvector<'a>, sample_interval: u32) -> Self {
        debug_assert!(sample_interval > 0);
        let words = bv.words();
        let mut lut: Vec<u32> = Vec::new();
        let mut num_ones = 0u32;
        let mut next_sample = sample_interval;

        for (word_idx, &w) in words.iter().enumerate() {
            let ones = popcount_word(w);
            if lut.is_empty() && ones > 0 {
                // Entry 0 is the position of the very first set bit.
                lut.push((word_idx * 64) as u32 + select_in_word_msb(w, 0));
            }
            while ones > 0 && next_sample <= num_ones + ones {
                let within = next_sample - num_ones;
                lut.push((word_idx * 64) as u32 + select_in_word_msb(w, within - 1));
                next_sample += sample_interval;
            }
            num_ones += ones;
        }

        BitvectorSelect {
            bv,
            sample_interval,
            num_ones,
            select_lut: Cow::Owned(lut),
        }
    }

    /// Number of bits in the underlying bitvector.
    #[inline]
    pub fn num_bits(&self) -> usize {
        self.bv.num_bits()
    }

    /// Total number of set bits.
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.num_ones as usize
    }

    /// Read the bit at `pos`.
    #[inline]
    pub fn read_bit(&self, pos: usize) -> bool {
        self.bv.read_bit(pos)
    }

    /// Distance from `pos` to the next set bit strictly after it; lands one
    /// past the end when no later bit is set.
    #[inline]
    pub fn distance_to_next_set_bit(&self, pos: usize) -> usize {
        self.bv.distance_to_next_set_bit(pos)
    }

    /// Position of the `rank`-th set bit, 1-based.
    ///
    /// `rank` must be in `[1, count_ones()]`; anything else is a contract
    /// violation.
    pub fn select1(&self, rank: usize) -> usize {
        debug_assert!(rank >= 1 && rank <= self.num_ones as usize);
        let interval = self.sample_interval as usize;
        let lut_idx = rank / interval;
        let mut remaining = rank % interval;
        if lut_idx == 0 {
            // Entry 0 holds the first set bit (rank 1), not rank 0.
            remaining -= 1;
        }

        let sampled = self.select_lut[lut_idx] as usize;
        if remaining == 0 {
            return sampled;
        }

        // Scan forward from the sampled position.
        let words = self.bv.words();
        let start = sampled + 1;
        let mut word_idx = start / 64;
        let mut w = words[word_idx] & (u64::MAX >> (start % 64));
        loop {
            let ones = popcount_word(w) as usize;
            if ones >= remaining {
                return word_idx * 64 + select_in_word_msb(w, (remaining - 1) as u32) as usize;
            }
            remaining -= ones;
            word_idx += 1;
            w = words[word_idx];
        }
    }

    pub(crate) fn write_into(&self, w: &mut Writer) {
        w.put_u32(self.bv.num_bits() as u32);
        w.put_u32(self.sample_interval);
        w.put_u32(self.num_ones);
        w.put_u32(self.select_lut.len() as u32);
        w.put_words(self.bv.words());
        w.put_u32s(&self.select_lut);
        w.pad8();
    }

    pub(crate) fn read_from(r: &mut Reader<'a>) -> Result<Self> {
        let num_bits = r.u32()? as usize;
        let sample_interval = r.u32()?.max(1);
        let num_ones = r.u32()?;
        let num_samples = r.u32()? as usize;
        let words = r.words(num_bits.div_ceil(64))?;
        let lut = r.u32s(num_samples)?;
        r.pad8()?;
        Ok(BitvectorSelect {
            bv: Bitvector::from_parts(Cow::Borrowed(words), num_bits),
            sample_interval,
            num_ones,
            select_lut: Cow::Borrowed(lut),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitvec::BitsWriter;

    fn bv_with(set: &[usize], len: usize) -> Bitvector<'static> {
        let mut w = BitsWriter::with_len(len);
        for &p in set {
            w.set(p);
        }
        Bitvector::from_levels(core::slice::from_ref(&w))
    }

    fn naive_select(bv: &Bitvector<'_>, rank: usize) -> usize {
        let mut seen = 0;
        for p in 0..bv.num_bits() {
            if bv.read_bit(p) {
                seen += 1;
                if seen == rank {
                    return p;
                }
            }
        }
        panic!("rank {} out of range", rank);
    }

    #[test]
    fn test_select_simple() {
        let sel = BitvectorSelect::new(bv_with(&[0, 3, 9, 64, 65], 128), 64);
        assert_eq!(sel.count_ones(), 5);
        assert_eq!(sel.select1(1), 0);
        assert_eq!(sel.select1(2), 3);
        assert_eq!(sel.select1(3), 9);
        assert_eq!(sel.select1(4), 64);
        assert_eq!(sel.select1(5), 65);
    }

    #[test]
    fn test_select_first_bit_not_at_zero() {
        let sel = BitvectorSelect::new(bv_with(&[42, 100], 128), 64);
        assert_eq!(sel.select1(1), 42);
        assert_eq!(sel.select1(2), 100);
    }

    #[test]
    fn test_select_crosses_sample_boundaries() {
        // One set bit every 3 positions over several sample intervals.
        let positions: Vec<usize> = (0..500).map(|i| i * 3).collect();
        let sel = BitvectorSelect::new(bv_with(&positions, 1500), 64);

        for rank in 1..=500 {
            assert_eq!(
                sel.select1(rank),
                (rank - 1) * 3,
                "select1({}) mismatch",
                rank
            );
        }
    }

    #[test]
    fn test_select_matches_naive_on_dense_runs() {
        let positions: Vec<usize> = (0..300).filter(|i| i % 7 != 0).collect();
        let bv = bv_with(&positions, 300);
        let sel = BitvectorSelect::new(bv, 64);

        for rank in 1..=sel.count_ones() {
            assert_eq!(sel.select1(rank), naive_select(&bv_with(&positions, 300), rank));
        }
    }

    #[test]
    fn test_empty() {
        let sel = BitvectorSelect::new(bv_with(&[], 0), 64);
        assert_eq!(sel.count_ones(), 0);
        assert_eq!(sel.num_bits(), 0);
    }

    #[test]
    fn test_serialize_roundtrip() {
        use crate::binary::AlignedBlob;

        let positions: Vec<usize> = (0..200).map(|i| i * 5).collect();
        let sel = BitvectorSelect::new(bv_with(&positions, 1000), 64);

        let mut w = Writer::new();
        sel.write_into(&mut w);
        let blob = AlignedBlob::copy_from(&w.finish());
        let mut r = Reader::new(blob.as_bytes()).unwrap();
        let sel2 = BitvectorSelect::read_from(&mut r).unwrap();

        assert_eq!(sel2.count_ones(), sel.count_ones());
        for rank in 1..=sel.count_ones() {
            assert_eq!(sel2.select1(rank), sel.select1(rank));
        }
        assert_eq!(sel2.distance_to_next_set_bit(0), 5);
    }
}

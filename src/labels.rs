//! Label bytes of the sparse trie section.
//!
//! One byte per sparse slot, grouped into nodes by the LOUDS bits. Within a
//! node the labels are sorted, so in-node search is a linear scan for small
//! nodes and a binary search otherwise.

#[cfg(not(test))]
use alloc::vec::Vec;

use alloc::borrow::Cow;

use crate::binary::{Reader, Writer};
use crate::error::Result;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Node sizes up to this many labels are searched linearly.
const LINEAR_SEARCH_LIMIT: usize = 12;

/// The sparse section's label bytes.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LabelVector<'a> {
    labels: Cow<'a, [u8]>,
}

impl<'a> LabelVector<'a> {
    /// Concatenate per-level label arrays.
    pub fn from_levels(levels: &[Vec<u8>]) -> LabelVector<'static> {
        let mut labels = Vec::with_capacity(levels.iter().map(|l| l.len()).sum());
        for level in levels {
            labels.extend_from_slice(level);
        }
        LabelVector {
            labels: Cow::Owned(labels),
        }
    }

    /// Number of label slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if there are no labels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The label byte at `pos`.
    #[inline]
    pub fn read(&self, pos: usize) -> u8 {
        self.labels[pos]
    }

    /// Search for `label` within the node occupying `[pos, pos + size)`.
    ///
    /// Returns the absolute position of the match.
    pub fn search(&self, label: u8, pos: usize, size: usize) -> Option<usize> {
        let node = &self.labels[pos..pos + size];
        if size <= LINEAR_SEARCH_LIMIT {
            node.iter().position(|&l| l == label).map(|i| pos + i)
        } else {
            node.binary_search(&label).ok().map(|i| pos + i)
        }
    }

    /// First position in the node `[pos, pos + size)` whose label is
    /// strictly greater than `label`.
    pub fn search_greater_than(&self, label: u8, pos: usize, size: usize) -> Option<usize> {
        let node = &self.labels[pos..pos + size];
        let idx = if size <= LINEAR_SEARCH_LIMIT {
            node.iter().position(|&l| l > label).unwrap_or(size)
        } else {
            node.partition_point(|&l| l <= label)
        };
        if idx == size { None } else { Some(pos + idx) }
    }

    pub(crate) fn write_into(&self, w: &mut Writer) {
        w.put_u32(self.labels.len() as u32);
        w.put_bytes(&self.labels);
        w.pad8();
    }

    pub(crate) fn read_from(r: &mut Reader<'a>) -> Result<Self> {
        let count = r.u32()? as usize;
        let labels = r.bytes(count)?;
        r.pad8()?;
        Ok(LabelVector {
            labels: Cow::Borrowed(labels),
        })
    }
}

//! # fstrie
//!
//! A Fast Succinct Trie: an immutable, ordered key → value index built once
//! from a sorted collection of byte-string keys paired with 64-bit values.
//!
//! The trie is stored in two succinct LOUDS-encoded sections. The upper
//! levels use a dense encoding (one 256-bit label bitmap per node) tuned for
//! cache-friendly point lookups; the lower levels use a sparse encoding
//! (parallel label/has-child/LOUDS arrays) tuned for space. Both sections
//! sit on bitvectors with O(1) rank through basic-block lookup tables, and
//! the dense section interleaves its label and child bitmaps word by word so
//! paired reads touch a single cache line.
//!
//! ## Quick Start
//!
//! ```
//! use fstrie::Fst;
//!
//! let keys: [&[u8]; 4] = [b"ab", b"abc", b"bd", b"bdzz"];
//! let fst = Fst::new(&keys, &[0, 1, 2, 3]).unwrap();
//!
//! assert_eq!(fst.lookup(b"abc"), Some(1));
//! assert_eq!(fst.lookup(b"ac"), None);
//!
//! // Keys come back in lexicographic order.
//! let mut iter = fst.move_to_first();
//! assert_eq!(iter.key(), b"ab");
//! assert!(iter.next());
//! assert_eq!(iter.key(), b"abc");
//! ```
//!
//! ## Features
//!
//! - `std` (default) - Standard library support
//! - `serde` - Serialization/deserialization of the owned structures
//! - `memmap2` - Zero-copy access to serialized tries through mmap
//! - `portable-popcount` - Portable bitwise popcount (no intrinsics)

// Use no_std unless std feature is enabled or we're in test mode
#![cfg_attr(not(any(test, feature = "std")), no_std)]

// When using no_std, we need to explicitly link the alloc crate
#[cfg(not(any(test, feature = "std")))]
extern crate alloc;

// When using std, re-export alloc types from std for compatibility
#[cfg(any(test, feature = "std"))]
extern crate std as alloc;

pub mod binary;
pub mod bitvec;
pub mod broadword;
mod builder;
mod dense;
pub mod error;
pub mod labels;
pub mod popcount;
pub mod rank;
pub mod select;
mod sparse;
mod trie;

pub use bitvec::Bitvector;
pub use error::{FstError, Result};
pub use labels::LabelVector;
pub use rank::{BitvectorRank, InterleavedBitvectorRank};
pub use select::BitvectorSelect;
pub use trie::{Fst, Iter, NodeRef};

/// Fanout of a dense node: one slot per possible label byte.
pub(crate) const FANOUT: usize = 256;

/// In-band label marking that the path into a node is itself a stored key.
///
/// A key whose distinguishing final byte is `0x00` cannot be told apart from
/// this marker; see the input contract on [`Fst::new`].
pub(crate) const TERMINATOR: u8 = 0;

/// Rank basic-block size (bits) for the dense label/child bitmaps.
pub(crate) const DENSE_RANK_BLOCK: u32 = 512;

/// Rank basic-block size (bits) for the sparse has-child bitmap.
pub(crate) const SPARSE_RANK_BLOCK: u32 = 512;

/// Sampling interval of the LOUDS select index (every n-th set bit).
pub(crate) const SELECT_SAMPLE_INTERVAL: u32 = 64;

/// Default sparse/dense size ratio governing the section split.
///
/// A level stays densely encoded while the accumulated dense size times this
/// ratio is below the size of the remaining sparse levels.
pub const DEFAULT_SPARSE_DENSE_RATIO: u32 = 64;

/// By default the upper levels are encoded densely.
pub const DEFAULT_INCLUDE_DENSE: bool = true;

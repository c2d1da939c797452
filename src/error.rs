//! Error types for trie construction and deserialization.
//!
//! Lookup misses and iterator invalidity are normal states, not errors:
//! `lookup` returns `None` and iterators report `is_valid() == false`.

use core::fmt;

/// Errors surfaced by trie construction and deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FstError {
    /// Build input violated the sorted-unique precondition: the key at
    /// `index` is not strictly greater than its predecessor.
    DuplicateOrUnsortedKey {
        /// Index of the offending key in the input slice
        index: usize,
    },

    /// Key and value slices differ in length.
    ValueCountMismatch {
        /// Number of keys passed to the builder
        keys: usize,
        /// Number of values passed to the builder
        values: usize,
    },

    /// Build input contained an empty key.
    EmptyKey {
        /// Index of the empty key in the input slice
        index: usize,
    },

    /// A serialized blob is malformed: wrong magic or version, misaligned
    /// storage, or a length field disagreeing with the remaining bytes.
    DeserializeFormat {
        /// Description of the check that failed
        context: &'static str,
    },
}

impl fmt::Display for FstError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FstError::DuplicateOrUnsortedKey { index } => {
                write!(f, "key at index {} is duplicate or out of order", index)
            }
            FstError::ValueCountMismatch { keys, values } => {
                write!(f, "got {} keys but {} values", keys, values)
            }
            FstError::EmptyKey { index } => {
                write!(f, "key at index {} is empty", index)
            }
            FstError::DeserializeFormat { context } => {
                write!(f, "malformed serialized trie: {}", context)
            }
        }
    }
}

impl core::error::Error for FstError {}

/// A specialized Result type for trie operations.
pub type Result<T> = core::result::Result<T, FstError>;

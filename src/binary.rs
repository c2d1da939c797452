//! Byte-blob serialization primitives.
//!
//! The serialized trie is a single little-endian blob in which every
//! component starts at an 8-byte-aligned offset, so that a deserialized trie
//! can borrow its word arrays straight out of the blob with
//! [`bytemuck::try_cast_slice`] and no copying. The blob itself must sit on
//! an 8-byte boundary; memory-mapped files and `Vec<u64>`-backed buffers
//! qualify, arbitrary `Vec<u8>` buffers may not.
//!
//! ## Example
//!
//! ```
//! use fstrie::binary::{AlignedBlob, bytes_to_words, words_to_bytes};
//!
//! let words = vec![0x0102_0304u64; 4];
//! let bytes = words_to_bytes(&words);
//! assert_eq!(bytes.len(), 32);
//! assert_eq!(bytes_to_words(bytes), &words[..]);
//!
//! // Rehome an unaligned byte buffer into word-aligned storage.
//! let blob = AlignedBlob::copy_from(bytes);
//! assert_eq!(blob.as_bytes(), bytes);
//! ```

#[cfg(not(test))]
use alloc::vec::Vec;

use crate::error::{FstError, Result};

/// View a word slice as raw little-endian bytes.
#[inline]
pub fn words_to_bytes(words: &[u64]) -> &[u8] {
    bytemuck::cast_slice(words)
}

/// View a byte slice as u64 words.
///
/// # Panics
///
/// Panics if the slice is misaligned or its length is not a multiple of 8.
#[inline]
pub fn bytes_to_words(bytes: &[u8]) -> &[u64] {
    bytemuck::cast_slice(bytes)
}

/// A byte blob rehomed into 8-byte-aligned storage.
///
/// `Vec<u8>` gives no alignment guarantee, so a blob read from an arbitrary
/// source may need one copy into word-backed storage before it can be
/// deserialized zero-copy.
#[derive(Clone, Debug, Default)]
pub struct AlignedBlob {
    words: Vec<u64>,
    len: usize,
}

impl AlignedBlob {
    /// Copy `bytes` into aligned storage.
    pub fn copy_from(bytes: &[u8]) -> Self {
        let mut words = alloc::vec![0u64; bytes.len().div_ceil(8)];
        bytemuck::cast_slice_mut::<u64, u8>(&mut words)[..bytes.len()].copy_from_slice(bytes);
        AlignedBlob {
            words,
            len: bytes.len(),
        }
    }

    /// The blob contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice(&self.words)[..self.len]
    }
}

/// Little-endian blob writer keeping 8-byte alignment discipline.
#[derive(Default)]
pub(crate) struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn put_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn put_words(&mut self, words: &[u64]) {
        self.buf.extend_from_slice(bytemuck::cast_slice(words));
    }

    pub(crate) fn put_u32s(&mut self, values: &[u32]) {
        self.buf.extend_from_slice(bytemuck::cast_slice(values));
    }

    pub(crate) fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Pad with zero bytes up to the next 8-byte boundary.
    pub(crate) fn pad8(&mut self) {
        while self.buf.len() % 8 != 0 {
            self.buf.push(0);
        }
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Little-endian blob reader handing out borrowed array views.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Wrap a blob, rejecting storage that is not 8-byte aligned.
    pub(crate) fn new(buf: &'a [u8]) -> Result<Self> {
        if buf.as_ptr() as usize % 8 != 0 {
            return Err(FstError::DeserializeFormat {
                context: "blob storage is not 8-byte aligned",
            });
        }
        Ok(Reader { buf, pos: 0 })
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.buf.len() - self.pos < n {
            return Err(FstError::DeserializeFormat {
                context: "truncated blob",
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes(b.try_into().unwrap()))
    }

    pub(crate) fn u64(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes(b.try_into().unwrap()))
    }

    /// Borrow `count` u64 words out of the blob.
    pub(crate) fn words(&mut self, count: usize) -> Result<&'a [u64]> {
        debug_assert!(self.pos % 8 == 0, "word array at unaligned offset");
        let b = self.take(count.checked_mul(8).ok_or(FstError::DeserializeFormat {
            context: "word count overflow",
        })?)?;
        bytemuck::try_cast_slice(b).map_err(|_| FstError::DeserializeFormat {
            context: "misaligned word array",
        })
    }

    /// Borrow `count` u32 entries out of the blob.
    pub(crate) fn u32s(&mut self, count: usize) -> Result<&'a [u32]> {
        debug_assert!(self.pos % 4 == 0, "u32 array at unaligned offset");
        let b = self.take(count.checked_mul(4).ok_or(FstError::DeserializeFormat {
            context: "entry count overflow",
        })?)?;
        bytemuck::try_cast_slice(b).map_err(|_| FstError::DeserializeFormat {
            context: "misaligned u32 array",
        })
    }

    pub(crate) fn bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        self.take(count)
    }

    /// Skip padding up to the next 8-byte boundary.
    pub(crate) fn pad8(&mut self) -> Result<()> {
        let target = self.pos.next_multiple_of(8);
        if target > self.buf.len() {
            return Err(FstError::DeserializeFormat {
                context: "truncated padding",
            });
        }
        self.pos = target;
        Ok(())
    }
}

/// Memory-mapped blob support for zero-copy trie loading.
///
/// Requires the `memmap2` feature (which implies `std`).
#[cfg(feature = "memmap2")]
pub mod mmap {
    extern crate std;

    use memmap2::Mmap;
    use std::fs::File;
    use std::io;
    use std::path::Path;

    /// A memory-mapped serialized trie blob.
    ///
    /// Page alignment of the mapping satisfies the 8-byte storage
    /// requirement of [`crate::Fst::from_bytes`].
    pub struct MmapBlob {
        mmap: Mmap,
    }

    impl MmapBlob {
        /// Open a file and memory-map it.
        ///
        /// # Safety
        ///
        /// The file must not be modified while the mapping is active.
        pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
            let file = File::open(path)?;
            let mmap = unsafe { Mmap::map(&file)? };
            Ok(MmapBlob { mmap })
        }

        /// The mapped bytes.
        #[inline]
        pub fn as_bytes(&self) -> &[u8] {
            &self.mmap
        }

        /// Length of the mapping in bytes.
        #[inline]
        pub fn len(&self) -> usize {
            self.mmap.len()
        }

        /// Returns true if the mapping is empty.
        #[inline]
        pub fn is_empty(&self) -> bool {
            self.mmap.is_empty()
        }
    }
}

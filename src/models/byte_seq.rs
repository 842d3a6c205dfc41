//! # Byte Sequence
//!
//! An immutable logical concatenation of [`Bytes`] chunks with O(1)-amortized
//! take/drop that share the underlying memory.
//!
//! **Why this is useful**
//! - Incremental decoding accumulates network chunks without copying them into
//!   one growing buffer; consumed bytes are released chunk by chunk.
//! - `take`/`drop_front`/`split_at` hand out views, never copies; only
//!   `contiguous` materializes, and a single-chunk view materializes for free.
//! - Delimiter scanning walks chunk boundaries directly, so a delimiter that
//!   straddles two chunks is found without reassembling the input.
//!
//! Position state is owned by the view. The underlying chunks are never
//! mutated; cloning a view (`dup` semantics) is a refcount bump per chunk.

use std::collections::VecDeque;

use bytes::{Bytes, BytesMut};

use crate::error::CodecError;

/// Immutable logical view over one or more byte chunks.
#[derive(Debug, Clone, Default)]
pub struct ByteSeq {
    chunks: VecDeque<Bytes>,
    len: usize,
}

/// Outcome of comparing a needle against the view at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceMatch {
    /// The whole needle matches at the position.
    Full,
    /// The view ends before the needle does, but every available byte matches.
    Prefix,
    /// Mismatch.
    No,
}

/// Outcome of a delimiter scan over the view.
///
/// `Partial` reports the earliest position at which some delimiter's prefix
/// reaches the end of the input: scanning cannot commit to any match at or
/// beyond that position until more bytes arrive. `Clear` means every position
/// has been ruled out and a later scan may start at `len()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    /// A delimiter matched: byte offset and index into the delimiter set.
    Hit {
        /// Offset of the first matched byte.
        at: usize,
        /// Index of the matching delimiter in the declared set.
        delim: usize,
    },
    /// A delimiter prefix runs off the end of the input at `at`.
    Partial {
        /// Earliest position that cannot be ruled out yet.
        at: usize,
    },
    /// No match and no pending candidate.
    Clear,
}

impl ByteSeq {
    /// Empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total byte count across all chunks.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the view contains no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a chunk to the logical end. Empty chunks are discarded so that
    /// chunk count stays proportional to payload.
    pub fn push_chunk(&mut self, chunk: Bytes) {
        if !chunk.is_empty() {
            self.len += chunk.len();
            self.chunks.push_back(chunk);
        }
    }

    /// Logical concatenation: `self ++ tail`.
    pub fn append(&mut self, tail: ByteSeq) {
        self.len += tail.len;
        self.chunks.extend(tail.chunks);
    }

    /// Split into `(first n bytes, rest)`. Shares chunk memory; at most one
    /// chunk is sliced, none are copied.
    pub fn split_at(mut self, n: usize) -> Result<(ByteSeq, ByteSeq), CodecError> {
        if self.len < n {
            return Err(CodecError::Incomplete);
        }
        let mut head = ByteSeq::new();
        let mut remaining = n;
        while remaining > 0 {
            // Invariant: chunks are non-empty, so this front exists.
            let chunk = self.chunks.front_mut().ok_or(CodecError::Incomplete)?;
            if chunk.len() <= remaining {
                remaining -= chunk.len();
                self.len -= chunk.len();
                let taken = self
                    .chunks
                    .pop_front()
                    .ok_or(CodecError::Incomplete)?;
                head.push_chunk(taken);
            } else {
                let taken = chunk.split_to(remaining);
                self.len -= remaining;
                remaining = 0;
                head.push_chunk(taken);
            }
        }
        Ok((head, self))
    }

    /// The first `n` bytes as a new view. Errors when fewer are available.
    pub fn take(&self, n: usize) -> Result<ByteSeq, CodecError> {
        Ok(self.clone().split_at(n)?.0)
    }

    /// The view after the first `n` bytes.
    pub fn drop_front(&self, n: usize) -> Result<ByteSeq, CodecError> {
        Ok(self.clone().split_at(n)?.1)
    }

    /// The first `n` bytes as one contiguous buffer. Zero-copy when they fall
    /// inside a single chunk; exactly one copy otherwise.
    pub fn take_contiguous(&self, n: usize) -> Result<Bytes, CodecError> {
        if self.len < n {
            return Err(CodecError::Incomplete);
        }
        if n == 0 {
            return Ok(Bytes::new());
        }
        let first = &self.chunks[0];
        if first.len() >= n {
            return Ok(first.slice(..n));
        }
        let mut out = BytesMut::with_capacity(n);
        let mut remaining = n;
        for chunk in &self.chunks {
            let step = chunk.len().min(remaining);
            out.extend_from_slice(&chunk[..step]);
            remaining -= step;
            if remaining == 0 {
                break;
            }
        }
        Ok(out.freeze())
    }

    /// Materialize the whole view into one buffer.
    pub fn contiguous(&self) -> Bytes {
        // len is maintained, so this take cannot fail.
        self.take_contiguous(self.len).unwrap_or_default()
    }

    /// Byte at logical offset `i`, if in range.
    pub fn byte_at(&self, i: usize) -> Option<u8> {
        let (ci, off) = self.locate(i)?;
        Some(self.chunks[ci][off])
    }

    /// Bytes in logical order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.chunks.iter().flat_map(|c| c.iter().copied())
    }

    /// Compare `needle` against the view starting at logical offset `pos`,
    /// walking chunk boundaries without materializing.
    pub fn matches_at(&self, pos: usize, needle: &[u8]) -> SliceMatch {
        if needle.is_empty() {
            return SliceMatch::Full;
        }
        match self.locate(pos) {
            Some((ci, off)) => self.match_from(ci, off, needle),
            None => SliceMatch::No,
        }
    }

    /// Scan for the first occurrence of any delimiter at or after `from`.
    ///
    /// Positions ascend; at one position, delimiters are tried in declared
    /// order. A delimiter prefix that reaches the end of input suspends the
    /// scan at that position (`Scan::Partial`) so a resumed scan, with more
    /// bytes appended, observes exactly what a whole-buffer scan would.
    pub fn scan_delimiters(&self, delims: &[Bytes], from: usize) -> Scan {
        if from >= self.len {
            return Scan::Clear;
        }
        let (mut ci, mut off) = match self.locate(from) {
            Some(loc) => loc,
            None => return Scan::Clear,
        };
        for pos in from..self.len {
            for (di, delim) in delims.iter().enumerate() {
                match self.match_from(ci, off, delim) {
                    SliceMatch::Full => return Scan::Hit { at: pos, delim: di },
                    SliceMatch::Prefix => return Scan::Partial { at: pos },
                    SliceMatch::No => {}
                }
            }
            off += 1;
            if off == self.chunks[ci].len() {
                ci += 1;
                off = 0;
            }
        }
        Scan::Clear
    }

    /// Map a logical offset to `(chunk index, offset within chunk)`.
    fn locate(&self, pos: usize) -> Option<(usize, usize)> {
        if pos >= self.len {
            return None;
        }
        let mut remaining = pos;
        for (ci, chunk) in self.chunks.iter().enumerate() {
            if remaining < chunk.len() {
                return Some((ci, remaining));
            }
            remaining -= chunk.len();
        }
        None
    }

    fn match_from(&self, mut ci: usize, mut off: usize, needle: &[u8]) -> SliceMatch {
        let mut matched = 0;
        while matched < needle.len() {
            if ci == self.chunks.len() {
                return SliceMatch::Prefix;
            }
            let chunk = &self.chunks[ci];
            let step = (chunk.len() - off).min(needle.len() - matched);
            if chunk[off..off + step] != needle[matched..matched + step] {
                return SliceMatch::No;
            }
            matched += step;
            off += step;
            if off == chunk.len() {
                ci += 1;
                off = 0;
            }
        }
        SliceMatch::Full
    }
}

impl From<Bytes> for ByteSeq {
    fn from(chunk: Bytes) -> Self {
        let mut bs = ByteSeq::new();
        bs.push_chunk(chunk);
        bs
    }
}

impl From<BytesMut> for ByteSeq {
    fn from(chunk: BytesMut) -> Self {
        ByteSeq::from(chunk.freeze())
    }
}

impl From<Vec<u8>> for ByteSeq {
    fn from(bytes: Vec<u8>) -> Self {
        ByteSeq::from(Bytes::from(bytes))
    }
}

impl From<&[u8]> for ByteSeq {
    fn from(bytes: &[u8]) -> Self {
        ByteSeq::from(Bytes::copy_from_slice(bytes))
    }
}

impl From<&str> for ByteSeq {
    fn from(s: &str) -> Self {
        ByteSeq::from(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl PartialEq for ByteSeq {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl PartialEq<[u8]> for ByteSeq {
    fn eq(&self, other: &[u8]) -> bool {
        self.len == other.len() && self.iter().eq(other.iter().copied())
    }
}

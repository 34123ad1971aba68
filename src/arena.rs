//! Arena storage for serialized grouping and join keys.
//!
//! A composite key is assembled byte-for-byte by asking every key column to
//! append its contribution to one contiguous region. The region may have to
//! move while it grows, so the caller keeps an [`ArenaSpan`] for the region
//! start and the arena updates it in [`Arena::alloc_continue`].
//!
//! ```text
//!  chunks[0] (full)          chunks[1] (current)
//! ┌──────────────────┐      ┌───────────────────────────┬──────────┐
//! │ key 0 │ key 1 │..│      │ key 7 │ key 8 (growing) ..│   free   │
//! └──────────────────┘      └───────────────────────────┴──────────┘
//! ```

/// Location of a byte range inside an arena.
///
/// Valid until the arena that produced it is reset or dropped.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArenaSpan {
    chunk: usize,
    offset: usize,
    len: usize,
}

impl ArenaSpan {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Bump allocator contract consumed by key serialization.
pub trait Arena {
    /// Reserves `size` bytes directly after the region tracked by `begin`.
    ///
    /// When `begin` is `None` a new region is started and `begin` is set to
    /// it. When the region cannot grow in place it is copied to fresh storage
    /// and `begin` is updated. Returns the span of the reserved bytes and a
    /// mutable view of them.
    fn alloc_continue(&mut self, size: usize, begin: &mut Option<ArenaSpan>) -> (ArenaSpan, &mut [u8]);

    /// The bytes covered by `span`.
    fn bytes(&self, span: ArenaSpan) -> &[u8];
}

const DEFAULT_CHUNK_SIZE: usize = 4096;
const MAX_CHUNK_SIZE: usize = 128 * 1024 * 1024;

/// Chunked bump arena.
///
/// Chunks are allocated with a fixed capacity and never reallocated, so
/// spans stay valid as the arena grows. Chunk sizes double up to a cap.
#[derive(Debug)]
pub struct BumpArena {
    chunks: Vec<Vec<u8>>,
    next_chunk_size: usize,
    initial_chunk_size: usize,
    bytes_used: usize,
}

impl BumpArena {
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunks: Vec::new(),
            next_chunk_size: chunk_size,
            initial_chunk_size: chunk_size,
            bytes_used: 0,
        }
    }

    /// Total bytes handed out, including bytes orphaned by region moves.
    pub fn bytes_used(&self) -> usize {
        self.bytes_used
    }

    /// Total capacity reserved from the system allocator.
    pub fn bytes_reserved(&self) -> usize {
        self.chunks.iter().map(|c| c.capacity()).sum()
    }

    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Drops all storage. Every outstanding span becomes invalid.
    pub fn reset(&mut self) {
        self.chunks.clear();
        self.next_chunk_size = self.initial_chunk_size;
        self.bytes_used = 0;
    }

    /// Free bytes left in the current chunk.
    fn spare(&self) -> usize {
        self.chunks
            .last()
            .map(|c| c.capacity() - c.len())
            .unwrap_or(0)
    }

    /// Carves `size` zeroed bytes off the current chunk, opening a new chunk
    /// when the current one is too small.
    fn alloc_region(&mut self, size: usize) -> ArenaSpan {
        if self.chunks.is_empty() || self.spare() < size {
            let capacity = self.next_chunk_size.max(size);
            self.next_chunk_size = (self.next_chunk_size * 2).min(MAX_CHUNK_SIZE);
            self.chunks.push(Vec::with_capacity(capacity));
        }

        let chunk = self.chunks.len() - 1;
        let current = &mut self.chunks[chunk];
        let offset = current.len();
        current.resize(offset + size, 0);
        self.bytes_used += size;

        ArenaSpan {
            chunk,
            offset,
            len: size,
        }
    }

    /// True when `span` ends exactly at the bump pointer of the current chunk.
    fn is_tail(&self, span: ArenaSpan) -> bool {
        span.chunk + 1 == self.chunks.len() && span.offset + span.len == self.chunks[span.chunk].len()
    }

    /// Copies the bytes of `from` to the start of `to`.
    fn copy_region(&mut self, from: ArenaSpan, to: ArenaSpan) {
        debug_assert!(from.chunk <= to.chunk);
        if from.chunk == to.chunk {
            self.chunks[to.chunk].copy_within(from.offset..from.offset + from.len, to.offset);
        } else {
            let (head, tail) = self.chunks.split_at_mut(to.chunk);
            tail[0][to.offset..to.offset + from.len]
                .copy_from_slice(&head[from.chunk][from.offset..from.offset + from.len]);
        }
    }
}

impl Default for BumpArena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena for BumpArena {
    fn alloc_continue(&mut self, size: usize, begin: &mut Option<ArenaSpan>) -> (ArenaSpan, &mut [u8]) {
        let fresh = match *begin {
            None => {
                let region = self.alloc_region(size);
                *begin = Some(region);
                region
            }
            Some(region) if self.is_tail(region) && self.spare() >= size => {
                let fresh = self.alloc_region(size);
                debug_assert_eq!(fresh.offset, region.offset + region.len);
                *begin = Some(ArenaSpan {
                    len: region.len + size,
                    ..region
                });
                fresh
            }
            Some(region) => {
                let moved = self.alloc_region(region.len + size);
                self.copy_region(region, moved);
                *begin = Some(moved);
                ArenaSpan {
                    chunk: moved.chunk,
                    offset: moved.offset + region.len,
                    len: size,
                }
            }
        };

        let bytes = &mut self.chunks[fresh.chunk][fresh.offset..fresh.offset + fresh.len];
        (fresh, bytes)
    }

    fn bytes(&self, span: ArenaSpan) -> &[u8] {
        &self.chunks[span.chunk][span.offset..span.offset + span.len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_region_sets_begin() {
        let mut arena = BumpArena::new();
        let mut begin = None;
        let (span, bytes) = arena.alloc_continue(4, &mut begin);
        bytes.copy_from_slice(&[1, 2, 3, 4]);

        assert_eq!(begin, Some(span));
        assert_eq!(arena.bytes(span), &[1, 2, 3, 4]);
        assert_eq!(arena.bytes_used(), 4);
    }

    #[test]
    fn region_grows_in_place() {
        let mut arena = BumpArena::with_chunk_size(64);
        let mut begin = None;
        for i in 0..8u8 {
            let (_, bytes) = arena.alloc_continue(2, &mut begin);
            bytes.copy_from_slice(&[i, i]);
        }

        let key = begin.unwrap();
        assert_eq!(key.len(), 16);
        assert_eq!(arena.bytes(key), &[0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7]);
        assert_eq!(arena.num_chunks(), 1);
        assert_eq!(arena.bytes_used(), 16);
    }

    #[test]
    fn region_moves_to_new_chunk_when_full() {
        let mut arena = BumpArena::with_chunk_size(8);
        let mut begin = None;
        let (_, bytes) = arena.alloc_continue(6, &mut begin);
        bytes.copy_from_slice(&[1, 2, 3, 4, 5, 6]);

        let (fresh, bytes) = arena.alloc_continue(4, &mut begin);
        bytes.copy_from_slice(&[7, 8, 9, 10]);

        let key = begin.unwrap();
        assert_eq!(arena.num_chunks(), 2);
        assert_eq!(arena.bytes(key), &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(arena.bytes(fresh), &[7, 8, 9, 10]);
    }

    #[test]
    fn interleaved_region_is_copied() {
        let mut arena = BumpArena::with_chunk_size(1024);
        let mut first = None;
        let mut second = None;

        let (_, bytes) = arena.alloc_continue(2, &mut first);
        bytes.copy_from_slice(&[1, 2]);
        let (_, bytes) = arena.alloc_continue(2, &mut second);
        bytes.copy_from_slice(&[9, 9]);

        // `first` no longer ends at the bump pointer, so it has to move.
        let (_, bytes) = arena.alloc_continue(1, &mut first);
        bytes.copy_from_slice(&[3]);

        assert_eq!(arena.bytes(first.unwrap()), &[1, 2, 3]);
        assert_eq!(arena.bytes(second.unwrap()), &[9, 9]);
        assert_eq!(arena.num_chunks(), 1);
    }

    #[test]
    fn oversized_request_gets_its_own_chunk() {
        let mut arena = BumpArena::with_chunk_size(4);
        let mut begin = None;
        let (span, bytes) = arena.alloc_continue(100, &mut begin);
        assert_eq!(bytes.len(), 100);
        assert_eq!(span.len(), 100);
        assert!(arena.bytes_reserved() >= 100);
    }

    #[test]
    fn reset_releases_everything() {
        let mut arena = BumpArena::with_chunk_size(16);
        let mut begin = None;
        arena.alloc_continue(40, &mut begin);
        arena.reset();
        assert_eq!(arena.num_chunks(), 0);
        assert_eq!(arena.bytes_used(), 0);
        assert_eq!(arena.bytes_reserved(), 0);
    }
}

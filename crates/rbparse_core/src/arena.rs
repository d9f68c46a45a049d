//! Arena allocation for syntax trees.
//!
//! Every node of one parse is allocated from a single bump arena. Dropping
//! the arena releases the whole tree at once.

use bumpalo::Bump;

/// The parse arena wraps a bump allocator for all tree allocations.
pub struct ParseArena {
    bump: Bump,
}

impl ParseArena {
    /// Create a new arena with default capacity.
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    /// Create an arena sized for a source of `source_len` bytes.
    ///
    /// Trees take several times the size of their source, so this avoids
    /// most chunk growth for typical files.
    pub fn for_source(source_len: usize) -> Self {
        Self {
            bump: Bump::with_capacity(source_len.saturating_mul(8)),
        }
    }

    /// Get a reference to the underlying bump allocator.
    #[inline]
    pub fn bump(&self) -> &Bump {
        &self.bump
    }

    /// Returns the total bytes allocated in this arena.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }

    /// Reset the arena, deallocating all trees but keeping the memory.
    pub fn reset(&mut self) {
        self.bump.reset();
    }
}

impl Default for ParseArena {
    fn default() -> Self {
        Self::new()
    }
}

//! Task stack allocation.

use alloc::{boxed::Box, vec::Vec};
use core::pin::Pin;

use crate::scheduler::SchedError;

/// Stacks (and the frames built into them) hold absolute addresses,
/// so the region must not move for the task's lifetime.
const STACK_ALIGN: usize = 16;

/// Smallest region that can hold an initial frame with headroom.
pub const MIN_STACK_SIZE: usize = 512;

/// Exclusively-owned contiguous stack region for one task.
///
/// The owning task record is the sole owner of the region's lifetime;
/// dropping the record frees the stack.
pub struct TaskStack {
    mem: Pin<Box<[u8]>>,
}

impl TaskStack {
    /// Allocates a zeroed stack of `size` bytes.
    ///
    /// Reports failure instead of aborting when the allocator cannot
    /// satisfy the request. A `size` below [`MIN_STACK_SIZE`] is a
    /// caller contract violation, checked only in debug builds.
    pub fn allocate(size: usize) -> Result<Self, SchedError> {
        debug_assert!(size >= MIN_STACK_SIZE);

        let mut mem = Vec::new();
        if mem.try_reserve_exact(size).is_err() {
            return Err(SchedError::StackExhausted);
        }
        mem.resize(size, 0);

        Ok(TaskStack {
            mem: Box::into_pin(mem.into_boxed_slice()),
        })
    }

    /// Highest frame-aligned address within the region.
    pub fn top(&mut self) -> usize {
        let len = self.mem.len();
        let base = self.mem.as_mut().get_mut().as_mut_ptr() as usize;
        (base + len) & !(STACK_ALIGN - 1)
    }

    /// Lowest address of the region.
    pub fn bottom(&self) -> usize {
        self.mem.as_ptr() as usize
    }
}

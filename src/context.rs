//! Saved execution state and the context-switch primitive.
//!
//! A suspended task is represented by nothing more than a stack
//! pointer: the save path of `__switch` spills every general-purpose
//! register and the flags register onto the outgoing task's own stack
//! and records the final stack pointer, the restore path loads the
//! recorded stack pointer and pops the same layout back off. The word
//! above the register image is the resume address, so the final `ret`
//! lands exactly after the call that suspended the task.
//!
//! A brand-new task is started by forging this layout by hand:
//! [`build_initial_frame`] writes, from the stack top downward, a
//! return guard, the entry address in the resume slot, a flags image
//! with interrupts enabled and zeroed register slots. The very first
//! switch into the task is then indistinguishable from resuming a
//! previously suspended one.
//!
//! This module is the only place in the crate that touches raw
//! execution state.

use core::arch::global_asm;

use crate::{scheduler::Scheduler, stack::TaskStack, task::TaskEntry};

#[cfg(target_arch = "x86_64")]
global_asm!(include_str!("switch.S"));

#[cfg(not(target_arch = "x86_64"))]
compile_error!("the context-switch primitive is only implemented for x86_64");

const WORD: usize = core::mem::size_of::<usize>();

// Pop order of the restore path in switch.S. The word at the saved
// stack pointer is the flags image, then r15 down through rax, then
// the resume address and the return guard.
const FRAME_WORDS: usize = 18;
const ARG_WORD: usize = 10; // rdi, the first C argument register
const RESUME_WORD: usize = 16;
const GUARD_WORD: usize = 17;

/// Initial flags image: reserved bit 1 plus the interrupt-enable flag.
const INITIAL_RFLAGS: usize = 0x202;

/// Opaque capture of a suspended task's execution state.
///
/// Holds the stack pointer left behind by the save path of `__switch`
/// (or forged by [`build_initial_frame`]). Never inspected, only
/// handed back to the restore path.
#[repr(transparent)]
pub struct Context {
    sp: usize,
}

impl Context {
    pub const fn empty() -> Self {
        Context { sp: 0 }
    }
}

extern "C" {
    /// Saves the calling task's registers and stack pointer into
    /// `old`, then restores the state recorded in `new` and transfers
    /// control to its resume address. Passing a null `old` discards
    /// the outgoing state; the call then never returns.
    fn __switch(old: *mut Context, new: *const Context);
}

/// Performs the register transfer between two saved states.
///
/// This is the only point where the identity of the current thread of
/// execution changes without a function return.
///
/// Callers must ensure `new` holds a valid frame that no other
/// execution path can resume, and must not hold any lock across the
/// call that the incoming task could take.
pub unsafe fn switch(old: Option<&mut Context>, new: &Context) {
    let old = match old {
        Some(ctx) => ctx as *mut Context,
        None => core::ptr::null_mut(),
    };
    unsafe { __switch(old, new as *const Context) }
}

/// Writes the initial saved-register frame for a new task into its
/// stack and returns the matching execution state.
///
/// `sched` lands in the first-argument register slot, so the entry
/// function receives the scheduler handle when the first switch
/// "returns" into it.
pub fn build_initial_frame(
    stack: &mut TaskStack,
    entry: TaskEntry,
    sched: *const Scheduler,
) -> Context {
    let top = stack.top();
    let base = top - FRAME_WORDS * WORD;
    debug_assert!(base >= stack.bottom());

    unsafe {
        core::ptr::write_bytes(base as *mut u8, 0, FRAME_WORDS * WORD);
        *(base as *mut usize) = INITIAL_RFLAGS;
        *((base + ARG_WORD * WORD) as *mut usize) = sched as usize;
        *((base + RESUME_WORD * WORD) as *mut usize) = entry as usize;
        *((base + GUARD_WORD * WORD) as *mut usize) = task_return_guard as usize;
    }

    Context { sp: base }
}

/// Rewrites the scheduler handle in an initial frame.
///
/// Only valid for a frame that has never been resumed: once a task has
/// run, its saved stack pointer no longer points at the initial
/// layout.
pub unsafe fn reseed_entry_arg(ctx: &mut Context, sched: *const Scheduler) {
    unsafe { *((ctx.sp + ARG_WORD * WORD) as *mut usize) = sched as usize }
}

/// Landing point for an entry function that returns instead of
/// terminating itself. The task contract forbids this.
extern "C" fn task_return_guard() -> ! {
    panic!("task entry returned without terminating");
}

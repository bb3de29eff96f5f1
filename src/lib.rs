//! A minimal cooperative multitasking core.
//!
//! Tasks are lightweight units of execution with a private stack and a
//! saved register state. A task keeps the processor until it
//! voluntarily calls [`Scheduler::yield_current`] or ends itself with
//! [`Scheduler::terminate_current`]; there is no preemption, and
//! therefore no locking is needed around the task table beyond the
//! interior-mutability guard of the scheduler itself.
//!
//! The crate is freestanding (`no_std` + `alloc`). Output goes through
//! the [`log`] facade; the embedding host installs the sink and the
//! global allocator.

#![no_std]

extern crate alloc;

pub use self::{
    scheduler::{RunState, SchedError, Scheduler, TaskInfo},
    task::{TaskEntry, TaskId},
};

mod context;
pub mod demo;
pub mod ext;
mod scheduler;
mod stack;
mod task;

/// Maximum number of concurrently active tasks.
pub const MAX_TASKS: usize = 4;

/// The default task stack size.
pub const TASK_STACK_SIZE: usize = 16 * 4096;

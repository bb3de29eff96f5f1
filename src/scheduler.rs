//! Round-robin cooperative scheduling policy.
//!
//! A [`Scheduler`] is a self-contained instance holding the task table
//! and the cursor of the currently executing task; independent
//! instances can coexist, which is how the crate is tested. All
//! mutable state sits behind a spin lock that is never held across a
//! context switch: the lock exists for interior mutability, not for
//! cross-thread sharing (cooperative switching is only meaningful
//! within a single thread of control, so the type is neither `Send`
//! nor `Sync`).

use alloc::vec::Vec;
use core::{convert::Infallible, fmt, marker::PhantomData};

use log::info;
use spin::Mutex;

use crate::{
    context::{self, Context},
    task::{Task, TaskEntry, TaskId, TaskTable},
};

/// Errors reported by scheduler operations.
///
/// Every error is recoverable and leaves the scheduler state
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedError {
    /// No free task slot is available.
    NoFreeSlot,
    /// The allocator could not provide a task stack.
    StackExhausted,
    /// The operation requires a running task and there is none.
    NotRunning,
    /// The scheduler has already been started.
    AlreadyRunning,
    /// The scheduler cannot start without any task.
    NoTasks,
    /// The scheduler has drained and cannot be restarted.
    Drained,
}

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SchedError::NoFreeSlot => "no free task slots available",
            SchedError::StackExhausted => "failed to allocate stack for new task",
            SchedError::NotRunning => "scheduler not running, no current task",
            SchedError::AlreadyRunning => "scheduler already running",
            SchedError::NoTasks => "no tasks to run",
            SchedError::Drained => "scheduler drained, reinitialization required",
        };
        write!(f, "{}", msg)
    }
}

/// Scheduler life-cycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Tasks may be created; nothing has run yet.
    Ready,
    /// A task currently owns the processor.
    Running,
    /// The last task terminated. Terminal state.
    Drained,
}

/// Snapshot of one active task, as reported by listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskInfo {
    pub id:   TaskId,
    pub name: &'static str,
    pub slot: usize,
}

struct SchedulerInner {
    table:   TaskTable,
    /// Slot of the currently executing task. Always an active slot
    /// while the scheduler is running.
    current: Option<usize>,
    state:   RunState,
    /// Where control returns when the scheduler drains: the saved
    /// state of whoever called [`Scheduler::start`].
    boot: Context,
    /// Record of the most recently terminated task. Its stack is
    /// still in use until the switch away from it completes, so the
    /// record is parked here and dropped at the next reclamation
    /// point instead of inside the termination path itself.
    graveyard: Option<Task>,
}

/// A cooperative round-robin scheduler instance.
pub struct Scheduler {
    inner: Mutex<SchedulerInner>,
    // Pins the instance to one thread of control.
    _single: PhantomData<*mut ()>,
}

impl Scheduler {
    /// Creates a scheduler with an empty task table.
    pub fn new() -> Self {
        Scheduler {
            inner: Mutex::new(SchedulerInner {
                table:     TaskTable::new(),
                current:   None,
                state:     RunState::Ready,
                boot:      Context::empty(),
                graveyard: None,
            }),
            _single: PhantomData,
        }
    }

    /// Creates a new task from `entry`.
    ///
    /// Allowed in every state that has a free slot, including from
    /// inside a running task. On failure no slot is consumed and no
    /// identity is assigned.
    pub fn spawn(&self, entry: TaskEntry, name: &'static str) -> Result<TaskId, SchedError> {
        let mut inner = self.inner.lock();
        let (slot, id) = inner.table.create(entry, name, self as *const Scheduler)?;
        info!("sched: created task '{}' (id {}) in slot {}", name, id, slot);
        Ok(id)
    }

    pub fn state(&self) -> RunState {
        self.inner.lock().state
    }

    /// The currently executing task, if any.
    pub fn current_task(&self) -> Option<TaskInfo> {
        let inner = self.inner.lock();
        inner.current.map(|slot| {
            let task = inner.table.get(slot).expect("cursor on an inactive slot");
            TaskInfo {
                id: task.id,
                name: task.name,
                slot,
            }
        })
    }

    /// Every active task, in slot order. Valid in every run state.
    pub fn tasks(&self) -> Vec<TaskInfo> {
        self.inner
            .lock()
            .table
            .active()
            .map(|(slot, task)| TaskInfo {
                id: task.id,
                name: task.name,
                slot,
            })
            .collect()
    }

    /// Switches into the lowest-index active task and runs the task
    /// set to completion.
    ///
    /// Returns `Ok(())` only after the last task has terminated and
    /// the scheduler has reached [`RunState::Drained`].
    pub fn start(&self) -> Result<(), SchedError> {
        let boot_ptr: *mut Context;
        let first_ptr: *const Context;
        {
            let mut inner = self.inner.lock();
            match inner.state {
                RunState::Running => return Err(SchedError::AlreadyRunning),
                RunState::Drained => return Err(SchedError::Drained),
                RunState::Ready => {}
            }
            let first = inner.table.first_active().ok_or(SchedError::NoTasks)?;

            // Frames built before this point hold the scheduler
            // address as of spawn time; reseed them in case the value
            // moved since. None of them has run yet.
            let sched = self as *const Scheduler;
            for (_, task) in inner.table.active_mut() {
                unsafe { context::reseed_entry_arg(&mut task.context, sched) }
            }

            inner.state = RunState::Running;
            inner.current = Some(first);
            boot_ptr = &mut inner.boot as *mut Context;
            first_ptr = inner.table.context_ptr(first) as *const Context;
        }

        info!("sched: starting first task");
        unsafe { context::switch(Some(&mut *boot_ptr), &*first_ptr) };

        // Control only comes back here once the last task has
        // terminated and switched into the boot context.
        let mut inner = self.inner.lock();
        inner.graveyard = None;
        info!("sched: all tasks terminated, scheduler drained");
        Ok(())
    }

    /// Hands the processor to the next active task in round-robin
    /// order, resuming the caller on a later rotation.
    ///
    /// A task that is the only active one yields to itself: no switch
    /// is performed and no state is overwritten.
    pub fn yield_current(&self) -> Result<(), SchedError> {
        let old_ptr: *mut Context;
        let new_ptr: *const Context;
        {
            let mut inner = self.inner.lock();
            if inner.state != RunState::Running {
                return Err(SchedError::NotRunning);
            }
            let curr = inner.current.expect("running without a current task");
            let next = inner
                .table
                .next_active_after(curr)
                .expect("running without an active slot");
            if next == curr {
                return Ok(());
            }

            inner.current = Some(next);
            old_ptr = inner.table.context_ptr(curr);
            new_ptr = inner.table.context_ptr(next) as *const Context;
        }

        unsafe { context::switch(Some(&mut *old_ptr), &*new_ptr) };
        Ok(())
    }

    /// Ends the calling task. Its slot becomes reusable immediately
    /// and its saved state is permanently discarded.
    ///
    /// Control moves to the lowest-index remaining task, or back to
    /// the [`Scheduler::start`] caller when none remains; either way
    /// this function never returns on success.
    pub fn terminate_current(&self) -> Result<Infallible, SchedError> {
        let next_ptr: *const Context;
        {
            let mut inner = self.inner.lock();
            if inner.state != RunState::Running {
                return Err(SchedError::NotRunning);
            }
            let curr = inner.current.take().expect("running without a current task");

            let task = inner.table.release(curr);
            info!("sched: terminating task '{}' (id {})", task.name, task.id);
            // We are still executing on this task's stack; park the
            // record so the stack outlives the switch below.
            inner.graveyard = Some(task);

            match inner.table.first_active() {
                Some(next) => {
                    inner.current = Some(next);
                    next_ptr = inner.table.context_ptr(next) as *const Context;
                }
                None => {
                    inner.state = RunState::Drained;
                    next_ptr = &inner.boot as *const Context;
                }
            }
        }

        // The outgoing state is discarded: this task never resumes.
        unsafe { context::switch(None, &*next_ptr) };
        unreachable!("terminated task was resumed");
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

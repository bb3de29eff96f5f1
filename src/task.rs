//! Task control records and the fixed-capacity task table.

use crate::{
    context::{build_initial_frame, Context},
    scheduler::{SchedError, Scheduler},
    stack::TaskStack,
    MAX_TASKS, TASK_STACK_SIZE,
};

pub type TaskId = u64;

/// Entry point of a task.
///
/// The handle is the scheduler that runs the task; entries use it to
/// yield and must end themselves with
/// [`Scheduler::terminate_current`] instead of returning.
pub type TaskEntry = extern "C" fn(&Scheduler);

/// One task control record.
pub struct Task {
    pub id:      TaskId,
    pub name:    &'static str,
    pub context: Context,
    // Owned for the whole record lifetime; the saved context points
    // into it.
    #[allow(dead_code)]
    stack: TaskStack,
}

/// Fixed-capacity table of task slots.
///
/// A slot being occupied is the single source of truth for whether its
/// stack is currently allocated. Slot allocation is first-fit in
/// ascending index order, so creation order is reproducible.
pub struct TaskTable {
    slots:   [Option<Task>; MAX_TASKS],
    next_id: TaskId,
}

impl TaskTable {
    pub fn new() -> Self {
        const FREE: Option<Task> = None;
        TaskTable {
            slots:   [FREE; MAX_TASKS],
            next_id: 0,
        }
    }

    /// Lowest-index free slot, if any.
    fn free_slot(&self) -> Option<usize> {
        self.slots.iter().position(|slot| slot.is_none())
    }

    /// Creates a task record: allocates a slot and a stack, builds the
    /// initial frame and assigns the next identity. On failure the
    /// table is left unmodified.
    pub fn create(
        &mut self,
        entry: TaskEntry,
        name: &'static str,
        sched: *const Scheduler,
    ) -> Result<(usize, TaskId), SchedError> {
        let slot = self.free_slot().ok_or(SchedError::NoFreeSlot)?;
        let mut stack = TaskStack::allocate(TASK_STACK_SIZE)?;
        let context = build_initial_frame(&mut stack, entry, sched);

        let id = self.next_id;
        self.next_id += 1;

        self.slots[slot] = Some(Task {
            id,
            name,
            context,
            stack,
        });
        Ok((slot, id))
    }

    /// Takes the record out of an active slot, freeing the slot for
    /// reuse. Calling this on an inactive slot is a caller error.
    pub fn release(&mut self, slot: usize) -> Task {
        self.slots[slot].take().expect("release of an inactive slot")
    }

    pub fn get(&self, slot: usize) -> Option<&Task> {
        self.slots[slot].as_ref()
    }

    pub fn context_ptr(&mut self, slot: usize) -> *mut Context {
        let task = self.slots[slot]
            .as_mut()
            .expect("context of an inactive slot");
        &mut task.context as *mut Context
    }

    /// Lowest-index active slot, if any.
    pub fn first_active(&self) -> Option<usize> {
        self.slots.iter().position(|slot| slot.is_some())
    }

    /// Next active slot strictly after `idx`, wrapping around. Lands
    /// back on `idx` itself when it holds the only active task.
    pub fn next_active_after(&self, idx: usize) -> Option<usize> {
        (1..=MAX_TASKS)
            .map(|step| (idx + step) % MAX_TASKS)
            .find(|&slot| self.slots[slot].is_some())
    }

    pub fn active(&self) -> impl Iterator<Item = (usize, &Task)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, task)| task.as_ref().map(|task| (slot, task)))
    }

    pub fn active_mut(&mut self) -> impl Iterator<Item = (usize, &mut Task)> + '_ {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(slot, task)| task.as_mut().map(|task| (slot, task)))
    }
}

//! Host integration boundary.
//!
//! The embedding kernel treats the scheduler as a loadable extension:
//! it calls [`init`] once at startup to obtain the scheduler instance
//! and to expose the human-invocable operations through its own
//! command dispatcher, and [`cleanup`] once at teardown to release
//! every remaining task's resources.

use log::{info, warn};

use crate::{demo, RunState, SchedError, Scheduler};

/// Name under which the host registers this extension.
pub const EXTENSION_NAME: &str = "scheduler";
pub const EXTENSION_VERSION: &str = "1.0";

/// A host-dispatchable operation exposed by the scheduler extension.
pub struct CommandSpec {
    pub name:        &'static str,
    pub description: &'static str,
    pub run:         fn(&Scheduler, args: &str),
}

/// The three operations the extension exposes to the host dispatcher.
pub static COMMANDS: [CommandSpec; 3] = [
    CommandSpec {
        name:        "sched_start",
        description: "Start the cooperative scheduler with example tasks",
        run:         cmd_start,
    },
    CommandSpec {
        name:        "task_yield",
        description: "Manually yield the processor to the next task",
        run:         cmd_yield,
    },
    CommandSpec {
        name:        "list_tasks",
        description: "List all active tasks",
        run:         cmd_list,
    },
];

/// The host's command-registration collaborator.
pub trait CommandRegistry {
    fn register_command(&mut self, command: &'static CommandSpec);
}

/// Initialization entry point: resets the task table by constructing a
/// fresh scheduler and registers the extension's commands.
pub fn init(registry: &mut dyn CommandRegistry) -> Scheduler {
    info!("sched: cooperative scheduler extension initializing");
    for command in COMMANDS.iter() {
        registry.register_command(command);
    }
    info!("sched: extension initialized, use 'sched_start' to begin");
    Scheduler::new()
}

/// Cleanup entry point: releases every remaining task's stack.
pub fn cleanup(sched: Scheduler) {
    let remaining = sched.tasks().len();
    drop(sched);
    info!("sched: extension cleaned up, released {} task(s)", remaining);
}

fn cmd_start(sched: &Scheduler, _args: &str) {
    match sched.state() {
        RunState::Running => {
            warn!("sched: scheduler already running");
            return;
        }
        RunState::Drained => {
            warn!("sched: {}", SchedError::Drained);
            return;
        }
        RunState::Ready => {}
    }
    if sched.tasks().is_empty() {
        demo::spawn_demo_tasks(sched);
    }
    if let Err(err) = sched.start() {
        warn!("sched: {}", err);
    }
}

fn cmd_yield(sched: &Scheduler, _args: &str) {
    if let Err(err) = sched.yield_current() {
        warn!("sched: {}", err);
    }
}

fn cmd_list(sched: &Scheduler, _args: &str) {
    info!("sched: active tasks:");
    for task in sched.tasks() {
        info!(
            "sched:   id {}, name '{}', slot {}",
            task.id, task.name, task.slot
        );
    }
    match sched.current_task() {
        Some(task) => info!("sched: current task: '{}' (id {})", task.name, task.id),
        None => info!("sched: current task: none"),
    }
}

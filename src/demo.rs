//! Example workloads for the `sched_start` command.
//!
//! Illustrative only; any [`TaskEntry`] works as a task.

use log::{info, warn};

use crate::{Scheduler, TaskEntry};

/// Creates the three example tasks, reporting any failure.
pub fn spawn_demo_tasks(sched: &Scheduler) {
    let demos: [(TaskEntry, &'static str); 3] = [
        (task_a, "task-a"),
        (task_b, "task-b"),
        (task_c, "task-c"),
    ];
    for (entry, name) in demos {
        if let Err(err) = sched.spawn(entry, name) {
            warn!("sched: failed to create '{}': {}", name, err);
        }
    }
}

/// Runs five yield-separated rounds, then terminates itself.
pub extern "C" fn task_a(sched: &Scheduler) {
    for round in 0..5 {
        info!("task a: running ({})", round);
        let _ = sched.yield_current();
    }
    info!("task a: done");
    let _ = sched.terminate_current();
}

/// Runs three yield-separated rounds, then terminates itself.
pub extern "C" fn task_b(sched: &Scheduler) {
    for round in 0..3 {
        info!("task b: working ({})", round);
        let _ = sched.yield_current();
    }
    info!("task b: completed");
    let _ = sched.terminate_current();
}

/// Prints once and terminates immediately.
pub extern "C" fn task_c(sched: &Scheduler) {
    info!("task c: hello, world!");
    let _ = sched.terminate_current();
}

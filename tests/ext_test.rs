mod common;

use sched::{
    ext::{self, CommandRegistry, CommandSpec, COMMANDS},
    RunState,
};

struct RecordingRegistry {
    names: Vec<&'static str>,
}

impl CommandRegistry for RecordingRegistry {
    fn register_command(&mut self, command: &'static CommandSpec) {
        self.names.push(command.name);
    }
}

fn command(name: &str) -> &'static CommandSpec {
    COMMANDS
        .iter()
        .find(|c| c.name == name)
        .expect("unknown command")
}

#[test]
fn init_registers_the_three_commands() {
    common::init();
    let mut registry = RecordingRegistry { names: Vec::new() };

    let sched = ext::init(&mut registry);

    assert_eq!(
        registry.names,
        vec!["sched_start", "task_yield", "list_tasks"]
    );
    assert_eq!(sched.state(), RunState::Ready);
    ext::cleanup(sched);
}

#[test]
fn commands_on_an_idle_scheduler_only_report() {
    common::init();
    let mut registry = RecordingRegistry { names: Vec::new() };
    let sched = ext::init(&mut registry);

    // Advisory output only; state is untouched.
    (command("task_yield").run)(&sched, "");
    (command("list_tasks").run)(&sched, "");
    assert_eq!(sched.state(), RunState::Ready);
    assert!(sched.tasks().is_empty());

    ext::cleanup(sched);
}

#[test]
fn sched_start_runs_the_demo_workloads_to_drain() {
    common::init();
    let mut registry = RecordingRegistry { names: Vec::new() };
    let sched = ext::init(&mut registry);

    (command("sched_start").run)(&sched, "");

    assert_eq!(sched.state(), RunState::Drained);
    assert!(sched.tasks().is_empty());

    // Repeating the command reports the drained state, nothing more:
    // no replacement demo tasks are created.
    (command("sched_start").run)(&sched, "");
    (command("task_yield").run)(&sched, "");
    assert_eq!(sched.state(), RunState::Drained);
    assert!(sched.tasks().is_empty());

    ext::cleanup(sched);
}

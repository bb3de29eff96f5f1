#![allow(dead_code)]

use std::sync::Mutex;

use log::LevelFilter;

pub fn init() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(LevelFilter::Debug)
        .try_init();
}

/// Order-of-events recorder shared between a test and its tasks.
///
/// Entry functions only record; the test asserts on the collected
/// sequence after the scheduler has drained, so a mismatch fails on
/// the ordinary test stack.
pub struct Trace(Mutex<Vec<String>>);

impl Trace {
    pub const fn new() -> Self {
        Trace(Mutex::new(Vec::new()))
    }

    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

#![allow(dead_code)]

pub use deptask_test_utils::builders;
pub use deptask_test_utils::recorder::{Boom, Event, Recorder};
pub use deptask_test_utils::{init_tracing, with_timeout};

use deptask::Runner;

/// Register `(name, deps)` pairs as recorded no-op tasks.
pub fn runner_with(recorder: &Recorder, tasks: &[(&str, &[&str])]) -> Runner {
    let mut runner = Runner::new();
    for (name, deps) in tasks {
        runner.must_add(*name, recorder.ok(name), deps);
    }
    runner
}

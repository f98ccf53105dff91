mod common;
use crate::common::{Recorder, init_tracing, with_timeout};

use std::error::Error;
use std::sync::{Arc, Mutex};

use deptask::dag::TaskStatus;
use deptask::{RunHooks, Runner, TaskContext};

type TestResult = Result<(), Box<dyn Error>>;

/// `(hook, task, skipped, failed)` as seen by the hooks.
type HookLog = Arc<Mutex<Vec<(&'static str, String, bool, bool)>>>;

fn recording_hooks(log: &HookLog) -> RunHooks {
    let pre_log = Arc::clone(log);
    let post_log = Arc::clone(log);
    RunHooks::new()
        .on_start(move |name| {
            pre_log
                .lock()
                .unwrap()
                .push(("pre", name.to_string(), false, false));
        })
        .on_finish(move |name, skipped, err| {
            post_log
                .lock()
                .unwrap()
                .push(("post", name.to_string(), skipped, err.is_some()));
        })
}

fn hooked_runner(rec: &Recorder, log: &HookLog) -> Result<Runner, Box<dyn Error>> {
    let mut runner = Runner::with_hooks(recording_hooks(log));
    runner.add("a", rec.ok("a"), &[])?;
    runner.add("b", rec.ok("b"), &["a"])?;
    runner.add("c", rec.fail("c", "c"), &["b"])?;
    Ok(runner)
}

#[tokio::test]
async fn hooks_see_executed_and_skipped_tasks() -> TestResult {
    init_tracing();
    let rec = Recorder::new();
    let log: HookLog = Arc::default();
    let mut runner = hooked_runner(&rec, &log)?;
    runner.skip(&["a"]);

    let result = runner.run_sync(&TaskContext::new()).await;
    assert!(result.is_err());

    let seen = log.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            ("post", "a".to_string(), true, false),
            ("pre", "b".to_string(), false, false),
            ("post", "b".to_string(), false, false),
            ("pre", "c".to_string(), false, false),
            ("post", "c".to_string(), false, true),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn hooks_are_not_called_for_memoized_results() -> TestResult {
    init_tracing();
    let rec = Recorder::new();
    let log: HookLog = Arc::default();
    let mut runner = hooked_runner(&rec, &log)?;
    let ctx = TaskContext::new();

    with_timeout(runner.run_some(&ctx, &["b"])).await?;
    let after_first = log.lock().unwrap().len();
    assert_eq!(after_first, 4);

    with_timeout(runner.run_some(&ctx, &["b"])).await?;
    assert_eq!(log.lock().unwrap().len(), after_first);
    Ok(())
}

#[tokio::test]
async fn skipped_task_counts_as_success_for_dependents() -> TestResult {
    init_tracing();
    let rec = Recorder::new();
    let mut runner = Runner::new();
    runner.add("broken", rec.fail("broken", "never"), &[])?;
    runner.add("user", rec.ok("user"), &["broken"])?;
    runner.skip(&["broken"]);

    with_timeout(runner.run(&TaskContext::new())).await?;

    assert_eq!(rec.started(), vec!["user"]);
    assert!(matches!(runner.status("broken")?, TaskStatus::Skipped));
    assert!(matches!(runner.status("user")?, TaskStatus::Succeeded));
    Ok(())
}

#[tokio::test]
async fn skip_after_execution_is_ignored() -> TestResult {
    init_tracing();
    let rec = Recorder::new();
    let mut runner = Runner::new();
    runner.add("a", rec.ok("a"), &[])?;

    runner.run_sync(&TaskContext::new()).await?;
    runner.skip(&["a"]);

    assert!(!runner.skipped("a")?);
    assert!(matches!(runner.status("a")?, TaskStatus::Succeeded));
    Ok(())
}

#[tokio::test]
async fn skip_before_validation_still_applies() -> TestResult {
    init_tracing();
    let rec = Recorder::new();
    let mut runner = Runner::new();
    runner.add("a", rec.ok("a"), &["b"])?;
    runner.skip(&["a"]);
    runner.add("b", rec.ok("b"), &[])?;

    runner.run_sync(&TaskContext::new()).await?;

    assert_eq!(rec.started(), vec!["b"]);
    assert!(runner.skipped("a")?);
    Ok(())
}

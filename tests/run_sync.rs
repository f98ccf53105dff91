mod common;
use crate::common::{Boom, Recorder, init_tracing, runner_with, with_timeout};

use std::error::Error;

use deptask::dag::TaskStatus;
use deptask::errors::RunnerError;
use deptask::{Runner, TaskContext};

type TestResult = Result<(), Box<dyn Error>>;

fn chain(rec: &Recorder) -> Runner {
    runner_with(
        rec,
        &[
            ("a", &[]),
            ("b", &["a"]),
            ("c", &["b"]),
            ("d", &["c"]),
            ("e", &["d"]),
        ],
    )
}

#[tokio::test]
async fn partial_runs_resume_where_the_last_one_stopped() -> TestResult {
    init_tracing();
    let rec = Recorder::new();
    let mut runner = chain(&rec);
    let ctx = TaskContext::new();

    runner.run_some_sync(&ctx, &["c"]).await?;
    assert_eq!(rec.started(), vec!["a", "b", "c"]);

    rec.clear();
    runner.run_some_sync(&ctx, &["c"]).await?;
    assert!(rec.started().is_empty(), "re-run must not invoke anything");

    rec.clear();
    runner.run_some_sync(&ctx, &["e"]).await?;
    assert_eq!(rec.started(), vec!["d", "e"]);
    Ok(())
}

#[tokio::test]
async fn skipped_tasks_are_passed_over() -> TestResult {
    init_tracing();
    let rec = Recorder::new();
    let mut runner = chain(&rec);
    let ctx = TaskContext::new();

    // "s" is unknown and ignored.
    runner.skip(&["s", "e", "a"]);
    runner.run_some_sync(&ctx, &["e"]).await?;

    assert_eq!(rec.started(), vec!["b", "c", "d"]);
    assert!(runner.skipped("a")?);
    assert!(runner.skipped("e")?);
    assert!(!runner.skipped("b")?);
    Ok(())
}

#[tokio::test]
async fn full_run_respects_every_dependency() -> TestResult {
    init_tracing();
    let graph: &[(&str, &[&str])] = &[
        ("a", &[]),
        ("b", &[]),
        ("c", &[]),
        ("d", &["a"]),
        ("e", &["b"]),
        ("f", &["d", "b"]),
        ("g", &["e", "c"]),
        ("h", &["f", "g"]),
        ("i", &["c"]),
    ];
    let rec = Recorder::new();
    let mut runner = runner_with(&rec, graph);

    runner.run_sync(&TaskContext::new()).await?;

    assert_eq!(rec.started().len(), graph.len());
    for (name, deps) in graph {
        for dep in deps.iter() {
            assert!(
                rec.finished_before_started(dep, name),
                "{dep} must finish before {name} starts: {:?}",
                rec.events()
            );
        }
    }
    Ok(())
}

#[tokio::test]
async fn failure_is_returned_verbatim_and_dependents_never_run() -> TestResult {
    init_tracing();
    let rec = Recorder::new();
    let mut runner = Runner::new();
    runner.add("b", rec.fail("b", "b broke"), &[])?;
    runner.add("a", rec.ok("a"), &["b"])?;

    let err = runner.run_sync(&TaskContext::new()).await.unwrap_err();

    let failure = err.task_failure().expect("task failure");
    assert_eq!(failure.downcast_ref::<Boom>(), Some(&Boom("b broke")));
    assert_eq!(rec.count("a"), 0);
    assert!(matches!(runner.status("a")?, TaskStatus::Pending));
    assert!(matches!(runner.status("b")?, TaskStatus::Failed(_)));
    Ok(())
}

#[tokio::test]
async fn first_failure_stops_the_run() -> TestResult {
    init_tracing();
    let rec = Recorder::new();
    let mut runner = Runner::new();
    runner.add("a", rec.fail("a", "first"), &[])?;
    runner.add("b", rec.ok("b"), &[])?;
    runner.add("c", rec.ok("c"), &[])?;

    // Independent tasks run in name order within a layer.
    let err = runner.run_sync(&TaskContext::new()).await.unwrap_err();

    assert!(err.task_failure().is_some());
    assert_eq!(rec.started(), vec!["a"]);
    Ok(())
}

#[tokio::test]
async fn later_runs_inherit_a_recorded_failure() -> TestResult {
    init_tracing();
    let rec = Recorder::new();
    let mut runner = Runner::new();
    runner.add("base", rec.fail("base", "base"), &[])?;
    runner.add("mid", rec.ok("mid"), &["base"])?;
    runner.add("top", rec.ok("top"), &["mid"])?;
    let ctx = TaskContext::new();

    let first = runner.run_some_sync(&ctx, &["base"]).await.unwrap_err();
    let second = runner.run_some_sync(&ctx, &["top"]).await.unwrap_err();

    let (Some(first), Some(second)) = (first.task_failure(), second.task_failure()) else {
        panic!("both runs must surface the task failure");
    };
    assert!(first.ptr_eq(second), "the very same error must be returned");
    assert_eq!(rec.started(), vec!["base"]);
    Ok(())
}

#[tokio::test]
async fn panicking_task_fails_the_run_without_unwinding() -> TestResult {
    init_tracing();
    let rec = Recorder::new();
    let mut runner = Runner::new();
    runner.add(
        "boom",
        |_ctx: TaskContext| async move {
            if true {
                panic!("sequential work panicked");
            }
            anyhow::Ok(())
        },
        &[],
    )?;
    runner.add("after", rec.ok("after"), &["boom"])?;
    let ctx = TaskContext::new();

    let err = with_timeout(runner.run_sync(&ctx)).await.unwrap_err();
    assert!(err.to_string().contains("sequential work panicked"), "{err}");
    assert!(matches!(runner.status("boom")?, TaskStatus::Failed(_)));

    // The panic is memoized like any other failure.
    let again = with_timeout(runner.run_sync(&ctx)).await.unwrap_err();
    let (Some(first), Some(second)) = (err.task_failure(), again.task_failure()) else {
        panic!("both runs must surface the panic as a task failure");
    };
    assert!(first.ptr_eq(second));
    assert_eq!(rec.count("after"), 0);
    Ok(())
}

#[tokio::test]
async fn cancelled_context_runs_nothing() -> TestResult {
    init_tracing();
    let rec = Recorder::new();
    let mut runner = chain(&rec);
    let ctx = TaskContext::new();
    ctx.cancel();

    let err = with_timeout(runner.run_sync(&ctx)).await.unwrap_err();

    assert!(err.is_cancelled());
    assert!(rec.events().is_empty());
    Ok(())
}

#[tokio::test]
async fn unknown_requested_names_are_ignored() -> TestResult {
    init_tracing();
    let rec = Recorder::new();
    let mut runner = chain(&rec);

    runner
        .run_some_sync(&TaskContext::new(), &["b", "nope"])
        .await?;

    assert_eq!(rec.started(), vec!["a", "b"]);
    Ok(())
}

#[tokio::test]
async fn requested_name_without_dependencies_runs_alone() -> TestResult {
    let rec = Recorder::new();
    let mut runner = chain(&rec);

    runner.run_some_sync(&TaskContext::new(), &["a"]).await?;

    assert_eq!(rec.started(), vec!["a"]);
    assert!(matches!(runner.status("b")?, TaskStatus::Pending));
    Ok(())
}

#[test]
fn status_of_unknown_task_is_an_error() {
    let runner = Runner::new();
    assert!(matches!(
        runner.status("ghost"),
        Err(RunnerError::MissingTask(ref name)) if name == "ghost"
    ));
    assert!(matches!(
        runner.skipped("ghost"),
        Err(RunnerError::MissingTask(_))
    ));
}

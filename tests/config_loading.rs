mod common;
use crate::common::builders::{ConfigFileBuilder, TaskConfigBuilder};
use crate::common::init_tracing;

use std::error::Error;
use std::io::Write;

use deptask::config::{ConfigFile, load_and_validate, load_from_str};
use deptask::dag::TaskStatus;
use deptask::errors::{DeptaskError, RunnerError};
use deptask::types::ExecutionMode;

type TestResult = Result<(), Box<dyn Error>>;

const PIPELINE: &str = r#"
[config]
mode = "sequential"

[task.fetch]
cmd = "echo fetch"

[task.build]
cmd = "echo build"
after = ["fetch"]

[task.docs]
cmd = "echo docs"
after = ["build"]
skip = true
"#;

#[test]
fn pipeline_file_loads_from_disk() -> TestResult {
    init_tracing();
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(PIPELINE.as_bytes())?;

    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.config.mode, ExecutionMode::Sequential);
    assert_eq!(cfg.task.len(), 3);
    assert_eq!(cfg.task["build"].after, vec!["fetch".to_string()]);
    assert!(cfg.task["docs"].skip);
    assert!(!cfg.task["fetch"].skip);
    Ok(())
}

#[test]
fn mode_defaults_to_concurrent() -> TestResult {
    let raw = load_from_str(
        r#"
[task.only]
cmd = "true"
"#,
    )?;
    let cfg = ConfigFile::try_from(raw)?;

    assert_eq!(cfg.config.mode, ExecutionMode::Concurrent);
    assert!(cfg.task["only"].after.is_empty());
    Ok(())
}

#[test]
fn unknown_mode_is_a_parse_error() {
    let result = load_from_str(
        r#"
[config]
mode = "parallel"

[task.a]
cmd = "true"
"#,
    );
    assert!(matches!(result, Err(DeptaskError::TomlError(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = load_and_validate(dir.path().join("Deptask.toml"));
    assert!(matches!(result, Err(DeptaskError::IoError(_))));
}

#[test]
fn empty_pipeline_is_rejected() {
    let raw = load_from_str("").expect("empty TOML parses");
    let err = ConfigFile::try_from(raw).unwrap_err();
    assert!(matches!(err, DeptaskError::ConfigError(_)));
}

#[test]
fn empty_command_is_rejected() {
    let err = ConfigFileBuilder::new()
        .command("ok", "true")
        .command("a", "   ")
        .try_build()
        .unwrap_err();
    assert!(err.to_string().contains("'a'"), "unexpected error: {err}");
}

#[test]
fn runner_mirrors_the_pipeline() -> TestResult {
    let cfg = ConfigFileBuilder::new()
        .with_mode(ExecutionMode::Sequential)
        .command("fetch", "echo fetch")
        .with_task(
            "build",
            TaskConfigBuilder::new("echo build").after("fetch").build(),
        )
        .with_task(
            "docs",
            TaskConfigBuilder::new("echo docs")
                .after("build")
                .skip(true)
                .build(),
        )
        .build();

    let mut runner = cfg.build_runner()?;

    assert_eq!(cfg.config.mode, ExecutionMode::Sequential);
    assert_eq!(runner.len(), 3);
    assert_eq!(runner.dependencies_of("build"), ["fetch".to_string()]);
    assert!(runner.skipped("docs")?);
    assert!(matches!(runner.status("fetch")?, TaskStatus::Pending));
    runner.validate()?;
    Ok(())
}

#[test]
fn dangling_after_is_caught_by_the_runner() -> TestResult {
    let cfg = ConfigFileBuilder::new()
        .with_task("a", TaskConfigBuilder::new("true").after("ghost").build())
        .build();

    let mut runner = cfg.build_runner()?;
    assert!(matches!(
        runner.validate(),
        Err(RunnerError::MissingDependency(ref dep)) if dep == "ghost"
    ));
    Ok(())
}

#[test]
fn execution_mode_parses_from_text() {
    assert_eq!(
        "Sequential".parse::<ExecutionMode>(),
        Ok(ExecutionMode::Sequential)
    );
    assert_eq!(
        " concurrent ".parse::<ExecutionMode>(),
        Ok(ExecutionMode::Concurrent)
    );
    assert!("both".parse::<ExecutionMode>().is_err());
    assert_eq!(ExecutionMode::Sequential.to_string(), "sequential");
}

// Environment variables are process-wide, so everything that touches
// DEPTASK_LOG lives in this one test binary and in a single test.

use deptask::cli::LogLevel;
use deptask::logging::{LOG_ENV, build_filter};

#[test]
fn log_filter_resolution_order() {
    // SAFETY: no other test in this binary reads or writes the environment.
    unsafe { std::env::remove_var(LOG_ENV) };
    assert_eq!(build_filter(None).to_string(), "info");

    unsafe { std::env::set_var(LOG_ENV, "deptask=debug") };
    assert_eq!(build_filter(None).to_string(), "deptask=debug");

    // The command line wins over the environment.
    assert_eq!(build_filter(Some(LogLevel::Warn)).to_string(), "warn");

    unsafe { std::env::set_var(LOG_ENV, "deptask=notalevel") };
    assert_eq!(
        build_filter(None).to_string(),
        "info",
        "an unparsable directive falls back to info"
    );

    unsafe { std::env::remove_var(LOG_ENV) };
}

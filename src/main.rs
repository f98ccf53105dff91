// src/main.rs

use std::process::ExitCode;

use deptask::{cli, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("deptask: {err:#}");
        return ExitCode::FAILURE;
    }

    match deptask::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("deptask: {err:#}");
            ExitCode::FAILURE
        }
    }
}

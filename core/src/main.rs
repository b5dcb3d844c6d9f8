use std::io;
use std::process::ExitCode;

use env_logger::Env;
use log::error;

use http_task_core::{input, Executor, TaskResult};

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let result = match input::read_spec(io::stdin().lock(), std::env::vars()) {
        Ok(spec) => Executor::new().execute(&spec),
        Err(err) => TaskResult::from(err),
    };

    match serde_json::to_string(&result) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            error!("cannot serialize result: {err}");
            return ExitCode::FAILURE;
        }
    }

    if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

use std::process::ExitCode;

use player_api_suite::{Config, SuiteSettings, logging, run_suite};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let result = match Config::load() {
        Ok(config) => run_suite(&config, SuiteSettings::default())
            .await
            .and_then(|report| report.into_result()),
        Err(err) => Err(err.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

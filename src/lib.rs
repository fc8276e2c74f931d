pub mod advisor;
pub mod cli;
pub mod command;
pub mod config;
pub mod db_types;
pub mod error;
pub mod mssql;
pub mod resolver;

#[cfg(test)]
mod test_support;

use crate::cli::Invocation;
use crate::config::Settings;
use crate::error::TuneError;
use clap::ArgMatches;

pub async fn run(matches: ArgMatches) -> Result<(), TuneError> {
    match cli::parse_invocation(&matches)? {
        Invocation::Tune(args) => {
            let settings = Settings::from_env()?;
            command::run_tune_command(&args, &settings).await
        }
    }
}

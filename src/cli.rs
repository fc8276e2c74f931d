// =====================================================
// COMMAND LINE
// The command tree is assembled by registration functions that each receive
// their parent command, so categories can be mounted anywhere.
// =====================================================

use crate::command::TuneArgs;
use crate::error::TuneError;
use clap::{Arg, ArgAction, ArgMatches, Command};

pub enum Invocation {
    Tune(TuneArgs),
}

pub fn build_cli() -> Command {
    let root = Command::new("sqltune")
        .about("Finds missing indexes on Azure SQL databases backing mobile services")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true);
    register(root)
}

/// Mounts the `mobile` category on `parent`.
pub fn register(parent: Command) -> Command {
    let mobile = Command::new("mobile")
        .about("Commands to manage your Mobile Services")
        .subcommand_required(true)
        .arg_required_else_help(true);
    parent.subcommand(register_mobile(mobile))
}

pub fn register_mobile(mobile: Command) -> Command {
    let sqldb = Command::new("sqldb")
        .about("Commands to manage SQL Database")
        .subcommand_required(true)
        .arg_required_else_help(true);
    mobile.subcommand(register_sqldb(sqldb))
}

pub fn register_sqldb(sqldb: Command) -> Command {
    sqldb.subcommand(tune_command())
}

pub fn tune_command() -> Command {
    Command::new("tune")
        .about("Give the database a tuneup by creating missing indexes")
        .arg(
            Arg::new("servicename")
                .help("Mobile service whose database should be tuned")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("username")
                .help("SQL login name")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::new("password")
                .help("SQL login password")
                .required(true)
                .index(3),
        )
        .arg(
            Arg::new("create-indexes")
                .help("execute CREATE INDEX statements to create the missing indexes")
                .short('i')
                .long("create-indexes")
                .alias("createIndexes")
                .action(ArgAction::SetTrue),
        )
}

fn required_arg(matches: &ArgMatches, name: &str) -> Result<String, TuneError> {
    matches
        .get_one::<String>(name)
        .cloned()
        .ok_or_else(|| TuneError::ConfigResolution(format!("Missing argument <{}>", name)))
}

pub fn tune_args(matches: &ArgMatches) -> Result<TuneArgs, TuneError> {
    Ok(TuneArgs {
        service_name: required_arg(matches, "servicename")?,
        username: required_arg(matches, "username")?,
        password: required_arg(matches, "password")?,
        create_indexes: matches.get_flag("create-indexes"),
    })
}

pub fn parse_invocation(matches: &ArgMatches) -> Result<Invocation, TuneError> {
    let tune = matches
        .subcommand_matches("mobile")
        .and_then(|m| m.subcommand_matches("sqldb"))
        .and_then(|m| m.subcommand_matches("tune"));

    match tune {
        Some(tune) => Ok(Invocation::Tune(tune_args(tune)?)),
        None => Err(TuneError::ConfigResolution("Unknown command".to_string())),
    }
}

/// `info` by default; `RUST_LOG` overrides.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    let _ = env_logger::Builder::from_env(env)
        .format_target(false)
        .format_timestamp(None)
        .try_init();
}

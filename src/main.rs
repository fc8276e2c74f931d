#[tokio::main(flavor = "current_thread")]
async fn main() {
    sqltune_lib::cli::init_logging();
    let matches = sqltune_lib::cli::build_cli().get_matches();

    if let Err(e) = sqltune_lib::run(matches).await {
        log::error!("{}", e);
        std::process::exit(e.exit_code());
    }
}

use clap::Parser;

mod cli;
pub mod exit_codes;
mod logging;

use brickq_client::QueryError;
use cli::args::Cli;
use cli::commands::dispatch;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:#}");
            exit_code_for(&e)
        }
    };
    std::process::exit(code);
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<QueryError>()
        .map_or(exit_codes::EXIT_CONFIG_ERROR, QueryError::exit_code)
}

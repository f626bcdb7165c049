//! Snippetbox CLI - store, search and filter code snippets from the terminal

mod auth;
mod cli;
mod commands;
mod error;


use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::auth_cmd::run_auth;
use crate::commands::common::load_env_files;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::facets::run_facets;
use crate::commands::list::run_list;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        for line in error.render() {
            eprintln!("{line}");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    load_env_files();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("snippetbox=info".parse().map_err(|_| {
                    CliError::Config("invalid default log directive".to_string())
                })?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Auth { command }) => run_auth(command).await?,
        Some(Commands::List(args)) => run_list(args).await?,
        Some(Commands::Add(args)) => run_add(args).await?,
        Some(Commands::Edit(args)) => run_edit(args).await?,
        Some(Commands::Delete { id }) => run_delete(&id).await?,
        Some(Commands::Facets { json }) => run_facets(json).await?,
        None => {
            Cli::command().print_help().map_err(CliError::Io)?;
            println!();
        }
    }

    Ok(())
}

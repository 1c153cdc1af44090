//! CLI entry point.
//!
//! Parses arguments, installs logging, bootstraps the context and dispatches
//! to handlers. Errors are printed once here and mapped to exit codes.

use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use dectool_cli::handlers::{self, call::CallArgs, servers, tools::SetToolArgs};
use dectool_cli::{
    Cli, CliConfig, CliError, Commands, ResultsCommand, ServersCommand, ToolsCommand, bootstrap,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables (secrets, RUST_LOG, DECTOOL_DATA_DIR)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let ctx = bootstrap(CliConfig::with_data_dir(cli.data_dir))
        .context("Failed to initialise dectool")?;

    match command {
        Commands::Paths => handlers::paths::execute(&ctx)?,
        Commands::Servers { command } => match command {
            ServersCommand::List => servers::list(&ctx).await?,
            ServersCommand::Show { server } => servers::show(&ctx, &server).await?,
            ServersCommand::AddStdio {
                name,
                command,
                args,
                env,
                cwd,
                description,
                disabled,
            } => {
                let args = servers::AddStdioArgs {
                    name,
                    command,
                    args,
                    env,
                    cwd,
                    description,
                    disabled,
                };
                servers::add_stdio(&ctx, args).await?;
            }
            ServersCommand::AddHttp {
                name,
                url,
                sse,
                headers,
                auth,
                secret_ref,
                description,
                disabled,
            } => {
                let args = servers::AddHttpArgs {
                    name,
                    url,
                    sse,
                    headers,
                    auth: auth.map(Into::into),
                    secret_ref,
                    description,
                    disabled,
                };
                servers::add_http(&ctx, args).await?;
            }
            ServersCommand::Remove { server } => servers::remove(&ctx, &server).await?,
            ServersCommand::Enable { server } => servers::set_enabled(&ctx, &server, true).await?,
            ServersCommand::Disable { server } => {
                servers::set_enabled(&ctx, &server, false).await?;
            }
        },
        Commands::Tools { command } => match command {
            ToolsCommand::List { server } => handlers::tools::list(&ctx, &server).await?,
            ToolsCommand::Set {
                server,
                tool,
                enabled,
                mode,
                mappings,
                defaults,
                display_name,
                description,
            } => {
                let args = SetToolArgs {
                    server,
                    tool,
                    enabled,
                    mode: mode.map(Into::into),
                    mappings,
                    defaults,
                    display_name,
                    description,
                };
                handlers::tools::set(&ctx, args).await?;
            }
        },
        Commands::Discover { server } => handlers::discover::execute(&ctx, &server).await?,
        Commands::Call {
            server,
            tool,
            args,
            owner,
        } => {
            let args = CallArgs {
                server,
                tool,
                args,
                owner,
            };
            handlers::call::execute(&ctx, args).await?;
        }
        Commands::Results { command } => match command {
            ResultsCommand::List { owner } => {
                handlers::results::list(&ctx, owner.as_deref()).await?;
            }
            ResultsCommand::Show { id } => handlers::results::show(&ctx, &id).await?,
            ResultsCommand::Delete { id } => handlers::results::delete(&ctx, &id).await?,
            ResultsCommand::Purge { owner } => handlers::results::purge(&ctx, &owner).await?,
        },
    }

    Ok(())
}

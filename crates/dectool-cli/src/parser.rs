//! Root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Manage MCP tool servers and call their tools.
#[derive(Parser)]
#[command(name = "dectool")]
#[command(about = "Catalog, discover and call MCP tool servers")]
#[command(version)]
pub struct Cli {
    /// Override the data directory for this invocation
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{ServersCommand, ToolsCommand};
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from(["dectool", "--verbose", "--data-dir", "/tmp/dt", "servers", "list"]);
        assert!(cli.verbose);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/dt")));
        assert!(matches!(
            cli.command,
            Some(Commands::Servers {
                command: ServersCommand::List
            })
        ));
    }

    #[test]
    fn test_add_stdio_passes_trailing_args() {
        let cli = Cli::parse_from([
            "dectool",
            "servers",
            "add-stdio",
            "files",
            "npx",
            "--env",
            "ROOT=/srv",
            "--",
            "-y",
            "@modelcontextprotocol/server-filesystem",
        ]);
        let Some(Commands::Servers {
            command: ServersCommand::AddStdio { command, args, env, .. },
        }) = cli.command
        else {
            panic!("expected add-stdio");
        };
        assert_eq!(command, "npx");
        assert_eq!(args, vec!["-y", "@modelcontextprotocol/server-filesystem"]);
        assert_eq!(env, vec!["ROOT=/srv"]);
    }

    #[test]
    fn test_tools_set_repeatable_flags() {
        let cli = Cli::parse_from([
            "dectool", "tools", "set", "web", "search", "--mode", "per-persona", "--map",
            "q=problem_statement", "--map", "topic=title", "--default", "limit=5",
        ]);
        let Some(Commands::Tools {
            command: ToolsCommand::Set { mappings, defaults, mode, .. },
        }) = cli.command
        else {
            panic!("expected tools set");
        };
        assert_eq!(mappings.len(), 2);
        assert_eq!(defaults, vec!["limit=5"]);
        assert!(mode.is_some());
    }
}

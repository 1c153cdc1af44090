//! Commands and their subcommands.

use clap::{Subcommand, ValueEnum};

use dectool_core::domain::{AuthKind, ExecutionMode};

/// Available dectool commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Show resolved paths for the data directory, catalog, results and settings
    Paths,

    /// Manage tool servers in the catalog
    Servers {
        #[command(subcommand)]
        command: ServersCommand,
    },

    /// Inspect and configure a server's tools
    Tools {
        #[command(subcommand)]
        command: ToolsCommand,
    },

    /// Connect to a server and refresh its tool list
    Discover {
        /// Server ID or name
        server: String,
    },

    /// Call one tool and store a successful result
    Call {
        /// Server ID or name
        server: String,
        /// Tool name
        tool: String,
        /// Arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
        /// Decision record that owns the stored result
        #[arg(long)]
        owner: Option<String>,
    },

    /// Browse stored tool results
    Results {
        #[command(subcommand)]
        command: ResultsCommand,
    },
}

/// Server catalog commands.
#[derive(Subcommand)]
pub enum ServersCommand {
    /// List all servers
    List,
    /// Show one server with its tools
    Show {
        /// Server ID or name
        server: String,
    },
    /// Add a server launched as a local child process
    AddStdio {
        /// Unique server name
        name: String,
        /// Executable to launch
        command: String,
        /// Arguments passed to the executable (after `--`)
        #[arg(last = true)]
        args: Vec<String>,
        /// Environment variable for the process (repeatable)
        #[arg(long = "env", value_name = "KEY=VALUE")]
        env: Vec<String>,
        /// Working directory for the process
        #[arg(long)]
        cwd: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Add the server disabled
        #[arg(long)]
        disabled: bool,
    },
    /// Add a remote HTTP server
    AddHttp {
        /// Unique server name
        name: String,
        /// Base URL; `/mcp` is appended when missing
        url: String,
        /// Mark the server as an SSE server
        #[arg(long)]
        sse: bool,
        /// Static request header (repeatable)
        #[arg(long = "header", value_name = "NAME=VALUE")]
        headers: Vec<String>,
        /// Authentication scheme
        #[arg(long, value_enum)]
        auth: Option<AuthArg>,
        /// Opaque reference handed to the credential service
        #[arg(long)]
        secret_ref: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Add the server disabled
        #[arg(long)]
        disabled: bool,
    },
    /// Remove a server from the catalog
    Remove {
        /// Server ID or name
        server: String,
    },
    /// Offer this server's tools to orchestration
    Enable {
        /// Server ID or name
        server: String,
    },
    /// Stop offering this server's tools to orchestration
    Disable {
        /// Server ID or name
        server: String,
    },
}

/// Tool configuration commands.
#[derive(Subcommand)]
pub enum ToolsCommand {
    /// List the configured tools of a server
    List {
        /// Server ID or name
        server: String,
    },
    /// Update one tool's configuration
    Set {
        /// Server ID or name
        server: String,
        /// Tool name
        tool: String,
        /// Enabled by default for new decisions
        #[arg(long)]
        enabled: Option<bool>,
        /// When the tool is offered
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Map an argument to a context field (repeatable)
        #[arg(long = "map", value_name = "ARG=FIELD")]
        mappings: Vec<String>,
        /// Default argument value as JSON (repeatable)
        #[arg(long = "default", value_name = "KEY=JSON")]
        defaults: Vec<String>,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
}

/// Stored result commands.
#[derive(Subcommand)]
pub enum ResultsCommand {
    /// List stored results, oldest first
    List {
        /// Only results owned by this decision record
        #[arg(long)]
        owner: Option<String>,
    },
    /// Show one stored result
    Show { id: String },
    /// Delete one stored result
    Delete { id: String },
    /// Delete every result owned by a decision record
    Purge {
        /// Owning decision record
        owner: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthArg {
    Bearer,
    ApiKey,
    Oauth,
}

impl From<AuthArg> for AuthKind {
    fn from(arg: AuthArg) -> Self {
        match arg {
            AuthArg::Bearer => Self::Bearer,
            AuthArg::ApiKey => Self::ApiKey,
            AuthArg::Oauth => Self::OAuth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    InitialOnly,
    PerPersona,
}

impl From<ModeArg> for ExecutionMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::InitialOnly => Self::InitialOnly,
            ModeArg::PerPersona => Self::PerPersona,
        }
    }
}

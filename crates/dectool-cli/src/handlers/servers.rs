//! Server catalog handlers.

use dectool_core::domain::{
    AuthConfig, AuthKind, ExecutionMode, NewServerConfig, ServerConfig, TransportKind,
};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::{parse_pair, resolve_server};
use crate::presentation::{format_optional, print_separator, truncate_string};

/// Arguments for `servers add-stdio`.
pub struct AddStdioArgs {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: Vec<String>,
    pub cwd: Option<String>,
    pub description: Option<String>,
    pub disabled: bool,
}

/// Arguments for `servers add-http`.
pub struct AddHttpArgs {
    pub name: String,
    pub url: String,
    pub sse: bool,
    pub headers: Vec<String>,
    pub auth: Option<AuthKind>,
    pub secret_ref: Option<String>,
    pub description: Option<String>,
    pub disabled: bool,
}

pub async fn list(ctx: &CliContext) -> Result<(), CliError> {
    let servers = ctx.repos.catalog.list().await?;
    if servers.is_empty() {
        println!("No tool servers in the catalog.");
        println!("Use 'dectool servers add-stdio' or 'dectool servers add-http' to add one.");
        return Ok(());
    }

    println!(
        "{:<36} {:<20} {:<6} {:<8} {:<6} Target",
        "ID", "Name", "Kind", "Enabled", "Tools"
    );
    print_separator(110);
    for server in &servers {
        println!(
            "{:<36} {:<20} {:<6} {:<8} {:<6} {}",
            server.id,
            truncate_string(&server.name, 20),
            server.transport.to_string(),
            if server.enabled { "yes" } else { "no" },
            server.tools.len(),
            truncate_string(&target(server), 40)
        );
    }
    Ok(())
}

pub async fn show(ctx: &CliContext, identifier: &str) -> Result<(), CliError> {
    let server = resolve_server(ctx, identifier).await?;

    println!("ID:          {}", server.id);
    println!("Name:        {}", server.name);
    if !server.description.is_empty() {
        println!("Description: {}", server.description);
    }
    println!("Transport:   {}", server.transport);
    println!("Target:      {}", target(&server));
    println!("Enabled:     {}", server.enabled);
    if let Some(auth) = &server.auth {
        println!("Auth:        {:?}", auth.kind);
    }
    println!(
        "Discovered:  {}",
        format_optional(server.last_discovered_at.as_ref(), "never")
    );
    println!("Tools:       {}", server.tools.len());
    for tool in &server.tools {
        println!(
            "  - {} [{}] {}",
            tool.label(),
            mode_label(tool.execution_mode),
            tool.description.as_deref().unwrap_or_default()
        );
    }
    Ok(())
}

pub async fn add_stdio(ctx: &CliContext, args: AddStdioArgs) -> Result<ServerConfig, CliError> {
    let mut new_server = NewServerConfig::new_stdio(args.name, args.command, args.args);
    for raw in &args.env {
        let (key, value) = parse_pair(raw)?;
        new_server = new_server.with_env(key, value);
    }
    if let Some(dir) = args.cwd {
        new_server = new_server.with_working_dir(dir);
    }
    finish_add(ctx, new_server, args.description, args.disabled).await
}

pub async fn add_http(ctx: &CliContext, args: AddHttpArgs) -> Result<ServerConfig, CliError> {
    let mut new_server = if args.sse {
        NewServerConfig::new_sse(args.name, args.url)
    } else {
        NewServerConfig::new_http(args.name, args.url)
    };
    for raw in &args.headers {
        let (key, value) = parse_pair(raw)?;
        new_server = new_server.with_header(key, value);
    }
    if let Some(kind) = args.auth {
        let mut auth = AuthConfig::new(kind);
        if let Some(reference) = args.secret_ref {
            auth = auth.with_secret_ref(reference);
        }
        new_server = new_server.with_auth(auth);
    } else if args.secret_ref.is_some() {
        return Err(CliError::Arguments(
            "--secret-ref requires --auth".to_string(),
        ));
    }
    finish_add(ctx, new_server, args.description, args.disabled).await
}

async fn finish_add(
    ctx: &CliContext,
    mut new_server: NewServerConfig,
    description: Option<String>,
    disabled: bool,
) -> Result<ServerConfig, CliError> {
    if let Some(description) = description {
        new_server = new_server.with_description(description);
    }
    new_server.enabled = !disabled;
    new_server
        .connection
        .validate(new_server.transport)
        .map_err(CliError::Arguments)?;

    let server = ctx.repos.catalog.insert(new_server).await?;
    println!("Added server '{}' ({})", server.name, server.id);
    println!("Run 'dectool discover {}' to fetch its tools.", server.name);
    Ok(server)
}

pub async fn remove(ctx: &CliContext, identifier: &str) -> Result<(), CliError> {
    let server = resolve_server(ctx, identifier).await?;
    ctx.repos.catalog.delete(&server.id).await?;
    println!("Removed server '{}'", server.name);
    Ok(())
}

pub async fn set_enabled(ctx: &CliContext, identifier: &str, enabled: bool) -> Result<(), CliError> {
    let mut server = resolve_server(ctx, identifier).await?;
    if server.enabled == enabled {
        println!(
            "Server '{}' is already {}",
            server.name,
            if enabled { "enabled" } else { "disabled" }
        );
        return Ok(());
    }
    server.enabled = enabled;
    ctx.repos.catalog.update(&server).await?;
    println!(
        "Server '{}' {}",
        server.name,
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}

fn target(server: &ServerConfig) -> String {
    let conn = &server.connection;
    match server.transport {
        TransportKind::Stdio => {
            let mut parts = vec![conn.command.clone().unwrap_or_default()];
            parts.extend(conn.args.iter().cloned());
            parts.join(" ")
        }
        TransportKind::Http | TransportKind::Sse => conn.url.clone().unwrap_or_default(),
    }
}

pub(crate) const fn mode_label(mode: ExecutionMode) -> &'static str {
    match mode {
        ExecutionMode::InitialOnly => "initial-only",
        ExecutionMode::PerPersona => "per-persona",
    }
}

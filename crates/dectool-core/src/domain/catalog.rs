//! Server and tool configuration records.
//!
//! Records are stored as-is, even when partially filled in. Transport
//! requirements (a command for stdio, a URL for HTTP) are only checked when a
//! connection is built from the record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::mapping::infer_context_mappings;

/// Generate a fresh opaque identifier for catalog and result records.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Type of tool server connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Local process speaking newline-delimited JSON-RPC over stdin/stdout
    #[default]
    Stdio,
    /// Remote server speaking JSON-RPC over HTTP (JSON or one-shot SSE replies)
    Http,
    /// Same wire protocol as `Http`; kept distinct for configuration parity
    Sse,
}

impl TransportKind {
    /// Whether this transport talks to a remote endpoint.
    pub const fn is_remote(self) -> bool {
        matches!(self, Self::Http | Self::Sse)
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Stdio => "stdio",
            Self::Http => "http",
            Self::Sse => "sse",
        };
        f.write_str(label)
    }
}

/// Authentication scheme for remote servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    /// `Authorization: Bearer <token>`
    Bearer,
    /// `X-API-Key: <token>`
    ApiKey,
    /// OAuth-managed session; no header is injected by this crate
    #[serde(rename = "oauth")]
    OAuth,
}

/// Authentication descriptor.
///
/// Only an opaque reference to the encrypted secret is kept here. The
/// plaintext is resolved per connection by the credential service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Authentication scheme.
    pub kind: AuthKind,

    /// Opaque reference to the encrypted secret held by the credential service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<String>,
}

impl AuthConfig {
    /// Create an auth descriptor without a secret reference.
    pub const fn new(kind: AuthKind) -> Self {
        Self {
            kind,
            secret_ref: None,
        }
    }

    /// Attach the opaque secret reference.
    #[must_use]
    pub fn with_secret_ref(mut self, secret_ref: impl Into<String>) -> Self {
        self.secret_ref = Some(secret_ref.into());
        self
    }
}

/// Connection parameters for a tool server.
///
/// For stdio servers, `command` is required. For HTTP/SSE servers, `url` is
/// required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionParams {
    // --- Stdio server fields ---
    /// Command to execute (e.g., "npx" or "/usr/local/bin/uvx").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Arguments to pass to the command.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Extra environment variables for the child process.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    /// Working directory for the process.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,

    // --- HTTP/SSE server fields ---
    /// Base URL of the server (e.g., `http://localhost:8931`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Static headers sent with every request.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl ConnectionParams {
    /// Create stdio connection parameters.
    #[must_use]
    pub fn stdio(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: Some(command.into()),
            args,
            ..Self::default()
        }
    }

    /// Create HTTP/SSE connection parameters.
    #[must_use]
    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Validate parameters for the given transport kind.
    ///
    /// Returns an error if a required field is missing or empty.
    pub fn validate(&self, transport: TransportKind) -> Result<(), String> {
        match transport {
            TransportKind::Stdio => {
                let command = self
                    .command
                    .as_deref()
                    .ok_or_else(|| "Stdio server requires command".to_string())?;

                if command.trim().is_empty() {
                    return Err("Stdio server command cannot be empty".to_string());
                }

                Ok(())
            }
            TransportKind::Http | TransportKind::Sse => {
                let url = self
                    .url
                    .as_deref()
                    .ok_or_else(|| format!("{transport} server requires url"))?;

                if url.trim().is_empty() {
                    return Err(format!("{transport} server url cannot be empty"));
                }

                Ok(())
            }
        }
    }
}

/// When a tool runs relative to downstream consumers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Run once; the formatted context is shared by every consumer.
    #[default]
    InitialOnly,
    /// Re-selected and re-run once per consumer (e.g. per persona).
    PerPersona,
}

/// A tool as reported by a server's `tools/list`, normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name (function name).
    pub name: String,

    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// JSON Schema for input parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,

    /// Catalog name of the server that reported the tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
}

impl ToolDescriptor {
    /// Create a new tool descriptor.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: None,
            server: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Set the input schema.
    #[must_use]
    pub fn with_input_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }

    /// Label the descriptor with the server it came from.
    #[must_use]
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }
}

/// Configuration of one callable tool on a server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Name reported by the remote tool.
    pub tool_name: String,

    /// Name shown to users.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Description shown to users and to the selecting model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// When the tool runs relative to downstream consumers.
    #[serde(default)]
    pub execution_mode: ExecutionMode,

    /// Whether the tool is enabled by default for new decision records.
    #[serde(default)]
    pub default_enabled: bool,

    /// Arguments sent unless overridden.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub default_arguments: Map<String, Value>,

    /// Tool argument name -> generation-context field name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context_argument_mappings: BTreeMap<String, String>,

    /// Last discovered input schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

impl ToolConfig {
    /// Create a bare tool configuration with discovery defaults.
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            display_name: None,
            description: None,
            execution_mode: ExecutionMode::InitialOnly,
            default_enabled: false,
            default_arguments: Map::new(),
            context_argument_mappings: BTreeMap::new(),
            input_schema: None,
        }
    }

    /// Build the configuration for a tool seen for the first time.
    pub fn from_discovered(tool: &ToolDescriptor) -> Self {
        let mut config = Self::new(&tool.name);
        config.display_name = Some(humanize(&tool.name));
        config.description = tool.description.clone().filter(|d| !d.trim().is_empty());
        config.input_schema = tool.input_schema.clone();
        if let Some(schema) = &tool.input_schema {
            config.context_argument_mappings = infer_context_mappings(schema);
        }
        config
    }

    /// Merge a rediscovered tool into this configuration.
    ///
    /// Only empty user-facing fields are filled in. The input schema is
    /// always refreshed since it is not user-editable. Returns whether
    /// anything changed.
    pub fn merge_discovered(&mut self, tool: &ToolDescriptor) -> bool {
        let mut changed = false;

        if is_blank(self.display_name.as_deref()) {
            self.display_name = Some(humanize(&tool.name));
            changed = true;
        }

        if is_blank(self.description.as_deref()) {
            if let Some(desc) = tool.description.as_ref().filter(|d| !d.trim().is_empty()) {
                self.description = Some(desc.clone());
                changed = true;
            }
        }

        if self.context_argument_mappings.is_empty() {
            if let Some(schema) = &tool.input_schema {
                let inferred = infer_context_mappings(schema);
                if !inferred.is_empty() {
                    self.context_argument_mappings = inferred;
                    changed = true;
                }
            }
        }

        if tool.input_schema.is_some() && self.input_schema != tool.input_schema {
            self.input_schema.clone_from(&tool.input_schema);
            changed = true;
        }

        changed
    }

    /// Name to show users, falling back to the tool name.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(&self.tool_name)
    }
}

/// Partial update of a tool configuration.
///
/// All fields are optional - only provided fields are updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateToolConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_mode: Option<ExecutionMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_arguments: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_argument_mappings: Option<BTreeMap<String, String>>,
}

impl UpdateToolConfig {
    /// Apply the provided fields to `tool`.
    pub fn apply(self, tool: &mut ToolConfig) {
        if let Some(name) = self.display_name {
            tool.display_name = Some(name);
        }
        if let Some(desc) = self.description {
            tool.description = Some(desc);
        }
        if let Some(mode) = self.execution_mode {
            tool.execution_mode = mode;
        }
        if let Some(enabled) = self.default_enabled {
            tool.default_enabled = enabled;
        }
        if let Some(args) = self.default_arguments {
            tool.default_arguments = args;
        }
        if let Some(mappings) = self.context_argument_mappings {
            tool.context_argument_mappings = mappings;
        }
    }
}

/// A tool server that exists in the catalog with an ID.
///
/// Use `NewServerConfig` for servers that haven't been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Catalog ID of the server.
    pub id: String,

    /// User-friendly name for the server.
    pub name: String,

    /// Free-form description.
    #[serde(default)]
    pub description: String,

    /// Connection type.
    pub transport: TransportKind,

    /// Transport parameters.
    #[serde(default)]
    pub connection: ConnectionParams,

    /// Authentication for remote servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,

    /// Whether tools from this server are offered for selection.
    pub enabled: bool,

    /// Tools known for this server, in discovery order.
    #[serde(default)]
    pub tools: Vec<ToolConfig>,

    /// When the server was added.
    pub created_at: DateTime<Utc>,

    /// When the record was last written.
    pub updated_at: DateTime<Utc>,

    /// Last successful discovery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_discovered_at: Option<DateTime<Utc>>,
}

impl ServerConfig {
    /// Materialize a new server record with the given ID.
    pub fn from_new(id: impl Into<String>, new_server: NewServerConfig) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: new_server.name,
            description: new_server.description,
            transport: new_server.transport,
            connection: new_server.connection,
            auth: new_server.auth,
            enabled: new_server.enabled,
            tools: new_server.tools,
            created_at: now,
            updated_at: now,
            last_discovered_at: None,
        }
    }

    /// Look up a tool configuration by remote tool name.
    pub fn tool(&self, tool_name: &str) -> Option<&ToolConfig> {
        self.tools.iter().find(|t| t.tool_name == tool_name)
    }

    /// Mutable lookup of a tool configuration by remote tool name.
    pub fn tool_mut(&mut self, tool_name: &str) -> Option<&mut ToolConfig> {
        self.tools.iter_mut().find(|t| t.tool_name == tool_name)
    }

    /// Merge discovered tools into this server's tool list.
    ///
    /// Unknown tools are appended with inferred mappings; known tools only get
    /// their empty fields filled. Tools missing from `discovered` are kept.
    /// Returns the number of tools added.
    pub fn sync_tools(&mut self, discovered: &[ToolDescriptor]) -> usize {
        let mut added = 0;
        for tool in discovered {
            if let Some(existing) = self.tool_mut(&tool.name) {
                existing.merge_discovered(tool);
            } else {
                self.tools.push(ToolConfig::from_discovered(tool));
                added += 1;
            }
        }
        let now = Utc::now();
        self.last_discovered_at = Some(now);
        self.updated_at = now;
        added
    }
}

/// A tool server to be inserted into the catalog (no ID yet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewServerConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub transport: TransportKind,
    #[serde(default)]
    pub connection: ConnectionParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
    pub enabled: bool,
    #[serde(default)]
    pub tools: Vec<ToolConfig>,
}

impl NewServerConfig {
    /// Create a new stdio-based server.
    #[must_use]
    pub fn new_stdio(name: impl Into<String>, command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            transport: TransportKind::Stdio,
            connection: ConnectionParams::stdio(command, args),
            auth: None,
            enabled: true,
            tools: Vec::new(),
        }
    }

    /// Create a new HTTP server.
    #[must_use]
    pub fn new_http(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            transport: TransportKind::Http,
            connection: ConnectionParams::remote(url),
            auth: None,
            enabled: true,
            tools: Vec::new(),
        }
    }

    /// Create a new SSE server.
    #[must_use]
    pub fn new_sse(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            transport: TransportKind::Sse,
            ..Self::new_http(name, url)
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add an environment variable for the child process.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.connection.env.insert(key.into(), value.into());
        self
    }

    /// Add a static request header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.connection.headers.insert(key.into(), value.into());
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<String>) -> Self {
        self.connection.working_dir = Some(dir.into());
        self
    }

    /// Set authentication.
    #[must_use]
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Pre-populate a tool configuration.
    #[must_use]
    pub fn with_tool(mut self, tool: ToolConfig) -> Self {
        self.tools.push(tool);
        self
    }

    /// Set enabled status.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// `web_search` -> `Web Search`
fn humanize(tool_name: &str) -> String {
    tool_name
        .split(['_', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

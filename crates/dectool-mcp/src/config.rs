//! Transport configuration built from catalog records.
//!
//! `get_client_config` is the only place a decrypted secret exists. It goes
//! straight into a header map that is redacted in `Debug` output.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use dectool_core::domain::{AuthKind, ServerConfig, TransportKind};
use dectool_core::ports::{CredentialService, ToolServiceError};
use dectool_core::settings::{
    DEFAULT_CLIENT_NAME, DEFAULT_PROTOCOL_VERSION, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_STDIO_RESPONSE_TIMEOUT_SECS, Settings,
};

/// Header carrying an API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

const SENSITIVE_HEADERS: &[&str] = &["authorization", "x-api-key", "cookie", "proxy-authorization"];

/// Client-side knobs shared by every session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub request_timeout: Duration,
    pub stdio_response_timeout: Duration,
    pub protocol_version: String,
    pub client_name: String,
}

impl ClientOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            request_timeout: settings.request_timeout(),
            stdio_response_timeout: settings.stdio_response_timeout(),
            protocol_version: settings.effective_protocol_version().to_string(),
            client_name: settings.effective_client_name().to_string(),
        }
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            stdio_response_timeout: Duration::from_secs(DEFAULT_STDIO_RESPONSE_TIMEOUT_SECS),
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
        }
    }
}

/// Validated parameters for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportConfig {
    Stdio(StdioTransportConfig),
    Http(HttpTransportConfig),
}

impl TransportConfig {
    pub fn server_name(&self) -> &str {
        match self {
            Self::Stdio(c) => &c.server_name,
            Self::Http(c) => &c.server_name,
        }
    }
}

/// Local child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StdioTransportConfig {
    pub server_name: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub working_dir: Option<String>,
}

/// Remote HTTP endpoint (used for both `http` and `sse` servers).
#[derive(Clone, PartialEq, Eq)]
pub struct HttpTransportConfig {
    pub server_name: String,
    pub url: String,
    /// Static headers plus the injected auth header.
    pub headers: BTreeMap<String, String>,
    /// The server authenticates through OAuth; no header was injected.
    pub oauth: bool,
}

impl fmt::Debug for HttpTransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: BTreeMap<&str, &str> = self
            .headers
            .iter()
            .map(|(k, v)| {
                let shown = if SENSITIVE_HEADERS.contains(&k.to_ascii_lowercase().as_str()) {
                    "<redacted>"
                } else {
                    v.as_str()
                };
                (k.as_str(), shown)
            })
            .collect();
        f.debug_struct("HttpTransportConfig")
            .field("server_name", &self.server_name)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("oauth", &self.oauth)
            .finish()
    }
}

/// Build the transport configuration for `server`.
///
/// Validates the fields its transport kind requires. For remote servers the
/// secret is resolved through `credentials` and injected as a header; the
/// credential service is never consulted for stdio servers.
///
/// # Errors
///
/// `Configuration` when the command or URL is missing, or when bearer/api-key
/// auth is configured but no secret is available. `Credential` when the
/// credential service itself fails.
pub async fn get_client_config(
    server: &ServerConfig,
    credentials: &dyn CredentialService,
) -> Result<TransportConfig, ToolServiceError> {
    let conn = &server.connection;
    conn.validate(server.transport)
        .map_err(|e| ToolServiceError::Configuration(format!("{}: {e}", server.name)))?;

    match server.transport {
        TransportKind::Stdio => Ok(TransportConfig::Stdio(StdioTransportConfig {
            server_name: server.name.clone(),
            command: conn.command.clone().unwrap_or_default(),
            args: conn.args.clone(),
            env: conn.env.clone(),
            working_dir: conn
                .working_dir
                .clone()
                .filter(|dir| !dir.trim().is_empty()),
        })),
        TransportKind::Http | TransportKind::Sse => {
            let mut headers = conn.headers.clone();
            let mut oauth = false;

            if let Some(auth) = &server.auth {
                match auth.kind {
                    AuthKind::Bearer => {
                        let secret = require_secret(server, credentials).await?;
                        headers.insert("Authorization".to_string(), format!("Bearer {secret}"));
                    }
                    AuthKind::ApiKey => {
                        let secret = require_secret(server, credentials).await?;
                        headers.insert(API_KEY_HEADER.to_string(), secret);
                    }
                    AuthKind::OAuth => {
                        tracing::warn!(
                            server_id = %server.id,
                            server_name = %server.name,
                            "OAuth servers are connected without an auth header"
                        );
                        oauth = true;
                    }
                }
            }

            Ok(TransportConfig::Http(HttpTransportConfig {
                server_name: server.name.clone(),
                url: conn.url.clone().unwrap_or_default().trim().to_string(),
                headers,
                oauth,
            }))
        }
    }
}

async fn require_secret(
    server: &ServerConfig,
    credentials: &dyn CredentialService,
) -> Result<String, ToolServiceError> {
    credentials
        .decrypt(&server.id)
        .await?
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            ToolServiceError::Configuration(format!(
                "{}: authentication is configured but no secret is available",
                server.name
            ))
        })
}

//! Stdio transport: newline-delimited JSON-RPC with a child process.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;

use super::jsonrpc::{
    InitializeResult, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, initialize_params,
};
use super::{McpClientError, McpTransport, SessionHandle, SessionState};
use crate::config::{ClientOptions, StdioTransportConfig};

/// How long `terminate` waits for the child to exit after stdin closes.
const EXIT_GRACE: Duration = Duration::from_millis(500);

struct Process {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// Session with a tool server running as a local child process.
///
/// The process is spawned by `initialize()` and killed by `terminate()` or
/// when the transport is dropped.
pub struct StdioTransport {
    config: StdioTransportConfig,
    options: ClientOptions,
    process: Option<Process>,
    state: SessionState,
    next_id: u64,
}

impl StdioTransport {
    pub fn new(config: StdioTransportConfig, options: ClientOptions) -> Self {
        Self {
            config,
            options,
            process: None,
            state: SessionState::Uninitialized,
            next_id: 1,
        }
    }

    fn spawn(&self) -> Result<Process, McpClientError> {
        let cfg = &self.config;
        let mut command = Command::new(&cfg.command);
        command
            .args(&cfg.args)
            .envs(&cfg.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &cfg.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| {
            McpClientError::Spawn(format!(
                "'{}' {:?} (cwd: {:?}): {e}",
                cfg.command, cfg.args, cfg.working_dir
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpClientError::Spawn("Failed to get stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpClientError::Spawn("Failed to get stdout".to_string()))?;

        if let Some(stderr) = child.stderr.take() {
            let server_name = cfg.server_name.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::debug!(server_name = %server_name, line = %line, "tool server stderr");
                }
            });
        }

        Ok(Process {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    async fn send_line<T: Serialize + Sync>(&mut self, message: &T) -> Result<(), McpClientError> {
        let process = self.process.as_mut().ok_or(McpClientError::Closed)?;
        let line = serde_json::to_string(message)? + "\n";
        process.stdin.write_all(line.as_bytes()).await?;
        process.stdin.flush().await?;
        Ok(())
    }

    async fn read_response(&mut self, id: u64) -> Result<JsonRpcResponse, McpClientError> {
        let read_timeout = self.options.stdio_response_timeout;
        let server_name = self.config.server_name.as_str();
        let process = self.process.as_mut().ok_or(McpClientError::Closed)?;

        timeout(read_timeout, next_response(&mut process.stdout, id, server_name))
            .await
            .map_err(|_| McpClientError::Timeout)?
    }

    async fn roundtrip(&mut self, method: &str, params: Value) -> Result<Value, McpClientError> {
        let id = self.next_id;
        self.next_id += 1;

        self.send_line(&JsonRpcRequest::new(id, method, params))
            .await?;
        self.read_response(id).await?.into_result()
    }

    async fn handshake(&mut self) -> Result<SessionHandle, McpClientError> {
        self.process = Some(self.spawn()?);

        let params =
            initialize_params(&self.options.protocol_version, &self.options.client_name);
        let result: InitializeResult =
            serde_json::from_value(self.roundtrip("initialize", params).await?)?;

        self.send_line(&JsonRpcNotification::new("notifications/initialized"))
            .await?;

        Ok(SessionHandle {
            session_id: None,
            protocol_version: result.protocol_version,
            server_name: result.server_info.map(|info| info.name),
        })
    }
}

/// Read lines until the response to `id` arrives.
///
/// Blank lines, non-JSON output (banners, package manager noise) and
/// messages for other ids are skipped.
async fn next_response(
    stdout: &mut BufReader<ChildStdout>,
    id: u64,
    server_name: &str,
) -> Result<JsonRpcResponse, McpClientError> {
    let mut line = String::new();
    loop {
        line.clear();
        if stdout.read_line(&mut line).await? == 0 {
            return Err(McpClientError::Closed);
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<JsonRpcResponse>(trimmed) {
            Ok(response) if response.answers(id) => return Ok(response),
            Ok(other) => {
                tracing::debug!(
                    server_name,
                    method = ?other.method,
                    "Skipping unrelated JSON-RPC message"
                );
            }
            Err(_) => {
                tracing::debug!(server_name, line = trimmed, "Skipping non-JSON-RPC output");
            }
        }
    }
}

#[async_trait]
impl McpTransport for StdioTransport {
    async fn initialize(&mut self) -> Result<SessionHandle, McpClientError> {
        if self.state != SessionState::Uninitialized {
            return Err(McpClientError::InvalidState(self.state));
        }
        self.state = SessionState::Initializing;

        match self.handshake().await {
            Ok(handle) => {
                self.state = SessionState::Active;
                tracing::debug!(
                    server_name = %self.config.server_name,
                    remote = ?handle.server_name,
                    protocol_version = ?handle.protocol_version,
                    "Stdio session initialized"
                );
                Ok(handle)
            }
            Err(e) => {
                self.terminate().await;
                Err(e)
            }
        }
    }

    async fn request(&mut self, method: &str, params: Value) -> Result<Value, McpClientError> {
        self.state.require_active()?;
        self.roundtrip(method, params).await
    }

    async fn terminate(&mut self) {
        self.state = SessionState::Terminated;
        let Some(mut process) = self.process.take() else {
            return;
        };

        // Closing stdin asks the server to exit; kill it if it lingers
        drop(process.stdin);
        match timeout(EXIT_GRACE, process.child.wait()).await {
            Ok(Ok(status)) => {
                tracing::debug!(server_name = %self.config.server_name, %status, "Tool server exited");
            }
            _ => {
                if let Err(e) = process.child.kill().await {
                    tracing::debug!(
                        server_name = %self.config.server_name,
                        error = %e,
                        "Failed to kill tool server process"
                    );
                }
            }
        }
    }

    fn state(&self) -> SessionState {
        self.state
    }

    fn server_label(&self) -> &str {
        &self.config.server_name
    }
}

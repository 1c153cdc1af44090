//! Tool manager: discovery and single tool calls against catalog servers.
//!
//! Every operation opens its own session and closes it before returning,
//! whatever the outcome. Sessions are never shared between operations.

use std::sync::Arc;

use serde_json::{Map, Value};

use dectool_core::domain::{ServerConfig, ToolCallResult, ToolDescriptor};
use dectool_core::ports::{CredentialService, ToolCatalogRepository, ToolServiceError};

use crate::client::{McpClientError, McpTransport, ToolOutcome};
use crate::config::{TransportConfig, get_client_config};
use crate::factory::TransportFactory;

/// Drives discovery and tool calls for servers stored in the catalog.
///
/// Dependencies are injected so that the composition root decides where the
/// catalog lives, how secrets are resolved and which transports are used.
pub struct ToolManager {
    catalog: Arc<dyn ToolCatalogRepository>,
    credentials: Arc<dyn CredentialService>,
    factory: Arc<dyn TransportFactory>,
}

impl ToolManager {
    pub fn new(
        catalog: Arc<dyn ToolCatalogRepository>,
        credentials: Arc<dyn CredentialService>,
        factory: Arc<dyn TransportFactory>,
    ) -> Self {
        Self {
            catalog,
            credentials,
            factory,
        }
    }

    pub fn catalog(&self) -> &Arc<dyn ToolCatalogRepository> {
        &self.catalog
    }

    /// Validate `server` and resolve its transport configuration.
    pub async fn get_client_config(
        &self,
        server: &ServerConfig,
    ) -> Result<TransportConfig, ToolServiceError> {
        get_client_config(server, self.credentials.as_ref()).await
    }

    /// Discover the tools of `server_id` and merge them into the catalog.
    ///
    /// Returns the normalized list reported by the server.
    pub async fn discover_tools(
        &self,
        server_id: &str,
    ) -> Result<Vec<ToolDescriptor>, ToolServiceError> {
        let server = self.catalog.get_by_id(server_id).await?;
        let (_, tools) = self.discover_server(&server).await?;
        Ok(tools)
    }

    /// Discover `server`'s tools, sync them and return the updated record
    /// together with the reported tools.
    pub async fn discover_server(
        &self,
        server: &ServerConfig,
    ) -> Result<(ServerConfig, Vec<ToolDescriptor>), ToolServiceError> {
        let config = self.get_client_config(server).await?;
        let mut session = self.open(&config)?;

        let listed = list_in_session(session.as_mut()).await;
        session.terminate().await;
        let tools = listed?;

        let synced = self.catalog.sync_tools(&server.id, &tools).await?;
        tracing::info!(
            server_id = %server.id,
            server_name = %server.name,
            tool_count = tools.len(),
            "Discovered tools"
        );
        Ok((synced, tools))
    }

    /// Call one tool on `server_id`.
    ///
    /// Never fails: configuration, lookup, transport and remote errors all
    /// come back as a result with `success == false` and a message.
    pub async fn call_tool(
        &self,
        server_id: &str,
        tool_name: &str,
        arguments: Map<String, Value>,
    ) -> ToolCallResult {
        match self.catalog.get_by_id(server_id).await {
            Ok(server) => self.call_tool_on(&server, tool_name, arguments).await,
            Err(e) => {
                tracing::warn!(server_id, tool_name, error = %e, "Tool call on unknown server");
                ToolCallResult::failure(server_id, "", tool_name, arguments, e.to_string())
            }
        }
    }

    /// Call one tool on an already loaded server record. Never fails.
    pub async fn call_tool_on(
        &self,
        server: &ServerConfig,
        tool_name: &str,
        arguments: Map<String, Value>,
    ) -> ToolCallResult {
        let outcome = self.invoke(server, tool_name, &arguments).await;

        let result = match outcome {
            Ok(ToolOutcome::Success(value)) => {
                ToolCallResult::success(&server.id, &server.name, tool_name, arguments, value)
            }
            Ok(ToolOutcome::Failed(message)) => {
                ToolCallResult::failure(&server.id, &server.name, tool_name, arguments, message)
            }
            Err(e) => ToolCallResult::failure(
                &server.id,
                &server.name,
                tool_name,
                arguments,
                e.to_string(),
            ),
        };

        if result.success {
            tracing::info!(
                server_id = %server.id,
                server_name = %server.name,
                tool_name,
                "Tool call succeeded"
            );
        } else {
            tracing::warn!(
                server_id = %server.id,
                server_name = %server.name,
                tool_name,
                error = result.error.as_deref().unwrap_or_default(),
                "Tool call failed"
            );
        }
        result
    }

    async fn invoke(
        &self,
        server: &ServerConfig,
        tool_name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<ToolOutcome, ToolServiceError> {
        let config = self.get_client_config(server).await?;
        let mut session = self.open(&config)?;

        let outcome = call_in_session(session.as_mut(), tool_name, arguments).await;
        session.terminate().await;
        outcome.map_err(ToolServiceError::from)
    }

    fn open(&self, config: &TransportConfig) -> Result<Box<dyn McpTransport>, ToolServiceError> {
        self.factory.create(config).map_err(|e| {
            ToolServiceError::Configuration(format!("{}: {e}", config.server_name()))
        })
    }
}

async fn list_in_session(
    session: &mut dyn McpTransport,
) -> Result<Vec<ToolDescriptor>, McpClientError> {
    session.initialize().await?;
    session.list_tools().await
}

async fn call_in_session(
    session: &mut dyn McpTransport,
    tool_name: &str,
    arguments: &Map<String, Value>,
) -> Result<ToolOutcome, McpClientError> {
    session.initialize().await?;
    session.call_tool(tool_name, arguments).await
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Scripted transports shared by the manager and orchestrator tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use crate::client::{McpClientError, McpTransport, SessionHandle, SessionState};
    use crate::config::TransportConfig;
    use crate::factory::TransportFactory;

    /// What one fake server does.
    #[derive(Clone, Default)]
    pub struct Script {
        /// `tools/list` result, or `None` to fail the handshake.
        pub tools: Option<Value>,
        /// `tools/call` results keyed by tool name; missing names get a server error.
        pub calls: HashMap<String, Value>,
    }

    /// Everything the fake servers observed.
    #[derive(Default)]
    pub struct Journal {
        pub requests: Mutex<Vec<(String, String)>>,
        pub terminated: Mutex<usize>,
        pub opened: Mutex<usize>,
    }

    impl Journal {
        pub fn methods(&self, method: &str) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, m)| m == method)
                .map(|(server, _)| server.clone())
                .collect()
        }
    }

    pub struct FakeTransport {
        server: String,
        script: Script,
        journal: std::sync::Arc<Journal>,
        state: SessionState,
    }

    #[async_trait]
    impl McpTransport for FakeTransport {
        async fn initialize(&mut self) -> Result<SessionHandle, McpClientError> {
            if self.script.tools.is_none() {
                return Err(McpClientError::Closed);
            }
            self.state = SessionState::Active;
            Ok(SessionHandle::default())
        }

        async fn request(&mut self, method: &str, params: Value) -> Result<Value, McpClientError> {
            self.state.require_active()?;
            self.journal
                .requests
                .lock()
                .unwrap()
                .push((self.server.clone(), method.to_string()));
            match method {
                "tools/list" => Ok(self.script.tools.clone().unwrap_or_else(|| json!({}))),
                "tools/call" => {
                    let name = params["name"].as_str().unwrap_or_default();
                    self.script
                        .calls
                        .get(name)
                        .cloned()
                        .ok_or_else(|| McpClientError::Server {
                            code: -32602,
                            message: format!("Unknown tool: {name}"),
                            data: None,
                        })
                }
                other => Err(McpClientError::Protocol(format!("unexpected {other}"))),
            }
        }

        async fn terminate(&mut self) {
            self.state = SessionState::Terminated;
            *self.journal.terminated.lock().unwrap() += 1;
        }

        fn state(&self) -> SessionState {
            self.state
        }

        fn server_label(&self) -> &str {
            &self.server
        }
    }

    /// Hands out fake transports by server name.
    #[derive(Default)]
    pub struct FakeFactory {
        pub scripts: HashMap<String, Script>,
        pub journal: std::sync::Arc<Journal>,
    }

    impl FakeFactory {
        pub fn with(mut self, server: &str, script: Script) -> Self {
            self.scripts.insert(server.to_string(), script);
            self
        }
    }

    impl TransportFactory for FakeFactory {
        fn create(
            &self,
            config: &TransportConfig,
        ) -> Result<Box<dyn McpTransport>, McpClientError> {
            *self.journal.opened.lock().unwrap() += 1;
            let server = config.server_name().to_string();
            let script = self.scripts.get(&server).cloned().unwrap_or_default();
            Ok(Box::new(FakeTransport {
                server,
                script,
                journal: self.journal.clone(),
                state: SessionState::Uninitialized,
            }))
        }
    }

    pub fn search_tools() -> Value {
        json!({
            "tools": [{
                "name": "search",
                "description": "Search the web",
                "inputSchema": {
                    "type": "object",
                    "properties": {"query": {"type": "string", "description": "Search terms"}},
                    "required": ["query"]
                }
            }]
        })
    }
}

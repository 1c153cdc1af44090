mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{FakeMcpServer, SESSION_ID};
use dectool_core::domain::{AuthConfig, AuthKind, NewServerConfig};
use dectool_core::ports::{CredentialError, CredentialService, ToolCatalogRepository};
use dectool_mcp::client::HttpTransport;
use dectool_mcp::{
    ClientOptions, DefaultTransportFactory, HttpTransportConfig, McpClientError, McpTransport,
    ResultValue, SessionState, ToolManager, ToolOutcome,
};
use dectool_store::JsonCatalogRepository;
use serde_json::{Map, Value, json};
use tempfile::TempDir;

fn transport(url: &str, headers: BTreeMap<String, String>) -> HttpTransport {
    HttpTransport::new(
        HttpTransportConfig {
            server_name: "Research".to_string(),
            url: url.to_string(),
            headers,
            oauth: false,
        },
        &ClientOptions::default(),
    )
    .unwrap()
}

fn query(text: &str) -> Map<String, Value> {
    json!({"query": text}).as_object().cloned().unwrap()
}

#[tokio::test]
async fn test_full_session_lifecycle() {
    let server = FakeMcpServer::default();
    let url = server.spawn().await;
    let mut session = transport(&url, BTreeMap::new());

    let handle = session.initialize().await.unwrap();
    assert_eq!(handle.session_id.as_deref(), Some(SESSION_ID));
    assert_eq!(handle.server_name.as_deref(), Some("fake-mcp"));
    assert_eq!(handle.protocol_version.as_deref(), Some("2025-03-26"));
    assert_eq!(session.state(), SessionState::Active);

    let tools = session.list_tools().await.unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "search");
    assert_eq!(tools[0].description.as_deref(), Some("Search the web"));
    assert_eq!(tools[0].server.as_deref(), Some("Research"));
    assert!(tools[0].input_schema.is_some());

    let outcome = session.call_tool("search", &query("caching")).await.unwrap();
    assert_eq!(
        outcome,
        ToolOutcome::Success(ResultValue::TextItems(vec!["Results for caching".to_string()]))
    );

    session.terminate().await;
    assert_eq!(session.state(), SessionState::Terminated);
    assert_eq!(server.deleted_sessions(), vec![SESSION_ID.to_string()]);

    assert_eq!(
        server.methods(),
        vec!["initialize", "notifications/initialized", "tools/list", "tools/call"]
    );
    let ids = server.ids();
    assert_eq!(ids[1], None);
    let request_ids: Vec<u64> = [&ids[0], &ids[2], &ids[3]]
        .iter()
        .map(|id| id.as_ref().and_then(Value::as_u64).unwrap())
        .collect();
    assert!(request_ids.windows(2).all(|pair| pair[0] < pair[1]));
    let sessions = server.header_values("mcp-session-id");
    assert_eq!(sessions[0], None);
    assert!(sessions[1..].iter().all(|s| s.as_deref() == Some(SESSION_ID)));
    assert!(
        server
            .header_values("accept")
            .iter()
            .all(|a| a.as_deref() == Some("application/json, text/event-stream"))
    );
}

#[tokio::test]
async fn test_configured_headers_sent_on_every_request() {
    let server = FakeMcpServer::default();
    let url = server.spawn().await;
    let mut headers = BTreeMap::new();
    headers.insert("Authorization".to_string(), "Bearer s3cret".to_string());
    let mut session = transport(&format!("{url}/mcp/"), headers);

    session.initialize().await.unwrap();
    session.list_tools().await.unwrap();
    session.terminate().await;

    let auth = server.header_values("authorization");
    assert_eq!(auth.len(), 3);
    assert!(auth.iter().all(|a| a.as_deref() == Some("Bearer s3cret")));
}

#[tokio::test]
async fn test_tool_errors() {
    let server = FakeMcpServer::default();
    let url = server.spawn().await;
    let mut session = transport(&url, BTreeMap::new());
    session.initialize().await.unwrap();

    let failed = session.call_tool("fail", &Map::new()).await.unwrap();
    assert_eq!(failed, ToolOutcome::Failed("quota exceeded".to_string()));

    let err = session.call_tool("teleport", &Map::new()).await.unwrap_err();
    assert!(matches!(err, McpClientError::Server { code: -32602, .. }));

    session.terminate().await;
}

#[tokio::test]
async fn test_missing_session_header_fails_handshake() {
    let server = FakeMcpServer {
        omit_session: true,
        ..FakeMcpServer::default()
    };
    let url = server.spawn().await;
    let mut session = transport(&url, BTreeMap::new());

    let err = session.initialize().await.unwrap_err();
    assert!(matches!(err, McpClientError::MissingSessionId));
    assert_eq!(session.state(), SessionState::Terminated);
    assert!(server.deleted_sessions().is_empty());
}

#[tokio::test]
async fn test_http_error_status_is_reported() {
    let server = FakeMcpServer::default();
    let url = server.spawn().await;
    let mut session = transport(&format!("{url}/elsewhere"), BTreeMap::new());

    let err = session.initialize().await.unwrap_err();
    assert!(matches!(err, McpClientError::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn test_unreachable_server() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut session = transport(&format!("http://{addr}"), BTreeMap::new());
    let err = session.initialize().await.unwrap_err();
    assert!(matches!(err, McpClientError::Http(_)));
    assert_eq!(session.state(), SessionState::Terminated);
}

struct StaticSecret(&'static str);

#[async_trait]
impl CredentialService for StaticSecret {
    async fn decrypt(&self, _server_id: &str) -> Result<Option<String>, CredentialError> {
        Ok(Some(self.0.to_string()))
    }
}

#[tokio::test]
async fn test_manager_discovers_and_calls_over_http() {
    let server = FakeMcpServer::default();
    let url = server.spawn().await;

    let tmp = TempDir::new().unwrap();
    let catalog = Arc::new(JsonCatalogRepository::new(tmp.path().join("catalog.json")));
    let record = catalog
        .insert(
            NewServerConfig::new_http("Research", &url)
                .with_auth(AuthConfig::new(AuthKind::ApiKey)),
        )
        .await
        .unwrap();
    let manager = ToolManager::new(
        catalog.clone(),
        Arc::new(StaticSecret("key-123")),
        Arc::new(DefaultTransportFactory::new(ClientOptions::default())),
    );

    let tools = manager.discover_tools(&record.id).await.unwrap();
    assert_eq!(tools.len(), 1);
    let stored = catalog.get_by_id(&record.id).await.unwrap();
    assert!(stored.tool("search").is_some());
    assert!(stored.last_discovered_at.is_some());

    let result = manager
        .call_tool(&record.id, "search", query("lru"))
        .await;
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.server_name, "Research");

    let failed = manager.call_tool(&record.id, "teleport", Map::new()).await;
    assert!(!failed.success);
    assert!(failed.error.as_deref().unwrap().contains("Unknown tool"));

    assert!(
        server
            .header_values("x-api-key")
            .iter()
            .all(|k| k.as_deref() == Some("key-123"))
    );
    assert_eq!(server.deleted_sessions().len(), 3);
}

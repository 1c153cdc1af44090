//! Transport selection.
//!
//! The factory picks the transport implementation once per session from the
//! validated [`TransportConfig`]. Tests swap in their own factory to run the
//! manager and orchestrator against scripted transports.

use crate::client::{HttpTransport, McpClientError, McpTransport, StdioTransport};
use crate::config::{ClientOptions, TransportConfig};

/// Creates unopened sessions.
pub trait TransportFactory: Send + Sync {
    fn create(&self, config: &TransportConfig) -> Result<Box<dyn McpTransport>, McpClientError>;
}

/// Stdio configs get a [`StdioTransport`], HTTP configs an [`HttpTransport`].
#[derive(Debug, Clone, Default)]
pub struct DefaultTransportFactory {
    options: ClientOptions,
}

impl DefaultTransportFactory {
    pub const fn new(options: ClientOptions) -> Self {
        Self { options }
    }

    pub const fn options(&self) -> &ClientOptions {
        &self.options
    }
}

impl TransportFactory for DefaultTransportFactory {
    fn create(&self, config: &TransportConfig) -> Result<Box<dyn McpTransport>, McpClientError> {
        match config {
            TransportConfig::Stdio(stdio) => Ok(Box::new(StdioTransport::new(
                stdio.clone(),
                self.options.clone(),
            ))),
            TransportConfig::Http(http) => {
                Ok(Box::new(HttpTransport::new(http.clone(), &self.options)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SessionState;
    use crate::config::{HttpTransportConfig, StdioTransportConfig};
    use std::collections::BTreeMap;

    #[test]
    fn test_creates_unopened_sessions() {
        let factory = DefaultTransportFactory::default();

        let stdio = factory
            .create(&TransportConfig::Stdio(StdioTransportConfig {
                server_name: "files".to_string(),
                command: "npx".to_string(),
                args: vec![],
                env: BTreeMap::new(),
                working_dir: None,
            }))
            .unwrap();
        assert_eq!(stdio.state(), SessionState::Uninitialized);
        assert_eq!(stdio.server_label(), "files");

        let http = factory
            .create(&TransportConfig::Http(HttpTransportConfig {
                server_name: "Research".to_string(),
                url: "http://localhost:8931".to_string(),
                headers: BTreeMap::new(),
                oauth: false,
            }))
            .unwrap();
        assert_eq!(http.state(), SessionState::Uninitialized);
        assert_eq!(http.server_label(), "Research");
    }
}

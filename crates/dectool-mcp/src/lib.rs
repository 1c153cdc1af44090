//! MCP (Model Context Protocol) tool client and orchestration for dectool.
//!
//! - [`client`]: session-based JSON-RPC transports (stdio child process and
//!   HTTP with optional single-event SSE responses)
//! - [`ToolManager`]: turns catalog records into transport configs, runs
//!   discovery and single tool calls
//! - [`Orchestrator`]: model-driven tool selection, sequential execution,
//!   persistence and the prompt-ready context block
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub mod arguments;
pub mod client;
pub mod config;
pub mod factory;
pub mod manager;
pub mod orchestrator;

// Re-export domain types from core for convenience
pub use dectool_core::{
    ExecutionMode, GenerationContext, ReferenceInfo, ResultValue, ServerConfig, ToolCall,
    ToolCallResult, ToolConfig, ToolDescriptor, ToolSelectionResult,
};

// Re-export this crate's public types
pub use arguments::build_tool_arguments;
pub use client::{McpClientError, McpTransport, SessionHandle, SessionState, ToolOutcome};
pub use config::{ClientOptions, HttpTransportConfig, StdioTransportConfig, TransportConfig};
pub use factory::{DefaultTransportFactory, TransportFactory};
pub use manager::ToolManager;
pub use orchestrator::{OrchestrationResult, Orchestrator};

#[cfg(test)]
use axum as _;
#[cfg(test)]
use dectool_store as _;
#[cfg(test)]
use tempfile as _;

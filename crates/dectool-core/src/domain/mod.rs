//! Tool-server domain types.
//!
//! These types represent configured tool servers, their tools and the
//! outcomes of invoking them, independent of any infrastructure concerns
//! (file storage, process management, HTTP).
//!
//! # Design
//!
//! - `ServerConfig` - A persisted tool server with ID
//! - `NewServerConfig` - A tool server to be inserted (no ID yet)
//! - `ConnectionParams` - Transport parameters (command/args/env or URL/headers)
//! - `ToolConfig` - Per-tool configuration kept across discoveries
//! - `ToolDescriptor` - A tool as reported by a server's `tools/list`
//! - `ResultValue` - Flattenable outcome of a tool call
//! - `StoredToolResult` - Immutable persisted record of one invocation
//! - `ToolCall` / `ToolSelectionResult` / `ReferenceInfo` - Transient orchestration values

mod catalog;
mod mapping;
mod result;
mod selection;

pub use catalog::{
    AuthConfig, AuthKind, ConnectionParams, ExecutionMode, NewServerConfig, ServerConfig,
    ToolConfig, ToolDescriptor, TransportKind, UpdateToolConfig, new_id,
};
pub use mapping::infer_context_mappings;
pub use result::{ResultValue, StoredToolResult, ToolCallResult};
pub use selection::{GenerationContext, ReferenceInfo, ToolCall, ToolSelectionResult};

//! Model-driven tool orchestration.
//!
//! One `orchestrate` run gathers the tools of enabled servers, asks the
//! caller's text generator which ones to call, runs the selected calls one
//! after another, persists the successes and renders a context block plus
//! citations for downstream prompts.

mod format;
mod parser;
mod prompt;
mod references;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use dectool_core::domain::{
    ExecutionMode, GenerationContext, ReferenceInfo, StoredToolResult, ToolCall, ToolCallResult,
    ToolConfig, ToolSelectionResult,
};
use dectool_core::ports::{CatalogError, TextGenerator, ToolResultRepository};

use crate::arguments::build_tool_arguments;
use crate::manager::ToolManager;

pub use format::format_context;
pub use parser::parse_selection;
pub use prompt::build_selection_prompt;
pub use references::{SUMMARY_MAX_CHARS, summarize, truncate};

/// A tool offered to the model, with the server that owns it.
#[derive(Debug, Clone)]
pub struct OfferedTool {
    pub server_id: String,
    pub server_name: String,
    pub name: String,
    pub description: Option<String>,
    /// `None` when the server could not be reached for discovery.
    pub input_schema: Option<Value>,
    pub config: ToolConfig,
}

/// Everything one orchestration produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrchestrationResult {
    pub selection: ToolSelectionResult,
    /// All executed calls, failures included.
    pub results: Vec<ToolCallResult>,
    /// Prompt-ready block built from the successful results.
    pub formatted_context: String,
    /// One citation per successful result.
    pub references: Vec<ReferenceInfo>,
}

pub struct Orchestrator {
    manager: Arc<ToolManager>,
    results: Arc<dyn ToolResultRepository>,
}

impl Orchestrator {
    pub fn new(manager: Arc<ToolManager>, results: Arc<dyn ToolResultRepository>) -> Self {
        Self { manager, results }
    }

    pub fn manager(&self) -> &Arc<ToolManager> {
        &self.manager
    }

    /// Ask `generator` which tools to call for a decision.
    ///
    /// Never fails. An empty catalog, a generation error or unparsable
    /// output yield no calls and a reasoning that says why.
    pub async fn select_tools(
        &self,
        title: &str,
        problem_statement: &str,
        context: &str,
        generator: &dyn TextGenerator,
    ) -> ToolSelectionResult {
        match self.offered_tools(None).await {
            Ok(tools) => select_from(&tools, title, problem_statement, context, generator).await,
            Err(e) => catalog_unavailable(&e),
        }
    }

    /// Run `calls` sequentially and collect every outcome.
    ///
    /// Calls without a server id go to the first enabled server offering
    /// a tool of that name.
    pub async fn execute_tool_calls(&self, calls: &[ToolCall]) -> Vec<ToolCallResult> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            let server_id = match &call.server_id {
                Some(id) => Some(id.clone()),
                None => self.resolve_server(&call.tool_name).await,
            };
            let result = match server_id {
                Some(id) => {
                    self.manager
                        .call_tool(&id, &call.tool_name, call.arguments.clone())
                        .await
                }
                None => {
                    tracing::warn!(tool_name = %call.tool_name, "No enabled server offers tool");
                    ToolCallResult::failure(
                        "",
                        "",
                        &call.tool_name,
                        call.arguments.clone(),
                        format!("No enabled server offers tool '{}'", call.tool_name),
                    )
                }
            };
            results.push(result);
        }
        results
    }

    /// Select, execute, persist and render in one pass.
    ///
    /// Only tools whose execution mode equals `mode` are offered. Successful
    /// results are stored tagged with `owner_id`; a storage failure is logged
    /// and the orchestration carries on.
    pub async fn orchestrate(
        &self,
        title: &str,
        problem_statement: &str,
        context: &str,
        generator: &dyn TextGenerator,
        mode: ExecutionMode,
        owner_id: Option<&str>,
    ) -> OrchestrationResult {
        let tools = match self.offered_tools(Some(mode)).await {
            Ok(tools) => tools,
            Err(e) => {
                return OrchestrationResult {
                    selection: catalog_unavailable(&e),
                    ..OrchestrationResult::default()
                };
            }
        };

        let selection = select_from(&tools, title, problem_statement, context, generator).await;

        let generation_context = GenerationContext::new(title, problem_statement, context);
        let calls: Vec<ToolCall> = selection
            .tool_calls
            .iter()
            .map(|call| {
                let arguments = match find_offered(&tools, call) {
                    Some(tool) => {
                        build_tool_arguments(&tool.config, &generation_context, &call.arguments)
                    }
                    None => call.arguments.clone(),
                };
                ToolCall {
                    arguments,
                    ..call.clone()
                }
            })
            .collect();

        let results = self.execute_tool_calls(&calls).await;

        let mut references = Vec::new();
        for result in results.iter().filter(|r| r.success) {
            let stored = StoredToolResult::from_call(result, owner_id);
            if let Err(e) = self.results.save(&stored).await {
                tracing::warn!(
                    server_id = %result.server_id,
                    tool_name = %result.tool_name,
                    error = %e,
                    "Failed to persist tool result"
                );
            }

            let title = tools
                .iter()
                .find(|t| t.server_id == result.server_id && t.name == result.tool_name)
                .map_or(result.tool_name.as_str(), |t| t.config.label());
            references.push(ReferenceInfo::new(
                stored.id,
                title,
                summarize(&result.arguments, &result.tool_name),
                &result.server_name,
            ));
        }

        let formatted_context = format_context(&results);
        tracing::info!(
            selected = selection.tool_calls.len(),
            succeeded = references.len(),
            failed = results.len() - references.len(),
            "Orchestration finished"
        );

        OrchestrationResult {
            selection,
            results,
            formatted_context,
            references,
        }
    }

    /// Tools of enabled servers, freshly discovered where possible.
    async fn offered_tools(
        &self,
        mode: Option<ExecutionMode>,
    ) -> Result<Vec<OfferedTool>, CatalogError> {
        let servers = self.manager.catalog().list().await?;
        let mut offered = Vec::new();

        for server in servers.into_iter().filter(|s| s.enabled) {
            match self.manager.discover_server(&server).await {
                Ok((synced, descriptors)) => {
                    for descriptor in descriptors {
                        let config = synced
                            .tool(&descriptor.name)
                            .cloned()
                            .unwrap_or_else(|| ToolConfig::from_discovered(&descriptor));
                        offered.push(OfferedTool {
                            server_id: synced.id.clone(),
                            server_name: synced.name.clone(),
                            description: config.description.clone().or(descriptor.description),
                            name: descriptor.name,
                            input_schema: descriptor.input_schema,
                            config,
                        });
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        server_id = %server.id,
                        server_name = %server.name,
                        error = %e,
                        "Discovery failed, offering stored tools without schema"
                    );
                    for config in &server.tools {
                        offered.push(OfferedTool {
                            server_id: server.id.clone(),
                            server_name: server.name.clone(),
                            name: config.tool_name.clone(),
                            description: config.description.clone(),
                            input_schema: None,
                            config: config.clone(),
                        });
                    }
                }
            }
        }

        if let Some(mode) = mode {
            offered.retain(|tool| tool.config.execution_mode == mode);
        }
        Ok(offered)
    }

    async fn resolve_server(&self, tool_name: &str) -> Option<String> {
        match self.manager.catalog().list().await {
            Ok(servers) => servers
                .into_iter()
                .find(|s| s.enabled && s.tool(tool_name).is_some())
                .map(|s| s.id),
            Err(e) => {
                tracing::warn!(tool_name, error = %e, "Catalog unavailable while resolving tool");
                None
            }
        }
    }
}

async fn select_from(
    tools: &[OfferedTool],
    title: &str,
    problem_statement: &str,
    context: &str,
    generator: &dyn TextGenerator,
) -> ToolSelectionResult {
    if tools.is_empty() {
        return ToolSelectionResult::empty("no tools available");
    }

    let prompt = build_selection_prompt(title, problem_statement, context, tools);
    let output = match generator.generate(&prompt).await {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!(error = %e, "Tool selection generation failed");
            return ToolSelectionResult::empty(format!("generation failure: {}", e.0));
        }
    };

    let parsed = match parse_selection(&output) {
        Ok(parsed) => parsed,
        Err(detail) => {
            tracing::warn!(error = %detail, "Could not parse tool selection");
            return ToolSelectionResult::empty(format!("parse failure: {detail}"));
        }
    };

    let mut tool_calls = Vec::with_capacity(parsed.tool_calls.len());
    for call in parsed.tool_calls {
        match tools.iter().find(|t| t.name == call.tool_name) {
            Some(tool) => tool_calls.push(ToolCall {
                server_id: Some(tool.server_id.clone()),
                ..call
            }),
            None => tracing::warn!(tool_name = %call.tool_name, "Model selected an unknown tool"),
        }
    }

    tracing::debug!(selected = tool_calls.len(), "Tool selection parsed");
    ToolSelectionResult {
        reasoning: parsed.reasoning,
        tool_calls,
    }
}

fn find_offered<'a>(tools: &'a [OfferedTool], call: &ToolCall) -> Option<&'a OfferedTool> {
    tools.iter().find(|t| {
        t.name == call.tool_name && call.server_id.as_deref().is_none_or(|id| id == t.server_id)
    })
}

fn catalog_unavailable(e: &CatalogError) -> ToolSelectionResult {
    tracing::warn!(error = %e, "Tool catalog unavailable");
    ToolSelectionResult::empty(format!("catalog unavailable: {e}"))
}

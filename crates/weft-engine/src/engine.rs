//! Workflow orchestrator
//!
//! Drives one run end to end: order the graph, then for each node check the
//! stop flag, apply the skip short-circuit, gate on required fields, resolve
//! inputs, and dispatch to the handler. Node failures are confined - the
//! failing node gets a failed result and the run moves on, so independent
//! branches still complete.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::Value;

use weft_providers::GenerationClient;

use crate::context::{RunContext, DEFAULT_PORT};
use crate::error::{EngineError, Result};
use crate::nodes::{NodeOutputs, NodeServices};
use crate::normalize::normalize;
use crate::registry::NodeRegistry;
use crate::resolve::{extract_hint, resolve_inputs};
use crate::schedule::execution_order;
use crate::types::{GraphNode, PortDataType, WorkflowGraph};
use crate::validation::missing_fields;

/// How often the observer's stop flag is mirrored into the run's cancel
/// token while a node executes
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Progress callbacks for a run
///
/// `should_stop` is polled before each node and periodically while a node
/// executes; returning true cancels the run cooperatively, keeping the
/// results produced so far.
pub trait RunObserver: Send + Sync {
    fn on_progress(&self, _completed: usize, _total: usize) {}
    fn on_node_start(&self, _node_id: &str) {}
    fn on_node_complete(&self, _node_id: &str, _success: bool) {}
    fn should_stop(&self) -> bool {
        false
    }
}

/// Observer that ignores everything
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Persistence hook for generated artifacts
///
/// Called with a generator or script node's primary output after it
/// succeeds. Returning a location (e.g. a saved file path) attaches it to
/// the node's outputs under `"saved"`.
#[async_trait]
pub trait OutputSink: Send + Sync {
    async fn persist(&self, node: &GraphNode, value: &Value) -> Option<String>;
}

/// Outcome of one node within a run
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub node_id: String,
    pub success: bool,
    /// Primary output value, when the node produced one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Full port map, for consumers that need more than the default slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<HashMap<String, Value>>,
    /// The node passed held data through instead of executing
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    fn succeeded(node_id: &str, outputs: NodeOutputs) -> Self {
        Self {
            node_id: node_id.to_string(),
            success: true,
            output: outputs.get(DEFAULT_PORT).cloned(),
            outputs: Some(outputs),
            skipped: false,
            error: None,
        }
    }

    // The held value is recorded in the run context for downstream nodes,
    // not on the result
    fn skipped(node_id: &str) -> Self {
        Self {
            node_id: node_id.to_string(),
            success: true,
            output: None,
            outputs: None,
            skipped: true,
            error: None,
        }
    }

    fn failed(node_id: &str, error: &EngineError) -> Self {
        Self {
            node_id: node_id.to_string(),
            success: false,
            output: None,
            outputs: None,
            skipped: false,
            error: Some(error.to_string()),
        }
    }
}

/// The workflow execution engine
pub struct WorkflowEngine {
    registry: NodeRegistry,
    client: Arc<dyn GenerationClient>,
    sink: Option<Arc<dyn OutputSink>>,
}

impl WorkflowEngine {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self {
            registry: NodeRegistry::new(),
            client,
            sink: None,
        }
    }

    /// Attach a persistence hook for generated artifacts
    pub fn with_sink(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Execute a whole graph, returning one result per node reached
    ///
    /// Fails up front only on structural problems (a cycle); everything
    /// after that is reported per node.
    pub async fn run(
        &self,
        graph: &WorkflowGraph,
        observer: &dyn RunObserver,
    ) -> Result<Vec<ExecutionResult>> {
        let order = execution_order(graph)?;
        let mut context = RunContext::new();
        info!("run {}: executing {} nodes", context.run_id, order.len());

        let mut results = Vec::with_capacity(order.len());
        for (index, node_id) in order.iter().enumerate() {
            if observer.should_stop() || context.is_aborted() {
                context.cancel.cancel();
                warn!(
                    "run {}: stopped after {} of {} nodes",
                    context.run_id,
                    results.len(),
                    order.len()
                );
                break;
            }

            observer.on_progress(index, order.len());
            observer.on_node_start(node_id);

            let node = graph
                .find_node(node_id)
                .ok_or_else(|| EngineError::NodeNotFound(node_id.clone()))?;
            let result = self.run_node(graph, node, &mut context, observer).await;

            observer.on_node_complete(node_id, result.success);
            results.push(result);
        }

        observer.on_progress(results.len(), order.len());
        Ok(results)
    }

    /// Execute a single node against a fresh context
    ///
    /// Unproduced upstream values fall back to the producers' property bags
    /// during resolution.
    pub async fn run_one(&self, graph: &WorkflowGraph, node_id: &str) -> Result<ExecutionResult> {
        let node = graph
            .find_node(node_id)
            .ok_or_else(|| EngineError::NodeNotFound(node_id.to_string()))?;
        let mut context = RunContext::new();
        Ok(self.run_node(graph, node, &mut context, &NoopObserver).await)
    }

    /// Per-node boundary: every failure becomes a failed result
    ///
    /// While the handler runs, the observer's stop flag is mirrored into
    /// the run's cancel token so in-flight poll loops see it too.
    async fn run_node(
        &self,
        graph: &WorkflowGraph,
        node: &GraphNode,
        context: &mut RunContext,
        observer: &dyn RunObserver,
    ) -> ExecutionResult {
        let Some(handler) = self.registry.handler(node.kind) else {
            let err = EngineError::UnknownNodeType(node.kind.as_str().to_string());
            return ExecutionResult::failed(&node.id, &err);
        };
        let definition = handler.definition();

        if node.skip {
            let hint = definition
                .primary_output()
                .map(|p| p.data_type)
                .unwrap_or(PortDataType::Any);
            let value = normalize(extract_hint(&node.data, hint), hint);
            debug!("node {}: skipped, passing held data through", node.id);

            let port = definition
                .primary_output()
                .map(|p| p.id.clone())
                .unwrap_or_else(|| DEFAULT_PORT.to_string());
            let mut outputs = NodeOutputs::new();
            outputs.insert(DEFAULT_PORT.to_string(), value.clone());
            outputs.insert(port, value);
            context.record(&node.id, outputs);
            return ExecutionResult::skipped(&node.id);
        }

        let missing = missing_fields(node, graph, definition);
        if !missing.is_empty() {
            let err = EngineError::MissingFields {
                node: node.id.clone(),
                fields: missing.join(", "),
            };
            warn!("node {}: {}", node.id, err);
            return ExecutionResult::failed(&node.id, &err);
        }

        let inputs = resolve_inputs(graph, node, context, Some(definition));
        let cancel = context.cancel.clone();
        let services = NodeServices {
            client: self.client.as_ref(),
            cancel: &cancel,
        };

        let outcome = {
            let execute = handler.execute(node, &inputs, &services);
            tokio::pin!(execute);
            loop {
                tokio::select! {
                    result = &mut execute => break result,
                    _ = tokio::time::sleep(STOP_POLL_INTERVAL) => {
                        if observer.should_stop() {
                            cancel.cancel();
                        }
                    }
                }
            }
        };

        match outcome {
            Ok(mut outputs) => {
                if let Some(sink) = &self.sink {
                    if !node.kind.is_input() && !node.kind.is_preview() {
                        let primary = outputs.get(DEFAULT_PORT).filter(|v| !v.is_null()).cloned();
                        if let Some(value) = primary {
                            if let Some(saved) = sink.persist(node, &value).await {
                                outputs.insert("saved".to_string(), Value::String(saved));
                            }
                        }
                    }
                }
                context.record(&node.id, outputs.clone());
                ExecutionResult::succeeded(&node.id, outputs)
            }
            Err(err) => {
                error!("node {} failed: {}", node.id, err);
                ExecutionResult::failed(&node.id, &err)
            }
        }
    }
}

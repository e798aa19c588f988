//! Weft - workflow execution engine for a node-canvas generation studio
//!
//! The engine takes an already-validated node graph (text/image/video/3D
//! generators, inputs, previews, script runners), orders it topologically,
//! resolves and normalizes the values flowing across typed edges, and
//! dispatches each node to its handler. Generation nodes call out through
//! the `GenerationClient` seam from `weft-providers`; everything around the
//! run (canvas, persistence, settings) is an injected collaborator.
//!
//! A run executes nodes strictly in scheduler order. Failures are confined
//! to the failing node - its result records the error and the run moves on.
//! Cancellation is cooperative: it stops scheduling further nodes and
//! further poll iterations, keeping partial results.

pub mod context;
pub mod engine;
pub mod error;
pub mod nodes;
pub mod normalize;
pub mod registry;
pub mod resolve;
pub mod schedule;
pub mod types;
pub mod validation;

pub use context::RunContext;
pub use engine::{ExecutionResult, NoopObserver, OutputSink, RunObserver, WorkflowEngine};
pub use error::{EngineError, Result};
pub use nodes::{NodeHandler, NodeInputs, NodeOutputs, NodeServices};
pub use registry::NodeRegistry;
pub use types::{
    GraphEdge, GraphNode, NodeDefinition, NodeKind, PortDataType, PortDefinition, WorkflowGraph,
};

// Re-export the provider seam types that embedders wire up
pub use weft_providers::{CancelToken, GenerationClient, ProviderRouter};

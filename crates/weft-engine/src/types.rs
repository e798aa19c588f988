//! Core types for the workflow system
//!
//! Defines port data types, the fixed node catalog, and graph structures.

use serde::{Deserialize, Serialize};

/// Data types that can flow through ports
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PortDataType {
    /// Accepts any type
    Any,
    /// Prose text
    Text,
    /// Image URL or data URI
    Image,
    /// Video URL
    Video,
    /// 3D model archive URL
    #[serde(rename = "3d")]
    Model3d,
}

impl PortDataType {
    /// Check if this type can connect to a target type
    ///
    /// Any is a wildcard; otherwise only same types connect.
    pub fn is_compatible_with(&self, target: &PortDataType) -> bool {
        *self == PortDataType::Any || *target == PortDataType::Any || self == target
    }

    /// Legacy convenience key populated for handlers that read by type
    pub fn legacy_key(&self) -> Option<&'static str> {
        match self {
            Self::Text => Some("text"),
            Self::Image => Some("image"),
            Self::Video => Some("video"),
            Self::Model3d => Some("model"),
            Self::Any => None,
        }
    }
}

/// The fixed node catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NodeKind {
    #[serde(rename = "text-gen")]
    TextGen,
    #[serde(rename = "image-gen")]
    ImageGen,
    #[serde(rename = "video-gen")]
    VideoGen,
    #[serde(rename = "3d-gen")]
    ModelGen,
    #[serde(rename = "script-runner")]
    ScriptRunner,
    #[serde(rename = "text-input")]
    TextInput,
    #[serde(rename = "image-input")]
    ImageInput,
    #[serde(rename = "video-input")]
    VideoInput,
    #[serde(rename = "3d-input")]
    ModelInput,
    #[serde(rename = "text-preview")]
    TextPreview,
    #[serde(rename = "image-preview")]
    ImagePreview,
    #[serde(rename = "video-preview")]
    VideoPreview,
    #[serde(rename = "3d-preview")]
    ModelPreview,
}

impl NodeKind {
    /// All catalog entries, used to build the registry
    pub const ALL: [NodeKind; 13] = [
        Self::TextGen,
        Self::ImageGen,
        Self::VideoGen,
        Self::ModelGen,
        Self::ScriptRunner,
        Self::TextInput,
        Self::ImageInput,
        Self::VideoInput,
        Self::ModelInput,
        Self::TextPreview,
        Self::ImagePreview,
        Self::VideoPreview,
        Self::ModelPreview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextGen => "text-gen",
            Self::ImageGen => "image-gen",
            Self::VideoGen => "video-gen",
            Self::ModelGen => "3d-gen",
            Self::ScriptRunner => "script-runner",
            Self::TextInput => "text-input",
            Self::ImageInput => "image-input",
            Self::VideoInput => "video-input",
            Self::ModelInput => "3d-input",
            Self::TextPreview => "text-preview",
            Self::ImagePreview => "image-preview",
            Self::VideoPreview => "video-preview",
            Self::ModelPreview => "3d-preview",
        }
    }

    /// Input nodes emit a held literal, never call a provider
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            Self::TextInput | Self::ImageInput | Self::VideoInput | Self::ModelInput
        )
    }

    /// Preview nodes pass their resolved input through
    pub fn is_preview(&self) -> bool {
        matches!(
            self,
            Self::TextPreview | Self::ImagePreview | Self::VideoPreview | Self::ModelPreview
        )
    }

    /// Generator nodes call a provider backend
    pub fn is_generator(&self) -> bool {
        matches!(
            self,
            Self::TextGen | Self::ImageGen | Self::VideoGen | Self::ModelGen
        )
    }

    /// The port data type this kind produces or previews
    pub fn media_type(&self) -> PortDataType {
        match self {
            Self::TextGen | Self::TextInput | Self::TextPreview | Self::ScriptRunner => {
                PortDataType::Text
            }
            Self::ImageGen | Self::ImageInput | Self::ImagePreview => PortDataType::Image,
            Self::VideoGen | Self::VideoInput | Self::VideoPreview => PortDataType::Video,
            Self::ModelGen | Self::ModelInput | Self::ModelPreview => PortDataType::Model3d,
        }
    }
}

/// Definition of a single port (input or output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortDefinition {
    /// Unique identifier within the node
    pub id: String,
    /// Human-readable label
    pub label: String,
    /// Data type this port accepts/produces
    pub data_type: PortDataType,
    /// Whether this input is required for execution
    #[serde(default)]
    pub required: bool,
}

impl PortDefinition {
    pub fn required(id: impl Into<String>, label: impl Into<String>, data_type: PortDataType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            data_type,
            required: true,
        }
    }

    pub fn optional(id: impl Into<String>, label: impl Into<String>, data_type: PortDataType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            data_type,
            required: false,
        }
    }
}

/// Complete definition of a node type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub kind: NodeKind,
    /// Human-readable name
    pub label: String,
    /// Input port definitions
    pub inputs: Vec<PortDefinition>,
    /// Output port definitions
    pub outputs: Vec<PortDefinition>,
    /// Fields that must be satisfied by an edge or a literal before running
    #[serde(default)]
    pub required_fields: Vec<String>,
}

impl NodeDefinition {
    /// Look up an input port by id
    pub fn input_port(&self, id: &str) -> Option<&PortDefinition> {
        self.inputs.iter().find(|p| p.id == id)
    }

    /// The primary output port, if the node has one
    pub fn primary_output(&self) -> Option<&PortDefinition> {
        self.outputs.first()
    }
}

/// A node instance in a workflow graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    /// Unique instance ID
    pub id: String,
    /// Node type (references the catalog)
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Node-specific configuration data (model, prompt, parameters, ...)
    #[serde(default)]
    pub data: serde_json::Value,
    /// Pass held data through instead of executing
    #[serde(default)]
    pub skip: bool,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            data: serde_json::Value::Null,
            skip: false,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

/// An edge connecting two nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Unique edge ID
    pub id: String,
    /// Source node ID
    pub source: String,
    /// Source port ID (output)
    pub source_handle: String,
    /// Target node ID
    pub target: String,
    /// Target port ID (input)
    pub target_handle: String,
}

impl GraphEdge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        source_handle: impl Into<String>,
        target: impl Into<String>,
        target_handle: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            source_handle: source_handle.into(),
            target: target.into(),
            target_handle: target_handle.into(),
        }
    }
}

/// Complete workflow graph
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorkflowGraph {
    /// All nodes in the graph
    pub nodes: Vec<GraphNode>,
    /// All edges connecting nodes
    pub edges: Vec<GraphEdge>,
}

impl WorkflowGraph {
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Self { nodes, edges }
    }

    /// Find a node by ID
    pub fn find_node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Check if there's an edge connecting to a specific input port
    pub fn has_edge_to(&self, node_id: &str, port_id: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.target == node_id && e.target_handle == port_id)
    }

    /// Get all edges that feed into a specific node, in declaration order
    pub fn incoming_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.target == node_id)
    }
}

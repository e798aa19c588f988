//! Script runner node
//!
//! Runs the node's script through `sh -c` with the resolved inputs as a
//! JSON document on stdin. Stdout becomes the node's text output; a
//! non-zero exit or a timeout fails the node.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::{EngineError, Result};
use crate::types::{GraphNode, NodeDefinition, NodeKind, PortDataType, PortDefinition};

use super::{with_default, InputsExt, NodeHandler, NodeInputs, NodeOutputs, NodeServices};

/// Wall-clock limit for one script invocation
const SCRIPT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct ScriptRunnerNode {
    definition: NodeDefinition,
}

impl ScriptRunnerNode {
    pub fn new() -> Self {
        Self {
            definition: NodeDefinition {
                kind: NodeKind::ScriptRunner,
                label: "Script Runner".to_string(),
                inputs: vec![
                    PortDefinition::optional("script", "Script", PortDataType::Text),
                    PortDefinition::optional("input", "Input", PortDataType::Any),
                ],
                outputs: vec![PortDefinition::optional("text", "Output", PortDataType::Text)],
                required_fields: vec!["script".to_string()],
            },
        }
    }
}

impl Default for ScriptRunnerNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeHandler for ScriptRunnerNode {
    fn definition(&self) -> &NodeDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        node: &GraphNode,
        inputs: &NodeInputs,
        _services: &NodeServices<'_>,
    ) -> Result<NodeOutputs> {
        let script = inputs.get_string("script")?;
        let payload = serde_json::to_string(inputs)?;
        debug!("node {}: running script ({} bytes of input)", node.id, payload.len());

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(payload.as_bytes()).await?;
        }

        let output = match timeout(SCRIPT_TIMEOUT, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(EngineError::script(format!(
                    "timed out after {}s",
                    SCRIPT_TIMEOUT.as_secs()
                )))
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(EngineError::script(format!(
                "exit {}: {}",
                code,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout)
            .trim_end()
            .to_string();
        Ok(with_default("text", Value::String(stdout)))
    }
}

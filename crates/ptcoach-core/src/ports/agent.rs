//! Remote conversational agent protocol.
//!
//! # Design Rules
//!
//! - Callbacks are delivered as [`AgentEvent`]s over one channel per session,
//!   so the session manager consumes them in order on a single task.
//! - Tools are plain closures keyed by name; the transport invokes them when
//!   the agent calls a client tool and sends the returned string back.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::{MessageRole, Mode};

// ── Tools ────────────────────────────────────────────────────────────────────

/// Parameters passed by the agent to a client tool.
pub type ToolParams = HashMap<String, serde_json::Value>;

/// Error returned by a client tool handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

/// A named handler the agent can call to push structured data into the app.
pub type ClientTool = Arc<dyn Fn(&ToolParams) -> Result<String, ToolError> + Send + Sync>;

/// Name → handler table registered with a session.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ClientTool>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any previous handler.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&ToolParams) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        self.tools.insert(name.into(), Arc::new(handler));
    }

    /// Invoke the handler registered under `name`.
    pub fn invoke(&self, name: &str, params: &ToolParams) -> Result<String, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_owned()))?;
        tool(params)
    }

    /// Registered tool names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ── Session configuration & events ───────────────────────────────────────────

/// Everything the transport needs to open one agent session.
#[derive(Debug, Clone)]
pub struct AgentSessionConfig {
    /// Remote agent identifier.
    pub agent_id: String,
    pub tools: ToolRegistry,
}

/// How an agent-reported error should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentErrorKind {
    /// The connection dropped; worth reconnecting.
    Transport,
    /// The agent refused or ended the conversation; retrying will not help.
    Definitive,
}

/// Callback stream of one live session.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    Connected { conversation_id: String },
    Disconnected,
    ModeChanged(Mode),
    /// Output volume, 0.0–1.0.
    VolumeUpdate(f32),
    Message { text: String, role: MessageRole },
    Error {
        kind: AgentErrorKind,
        code: String,
        details: String,
    },
}

/// Sender half handed to the transport when a session is opened.
pub type AgentEventSink = mpsc::UnboundedSender<AgentEvent>;

// ── Errors ───────────────────────────────────────────────────────────────────

/// Errors returned by agent transport operations.
#[derive(Debug, Clone, Error)]
pub enum AgentPortError {
    /// Network / socket failure.
    #[error("Agent transport failure: {0}")]
    Transport(String),

    /// The remote side rejected the request.
    #[error("Agent rejected request: {0}")]
    Rejected(String),

    /// The session is already closed.
    #[error("Agent session is closed")]
    Closed,
}

impl AgentPortError {
    /// Whether the failure is a dropped transport rather than a definitive refusal.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

// ── Port traits ──────────────────────────────────────────────────────────────

/// Opens sessions with the remote conversational agent service.
#[async_trait]
pub trait ConversationalAgentPort: Send + Sync {
    /// Connect and return a handle once the session is established.
    ///
    /// `events` receives every callback for the lifetime of the session.
    async fn start_session(
        &self,
        config: AgentSessionConfig,
        events: AgentEventSink,
    ) -> Result<Box<dyn AgentConnection>, AgentPortError>;
}

/// Handle to one live agent session.
#[async_trait]
pub trait AgentConnection: Send + Sync {
    async fn end_session(&self) -> Result<(), AgentPortError>;

    async fn start_recording(&self) -> Result<(), AgentPortError>;

    async fn stop_recording(&self) -> Result<(), AgentPortError>;

    /// End the agent's current speaking turn.
    async fn interrupt(&self) -> Result<(), AgentPortError>;

    fn conversation_id(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_invokes_registered_tool() {
        let mut registry = ToolRegistry::new();
        registry.register("echo", |params: &ToolParams| {
            params
                .get("text")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
                .ok_or_else(|| ToolError::InvalidParameters("text".into()))
        });

        let mut params = ToolParams::new();
        params.insert("text".into(), serde_json::json!("hello"));
        assert_eq!(registry.invoke("echo", &params).unwrap(), "hello");
        assert_eq!(
            registry.invoke("echo", &ToolParams::new()),
            Err(ToolError::InvalidParameters("text".into()))
        );
    }

    #[test]
    fn registry_reports_unknown_tool() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(
            registry.invoke("missing", &ToolParams::new()),
            Err(ToolError::UnknownTool("missing".into()))
        );
    }

    #[test]
    fn transport_errors_are_classified() {
        assert!(AgentPortError::Transport("reset".into()).is_transport());
        assert!(!AgentPortError::Rejected("bad agent".into()).is_transport());
        assert!(!AgentPortError::Closed.is_transport());
    }
}

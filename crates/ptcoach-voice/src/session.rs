//! One live connection to a remote conversational agent.

use std::fmt;

use tokio::task::JoinHandle;

use ptcoach_core::{AgentConnection, AgentPortError, AgentType};

/// Wraps the transport handle together with the task that pumps its
/// callbacks into the session manager.
///
/// Dropping the session aborts the pump; the transport connection itself is
/// only closed by [`AgentSession::end`].
pub struct AgentSession {
    agent: AgentType,
    connection: Box<dyn AgentConnection>,
    conversation_id: String,
    pump: JoinHandle<()>,
}

impl AgentSession {
    pub fn new(agent: AgentType, connection: Box<dyn AgentConnection>, pump: JoinHandle<()>) -> Self {
        let conversation_id = connection.conversation_id();
        Self {
            agent,
            connection,
            conversation_id,
            pump,
        }
    }

    #[must_use]
    pub const fn agent(&self) -> AgentType {
        self.agent
    }

    #[must_use]
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Close the remote conversation and stop consuming its callbacks.
    pub async fn end(&self) -> Result<(), AgentPortError> {
        let result = self.connection.end_session().await;
        self.pump.abort();
        result
    }

    pub async fn start_recording(&self) -> Result<(), AgentPortError> {
        self.connection.start_recording().await
    }

    pub async fn stop_recording(&self) -> Result<(), AgentPortError> {
        self.connection.stop_recording().await
    }

    /// End the agent's current speaking turn.
    pub async fn interrupt(&self) -> Result<(), AgentPortError> {
        self.connection.interrupt().await
    }
}

impl Drop for AgentSession {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

impl fmt::Debug for AgentSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentSession")
            .field("agent", &self.agent)
            .field("conversation_id", &self.conversation_id)
            .finish_non_exhaustive()
    }
}

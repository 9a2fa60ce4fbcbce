//! Agents command handler.

use std::sync::Arc;

use anyhow::Result;
use ptcoach_core::{AgentType, NoopEmitter, SessionEventEmitter};
use ptcoach_voice::{SharedOutputs, build_tools};

/// One row of the agents listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSummary {
    pub agent: AgentType,
    pub agent_id: &'static str,
    pub display_name: &'static str,
    pub tools: Vec<String>,
}

/// Describe every agent type with the client tools registered for it.
pub fn summaries() -> Vec<AgentSummary> {
    let outputs = SharedOutputs::new();
    let emitter: Arc<dyn SessionEventEmitter> = Arc::new(NoopEmitter);
    AgentType::ALL
        .into_iter()
        .map(|agent| {
            let registry = build_tools(agent, &outputs, &emitter);
            let mut tools: Vec<String> = registry.names().map(str::to_owned).collect();
            tools.sort();
            AgentSummary {
                agent,
                agent_id: agent.agent_id(),
                display_name: agent.display_name(),
                tools,
            }
        })
        .collect()
}

pub fn execute() -> Result<()> {
    for summary in summaries() {
        println!(
            "{:<16} {:<26} {}",
            summary.agent.to_string(),
            summary.agent_id,
            summary.display_name
        );
        for tool in &summary.tools {
            println!("{:<16} - {tool}", "");
        }
    }
    Ok(())
}

//! Conversational agent identities.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Remote agent identifier of the onboarding agent.
pub const ONBOARDING_AGENT_ID: &str = "agent_pt_onboarding";

/// Remote agent identifier of the exercise-coaching agent.
pub const EXERCISE_COACH_AGENT_ID: &str = "agent_pt_exercise_coach";

/// The two conversational agents the app can talk to.
///
/// Used as the key for per-agent request flags, so it is `Copy + Hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    /// Collects the patient profile on first launch.
    Onboarding,
    /// Guides the patient through an exercise.
    ExerciseCoach,
}

impl AgentType {
    /// Every agent type, in a stable order.
    pub const ALL: [Self; 2] = [Self::Onboarding, Self::ExerciseCoach];

    /// Immutable identifier of the remote agent.
    #[must_use]
    pub const fn agent_id(self) -> &'static str {
        match self {
            Self::Onboarding => ONBOARDING_AGENT_ID,
            Self::ExerciseCoach => EXERCISE_COACH_AGENT_ID,
        }
    }

    /// Human-readable name shown in the UI.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Onboarding => "Onboarding Assistant",
            Self::ExerciseCoach => "Exercise Coach",
        }
    }

    /// Index into fixed-size per-agent tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Onboarding => 0,
            Self::ExerciseCoach => 1,
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Onboarding => f.write_str("onboarding"),
            Self::ExerciseCoach => f.write_str("exercise_coach"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_ids_are_distinct() {
        assert_ne!(
            AgentType::Onboarding.agent_id(),
            AgentType::ExerciseCoach.agent_id()
        );
    }

    #[test]
    fn indices_cover_all_agents() {
        let indices: Vec<usize> = AgentType::ALL.iter().map(|a| a.index()).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&AgentType::ExerciseCoach).unwrap();
        assert_eq!(json, "\"exercise_coach\"");
        assert_eq!(AgentType::ExerciseCoach.to_string(), "exercise_coach");
    }
}

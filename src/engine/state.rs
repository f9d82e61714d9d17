use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Simulation lifecycle states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SimulationState {
    #[default]
    Idle,
    Running {
        #[serde(skip)]
        start_time: Option<Instant>,
    },
    Stopping,
}

impl SimulationState {
    /// Check if transition from current state to target state is valid
    pub fn can_transition_to(&self, target: &SimulationState) -> bool {
        use SimulationState::*;

        matches!(
            (self, target),
            (Idle, Running { .. }) | (Running { .. }, Stopping) | (Stopping, Idle)
        )
    }

    /// Get human-readable state name
    pub fn name(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::Running { .. } => "Running",
            Self::Stopping => "Stopping",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

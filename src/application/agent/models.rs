use tokio::time::Instant;

pub const DEFAULT_MAX_STEPS: usize = 8;

#[derive(Debug, Clone)]
pub struct AgentOptions {
    /// Ceiling on oracle turns before the run is cut off.
    pub max_steps: usize,
    /// Optional wall-clock budget imposed by the hosting environment.
    pub deadline: Option<Instant>,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            deadline: None,
        }
    }
}

mod models;
mod outcome;
mod prompt;
mod runner;


pub use models::{AgentOptions, DEFAULT_MAX_STEPS};
pub use outcome::parse_run_outcome;
pub use prompt::{SYSTEM_PROMPT, initial_user_message};
pub use runner::Agent;

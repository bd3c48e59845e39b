use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::domain::types::WorkerEvent;

#[derive(Parser, Debug)]
#[command(
    name = "digital-worker",
    version,
    about = "Headless-browser digital worker"
)]
pub struct Cli {
    /// How to run: planner loop, fixed convert-case script, or line server.
    #[arg(long, value_enum, default_value_t = RunMode::Agent)]
    pub mode: RunMode,
    /// Read the invocation event from this file instead of stdin.
    #[arg(long)]
    pub event_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    Agent,
    Script,
    Serve,
}

impl Cli {
    /// Load the invocation event from the file argument or stdin. An empty
    /// input is a valid, empty event.
    pub fn load_event(&self) -> Result<WorkerEvent, Box<dyn Error>> {
        let raw = match &self.event_file {
            Some(path) => fs::read_to_string(path)?,
            None => {
                let mut buffer = String::new();
                io::stdin().read_to_string(&mut buffer)?;
                buffer
            }
        };

        if raw.trim().is_empty() {
            return Ok(WorkerEvent::default());
        }
        Ok(serde_json::from_str(&raw)?)
    }
}

//! Digital worker: a headless-browser automation worker.
//!
//! Two control shapes share one set of collaborators. The fixed-script
//! pipeline drives a hardcoded page flow and persists a screenshot; the
//! planning loop lets a hosted model select among a fixed tool palette until
//! it emits a terminal structured outcome. Browser provisioning, page
//! automation, the model, and artifact storage all sit behind traits in
//! [`infrastructure`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::worker::Worker;
pub use config::WorkerConfig;
pub use domain::types::{RunOutcome, ScriptReport, WorkerEvent};

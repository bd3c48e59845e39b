pub mod agent;
pub mod script;
pub mod stdio;
pub mod tooling;
pub mod worker;

#[cfg(test)]
pub(crate) mod testkit;

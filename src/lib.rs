pub mod agent;
pub mod assistant;
pub mod cli;
pub mod config;
pub mod document;
pub mod llm;
pub mod prompts;
pub mod search;
pub mod utils;
pub mod workflow;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use agent::{AgentReply, SearchEnabledAgent};
pub use config::Config;
pub use workflow::{Task, Workflow};

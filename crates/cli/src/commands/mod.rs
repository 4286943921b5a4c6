//! Command handlers for the cli-search CLI.

pub mod ask;

pub use ask::AskCommand;

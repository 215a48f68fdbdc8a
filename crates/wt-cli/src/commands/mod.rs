//! CLI subcommand implementations.

pub mod auto;
pub mod check;
pub mod gaps;
pub mod log;
pub mod merge;

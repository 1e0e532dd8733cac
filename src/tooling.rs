//! Tooling & Integration Layer
//!
//! Command-line front end over the runtime host: validate agent definitions,
//! render their wiring graph and push values through them.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};

// mediascan-cli/src/lib.rs
//
// Library portion of the mediascan CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod output;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, InfoArgs, MusicArgs, ProbeArgs};
pub use commands::{build_config, run};

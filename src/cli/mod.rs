mod args;
mod commands;

pub use args::Args;
pub use commands::{run_cli, run_picker};

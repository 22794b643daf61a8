use clap::Parser;

/// The picker is fully interactive; only `--help` and `--version` exist.
#[derive(Parser, Debug, Default)]
#[command(name = "gssh")]
#[command(
    version,
    about = "Pick a GCP configuration and instance, then SSH into it",
    long_about = None
)]
pub struct Args {}

use clap::Parser;
use gssh::cli::{run_cli, Args};
use gssh::config::Config;
use gssh::logging;

#[tokio::main]
async fn main() {
    // Parse CLI args
    let args = Args::parse();

    // Log to ~/.gssh/gssh.log
    if let Ok(dir) = Config::base_dir() {
        logging::init(&dir);
    }

    if let Err(e) = run_cli(args).await {
        tracing::error!("{}", e);
        println!("Error: {}", e);
        std::process::exit(1);
    }
}

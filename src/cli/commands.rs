use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::Result;
use crate::gcloud::{GcloudCli, Instance, ShellLauncher};
use crate::history::{HistoryLog, HISTORY_FILE};
use crate::inventory::{ExclusionFilter, InventoryCache};
use crate::ui::{App, Backend, Outcome};

use super::Args;

pub async fn run_cli(_args: Args) -> Result<()> {
    let dir = Config::base_dir()?;
    let config = Config::load_or_create(&dir).await?;
    tracing::info!(
        "gssh v{} starting (user {}, {} exclusions)",
        crate::VERSION,
        config.ssh.user_name,
        config.instances.exclusions.len()
    );

    let gcloud = Arc::new(GcloudCli::new(config.ssh.user_name.clone()));
    let cache = InventoryCache::new(
        dir.clone(),
        gcloud.clone(),
        ExclusionFilter::new(config.instances.exclusions.clone()),
    );
    let history = HistoryLog::open(dir.join(HISTORY_FILE)).await;

    let backend = Backend {
        provider: gcloud.clone(),
        cache: Arc::new(cache),
        history: Arc::new(Mutex::new(history)),
    };

    run_picker(backend, gcloud.as_ref()).await
}

/// Show the picker until the user quits; every finished SSH session
/// brings it back.
pub async fn run_picker(backend: Backend, launcher: &dyn ShellLauncher) -> Result<()> {
    loop {
        let mut app = App::new();
        match app.run(backend.clone()).await? {
            Outcome::Quit => return Ok(()),
            Outcome::Connect {
                configuration,
                instance,
            } => connect(&backend.history, launcher, &configuration, instance).await?,
        }
    }
}

/// Record the connection, then hand the terminal to the shell.
async fn connect(
    history: &Mutex<HistoryLog>,
    launcher: &dyn ShellLauncher,
    configuration: &str,
    instance: Instance,
) -> Result<()> {
    history
        .lock()
        .await
        .append(configuration, instance.clone())
        .await;

    println!("Connecting to {} in [{}]...", instance.name, configuration);
    launcher.open_shell(configuration, &instance).await
}

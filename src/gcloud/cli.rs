use async_trait::async_trait;
use tokio::process::Command;

use super::models::{parse_configurations, parse_instances};
use super::{Configuration, Instance, InventoryProvider, ShellLauncher};
use crate::error::{Error, Result};

const GCLOUD_BIN: &str = "gcloud";

/// Shells out to the `gcloud` CLI; assumes it is already authenticated.
#[derive(Debug, Clone)]
pub struct GcloudCli {
    user_name: String,
}

impl GcloudCli {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
        }
    }

    fn gcloud_cmd(&self) -> Command {
        let mut cmd = Command::new(GCLOUD_BIN);
        cmd.kill_on_drop(true);
        cmd
    }

    /// Run a listing command and return its stdout, mapping failures to provider errors.
    async fn output(&self, args: &[&str]) -> Result<String> {
        let output = self
            .gcloud_cmd()
            .args(args)
            .output()
            .await
            .map_err(|e| Error::provider(format!("Failed to run {GCLOUD_BIN}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::provider(format!(
                "{GCLOUD_BIN} {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Arguments for `gcloud compute ssh`.
    pub fn ssh_args(&self, configuration: &str, instance: &Instance) -> Vec<String> {
        vec![
            "compute".to_string(),
            "ssh".to_string(),
            "--configuration".to_string(),
            configuration.to_string(),
            format!("{}@{}", self.user_name, instance.name),
            format!("--zone={}", instance.zone_name()),
        ]
    }
}

#[async_trait]
impl InventoryProvider for GcloudCli {
    async fn list_configurations(&self) -> Result<Vec<Configuration>> {
        let stdout = self
            .output(&["config", "configurations", "list", "--format=json"])
            .await?;
        parse_configurations(&stdout)
            .map_err(|e| Error::provider(format!("Error parsing configurations: {e}")))
    }

    async fn list_instances(&self, configuration: &str) -> Result<Vec<Instance>> {
        let stdout = self
            .output(&[
                "compute",
                "instances",
                "list",
                "--format=json",
                "--configuration",
                configuration,
            ])
            .await?;
        parse_instances(&stdout)
            .map_err(|e| Error::provider(format!("Error parsing instances: {e}")))
    }

    async fn activate_configuration(&self, name: &str) -> Result<()> {
        self.output(&["config", "configurations", "activate", name])
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl ShellLauncher for GcloudCli {
    async fn open_shell(&self, configuration: &str, instance: &Instance) -> Result<()> {
        tracing::info!(
            "Opening shell on {} ({}) in [{}]",
            instance.name,
            instance.zone_name(),
            configuration
        );

        // stdio is inherited so the session owns the terminal until it exits
        let status = Command::new(GCLOUD_BIN)
            .args(self.ssh_args(configuration, instance))
            .status()
            .await
            .map_err(|e| Error::launch(format!("Failed to run {GCLOUD_BIN}: {e}")))?;

        if !status.success() {
            return Err(Error::launch(format!(
                "{GCLOUD_BIN} compute ssh exited with {status}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcloud::InstanceStatus;

    #[test]
    fn test_ssh_args_use_login_and_zone_name() {
        let cli = GcloudCli::new("conductor");
        let instance = Instance::new(
            "web-1",
            "projects/p/zones/europe-west1-b",
            InstanceStatus::Running,
        );

        assert_eq!(
            cli.ssh_args("prod", &instance),
            vec![
                "compute",
                "ssh",
                "--configuration",
                "prod",
                "conductor@web-1",
                "--zone=europe-west1-b",
            ]
        );
    }
}

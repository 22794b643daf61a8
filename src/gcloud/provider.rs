use async_trait::async_trait;

use super::{Configuration, Instance};
use crate::error::Result;

/// Source of configurations and instances.
#[async_trait]
pub trait InventoryProvider: Send + Sync {
    async fn list_configurations(&self) -> Result<Vec<Configuration>>;

    async fn list_instances(&self, configuration: &str) -> Result<Vec<Instance>>;

    /// Make `name` the provider's current configuration.
    async fn activate_configuration(&self, name: &str) -> Result<()>;
}

/// Opens an interactive shell on an instance.
///
/// Blocks until the session ends; the session inherits the terminal.
#[async_trait]
pub trait ShellLauncher: Send + Sync {
    async fn open_shell(&self, configuration: &str, instance: &Instance) -> Result<()>;
}

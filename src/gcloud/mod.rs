mod cli;
mod models;
mod provider;

#[cfg(test)]
pub(crate) mod fake;

pub use cli::GcloudCli;
pub use models::{parse_configurations, parse_instances, Configuration, Instance, InstanceStatus};
pub use provider::{InventoryProvider, ShellLauncher};

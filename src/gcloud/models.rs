use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A named gcloud account/project context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub name: String,
    pub account: String,
    pub project: String,
    pub active: bool,
}

/// Instance lifecycle status (only `Running` is ever offered for selection)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
    Running,
    Stopped,
    Terminated,
}

impl InstanceStatus {
    /// gcloud reports more states than we track; anything that is neither
    /// running nor terminated counts as stopped.
    pub fn from_gcloud(raw: &str) -> Self {
        match raw {
            "RUNNING" => Self::Running,
            "TERMINATED" => Self::Terminated,
            _ => Self::Stopped,
        }
    }
}

/// A compute instance, scoped to the configuration it was listed from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Instance {
    pub name: String,
    /// Zone as reported by gcloud (usually a full resource URL).
    pub zone: String,
    pub status: InstanceStatus,
}

impl Instance {
    pub fn new(name: impl Into<String>, zone: impl Into<String>, status: InstanceStatus) -> Self {
        Self {
            name: name.into(),
            zone: zone.into(),
            status,
        }
    }

    /// Last path segment of the zone, e.g. `europe-west1-b`.
    pub fn zone_name(&self) -> &str {
        self.zone.rsplit('/').next().unwrap_or(&self.zone)
    }

    pub fn is_running(&self) -> bool {
        self.status == InstanceStatus::Running
    }
}

#[derive(Debug, Deserialize)]
struct RawConfiguration {
    name: String,
    #[serde(default)]
    is_active: bool,
    #[serde(default)]
    properties: RawProperties,
}

#[derive(Debug, Default, Deserialize)]
struct RawProperties {
    #[serde(default)]
    core: RawCore,
}

#[derive(Debug, Default, Deserialize)]
struct RawCore {
    #[serde(default)]
    account: String,
    #[serde(default)]
    project: String,
}

#[derive(Debug, Deserialize)]
struct RawInstance {
    name: String,
    #[serde(default)]
    zone: String,
    #[serde(default)]
    status: String,
}

/// Parse `gcloud config configurations list --format=json`.
pub fn parse_configurations(json: &str) -> Result<Vec<Configuration>> {
    let raw: Vec<RawConfiguration> = serde_json::from_str(json)?;
    Ok(raw
        .into_iter()
        .map(|c| Configuration {
            name: c.name,
            account: c.properties.core.account,
            project: c.properties.core.project,
            active: c.is_active,
        })
        .collect())
}

/// Parse `gcloud compute instances list --format=json`.
pub fn parse_instances(json: &str) -> Result<Vec<Instance>> {
    let raw: Vec<RawInstance> = serde_json::from_str(json)?;
    Ok(raw
        .into_iter()
        .map(|i| Instance::new(i.name, i.zone, InstanceStatus::from_gcloud(&i.status)))
        .collect())
}

//! In-memory provider for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Configuration, Instance, InventoryProvider};
use crate::error::{Error, Result};

#[derive(Default)]
pub struct FakeProvider {
    pub configurations: Vec<Configuration>,
    pub instances: HashMap<String, Vec<Instance>>,
    pub fail_instances: bool,
    instance_calls: AtomicUsize,
    activated: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn with_instances(configuration: &str, instances: Vec<Instance>) -> Self {
        let mut fake = Self::default();
        fake.instances.insert(configuration.to_string(), instances);
        fake
    }

    pub fn failing() -> Self {
        Self {
            fail_instances: true,
            ..Self::default()
        }
    }

    pub fn instance_calls(&self) -> usize {
        self.instance_calls.load(Ordering::SeqCst)
    }

    pub fn activated(&self) -> Vec<String> {
        self.activated.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl InventoryProvider for FakeProvider {
    async fn list_configurations(&self) -> Result<Vec<Configuration>> {
        Ok(self.configurations.clone())
    }

    async fn list_instances(&self, configuration: &str) -> Result<Vec<Instance>> {
        self.instance_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_instances {
            return Err(Error::provider("permission denied"));
        }
        Ok(self
            .instances
            .get(configuration)
            .cloned()
            .unwrap_or_default())
    }

    async fn activate_configuration(&self, name: &str) -> Result<()> {
        if let Ok(mut activated) = self.activated.lock() {
            activated.push(name.to_string());
        }
        Ok(())
    }
}

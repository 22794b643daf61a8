use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::fs;
use tokio::sync::Mutex;

use super::ExclusionFilter;
use crate::error::Result;
use crate::gcloud::{Instance, InventoryProvider};
use crate::persist::write_atomic;

/// Exclusion-filtered instance list for one configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub configuration: String,
    /// All statuses; callers decide what to display.
    pub instances: Vec<Instance>,
    pub last_update: DateTime<Local>,
    pub from_cache: bool,
}

/// On-disk instance cache, one JSON file per configuration.
///
/// The remote provider is only called when no usable snapshot exists,
/// so repeated non-forced refreshes are served from disk.
pub struct InventoryCache {
    dir: PathBuf,
    provider: Arc<dyn InventoryProvider>,
    filter: ExclusionFilter,
    /// Serialises snapshot writes from overlapping refreshes.
    write_lock: Mutex<()>,
}

impl InventoryCache {
    pub fn new(
        dir: impl Into<PathBuf>,
        provider: Arc<dyn InventoryProvider>,
        filter: ExclusionFilter,
    ) -> Self {
        Self {
            dir: dir.into(),
            provider,
            filter,
            write_lock: Mutex::new(()),
        }
    }

    /// Snapshot file for a configuration
    pub fn cache_path(&self, configuration: &str) -> PathBuf {
        let safe: String = configuration
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.dir.join(format!("instances_cache_{safe}.json"))
    }

    /// Return the instances of `configuration`, from cache when possible.
    ///
    /// `force` deletes the snapshot first. Provider failures are returned;
    /// cache read/write failures only degrade to a remote fetch / no write.
    pub async fn refresh(&self, configuration: &str, force: bool) -> Result<Snapshot> {
        let path = self.cache_path(configuration);

        if force {
            if let Err(e) = fs::remove_file(&path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove cache {}: {}", path.display(), e);
                }
            }
        }

        if let Some((cached, modified)) = Self::read_snapshot(&path).await {
            tracing::debug!(
                "Serving {} instances for [{}] from cache",
                cached.len(),
                configuration
            );
            return Ok(Snapshot {
                configuration: configuration.to_string(),
                instances: self.filter.apply(cached),
                last_update: modified,
                from_cache: true,
            });
        }

        let fetched = self.provider.list_instances(configuration).await?;
        let instances = self.filter.apply(fetched);
        tracing::info!(
            "Fetched {} instances for [{}]",
            instances.len(),
            configuration
        );

        let last_update = Local::now();
        match serde_json::to_vec(&instances) {
            Ok(bytes) => {
                let _guard = self.write_lock.lock().await;
                if let Err(e) = write_atomic(&path, &bytes).await {
                    tracing::warn!("Failed to write cache {}: {}", path.display(), e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize cache for [{}]: {}", configuration, e),
        }

        Ok(Snapshot {
            configuration: configuration.to_string(),
            instances,
            last_update,
            from_cache: false,
        })
    }

    /// Cached instances and the file's modification time; `None` when the
    /// file is missing, unreadable, malformed or empty.
    async fn read_snapshot(path: &Path) -> Option<(Vec<Instance>, DateTime<Local>)> {
        let content = fs::read(path).await.ok()?;
        let instances: Vec<Instance> = match serde_json::from_slice(&content) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!("Ignoring unreadable cache {}: {}", path.display(), e);
                return None;
            }
        };
        if instances.is_empty() {
            return None;
        }

        let modified = fs::metadata(path)
            .await
            .and_then(|m| m.modified())
            .map(DateTime::<Local>::from)
            .unwrap_or_else(|_| Local::now());

        Some((instances, modified))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcloud::fake::FakeProvider;
    use crate::gcloud::InstanceStatus;
    use tempfile::tempdir;

    fn sample() -> Vec<Instance> {
        vec![
            Instance::new("A", "zones/europe-west1-b", InstanceStatus::Running),
            Instance::new("B", "zones/europe-west1-b", InstanceStatus::Stopped),
            Instance::new("gke-x", "zones/europe-west1-b", InstanceStatus::Running),
        ]
    }

    fn cache_with(dir: &Path, fake: Arc<FakeProvider>) -> InventoryCache {
        InventoryCache::new(dir, fake, ExclusionFilter::new(["gke-"]))
    }

    #[tokio::test]
    async fn test_second_refresh_is_served_from_cache() {
        let dir = tempdir().unwrap();
        let fake = Arc::new(FakeProvider::with_instances("prod", sample()));
        let cache = cache_with(dir.path(), fake.clone());

        let first = cache.refresh("prod", false).await.unwrap();
        let second = cache.refresh("prod", false).await.unwrap();

        assert_eq!(fake.instance_calls(), 1);
        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(first.instances, second.instances);
    }

    #[tokio::test]
    async fn test_cache_never_contains_excluded_names() {
        let dir = tempdir().unwrap();
        let fake = Arc::new(FakeProvider::with_instances("prod", sample()));
        let cache = cache_with(dir.path(), fake);

        let snapshot = cache.refresh("prod", false).await.unwrap();
        let names: Vec<_> = snapshot.instances.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);

        let on_disk: Vec<Instance> =
            serde_json::from_slice(&fs::read(cache.cache_path("prod")).await.unwrap()).unwrap();
        assert_eq!(on_disk, snapshot.instances);
    }

    #[tokio::test]
    async fn test_exclusions_apply_to_pre_existing_cache() {
        let dir = tempdir().unwrap();
        let fake = Arc::new(FakeProvider::default());
        let cache = cache_with(dir.path(), fake.clone());
        fs::write(
            cache.cache_path("prod"),
            serde_json::to_vec(&sample()).unwrap(),
        )
        .await
        .unwrap();

        let snapshot = cache.refresh("prod", false).await.unwrap();
        assert!(snapshot.from_cache);
        assert_eq!(fake.instance_calls(), 0);
        assert!(snapshot.instances.iter().all(|i| i.name != "gke-x"));
    }

    #[tokio::test]
    async fn test_force_refetches() {
        let dir = tempdir().unwrap();
        let fake = Arc::new(FakeProvider::with_instances("prod", sample()));
        let cache = cache_with(dir.path(), fake.clone());

        cache.refresh("prod", false).await.unwrap();
        let forced = cache.refresh("prod", true).await.unwrap();

        assert_eq!(fake.instance_calls(), 2);
        assert!(!forced.from_cache);
        assert!(cache.cache_path("prod").exists());
    }

    #[tokio::test]
    async fn test_corrupt_or_empty_cache_falls_back_to_fetch() {
        let dir = tempdir().unwrap();
        let fake = Arc::new(FakeProvider::with_instances("prod", sample()));
        let cache = cache_with(dir.path(), fake.clone());

        fs::write(cache.cache_path("prod"), b"{oops").await.unwrap();
        cache.refresh("prod", false).await.unwrap();
        assert_eq!(fake.instance_calls(), 1);

        fs::write(cache.cache_path("prod"), b"[]").await.unwrap();
        cache.refresh("prod", false).await.unwrap();
        assert_eq!(fake.instance_calls(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_refreshes_leave_a_readable_snapshot() {
        let dir = tempdir().unwrap();
        let fake = Arc::new(FakeProvider::with_instances("prod", sample()));
        let cache = Arc::new(cache_with(dir.path(), fake));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.refresh("prod", true).await })
            })
            .collect();
        for handle in handles {
            tokio_test::assert_ok!(handle.await.unwrap());
        }

        let on_disk: Vec<Instance> =
            serde_json::from_slice(&fs::read(cache.cache_path("prod")).await.unwrap()).unwrap();
        assert_eq!(on_disk.len(), 2);
        let snapshot = cache.refresh("prod", false).await.unwrap();
        assert!(snapshot.from_cache);
    }

    #[tokio::test]
    async fn test_provider_error_is_surfaced_and_nothing_cached() {
        let dir = tempdir().unwrap();
        let fake = Arc::new(FakeProvider::failing());
        let cache = cache_with(dir.path(), fake);

        assert!(cache.refresh("prod", false).await.is_err());
        assert!(!cache.cache_path("prod").exists());
    }
}

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::Result;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Sibling temp path, unique per process and call.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.{}.{n}.tmp", std::process::id()))
}

/// Atomic write: write to a sibling temp file, then rename over `path`.
///
/// Each call gets its own temp file, so concurrent writers never share
/// one; the last rename wins.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let temp_path = temp_path_for(path);
    let written = async {
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&temp_path, path).await
    }
    .await;

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn leftover_temp_files(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count()
    }

    #[tokio::test]
    async fn test_write_atomic_replaces_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");

        write_atomic(&path, b"[1]").await.unwrap();
        write_atomic(&path, b"[]").await.unwrap();

        assert_eq!(fs::read_to_string(&path).await.unwrap(), "[]");
        assert_eq!(leftover_temp_files(dir.path()), 0);
    }

    #[test]
    fn test_temp_paths_are_distinct_siblings() {
        let path = Path::new("/tmp/cache/instances.json");
        let a = temp_path_for(path);
        let b = temp_path_for(path);
        assert_ne!(a, b);
        assert_eq!(a.parent(), path.parent());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_writers_leave_a_complete_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("instances.json");

        for round in 0..50 {
            let mut handles = Vec::new();
            for writer in 0..4usize {
                let path = path.clone();
                let len = if (round + writer) % 2 == 0 { 3 } else { 5000 };
                handles.push(tokio::spawn(async move {
                    let payload = serde_json::to_vec(&vec![writer; len]).unwrap();
                    write_atomic(&path, &payload).await
                }));
            }
            for handle in handles {
                tokio_test::assert_ok!(handle.await.unwrap());
            }

            let bytes = fs::read(&path).await.unwrap();
            let parsed: Vec<usize> = serde_json::from_slice(&bytes).unwrap();
            assert!(parsed.len() == 3 || parsed.len() == 5000);
        }
        assert_eq!(leftover_temp_files(dir.path()), 0);
    }
}

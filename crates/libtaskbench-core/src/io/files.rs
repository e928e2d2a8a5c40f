//! Ephemeral benchmark files: create, read back, clean up

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{BenchError, Result};
use crate::group::WorkerGroup;

/// Content written for file `index`, embedding a random value
pub fn synthetic_content(index: usize, value: f64) -> String {
    format!("Test file {} content with some data: {}", index, value)
}

/// Write one file with fresh synthetic content and return what was written
pub async fn create_test_file(path: PathBuf, index: usize) -> Result<String> {
    let content = synthetic_content(index, rand::random::<f64>());
    tokio::fs::write(&path, &content)
        .await
        .map_err(|source| BenchError::FileWrite { path, source })?;
    Ok(content)
}

pub async fn read_test_file(path: PathBuf) -> Result<String> {
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| BenchError::FileRead { path, source })
}

/// Delete a file, swallowing any failure. Returns whether it was removed.
pub async fn remove_test_file(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => true,
        Err(e) => {
            trace!(path = %path.display(), error = %e, "Ignoring cleanup failure");
            false
        }
    }
}

/// The files owned by one I/O-intensive task
///
/// Names are `temp_{namespace}_{index}.txt` under `dir`, so two sets with
/// different namespaces never collide.
#[derive(Debug, Clone)]
pub struct FileSet {
    dir: PathBuf,
    namespace: String,
    count: usize,
}

impl FileSet {
    pub fn new(dir: impl Into<PathBuf>, namespace: impl Into<String>, count: usize) -> Self {
        Self {
            dir: dir.into(),
            namespace: namespace.into(),
            count,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("temp_{}_{}.txt", self.namespace, index))
    }

    /// Create every file concurrently; fails with the first write error
    pub async fn create_all(&self, group: &WorkerGroup) -> Result<Vec<String>> {
        debug!(namespace = %self.namespace, count = self.count, "Creating files");
        group
            .run(self.count, |i| create_test_file(self.path(i), i))
            .await
            .into_result()
    }

    /// Read every file concurrently into a slot per index
    pub async fn read_all(&self, group: &WorkerGroup) -> Result<Vec<String>> {
        debug!(namespace = %self.namespace, count = self.count, "Reading files");
        group
            .run(self.count, |i| read_test_file(self.path(i)))
            .await
            .into_result()
    }

    /// Delete every file concurrently. Never fails; returns how many were removed.
    pub async fn cleanup(&self, group: &WorkerGroup) -> usize {
        let outcome = group
            .run(self.count, |i| {
                let path = self.path(i);
                async move { Ok(remove_test_file(&path).await) }
            })
            .await;
        let removed = outcome.slots.iter().filter(|s| matches!(s, Some(true))).count();
        debug!(namespace = %self.namespace, removed, "Cleaned up files");
        removed
    }
}

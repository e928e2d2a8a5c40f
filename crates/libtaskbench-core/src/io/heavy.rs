//! Heavy I/O benchmark: large hashed files with integrity checks
//!
//! Same phase structure as the regular I/O task, but every file carries a
//! multi-megabyte payload, gzip-compressed and hex-encoded inside a JSON
//! envelope with the SHA-256 hash of the uncompressed content. Generation,
//! compression, hashing and verification run on blocking workers.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::files::remove_test_file;
use super::network::NetworkCalls;
use super::runner::{run_top_level, TaskStats};
use super::task::read_while_pending;
use crate::config::{BenchmarkConfig, BenchmarkMode, HeavyWorkload};
use crate::error::{BenchError, Result};
use crate::group::WorkerGroup;
use crate::report::{BenchmarkSummary, Reporter};

/// On-disk format of a heavy benchmark file
#[derive(Debug, Serialize, Deserialize)]
pub struct FileEnvelope {
    /// Hex SHA-256 of the uncompressed payload
    pub hash: String,
    /// Hex of the gzip-compressed payload
    pub data: String,
    pub timestamp: u64,
}

/// Deterministic payload of roughly `size_mb` MiB
pub fn generate_payload(size_mb: usize, seed: &str) -> String {
    let chunks = size_mb * 1024;
    let filler = "x".repeat(900);
    let mut content = String::with_capacity(chunks * 1024);
    for i in 0..chunks {
        content.push_str(&format!("Data chunk {} with seed {}: {}\n", i, seed, filler));
    }
    content
}

pub fn compute_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

pub fn compress(content: &str) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content.as_bytes())?;
    Ok(encoder.finish()?)
}

/// Inflate a gzip stream; corrupt or truncated input is an integrity error
pub fn decompress(compressed: &[u8]) -> Result<String> {
    let mut content = String::new();
    GzDecoder::new(compressed)
        .read_to_string(&mut content)
        .map_err(|e| BenchError::Integrity(format!("corrupt payload: {}", e)))?;
    Ok(content)
}

/// Build, serialize and write one envelope
pub fn write_envelope(path: &Path, seed: &str, size_mb: usize) -> Result<()> {
    let content = generate_payload(size_mb, seed);
    let envelope = FileEnvelope {
        hash: compute_hash(&content),
        data: hex::encode(compress(&content)?),
        timestamp: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default(),
    };
    let json = serde_json::to_string(&envelope)?;
    std::fs::write(path, json).map_err(|source| BenchError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse an envelope, inflate it and check its hash; returns the payload
pub fn verify_envelope(json: &str) -> Result<String> {
    let envelope: FileEnvelope = serde_json::from_str(json)?;
    let compressed = hex::decode(&envelope.data)
        .map_err(|e| BenchError::Integrity(format!("payload is not hex: {}", e)))?;
    let content = decompress(&compressed)?;

    let actual = compute_hash(&content);
    if actual != envelope.hash {
        return Err(BenchError::Integrity(format!(
            "hash mismatch: expected {}, got {}",
            envelope.hash, actual
        )));
    }
    Ok(content)
}

/// Read a file, retrying while it cannot be opened or read
async fn read_with_retry(path: &Path, attempts: u32, retry_delay: Duration) -> Result<String> {
    let mut attempt = 1;
    loop {
        match tokio::fs::read_to_string(path).await {
            Ok(json) => return Ok(json),
            Err(_) if attempt < attempts => {
                attempt += 1;
                tokio::time::sleep(retry_delay).await;
            }
            Err(source) => {
                return Err(BenchError::FileRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }
}

/// The files owned by one heavy task: `temp_{task_id}_{index}.dat`
#[derive(Debug, Clone)]
pub struct HeavyFileSet {
    dir: PathBuf,
    task_id: String,
    count: usize,
}

impl HeavyFileSet {
    pub fn new(dir: impl Into<PathBuf>, task_id: impl Into<String>, count: usize) -> Self {
        Self {
            dir: dir.into(),
            task_id: task_id.into(),
            count,
        }
    }

    pub fn path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("temp_{}_{}.dat", self.task_id, index))
    }

    fn seed(&self, index: usize) -> String {
        format!("{}_{}", self.task_id, index)
    }

    pub async fn create_all(&self, group: &WorkerGroup, size_mb: usize) -> Result<()> {
        group
            .run(self.count, |i| {
                let path = self.path(i);
                let seed = self.seed(i);
                async move {
                    tokio::task::spawn_blocking(move || write_envelope(&path, &seed, size_mb))
                        .await?
                }
            })
            .await
            .into_result()
            .map(|_| ())
    }

    /// Read and verify every file; returns payload sizes in bytes
    pub async fn read_all(
        &self,
        group: &WorkerGroup,
        workload: &HeavyWorkload,
    ) -> Result<Vec<usize>> {
        let attempts = workload.read_retries.max(1);
        let retry_delay = Duration::from_millis(workload.retry_delay_ms);

        group
            .run(self.count, |i| {
                let path = self.path(i);
                async move {
                    let json = read_with_retry(&path, attempts, retry_delay).await?;
                    let payload =
                        tokio::task::spawn_blocking(move || verify_envelope(&json)).await??;
                    Ok::<_, BenchError>(payload.len())
                }
            })
            .await
            .into_result()
    }

    pub async fn cleanup(&self, group: &WorkerGroup) {
        group
            .run(self.count, |i| {
                let path = self.path(i);
                async move { Ok(remove_test_file(&path).await) }
            })
            .await;
    }
}

/// One heavy top-level task; cleanup runs on every exit path
pub async fn heavy_io_task(
    files: &HeavyFileSet,
    workload: &HeavyWorkload,
    group: &WorkerGroup,
) -> Result<TaskStats> {
    let start = Instant::now();
    let outcome = run_heavy_phases(files, workload, group).await;
    files.cleanup(group).await;

    Ok(TaskStats {
        files_processed: outcome?,
        elapsed: Some(start.elapsed()),
    })
}

async fn run_heavy_phases(
    files: &HeavyFileSet,
    workload: &HeavyWorkload,
    group: &WorkerGroup,
) -> Result<usize> {
    files.create_all(group, workload.file_size_mb).await?;
    debug!(task = %files.task_id, count = files.count, "Heavy files written");

    tokio::time::sleep(Duration::from_millis(workload.settle_ms)).await;

    let network = NetworkCalls::launch(group, workload.network_calls, &workload.delay_ms);
    let (verified, _) = read_while_pending(files.read_all(group, workload), network).await;

    let verified = verified?;
    debug!(
        task = %files.task_id,
        bytes = verified.iter().sum::<usize>(),
        "Heavy files verified"
    );
    Ok(verified.len())
}

/// Run `config.task_count` heavy tasks concurrently
pub async fn run_heavy_benchmark(
    config: &BenchmarkConfig,
    reporter: Arc<dyn Reporter>,
) -> BenchmarkSummary {
    let workload = Arc::new(config.heavy.clone());
    let work_dir = config.work_dir.clone();
    let group = WorkerGroup::new(config.concurrency);

    run_top_level(
        BenchmarkMode::Heavy,
        config.task_count,
        config.concurrency,
        reporter,
        move |index| {
            let workload = Arc::clone(&workload);
            let task_id = format!("task{}", index + 1);
            let files = HeavyFileSet::new(work_dir.clone(), task_id, workload.file_count);
            async move { heavy_io_task(&files, &workload, &group).await }
        },
    )
    .await
}

//! Benchmark configuration

use std::ops::RangeInclusive;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default number of top-level tasks when none is given
pub const DEFAULT_TASK_COUNT: usize = 10;

/// Which workload a run measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BenchmarkMode {
    /// Sequential floating-point loops
    #[default]
    Cpu,
    /// Concurrent small-file lifecycle plus simulated network calls
    Io,
    /// Large hashed files with integrity verification
    Heavy,
}

impl BenchmarkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BenchmarkMode::Cpu => "cpu",
            BenchmarkMode::Io => "io",
            BenchmarkMode::Heavy => "heavy",
        }
    }

    /// Banner printed before the first task starts
    pub fn banner(&self) -> &'static str {
        match self {
            BenchmarkMode::Cpu => "Rust benchmark start",
            BenchmarkMode::Io => "Rust I/O benchmark start",
            BenchmarkMode::Heavy => "Rust I/O benchmark start (heavy)",
        }
    }
}

/// How many sub-workers of a phase may be in flight at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConcurrencyPolicy {
    /// One task per unit of work, no cap
    #[default]
    Unbounded,
    /// At most `n` sub-workers per group (clamped to at least 1)
    Bounded(usize),
}

impl ConcurrencyPolicy {
    pub fn from_limit(limit: Option<usize>) -> Self {
        match limit {
            Some(n) => ConcurrencyPolicy::Bounded(n),
            None => ConcurrencyPolicy::Unbounded,
        }
    }

    /// Permit count for a bounded policy
    pub fn limit(&self) -> Option<usize> {
        match self {
            ConcurrencyPolicy::Unbounded => None,
            ConcurrencyPolicy::Bounded(n) => Some((*n).max(1)),
        }
    }
}

/// CPU workload parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuWorkload {
    /// Loop steps per task
    pub iterations: usize,
}

impl Default for CpuWorkload {
    fn default() -> Self {
        Self {
            iterations: 10_000_000,
        }
    }
}

/// I/O workload parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoWorkload {
    pub file_count: usize,
    pub network_calls: usize,
    /// Simulated network latency bounds in milliseconds
    pub delay_ms: RangeInclusive<u64>,
}

impl Default for IoWorkload {
    fn default() -> Self {
        Self {
            file_count: 50,
            network_calls: 20,
            delay_ms: 10..=29,
        }
    }
}

/// Heavy I/O workload parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeavyWorkload {
    pub file_count: usize,
    /// Payload size per file in MiB
    pub file_size_mb: usize,
    pub network_calls: usize,
    pub delay_ms: RangeInclusive<u64>,
    /// Attempts per file before a read failure is surfaced
    pub read_retries: u32,
    pub retry_delay_ms: u64,
    /// Pause between the create and read phases
    pub settle_ms: u64,
}

impl Default for HeavyWorkload {
    fn default() -> Self {
        Self {
            file_count: 10,
            file_size_mb: 2,
            network_calls: 5,
            delay_ms: 10..=29,
            read_retries: 10,
            retry_delay_ms: 20,
            settle_ms: 5,
        }
    }
}

/// Configuration for a benchmark run
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    pub mode: BenchmarkMode,
    /// Number of top-level tasks
    pub task_count: usize,
    pub cpu: CpuWorkload,
    pub io: IoWorkload,
    pub heavy: HeavyWorkload,
    /// Applies to every phase group of the I/O modes
    pub concurrency: ConcurrencyPolicy,
    /// Directory for ephemeral files
    pub work_dir: PathBuf,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            mode: BenchmarkMode::default(),
            task_count: DEFAULT_TASK_COUNT,
            cpu: CpuWorkload::default(),
            io: IoWorkload::default(),
            heavy: HeavyWorkload::default(),
            concurrency: ConcurrencyPolicy::default(),
            work_dir: PathBuf::from("."),
        }
    }
}

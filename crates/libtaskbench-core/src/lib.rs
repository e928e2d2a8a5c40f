//! Core library for taskbench
//!
//! This crate provides:
//! - The CPU workload and its sequential runner
//! - The I/O workloads (regular and heavy) and their concurrent runners
//! - `WorkerGroup`, a fan-out/fan-in helper with a swappable concurrency policy
//! - Reporting of per-task progress and run summaries
//! - Mode dispatch from positional command-line tokens

pub mod config;
pub mod cpu;
pub mod dispatch;
pub mod error;
pub mod group;
pub mod io;
pub mod report;

pub use config::{
    BenchmarkConfig, BenchmarkMode, ConcurrencyPolicy, CpuWorkload, HeavyWorkload, IoWorkload,
};
pub use dispatch::{run_benchmark, Invocation};
pub use error::{BenchError, Result};
pub use group::{PendingGroup, PhaseOutcome, WorkerGroup};
pub use report::{BenchmarkSummary, MemoryReporter, ReportEvent, Reporter, StdoutReporter};

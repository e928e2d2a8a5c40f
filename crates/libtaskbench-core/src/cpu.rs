//! CPU-bound benchmark: sequential floating-point loops

use std::time::Instant;

use rand::Rng;
use tracing::{debug, info};

use crate::config::{BenchmarkMode, CpuWorkload};
use crate::report::{BenchmarkSummary, ReportEvent, Reporter};

/// Sum of `sqrt(i * r)` over `0..n` with a fresh uniform `r` per step
pub fn heavy_computation(n: usize) -> f64 {
    let mut rng = rand::thread_rng();
    let mut sum = 0.0;
    for i in 0..n {
        sum += (i as f64 * rng.gen::<f64>()).sqrt();
    }
    sum
}

/// Run `task_count` workloads one after another on the calling thread
pub fn run_cpu_benchmark(
    task_count: usize,
    workload: &CpuWorkload,
    reporter: &dyn Reporter,
) -> BenchmarkSummary {
    info!(task_count, iterations = workload.iterations, "CPU benchmark starting");
    reporter.report(ReportEvent::Started {
        mode: BenchmarkMode::Cpu,
    });

    let start = Instant::now();
    for index in 0..task_count {
        let sum = heavy_computation(workload.iterations);
        debug!(task = index + 1, sum, "CPU task finished");
        reporter.report(ReportEvent::TaskDone {
            index,
            elapsed: None,
        });
    }
    let elapsed = start.elapsed();

    reporter.report(ReportEvent::Finished {
        task_count,
        elapsed,
        files_processed: None,
        average_task_time: None,
    });
    info!(task_count, elapsed_ms = elapsed.as_millis() as u64, "CPU benchmark finished");

    BenchmarkSummary {
        mode: BenchmarkMode::Cpu,
        task_count,
        completed: task_count,
        failed: 0,
        files_processed: 0,
        elapsed,
        average_task_time: None,
    }
}

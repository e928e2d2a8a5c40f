//! Top-level I/O benchmark runner

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::files::FileSet;
use super::task::io_intensive_task;
use crate::config::{BenchmarkConfig, BenchmarkMode, ConcurrencyPolicy};
use crate::error::{BenchError, Result};
use crate::group::WorkerGroup;
use crate::report::{BenchmarkSummary, ReportEvent, Reporter};

/// What one successful top-level task accomplished
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TaskStats {
    pub files_processed: usize,
    /// Reported on the task's "done" line when present
    pub elapsed: Option<Duration>,
}

/// Run `config.task_count` I/O-intensive tasks concurrently
///
/// Each task gets its own file namespace (its 1-based index) inside
/// `config.work_dir`. A failed task is reported and does not affect the
/// others; the summary is always reported.
pub async fn run_io_benchmark(
    config: &BenchmarkConfig,
    reporter: Arc<dyn Reporter>,
) -> BenchmarkSummary {
    let workload = Arc::new(config.io.clone());
    let work_dir = config.work_dir.clone();
    let group = WorkerGroup::new(config.concurrency);

    run_top_level(
        BenchmarkMode::Io,
        config.task_count,
        config.concurrency,
        reporter,
        move |index| {
            let workload = Arc::clone(&workload);
            let namespace = (index + 1).to_string();
            let files = FileSet::new(work_dir.clone(), namespace, workload.file_count);
            async move {
                let files_processed = io_intensive_task(&files, &workload, &group).await?;
                Ok::<_, BenchError>(TaskStats {
                    files_processed,
                    elapsed: None,
                })
            }
        },
    )
    .await
}

/// Fan out `task_count` top-level workers, report each one as it finishes,
/// then report the total elapsed time
pub(crate) async fn run_top_level<F, Fut>(
    mode: BenchmarkMode,
    task_count: usize,
    policy: ConcurrencyPolicy,
    reporter: Arc<dyn Reporter>,
    mut make: F,
) -> BenchmarkSummary
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<TaskStats>> + Send + 'static,
{
    info!(mode = mode.as_str(), task_count, ?policy, "Benchmark starting");
    reporter.report(ReportEvent::Started { mode });

    let start = Instant::now();
    let outcome = WorkerGroup::new(policy)
        .run(task_count, |index| {
            let task = make(index);
            let reporter = Arc::clone(&reporter);
            async move {
                match task.await {
                    Ok(stats) => {
                        debug!(task = index + 1, files = stats.files_processed, "Task done");
                        reporter.report(ReportEvent::TaskDone {
                            index,
                            elapsed: stats.elapsed,
                        });
                        Ok(Some(stats))
                    }
                    Err(e) => {
                        warn!(task = index + 1, error = %e, "Task failed");
                        reporter.report(ReportEvent::TaskFailed {
                            index,
                            error: e.to_string(),
                        });
                        Ok(None)
                    }
                }
            }
        })
        .await;
    let elapsed = start.elapsed();

    for e in &outcome.errors {
        warn!(error = %e, "Top-level worker aborted");
    }

    let stats: Vec<TaskStats> = outcome.slots.into_iter().flatten().flatten().collect();
    let files_processed: usize = stats.iter().map(|s| s.files_processed).sum();
    let average_task_time = average_elapsed(&stats);
    let heavy = mode == BenchmarkMode::Heavy;

    reporter.report(ReportEvent::Finished {
        task_count,
        elapsed,
        files_processed: heavy.then_some(files_processed),
        average_task_time: average_task_time.filter(|_| heavy),
    });
    info!(
        mode = mode.as_str(),
        completed = stats.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Benchmark finished"
    );

    BenchmarkSummary {
        mode,
        task_count,
        completed: stats.len(),
        failed: task_count - stats.len(),
        files_processed,
        elapsed,
        average_task_time,
    }
}

/// Mean elapsed time over the tasks that timed themselves
fn average_elapsed(stats: &[TaskStats]) -> Option<Duration> {
    let timed: Vec<Duration> = stats.iter().filter_map(|s| s.elapsed).collect();
    if timed.is_empty() {
        return None;
    }
    Some(timed.iter().sum::<Duration>() / timed.len() as u32)
}

//! Progress reporting and run summaries

use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::BenchmarkMode;

/// Something a runner tells the user about
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    Started {
        mode: BenchmarkMode,
    },
    /// `index` is 0-based; rendered 1-based
    TaskDone {
        index: usize,
        elapsed: Option<Duration>,
    },
    TaskFailed {
        index: usize,
        error: String,
    },
    /// `files_processed` and `average_task_time` are only rendered when present
    Finished {
        task_count: usize,
        elapsed: Duration,
        files_processed: Option<usize>,
        average_task_time: Option<Duration>,
    },
}

impl ReportEvent {
    pub fn is_task_line(&self) -> bool {
        matches!(self, ReportEvent::TaskDone { .. } | ReportEvent::TaskFailed { .. })
    }
}

impl fmt::Display for ReportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportEvent::Started { mode } => write!(f, "{}", mode.banner()),
            ReportEvent::TaskDone { index, elapsed: None } => write!(f, "Task {} done", index + 1),
            ReportEvent::TaskDone {
                index,
                elapsed: Some(elapsed),
            } => write!(f, "Task {} done in {:.4}s", index + 1, elapsed.as_secs_f64()),
            ReportEvent::TaskFailed { index, error } => {
                write!(f, "Task {} failed: {}", index + 1, error)
            }
            ReportEvent::Finished {
                task_count,
                elapsed,
                files_processed,
                average_task_time,
            } => {
                write!(
                    f,
                    "All {} tasks done in {:.4}s",
                    task_count,
                    elapsed.as_secs_f64()
                )?;
                if let Some(files) = files_processed {
                    write!(f, ", {} files processed", files)?;
                }
                if let Some(average) = average_task_time {
                    write!(f, ", average task time {:.4}s", average.as_secs_f64())?;
                }
                Ok(())
            }
        }
    }
}

/// Receives report events from runners, possibly from many tasks at once
pub trait Reporter: Send + Sync {
    fn report(&self, event: ReportEvent);
}

/// Prints one line per event to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn report(&self, event: ReportEvent) {
        println!("{}", event);
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Rendered lines, in the order they were reported
    pub fn lines(&self) -> Vec<String> {
        self.events().iter().map(ToString::to_string).collect()
    }

    pub fn task_lines(&self) -> usize {
        self.events().iter().filter(|e| e.is_task_line()).count()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, event: ReportEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Outcome of a complete benchmark run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub mode: BenchmarkMode,
    pub task_count: usize,
    pub completed: usize,
    pub failed: usize,
    /// Files read back successfully across all tasks (I/O modes)
    pub files_processed: usize,
    #[serde(with = "serde_duration")]
    pub elapsed: Duration,
    /// Mean of the per-task times; `None` when no task measured its own time
    #[serde(default, with = "serde_duration::option")]
    pub average_task_time: Option<Duration>,
}

mod serde_duration {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs))
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serialize, Serializer};
        use std::time::Duration;

        pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            duration.map(|d| d.as_secs_f64()).serialize(serializer)
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let secs = Option::<f64>::deserialize(deserializer)?;
            Ok(secs.map(Duration::from_secs_f64))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_lines_are_one_based() {
        let done = ReportEvent::TaskDone {
            index: 0,
            elapsed: None,
        };
        assert_eq!(done.to_string(), "Task 1 done");

        let failed = ReportEvent::TaskFailed {
            index: 2,
            error: "disk full".to_string(),
        };
        assert_eq!(failed.to_string(), "Task 3 failed: disk full");
    }

    #[test]
    fn test_summary_uses_four_decimals() {
        let finished = ReportEvent::Finished {
            task_count: 3,
            elapsed: Duration::from_millis(1500),
            files_processed: None,
            average_task_time: None,
        };
        assert_eq!(finished.to_string(), "All 3 tasks done in 1.5000s");

        let heavy = ReportEvent::Finished {
            task_count: 2,
            elapsed: Duration::from_millis(250),
            files_processed: Some(20),
            average_task_time: Some(Duration::from_millis(125)),
        };
        assert_eq!(
            heavy.to_string(),
            "All 2 tasks done in 0.2500s, 20 files processed, average task time 0.1250s"
        );

        let none_completed = ReportEvent::Finished {
            task_count: 2,
            elapsed: Duration::from_millis(250),
            files_processed: Some(0),
            average_task_time: None,
        };
        assert_eq!(none_completed.to_string(), "All 2 tasks done in 0.2500s, 0 files processed");
    }

    #[test]
    fn test_memory_reporter_counts_task_lines() {
        let reporter = MemoryReporter::new();
        reporter.report(ReportEvent::Started {
            mode: BenchmarkMode::Io,
        });
        reporter.report(ReportEvent::TaskDone {
            index: 0,
            elapsed: Some(Duration::from_millis(10)),
        });
        reporter.report(ReportEvent::TaskFailed {
            index: 1,
            error: "x".to_string(),
        });

        assert_eq!(reporter.task_lines(), 2);
        assert_eq!(reporter.lines()[0], "Rust I/O benchmark start");
        assert_eq!(reporter.lines()[1], "Task 1 done in 0.0100s");
    }

    #[test]
    fn test_summary_json_elapsed_in_seconds() {
        let summary = BenchmarkSummary {
            mode: BenchmarkMode::Cpu,
            task_count: 1,
            completed: 1,
            failed: 0,
            files_processed: 0,
            elapsed: Duration::from_millis(2500),
            average_task_time: None,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["elapsed"], 2.5);
        assert_eq!(json["mode"], "Cpu");
        assert!(json["average_task_time"].is_null());

        let heavy = BenchmarkSummary {
            mode: BenchmarkMode::Heavy,
            average_task_time: Some(Duration::from_millis(500)),
            ..summary
        };
        let json = serde_json::to_value(&heavy).unwrap();
        assert_eq!(json["average_task_time"], 0.5);
    }
}

//! Mode selection and dispatch

use std::sync::Arc;

use crate::config::{BenchmarkConfig, BenchmarkMode, DEFAULT_TASK_COUNT};
use crate::cpu::run_cpu_benchmark;
use crate::io::{run_heavy_benchmark, run_io_benchmark};
use crate::report::{BenchmarkSummary, Reporter};

/// Mode and task count taken from positional tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation {
    pub mode: BenchmarkMode,
    pub task_count: usize,
}

impl Default for Invocation {
    fn default() -> Self {
        Self {
            mode: BenchmarkMode::Cpu,
            task_count: DEFAULT_TASK_COUNT,
        }
    }
}

impl Invocation {
    /// Interpret tokens: `io` picks the I/O mode, an all-digit token sets the
    /// task count (last one wins), anything else is ignored
    ///
    /// Heavy mode has no token; it is selected outside the positional
    /// arguments (see [`Invocation::heavy`]).
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut invocation = Invocation::default();

        for token in tokens {
            let token = token.as_ref();
            if token == "io" {
                invocation.mode = BenchmarkMode::Io;
            } else if let Some(count) = parse_task_count(token) {
                invocation.task_count = count;
            }
        }
        invocation
    }

    /// Switch to the heavy I/O variant, keeping the task count
    pub fn heavy(self) -> Self {
        Self {
            mode: BenchmarkMode::Heavy,
            ..self
        }
    }

    /// Apply mode and task count on top of `config`
    pub fn apply(&self, config: &mut BenchmarkConfig) {
        config.mode = self.mode;
        config.task_count = self.task_count;
    }
}

/// Digits only; values that overflow `usize` are rejected
fn parse_task_count(token: &str) -> Option<usize> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Run the benchmark `config.mode` selects
pub async fn run_benchmark(
    config: &BenchmarkConfig,
    reporter: Arc<dyn Reporter>,
) -> BenchmarkSummary {
    match config.mode {
        BenchmarkMode::Cpu => run_cpu_benchmark(config.task_count, &config.cpu, &*reporter),
        BenchmarkMode::Io => run_io_benchmark(config, reporter).await,
        BenchmarkMode::Heavy => run_heavy_benchmark(config, reporter).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CpuWorkload;
    use crate::report::MemoryReporter;

    #[test]
    fn test_no_tokens_defaults_to_ten_cpu_tasks() {
        let invocation = Invocation::from_tokens(Vec::<String>::new());
        assert_eq!(invocation.mode, BenchmarkMode::Cpu);
        assert_eq!(invocation.task_count, 10);
    }

    #[test]
    fn test_io_with_count() {
        let invocation = Invocation::from_tokens(["io", "3"]);
        assert_eq!(invocation.mode, BenchmarkMode::Io);
        assert_eq!(invocation.task_count, 3);

        let reversed = Invocation::from_tokens(["3", "io"]);
        assert_eq!(reversed, invocation);
    }

    #[test]
    fn test_last_count_wins() {
        let invocation = Invocation::from_tokens(["5", "7", "0"]);
        assert_eq!(invocation.task_count, 0);
    }

    #[test]
    fn test_mode_token_is_case_sensitive() {
        let invocation = Invocation::from_tokens(["IO", "Io", "heavyish"]);
        assert_eq!(invocation.mode, BenchmarkMode::Cpu);
    }

    #[test]
    fn test_non_digit_tokens_are_ignored() {
        let invocation = Invocation::from_tokens(["-4", "+4", "4.0", "", " 4", "four", "8"]);
        assert_eq!(invocation.task_count, 8);

        let invocation = Invocation::from_tokens(["-4", "+4"]);
        assert_eq!(invocation.task_count, 10);
    }

    #[test]
    fn test_overflowing_count_is_ignored() {
        let invocation = Invocation::from_tokens(["6", "99999999999999999999999999"]);
        assert_eq!(invocation.task_count, 6);
    }

    #[test]
    fn test_heavy_token_is_ignored() {
        let invocation = Invocation::from_tokens(["heavy", "2"]);
        assert_eq!(invocation.mode, BenchmarkMode::Cpu);
        assert_eq!(invocation.task_count, 2);

        let invocation = Invocation::from_tokens(["io", "heavy", "2"]);
        assert_eq!(invocation.mode, BenchmarkMode::Io);
    }

    #[test]
    fn test_heavy_keeps_task_count() {
        let invocation = Invocation::from_tokens(["io", "4"]).heavy();
        assert_eq!(invocation.mode, BenchmarkMode::Heavy);
        assert_eq!(invocation.task_count, 4);
    }

    #[tokio::test]
    async fn test_dispatches_cpu_mode() {
        let mut config = BenchmarkConfig {
            cpu: CpuWorkload { iterations: 10 },
            ..BenchmarkConfig::default()
        };
        Invocation::from_tokens(["2"]).apply(&mut config);

        let reporter = Arc::new(MemoryReporter::new());
        let summary = run_benchmark(&config, reporter.clone()).await;

        assert_eq!(summary.mode, BenchmarkMode::Cpu);
        assert_eq!(summary.completed, 2);
        assert_eq!(reporter.task_lines(), 2);
    }
}

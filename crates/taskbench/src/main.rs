//! taskbench - wall-clock throughput of CPU-bound and I/O-bound workloads
//!
//! Usage: `taskbench [io] [TASK_COUNT] [--heavy] [--max-concurrency N]`.
//! Without a mode token the CPU benchmark runs; the task count defaults to 10.
//! Flags may appear anywhere on the command line; every other argument is a
//! positional token.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use libtaskbench_core::{
    run_benchmark, BenchError, BenchmarkConfig, ConcurrencyPolicy, Invocation, Result,
    StdoutReporter,
};

#[derive(Parser, Debug)]
#[command(name = "taskbench")]
#[command(about = "Measure wall-clock throughput of CPU-bound and I/O-bound workloads")]
#[command(version)]
struct Cli {
    /// `io` selects the I/O mode, a number sets the task count; other tokens are ignored
    #[arg(skip)]
    tokens: Vec<String>,

    /// Run the heavy I/O variant (large hashed payloads)
    #[arg(long)]
    heavy: bool,

    /// Cap on concurrently running workers per group (unbounded if omitted)
    #[arg(long)]
    max_concurrency: Option<usize>,

    /// Directory for ephemeral benchmark files (defaults to the current directory)
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

/// Flags that take a value, either inline (`--flag=value`) or as the next argument
const VALUE_FLAGS: &[&str] = &["--max-concurrency", "--work-dir", "--log-level"];
const SWITCHES: &[&str] = &["--heavy", "--help", "-h", "--version", "-V"];

/// Separate the flags clap understands from the positional tokens
///
/// The first argument (the program name) always goes to clap. A value flag
/// without an inline `=value` also takes the following argument.
fn split_args<I>(args: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut flags: Vec<String> = args.next().into_iter().collect();
    let mut tokens = Vec::new();

    while let Some(arg) = args.next() {
        let (name, inline) = match arg.split_once('=') {
            Some((name, _)) => (name, true),
            None => (arg.as_str(), false),
        };

        if VALUE_FLAGS.contains(&name) {
            flags.push(arg);
            if !inline {
                flags.extend(args.next());
            }
        } else if SWITCHES.contains(&arg.as_str()) {
            flags.push(arg);
        } else {
            tokens.push(arg);
        }
    }

    (flags, tokens)
}

impl Cli {
    fn try_from_args<I>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let (flags, tokens) = split_args(args);
        let mut cli = Cli::try_parse_from(flags)?;
        cli.tokens = tokens;
        Ok(cli)
    }

    fn into_config(self) -> Result<BenchmarkConfig> {
        let mut config = BenchmarkConfig {
            concurrency: ConcurrencyPolicy::from_limit(self.max_concurrency),
            ..BenchmarkConfig::default()
        };

        if let Some(dir) = self.work_dir {
            if !dir.is_dir() {
                return Err(BenchError::Config(format!(
                    "work directory '{}' does not exist",
                    dir.display()
                )));
            }
            config.work_dir = dir;
        }

        let mut invocation = Invocation::from_tokens(&self.tokens);
        if self.heavy {
            invocation = invocation.heavy();
        }
        invocation.apply(&mut config);
        Ok(config)
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::try_from_args(std::env::args()).unwrap_or_else(|e| e.exit());
    init_logging(&cli.log_level);

    let config = cli.into_config()?;
    debug!(?config, "Resolved configuration");

    run_benchmark(&config, Arc::new(StdoutReporter)).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use libtaskbench_core::BenchmarkMode;

    fn parse(args: &[&str]) -> BenchmarkConfig {
        Cli::try_from_args(args.iter().copied())
            .unwrap()
            .into_config()
            .unwrap()
    }

    #[test]
    fn test_no_arguments_runs_ten_cpu_tasks() {
        let config = parse(&["taskbench"]);
        assert_eq!(config.mode, BenchmarkMode::Cpu);
        assert_eq!(config.task_count, 10);
        assert_eq!(config.concurrency, ConcurrencyPolicy::Unbounded);
    }

    #[test]
    fn test_io_mode_with_count() {
        let config = parse(&["taskbench", "io", "3"]);
        assert_eq!(config.mode, BenchmarkMode::Io);
        assert_eq!(config.task_count, 3);
    }

    #[test]
    fn test_unknown_tokens_are_ignored() {
        let config = parse(&["taskbench", "fast", "4", "please"]);
        assert_eq!(config.mode, BenchmarkMode::Cpu);
        assert_eq!(config.task_count, 4);
    }

    #[test]
    fn test_max_concurrency_flag() {
        let config = parse(&["taskbench", "--max-concurrency", "8", "--heavy"]);
        assert_eq!(config.mode, BenchmarkMode::Heavy);
        assert_eq!(config.concurrency, ConcurrencyPolicy::Bounded(8));
    }

    #[test]
    fn test_flags_after_positional_tokens() {
        let config = parse(&["taskbench", "io", "--max-concurrency", "4"]);
        assert_eq!(config.mode, BenchmarkMode::Io);
        assert_eq!(config.task_count, 10);
        assert_eq!(config.concurrency, ConcurrencyPolicy::Bounded(4));

        let config = parse(&["taskbench", "3", "--max-concurrency=2", "io", "--heavy"]);
        assert_eq!(config.mode, BenchmarkMode::Heavy);
        assert_eq!(config.task_count, 3);
        assert_eq!(config.concurrency, ConcurrencyPolicy::Bounded(2));
    }

    #[test]
    fn test_hyphenated_tokens_are_ignored() {
        let config = parse(&["taskbench", "-4", "--fast", "io", "-x", "6"]);
        assert_eq!(config.mode, BenchmarkMode::Io);
        assert_eq!(config.task_count, 6);
    }

    #[test]
    fn test_heavy_word_is_not_a_mode() {
        let config = parse(&["taskbench", "heavy", "2"]);
        assert_eq!(config.mode, BenchmarkMode::Cpu);
        assert_eq!(config.task_count, 2);
    }

    #[test]
    fn test_missing_work_dir_is_config_error() {
        let cli = Cli::try_from_args(["taskbench", "io", "--work-dir", "/definitely/not/here"])
            .unwrap();
        assert!(matches!(cli.into_config(), Err(BenchError::Config(_))));
    }
}

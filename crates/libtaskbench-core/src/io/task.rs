//! The I/O-intensive composite task

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use super::files::FileSet;
use super::network::NetworkCalls;
use crate::config::IoWorkload;
use crate::error::Result;
use crate::group::WorkerGroup;

/// Create, read back and delete `files` while simulated network calls run
///
/// Phases: create all files; launch the network delays; read all files
/// while the delays are in flight; join the delays; clean up. A create or
/// read failure skips the remaining work phases, but cleanup still runs on
/// every exit path. Returns the number of files read back.
pub async fn io_intensive_task(
    files: &FileSet,
    workload: &IoWorkload,
    group: &WorkerGroup,
) -> Result<usize> {
    let outcome = run_phases(files, workload, group).await;
    files.cleanup(group).await;
    outcome
}

async fn run_phases(files: &FileSet, workload: &IoWorkload, group: &WorkerGroup) -> Result<usize> {
    files.create_all(group).await?;

    let network = NetworkCalls::launch(group, workload.network_calls, &workload.delay_ms);
    debug!(calls = network.len(), "Network calls launched");

    let (contents, delays) = read_while_pending(files.read_all(group), network).await;
    debug!(calls = delays.len(), "Network calls joined");

    Ok(contents?.len())
}

/// Drive `read` to completion while `network` is still in flight, then wait
/// for both
///
/// The network calls are always joined, even when `read` fails.
pub(crate) async fn read_while_pending<F>(
    read: F,
    network: NetworkCalls,
) -> (F::Output, Vec<Duration>)
where
    F: Future,
{
    tokio::join!(read, network.join())
}

//! Simulated network latency

use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;

use crate::group::{PendingGroup, WorkerGroup};

/// Pick a delay uniformly from `range` (milliseconds)
pub fn random_delay(range: &RangeInclusive<u64>) -> Duration {
    let ms = if range.is_empty() {
        *range.start()
    } else {
        rand::thread_rng().gen_range(range.clone())
    };
    Duration::from_millis(ms)
}

pub async fn simulate_network_delay(delay: Duration) {
    tokio::time::sleep(delay).await;
}

/// Simulated network calls that run in the background until joined
pub struct NetworkCalls {
    pending: PendingGroup<Duration>,
}

impl NetworkCalls {
    /// Start `count` delays without waiting for them
    pub fn launch(group: &WorkerGroup, count: usize, delay_ms: &RangeInclusive<u64>) -> Self {
        let pending = group.spawn(count, |_| {
            let delay = random_delay(delay_ms);
            async move {
                simulate_network_delay(delay).await;
                Ok(delay)
            }
        });
        Self { pending }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Wait for every call; returns the delays that completed
    pub async fn join(self) -> Vec<Duration> {
        self.pending.join().await.slots.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_random_delay_within_bounds() {
        let range = 10..=29;
        for _ in 0..1_000 {
            let delay = random_delay(&range).as_millis() as u64;
            assert!(range.contains(&delay), "delay {} out of range", delay);
        }
    }

    #[test]
    fn test_random_delay_degenerate_range() {
        assert_eq!(random_delay(&(5..=5)), Duration::from_millis(5));
        #[allow(clippy::reversed_empty_ranges)]
        let empty = 9..=3;
        assert_eq!(random_delay(&empty), Duration::from_millis(9));
    }

    #[tokio::test]
    async fn test_calls_run_concurrently() {
        let start = Instant::now();
        let calls = NetworkCalls::launch(&WorkerGroup::default(), 20, &(30..=30));
        assert_eq!(calls.len(), 20);

        let delays = calls.join().await;
        assert_eq!(delays.len(), 20);
        // Twenty sequential 30ms sleeps would take 600ms.
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}

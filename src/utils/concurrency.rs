//! Bounded concurrent mapping shared by discovery, aggregation and rewriting
//!
//! All futures are polled from the calling task. "Parallel" here means many
//! outstanding I/O operations at once, never extra threads or locks.

use futures::stream::{self, StreamExt};
use std::future::Future;

/// How many operations may be in flight at once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concurrency {
    /// One at a time, in input order
    Sequential,
    /// At most `n` at a time
    Bounded(usize),
    /// Everything at once
    Unbounded,
}

impl Concurrency {
    /// Map the operator-facing `parallel` flag and optional batch size
    pub fn from_options(parallel: bool, batch_size: Option<usize>) -> Self {
        match (parallel, batch_size) {
            (false, _) => Concurrency::Sequential,
            (true, Some(0 | 1)) => Concurrency::Sequential,
            (true, Some(width)) => Concurrency::Bounded(width),
            (true, None) => Concurrency::Unbounded,
        }
    }
}

/// Apply `f` to every item with the given concurrency
///
/// Results are returned in input order regardless of completion order, which
/// keeps every downstream "first seen" decision independent of scheduling.
pub async fn bounded_map<I, T, F, Fut, R>(items: I, concurrency: Concurrency, mut f: F) -> Vec<R>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = R>,
{
    match concurrency {
        Concurrency::Sequential | Concurrency::Bounded(0 | 1) => {
            let mut results = Vec::new();
            for item in items {
                results.push(f(item).await);
            }
            results
        }
        Concurrency::Bounded(width) => stream::iter(items).map(f).buffered(width).collect().await,
        Concurrency::Unbounded => futures::future::join_all(items.into_iter().map(f)).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    async fn delayed(value: u64) -> u64 {
        // Later items finish first
        tokio::time::sleep(Duration::from_millis(50 - value * 10)).await;
        value
    }

    #[test]
    fn test_from_options() {
        assert_eq!(Concurrency::from_options(false, Some(8)), Concurrency::Sequential);
        assert_eq!(Concurrency::from_options(true, Some(1)), Concurrency::Sequential);
        assert_eq!(Concurrency::from_options(true, Some(4)), Concurrency::Bounded(4));
        assert_eq!(Concurrency::from_options(true, None), Concurrency::Unbounded);
    }

    #[tokio::test]
    async fn test_results_keep_input_order_in_every_mode() {
        for concurrency in [
            Concurrency::Sequential,
            Concurrency::Bounded(2),
            Concurrency::Unbounded,
        ] {
            let results = bounded_map(vec![0, 1, 2, 3, 4], concurrency, delayed).await;
            assert_eq!(results, vec![0, 1, 2, 3, 4], "{concurrency:?}");
        }
    }

    #[tokio::test]
    async fn test_bounded_limits_in_flight_operations() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        bounded_map(0..12, Concurrency::Bounded(3), |_| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .await;

        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let results: Vec<u64> = bounded_map(Vec::new(), Concurrency::Unbounded, delayed).await;
        assert!(results.is_empty());
    }
}

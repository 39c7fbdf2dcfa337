use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use tokio::runtime::Handle;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{trace, warn};

use crate::Flux;

/// Bounded pool used for unordered (completion-order) expansion.
///
/// The pool owns a runtime handle and a semaphore; every inner stream is
/// driven on its own task and holds one permit while it runs. Clones share
/// the same permits, so the bound applies to everything spawned through the
/// pool, not per call.
#[derive(Debug, Clone)]
pub struct WorkerPool {
  handle: Handle,
  permits: Arc<Semaphore>,
  max_concurrency: usize,
}

impl WorkerPool {
  /// `max_concurrency` is clamped to at least 1.
  pub fn new(handle: Handle, max_concurrency: usize) -> Self {
    let max_concurrency = max_concurrency.max(1);
    Self { handle, permits: Arc::new(Semaphore::new(max_concurrency)), max_concurrency }
  }

  /// Pool on the runtime of the caller. Panics outside a Tokio runtime.
  pub fn current(max_concurrency: usize) -> Self {
    Self::new(Handle::current(), max_concurrency)
  }

  pub fn max_concurrency(&self) -> usize {
    self.max_concurrency
  }

  pub fn available_permits(&self) -> usize {
    self.permits.available_permits()
  }

  /// Expands every element of `source` through `f` and emits the inner
  /// elements as soon as any worker produces them.
  ///
  /// Nothing is spawned until the first poll. Ordering across inner streams
  /// is not defined; each inner stream's own order is kept. Dropping the
  /// returned stream aborts the coordinator and every worker still running.
  pub fn flat_map_unordered<T, U, F>(&self, source: Flux<T>, f: F) -> Flux<U>
  where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> Flux<U> + Send + 'static,
  {
    let state = Expansion::Idle { pool: self.clone(), source, f };

    stream::unfold(state, |state| async move {
      let (mut rx, guard) = match state {
        Expansion::Idle { pool, source, f } => pool.spawn_coordinator(source, f),
        Expansion::Running { rx, guard } => (rx, guard),
      };
      let item = rx.recv().await?;
      Some((item, Expansion::Running { rx, guard }))
    })
    .boxed()
  }

  fn spawn_coordinator<T, U, F>(&self, source: Flux<T>, f: F) -> (mpsc::Receiver<U>, AbortOnDrop)
  where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> Flux<U> + Send + 'static,
  {
    let (tx, rx) = mpsc::channel::<U>(self.max_concurrency * 16);
    let permits = Arc::clone(&self.permits);
    let handle = self.handle.clone();

    let coordinator = self.handle.spawn(async move {
      let mut source = source;
      let mut workers = JoinSet::new();

      while let Some(item) = source.next().await {
        let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
          break;
        };
        let mut inner = f(item);
        let tx = tx.clone();

        workers.spawn_on(
          async move {
            let _permit = permit;
            while let Some(out) = inner.next().await {
              // receiver gone: consumer cancelled
              if tx.send(out).await.is_err() {
                trace!("flat_map_unordered consumer dropped, worker stops");
                break;
              }
            }
          },
          &handle,
        );

        while let Some(res) = workers.try_join_next() {
          log_join(res);
        }
      }

      drop(tx);
      while let Some(res) = workers.join_next().await {
        log_join(res);
      }
    });

    (rx, AbortOnDrop(coordinator))
  }
}

enum Expansion<T, U, F> {
  Idle { pool: WorkerPool, source: Flux<T>, f: F },
  Running { rx: mpsc::Receiver<U>, guard: AbortOnDrop },
}

fn log_join(res: Result<(), tokio::task::JoinError>) {
  if let Err(e) = res {
    if e.is_panic() {
      warn!(error = %e, "flat_map_unordered worker panicked");
    }
  }
}

/// Aborts the coordinator (and with it the `JoinSet` of workers) on drop.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
  fn drop(&mut self) {
    self.0.abort();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::operators::{delay_elements, from_iter, split_string};
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::time::Duration;

  #[tokio::test]
  async fn expands_every_element() {
    let pool = WorkerPool::current(4);

    let mut out: Vec<String> =
      pool.flat_map_unordered(from_iter(["ALEX", "CHLOE"]), |s| split_string(s)).collect().await;
    out.sort();

    let mut expected: Vec<String> = "ALEXCHLOE".chars().map(String::from).collect();
    expected.sort();
    assert_eq!(out, expected);
  }

  #[tokio::test]
  async fn source_is_not_pulled_before_first_poll() {
    let pool = WorkerPool::current(4);
    let pulled = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&pulled);
    let source = from_iter(["ALEX", "BEN", "CHLOE"])
      .inspect(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
      })
      .boxed();

    let mut out = pool.flat_map_unordered(source, |s| split_string(s));
    for _ in 0..10 {
      tokio::task::yield_now().await;
    }
    assert_eq!(pulled.load(Ordering::SeqCst), 0);
    assert_eq!(pool.available_permits(), 4);

    assert!(out.next().await.is_some());
    let rest: Vec<String> = out.collect().await;
    assert_eq!(rest.len(), 11);
    assert_eq!(pulled.load(Ordering::SeqCst), 3);
  }

  #[tokio::test(start_paused = true)]
  async fn emits_in_completion_order() {
    let pool = WorkerPool::current(4);
    let slow_then_fast = from_iter([(300_u64, "slow"), (10, "fast")]);

    let out: Vec<&str> = pool
      .flat_map_unordered(slow_then_fast, |(ms, tag)| {
        delay_elements(from_iter([tag]), Duration::from_millis(ms))
      })
      .collect()
      .await;

    assert_eq!(out, vec!["fast", "slow"]);
  }

  #[tokio::test(start_paused = true)]
  async fn keeps_inner_order_with_single_permit() {
    let pool = WorkerPool::current(1);
    let source = from_iter([(300_u64, "a"), (10, "b")]);

    let out: Vec<&str> = pool
      .flat_map_unordered(source, |(ms, tag)| delay_elements(from_iter([tag, tag]), Duration::from_millis(ms)))
      .collect()
      .await;

    assert_eq!(out, vec!["a", "a", "b", "b"]);
  }

  #[tokio::test(start_paused = true)]
  async fn dropping_the_output_releases_workers() {
    let pool = WorkerPool::current(2);
    let endless = from_iter(0..1000_u32);

    let mut out = pool.flat_map_unordered(endless, |n| {
      delay_elements(from_iter([n]), Duration::from_millis(50))
    });
    assert!(out.next().await.is_some());
    drop(out);

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(pool.available_permits(), 2);
  }

  #[test]
  fn zero_concurrency_is_clamped() {
    let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let pool = WorkerPool::new(rt.handle().clone(), 0);

    assert_eq!(pool.max_concurrency(), 1);
  }
}

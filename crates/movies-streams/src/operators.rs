//! Combinadores reutilizables sobre `Flux` / `Mono`.
//!
//! Todos devuelven streams perezosos: construirlos no hace poll de nada.

use std::collections::VecDeque;
use std::time::Duration;

use futures::stream::{self, Fuse};
use futures::{FutureExt, StreamExt, future};
use rand::Rng;

use crate::{Flux, Mono};

// =============================================================================
// 1. Fuentes
// =============================================================================

pub fn from_iter<I>(items: I) -> Flux<I::Item>
where
  I: IntoIterator,
  I::IntoIter: Send + 'static,
  I::Item: Send + 'static,
{
  stream::iter(items).boxed()
}

pub fn just<T: Send + 'static>(value: T) -> Mono<T> {
  future::ready(Some(value)).boxed()
}

pub fn empty_mono<T: Send + 'static>() -> Mono<T> {
  future::ready(None).boxed()
}

/// Un elemento por carácter: "ALEX" -> "A", "L", "E", "X".
pub fn split_string(name: &str) -> Flux<String> {
  let chars: Vec<String> = name.chars().map(String::from).collect();
  from_iter(chars)
}

/// Como [`split_string`], pero cada carácter se retrasa una cantidad
/// aleatoria en `[0, max)`, elegida una vez por cadena.
pub fn split_string_with_delay(name: &str, max: Duration) -> Flux<String> {
  let max_ms = saturating_millis(max);
  let delay_ms = if max_ms == 0 { 0 } else { rand::rng().random_range(0..max_ms) };
  delay_elements(split_string(name), Duration::from_millis(delay_ms))
}

fn saturating_millis(d: Duration) -> u64 {
  u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// =============================================================================
// 2. Tiempo
// =============================================================================

/// Cada elemento sale `delay` después del anterior (o de la suscripción).
pub fn delay_elements<T: Send + 'static>(flux: Flux<T>, delay: Duration) -> Flux<T> {
  flux
    .then(move |item| async move {
      tokio::time::sleep(delay).await;
      item
    })
    .boxed()
}

// =============================================================================
// 3. Expansión
// =============================================================================

/// Expansión secuencial: el siguiente stream interno no arranca hasta que el
/// anterior termina, así que el orden se mantiene aunque haya retrasos.
pub fn concat_map<T, U, F>(flux: Flux<T>, f: F) -> Flux<U>
where
  T: Send + 'static,
  U: Send + 'static,
  F: FnMut(T) -> Flux<U> + Send + 'static,
{
  flux.flat_map(f).boxed()
}

/// Mono -> Flux expandiendo el valor (si lo hay).
pub fn flat_map_many<T, U, F>(mono: Mono<T>, f: F) -> Flux<U>
where
  T: Send + 'static,
  U: Send + 'static,
  F: FnOnce(T) -> Flux<U> + Send + 'static,
{
  mono.map(|value| match value {
    Some(v) => f(v),
    None => stream::empty().boxed(),
  })
  .flatten_stream()
  .boxed()
}

pub fn mono_to_flux<T: Send + 'static>(mono: Mono<T>) -> Flux<T> {
  stream::once(mono).filter_map(future::ready).boxed()
}

// =============================================================================
// 4. Combinación
// =============================================================================

/// `b` no recibe ningún poll hasta que `a` se agota.
pub fn concat<T: Send + 'static>(a: Flux<T>, b: Flux<T>) -> Flux<T> {
  a.chain(b).boxed()
}

/// Intercala por orden de llegada. Sin retrasos fijos el orden no está
/// garantizado.
pub fn merge<T: Send + 'static>(a: Flux<T>, b: Flux<T>) -> Flux<T> {
  stream::select(a, b).boxed()
}

pub fn merge_monos<T: Send + 'static>(a: Mono<T>, b: Mono<T>) -> Flux<T> {
  merge(mono_to_flux(a), mono_to_flux(b))
}

/// Suscribe ambas fuentes a la vez, pero emite todo `a` y luego todo `b`.
/// Lo que `b` produce mientras `a` sigue vivo se guarda en un buffer.
pub fn merge_sequential<T: Send + 'static>(a: Flux<T>, b: Flux<T>) -> Flux<T> {
  let state = MergeSequential { first: Some(a), second: Some(b), buffered: VecDeque::new() };

  stream::unfold(state, |mut st| async move {
    loop {
      let Some(first) = st.first.as_mut() else {
        if let Some(item) = st.buffered.pop_front() {
          return Some((item, st));
        }
        let item = st.second.as_mut()?.next().await?;
        return Some((item, st));
      };

      let step = tokio::select! {
        biased;
        item = first.next() => Step::First(item),
        item = next_or_pending(st.second.as_mut()) => Step::Second(item),
      };

      match step {
        Step::First(Some(item)) => return Some((item, st)),
        Step::First(None) => st.first = None,
        Step::Second(Some(item)) => st.buffered.push_back(item),
        Step::Second(None) => st.second = None,
      }
    }
  })
  .boxed()
}

struct MergeSequential<T> {
  first: Option<Flux<T>>,
  second: Option<Flux<T>>,
  buffered: VecDeque<T>,
}

enum Step<T> {
  First(Option<T>),
  Second(Option<T>),
}

async fn next_or_pending<T>(flux: Option<&mut Flux<T>>) -> Option<T> {
  match flux {
    Some(flux) => flux.next().await,
    None => future::pending().await,
  }
}

/// Empareja el n-ésimo elemento de cada fuente; termina con la más corta.
pub fn zip2<A, B, R, F>(a: Flux<A>, b: Flux<B>, combine: F) -> Flux<R>
where
  A: Send + 'static,
  B: Send + 'static,
  R: Send + 'static,
  F: Fn(A, B) -> R + Send + 'static,
{
  a.zip(b).map(move |(x, y)| combine(x, y)).boxed()
}

pub fn zip3<A, B, C, R, F>(a: Flux<A>, b: Flux<B>, c: Flux<C>, combine: F) -> Flux<R>
where
  A: Send + 'static,
  B: Send + 'static,
  C: Send + 'static,
  R: Send + 'static,
  F: Fn(A, B, C) -> R + Send + 'static,
{
  a.zip(b).zip(c).map(move |((x, y), z)| combine(x, y, z)).boxed()
}

pub fn zip4<A, B, C, D, R, F>(a: Flux<A>, b: Flux<B>, c: Flux<C>, d: Flux<D>, combine: F) -> Flux<R>
where
  A: Send + 'static,
  B: Send + 'static,
  C: Send + 'static,
  D: Send + 'static,
  R: Send + 'static,
  F: Fn(A, B, C, D) -> R + Send + 'static,
{
  a.zip(b).zip(c).zip(d).map(move |(((w, x), y), z)| combine(w, x, y, z)).boxed()
}

/// Ambos monos se resuelven a la vez; si alguno está vacío, el resultado también.
pub fn zip_monos<A, B, R, F>(a: Mono<A>, b: Mono<B>, combine: F) -> Mono<R>
where
  A: Send + 'static,
  B: Send + 'static,
  R: Send + 'static,
  F: FnOnce(A, B) -> R + Send + 'static,
{
  async move {
    let (x, y) = future::join(a, b).await;
    Some(combine(x?, y?))
  }
  .boxed()
}

// =============================================================================
// 5. Fallbacks
// =============================================================================

/// Si `flux` termina sin emitir nada, emite `fallback` una vez.
pub fn default_if_empty<T: Send + 'static>(flux: Flux<T>, fallback: T) -> Flux<T> {
  let state: (Fuse<Flux<T>>, Option<T>) = (flux.fuse(), Some(fallback));

  stream::unfold(state, |(mut flux, mut fallback)| async move {
    match flux.next().await {
      Some(item) => Some((item, (flux, None))),
      None => fallback.take().map(|item| (item, (flux, None))),
    }
  })
  .boxed()
}

/// Si `flux` termina sin emitir nada, continúa con `fallback`. El fallback
/// no se suscribe en ningún otro caso.
pub fn switch_if_empty<T: Send + 'static>(flux: Flux<T>, fallback: Flux<T>) -> Flux<T> {
  let state = Switch::Primary { primary: flux, fallback };

  stream::unfold(state, |state| async move {
    match state {
      Switch::Primary { mut primary, fallback } => match primary.next().await {
        Some(item) => Some((item, Switch::Emitted(primary))),
        None => {
          let mut fallback = fallback;
          let item = fallback.next().await?;
          Some((item, Switch::Emitted(fallback)))
        }
      },
      Switch::Emitted(mut flux) => {
        let item = flux.next().await?;
        Some((item, Switch::Emitted(flux)))
      }
    }
  })
  .boxed()
}

enum Switch<T> {
  Primary { primary: Flux<T>, fallback: Flux<T> },
  /// Ya salió al menos un elemento de este stream: se sigue con él.
  Emitted(Flux<T>),
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;
  use std::sync::atomic::{AtomicBool, Ordering};

  fn letters(items: &[&'static str]) -> Flux<&'static str> {
    from_iter(items.to_vec())
  }

  #[tokio::test]
  async fn split_string_yields_one_item_per_char() {
    let out: Vec<String> = split_string("ALEX").collect().await;
    assert_eq!(out, vec!["A", "L", "E", "X"]);
  }

  #[tokio::test(start_paused = true)]
  async fn split_string_with_delay_stays_in_order() {
    let out: Vec<String> = split_string_with_delay("CHLOE", Duration::from_millis(1_000)).collect().await;
    assert_eq!(out, vec!["C", "H", "L", "O", "E"]);

    let out: Vec<String> = split_string_with_delay("BEN", Duration::ZERO).collect().await;
    assert_eq!(out, vec!["B", "E", "N"]);
  }

  #[test]
  fn split_delay_bound_saturates_instead_of_wrapping() {
    assert_eq!(saturating_millis(Duration::from_millis(1_000)), 1_000);
    assert_eq!(saturating_millis(Duration::MAX), u64::MAX);
  }

  #[tokio::test(start_paused = true)]
  async fn delay_elements_spaces_items() {
    let start = tokio::time::Instant::now();

    let out: Vec<_> = delay_elements(letters(&["A", "B", "C"]), Duration::from_millis(100)).collect().await;

    assert_eq!(out, vec!["A", "B", "C"]);
    assert!(start.elapsed() >= Duration::from_millis(300));
  }

  #[tokio::test(start_paused = true)]
  async fn concat_map_preserves_order_despite_delays() {
    let out: Vec<&str> = concat_map(from_iter([(300_u64, "slow"), (10, "fast")]), |(ms, tag)| {
      delay_elements(from_iter([tag]), Duration::from_millis(ms))
    })
    .collect()
    .await;

    assert_eq!(out, vec!["slow", "fast"]);
  }

  #[tokio::test]
  async fn concat_does_not_touch_second_until_first_ends() {
    let touched = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&touched);
    let second = stream::once(async move {
      flag.store(true, Ordering::SeqCst);
      "D"
    })
    .boxed();

    let mut out = concat(letters(&["A", "B"]), second);

    assert_eq!(out.next().await, Some("A"));
    assert_eq!(out.next().await, Some("B"));
    assert!(!touched.load(Ordering::SeqCst));
    assert_eq!(out.next().await, Some("D"));
    assert!(touched.load(Ordering::SeqCst));
  }

  #[tokio::test(start_paused = true)]
  async fn merge_follows_the_delay_schedule() {
    let abc = delay_elements(letters(&["A", "B", "C"]), Duration::from_millis(100));
    let def = delay_elements(letters(&["D", "E", "F"]), Duration::from_millis(125));

    let out: Vec<_> = merge(abc, def).collect().await;

    assert_eq!(out, vec!["A", "D", "B", "E", "C", "F"]);
  }

  #[tokio::test(start_paused = true)]
  async fn merge_sequential_buffers_the_faster_second_source() {
    let start = tokio::time::Instant::now();
    let slow = delay_elements(letters(&["A", "B", "C"]), Duration::from_millis(100));
    let fast = delay_elements(letters(&["D", "E", "F"]), Duration::from_millis(10));

    let out: Vec<_> = merge_sequential(slow, fast).collect().await;

    assert_eq!(out, vec!["A", "B", "C", "D", "E", "F"]);
    // la segunda fuente corrió en paralelo: no se suman sus 30ms al final
    assert!(start.elapsed() < Duration::from_millis(330));
  }

  #[tokio::test]
  async fn zips_stop_at_the_shortest_source() {
    let out: Vec<String> =
      zip2(letters(&["A", "B", "C"]), letters(&["D", "E"]), |a, b| format!("{a}{b}")).collect().await;
    assert_eq!(out, vec!["AD", "BE"]);

    let out: Vec<String> = zip3(letters(&["A"]), letters(&["D"]), letters(&["1", "2"]), |a, b, c| {
      format!("{a}{b}{c}")
    })
    .collect()
    .await;
    assert_eq!(out, vec!["AD1"]);
  }

  #[tokio::test]
  async fn zip_monos_is_empty_if_either_side_is() {
    assert_eq!(zip_monos(just("A"), just("B"), |a, b| format!("{a}{b}")).await, Some("AB".into()));
    assert_eq!(zip_monos(just("A"), empty_mono::<&str>(), |a, b| format!("{a}{b}")).await, None);
  }

  #[tokio::test]
  async fn flat_map_many_on_empty_mono_is_empty() {
    let out: Vec<String> = flat_map_many(empty_mono::<String>(), |s| split_string(&s)).collect().await;
    assert!(out.is_empty());

    let out: Vec<String> = flat_map_many(just("BEN".to_string()), |s| split_string(&s)).collect().await;
    assert_eq!(out, vec!["B", "E", "N"]);
  }

  #[tokio::test]
  async fn default_if_empty_only_applies_to_empty_sources() {
    let out: Vec<_> = default_if_empty(letters(&[]), "default").collect().await;
    assert_eq!(out, vec!["default"]);

    let out: Vec<_> = default_if_empty(letters(&["A", "B"]), "default").collect().await;
    assert_eq!(out, vec!["A", "B"]);
  }

  #[tokio::test]
  async fn switch_if_empty_subscribes_fallback_only_when_needed() {
    let touched = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&touched);
    let fallback = stream::once(async move {
      flag.store(true, Ordering::SeqCst);
      "X"
    })
    .boxed();

    let out: Vec<_> = switch_if_empty(letters(&["A"]), fallback).collect().await;
    assert_eq!(out, vec!["A"]);
    assert!(!touched.load(Ordering::SeqCst));

    let out: Vec<_> = switch_if_empty(letters(&[]), letters(&["X", "Y"])).collect().await;
    assert_eq!(out, vec!["X", "Y"]);
  }

  #[tokio::test]
  async fn merge_monos_emits_both() {
    let out: Vec<_> = merge_monos(just("A"), just("B")).collect().await;
    assert_eq!(out, vec!["A", "B"]);
  }
}

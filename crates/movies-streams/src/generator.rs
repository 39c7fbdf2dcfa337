//! Muestrario de operadores: cada método construye una secuencia nueva a
//! partir de literales fijos y la devuelve sin suscribirla.

use std::time::Duration;

use futures::{FutureExt, StreamExt};
use tracing::debug;

use crate::config::SamplerConfig;
use crate::log::LogExt;
use crate::operators::{
  concat, concat_map, default_if_empty, delay_elements, flat_map_many, from_iter, just, merge, merge_monos,
  merge_sequential, mono_to_flux, split_string, split_string_with_delay, switch_if_empty, zip_monos, zip2, zip4,
};
use crate::pool::WorkerPool;
use crate::{Flux, Mono};

const NAMES: [&str; 3] = ["alex", "ben", "chloe"];
const ABC: [&str; 3] = ["A", "B", "C"];
const DEF: [&str; 3] = ["D", "E", "F"];
const ONE_TWO_THREE: [&str; 3] = ["1", "2", "3"];
const FOUR_FIVE_SIX: [&str; 3] = ["4", "5", "6"];

const ABC_DELAY: Duration = Duration::from_millis(100);
const DEF_DELAY: Duration = Duration::from_millis(125);
const FALLBACK: &str = "default";

fn names() -> Flux<String> {
  from_iter(NAMES.map(String::from))
}

fn letters(items: [&'static str; 3]) -> Flux<String> {
  from_iter(items.map(String::from))
}

fn upper_longer_than(flux: Flux<String>, len: usize) -> Flux<String> {
  flux.map(|s| s.to_uppercase()).filter(move |s| futures::future::ready(s.chars().count() > len)).boxed()
}

fn mono_upper_longer_than(len: usize) -> Mono<String> {
  just(NAMES[0].to_string())
    .map(move |name| name.map(|s| s.to_uppercase()).filter(|s| s.chars().count() > len))
    .boxed()
}

fn log_mono<T>(mono: Mono<T>, label: &'static str) -> Mono<T>
where
  T: std::fmt::Debug + Send + 'static,
{
  mono
    .inspect(move |value| match value {
      Some(v) => debug!(label, value = ?v, "mono resolved"),
      None => debug!(label, "mono empty"),
    })
    .boxed()
}

pub struct FluxAndMonoGenerator {
  pool: WorkerPool,
  config: SamplerConfig,
}

impl FluxAndMonoGenerator {
  pub fn new(pool: WorkerPool, config: SamplerConfig) -> Self {
    Self { pool, config }
  }

  /// Generador sobre el runtime actual con la configuración por defecto.
  /// Panics outside a Tokio runtime.
  pub fn with_defaults() -> Self {
    let config = SamplerConfig::default();
    Self::new(WorkerPool::current(config.max_concurrency), config)
  }

  // ---------------------------------------------------------------------------
  // map / filter
  // ---------------------------------------------------------------------------

  pub fn names_flux(&self) -> Flux<String> {
    names().logged("names_flux").boxed()
  }

  pub fn names_mono(&self) -> Mono<String> {
    log_mono(just(NAMES[0].to_string()), "names_mono")
  }

  /// Nombres en mayúsculas con más de `len` caracteres, como `"{len}-{NAME}"`.
  pub fn names_flux_map(&self, len: usize) -> Flux<String> {
    upper_longer_than(names(), len)
      .map(|s| format!("{}-{}", s.chars().count(), s))
      .logged("names_flux_map")
      .boxed()
  }

  /// El `map` produce un stream nuevo; el original sigue intacto y es el
  /// que se devuelve.
  pub fn names_flux_immutability(&self) -> Flux<String> {
    let source = names();
    let _upper = names().map(|s| s.to_uppercase());
    source
  }

  pub fn names_mono_map_filter(&self, len: usize) -> Mono<String> {
    log_mono(mono_upper_longer_than(len), "names_mono_map_filter")
  }

  pub fn names_mono_map_flat_map(&self, len: usize) -> Mono<Vec<String>> {
    let mono = mono_upper_longer_than(len)
      .map(|name| name.map(|s| s.chars().map(String::from).collect::<Vec<_>>()))
      .boxed();
    log_mono(mono, "names_mono_map_flat_map")
  }

  pub fn names_mono_map_flat_map_many(&self, len: usize) -> Flux<String> {
    flat_map_many(mono_upper_longer_than(len), |s| split_string(&s))
      .logged("names_mono_map_flat_map_many")
      .boxed()
  }

  // ---------------------------------------------------------------------------
  // flat_map / concat_map / transform
  // ---------------------------------------------------------------------------

  /// Expansión concurrente en el pool: el orden entre nombres no está
  /// garantizado, sólo el multiconjunto de letras.
  pub fn names_flux_flat_map(&self, len: usize) -> Flux<String> {
    self
      .pool
      .flat_map_unordered(upper_longer_than(names(), len), |s| split_string(&s))
      .logged("names_flux_flat_map")
      .boxed()
  }

  pub fn names_flux_flat_map_async(&self, len: usize) -> Flux<String> {
    let max = self.config.max_split_delay();
    self
      .pool
      .flat_map_unordered(upper_longer_than(names(), len), move |s| split_string_with_delay(&s, max))
      .logged("names_flux_flat_map_async")
      .boxed()
  }

  /// Igual que el async pero secuencial: las letras salen en orden aunque
  /// cada nombre tenga su propio retraso.
  pub fn names_flux_concat_map(&self, len: usize) -> Flux<String> {
    let max = self.config.max_split_delay();
    concat_map(upper_longer_than(names(), len), move |s| split_string_with_delay(&s, max))
      .logged("names_flux_concat_map")
      .boxed()
  }

  pub fn names_flux_transform(&self, len: usize) -> Flux<String> {
    let filter_map = move |flux: Flux<String>| upper_longer_than(flux, len);

    let letters = concat_map(filter_map(names()), |s| split_string(&s));
    default_if_empty(letters, FALLBACK.to_string()).logged("names_flux_transform").boxed()
  }

  /// El fallback pasa por la misma transformación que la fuente principal.
  pub fn names_flux_transform_switch_if_empty(&self, len: usize) -> Flux<String> {
    let filter_map = move |flux: Flux<String>| concat_map(upper_longer_than(flux, len), |s| split_string(&s));

    let fallback = filter_map(from_iter([FALLBACK.to_string()]));
    switch_if_empty(filter_map(names()), fallback).logged("names_flux_transform_switch_if_empty").boxed()
  }

  // ---------------------------------------------------------------------------
  // concat / merge / zip
  // ---------------------------------------------------------------------------

  pub fn explore_concat(&self) -> Flux<String> {
    concat(letters(ABC), letters(DEF)).logged("explore_concat").boxed()
  }

  pub fn explore_concat_with(&self) -> Flux<String> {
    letters(ABC).chain(letters(DEF)).logged("explore_concat_with").boxed()
  }

  pub fn explore_concat_with_mono(&self) -> Flux<String> {
    let a = mono_to_flux(just("A".to_string()));
    let b = from_iter(["B".to_string()]);
    concat(a, b).logged("explore_concat_with_mono").boxed()
  }

  pub fn explore_merge(&self) -> Flux<String> {
    let abc = delay_elements(letters(ABC), ABC_DELAY);
    let def = delay_elements(letters(DEF), DEF_DELAY);
    merge(abc, def).logged("explore_merge").boxed()
  }

  pub fn explore_merge_with(&self) -> Flux<String> {
    let abc = delay_elements(letters(ABC), ABC_DELAY);
    let def = delay_elements(letters(DEF), DEF_DELAY);
    futures::stream::select(abc, def).logged("explore_merge_with").boxed()
  }

  pub fn explore_merge_with_mono(&self) -> Flux<String> {
    merge_monos(just("A".to_string()), just("B".to_string())).logged("explore_merge_with_mono").boxed()
  }

  pub fn explore_merge_sequential(&self) -> Flux<String> {
    let abc = delay_elements(letters(ABC), ABC_DELAY);
    let def = delay_elements(letters(DEF), DEF_DELAY);
    merge_sequential(abc, def).logged("explore_merge_sequential").boxed()
  }

  pub fn explore_zip(&self) -> Flux<String> {
    zip2(letters(ABC), letters(DEF), |a, b| a + &b).logged("explore_zip").boxed()
  }

  pub fn explore_zip_1(&self) -> Flux<String> {
    zip4(letters(ABC), letters(DEF), letters(ONE_TWO_THREE), letters(FOUR_FIVE_SIX), |a, b, c, d| {
      format!("{a}{b}{c}{d}")
    })
    .logged("explore_zip_1")
    .boxed()
  }

  pub fn explore_zip_with(&self) -> Flux<String> {
    letters(ABC).zip(letters(DEF)).map(|(a, b)| a + &b).logged("explore_zip_with").boxed()
  }

  pub fn explore_zip_with_mono(&self) -> Mono<String> {
    let zipped = zip_monos(just("A".to_string()), just("B".to_string()), |a, b| a + &b);
    log_mono(zipped, "explore_zip_with_mono")
  }
}

//! Catálogo de operadores sobre streams, a partir de literales en memoria.
//!
//! `Flux<T>` es una secuencia perezosa de 0..n elementos y `Mono<T>` un
//! futuro que resuelve a lo sumo un elemento. Nada se ejecuta hasta que
//! alguien hace poll; volver a llamar al método generador equivale a una
//! suscripción nueva.

pub mod config;
pub mod generator;
pub mod log;
pub mod operators;
pub mod pool;

use futures::future::BoxFuture;
use futures::stream::BoxStream;

pub type Flux<T> = BoxStream<'static, T>;
pub type Mono<T> = BoxFuture<'static, Option<T>>;

pub use config::SamplerConfig;
pub use generator::FluxAndMonoGenerator;
pub use log::{LogExt, Logged};
pub use pool::WorkerPool;

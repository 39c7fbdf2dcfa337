use futures::StreamExt;
use movies_config::TomlConfigBackend;
use movies_streams::{FluxAndMonoGenerator, SamplerConfig, WorkerPool};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

  let backend = TomlConfigBackend::detect().expect("config backend");
  let config = SamplerConfig::load(&backend).expect("sampler config");
  let generator = FluxAndMonoGenerator::new(WorkerPool::current(config.max_concurrency), config);

  let start_time = Instant::now();

  let mut names = generator.names_flux();
  while let Some(name) = names.next().await {
    println!("Name is : {name}");
  }

  if let Some(name) = generator.names_mono().await {
    println!("Mono Name is : {name}");
  }

  let letters: Vec<String> = generator.names_flux_flat_map_async(3).collect().await;

  println!("------------------------------------------------");
  println!("Letras (flat_map async): {}", letters.join(" "));
  println!("Tiempo de ejecución: {:.2?}", start_time.elapsed());
  println!("------------------------------------------------");
}

//! Measures a batch of host names with a small worker pool.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::info;
use wren::{PMapOptions, ParallelMap, logging, pmap};

fn slow_len(host: &str) -> usize {
    thread::sleep(Duration::from_millis(20));
    host.len()
}

fn main() -> Result<()> {
    logging::init_default();

    let hosts = vec!["alpha.example", "beta.example", "gamma.example", "delta.example", "epsilon.example"];

    let started = Instant::now();
    let lengths = pmap(Some(slow_len), Some(&PMapOptions::default().with_fixed_pool(2)), hosts.clone());
    info!(?lengths, elapsed = ?started.elapsed(), "two workers, input order");

    let started = Instant::now();
    let lengths = ParallelMap::new(slow_len).unordered().run(hosts.clone());
    info!(?lengths, elapsed = ?started.elapsed(), "one worker per input, completion order");

    let parsed: Vec<Result<u16, String>> = ParallelMap::new(|s: &str| s.parse::<u16>().map_err(|e| e.to_string()))
        .options(PMapOptions::cpu_bound())
        .run(vec!["80", "443", "http"]);
    for (input, outcome) in ["80", "443", "http"].iter().zip(&parsed) {
        info!(input, ?outcome, "parsed port");
    }

    Ok(())
}

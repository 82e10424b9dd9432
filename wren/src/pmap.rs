//! Bounded parallel map.
//!
//! Fans a list of inputs out to a short-lived pool of worker threads and fans
//! the results back in, either in input order (the default) or in completion
//! order. The pool lives only for the duration of one call and the call
//! blocks until every input has been transformed.
//!
//! Workers run inside a [`std::thread::scope`], so the transformation may
//! borrow from the caller. The transformation is not expected to fail; encode
//! failures in `R` (for example `Result<_, _>`) if it can. A panic in the
//! transformation is re-raised on the calling thread once the pool has
//! wound down.

use std::thread;

use flume::Receiver;
use tracing::{trace, warn};

use crate::thread::config::PMapOptions;

/// Applies `f` to every input using up to `options.fixed_pool` workers
/// (one per input by default).
///
/// An empty input list or a missing transformation yields an empty list
/// without starting any thread.
pub fn pmap<T, R, F>(f: Option<F>, options: Option<&PMapOptions>, inputs: Vec<T>) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
{
    let Some(f) = f else {
        return Vec::new();
    };
    ParallelMap::new(f)
        .options(options.cloned().unwrap_or_default())
        .run(inputs)
}

/// Builder form of [`pmap`].
///
/// ```rust
/// use wren::pmap::ParallelMap;
///
/// let squares = ParallelMap::new(|x: u64| x * x).workers(2).run(vec![1, 2, 3]);
/// assert_eq!(squares, vec![1, 4, 9]);
/// ```
#[derive(Debug, Clone)]
pub struct ParallelMap<F> {
    f: F,
    options: PMapOptions,
}

impl<F> ParallelMap<F> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            options: PMapOptions::default(),
        }
    }

    pub fn options(mut self, options: PMapOptions) -> Self {
        self.options = options;
        self
    }

    /// Caps the pool at `workers` threads; `0` restores one per input.
    pub fn workers(mut self, workers: usize) -> Self {
        self.options.fixed_pool = workers;
        self
    }

    /// Returns results in completion order.
    pub fn unordered(mut self) -> Self {
        self.options.random_order = true;
        self
    }

    pub fn ordered(mut self) -> Self {
        self.options.random_order = false;
        self
    }

    pub fn run<T, R>(&self, inputs: Vec<T>) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
    {
        if inputs.is_empty() {
            return Vec::new();
        }
        let workers = self.options.worker_count(inputs.len());
        trace!(inputs = inputs.len(), workers, ordered = !self.options.random_order, "parallel map");

        if self.options.random_order {
            self.as_available(inputs, workers)
        } else {
            self.preserve_order(inputs, workers)
        }
    }

    fn preserve_order<T, R>(&self, inputs: Vec<T>, workers: usize) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
    {
        let f = &self.f;
        let mut slots: Vec<Option<R>> = inputs.iter().map(|_| None).collect();
        let jobs = queue(inputs.into_iter().enumerate());

        fan_out(
            jobs,
            workers,
            |(index, value)| (index, f(value)),
            |(index, result)| slots[index] = Some(result),
        );

        slots.into_iter().flatten().collect()
    }

    fn as_available<T, R>(&self, inputs: Vec<T>, workers: usize) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
    {
        let mut results = Vec::with_capacity(inputs.len());
        let jobs = queue(inputs);
        fan_out(jobs, workers, &self.f, |result| results.push(result));
        results
    }
}

/// Loads every job up front and closes the queue, so workers stop once it
/// runs dry.
fn queue<J>(jobs: impl IntoIterator<Item = J>) -> Receiver<J> {
    let (tx, rx) = flume::unbounded();
    for job in jobs {
        // The receiver is alive in this scope, so this cannot fail.
        let _ = tx.send(job);
    }
    rx
}

fn fan_out<J, O, W, C>(jobs: Receiver<J>, workers: usize, work: W, mut collect: C)
where
    J: Send,
    O: Send,
    W: Fn(J) -> O + Sync,
    C: FnMut(O),
{
    let (results_tx, results_rx) = flume::bounded::<O>((workers / 3).max(1));
    let work = &work;

    thread::scope(|scope| {
        let mut started = 0;
        for n in 0..workers {
            let jobs = jobs.clone();
            let results = results_tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("wren-pmap-{n}"))
                .spawn_scoped(scope, move || {
                    for job in jobs.iter() {
                        if results.send(work(job)).is_err() {
                            break;
                        }
                    }
                });
            match spawned {
                Ok(_) => started += 1,
                Err(err) => {
                    warn!(%err, started, requested = workers, "failed to start parallel map worker");
                    break;
                }
            }
        }
        drop(results_tx);

        if started == 0 {
            for job in jobs.try_iter() {
                collect(work(job));
            }
            return;
        }
        for result in results_rx.iter() {
            collect(result);
        }
    });
}

pub const DEFAULT_THREAD_NAME_PREFIX: &str = "wren-actor";

// --- Actor Configuration ---

/// Configuration for a single actor. Children inherit their parent's
/// configuration unless spawned with an explicit one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreadActorConfig {
    /// Capacity of the actor's mailbox.
    ///
    /// `None` is an unbounded queue: `send` never blocks, at the cost of
    /// unbounded memory growth when an actor falls behind its senders.
    /// `Some(n)` blocks senders while `n` messages are pending, and
    /// `Some(0)` hands each message directly to the worker.
    pub mailbox_capacity: Option<usize>,

    /// Prefix of the worker thread name; the actor id is appended.
    pub thread_name_prefix: String,
}

impl Default for ThreadActorConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: None,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl ThreadActorConfig {
    /// Configuration with a bounded mailbox of `capacity` slots.
    pub fn bounded(capacity: usize) -> Self {
        Self::default().with_mailbox_capacity(capacity)
    }

    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = Some(capacity);
        self
    }

    pub fn unbounded(mut self) -> Self {
        self.mailbox_capacity = None;
        self
    }

    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }
}

// --- Parallel Map Configuration ---

/// Options for [`pmap`](crate::pmap::pmap).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PMapOptions {
    /// Upper bound on worker threads. `0` means one worker per input.
    pub fixed_pool: usize,

    /// Return results as they complete instead of in input order.
    pub random_order: bool,
}

impl PMapOptions {
    /// One worker per logical CPU, for transformations that are CPU bound.
    pub fn cpu_bound() -> Self {
        Self {
            fixed_pool: num_cpus::get(),
            ..Self::default()
        }
    }

    pub fn with_fixed_pool(mut self, workers: usize) -> Self {
        self.fixed_pool = workers;
        self
    }

    pub fn with_random_order(mut self, random_order: bool) -> Self {
        self.random_order = random_order;
        self
    }

    /// Number of workers to start for `len` inputs.
    pub fn worker_count(&self, len: usize) -> usize {
        if self.fixed_pool > 0 && self.fixed_pool < len {
            self.fixed_pool
        } else {
            len
        }
    }
}

// Logging for Wren
//
// The runtime reports through the `tracing` ecosystem: actor start and stop,
// dropped messages, behavior panics and ask timeouts. Nothing is printed
// unless the application installs a subscriber, either its own or one of the
// presets below.
//
// ```rust
// use wren::logging;
//
// // INFO level, human-readable console output
// logging::init_default();
//
// // Or pick the knobs yourself
// let config = logging::LogConfig {
//     level: tracing::Level::DEBUG,
//     target_filters: Some("wren::thread=trace".to_string()),
//     ..Default::default()
// };
// logging::init(config);
// ```
//
// Only the first initialization in a process takes effect.

use std::fs::OpenOptions;
use std::io;
use std::sync::Once;

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Configuration for the logging presets.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: Level,
    /// Whether to use JSON format for logs
    pub json_format: bool,
    /// Whether to include file and line information
    pub show_file_line: bool,
    /// Whether to include thread name/id
    pub show_thread_info: bool,
    /// Whether to include timestamps
    pub show_time: bool,
    /// Target filter expressions (format: "target=level,target2=level2,...")
    pub target_filters: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            show_file_line: true,
            show_thread_info: true,
            show_time: true,
            target_filters: None,
        }
    }
}

static INIT: Once = Once::new();

fn env_filter(config: &LogConfig) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env().add_directive(LevelFilter::from_level(config.level).into());
    if let Some(filters) = &config.target_filters {
        for directive in filters.split(',').filter_map(|f| f.trim().parse().ok()) {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

fn console_layer<S>(config: &LogConfig) -> fmt::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_ansi(atty::is(atty::Stream::Stdout))
        .with_file(config.show_file_line)
        .with_line_number(config.show_file_line)
        .with_thread_names(config.show_thread_info)
        .with_thread_ids(config.show_thread_info)
}

/// Installs the global subscriber described by `config`.
///
/// Safe to call more than once; only the first call has an effect.
pub fn init(config: LogConfig) {
    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(env_filter(&config));

        let result = if config.json_format {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .flatten_event(true)
                        .with_thread_names(config.show_thread_info),
                )
                .try_init()
        } else if config.show_time {
            registry.with(console_layer(&config)).try_init()
        } else {
            registry.with(console_layer(&config).without_time()).try_init()
        };

        if let Err(err) = result {
            eprintln!("Error setting global tracing subscriber: {}", err);
        }
    });
}

/// Logs to the console and appends plain-text lines to `log_file`.
///
/// Fails if the file cannot be opened; nothing is installed in that case.
pub fn init_with_file(config: LogConfig, log_file: &str) -> io::Result<()> {
    // Surface a bad path now rather than silently inside the writer.
    OpenOptions::new().create(true).append(true).open(log_file)?;

    INIT.call_once(|| {
        let log_file_path = log_file.to_string();
        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_writer(move || -> Box<dyn io::Write + Send + Sync> {
                match OpenOptions::new().create(true).append(true).open(&log_file_path) {
                    Ok(file) => Box::new(file),
                    Err(_) => Box::new(io::stderr()),
                }
            })
            .with_file(true)
            .with_line_number(true)
            .with_thread_names(true);

        let result = tracing_subscriber::registry()
            .with(env_filter(&config))
            .with(console_layer(&config))
            .with(file_layer)
            .try_init();

        if let Err(err) = result {
            eprintln!("Error setting global tracing subscriber: {}", err);
        }
    });
    Ok(())
}

/// INFO level, human-readable console output.
pub fn init_default() {
    init(LogConfig::default());
}

/// DEBUG everywhere and TRACE for the runtime internals.
pub fn init_development() {
    init(LogConfig {
        level: Level::DEBUG,
        target_filters: Some("wren=debug,wren::thread=trace".to_string()),
        ..LogConfig::default()
    });
}

/// JSON lines without source locations, for log aggregators.
pub fn init_production() {
    init(LogConfig {
        level: Level::INFO,
        json_format: true,
        show_file_line: false,
        show_thread_info: true,
        show_time: true,
        target_filters: None,
    });
}

/// Warnings and errors only, compact, for test binaries.
pub fn init_test() {
    init(LogConfig {
        level: Level::WARN,
        json_format: false,
        show_file_line: true,
        show_thread_info: false,
        show_time: false,
        target_filters: None,
    });
}

/// Span covering work done on behalf of one actor.
///
/// ```rust
/// let span = wren::actor_span!("root", "4f2a9c1e");
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! actor_span {
    ($actor_type:expr, $actor_id:expr) => {
        $crate::tracing::info_span!("actor", kind = $actor_type, id = %$actor_id)
    };
    ($actor_type:expr, $actor_id:expr, $($fields:tt)*) => {
        $crate::tracing::info_span!("actor", kind = $actor_type, id = %$actor_id, $($fields)*)
    };
}

/// Actor lifecycle event, tagged with the actor id.
#[macro_export]
macro_rules! log_lifecycle {
    ($actor_id:expr, $event:expr) => {
        $crate::tracing::debug!(actor_id = %$actor_id, event = $event)
    };
    ($actor_id:expr, $event:expr, $($fields:tt)*) => {
        $crate::tracing::debug!(actor_id = %$actor_id, event = $event, $($fields)*)
    };
}

/// Message handling event inside a behavior.
#[macro_export]
macro_rules! log_message {
    ($message_type:expr, $status:expr) => {
        $crate::tracing::debug!(message_type = $message_type, status = $status)
    };
    ($message_type:expr, $status:expr, $($fields:tt)*) => {
        $crate::tracing::debug!(message_type = $message_type, status = $status, $($fields)*)
    };
}

/// The dispatcher active on this thread, to carry into threads the caller
/// starts itself.
#[inline]
pub fn current_subscriber() -> tracing::Dispatch {
    tracing::dispatcher::get_default(|d| d.clone())
}

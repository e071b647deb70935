use std::sync::Once;

use log::LevelFilter;

/// Logger configuration.
///
/// Filter precedence: `env_filter`, then `RUST_LOG`, then `default_level`.
/// `env_filter` uses the `env_logger` syntax, e.g.
/// "goldthread_craft=debug,goldthread_engine=info".
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Debug output for the craft core, info for the engine plumbing.
    pub fn verbose() -> Self {
        Self {
            env_filter: Some("info,goldthread_craft=debug".to_string()),
            ..Self::default()
        }
    }
}

static INIT: Once = Once::new();

fn filtered_builder(env_filter: Option<&str>, default_level: LevelFilter) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    match env_filter.map(str::to_owned).or_else(|| std::env::var("RUST_LOG").ok()) {
        Some(filter) => {
            builder.parse_filters(&filter);
        }
        None => {
            builder.filter_level(default_level);
        }
    }
    builder
}

/// Initializes the global logger once; later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = filtered_builder(config.env_filter.as_deref(), config.default_level);
        builder.write_style(config.write_style);
        builder.init();

        log::debug!("logging initialized");
    });
}

/// Routes log output through the test harness capture.
///
/// Safe to call from every test. Honors `RUST_LOG`, defaulting to `debug`.
pub fn init_test_logging() {
    let _ = filtered_builder(None, LevelFilter::Debug).is_test(true).try_init();
}

//! Logging for the indexing engine.
//!
//! Events go through `tracing`. The engine names its worker and completion
//! threads (`cxref-worker-N`, `cxref-completion`), and the subscriber set
//! up here prints thread names, so job and sync events attribute themselves
//! to the thread that produced them.
//!
//! # Configuration
//!
//! `LoggingConfig::modules` keys are module paths inside this crate:
//!
//! ```toml
//! [logging]
//! default = "warn"
//!
//! [logging.modules]
//! indexing = "debug"   # job dispatch and completion events
//! storage = "debug"    # sync batches and store writes
//! ```
//!
//! The `RUST_LOG` environment variable takes precedence over the whole
//! config when set.

use std::sync::Once;

use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Translate `config` into filter directives scoped to this crate.
///
/// `default` becomes the global level; each `modules` entry becomes a
/// `cxref::<module>=<level>` directive. Entries that do not parse as a
/// directive are dropped.
fn config_filter(config: &LoggingConfig) -> EnvFilter {
    let mut filter = EnvFilter::new(&config.default);
    for (module, level) in &config.modules {
        if let Ok(directive) = format!("cxref::{module}={level}").parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

/// Initialize logging once.
///
/// Safe to call multiple times; only the first call takes effect. When
/// `RUST_LOG` is set it wins over `config`.
pub fn init_with_config(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = if std::env::var(EnvFilter::DEFAULT_ENV).is_ok() {
            EnvFilter::from_default_env()
        } else {
            config_filter(config)
        };

        let layer = tracing_subscriber::fmt::layer()
            .with_timer(ChronoLocal::new("%H:%M:%S%.3f".to_owned()))
            .with_thread_names(true)
            .with_filter(filter);

        tracing_subscriber::registry().with(layer).init();
    });
}

/// Initialize with the default quiet configuration (`warn`).
pub fn init() {
    init_with_config(&LoggingConfig::default());
}

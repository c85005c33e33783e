// src/logging.rs

use crate::config::LoggingConfig;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Подключить tracing-subscriber.
///
/// `RUST_LOG` важнее уровня из конфига. Логи идут в stderr, чтобы
/// stdout оставался для LDIF и JSON.
pub fn init(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_lowercase()));

    let registry = tracing_subscriber::registry().with(env_filter);

    // try_init: повторная инициализация (например, в тестах) не паникует
    let _ = if config.enable_json_output {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
}

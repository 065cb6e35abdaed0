//! # Logging
//! src/logging.rs
//!
//! Inicializa `tracing` con salida formateada a stderr. El nivel por
//! defecto es `info`; `RUST_LOG` lo reemplaza (solo afecta diagnósticos).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filtro usado cuando `RUST_LOG` no está definido
pub const DEFAULT_FILTER: &str = "oneshot_http=info";

/// Instala el subscriber global.
///
/// Llamarla más de una vez no falla: la segunda instalación se ignora.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

//! # Logging
//! src/logging.rs
//!
//! Subscriber de `tracing` para el binario. La biblioteca solo emite eventos;
//! quien la use decide si instala este subscriber u otro.
//!
//! El filtro sale de `RUST_LOG` si está definido. Si no, `verbose` elige
//! entre `debug` (cada conexión y request) e `info` (arranque, apagado y
//! errores).

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Instala el subscriber global
///
/// Falla si ya había uno instalado (por ejemplo, en tests).
pub fn init(verbose: bool, colors: bool) -> Result<(), TryInitError> {
    let default_level = if verbose {
        "comet=debug,comet_http=debug"
    } else {
        "comet=info,comet_http=info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(fmt::layer().with_ansi(colors))
        .try_init()
}

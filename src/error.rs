//! # Errores del Servidor
//! src/error.rs
//!
//! Taxonomía de errores del núcleo:
//!
//! - [`SetupError`]: fallos al crear el socket de escucha. Es el único error
//!   fatal: `init` falla y no arranca nada.
//! - [`ConnectionError`]: fallos de una conexión concreta (lectura, parseo,
//!   serialización, envío). Se loguean y la conexión se abandona; el loop
//!   sigue con la siguiente.
//! - [`RouteError`]: errores del llamador al registrar rutas o middlewares.
//!
//! Los 404/405/500 no son errores de Rust: el dispatcher los sintetiza como
//! respuestas.

use crate::http::{ParseError, SerializeError};
use std::io;
use thiserror::Error;

/// Fallos al inicializar el socket de escucha
#[derive(Debug, Error)]
pub enum SetupError {
    /// Configuración inválida (ver [`crate::config::Config::validate`])
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to create socket: {0}")]
    Socket(#[source] io::Error),

    #[error("failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },

    /// Fallo en SO_RCVTIMEO, SO_REUSEADDR o el modo no bloqueante
    #[error("failed to configure {option} on listening socket: {source}")]
    Configure {
        option: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("failed to listen on socket: {0}")]
    Listen(#[source] io::Error),
}

/// Fallos durante el procesamiento de una conexión aceptada
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Timeout, reset o interrupción durante la lectura
    #[error("failed to read from socket: {0}")]
    Read(#[source] io::Error),

    /// El cliente siguió mandando bloques completos más allá del límite
    #[error("request exceeds {limit} bytes")]
    RequestTooLarge { limit: usize },

    /// El codec no pudo parsear los bytes recibidos; no se envía respuesta
    #[error("failed to parse request: {0}")]
    Parse(#[from] ParseError),

    #[error("failed to serialize response: {0}")]
    Serialize(#[from] SerializeError),

    #[error("failed to send response: {0}")]
    Send(#[source] io::Error),
}

/// Errores al registrar rutas y middlewares
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },

    #[error("invalid route index {0}")]
    UnknownRoute(usize),
}

//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor con soporte para argumentos CLI y variables de
//! entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./comet --port 8080 \
//!   --recv-timeout 2000 \
//!   --cors-policy ./cors.json \
//!   --verbose
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! COMET_PORT=8080 COMET_VERBOSE=true ./comet
//! ```

use clap::builder::FalseyValueParser;
use clap::Parser;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Configuración del servidor
#[derive(Debug, Clone, Parser)]
#[command(name = "comet")]
#[command(about = "Servidor HTTP que atiende una conexión a la vez")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor (0 = puerto efímero)
    #[arg(short, long, default_value = "8080", env = "COMET_PORT")]
    pub port: u16,

    // === Socket de escucha ===

    /// Máximo de conexiones pendientes en la cola de `listen`
    #[arg(long, default_value = "10", env = "COMET_BACKLOG")]
    pub backlog: i32,

    /// Timeout de recepción del socket de escucha en milisegundos
    #[arg(long = "listen-timeout", default_value = "1000", env = "COMET_LISTEN_TIMEOUT")]
    pub listen_timeout_ms: u64,

    // === Conexión aceptada ===

    /// Timeout de lectura de la conexión en milisegundos
    #[arg(long = "recv-timeout", default_value = "5000", env = "COMET_RECV_TIMEOUT")]
    pub recv_timeout_ms: u64,

    /// Timeout de escritura de la conexión en milisegundos
    #[arg(long = "send-timeout", default_value = "5000", env = "COMET_SEND_TIMEOUT")]
    pub send_timeout_ms: u64,

    /// Pausa entre intentos de accept cuando no hay conexiones pendientes
    #[arg(long = "poll-interval", default_value = "10", env = "COMET_POLL_INTERVAL")]
    pub poll_interval_ms: u64,

    /// Tamaño máximo de un request en bytes; si se supera, la conexión se abandona
    #[arg(long = "max-request-bytes", default_value = "1048576", env = "COMET_MAX_REQUEST_BYTES")]
    pub max_request_bytes: usize,

    // === Logging ===

    /// Loguea también cada conexión aceptada/cerrada y cada request
    #[arg(short, long, env = "COMET_VERBOSE", value_parser = FalseyValueParser::new())]
    pub verbose: bool,

    /// Desactiva los colores ANSI en los logs
    ///
    /// Como en la convención de NO_COLOR, cualquier valor no vacío cuenta
    /// (`NO_COLOR=1`); solo `0`, `false`, `no`, `off` o vacío lo desactivan.
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = FalseyValueParser::new())]
    pub no_color: bool,

    // === CORS ===

    /// Archivo JSON con la política CORS (si falta se usa la política por defecto)
    #[arg(long = "cors-policy", env = "COMET_CORS_POLICY")]
    pub cors_policy: Option<PathBuf>,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Configuración por defecto escuchando en `port`
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }

    /// Dirección de bind: todas las interfaces
    ///
    /// # Ejemplo
    /// ```rust
    /// use comet_http::config::Config;
    ///
    /// let config = Config::with_port(3000);
    /// assert_eq!(config.address().to_string(), "0.0.0.0:3000");
    /// ```
    pub fn address(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, self.port))
    }

    pub fn listen_timeout(&self) -> Duration {
        Duration::from_millis(self.listen_timeout_ms)
    }

    pub fn recv_timeout(&self) -> Duration {
        Duration::from_millis(self.recv_timeout_ms)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Valida la configuración
    ///
    /// Los timeouts en cero no se pueden aplicar a un socket
    /// (`set_read_timeout(Some(0))` es un error del sistema).
    pub fn validate(&self) -> Result<(), String> {
        if self.backlog < 1 {
            return Err("Backlog must be >= 1".to_string());
        }
        if self.listen_timeout_ms == 0 {
            return Err("Listen timeout must be > 0".to_string());
        }
        if self.recv_timeout_ms == 0 {
            return Err("Receive timeout must be > 0".to_string());
        }
        if self.send_timeout_ms == 0 {
            return Err("Send timeout must be > 0".to_string());
        }
        if self.poll_interval_ms == 0 {
            return Err("Poll interval must be > 0".to_string());
        }
        if self.max_request_bytes == 0 {
            return Err("Max request size must be > 0".to_string());
        }

        Ok(())
    }

    /// Loguea un resumen de la configuración
    pub fn log_summary(&self) {
        info!(
            address = %self.address(),
            backlog = self.backlog,
            listen_timeout_ms = self.listen_timeout_ms,
            recv_timeout_ms = self.recv_timeout_ms,
            send_timeout_ms = self.send_timeout_ms,
            poll_interval_ms = self.poll_interval_ms,
            max_request_bytes = self.max_request_bytes,
            cors_policy = ?self.cors_policy,
            "Configuración del servidor"
        );
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            backlog: 10,
            listen_timeout_ms: 1_000,
            recv_timeout_ms: 5_000,
            send_timeout_ms: 5_000,
            poll_interval_ms: 10,
            max_request_bytes: 1024 * 1024,
            verbose: false,
            no_color: false,
            cors_policy: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Los tests que parsean la CLI leen variables de entorno del proceso
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.backlog, 10);
        assert_eq!(config.listen_timeout(), Duration::from_secs(1));
        assert_eq!(config.recv_timeout(), Duration::from_secs(5));
        assert_eq!(config.send_timeout(), Duration::from_secs(5));
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.max_request_bytes, 1_048_576);
        assert!(!config.verbose);
        assert!(config.cors_policy.is_none());
    }

    #[test]
    fn test_address_all_interfaces() {
        let config = Config::with_port(3000);
        assert_eq!(config.address(), "0.0.0.0:3000".parse().unwrap());
    }

    #[test]
    fn test_validate_success() {
        assert!(Config::default().validate().is_ok());
        assert!(Config::with_port(0).validate().is_ok());
    }

    // ==================== Validation ====================

    #[test]
    fn test_validate_invalid_backlog() {
        let mut config = Config::default();
        config.backlog = 0;
        assert!(config.validate().unwrap_err().contains("Backlog"));
    }

    #[test]
    fn test_validate_zero_timeouts() {
        let mut config = Config::default();
        config.recv_timeout_ms = 0;
        assert!(config.validate().unwrap_err().contains("Receive timeout"));

        let mut config = Config::default();
        config.send_timeout_ms = 0;
        assert!(config.validate().unwrap_err().contains("Send timeout"));

        let mut config = Config::default();
        config.listen_timeout_ms = 0;
        assert!(config.validate().unwrap_err().contains("Listen timeout"));

        let mut config = Config::default();
        config.poll_interval_ms = 0;
        assert!(config.validate().unwrap_err().contains("Poll interval"));

        let mut config = Config::default();
        config.max_request_bytes = 0;
        assert!(config.validate().unwrap_err().contains("Max request size"));
    }

    // ==================== CLI ====================

    #[test]
    fn test_parse_cli_args() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let config = Config::try_parse_from([
            "comet",
            "--port",
            "9000",
            "--recv-timeout",
            "250",
            "--cors-policy",
            "/etc/comet/cors.json",
            "-v",
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.recv_timeout_ms, 250);
        assert_eq!(config.cors_policy, Some(PathBuf::from("/etc/comet/cors.json")));
        assert!(config.verbose);
        assert_eq!(config.backlog, 10);
    }

    #[test]
    fn test_parse_cli_rejects_bad_port() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        assert!(Config::try_parse_from(["comet", "--port", "70000"]).is_err());
    }

    // ==================== Entorno ====================

    #[test]
    fn test_env_flags_accept_any_truthy_value() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        std::env::set_var("NO_COLOR", "1");
        std::env::set_var("COMET_VERBOSE", "1");
        let config = Config::try_parse_from(["comet"]);
        std::env::remove_var("NO_COLOR");
        std::env::remove_var("COMET_VERBOSE");

        let config = config.unwrap();
        assert!(config.no_color);
        assert!(config.verbose);
    }

    #[test]
    fn test_env_flags_falsey_values() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        std::env::set_var("NO_COLOR", "0");
        std::env::set_var("COMET_VERBOSE", "off");
        let config = Config::try_parse_from(["comet"]);
        std::env::remove_var("NO_COLOR");
        std::env::remove_var("COMET_VERBOSE");

        let config = config.unwrap();
        assert!(!config.no_color);
        assert!(!config.verbose);
    }
}

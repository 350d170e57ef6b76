//! # Servidor TCP Secuencial
//! src/server/tcp.rs
//!
//! Loop de despacho: acepta una conexión, la lee completa, la despacha,
//! responde, la cierra y recién entonces acepta la siguiente.
//!
//! ```text
//! Stopped → Running → [Accepting → Reading → Matching → Responding]* → Stopped
//! ```
//!
//! El accept no bloqueante solo sirve para poder revisar el flag de apagado
//! entre conexiones; no hay concurrencia. El estado de la aplicación se
//! presta `&mut` a un handler o middleware a la vez.

use super::shutdown::RunningFlag;
use super::socket::{Accepted, SocketContext};
use crate::config::Config;
use crate::cors::{CorsConfig, CorsConfigError};
use crate::error::{ConnectionError, RouteError, SetupError};
use crate::http::{self, Method, Request, Response};
use crate::router::{Handler, Middleware, RouteId, Router};
use std::net::SocketAddr;
use std::thread;
use tracing::{debug, error, info};

/// Tamaño de cada lectura del socket
///
/// Una lectura más corta que esto se toma como fin del mensaje. Un request
/// cuyo tamaño es múltiplo exacto de este valor espera una lectura más, que
/// termina en EOF o en el timeout de recepción.
pub const READ_CHUNK_SIZE: usize = 1024;

/// Servidor HTTP que atiende una conexión a la vez
pub struct Server<S = ()> {
    config: Config,
    socket: SocketContext,
    router: Router<S>,
    cors: CorsConfig,
    state: S,
    running: RunningFlag,
}

impl<S> Server<S> {
    /// Crea el servidor escuchando en `port` con la configuración por defecto
    ///
    /// # Ejemplo
    /// ```no_run
    /// use comet_http::server::Server;
    ///
    /// let server = Server::init(8080, ()).expect("no se pudo abrir el puerto");
    /// ```
    pub fn init(port: u16, state: S) -> Result<Self, SetupError> {
        Self::with_config(Config::with_port(port), state)
    }

    /// Crea el servidor a partir de una configuración completa
    pub fn with_config(config: Config, state: S) -> Result<Self, SetupError> {
        config.validate().map_err(|e| {
            error!(error = %e, "Invalid configuration");
            SetupError::InvalidConfig(e)
        })?;

        let socket = SocketContext::initialize(&config)?;
        info!("Router has been initialized");

        Ok(Self {
            config,
            socket,
            router: Router::new(),
            cors: CorsConfig::default(),
            state,
            running: RunningFlag::new(),
        })
    }

    // === Registro ===

    /// Registra una ruta (ver [`Router::add_route`])
    pub fn add_route(
        &mut self,
        pattern: &str,
        method: Method,
        handler: Handler<S>,
    ) -> Result<RouteId, RouteError> {
        self.router.add_route(pattern, method, handler)
    }

    /// Agrega un middleware a una ruta ya registrada
    pub fn add_middleware(
        &mut self,
        route: RouteId,
        middleware: Middleware<S>,
    ) -> Result<(), RouteError> {
        self.router.add_middleware(route, middleware)
    }

    /// Reemplaza la política CORS completa
    ///
    /// Quien llama es responsable de llenar todos los campos; no hay merge con
    /// la política anterior. Si la nueva política es inválida se conserva la
    /// anterior.
    pub fn set_cors_policy(&mut self, config: CorsConfig) -> Result<(), CorsConfigError> {
        config.validate()?;
        self.cors = config;
        Ok(())
    }

    pub fn cors_policy(&self) -> &CorsConfig {
        &self.cors
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn router(&self) -> &Router<S> {
        &self.router
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Handle para detener el loop desde otro thread
    pub fn running_flag(&self) -> RunningFlag {
        self.running.clone()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.socket.local_addr()
    }

    // === Ciclo de vida ===

    /// Corre el loop hasta que alguien baje el flag
    ///
    /// Bloquea el thread actual. Al salir cierra el socket de escucha, libera
    /// la tabla de rutas y devuelve el estado de la aplicación.
    ///
    /// Si el flag ya se bajó antes de llamar a `start`, no se acepta ninguna
    /// conexión y se pasa directo al teardown.
    pub fn start(mut self) -> S {
        if self.running.start() {
            info!(addr = %self.local_addr(), routes = self.router.len(), "Server started");
        } else {
            info!("Shutdown requested before start");
        }

        while self.running.is_running() {
            match self.socket.accept_next() {
                Accepted::WouldBlock => {
                    thread::sleep(self.config.poll_interval());
                }
                Accepted::Connection(peer) => {
                    if let Err(e) = self.serve_connection() {
                        error!(%peer, error = %e, "Connection abandoned");
                    }
                    self.socket.close_current();
                }
            }
        }

        self.teardown()
    }

    /// Lee, despacha y responde la conexión actual
    fn serve_connection(&mut self) -> Result<(), ConnectionError> {
        let raw = self.read_request()?;
        let request = http::parse_request(&raw)?;

        let method = request.method();
        let path = request.path().to_string();

        let response = self.handle_request(request);
        debug!(%method, path = %path, status = response.status().as_u16(), "Request served");

        let bytes = http::serialize_response(&response)?;
        self.socket.send(&bytes).map_err(ConnectionError::Send)?;

        Ok(())
    }

    /// Lee en bloques hasta que una lectura devuelve menos de un bloque
    ///
    /// Pasado `max_request_bytes` la conexión se abandona sin respuesta.
    fn read_request(&mut self) -> Result<Vec<u8>, ConnectionError> {
        let limit = self.config.max_request_bytes;
        let mut request = Vec::with_capacity(READ_CHUNK_SIZE);
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            let bytes_read = self.socket.receive(&mut chunk).map_err(ConnectionError::Read)?;
            if request.len() + bytes_read > limit {
                return Err(ConnectionError::RequestTooLarge { limit });
            }
            request.extend_from_slice(&chunk[..bytes_read]);

            if bytes_read < READ_CHUNK_SIZE {
                break;
            }
        }

        Ok(request)
    }

    /// Despacha un request ya parseado y aplica la política CORS
    ///
    /// Es lo que hace el loop por cada conexión, sin el socket.
    pub fn handle_request(&mut self, request: Request) -> Response {
        let mut response = self.router.route(&mut self.state, request);
        self.cors.apply(&mut response);
        response
    }

    /// Libera todo; solo se llama desde la salida de `start`
    fn teardown(mut self) -> S {
        self.socket.teardown();

        let Server { router, state, .. } = self;
        drop(router);

        info!("Router has been deinitialized");
        state
    }
}

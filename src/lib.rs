//! # Comet HTTP
//! src/lib.rs
//!
//! Servidor HTTP/1.0 mínimo y embebible: un socket, una conexión a la vez,
//! una tabla de rutas con parámetros de path y middleware por ruta, y una
//! política CORS que se aplica a todas las respuestas.
//!
//! ## Arquitectura
//!
//! - `http`: parsing de requests y serialización de responses
//! - `router`: matching de patrones, middleware y despacho
//! - `cors`: política CORS por servidor
//! - `server`: socket de escucha, loop de despacho y apagado cooperativo
//! - `config`: configuración por CLI y variables de entorno
//! - `logging`: subscriber de `tracing` para el binario
//! - `error`: errores de setup, conexión y registro
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use comet_http::http::{Method, Request, Response, StatusCode};
//! use comet_http::router::UrlParams;
//! use comet_http::server::Server;
//!
//! fn hello(_: &mut (), _: &Request, params: &UrlParams) -> Option<Response> {
//!     let name = params.get("name").unwrap_or("world");
//!     Some(Response::text(StatusCode::Ok, &format!("Hello, {}!", name)))
//! }
//!
//! let mut server = Server::init(8080, ()).expect("Error al iniciar servidor");
//! server.add_route("/hello/{name}", Method::GET, hello).unwrap();
//! server.start();
//! ```

pub mod config;
pub mod cors;
pub mod error;
pub mod http;
pub mod logging;
pub mod router;
pub mod server;

pub use cors::CorsConfig;
pub use error::{ConnectionError, RouteError, SetupError};
pub use router::{Handler, Middleware, RouteId, UrlParams};
pub use server::{RunningFlag, Server};

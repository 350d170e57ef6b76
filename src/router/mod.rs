//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Tabla de rutas: mapea patrones + métodos a handlers con su cadena de
//! middlewares.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → (match_path) → Middlewares → Handler → Response
//! ```
//!
//! Las rutas se prueban en orden de registro y nunca se reordenan:
//!
//! - El primer patrón que coincide con el método correcto gana.
//! - Si el patrón coincide pero el método no, se recuerda un posible 405 y
//!   se sigue buscando.
//! - Un `OPTIONS` contra cualquier patrón que coincida responde 200 sin
//!   llamar al handler (preflight de CORS).
//! - Sin ninguna coincidencia de patrón: 404.

pub mod matcher;
pub mod middleware;

pub use matcher::{match_path, UrlParam, UrlParams, WILDCARD_KEY};
pub use middleware::{Middleware, Pipeline};

use crate::error::RouteError;
use crate::http::{Method, Request, Response, StatusCode};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Tipo de función handler
///
/// Recibe el estado de la aplicación, el request (ya pasado por los
/// middlewares) y los parámetros del path. `None` se convierte en un 500.
pub type Handler<S> = fn(&mut S, &Request, &UrlParams) -> Option<Response>;

/// Índice de una ruta en la tabla (orden de registro)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteId(pub usize);

impl From<RouteId> for usize {
    fn from(id: RouteId) -> Self {
        id.0
    }
}

/// Una ruta registrada
pub struct Route<S> {
    pattern: String,
    method: Method,
    handler: Handler<S>,
    pipeline: Pipeline<S>,
}

impl<S> Route<S> {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn middleware_count(&self) -> usize {
        self.pipeline.len()
    }
}

/// Resultado de despachar un request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Una ruta coincidió en patrón y método; `None` si el handler no respondió
    Handled { route: RouteId, response: Option<Response> },
    /// `OPTIONS` contra un patrón conocido
    Preflight,
    /// Algún patrón coincidió, ningún método
    MethodNotAllowed,
    NotFound,
}

impl Outcome {
    /// Convierte el resultado en la respuesta a enviar, sintetizando los
    /// fallbacks (200 vacío, 404, 405, 500)
    pub fn into_response(self) -> Response {
        match self {
            Outcome::Handled { response: Some(response), .. } => response,
            Outcome::Handled { response: None, .. } => {
                Response::text(StatusCode::InternalServerError, "500 Internal Server Error")
            }
            Outcome::Preflight => Response::new(StatusCode::Ok),
            Outcome::MethodNotAllowed => {
                Response::text(StatusCode::MethodNotAllowed, "405 Method Not Allowed")
            }
            Outcome::NotFound => Response::text(StatusCode::NotFound, "404 Not Found"),
        }
    }
}

/// Router que mapea patrones a handlers
pub struct Router<S> {
    routes: Vec<Route<S>>,
}

impl<S> Router<S> {
    /// Crea un nuevo router vacío
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registra una ruta con su handler
    ///
    /// # Ejemplo
    /// ```
    /// use comet_http::router::{Router, UrlParams};
    /// use comet_http::http::{Method, Request, Response};
    ///
    /// fn hello(_: &mut (), _: &Request, params: &UrlParams) -> Option<Response> {
    ///     Some(Response::json(&format!(r#"{{"hello": "{}"}}"#, params.get("name")?)))
    /// }
    ///
    /// let mut router = Router::new();
    /// let id = router.add_route("/hello/{name}", Method::GET, hello).unwrap();
    /// assert_eq!(id.0, 0);
    /// ```
    pub fn add_route(
        &mut self,
        pattern: &str,
        method: Method,
        handler: Handler<S>,
    ) -> Result<RouteId, RouteError> {
        validate_pattern(pattern)?;

        self.routes.push(Route {
            pattern: pattern.to_string(),
            method,
            handler,
            pipeline: Pipeline::new(),
        });

        let id = RouteId(self.routes.len() - 1);
        debug!(route = id.0, %method, pattern, "Ruta registrada");
        Ok(id)
    }

    /// Agrega un middleware al final de la cadena de una ruta
    pub fn add_middleware(
        &mut self,
        route: RouteId,
        middleware: Middleware<S>,
    ) -> Result<(), RouteError> {
        match self.routes.get_mut(route.0) {
            Some(entry) => {
                entry.pipeline.push(middleware);
                Ok(())
            }
            None => {
                warn!(route = route.0, "Invalid route index");
                Err(RouteError::UnknownRoute(route.0))
            }
        }
    }

    /// Busca la ruta que corresponde al request y la ejecuta
    pub fn dispatch(&self, state: &mut S, request: Request) -> Outcome {
        let mut method_not_allowed = false;

        for (index, route) in self.routes.iter().enumerate() {
            // Los parámetros de un intento fallido mueren aquí mismo
            let Some(params) = match_path(&route.pattern, request.path()) else {
                continue;
            };

            if request.method() == Method::OPTIONS {
                return Outcome::Preflight;
            }

            if route.method != request.method() {
                method_not_allowed = true;
                continue;
            }

            let request = route.pipeline.run(state, request, &params);
            let response = (route.handler)(state, &request, &params);
            return Outcome::Handled {
                route: RouteId(index),
                response,
            };
        }

        if method_not_allowed {
            Outcome::MethodNotAllowed
        } else {
            Outcome::NotFound
        }
    }

    /// Despacha y sintetiza la respuesta final (sin CORS)
    pub fn route(&self, state: &mut S, request: Request) -> Response {
        self.dispatch(state, request).into_response()
    }

    pub fn routes(&self) -> &[Route<S>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<S> Default for Router<S> {
    fn default() -> Self {
        Self::new()
    }
}

fn capture_name_regex() -> &'static Regex {
    static CAPTURE: OnceLock<Regex> = OnceLock::new();
    CAPTURE.get_or_init(|| {
        Regex::new(r"^\{[A-Za-z_][A-Za-z0-9_]*\}$").expect("capture name regex is valid")
    })
}

/// Rechaza solo patrones inservibles; un `*` que no es el último segmento se
/// acepta (simplemente nunca consumirá más de un segmento)
fn validate_pattern(pattern: &str) -> Result<(), RouteError> {
    if !pattern.starts_with('/') {
        return Err(RouteError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: "pattern must start with '/'",
        });
    }

    for token in matcher::tokenize(pattern) {
        if token.starts_with('{') && !capture_name_regex().is_match(token) {
            return Err(RouteError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "capture segments must look like {name}",
            });
        }
    }

    Ok(())
}

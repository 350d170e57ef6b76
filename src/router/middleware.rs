//! # Pipeline de Middlewares
//! src/router/middleware.rs
//!
//! Cada ruta tiene su propia cadena de middlewares. Un middleware transforma
//! el request (y puede leer o modificar el estado de la aplicación) antes de
//! que llegue al handler.
//!
//! Contrato:
//!
//! - Se ejecutan en orden de registro, una vez conocidos los parámetros de la
//!   ruta (los middlewares ven los mismos `UrlParams` que el handler).
//! - No hay forma de cortar la cadena ni de responder desde un middleware:
//!   todos corren siempre antes del handler. Quien necesite rechazar un
//!   request debe hacerlo en el handler.

use super::UrlParams;
use crate::http::Request;

/// Firma de un middleware
pub type Middleware<S> = fn(&mut S, Request, &UrlParams) -> Request;

/// Cadena ordenada de middlewares de una ruta
pub struct Pipeline<S> {
    chain: Vec<Middleware<S>>,
}

impl<S> Pipeline<S> {
    pub fn new() -> Self {
        Self { chain: Vec::new() }
    }

    /// Agrega un middleware al final de la cadena
    pub fn push(&mut self, middleware: Middleware<S>) {
        self.chain.push(middleware);
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Pasa el request por toda la cadena
    pub fn run(&self, state: &mut S, request: Request, params: &UrlParams) -> Request {
        self.chain
            .iter()
            .fold(request, |request, middleware| middleware(state, request, params))
    }
}

impl<S> Default for Pipeline<S> {
    fn default() -> Self {
        Self::new()
    }
}

//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! API para construir respuestas de forma programática y convertirlas a
//! bytes con [`Response::serialize`] para enviarlas al cliente.
//!
//! ## Formato de una respuesta
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 13\r\n
//! \r\n
//! Hello, world!
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use comet_http::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "application/json")
//!     .with_body(r#"{"message": "Hello"}"#);
//!
//! let bytes = response.serialize().unwrap();
//! assert!(bytes.starts_with(b"HTTP/1.0 200 OK\r\n"));
//! ```

use super::StatusCode;
use std::collections::HashMap;
use thiserror::Error;

/// Errores al serializar una respuesta
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    /// Nombre de header vacío, o nombre/valor con CR o LF
    #[error("Invalid header for serialization: {0:?}")]
    InvalidHeader(String),
}

/// Representa una respuesta HTTP completa
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Código de estado HTTP (200, 404, etc.)
    status: StatusCode,

    /// Headers HTTP. Usamos HashMap para evitar duplicados
    headers: HashMap<String, String>,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

impl Response {
    /// Crea una nueva respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Agrega un header a la respuesta. Si ya existe, se sobrescribe.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Versión mutable de [`Response::with_header`]
    ///
    /// Los nombres de header no distinguen mayúsculas: un header previo con
    /// el mismo nombre en otra capitalización se reemplaza.
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Establece el cuerpo desde un string y agrega `Content-Length`
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece el cuerpo desde bytes y agrega `Content-Length`
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        let length = body.len().to_string();
        self.body = body;
        self.add_header("Content-Length", &length);
        self
    }

    /// Respuesta JSON exitosa (200 OK)
    pub fn json(body: &str) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Content-Type", "application/json")
            .with_body(body)
    }

    /// Respuesta `text/plain` con el status indicado
    ///
    /// Es el formato de las respuestas que sintetiza el dispatcher
    /// (`404 Not Found`, `405 Method Not Allowed`, ...).
    pub fn text(status: StatusCode, body: &str) -> Self {
        Self::new(status)
            .with_header("Content-Type", "text/plain")
            .with_body(body)
    }

    /// Respuesta de error con cuerpo `{"error": "mensaje"}`
    ///
    /// # Ejemplo
    /// ```
    /// use comet_http::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::BadRequest, "falta \"name\"");
    /// assert_eq!(response.body(), br#"{"error":"falta \"name\""}"#);
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(&body)
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// - Status line: `HTTP/1.0 200 OK\r\n`
    /// - Headers: `Header-Name: Value\r\n`
    /// - Línea vacía: `\r\n`
    /// - Body
    ///
    /// Falla si algún header no puede escribirse sin romper el framing.
    pub fn serialize(&self) -> Result<Vec<u8>, SerializeError> {
        let mut result = Vec::with_capacity(128 + self.body.len());

        result.extend_from_slice(format!("HTTP/1.0 {}\r\n", self.status).as_bytes());

        for (name, value) in &self.headers {
            if name.is_empty() || has_line_break(name) || has_line_break(value) {
                return Err(SerializeError::InvalidHeader(name.clone()));
            }
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        Ok(result)
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene una referencia a los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico (sin distinguir mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

fn has_line_break(s: &str) -> bool {
    s.contains('\r') || s.contains('\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_response() {
        let response = Response::new(StatusCode::Ok);
        assert_eq!(response.status(), StatusCode::Ok);
        assert!(response.headers().is_empty());
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_with_header_overwrites() {
        let response = Response::new(StatusCode::Ok)
            .with_header("X-Custom", "one")
            .with_header("X-Custom", "two");

        assert_eq!(response.header("X-Custom"), Some("two"));
        assert_eq!(response.headers().len(), 1);
    }

    #[test]
    fn test_header_names_ignore_case() {
        let response = Response::new(StatusCode::Ok)
            .with_header("content-type", "text/html")
            .with_header("Content-Type", "text/plain");

        assert_eq!(response.headers().len(), 1);
        assert_eq!(response.header("CONTENT-TYPE"), Some("text/plain"));

        let text = String::from_utf8(response.serialize().unwrap()).unwrap();
        assert_eq!(text.to_ascii_lowercase().matches("content-type").count(), 1);
    }

    #[test]
    fn test_with_body_sets_length() {
        let response = Response::new(StatusCode::Ok).with_body("Hello World");

        assert_eq!(response.body(), b"Hello World");
        assert_eq!(response.header("Content-Length"), Some("11"));
    }

    #[test]
    fn test_text_response() {
        let response = Response::text(StatusCode::NotFound, "404 Not Found");

        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(response.header("Content-Type"), Some("text/plain"));
        assert_eq!(response.body(), b"404 Not Found");
    }

    #[test]
    fn test_error_response_escapes_json() {
        let response = Response::error(StatusCode::BadRequest, "bad \"input\"");

        assert_eq!(response.status(), StatusCode::BadRequest);
        assert_eq!(response.header("Content-Type"), Some("application/json"));

        let value: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(value["error"], "bad \"input\"");
    }

    #[test]
    fn test_serialize() {
        let response = Response::new(StatusCode::Ok)
            .with_header("Content-Type", "text/plain")
            .with_body("Test");

        let text = String::from_utf8(response.serialize().unwrap()).unwrap();

        assert!(text.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.contains("Content-Length: 4\r\n"));
        assert!(text.ends_with("\r\n\r\nTest"));
    }

    #[test]
    fn test_serialize_empty_body() {
        let text = String::from_utf8(Response::new(StatusCode::NoContent).serialize().unwrap()).unwrap();
        assert_eq!(text, "HTTP/1.0 204 No Content\r\n\r\n");
    }

    #[test]
    fn test_serialize_rejects_header_injection() {
        let response = Response::new(StatusCode::Ok).with_header("X-Evil", "a\r\nSet-Cookie: x=1");
        assert_eq!(
            response.serialize(),
            Err(SerializeError::InvalidHeader("X-Evil".to_string()))
        );

        let response = Response::new(StatusCode::Ok).with_header("", "value");
        assert!(response.serialize().is_err());
    }
}

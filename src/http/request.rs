//! # Parsing de Requests HTTP
//! src/http/request.rs
//!
//! Parser de requests HTTP/1.0 (acepta también la request line de HTTP/1.1).
//! Recibe el buffer crudo que acumuló el loop de lectura y produce un
//! [`Request`] estructurado.
//!
//! ## Formato de un Request
//!
//! ```text
//! POST /echo?debug=1 HTTP/1.0\r\n
//! Host: localhost:8080\r\n
//! Content-Type: text/plain\r\n
//! \r\n
//! cuerpo...
//! ```
//!
//! 1. **Request Line**: `METHOD /path?query VERSION`
//! 2. **Headers**: Pares `Name: Value` (uno por línea)
//! 3. **Empty Line**: `\r\n` que separa headers del body
//! 4. **Body**: todo lo que sigue, sin importar el método

use std::collections::HashMap;
use thiserror::Error;

/// Métodos HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    PATCH,
    /// OPTIONS - usado por los navegadores para el preflight de CORS
    OPTIONS,
}

impl Method {
    /// Parsea un método HTTP desde un string
    ///
    /// # Errores
    ///
    /// Retorna error si el método no es soportado
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            "PATCH" => Ok(Method::PATCH),
            "OPTIONS" => Ok(Method::OPTIONS),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::PATCH => "PATCH",
            Method::OPTIONS => "OPTIONS",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Representa un request HTTP parseado
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Método HTTP
    method: Method,

    /// Path de la petición sin query string (ej: "/hello/alice")
    path: String,

    /// Query parameters parseados (ej: {"num": "10"})
    query_params: HashMap<String, String>,

    /// Headers HTTP (ej: {"Host": "localhost:8080"})
    headers: HashMap<String, String>,

    /// Versión HTTP ("HTTP/1.0" o "HTTP/1.1")
    version: String,

    /// Body del request (puede ser vacío)
    body: Vec<u8>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Request truncado: falta la línea vacía que cierra los headers
    #[error("Incomplete HTTP request")]
    IncompleteRequest,

    /// Formato inválido de la request line
    #[error("Invalid request line format")]
    InvalidRequestLine,

    /// Método HTTP no soportado
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Versión HTTP no soportada
    #[error("Invalid HTTP version: {0}")]
    InvalidHttpVersion(String),

    /// Header malformado
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Request vacío
    #[error("Empty request")]
    EmptyRequest,
}

impl Request {
    /// Crea un request sin headers ni body
    ///
    /// Útil para despachar requests construidos en código (tests, embebido).
    /// Si `target` trae query string se separa igual que en [`Request::parse`].
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query_params) = Self::parse_path_and_query(target);
        Self {
            method,
            path,
            query_params,
            headers: HashMap::new(),
            version: "HTTP/1.0".to_string(),
            body: Vec::new(),
        }
    }

    /// Parsea un request HTTP desde bytes
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use comet_http::http::{Method, Request};
    ///
    /// let raw = b"GET /hello/alice?lang=es HTTP/1.0\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.method(), Method::GET);
    /// assert_eq!(request.path(), "/hello/alice");
    /// assert_eq!(request.query_param("lang"), Some("es"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        if buffer.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ParseError::EmptyRequest);
        }

        // Separar la cabecera del body en el primer \r\n\r\n
        let (head, body) = match find_subslice(buffer, b"\r\n\r\n") {
            Some(pos) => (&buffer[..pos], &buffer[pos + 4..]),
            None => return Err(ParseError::IncompleteRequest),
        };

        let head = std::str::from_utf8(head).map_err(|_| ParseError::InvalidRequestLine)?;
        let mut lines = head.split("\r\n");

        // 1. Request line
        let request_line = lines.next().ok_or(ParseError::IncompleteRequest)?;
        let (method, path, query_params, version) = Self::parse_request_line(request_line)?;

        // 2. Headers
        let headers = Self::parse_headers(lines)?;

        Ok(Request {
            method,
            path,
            query_params,
            headers,
            version,
            body: body.to_vec(),
        })
    }

    /// Parsea la request line: `GET /path?query HTTP/1.0`
    fn parse_request_line(
        line: &str,
    ) -> Result<(Method, String, HashMap<String, String>, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        // Debe tener exactamente 3 partes: METHOD TARGET VERSION
        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        let method = Method::parse(parts[0])?;

        if !parts[1].starts_with('/') {
            return Err(ParseError::InvalidRequestLine);
        }
        let (path, query_params) = Self::parse_path_and_query(parts[1]);

        let version = parts[2].to_string();
        if version != "HTTP/1.0" && version != "HTTP/1.1" {
            return Err(ParseError::InvalidHttpVersion(version));
        }

        Ok((method, path, query_params, version))
    }

    /// Separa el path de la query string
    ///
    /// Ejemplo: "/fibonacci?num=10&fast=true"
    /// Retorna: ("/fibonacci", {"num": "10", "fast": "true"})
    fn parse_path_and_query(target: &str) -> (String, HashMap<String, String>) {
        match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Self::parse_query_string(query)),
            None => (target.to_string(), HashMap::new()),
        }
    }

    /// Parsea una query string en un HashMap
    fn parse_query_string(query: &str) -> HashMap<String, String> {
        let mut params = HashMap::new();

        for param in query.split('&').filter(|p| !p.is_empty()) {
            match param.split_once('=') {
                Some((key, value)) => {
                    params.insert(key.to_string(), Self::url_decode(value));
                }
                // Parámetro sin valor (ej: "?debug")
                None => {
                    params.insert(param.to_string(), String::new());
                }
            }
        }

        params
    }

    /// Decodificación básica: solo `%20` y `+` pasan a espacio
    fn url_decode(s: &str) -> String {
        s.replace("%20", " ").replace('+', " ")
    }

    /// Parsea los headers HTTP (`Name: Value`)
    fn parse_headers<'a>(
        lines: impl Iterator<Item = &'a str>,
    ) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();

        for line in lines {
            if line.trim().is_empty() {
                break;
            }

            match line.split_once(':') {
                Some((name, value)) if !name.trim().is_empty() => {
                    headers.insert(name.trim().to_string(), value.trim().to_string());
                }
                _ => return Err(ParseError::InvalidHeader(line.to_string())),
            }
        }

        Ok(headers)
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> Method {
        self.method
    }

    /// Obtiene el path del request (sin query string)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Obtiene todos los query parameters
    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    /// Obtiene un query parameter específico
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(|s| s.as_str())
    }

    /// Obtiene todos los headers
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

    /// Obtiene la versión HTTP
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Obtiene el body del request
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Obtiene el body del request como String
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    // === Mutadores (los usan los middlewares) ===

    /// Inserta o reemplaza un header
    pub fn insert_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Versión encadenable de [`Request::insert_header`]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.insert_header(name, value);
        self
    }

    /// Reemplaza el body
    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let raw = b"GET / HTTP/1.0\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.path(), "/");
        assert!(request.query_params().is_empty());
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_parse_with_query_params() {
        let raw = b"GET /test?num=42&text=hello+world&debug HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.path(), "/test");
        assert_eq!(request.query_param("num"), Some("42"));
        assert_eq!(request.query_param("text"), Some("hello world"));
        assert_eq!(request.query_param("debug"), Some(""));
        assert_eq!(request.version(), "HTTP/1.1");
    }

    #[test]
    fn test_parse_with_headers() {
        let raw = b"GET / HTTP/1.0\r\nHost: localhost:8080\r\nUser-Agent: test\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.header("Host"), Some("localhost:8080"));
        assert_eq!(request.header("user-agent"), Some("test"));
        assert_eq!(request.header("Missing"), None);
    }

    #[test]
    fn test_parse_body_any_method() {
        let raw = b"PUT /items/1 HTTP/1.0\r\nContent-Length: 9\r\n\r\n{\"a\":\r\n1}";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.method(), Method::PUT);
        assert_eq!(request.body(), b"{\"a\":\r\n1}");
    }

    #[test]
    fn test_parse_all_methods() {
        for name in ["GET", "HEAD", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"] {
            let raw = format!("{} / HTTP/1.0\r\n\r\n", name);
            let request = Request::parse(raw.as_bytes()).unwrap();
            assert_eq!(request.method().as_str(), name);
        }
    }

    #[test]
    fn test_unsupported_method() {
        let result = Request::parse(b"BREW /pot HTTP/1.0\r\n\r\n");
        assert!(matches!(result, Err(ParseError::UnsupportedMethod(m)) if m == "BREW"));
    }

    #[test]
    fn test_invalid_version() {
        let result = Request::parse(b"GET / HTTP/2.0\r\n\r\n");
        assert!(matches!(result, Err(ParseError::InvalidHttpVersion(_))));
    }

    #[test]
    fn test_empty_request() {
        assert_eq!(Request::parse(b""), Err(ParseError::EmptyRequest));
        assert_eq!(Request::parse(b"\r\n"), Err(ParseError::EmptyRequest));
    }

    #[test]
    fn test_incomplete_request() {
        let result = Request::parse(b"GET / HTTP/1.0\r\nHost: x\r\n");
        assert_eq!(result, Err(ParseError::IncompleteRequest));
    }

    #[test]
    fn test_invalid_request_line() {
        assert_eq!(
            Request::parse(b"GET\r\n\r\n"),
            Err(ParseError::InvalidRequestLine)
        );
        assert_eq!(
            Request::parse(b"GET hello HTTP/1.0\r\n\r\n"),
            Err(ParseError::InvalidRequestLine)
        );
    }

    #[test]
    fn test_invalid_header() {
        let result = Request::parse(b"GET / HTTP/1.0\r\nNoColon\r\n\r\n");
        assert!(matches!(result, Err(ParseError::InvalidHeader(_))));
    }

    #[test]
    fn test_binary_garbage() {
        assert!(Request::parse(b"\x00\x01\x02\x03garbage").is_err());
    }

    #[test]
    fn test_new_and_mutators() {
        let mut request = Request::new(Method::POST, "/echo?x=1").with_header("X-Trace", "abc");
        request.set_body(b"hola".to_vec());

        assert_eq!(request.path(), "/echo");
        assert_eq!(request.query_param("x"), Some("1"));
        assert_eq!(request.header("x-trace"), Some("abc"));
        assert_eq!(request.body_string().as_deref(), Some("hola"));
    }
}

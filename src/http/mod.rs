//! # Módulo HTTP
//! src/http/mod.rs
//!
//! Codec HTTP que usa el núcleo del servidor. El dispatcher solo depende de
//! dos funciones:
//!
//! - [`parse_request`]: bytes crudos acumulados → [`Request`] o [`ParseError`]
//! - [`serialize_response`]: [`Response`] → bytes o [`SerializeError`]
//!
//! ### Formato de Request
//!
//! ```text
//! GET /path?query=value HTTP/1.0\r\n
//! Header-Name: Header-Value\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 13\r\n
//! \r\n
//! Hello, world!
//! ```

pub mod request;
pub mod response;
pub mod status;

pub use request::{Method, ParseError, Request};
pub use response::{Response, SerializeError};
pub use status::StatusCode;

/// Parsea el buffer acumulado de una conexión
pub fn parse_request(bytes: &[u8]) -> Result<Request, ParseError> {
    Request::parse(bytes)
}

/// Serializa una respuesta para escribirla en el socket
pub fn serialize_response(response: &Response) -> Result<Vec<u8>, SerializeError> {
    response.serialize()
}

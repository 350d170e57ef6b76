//! # Política CORS
//! src/cors.rs
//!
//! Configuración CORS única por servidor. Se aplica una vez a cada respuesta
//! que emite el loop, después del handler o del fallback, incluidos los
//! 404, 405 y 500 sintetizados:
//!
//! | Campo               | Header                              | Cuándo            |
//! |---------------------|-------------------------------------|-------------------|
//! | `allowed_origins`   | `Access-Control-Allow-Origin`       | si no está vacío  |
//! | `allowed_methods`   | `Access-Control-Allow-Methods`      | si no está vacío  |
//! | `allowed_headers`   | `Access-Control-Allow-Headers`      | si no está vacío  |
//! | `exposed_headers`   | `Access-Control-Expose-Headers`     | si no está vacío  |
//! | `allow_credentials` | `Access-Control-Allow-Credentials`  | siempre           |
//! | `max_age`           | `Access-Control-Max-Age`            | siempre           |

use crate::http::Response;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
pub const ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
pub const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
pub const EXPOSE_HEADERS: &str = "Access-Control-Expose-Headers";
pub const ALLOW_CREDENTIALS: &str = "Access-Control-Allow-Credentials";
pub const MAX_AGE: &str = "Access-Control-Max-Age";

/// Errores al fijar o cargar una política
#[derive(Debug, Error)]
pub enum CorsConfigError {
    /// El valor no se puede escribir como header (contiene CR o LF)
    #[error("invalid value for {field}: header values cannot contain line breaks")]
    InvalidHeaderValue { field: &'static str },

    #[error("failed to read CORS policy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse CORS policy file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Política CORS del servidor
///
/// Los campos de texto se copian tal cual en los headers (listas separadas
/// por comas, como en HTTP).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: String,
    pub allowed_methods: String,
    pub allowed_headers: String,
    pub exposed_headers: String,
    pub allow_credentials: bool,
    /// Segundos que el navegador puede cachear el preflight
    pub max_age: u32,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: "*".to_string(),
            allowed_methods: "GET, POST, PUT, DELETE, OPTIONS".to_string(),
            allowed_headers: "Content-Type, Authorization".to_string(),
            exposed_headers: String::new(),
            allow_credentials: false,
            max_age: 600,
        }
    }
}

impl CorsConfig {
    /// Carga una política desde un archivo JSON
    ///
    /// Los campos ausentes toman el valor por defecto:
    ///
    /// ```json
    /// { "allowed_origins": "https://app.example.com", "allow_credentials": true }
    /// ```
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CorsConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: CorsConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Verifica que todos los campos sean valores de header válidos
    pub fn validate(&self) -> Result<(), CorsConfigError> {
        let fields = [
            ("allowed_origins", &self.allowed_origins),
            ("allowed_methods", &self.allowed_methods),
            ("allowed_headers", &self.allowed_headers),
            ("exposed_headers", &self.exposed_headers),
        ];

        for (field, value) in fields {
            if value.contains('\r') || value.contains('\n') {
                return Err(CorsConfigError::InvalidHeaderValue { field });
            }
        }

        Ok(())
    }

    /// Inyecta los headers CORS en la respuesta
    pub fn apply(&self, response: &mut Response) {
        let optional = [
            (ALLOW_ORIGIN, &self.allowed_origins),
            (ALLOW_METHODS, &self.allowed_methods),
            (ALLOW_HEADERS, &self.allowed_headers),
            (EXPOSE_HEADERS, &self.exposed_headers),
        ];

        for (header, value) in optional {
            if !value.is_empty() {
                response.add_header(header, value);
            }
        }

        response.add_header(
            ALLOW_CREDENTIALS,
            if self.allow_credentials { "true" } else { "false" },
        );
        response.add_header(MAX_AGE, &self.max_age.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CorsConfig::default();
        assert_eq!(config.allowed_origins, "*");
        assert_eq!(config.allowed_methods, "GET, POST, PUT, DELETE, OPTIONS");
        assert_eq!(config.allowed_headers, "Content-Type, Authorization");
        assert_eq!(config.exposed_headers, "");
        assert!(!config.allow_credentials);
        assert_eq!(config.max_age, 600);
    }

    #[test]
    fn test_apply_defaults() {
        let mut response = Response::new(StatusCode::Ok);
        CorsConfig::default().apply(&mut response);

        assert_eq!(response.header(ALLOW_ORIGIN), Some("*"));
        assert_eq!(response.header(ALLOW_METHODS), Some("GET, POST, PUT, DELETE, OPTIONS"));
        assert_eq!(response.header(ALLOW_HEADERS), Some("Content-Type, Authorization"));
        assert_eq!(response.header(EXPOSE_HEADERS), None);
        assert_eq!(response.header(ALLOW_CREDENTIALS), Some("false"));
        assert_eq!(response.header(MAX_AGE), Some("600"));
    }

    #[test]
    fn test_apply_skips_empty_fields_but_not_credentials_or_max_age() {
        let config = CorsConfig {
            allowed_origins: String::new(),
            allowed_methods: String::new(),
            allowed_headers: String::new(),
            exposed_headers: String::new(),
            allow_credentials: true,
            max_age: 0,
        };

        let mut response = Response::new(StatusCode::NotFound);
        config.apply(&mut response);

        assert_eq!(response.headers().len(), 2);
        assert_eq!(response.header(ALLOW_CREDENTIALS), Some("true"));
        assert_eq!(response.header(MAX_AGE), Some("0"));
    }

    #[test]
    fn test_apply_exposed_headers() {
        let config = CorsConfig {
            exposed_headers: "X-Total-Count".to_string(),
            ..CorsConfig::default()
        };

        let mut response = Response::new(StatusCode::Ok);
        config.apply(&mut response);
        assert_eq!(response.header(EXPOSE_HEADERS), Some("X-Total-Count"));
    }

    #[test]
    fn test_apply_replaces_handler_header_in_other_case() {
        let mut response = Response::new(StatusCode::Ok)
            .with_header("access-control-allow-origin", "https://other.example.com")
            .with_header("access-control-max-age", "5");
        CorsConfig::default().apply(&mut response);

        let origins: Vec<&str> = response
            .headers()
            .keys()
            .map(|name| name.as_str())
            .filter(|name| name.eq_ignore_ascii_case(ALLOW_ORIGIN))
            .collect();
        assert_eq!(origins, vec![ALLOW_ORIGIN]);
        assert_eq!(response.header(ALLOW_ORIGIN), Some("*"));
        assert_eq!(response.header(MAX_AGE), Some("600"));

        let text = String::from_utf8(response.serialize().unwrap()).unwrap();
        assert_eq!(text.to_ascii_lowercase().matches("access-control-max-age").count(), 1);
    }

    #[test]
    fn test_validate_rejects_line_breaks() {
        let config = CorsConfig {
            allowed_headers: "Content-Type\r\nX-Evil: 1".to_string(),
            ..CorsConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CorsConfigError::InvalidHeaderValue { field: "allowed_headers" })
        ));
        assert!(CorsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_file_partial() {
        let path = std::env::temp_dir().join(format!("comet-cors-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{"allowed_origins": "https://app.example.com", "allow_credentials": true}"#)
            .unwrap();
        drop(file);

        let config = CorsConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.allowed_origins, "https://app.example.com");
        assert!(config.allow_credentials);
        assert_eq!(config.max_age, 600);
        assert_eq!(config.allowed_methods, "GET, POST, PUT, DELETE, OPTIONS");
    }

    #[test]
    fn test_from_json_file_errors() {
        let missing = std::env::temp_dir().join("comet-cors-does-not-exist.json");
        assert!(matches!(
            CorsConfig::from_json_file(&missing),
            Err(CorsConfigError::Io(_))
        ));

        let path = std::env::temp_dir().join(format!("comet-cors-bad-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let result = CorsConfig::from_json_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(CorsConfigError::Json(_))));
    }
}

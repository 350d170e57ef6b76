//! # Matcher de Paths
//! src/router/matcher.rs
//!
//! Función pura: (patrón, path concreto) → coincide o no, más los parámetros
//! extraídos.
//!
//! ## Gramática de patrones
//!
//! ```text
//! /hello/world      segmentos literales
//! /hello/{name}     captura: `name` queda disponible en UrlParams
//! /files/*          comodín final: consume el resto del path bajo "wildcard"
//! ```
//!
//! Patrón y path se parten por `/` descartando tokens vacíos, así que
//! `/a//b/` equivale a `/a/b` y `/` no tiene tokens.

/// Clave del parámetro sintético que guarda el resto consumido por `*`
pub const WILDCARD_KEY: &str = "wildcard";

/// Un parámetro extraído del path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParam {
    pub key: String,
    pub value: String,
}

/// Parámetros extraídos, en el orden de los segmentos del patrón
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParams {
    params: Vec<UrlParam>,
}

impl UrlParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Valor del primer parámetro con esa clave
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    /// Atajo para el resto capturado por un `*` final
    pub fn wildcard(&self) -> Option<&str> {
        self.get(WILDCARD_KEY)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UrlParam> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    fn push(&mut self, key: &str, value: String) {
        self.params.push(UrlParam {
            key: key.to_string(),
            value,
        });
    }
}

impl<'a> IntoIterator for &'a UrlParams {
    type Item = &'a UrlParam;
    type IntoIter = std::slice::Iter<'a, UrlParam>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

/// Tipo de un segmento de patrón
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    /// `{name}` → nombre sin llaves
    Capture(&'a str),
    Wildcard,
}

impl<'a> Segment<'a> {
    pub fn classify(token: &'a str) -> Self {
        if token == "*" {
            Segment::Wildcard
        } else if token.len() >= 2 && token.starts_with('{') && token.ends_with('}') {
            Segment::Capture(&token[1..token.len() - 1])
        } else {
            Segment::Literal(token)
        }
    }
}

/// Parte un path en sus segmentos no vacíos
pub fn tokenize(path: &str) -> Vec<&str> {
    path.split('/').filter(|t| !t.is_empty()).collect()
}

/// Intenta hacer coincidir `pattern` con `path`
///
/// Retorna `None` ante cualquier diferencia; los parámetros acumulados en un
/// intento fallido se descartan con él.
///
/// # Ejemplo
/// ```
/// use comet_http::router::match_path;
///
/// let params = match_path("/hello/{name}", "/hello/alice").unwrap();
/// assert_eq!(params.get("name"), Some("alice"));
///
/// let params = match_path("/files/*", "/files/a/b/c").unwrap();
/// assert_eq!(params.wildcard(), Some("a/b/c"));
///
/// assert!(match_path("/x/y", "/x").is_none());
/// ```
pub fn match_path(pattern: &str, path: &str) -> Option<UrlParams> {
    let pattern_tokens = tokenize(pattern);
    let path_tokens = tokenize(path);

    let trailing_wildcard = pattern_tokens.last().map(|t| *t == "*").unwrap_or(false);

    if trailing_wildcard {
        // El `*` final necesita al menos un segmento que consumir
        let prefix_len = pattern_tokens.len() - 1;
        if path_tokens.len() <= prefix_len {
            return None;
        }
        let mut params = match_segments(&pattern_tokens[..prefix_len], &path_tokens[..prefix_len])?;
        params.push(WILDCARD_KEY, path_tokens[prefix_len..].join("/"));
        return Some(params);
    }

    if pattern_tokens.len() != path_tokens.len() {
        return None;
    }

    match_segments(&pattern_tokens, &path_tokens)
}

/// Compara segmento a segmento dos secuencias del mismo largo
fn match_segments(pattern: &[&str], path: &[&str]) -> Option<UrlParams> {
    let mut params = UrlParams::new();

    for (token, value) in pattern.iter().zip(path) {
        match Segment::classify(token) {
            Segment::Capture(name) => params.push(name, (*value).to_string()),
            // Un `*` que no es el último segmento vale por un segmento cualquiera
            Segment::Wildcard => {}
            Segment::Literal(literal) => {
                if literal != *value {
                    return None;
                }
            }
        }
    }

    Some(params)
}

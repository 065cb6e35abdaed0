//! # Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! El parser consume un `LineReader` línea por línea y construye el
//! `Request` solo cuando la request line y todos los headers ya fueron
//! leídos. El body (si existe) queda sin leer en el `LineReader`.
//!
//! ## Formato de un Request
//!
//! ```text
//! POST /files/notes.txt HTTP/1.1\r\n
//! Host: localhost:4221\r\n
//! Content-Length: 5\r\n
//! \r\n
//! hello
//! ```
//!
//! ## Tolerancia
//!
//! - Tokens extra en la request line se ignoran
//! - La versión no se valida
//! - Líneas de header sin `": "` se saltan sin error

use super::reader::LineReader;
use std::collections::HashMap;
use std::io::{self, Read};
use thiserror::Error;

/// Límite por defecto para request line + headers
pub const DEFAULT_MAX_HEAD_BYTES: usize = 8 * 1024;

/// Métodos HTTP
///
/// Cualquier método distinto de GET y POST se conserva en `Other` y es el
/// router quien decide qué hacer con él.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    GET,
    POST,
    Other(String),
}

impl Method {
    fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::GET,
            "POST" => Method::POST,
            other => Method::Other(other.to_string()),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::Other(token) => token,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Representa un request HTTP parseado (sin body)
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP
    method: Method,

    /// Target sin decodificar (ej: "/echo/abc")
    target: String,

    /// Versión tal como llegó (ej: "HTTP/1.1")
    version: String,

    /// Headers; el nombre distingue mayúsculas y el último duplicado gana
    headers: HashMap<String, String>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Error)]
pub enum ParseError {
    /// El stream terminó antes de obtener la request line
    #[error("incomplete request: stream ended before the request line")]
    IncompleteRequest,

    /// La request line tiene menos de tres tokens
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),

    /// Request line + headers superan el límite configurado
    #[error("request head exceeds {max} bytes")]
    HeadTooLarge { max: usize },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl Request {
    /// Parsea request line y headers con el límite por defecto
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use oneshot_http::http::{LineReader, Request};
    ///
    /// let mut reader = LineReader::new(&b"GET /echo/abc HTTP/1.1\r\n\r\n"[..]);
    /// let request = Request::parse(&mut reader).unwrap();
    ///
    /// assert_eq!(request.target(), "/echo/abc");
    /// assert_eq!(request.version(), "HTTP/1.1");
    /// ```
    pub fn parse<R: Read>(reader: &mut LineReader<R>) -> Result<Self, ParseError> {
        Self::parse_limited(reader, DEFAULT_MAX_HEAD_BYTES)
    }

    /// Parsea request line y headers sin leer más de `max_head` bytes
    pub fn parse_limited<R: Read>(
        reader: &mut LineReader<R>,
        max_head: usize,
    ) -> Result<Self, ParseError> {
        let mut budget = max_head;

        // 1. Request line (el target se usa tal cual, debe ser UTF-8)
        let request_line = match next_line(reader, &mut budget, max_head)? {
            Some(line) => String::from_utf8(line).map_err(|e| {
                let lossy = String::from_utf8_lossy(e.as_bytes());
                ParseError::MalformedRequestLine(lossy.trim_end().to_string())
            })?,
            None => return Err(ParseError::IncompleteRequest),
        };
        let (method, target, version) = Self::parse_request_line(&request_line)?;

        // 2. Headers hasta la línea vacía o el fin del stream
        let mut headers = HashMap::new();
        while let Some(line) = next_line(reader, &mut budget, max_head)? {
            if line == b"\r\n" || line == b"\n" {
                break;
            }

            let line = String::from_utf8_lossy(&line);

            match line.split_once(": ") {
                Some((name, value)) => {
                    headers.insert(name.to_string(), value.trim().to_string());
                }
                None => {
                    // Header sin delimitador: se ignora
                    continue;
                }
            }
        }

        Ok(Request {
            method,
            target,
            version,
            headers,
        })
    }

    /// Formato: `METHOD TARGET VERSION`
    fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
        let mut parts = line.split_whitespace();

        match (parts.next(), parts.next(), parts.next()) {
            (Some(method), Some(target), Some(version)) => Ok((
                Method::from_token(method),
                target.to_string(),
                version.to_string(),
            )),
            _ => Err(ParseError::MalformedRequestLine(line.trim_end().to_string())),
        }
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Obtiene el target crudo del request
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Obtiene la versión HTTP
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Obtiene todos los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico (el nombre distingue mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }
}

/// Lee la siguiente línea descontándola del presupuesto del head
fn next_line<R: Read>(
    reader: &mut LineReader<R>,
    budget: &mut usize,
    max_head: usize,
) -> Result<Option<Vec<u8>>, ParseError> {
    if *budget == 0 {
        return Err(ParseError::HeadTooLarge { max: max_head });
    }

    let line = match reader.read_line_bytes(*budget) {
        Ok(line) => line,
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            return Err(ParseError::HeadTooLarge { max: max_head });
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(line) = &line {
        *budget -= line.len().min(*budget);
    }

    Ok(line)
}

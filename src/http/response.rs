//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! ## Formato
//!
//! Con body (aunque sea vacío):
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 3\r\n
//! \r\n
//! abc
//! ```
//!
//! Sin body, solo la status line y la línea vacía:
//!
//! ```text
//! HTTP/1.1 404 Not Found\r\n
//! \r\n
//! ```
//!
//! Después del body no se agrega ningún byte: `Content-Length` siempre
//! coincide con lo que sigue a la línea vacía.

use super::StatusCode;
use std::io::{self, Write};

/// Tipo de contenido para texto plano (echo, user-agent)
pub const TEXT_PLAIN: &str = "text/plain";

/// Tipo de contenido para archivos servidos
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Body de una respuesta junto con su tipo de contenido
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    content_type: &'static str,
    bytes: Vec<u8>,
}

impl Body {
    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Representa una respuesta HTTP/1.1 completa
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Código de estado HTTP
    status: StatusCode,

    /// `None` = sin body; `Some` con bytes vacíos = body presente de largo 0
    body: Option<Body>,
}

impl Response {
    /// Crea una respuesta sin body
    ///
    /// # Ejemplo
    /// ```
    /// use oneshot_http::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::NotFound);
    /// assert_eq!(response.to_bytes(), b"HTTP/1.1 404 Not Found\r\n\r\n");
    /// ```
    pub fn new(status: StatusCode) -> Self {
        Self { status, body: None }
    }

    /// Establece el body y su tipo de contenido
    ///
    /// # Ejemplo
    /// ```
    /// use oneshot_http::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok).with_body("text/plain", "abc");
    /// assert_eq!(
    ///     response.to_bytes(),
    ///     b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 3\r\n\r\nabc"
    /// );
    /// ```
    pub fn with_body(mut self, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(Body {
            content_type,
            bytes: body.into(),
        });
        self
    }

    /// 200 OK con texto plano
    pub fn text(body: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::Ok).with_body(TEXT_PLAIN, body)
    }

    /// 200 OK con bytes binarios
    pub fn octet_stream(body: Vec<u8>) -> Self {
        Self::new(StatusCode::Ok).with_body(OCTET_STREAM, body)
    }

    /// Convierte la respuesta a bytes listos para el socket
    pub fn to_bytes(&self) -> Vec<u8> {
        let body_len = self.body.as_ref().map_or(0, |b| b.bytes.len());
        let mut result = Vec::with_capacity(96 + body_len);

        // 1. Status line
        result.extend_from_slice(format!("HTTP/1.1 {}\r\n", self.status).as_bytes());

        // 2. Headers de framing (solo con body)
        if let Some(body) = &self.body {
            result.extend_from_slice(format!("Content-Type: {}\r\n", body.content_type).as_bytes());
            result.extend_from_slice(format!("Content-Length: {}\r\n", body.bytes.len()).as_bytes());
        }

        // 3. Línea vacía
        result.extend_from_slice(b"\r\n");

        // 4. Body
        if let Some(body) = &self.body {
            result.extend_from_slice(&body.bytes);
        }

        result
    }

    /// Escribe la respuesta completa en `out` y hace flush
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&self.to_bytes())?;
        out.flush()
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene el body, si existe
    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }
}

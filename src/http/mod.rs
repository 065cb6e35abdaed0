//! # Módulo HTTP
//!
//! Implementación desde cero del subconjunto de HTTP/1.1 que usa el
//! servidor: una petición por conexión, sin keep-alive ni chunked.
//!
//! - Lectura incremental del stream (líneas y bytes exactos)
//! - Parsing de requests
//! - Construcción de responses
//! - Códigos de estado
//!
//! ### Formato de Request
//!
//! ```text
//! GET /echo/abc HTTP/1.1\r\n
//! User-Agent: curl/8.5.0\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 3\r\n
//! \r\n
//! abc
//! ```

pub mod reader;    // Lectura de líneas y bytes exactos
pub mod request;   // Parsing de HTTP requests
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use reader::LineReader;
pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;

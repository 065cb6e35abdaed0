//! # Handlers Básicos
//! src/handlers/basic.rs
//!
//! - `/`: 200 sin body
//! - `/echo/{text}`: devuelve `{text}` tal cual
//! - `/user-agent`: devuelve el header `User-Agent`

use crate::http::{Request, Response, StatusCode};

/// Handler para `/`
pub fn root() -> Response {
    Response::new(StatusCode::Ok)
}

/// Handler para `/echo/{text}`
///
/// El valor no se decodifica: `/echo/a%20b` responde `a%20b`.
pub fn echo(value: String) -> Response {
    Response::text(value)
}

/// Handler para `/user-agent`
///
/// Sin header `User-Agent` el body es vacío, pero sigue presente
/// (con `Content-Type` y `Content-Length: 0`).
pub fn user_agent(request: &Request) -> Response {
    let agent = request.header("User-Agent").unwrap_or_default();
    Response::text(agent)
}

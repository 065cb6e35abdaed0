//! # Handlers de Rutas
//! src/handlers/mod.rs
//!
//! Ejecuta la `Route` resuelta por el router:
//! - `basic`: `/`, `/echo/{text}`, `/user-agent`
//! - `files`: lectura y escritura de archivos bajo el directorio base
//!
//! Los errores son un `HandlerError` tipado; el servidor lo convierte en
//! una respuesta con `HandlerError::status()` y nunca termina el proceso.

pub mod basic;
pub mod files;

pub use files::FileStore;

use crate::http::{LineReader, Request, Response, StatusCode};
use crate::router::Route;
use std::io::{self, Read};
use std::path::PathBuf;
use thiserror::Error;

/// Errores de los handlers
#[derive(Debug, Error)]
pub enum HandlerError {
    /// `Content-Length` ausente o no numérico en una subida
    #[error("missing or invalid Content-Length header: {0:?}")]
    InvalidContentLength(Option<String>),

    /// Archivo inexistente, ilegible o directorio
    #[error("file not accessible: {}: {source}", .path.display())]
    FileNotAccessible { path: PathBuf, source: io::Error },

    /// Nombre que saldría del directorio base (`..`, ruta absoluta, ...)
    #[error("invalid file name: {0:?}")]
    InvalidFileName(String),

    /// Fallo al crear, escribir o renombrar el archivo subido
    #[error("failed to write {}: {source}", .path.display())]
    FileWriteFailure { path: PathBuf, source: io::Error },

    /// El stream terminó antes de `Content-Length` bytes
    #[error("incomplete body: expected {expected} bytes, received {received}")]
    IncompleteBody { expected: u64, received: u64 },

    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),
}

impl HandlerError {
    /// Código de estado con el que se responde este error
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::FileNotAccessible { .. } | HandlerError::InvalidFileName(_) => {
                StatusCode::NotFound
            }
            HandlerError::InvalidContentLength(_)
            | HandlerError::FileWriteFailure { .. }
            | HandlerError::IncompleteBody { .. }
            | HandlerError::UnsupportedMethod(_) => StatusCode::InternalServerError,
        }
    }

    /// Respuesta sin body para este error
    pub fn to_response(&self) -> Response {
        Response::new(self.status())
    }
}

/// Ejecuta el handler de `route`.
///
/// `reader` es el mismo lector del que se parseó `request`: la subida de
/// archivos lee el body desde ahí.
pub fn dispatch<R: Read>(
    route: Route,
    request: &Request,
    reader: &mut LineReader<R>,
    store: &FileStore,
) -> Result<Response, HandlerError> {
    match route {
        Route::Root => Ok(basic::root()),
        Route::UserAgent => Ok(basic::user_agent(request)),
        Route::Echo(value) => Ok(basic::echo(value)),
        Route::FileRead(name) => files::read_file(store, &name),
        Route::FileWrite(name) => files::write_file(store, &name, request, reader),
        Route::NotFound => Ok(Response::new(StatusCode::NotFound)),
        Route::UnsupportedMethod(method) => Err(HandlerError::UnsupportedMethod(method)),
    }
}

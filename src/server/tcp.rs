//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Un thread por conexión. Cada conexión atiende exactamente un request:
//!
//! ```text
//! request line → headers → route → handler (body) → response → close
//! ```
//!
//! Ningún error de una conexión termina el proceso: se registra, se
//! responde 500/404 cuando hay algo que responder y se cierra el socket.

use crate::config::Config;
use crate::handlers::{self, FileStore};
use crate::http::{LineReader, Request, Response, StatusCode};
use crate::router;
use std::io::{self, Read};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, info_span, warn};

/// Tiempo máximo drenando input sobrante antes de cerrar
const LINGER_TIMEOUT: Duration = Duration::from_millis(250);

/// Bytes máximos a drenar antes de cerrar
const LINGER_MAX_BYTES: u64 = 64 * 1024;

/// Límites aplicados a cada conexión
#[derive(Debug, Clone, Copy)]
pub struct ConnectionLimits {
    /// Timeout de lectura y escritura del socket
    pub io_timeout: Duration,

    /// Tamaño máximo de request line + headers
    pub max_head_bytes: usize,
}

impl From<&Config> for ConnectionLimits {
    fn from(config: &Config) -> Self {
        Self {
            io_timeout: config.read_timeout(),
            max_head_bytes: config.max_head_bytes,
        }
    }
}

/// Servidor HTTP/1.1 de una petición por conexión
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    store: Arc<FileStore>,
    limits: ConnectionLimits,
}

impl Server {
    /// Hace bind en la dirección configurada.
    ///
    /// Es el único error fatal del servidor.
    pub fn bind(config: &Config) -> io::Result<Self> {
        let address = config.address();
        let listener = TcpListener::bind(&address)?;

        info!(address = %address, directory = %config.directory.display(), "servidor escuchando");

        Ok(Self {
            listener,
            store: Arc::new(FileStore::new(config.directory.clone())),
            limits: ConnectionLimits::from(config),
        })
    }

    /// Dirección real del listener (útil con puerto 0)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Acepta conexiones indefinidamente, un thread por conexión
    pub fn run(self) -> io::Result<()> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => self.spawn_connection(stream),
                Err(e) => {
                    warn!(error = %e, "error al aceptar conexión");
                }
            }
        }

        Ok(())
    }

    fn spawn_connection(&self, stream: TcpStream) {
        let store = Arc::clone(&self.store);
        let limits = self.limits;

        let spawned = thread::Builder::new()
            .name("connection".to_string())
            .spawn(move || {
                if let Err(e) = handle_connection(stream, &store, limits) {
                    warn!(error = %e, "error en la conexión");
                }
            });

        if let Err(e) = spawned {
            error!(error = %e, "no se pudo crear el thread de la conexión");
        }
    }
}

/// Atiende una conexión completa y la cierra.
///
/// Solo retorna error por fallos de I/O del socket (timeouts, escritura);
/// los errores del protocolo se convierten en respuestas.
pub fn handle_connection(
    stream: TcpStream,
    store: &FileStore,
    limits: ConnectionLimits,
) -> io::Result<()> {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    let span = info_span!("connection", peer = %peer);
    let _enter = span.enter();

    let start = Instant::now();
    stream.set_read_timeout(Some(limits.io_timeout))?;
    stream.set_write_timeout(Some(limits.io_timeout))?;

    let mut reader = LineReader::new(&stream);

    let response = match serve(&mut reader, store, limits.max_head_bytes) {
        Some(response) => response,
        None => {
            debug!("conexión cerrada sin request");
            return Ok(());
        }
    };

    response.write_to(&mut &stream)?;
    match linger_close(&stream, &mut reader) {
        Ok(drained) => debug!(drained, "input sobrante descartado"),
        Err(e) => debug!(error = %e, "cierre sin drenar el input"),
    }

    info!(
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "respuesta enviada"
    );

    Ok(())
}

/// Parsea, enruta y ejecuta un request leído de `reader`.
///
/// Retorna `None` cuando no llegó ningún byte del request: en ese caso la
/// conexión se cierra sin respuesta.
pub fn serve<R: Read>(
    reader: &mut LineReader<R>,
    store: &FileStore,
    max_head_bytes: usize,
) -> Option<Response> {
    let request = match Request::parse_limited(reader, max_head_bytes) {
        Ok(request) => request,
        Err(e) if reader.bytes_consumed() == 0 => {
            debug!(error = %e, "sin request");
            return None;
        }
        Err(e) => {
            warn!(error = %e, "request inválido");
            return Some(Response::new(StatusCode::InternalServerError));
        }
    };

    info!(method = %request.method(), target = request.target(), "request");

    let route = router::route(&request);
    match handlers::dispatch(route, &request, reader, store) {
        Ok(response) => Some(response),
        Err(e) => {
            warn!(error = %e, status = e.status().as_u16(), "el handler falló");
            Some(e.to_response())
        }
    }
}

/// Cierra la escritura y drena brevemente lo que el cliente aún envíe
/// (por ejemplo un body que no se leyó), para que el cierre no descarte
/// la respuesta con un RST.
///
/// Retorna cuántos bytes se descartaron.
fn linger_close(stream: &TcpStream, reader: &mut LineReader<&TcpStream>) -> io::Result<u64> {
    stream.shutdown(Shutdown::Write)?;
    stream.set_read_timeout(Some(LINGER_TIMEOUT))?;

    io::copy(&mut Read::take(reader, LINGER_MAX_BYTES), &mut io::sink())
}

//! # oneshot_http
//! src/lib.rs
//!
//! Servidor HTTP/1.1 mínimo implementado desde cero. Cada conexión
//! transporta exactamente un request, que se parsea, se enruta a uno de
//! pocos handlers (echo, user-agent, lectura y escritura de archivos) y se
//! responde antes de cerrar el socket.
//!
//! ## Arquitectura
//!
//! - `http`: lector de líneas/bytes, parsing de requests, responses y status
//! - `router`: mapeo puro de (método, target) a una `Route`
//! - `handlers`: ejecución de cada ruta y acceso al directorio base
//! - `server`: listener TCP y manejo de cada conexión
//! - `config`: configuración (flag `--directory`)
//! - `logging`: inicialización de `tracing`
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use oneshot_http::config::Config;
//! use oneshot_http::server::Server;
//!
//! let config = Config::default();
//! let server = Server::bind(&config).expect("Error al iniciar servidor");
//! server.run().expect("Error en el servidor");
//! ```

pub mod config;
pub mod handlers;
pub mod http;
pub mod logging;
pub mod router;
pub mod server;

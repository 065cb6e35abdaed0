//! # oneshot_http - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor. Sale con código 2 si la configuración es
//! inválida y con código 1 si no puede hacer bind del puerto; una conexión
//! fallida nunca termina el proceso.

use oneshot_http::config::Config;
use oneshot_http::logging;
use oneshot_http::server::Server;
use tracing::error;

fn main() {
    logging::init();

    let config = Config::new();
    if let Err(e) = config.validate() {
        error!(error = %e, "configuración inválida");
        std::process::exit(2);
    }
    config.log_summary();

    let server = match Server::bind(&config) {
        Ok(server) => server,
        Err(e) => {
            error!(address = %config.address(), error = %e, "no se pudo hacer bind del puerto");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        error!(error = %e, "error fatal");
        std::process::exit(1);
    }
}

//! # Configuración del Servidor
//! src/config.rs
//!
//! El único flag de línea de comandos es `--directory`. El resto de la
//! configuración (host, puerto, límites) es fija y existe en el struct para
//! que el servidor y los tests la reciban de forma explícita.
//!
//! ```bash
//! ./oneshot_http --directory /tmp/files
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Puerto en el que escucha el servidor
pub const DEFAULT_PORT: u16 = 4221;

/// Configuración del servidor
#[derive(Debug, Clone, Parser)]
#[command(name = "oneshot_http")]
#[command(about = "Servidor HTTP/1.1 mínimo: una petición por conexión")]
#[command(version)]
pub struct Config {
    /// Directorio desde el que se leen y en el que se escriben los archivos
    #[arg(long = "directory", value_name = "PATH", default_value = ".")]
    pub directory: PathBuf,

    /// Host/IP en el que escucha
    #[arg(skip = String::from("0.0.0.0"))]
    pub host: String,

    /// Puerto en el que escucha
    #[arg(skip = DEFAULT_PORT)]
    pub port: u16,

    /// Timeout de lectura/escritura por conexión en milisegundos
    #[arg(skip = 10_000u64)]
    pub read_timeout_ms: u64,

    /// Tamaño máximo de request line + headers
    #[arg(skip = crate::http::request::DEFAULT_MAX_HEAD_BYTES)]
    pub max_head_bytes: usize,
}

impl Config {
    /// Crea la configuración parseando los argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use oneshot_http::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:4221");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Timeout de I/O por conexión
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.read_timeout_ms == 0 {
            return Err("Read timeout must be > 0".to_string());
        }
        if self.max_head_bytes == 0 {
            return Err("Max head bytes must be >= 1".to_string());
        }
        if self.directory.as_os_str().is_empty() {
            return Err("Directory must not be empty".to_string());
        }

        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn log_summary(&self) {
        info!(
            address = %self.address(),
            directory = %self.directory.display(),
            read_timeout_ms = self.read_timeout_ms,
            max_head_bytes = self.max_head_bytes,
            "configuración"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            read_timeout_ms: 10_000,
            max_head_bytes: crate::http::request::DEFAULT_MAX_HEAD_BYTES,
        }
    }
}

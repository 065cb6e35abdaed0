//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Función pura que mapea (método, target) a una `Route`. No hace I/O:
//! la ejecución de cada ruta vive en `crate::handlers`.
//!
//! ```text
//! Request → route() → Route → handlers::dispatch() → Response
//! ```
//!
//! | Método | Target          | Route               |
//! |--------|-----------------|---------------------|
//! | GET    | `/`             | `Root`              |
//! | GET    | `/user-agent`   | `UserAgent`         |
//! | GET    | `/echo/{text}`  | `Echo(text)`        |
//! | GET    | `/files/{name}` | `FileRead(name)`    |
//! | POST   | `/files/{name}` | `FileWrite(name)`   |
//! | otro   | cualquiera      | `UnsupportedMethod` |
//!
//! El resto (incluido POST a `/echo/x`) es `NotFound`. El query string y
//! el fragmento se ignoran al enrutar.

use crate::http::{Method, Request};

/// Ruta resuelta para un request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Root,
    Echo(String),
    UserAgent,
    FileRead(String),
    FileWrite(String),
    NotFound,
    /// Método distinto de GET/POST
    UnsupportedMethod(String),
}

/// Resuelve la ruta de un request
///
/// # Ejemplo
/// ```
/// use oneshot_http::http::{LineReader, Request};
/// use oneshot_http::router::{route, Route};
///
/// let mut reader = LineReader::new(&b"GET /echo/abc HTTP/1.1\r\n\r\n"[..]);
/// let request = Request::parse(&mut reader).unwrap();
///
/// assert_eq!(route(&request), Route::Echo("abc".to_string()));
/// ```
pub fn route(request: &Request) -> Route {
    resolve(request.method(), request.target())
}

/// Igual que `route`, a partir del método y el target sueltos
pub fn resolve(method: &Method, target: &str) -> Route {
    if let Method::Other(token) = method {
        return Route::UnsupportedMethod(token.clone());
    }

    let path = target_path(target);
    let segments = path_segments(path);

    match (method, path, segments.as_slice()) {
        (Method::GET, "/", _) => Route::Root,
        (Method::GET, "/user-agent", _) => Route::UserAgent,
        (Method::GET, _, ["files", name]) if !name.is_empty() => Route::FileRead(name.to_string()),
        (Method::POST, _, ["files", name]) if !name.is_empty() => Route::FileWrite(name.to_string()),
        (Method::GET, _, ["echo", value]) => Route::Echo(value.to_string()),
        _ => Route::NotFound,
    }
}

/// Parte de ruta del target: todo lo anterior al primer `?` o `#`.
/// No se decodifican `%XX`.
///
/// ```
/// use oneshot_http::router::target_path;
///
/// assert_eq!(target_path("/echo/abc?x=1"), "/echo/abc");
/// assert_eq!(target_path("/files/a%20b"), "/files/a%20b");
/// ```
pub fn target_path(target: &str) -> &str {
    match target.find(|c| c == '?' || c == '#') {
        Some(end) => &target[..end],
        None => target,
    }
}

/// Divide el target en a lo sumo tres partes por `/` y descarta una parte
/// vacía inicial. La última parte conserva sus `/` sin dividir. El target
/// `/` no tiene segmentos (es el caso `Root`).
///
/// ```
/// use oneshot_http::router::path_segments;
///
/// assert_eq!(path_segments("/echo/abc"), vec!["echo", "abc"]);
/// assert_eq!(path_segments("/files/a/b.txt"), vec!["files", "a/b.txt"]);
/// assert!(path_segments("").is_empty());
/// ```
pub fn path_segments(target: &str) -> Vec<&str> {
    if target.is_empty() || target == "/" {
        return Vec::new();
    }

    let mut parts: Vec<&str> = target.splitn(3, '/').collect();
    if parts.first() == Some(&"") {
        parts.remove(0);
    }
    parts
}

//! # Handlers de Archivos
//! src/handlers/files.rs
//!
//! - `GET /files/{name}`: devuelve el archivo como `application/octet-stream`
//! - `POST /files/{name}`: guarda el body (exactamente `Content-Length` bytes)
//!
//! Todos los nombres se resuelven con `FileStore::resolve`, que rechaza
//! cualquier nombre capaz de salir del directorio base.
//!
//! La subida se escribe primero en un archivo temporal hermano y luego se
//! renombra sobre el destino. Si el body llega incompleto el temporal se
//! borra y el destino queda intacto.

use super::HandlerError;
use crate::http::{LineReader, Request, Response, StatusCode};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Secuencia para nombres de temporales únicos dentro del proceso
static UPLOAD_SEQ: AtomicU64 = AtomicU64::new(0);

/// Directorio base de las rutas `/files/*`
///
/// Se construye una vez al arrancar y se comparte (solo lectura) entre
/// todas las conexiones.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resuelve `name` dentro del directorio base.
    ///
    /// Solo se aceptan rutas relativas formadas por componentes normales
    /// (se permiten subdirectorios como `a/b.txt`). La comprobación es
    /// léxica: los symlinks se verifican en `read` y `write_from`.
    ///
    /// # Ejemplo
    /// ```
    /// use oneshot_http::handlers::FileStore;
    ///
    /// let store = FileStore::new("/srv/data");
    /// assert!(store.resolve("notes.txt").is_ok());
    /// assert!(store.resolve("../etc/passwd").is_err());
    /// assert!(store.resolve("/etc/passwd").is_err());
    /// ```
    pub fn resolve(&self, name: &str) -> Result<PathBuf, HandlerError> {
        let invalid = || HandlerError::InvalidFileName(name.to_string());

        if name.contains('\0') {
            return Err(invalid());
        }

        let mut path = self.root.clone();
        let mut parts = 0;

        for component in Path::new(name).components() {
            match component {
                Component::Normal(part) => {
                    path.push(part);
                    parts += 1;
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(invalid());
                }
            }
        }

        if parts == 0 {
            return Err(invalid());
        }

        Ok(path)
    }

    /// Falla con `InvalidFileName` si `real` (ya canónica) no está bajo
    /// el directorio base canónico.
    fn ensure_inside(&self, name: &str, real: &Path) -> Result<(), HandlerError> {
        let invalid = || HandlerError::InvalidFileName(name.to_string());
        let root = self.root.canonicalize().map_err(|_| invalid())?;

        if !real.starts_with(&root) {
            warn!(name, real = %real.display(), "symlink fuera del directorio base");
            return Err(invalid());
        }

        Ok(())
    }

    /// Lee el archivo completo en memoria
    pub fn read(&self, name: &str) -> Result<Vec<u8>, HandlerError> {
        let resolved = self.resolve(name)?;
        let path = resolved
            .canonicalize()
            .map_err(|source| HandlerError::FileNotAccessible {
                path: resolved,
                source,
            })?;
        self.ensure_inside(name, &path)?;

        if path.is_dir() {
            return Err(HandlerError::FileNotAccessible {
                path,
                source: io::Error::other("is a directory"),
            });
        }

        fs::read(&path).map_err(|source| HandlerError::FileNotAccessible { path, source })
    }

    /// Guarda exactamente `length` bytes leídos de `reader` en `name`.
    ///
    /// Retorna los bytes escritos. Falla con `IncompleteBody` si el stream
    /// termina antes; en ese caso no se modifica el destino.
    pub fn write_from<R: Read>(
        &self,
        name: &str,
        length: u64,
        reader: &mut LineReader<R>,
    ) -> Result<u64, HandlerError> {
        let resolved = self.resolve(name)?;
        let (Some(parent), Some(file_name)) = (resolved.parent(), resolved.file_name()) else {
            return Err(HandlerError::InvalidFileName(name.to_string()));
        };

        // Solo el directorio padre se canoniza: el destino puede no existir
        // y `rename` reemplaza un symlink en vez de seguirlo.
        let parent = parent
            .canonicalize()
            .map_err(|source| HandlerError::FileWriteFailure {
                path: parent.to_path_buf(),
                source,
            })?;
        self.ensure_inside(name, &parent)?;

        let path = parent.join(file_name);
        let temp = temp_path(&path);

        let mut file = File::create(&temp).map_err(|source| HandlerError::FileWriteFailure {
            path: temp.clone(),
            source,
        })?;

        let copied = match reader.copy_exact(length, &mut file) {
            Ok(copied) => copied,
            Err(source) => {
                drop(file);
                discard(&temp);
                return Err(HandlerError::FileWriteFailure { path, source });
            }
        };
        drop(file);

        if copied < length {
            discard(&temp);
            return Err(HandlerError::IncompleteBody {
                expected: length,
                received: copied,
            });
        }

        if let Err(source) = fs::rename(&temp, &path) {
            discard(&temp);
            return Err(HandlerError::FileWriteFailure { path, source });
        }

        Ok(copied)
    }
}

/// Handler para `GET /files/{name}`
pub fn read_file(store: &FileStore, name: &str) -> Result<Response, HandlerError> {
    let contents = store.read(name)?;
    Ok(Response::octet_stream(contents))
}

/// Handler para `POST /files/{name}`
///
/// Valida `Content-Length` antes de tocar el disco o leer el body.
pub fn write_file<R: Read>(
    store: &FileStore,
    name: &str,
    request: &Request,
    reader: &mut LineReader<R>,
) -> Result<Response, HandlerError> {
    let length = content_length(request)?;
    let written = store.write_from(name, length, reader)?;

    debug!(name, written, "archivo guardado");
    Ok(Response::new(StatusCode::Created))
}

/// `Content-Length` como entero no negativo
pub fn content_length(request: &Request) -> Result<u64, HandlerError> {
    let raw = request
        .header("Content-Length")
        .ok_or(HandlerError::InvalidContentLength(None))?;

    raw.parse::<u64>()
        .map_err(|_| HandlerError::InvalidContentLength(Some(raw.to_string())))
}

/// `.{name}.{pid}-{seq}.part` junto al destino
fn temp_path(path: &Path) -> PathBuf {
    let seq = UPLOAD_SEQ.fetch_add(1, Ordering::Relaxed);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    path.with_file_name(format!(".{}.{}-{}.part", name, std::process::id(), seq))
}

fn discard(temp: &Path) {
    if let Err(e) = fs::remove_file(temp) {
        warn!(path = %temp.display(), error = %e, "no se pudo borrar el temporal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::OCTET_STREAM;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        (dir, store)
    }

    /// Parsea el request y sube el body restante
    fn upload(store: &FileStore, name: &str, raw: &[u8]) -> Result<Response, HandlerError> {
        let mut reader = LineReader::new(raw);
        let request = Request::parse(&mut reader).unwrap();
        write_file(store, name, &request, &mut reader)
    }

    fn leftovers(dir: &TempDir) -> Vec<String> {
        fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".part"))
            .collect()
    }

    // ==================== resolve ====================

    #[test]
    fn test_resolve_simple_name() {
        let store = FileStore::new("/base");
        assert_eq!(store.resolve("a.txt").unwrap(), PathBuf::from("/base/a.txt"));
    }

    #[test]
    fn test_resolve_nested_name() {
        let store = FileStore::new("/base");
        assert_eq!(store.resolve("sub/a.txt").unwrap(), PathBuf::from("/base/sub/a.txt"));
        assert_eq!(store.resolve("./a.txt").unwrap(), PathBuf::from("/base/a.txt"));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let store = FileStore::new("/base");

        for name in ["..", "../secret", "a/../../b", "/etc/passwd", ".", "", "a\0b"] {
            assert!(
                matches!(store.resolve(name), Err(HandlerError::InvalidFileName(_))),
                "name {:?} should be rejected",
                name
            );
        }
    }

    // ==================== GET ====================

    #[test]
    fn test_read_existing_file() {
        let (dir, store) = setup();
        fs::write(dir.path().join("hello.txt"), b"hi there").unwrap();

        let response = read_file(&store, "hello.txt").unwrap();
        let body = response.body().unwrap();

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(body.content_type(), OCTET_STREAM);
        assert_eq!(body.bytes(), b"hi there");
    }

    #[test]
    fn test_read_missing_file() {
        let (_dir, store) = setup();

        let err = read_file(&store, "missing.txt").unwrap_err();
        assert!(matches!(err, HandlerError::FileNotAccessible { .. }));
        assert_eq!(err.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_read_directory_is_not_accessible() {
        let (dir, store) = setup();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let err = read_file(&store, "sub").unwrap_err();
        assert_eq!(err.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_read_traversal_is_not_found() {
        let (_dir, store) = setup();

        let err = read_file(&store, "../../etc/passwd").unwrap_err();
        assert_eq!(err.status(), StatusCode::NotFound);
    }

    // ==================== POST ====================

    #[test]
    fn test_write_file() {
        let (dir, store) = setup();

        let response = upload(&store, "out.txt", b"POST /files/out.txt HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello").unwrap();

        assert_eq!(response.to_bytes(), b"HTTP/1.1 201 Created\r\n\r\n");
        assert_eq!(fs::read(dir.path().join("out.txt")).unwrap(), b"hello");
        assert!(leftovers(&dir).is_empty());
    }

    #[test]
    fn test_write_reads_only_content_length_bytes() {
        let (dir, store) = setup();
        let raw = b"POST /files/out.txt HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcdef";

        let mut reader = LineReader::new(&raw[..]);
        let request = Request::parse(&mut reader).unwrap();
        write_file(&store, "out.txt", &request, &mut reader).unwrap();

        assert_eq!(fs::read(dir.path().join("out.txt")).unwrap(), b"abc");
        assert_eq!(reader.buffered(), b"def");
    }

    #[test]
    fn test_write_overwrites() {
        let (dir, store) = setup();

        upload(&store, "f", b"POST /files/f HTTP/1.1\r\nContent-Length: 11\r\n\r\nfirst body!").unwrap();
        upload(&store, "f", b"POST /files/f HTTP/1.1\r\nContent-Length: 6\r\n\r\nsecond").unwrap();

        assert_eq!(fs::read(dir.path().join("f")).unwrap(), b"second");
    }

    #[test]
    fn test_write_empty_body() {
        let (dir, store) = setup();

        let response = upload(&store, "empty", b"POST /files/empty HTTP/1.1\r\nContent-Length: 0\r\n\r\n").unwrap();

        assert_eq!(response.status(), StatusCode::Created);
        assert_eq!(fs::read(dir.path().join("empty")).unwrap(), b"");
    }

    #[test]
    fn test_write_missing_content_length() {
        let (dir, store) = setup();

        let err = upload(&store, "x", b"POST /files/x HTTP/1.1\r\n\r\nhello").unwrap_err();

        assert!(matches!(err, HandlerError::InvalidContentLength(None)));
        assert_eq!(err.status(), StatusCode::InternalServerError);
        assert!(!dir.path().join("x").exists());
    }

    #[test]
    fn test_write_invalid_content_length_keeps_existing_file() {
        let (dir, store) = setup();
        fs::write(dir.path().join("x"), b"original").unwrap();

        for value in ["abc", "-1", "", "5.0"] {
            let raw = format!("POST /files/x HTTP/1.1\r\nContent-Length: {}\r\n\r\nhello", value);
            let err = upload(&store, "x", raw.as_bytes()).unwrap_err();
            assert!(matches!(err, HandlerError::InvalidContentLength(Some(_))), "value {:?}", value);
        }

        assert_eq!(fs::read(dir.path().join("x")).unwrap(), b"original");
    }

    #[test]
    fn test_write_short_body_fails_and_keeps_target() {
        let (dir, store) = setup();
        fs::write(dir.path().join("x"), b"original").unwrap();

        let err = upload(&store, "x", b"POST /files/x HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc").unwrap_err();

        assert!(matches!(err, HandlerError::IncompleteBody { expected: 10, received: 3 }));
        assert_eq!(err.status(), StatusCode::InternalServerError);
        assert_eq!(fs::read(dir.path().join("x")).unwrap(), b"original");
        assert!(leftovers(&dir).is_empty());
    }

    #[test]
    fn test_write_into_missing_directory() {
        let (_dir, store) = setup();

        let err = upload(&store, "nope/x", b"POST /files/nope/x HTTP/1.1\r\nContent-Length: 1\r\n\r\na").unwrap_err();
        assert!(matches!(err, HandlerError::FileWriteFailure { .. }));
    }

    #[test]
    fn test_write_traversal_rejected() {
        let (dir, store) = setup();

        let err = upload(&store, "../evil", b"POST /files/../evil HTTP/1.1\r\nContent-Length: 1\r\n\r\na").unwrap_err();

        assert!(matches!(err, HandlerError::InvalidFileName(_)));
        assert!(!dir.path().parent().unwrap().join("evil").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_read_through_escaping_symlink_is_rejected() {
        let outer = TempDir::new().unwrap();
        let base = outer.path().join("base");
        fs::create_dir(&base).unwrap();
        fs::write(outer.path().join("secret.txt"), b"top secret").unwrap();
        std::os::unix::fs::symlink(outer.path(), base.join("up")).unwrap();
        std::os::unix::fs::symlink(outer.path().join("secret.txt"), base.join("link.txt")).unwrap();

        let store = FileStore::new(&base);

        for name in ["up/secret.txt", "link.txt"] {
            let err = read_file(&store, name).unwrap_err();
            assert!(matches!(err, HandlerError::InvalidFileName(_)), "name {:?}", name);
            assert_eq!(err.status(), StatusCode::NotFound);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_read_through_inner_symlink_is_allowed() {
        let (dir, store) = setup();
        fs::create_dir(dir.path().join("real")).unwrap();
        fs::write(dir.path().join("real/a.txt"), b"inside").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("alias")).unwrap();

        let response = read_file(&store, "alias/a.txt").unwrap();
        assert_eq!(response.body().unwrap().bytes(), b"inside");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_through_escaping_symlink_is_rejected() {
        let outer = TempDir::new().unwrap();
        let base = outer.path().join("base");
        fs::create_dir(&base).unwrap();
        std::os::unix::fs::symlink(outer.path(), base.join("up")).unwrap();

        let store = FileStore::new(&base);
        let err = upload(&store, "up/evil", b"POST /files/up/evil HTTP/1.1\r\nContent-Length: 1\r\n\r\na").unwrap_err();

        assert!(matches!(err, HandlerError::InvalidFileName(_)));
        assert!(!outer.path().join("evil").exists());
    }

    #[test]
    fn test_temp_paths_are_unique() {
        let a = temp_path(Path::new("/base/f"));
        let b = temp_path(Path::new("/base/f"));

        assert_ne!(a, b);
        assert_eq!(a.parent(), Some(Path::new("/base")));
    }
}

//! # Lector de Líneas
//! src/http/reader.rs
//!
//! `LineReader` envuelve el stream de la conexión y ofrece dos modos de
//! lectura que comparten **un solo buffer interno**:
//!
//! 1. **Modo línea** (`read_line`): devuelve una línea terminada en `\n`
//!    (incluyendo el `\r\n`), usado para la request line y los headers.
//! 2. **Modo exacto** (`copy_exact`, `read_exact_bytes` y `impl Read`):
//!    entrega exactamente N bytes del body, sin importar cuántas lecturas
//!    físicas hagan falta.
//!
//! Los bytes que el modo línea leyó de más (look-ahead) quedan en el buffer
//! y son los primeros que entrega el modo exacto. Nunca se pierden ni se
//! duplican bytes al cambiar de modo.
//!
//! ```text
//!  socket ──► [ buf: "...\r\n\r\nhel" ]  ──► read_line()  → "Host: x\r\n"
//!                             ▲ pos
//!             copy_exact(5) → "hel" (del buffer) + "lo" (del socket)
//! ```

use std::io::{self, BufRead, Read, Write};

/// Tamaño por defecto del buffer interno
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Límite por defecto para una línea individual
pub const DEFAULT_MAX_LINE: usize = 8 * 1024;

/// Lector incremental con modo línea y modo exacto sobre el mismo buffer
#[derive(Debug)]
pub struct LineReader<R> {
    inner: R,
    buf: Box<[u8]>,
    /// Siguiente byte sin consumir dentro de `buf`
    pos: usize,
    /// Cantidad de bytes válidos en `buf`
    filled: usize,
    /// Total de bytes entregados al llamador (ambos modos)
    consumed: u64,
}

impl<R: Read> LineReader<R> {
    /// Crea un lector con el buffer por defecto (4 KiB)
    pub fn new(inner: R) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, inner)
    }

    /// Crea un lector con un buffer de `capacity` bytes (mínimo 1)
    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        Self {
            inner,
            buf: vec![0u8; capacity.max(1)].into_boxed_slice(),
            pos: 0,
            filled: 0,
            consumed: 0,
        }
    }

    /// Lee una línea completa, incluyendo el `\r\n` final si existe.
    ///
    /// Retorna `Ok(None)` solo cuando el stream terminó sin capturar ningún
    /// byte. Si el stream termina a mitad de línea, se retorna lo capturado.
    ///
    /// # Ejemplo
    /// ```
    /// use oneshot_http::http::LineReader;
    ///
    /// let mut reader = LineReader::new(&b"GET / HTTP/1.1\r\n\r\n"[..]);
    /// assert_eq!(reader.read_line().unwrap().as_deref(), Some("GET / HTTP/1.1\r\n"));
    /// assert_eq!(reader.read_line().unwrap().as_deref(), Some("\r\n"));
    /// assert_eq!(reader.read_line().unwrap(), None);
    /// ```
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        self.read_line_limited(DEFAULT_MAX_LINE)
    }

    /// Igual que `read_line`, pero falla con `InvalidData` si la línea
    /// supera `limit` bytes. Los bytes ya leídos de una línea rechazada se
    /// descartan.
    ///
    /// Bytes que no son UTF-8 se reemplazan por `U+FFFD`.
    pub fn read_line_limited(&mut self, limit: usize) -> io::Result<Option<String>> {
        let line = self.read_line_bytes(limit)?;
        Ok(line.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Lee una línea como bytes crudos, sin decodificar.
    ///
    /// Mismas reglas de fin de stream y de límite que `read_line_limited`.
    pub fn read_line_bytes(&mut self, limit: usize) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();

        loop {
            let available = match self.fill_buf() {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            // Fin del stream
            if available.is_empty() {
                break;
            }

            let (found, used) = match available.iter().position(|&b| b == b'\n') {
                Some(i) => (true, i + 1),
                None => (false, available.len()),
            };

            if line.len() + used > limit {
                self.consume(used);
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("line exceeds {} bytes", limit),
                ));
            }

            line.extend_from_slice(&available[..used]);
            self.consume(used);

            if found {
                break;
            }
        }

        if line.is_empty() {
            return Ok(None);
        }

        Ok(Some(line))
    }

    /// Copia hasta `n` bytes hacia `out`, primero desde el look-ahead y
    /// luego desde el stream, a través de un buffer acotado.
    ///
    /// Retorna cuántos bytes se copiaron: menos de `n` solo si el stream
    /// terminó antes.
    pub fn copy_exact<W: Write + ?Sized>(&mut self, n: u64, out: &mut W) -> io::Result<u64> {
        io::copy(&mut Read::take(&mut *self, n), out)
    }

    /// Lee exactamente `n` bytes en memoria.
    ///
    /// Falla con `UnexpectedEof` si el stream termina antes.
    pub fn read_exact_bytes(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(n.min(64 * 1024));
        let copied = self.copy_exact(n as u64, &mut bytes)?;

        if copied < n as u64 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {} bytes, stream ended after {}", n, copied),
            ));
        }

        Ok(bytes)
    }

    /// Total de bytes entregados hasta ahora (líneas + body)
    pub fn bytes_consumed(&self) -> u64 {
        self.consumed
    }

    /// Bytes leídos del stream que todavía no se entregaron
    #[cfg(test)]
    pub(crate) fn buffered(&self) -> &[u8] {
        &self.buf[self.pos..self.filled]
    }
}

impl<R: Read> Read for LineReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        // Sin look-ahead pendiente y un destino grande: leer directo
        if self.pos == self.filled && out.len() >= self.buf.len() {
            let n = self.inner.read(out)?;
            self.consumed += n as u64;
            return Ok(n);
        }

        let available = self.fill_buf()?;
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl<R: Read> BufRead for LineReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pos >= self.filled {
            self.filled = self.inner.read(&mut self.buf)?;
            self.pos = 0;
        }
        Ok(&self.buf[self.pos..self.filled])
    }

    fn consume(&mut self, amt: usize) {
        let amt = amt.min(self.filled - self.pos);
        self.pos += amt;
        self.consumed += amt as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stream que entrega un byte por lectura
    struct Trickle<'a> {
        data: &'a [u8],
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() || out.is_empty() {
                return Ok(0);
            }
            out[0] = self.data[0];
            self.data = &self.data[1..];
            Ok(1)
        }
    }

    /// Stream que falla en la primera lectura
    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _out: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    #[test]
    fn test_read_lines_keep_crlf() {
        let mut reader = LineReader::new(&b"one\r\ntwo\r\n\r\n"[..]);

        assert_eq!(reader.read_line().unwrap().as_deref(), Some("one\r\n"));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("two\r\n"));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("\r\n"));
        assert_eq!(reader.read_line().unwrap(), None);
    }

    #[test]
    fn test_last_line_without_newline() {
        let mut reader = LineReader::new(&b"first\r\npartial"[..]);

        assert_eq!(reader.read_line().unwrap().as_deref(), Some("first\r\n"));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("partial"));
        assert_eq!(reader.read_line().unwrap(), None);
    }

    #[test]
    fn test_empty_stream() {
        let mut reader = LineReader::new(&b""[..]);
        assert_eq!(reader.read_line().unwrap(), None);
        assert_eq!(reader.bytes_consumed(), 0);
    }

    #[test]
    fn test_line_spanning_small_buffer() {
        // Buffer de 3 bytes: la línea necesita varias lecturas físicas
        let mut reader = LineReader::with_capacity(3, &b"User-Agent: curl\r\nX"[..]);

        assert_eq!(reader.read_line().unwrap().as_deref(), Some("User-Agent: curl\r\n"));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("X"));
    }

    #[test]
    fn test_line_limit() {
        let mut reader = LineReader::new(&b"0123456789\r\n"[..]);
        let err = reader.read_line_limited(5).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_line_exactly_at_limit() {
        let mut reader = LineReader::new(&b"abc\r\n"[..]);
        assert_eq!(reader.read_line_limited(5).unwrap().as_deref(), Some("abc\r\n"));
    }

    #[test]
    fn test_read_line_bytes_keeps_raw_bytes() {
        let mut reader = LineReader::new(&b"a\xffb\r\nrest"[..]);

        assert_eq!(reader.read_line_bytes(64).unwrap(), Some(b"a\xffb\r\n".to_vec()));
        assert_eq!(reader.buffered(), b"rest");
    }

    #[test]
    fn test_exact_read_uses_lookahead_first() {
        let raw = b"POST /files/a HTTP/1.1\r\n\r\nhelloEXTRA";
        let mut reader = LineReader::new(&raw[..]);

        reader.read_line().unwrap();
        reader.read_line().unwrap();

        // Todo el body ya está en el buffer como look-ahead
        assert_eq!(reader.buffered(), b"helloEXTRA");

        let body = reader.read_exact_bytes(5).unwrap();
        assert_eq!(body, b"hello");

        // Lo que sigue no se perdió ni se duplicó
        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"EXTRA");
    }

    #[test]
    fn test_exact_read_across_many_physical_reads() {
        let raw = b"Content-Length: 11\r\n\r\nhello world!!";
        let mut reader = LineReader::with_capacity(4, Trickle { data: raw });

        assert_eq!(reader.read_line().unwrap().as_deref(), Some("Content-Length: 11\r\n"));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("\r\n"));

        let mut out = Vec::new();
        let copied = reader.copy_exact(11, &mut out).unwrap();

        assert_eq!(copied, 11);
        assert_eq!(out, b"hello world");
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("!!"));
    }

    #[test]
    fn test_copy_exact_short_stream() {
        let mut reader = LineReader::new(&b"abc"[..]);
        let mut out = Vec::new();

        let copied = reader.copy_exact(10, &mut out).unwrap();
        assert_eq!(copied, 3);
        assert_eq!(out, b"abc");
    }

    #[test]
    fn test_read_exact_bytes_short_stream() {
        let mut reader = LineReader::new(&b"abc"[..]);
        let err = reader.read_exact_bytes(4).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_copy_zero_bytes() {
        let mut reader = LineReader::new(&b"data"[..]);
        let mut out = Vec::new();

        assert_eq!(reader.copy_exact(0, &mut out).unwrap(), 0);
        assert!(out.is_empty());
        assert_eq!(reader.bytes_consumed(), 0);
    }

    #[test]
    fn test_bytes_consumed_counts_both_modes() {
        let mut reader = LineReader::new(&b"ab\r\ncdef"[..]);

        reader.read_line().unwrap();
        assert_eq!(reader.bytes_consumed(), 4);

        reader.read_exact_bytes(3).unwrap();
        assert_eq!(reader.bytes_consumed(), 7);
    }

    #[test]
    fn test_read_error_is_reported() {
        let mut reader = LineReader::new(Broken);
        let err = reader.read_line().unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert_eq!(reader.bytes_consumed(), 0);
    }
}

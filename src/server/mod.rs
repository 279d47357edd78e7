//! Placeholder HTTP listener shipped with the `falsedb` binary.
//!
//! Answers every request with an empty `200 OK` and permissive CORS and
//! caching headers. It never touches the driver.

mod args;

use std::net::SocketAddr;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

pub use args::{Args, DEFAULT_PORT};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Headers sent with every response.
pub const RESPONSE_HEADERS: [(&str, &str); 6] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "*"),
    ("Access-Control-Allow-Headers", "*"),
    ("Access-Control-Expose-Headers", "*"),
    ("Access-Control-Max-Age", "86400"),
    ("Cache-Control", "public, max-age=31536000, immutable"),
];

const MAX_HEADERS: usize = 64;
const MAX_REQUEST_SIZE: usize = 1024 * 1024;
const INITIAL_BUF_SIZE: usize = 4096;

pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl Server {
    /// # Errors
    /// Returns [`ServerError::Bind`] if the address cannot be bound.
    pub async fn bind(addr: impl AsRef<str>) -> Result<Self, ServerError> {
        let addr = addr.as_ref();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.to_owned(),
                source: e,
            })?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
        })
    }

    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept connections until the process ends.
    ///
    /// # Errors
    /// Never returns an error today; accept failures are logged and skipped.
    pub async fn run(self) -> Result<(), ServerError> {
        info!(address = %self.local_addr, "falsedb listening");
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(pair) => pair,
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                    continue;
                }
            };
            debug!(%peer, "connection accepted");
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, peer).await {
                    warn!(%peer, error = %e, "connection closed with error");
                }
            });
        }
    }
}

/// What to do with the bytes buffered so far.
#[derive(Debug, PartialEq, Eq)]
enum Parsed {
    /// Need more bytes.
    Partial,
    /// A full request of `len` bytes, and whether the peer wants to keep the connection.
    Complete { len: usize, keep_alive: bool },
    Invalid,
}

fn parse_request(buf: &[u8]) -> Parsed {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut headers);
    let head_len = match req.parse(buf) {
        Ok(httparse::Status::Complete(n)) => n,
        Ok(httparse::Status::Partial) => return Parsed::Partial,
        Err(_) => return Parsed::Invalid,
    };

    let mut content_length = 0usize;
    // HTTP/1.1 keeps the connection by default, HTTP/1.0 closes it
    let mut keep_alive = req.version == Some(1);
    for header in req.headers.iter() {
        let value = std::str::from_utf8(header.value).unwrap_or("").trim();
        if header.name.eq_ignore_ascii_case("content-length") {
            match value.parse() {
                Ok(n) => content_length = n,
                Err(_) => return Parsed::Invalid,
            }
        } else if header.name.eq_ignore_ascii_case("connection") {
            if value.eq_ignore_ascii_case("close") {
                keep_alive = false;
            } else if value.eq_ignore_ascii_case("keep-alive") {
                keep_alive = true;
            }
        }
    }

    let len = head_len + content_length;
    if buf.len() < len {
        return Parsed::Partial;
    }
    Parsed::Complete { len, keep_alive }
}

/// Serialize a response with an empty body and the fixed header set.
#[must_use]
pub fn response_bytes(status: u16, reason: &str, keep_alive: bool) -> Vec<u8> {
    let mut out = format!("HTTP/1.1 {status} {reason}\r\n");
    for (name, value) in RESPONSE_HEADERS {
        out.push_str(&format!("{name}: {value}\r\n"));
    }
    out.push_str("Content-Length: 0\r\n");
    if !keep_alive {
        out.push_str("Connection: close\r\n");
    }
    out.push_str("\r\n");
    out.into_bytes()
}

async fn handle_connection(mut stream: TcpStream, peer: SocketAddr) -> Result<(), std::io::Error> {
    let mut buf: Vec<u8> = Vec::with_capacity(INITIAL_BUF_SIZE);
    loop {
        // drain every complete request already buffered before reading again
        match parse_request(&buf) {
            Parsed::Complete { len, keep_alive } => {
                stream
                    .write_all(&response_bytes(200, "OK", keep_alive))
                    .await?;
                buf.drain(..len);
                if !keep_alive {
                    break;
                }
                continue;
            }
            Parsed::Invalid => {
                warn!(%peer, "bad request");
                stream
                    .write_all(&response_bytes(400, "Bad Request", false))
                    .await?;
                break;
            }
            Parsed::Partial => {}
        }

        if buf.len() > MAX_REQUEST_SIZE {
            stream
                .write_all(&response_bytes(413, "Payload Too Large", false))
                .await?;
            break;
        }
        if stream.read_buf(&mut buf).await? == 0 {
            debug!(%peer, "connection closed by peer");
            break;
        }
    }
    stream.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_is_partial() {
        assert_eq!(parse_request(b""), Parsed::Partial);
        assert_eq!(parse_request(b"GET / HTTP/1.1\r\nHost: x\r\n"), Parsed::Partial);
    }

    #[test]
    fn complete_request_includes_body() {
        let req = b"POST /q HTTP/1.1\r\nContent-Length: 4\r\n\r\nbody";
        assert_eq!(
            parse_request(req),
            Parsed::Complete {
                len: req.len(),
                keep_alive: true
            }
        );
        assert_eq!(parse_request(&req[..req.len() - 1]), Parsed::Partial);
    }

    #[test]
    fn http10_and_connection_close_end_the_connection() {
        let close = b"GET / HTTP/1.1\r\nConnection: close\r\n\r\n";
        assert!(matches!(
            parse_request(close),
            Parsed::Complete {
                keep_alive: false,
                ..
            }
        ));
        let old = b"GET / HTTP/1.0\r\n\r\n";
        assert!(matches!(
            parse_request(old),
            Parsed::Complete {
                keep_alive: false,
                ..
            }
        ));
    }

    #[test]
    fn garbage_is_invalid() {
        assert_eq!(parse_request(b"\x00\x01 nope\r\n\r\n"), Parsed::Invalid);
    }

    #[test]
    fn response_carries_fixed_headers_and_empty_body() {
        let text = String::from_utf8(response_bytes(200, "OK", true)).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Access-Control-Allow-Origin: *\r\n"));
        assert!(text.contains("Access-Control-Max-Age: 86400\r\n"));
        assert!(text.contains("Cache-Control: public, max-age=31536000, immutable\r\n"));
        assert!(text.ends_with("Content-Length: 0\r\n\r\n"));
    }
}

//! Stream transport: writes its own HTTP/1.0 request over a `TcpStream`.
//!
//! # Design
//! A call runs in two phases. `create_stream_context` turns the header list
//! into a `StreamContext` (method, rendered header block, body) without
//! touching the network, so header errors surface before any I/O.
//! `StreamHandle::open` then connects, writes the request and checks the
//! status line; `read_body` drains the rest. The handle shuts its socket
//! down when dropped.
//!
//! `https://` targets run the same exchange inside a rustls session,
//! trusting the webpki root set.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use http::Uri;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};

use crate::adapter::HttpAdapter;
use crate::config::TransportConfig;
use crate::error::AdapterError;
use crate::headers::{rationalize_headers, HeaderEntry, RationalizedHeaders};
use crate::http::{fix_url, HttpMethod};

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Method, header block and body for one stream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamContext {
    pub method: HttpMethod,
    /// `"Key: Value\r\n"` lines; `None` when there are no headers.
    pub header_block: Option<String>,
    /// Present for POST only.
    pub content: Option<String>,
}

impl StreamContext {
    fn from_headers(method: HttpMethod, headers: &RationalizedHeaders, content: Option<&str>) -> Self {
        let header_block = if headers.is_empty() {
            None
        } else {
            Some(headers.to_header_block())
        };
        Self {
            method,
            header_block,
            content: content.map(str::to_string),
        }
    }

    fn has_header(&self, name: &str) -> bool {
        self.header_block.as_deref().is_some_and(|block| {
            block.split("\r\n").any(|line| {
                line.split_once(':')
                    .is_some_and(|(key, _)| key.eq_ignore_ascii_case(name))
            })
        })
    }
}

/// Rationalize `headers` and, for POST, add `Content-Length` and
/// `Content-type` unless the caller already set them (in any case).
///
/// `Content-Length` counts UTF-8 bytes, matching what goes on the wire.
pub fn rationalize_request_headers(
    method: HttpMethod,
    headers: &[HeaderEntry],
    body: &str,
) -> Result<RationalizedHeaders, AdapterError> {
    let mut rationalized = rationalize_headers(headers)?;
    if method == HttpMethod::Post {
        if !rationalized.contains_key_ignore_case("Content-Length") {
            rationalized.insert("Content-Length", body.len().to_string());
        }
        if !rationalized.contains_key_ignore_case("Content-type") {
            rationalized.insert("Content-type", FORM_URLENCODED);
        }
    }
    Ok(rationalized)
}

/// Build the request context for `method`. `body` is ignored for GET.
pub fn create_stream_context(
    method: HttpMethod,
    headers: &[HeaderEntry],
    body: &str,
) -> Result<StreamContext, AdapterError> {
    let rationalized = rationalize_request_headers(method, headers, body)?;
    let content = match method {
        HttpMethod::Get => None,
        HttpMethod::Post => Some(body),
    };
    Ok(StreamContext::from_headers(method, &rationalized, content))
}

/// Transport that opens a socket per call and speaks HTTP/1.0 on it.
///
/// A status of 400 or above fails the open, like any other I/O failure.
#[derive(Debug, Clone, Default)]
pub struct StreamTransport {
    config: TransportConfig,
}

impl StreamTransport {
    pub const NAME: &'static str = "stream";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TransportConfig) -> Self {
        Self { config }
    }

    fn call(&self, url: &str, context: &StreamContext) -> Result<Vec<u8>, AdapterError> {
        let url = fix_url(url);
        let mut handle = StreamHandle::open(&url, context, self.config.timeout)?;
        handle.read_body()
    }
}

impl HttpAdapter for StreamTransport {
    fn fetch(&self, url: &str, headers: &[HeaderEntry]) -> Result<Vec<u8>, AdapterError> {
        let context = create_stream_context(HttpMethod::Get, headers, "")?;
        self.call(url, &context)
    }

    fn submit(
        &self,
        url: &str,
        headers: &[HeaderEntry],
        body: &str,
    ) -> Result<Vec<u8>, AdapterError> {
        let context = create_stream_context(HttpMethod::Post, headers, body)?;
        self.call(url, &context)
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

/// An open response stream, positioned at the start of the body.
pub struct StreamHandle {
    url: String,
    reader: BufReader<Connection>,
    content_length: Option<u64>,
}

impl StreamHandle {
    /// Connect to `url`, send the request described by `context` and read
    /// the response head.
    pub fn open(
        url: &str,
        context: &StreamContext,
        timeout: Option<Duration>,
    ) -> Result<Self, AdapterError> {
        let open_failed = |reason: String| {
            AdapterError::Transport(format!("stream transport failed to open {url}: {reason}"))
        };

        let target = Target::parse(url).map_err(open_failed)?;
        let head = serialize_request_head(&target, context);
        log::debug!("stream request head = {head:?}");

        let stream = connect(&target, timeout).map_err(|e| open_failed(e.to_string()))?;
        let mut connection = if target.tls {
            Connection::tls(&target.host, stream).map_err(open_failed)?
        } else {
            Connection::Plain(stream)
        };
        write_request(&mut connection, &head, context.content.as_deref())
            .map_err(|e| open_failed(e.to_string()))?;

        let mut reader = BufReader::new(connection);
        let status_line = read_line(&mut reader).map_err(|e| open_failed(e.to_string()))?;
        log::debug!("stream response status line = {status_line:?}");
        let status = parse_status_line(&status_line).map_err(open_failed)?;
        if status >= 400 {
            return Err(open_failed(status_line));
        }
        let content_length = read_content_length(&mut reader).map_err(|e| open_failed(e.to_string()))?;

        Ok(Self {
            url: url.to_string(),
            reader,
            content_length,
        })
    }

    /// Read the whole body. With a declared `Content-Length`, exactly that
    /// many bytes are expected; otherwise the body runs until EOF.
    pub fn read_body(&mut self) -> Result<Vec<u8>, AdapterError> {
        let read_failed = |reason: String| {
            AdapterError::Transport(format!(
                "stream transport failed to read {}: {reason}",
                self.url
            ))
        };

        let mut body = Vec::new();
        match self.content_length {
            Some(expected) => {
                (&mut self.reader)
                    .take(expected)
                    .read_to_end(&mut body)
                    .map_err(|e| read_failed(e.to_string()))?;
                if (body.len() as u64) < expected {
                    return Err(read_failed(format!(
                        "connection closed after {} of {expected} bytes",
                        body.len()
                    )));
                }
            }
            None => {
                self.reader
                    .read_to_end(&mut body)
                    .map_err(|e| read_failed(e.to_string()))?;
            }
        }
        Ok(body)
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        log::trace!("closing stream to {}", self.url);
        self.reader.get_mut().close();
    }
}

/// The socket under a `StreamHandle`, with or without TLS.
enum Connection {
    Plain(TcpStream),
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
}

impl Connection {
    /// Wrap `stream` in a client session for `host`. The handshake runs on
    /// the first write.
    fn tls(host: &str, stream: TcpStream) -> Result<Self, String> {
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| format!("invalid tls server name {host}: {e}"))?;
        let session = ClientConnection::new(tls_config()?, server_name)
            .map_err(|e| format!("tls setup failed: {e}"))?;
        Ok(Connection::Tls(Box::new(StreamOwned::new(session, stream))))
    }

    fn close(&mut self) {
        match self {
            Connection::Plain(stream) => {
                let _ = stream.shutdown(Shutdown::Both);
            }
            Connection::Tls(tls) => {
                tls.conn.send_close_notify();
                let _ = tls.flush();
                let _ = tls.sock.shutdown(Shutdown::Both);
            }
        }
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Connection::Plain(stream) => stream.read(buf),
            // Servers often close without close_notify; a short body is
            // still caught through Content-Length.
            Connection::Tls(tls) => match tls.read(buf) {
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(0),
                other => other,
            },
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Connection::Plain(stream) => stream.write(buf),
            Connection::Tls(tls) => tls.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Connection::Plain(stream) => stream.flush(),
            Connection::Tls(tls) => tls.flush(),
        }
    }
}

fn tls_config() -> Result<Arc<ClientConfig>, String> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let config =
        ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()
            .map_err(|e| format!("tls setup failed: {e}"))?
            .with_root_certificates(roots)
            .with_no_client_auth();
    Ok(Arc::new(config))
}

/// The parts of a fixed URL the stream transport needs.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    tls: bool,
    host: String,
    port: u16,
    /// Value for the `Host` header: the host plus an explicit port, if any.
    authority: String,
    path_and_query: String,
}

impl Target {
    fn parse(url: &str) -> Result<Self, String> {
        let uri: Uri = url.parse().map_err(|e| format!("invalid url: {e}"))?;
        let (tls, default_port) = match uri.scheme_str() {
            Some("http") => (false, 80),
            Some("https") => (true, 443),
            Some(other) => return Err(format!("unsupported scheme {other}")),
            None => return Err("missing scheme".to_string()),
        };
        let host = uri.host().ok_or_else(|| "missing host".to_string())?;
        let authority = match uri.port_u16() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let path = match uri.path() {
            "" => "/",
            path => path,
        };
        let path_and_query = match uri.query() {
            Some(query) => format!("{path}?{query}"),
            None => path.to_string(),
        };
        Ok(Self {
            tls,
            host: host.trim_start_matches('[').trim_end_matches(']').to_string(),
            port: uri.port_u16().unwrap_or(default_port),
            authority,
            path_and_query,
        })
    }
}

fn serialize_request_head(target: &Target, context: &StreamContext) -> String {
    let mut head = format!(
        "{} {} HTTP/1.0\r\n",
        context.method.as_str(),
        target.path_and_query
    );
    if !context.has_header("Host") {
        head.push_str(&format!("Host: {}\r\n", target.authority));
    }
    head.push_str("Connection: close\r\n");
    if let Some(block) = &context.header_block {
        head.push_str(block);
    }
    head.push_str("\r\n");
    head
}

fn connect(target: &Target, timeout: Option<Duration>) -> io::Result<TcpStream> {
    let addr = (target.host.as_str(), target.port);
    let stream = match timeout {
        None => TcpStream::connect(addr)?,
        Some(timeout) => {
            let mut last_err = None;
            let mut connected = None;
            for candidate in addr.to_socket_addrs()? {
                match TcpStream::connect_timeout(&candidate, timeout) {
                    Ok(stream) => {
                        connected = Some(stream);
                        break;
                    }
                    Err(e) => last_err = Some(e),
                }
            }
            match connected {
                Some(stream) => stream,
                None => {
                    return Err(last_err.unwrap_or_else(|| {
                        io::Error::new(io::ErrorKind::NotFound, "host resolved to no address")
                    }))
                }
            }
        }
    };
    stream.set_read_timeout(timeout)?;
    stream.set_write_timeout(timeout)?;
    Ok(stream)
}

fn write_request(stream: &mut impl Write, head: &str, content: Option<&str>) -> io::Result<()> {
    stream.write_all(head.as_bytes())?;
    if let Some(content) = content {
        stream.write_all(content.as_bytes())?;
    }
    stream.flush()
}

fn read_line(reader: &mut impl BufRead) -> io::Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed before the response head",
        ));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Consume response headers up to the blank line, keeping `Content-Length`.
fn read_content_length(reader: &mut impl BufRead) -> io::Result<Option<u64>> {
    let mut content_length = None;
    loop {
        let line = read_line(reader)?;
        if line.is_empty() {
            return Ok(content_length);
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("Content-Length") {
                content_length = value.trim().parse().ok();
            }
        }
    }
}

/// `"HTTP/1.1 200 OK"` -> `200`.
fn parse_status_line(line: &str) -> Result<u16, String> {
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/") {
        return Err(format!("malformed status line {line:?}"));
    }
    parts
        .next()
        .and_then(|code| code.parse().ok())
        .ok_or_else(|| format!("malformed status line {line:?}"))
}

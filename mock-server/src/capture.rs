//! One-shot raw TCP listener that records a single request verbatim.
//!
//! Unlike the axum app, nothing here normalizes header names or ordering,
//! so tests can assert on the exact header block a transport wrote.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

/// Canned reply used by most capture tests.
pub const OK_RESPONSE: &[u8] = b"HTTP/1.0 200 OK\r\nContent-Length: 2\r\n\r\nok";

/// The request head and body exactly as received.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub head: String,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn request_line(&self) -> &str {
        self.head.split("\r\n").next().unwrap_or_default()
    }

    /// Header lines in the order they were sent, without the request line.
    pub fn header_lines(&self) -> Vec<&str> {
        self.head
            .split("\r\n")
            .skip(1)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

/// Bind a random local port, accept one connection, record its request and
/// answer with `response`.
pub fn capture_once(
    response: &'static [u8],
) -> io::Result<(SocketAddr, JoinHandle<io::Result<CapturedRequest>>)> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept()?;
        let captured = read_request(&mut stream)?;
        stream.write_all(response)?;
        stream.flush()?;
        Ok(captured)
    });
    Ok((addr, handle))
}

/// Accept one connection, keep whatever arrives in its first read and hang
/// up without answering. Useful for handshakes that never form an HTTP head.
pub fn first_bytes_once() -> io::Result<(SocketAddr, JoinHandle<io::Result<Vec<u8>>>)> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept()?;
        let mut chunk = [0u8; 4096];
        let n = stream.read(&mut chunk)?;
        Ok(chunk[..n].to_vec())
    });
    Ok((addr, handle))
}

/// An address nothing listens on: bound once, then released.
pub fn unreachable_addr() -> io::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    listener.local_addr()
}

fn read_request(stream: &mut TcpStream) -> io::Result<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let head_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos;
        }
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before end of request head",
            ));
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let mut body = buf[head_end + 4..].to_vec();
    let declared = content_length(&head).unwrap_or(0);
    while body.len() < declared {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    Ok(CapturedRequest { head, body })
}

fn content_length(head: &str) -> Option<usize> {
    head.split("\r\n").skip(1).find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

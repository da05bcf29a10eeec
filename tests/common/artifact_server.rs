//! Minimal HTTP/1.1 artifact repository for integration tests.
//!
//! Serves one binary at every path. `Accept: application/json` gets the
//! checksum manifest, anything else gets the binary bytes, the same content
//! negotiation the real repository performs.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    /// Digest to publish instead of the binary's real one.
    pub declared_digest: Option<String>,
    /// Answer the first N requests with 503.
    pub fail_first: usize,
    /// Answer every request with this status and an empty body.
    pub status: Option<u16>,
}

/// Counters shared with the server thread.
#[derive(Debug, Default)]
pub struct RequestLog {
    pub manifest: AtomicUsize,
    pub binary: AtomicUsize,
}

impl RequestLog {
    pub fn manifest_requests(&self) -> usize {
        self.manifest.load(Ordering::SeqCst)
    }

    pub fn binary_requests(&self) -> usize {
        self.binary.load(Ordering::SeqCst)
    }
}

pub struct ArtifactServer {
    /// Artifact root, e.g. "http://127.0.0.1:12345/artifactory"
    pub root: String,
    pub requests: Arc<RequestLog>,
}

/// Start a server publishing `binary` with its correct digest.
pub fn start(binary: Vec<u8>) -> ArtifactServer {
    start_with_options(binary, ServerOptions::default())
}

/// Start a server in a background thread. It runs until the process exits.
pub fn start_with_options(binary: Vec<u8>, opts: ServerOptions) -> ArtifactServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();

    let digest = opts
        .declared_digest
        .clone()
        .unwrap_or_else(|| usi_launcher::test_utils::sha256_hex(&binary));
    let manifest = Arc::new(usi_launcher::test_utils::manifest_json(&digest));
    let binary = Arc::new(binary);
    let requests = Arc::new(RequestLog::default());
    let served = Arc::new(AtomicUsize::new(0));

    let log = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let binary = Arc::clone(&binary);
            let manifest = Arc::clone(&manifest);
            let log = Arc::clone(&log);
            let served = Arc::clone(&served);
            let opts = opts.clone();
            thread::spawn(move || handle(stream, &binary, &manifest, &log, &served, &opts));
        }
    });

    ArtifactServer {
        root: format!("http://127.0.0.1:{port}/artifactory"),
        requests,
    }
}

/// An artifact root nothing listens on.
pub fn unreachable_root() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/artifactory")
}

fn handle(
    mut stream: TcpStream,
    binary: &[u8],
    manifest: &str,
    log: &RequestLog,
    served: &AtomicUsize,
    opts: &ServerOptions,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));

    let Some(request) = read_head(&mut stream) else {
        return;
    };
    let wants_json = accepts_json(&request);
    if wants_json {
        log.manifest.fetch_add(1, Ordering::SeqCst);
    } else {
        log.binary.fetch_add(1, Ordering::SeqCst);
    }

    let index = served.fetch_add(1, Ordering::SeqCst);
    if let Some(status) = opts.status {
        write_response(&mut stream, status, "text/plain", b"");
        return;
    }
    if index < opts.fail_first {
        write_response(&mut stream, 503, "text/plain", b"busy");
        return;
    }

    if wants_json {
        write_response(&mut stream, 200, "application/json", manifest.as_bytes());
    } else {
        write_response(&mut stream, 200, "application/octet-stream", binary);
    }
}

fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        head.extend_from_slice(&buf[..n]);
    }
    String::from_utf8(head).ok()
}

fn accepts_json(request: &str) -> bool {
    request.lines().skip(1).any(|line| {
        line.split_once(':').is_some_and(|(name, value)| {
            name.trim().eq_ignore_ascii_case("accept") && value.contains("application/json")
        })
    })
}

fn write_response(stream: &mut TcpStream, status: u16, content_type: &str, body: &[u8]) {
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        503 => "Service Unavailable",
        _ => "Error",
    };
    let head = format!(
        "HTTP/1.1 {status} {reason}\r\n\
         Content-Type: {content_type}\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

//! Minimal HTTP/1.1 server with canned routes for integration tests.
//!
//! Matches requests on method + path, answers with a fixed response, and
//! records every request so tests can assert on what the client sent.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// One canned reply.
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub content_type: &'static str,
    /// When false the response omits Content-Length; the body is delimited
    /// by connection close, so its total size is unknown to the client.
    pub declare_length: bool,
    /// Write the body in pieces of this size with a pause between them.
    pub chunk: Option<(usize, Duration)>,
}

impl CannedResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.as_bytes().to_vec(),
            content_type: "application/json",
            declare_length: true,
            chunk: None,
        }
    }

    pub fn bytes(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            body,
            content_type: "application/octet-stream",
            declare_length: true,
            chunk: None,
        }
    }

    pub fn status_only(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            content_type: "text/plain",
            declare_length: true,
            chunk: None,
        }
    }

    pub fn without_length(mut self) -> Self {
        self.declare_length = false;
        self
    }

    pub fn chunked(mut self, piece: usize, pause: Duration) -> Self {
        self.chunk = Some((piece, pause));
        self
    }
}

/// A request as the server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Vec<u8>,
}

struct Route {
    method: &'static str,
    path: String,
    response: CannedResponse,
}

/// Builder for a canned server; call `route` for each endpoint, then `start`.
pub struct ApiServer {
    routes: Vec<Route>,
}

pub struct ServerHandle {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ServerHandle {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ApiServer {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn route(mut self, method: &'static str, path: &str, response: CannedResponse) -> Self {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            response,
        });
        self
    }

    /// Starts the server on a free port in a background thread. Returns the
    /// base URL. The server runs until the process exits.
    pub fn start(self) -> ServerHandle {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let routes = Arc::new(self.routes);
        let log = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                let log = Arc::clone(&log);
                thread::spawn(move || handle(stream, &routes, &log));
            }
        });
        ServerHandle {
            base_url: format!("http://127.0.0.1:{}/", port),
            requests,
        }
    }
}

fn handle(mut stream: TcpStream, routes: &[Route], log: &Mutex<Vec<RecordedRequest>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    log.lock().unwrap().push(request.clone());

    let found = routes
        .iter()
        .find(|r| r.method.eq_ignore_ascii_case(&request.method) && r.path == request.path);
    let Some(route) = found else {
        let _ = stream.write_all(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        return;
    };
    let resp = &route.response;
    let mut head = format!("HTTP/1.1 {} {}\r\n", resp.status, reason(resp.status));
    head.push_str(&format!("Content-Type: {}\r\n", resp.content_type));
    if resp.declare_length {
        head.push_str(&format!("Content-Length: {}\r\n", resp.body.len()));
    }
    head.push_str("Connection: close\r\n\r\n");
    let _ = stream.write_all(head.as_bytes());
    match resp.chunk {
        Some((piece, pause)) => {
            for part in resp.body.chunks(piece.max(1)) {
                if stream.write_all(part).is_err() {
                    return;
                }
                let _ = stream.flush();
                thread::sleep(pause);
            }
        }
        None => {
            let _ = stream.write_all(&resp.body);
        }
    }
}

fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut raw = Vec::new();
    let mut buf = [0u8; 8192];
    let header_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        raw.extend_from_slice(&buf[..n]);
        if let Some(pos) = find_header_end(&raw) {
            break pos;
        }
        if raw.len() > 64 * 1024 {
            return None;
        }
    };
    let head = std::str::from_utf8(&raw[..header_end]).ok()?;
    let mut lines = head.lines();
    let request_line = lines.next()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();
    let mut authorization = None;
    let mut content_length = 0usize;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if name.eq_ignore_ascii_case("authorization") {
                authorization = Some(value.trim().to_string());
            } else if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = raw[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
    }
    body.truncate(content_length);
    Some(RecordedRequest {
        method,
        path,
        authorization,
        body,
    })
}

fn find_header_end(raw: &[u8]) -> Option<usize> {
    raw.windows(4).position(|w| w == b"\r\n\r\n")
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

//! Shared utilities for integration tests.

use std::net::SocketAddr;

use bare_http::config::ServerConfig;
use bare_http::net::{Listener, ListenerError};
use bare_http::{HttpServer, Router, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A server running on an ephemeral port.
///
/// Keep it alive for the whole test: dropping `shutdown` stops the accept loop.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), ListenerError>>,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Bind to 127.0.0.1:0 and start serving `router`.
pub async fn start_server(config: ServerConfig, router: Router) -> TestServer {
    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = tcp.local_addr().unwrap();
    let listener = Listener::from_tcp(tcp, config.listener.max_connections);

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, router);
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// Write raw bytes and read until the server closes the connection.
#[allow(dead_code)]
pub async fn raw_request(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    response
}

/// A response re-parsed with a generic HTTP parser.
#[allow(dead_code)]
#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

#[allow(dead_code)]
impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Parse a complete response; panics if it is not well-formed.
#[allow(dead_code)]
pub fn parse_response(bytes: &[u8]) -> RawResponse {
    let mut headers = [httparse::EMPTY_HEADER; 32];
    let mut res = httparse::Response::new(&mut headers);
    let head_len = match res.parse(bytes).expect("malformed response") {
        httparse::Status::Complete(len) => len,
        httparse::Status::Partial => panic!("incomplete response: {:?}", String::from_utf8_lossy(bytes)),
    };

    let headers: Vec<(String, String)> = res
        .headers
        .iter()
        .map(|h| (h.name.to_string(), String::from_utf8_lossy(h.value).into_owned()))
        .collect();
    let body = bytes[head_len..].to_vec();

    let declared: usize = headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
        .expect("Content-Length missing")
        .1
        .parse()
        .unwrap();
    assert_eq!(declared, body.len(), "Content-Length does not match body");

    RawResponse {
        status: res.code.unwrap(),
        reason: res.reason.unwrap_or_default().to_string(),
        headers,
        body,
    }
}

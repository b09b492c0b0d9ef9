//! Minimal HTTP endpoint reporting service health.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use treecko_core::health::{not_found_body, HEALTH_PATH};
use treecko_core::HealthStatus;

/// Upper bound on the request line plus headers.
const MAX_REQUEST_BYTES: u64 = 8 * 1024;

const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Produces the current health status for each request.
pub type StatusProvider = Arc<dyn Fn() -> HealthStatus + Send + Sync>;

/// Serves `GET /health`; every other request gets a JSON 404.
pub struct HealthServer {
    listener: TcpListener,
    status: StatusProvider,
    read_timeout: Duration,
}

impl HealthServer {
    /// Bind to `0.0.0.0:port`. Port 0 picks a free port.
    pub async fn bind(port: u16, status: StatusProvider) -> std::io::Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port)).await?;
        Ok(Self {
            listener,
            status,
            read_timeout: DEFAULT_READ_TIMEOUT,
        })
    }

    /// How long a client may take to send its request head.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the task is dropped.
    pub async fn serve(self) -> std::io::Result<()> {
        info!("Health check server started on {}", self.local_addr()?);

        loop {
            let (stream, peer) = self.listener.accept().await?;
            let status = Arc::clone(&self.status);
            let read_timeout = self.read_timeout;
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, status, read_timeout).await {
                    warn!("Health request from {} failed: {}", peer, e);
                }
            });
        }
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    status: StatusProvider,
    read_timeout: Duration,
) -> io::Result<()> {
    let (read_half, mut write_half) = stream.split();
    let mut reader = BufReader::new(read_half.take(MAX_REQUEST_BYTES));

    let request_line = tokio::time::timeout(read_timeout, read_request_head(&mut reader))
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "request head not received in time"))??;

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("");
    debug!(method, path, "Health request");

    let (code, body) = route(method, path, &*status);
    write_half.write_all(render_response(code, &body).as_bytes()).await?;
    write_half.shutdown().await
}

/// Read the request line and drain headers up to the blank line or end of input.
async fn read_request_head<R>(reader: &mut R) -> io::Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    loop {
        let mut header = String::new();
        let read = reader.read_line(&mut header).await?;
        if read == 0 || header.trim().is_empty() {
            break;
        }
    }

    Ok(request_line)
}

/// Status code and JSON body for a request.
pub fn route<F>(method: &str, path: &str, status: F) -> (u16, serde_json::Value)
where
    F: FnOnce() -> HealthStatus,
{
    let path = path.split('?').next().unwrap_or(path);
    if method == "GET" && path == HEALTH_PATH {
        (200, status().to_json())
    } else {
        (404, not_found_body())
    }
}

fn render_response(code: u16, body: &serde_json::Value) -> String {
    let reason = match code {
        200 => "OK",
        _ => "Not Found",
    };
    let body = body.to_string();
    format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        code,
        reason,
        body.len(),
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_route() {
        let (code, body) = route("GET", "/health", || HealthStatus::now(true, false));
        assert_eq!(code, 200);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["checks"]["sheets"], "not_configured");

        let (code, body) = route("GET", "/health?verbose=1", || HealthStatus::now(false, true));
        assert_eq!(code, 200);
        assert_eq!(body["checks"]["database"], "not_connected");

        let (code, body) = route("GET", "/metrics", HealthStatus::default);
        assert_eq!(code, 404);
        assert_eq!(body, not_found_body());

        let (code, _) = route("POST", "/health", HealthStatus::default);
        assert_eq!(code, 404);
    }

    #[test]
    fn test_render_response() {
        let response = render_response(404, &not_found_body());
        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(response.contains("Content-Type: application/json\r\n"));
        assert!(response.ends_with("\r\n\r\n{\"error\":\"Not Found\"}"));
    }

    #[tokio::test]
    async fn test_request_head_is_capped() {
        let mut input = b"GET /health HTTP/1.1\r\nX-Padding: ".to_vec();
        input.extend(std::iter::repeat(b'a').take(64 * 1024));
        let mut reader = BufReader::new(input.as_slice().take(MAX_REQUEST_BYTES));

        let request_line = read_request_head(&mut reader).await.unwrap();
        assert_eq!(request_line, "GET /health HTTP/1.1\r\n");

        // Nothing past the cap is buffered or read.
        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
    }

    #[tokio::test]
    async fn test_idle_client_is_disconnected() {
        let server = HealthServer::bind(0, Arc::new(HealthStatus::default))
            .await
            .unwrap()
            .with_read_timeout(Duration::from_millis(100));
        let port = server.local_addr().unwrap().port();
        let handle = tokio::spawn(server.serve());

        let mut stream = TcpStream::connect(SocketAddr::from(([127, 0, 0, 1], port)))
            .await
            .unwrap();
        let mut response = String::new();
        tokio::time::timeout(Duration::from_secs(5), stream.read_to_string(&mut response))
            .await
            .expect("server should close an idle connection")
            .unwrap();
        assert!(response.is_empty());

        handle.abort();
    }

    async fn request(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", path).as_bytes())
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_serves_health_over_tcp() {
        let server = HealthServer::bind(0, Arc::new(|| HealthStatus::now(true, true)))
            .await
            .unwrap();
        let port = server.local_addr().unwrap().port();
        let handle = tokio::spawn(server.serve());
        let addr = SocketAddr::from(([127, 0, 0, 1], port));

        let response = request(addr, "/health").await;
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("\"status\":\"healthy\""));

        let response = request(addr, "/nope").await;
        assert!(response.starts_with("HTTP/1.1 404 Not Found"));

        handle.abort();
    }
}

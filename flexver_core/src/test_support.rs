//! Shared fixtures for async HTTP tests.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::config::{ReleaseConfig, ServerConfig};
use crate::release::ReleaseClient;

/// Serve one canned `(status, body)` reply per connection, in order.
pub async fn serve(responses: Vec<(u16, &'static str)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let read = socket.read(&mut buf).await.unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..read]);
            }
            let reply = format!(
                "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
    });
    format!("http://{addr}")
}

/// Client with two attempts per request and short timeouts.
pub fn client(server: Option<String>, pypi: &str) -> ReleaseClient {
    let server = ServerConfig {
        base_url: server,
        timeout: 5,
        max_retries: 2,
    };
    let release = ReleaseConfig {
        pypi_url: pypi.to_string(),
        package: "FlexGet".into(),
        timeout: 5,
    };
    ReleaseClient::new(&server, &release).unwrap()
}

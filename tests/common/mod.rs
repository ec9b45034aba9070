//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use elog::{LevelMask, LoggerConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Config that never flushes on its own: huge interval, huge byte threshold,
/// timer effectively idle.
#[allow(dead_code)]
pub fn quiet_config(dir: &Path, prefix: &str) -> LoggerConfig {
    let mut config = LoggerConfig::new(prefix).with_mask(LevelMask::ALL);
    config.directory = dir.to_path_buf();
    config.address = Some("10.0.0.9".to_string());
    config.write_interval_ms = 60_000;
    config.write_buffer_check_bytes = 1 << 20;
    config.tick_interval_ms = 3_600_000;
    config
}

/// Visible (non-hidden) files in `dir`, sorted.
#[allow(dead_code)]
pub fn log_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| !p.file_name().unwrap().to_string_lossy().starts_with('.'))
        .collect();
    files.sort();
    files
}

/// Poll `check` until it holds or `timeout` passes.
#[allow(dead_code)]
pub async fn wait_for<F>(timeout: Duration, check: F) -> bool
where
    F: Fn() -> bool,
{
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}

/// Start a collector that answers every request with 200 and reports
/// the request target (path and query).
#[allow(dead_code)]
pub async fn start_collector() -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    start_programmable_collector(|| async { 200 }).await
}

/// Start a collector whose status code is chosen per request.
#[allow(dead_code)]
pub async fn start_programmable_collector<F, Fut>(f: F) -> (SocketAddr, mpsc::UnboundedReceiver<String>)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = u16> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let f = std::sync::Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let tx = tx.clone();
                    let f = f.clone();
                    tokio::spawn(async move {
                        let head = read_head(&mut socket).await;
                        if let Some(target) = head.lines().next().and_then(|l| l.split_whitespace().nth(1)) {
                            let _ = tx.send(target.to_string());
                        }

                        let status_text = match f().await {
                            200 => "200 OK",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
                            status_text
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

/// Start a collector that accepts connections and never answers.
#[allow(dead_code)]
pub async fn start_silent_collector() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = vec![0u8; 16 * 1024];
    let mut read = 0;
    while read < buf.len() {
        match socket.read(&mut buf[read..]).await {
            Ok(0) | Err(_) => break,
            Ok(n) => read += n,
        }
        if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    String::from_utf8_lossy(&buf[..read]).into_owned()
}

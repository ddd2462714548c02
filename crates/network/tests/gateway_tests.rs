// crates/network/tests/gateway_tests.rs
//! HttpGateway against a canned local HTTP server

use shelfplay_config::{ProgressTarget, ServerConfig};
use shelfplay_core::{ItemId, ProgressRecord, RenditionKind};
use shelfplay_network::{GatewayError, HttpGateway, MediaFetcher, MediaGateway};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
struct Seen {
    method: String,
    path: String,
    authorization: Option<String>,
    body: String,
}

type Routes = HashMap<(&'static str, &'static str), (u16, &'static str)>;

/// Serves `routes` keyed by (method, path-with-query); anything else is a 404
async fn serve(routes: Routes) -> (String, Arc<Mutex<Vec<Seen>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            let (head, mut body) = loop {
                let n = socket.read(&mut chunk).await.unwrap_or(0);
                if n == 0 {
                    break (String::from_utf8_lossy(&buf).to_string(), Vec::new());
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break (
                        String::from_utf8_lossy(&buf[..pos]).to_string(),
                        buf[pos + 4..].to_vec(),
                    );
                }
            };

            let mut lines = head.lines();
            let request_line = lines.next().unwrap_or_default().to_string();
            let mut parts = request_line.split_whitespace();
            let method = parts.next().unwrap_or_default().to_string();
            let path = parts.next().unwrap_or_default().to_string();
            let mut content_length = 0usize;
            let mut authorization = None;
            for line in lines {
                let lower = line.to_ascii_lowercase();
                if let Some(v) = lower.strip_prefix("content-length:") {
                    content_length = v.trim().parse().unwrap_or(0);
                }
                if lower.starts_with("authorization:") {
                    authorization = Some(line["authorization:".len()..].trim().to_string());
                }
            }
            while body.len() < content_length {
                let n = socket.read(&mut chunk).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                body.extend_from_slice(&chunk[..n]);
            }

            log.lock().unwrap().push(Seen {
                method: method.clone(),
                path: path.clone(),
                authorization,
                body: String::from_utf8_lossy(&body).to_string(),
            });

            let (status, payload) = routes
                .iter()
                .find(|((m, p), _)| *m == method && *p == path)
                .map(|(_, v)| *v)
                .unwrap_or((404, ""));
            let response = format!(
                "HTTP/1.1 {} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                payload.len(),
                if method == "HEAD" { "" } else { payload }
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{}", addr), seen)
}

fn config(base_url: String) -> ServerConfig {
    let _ = env_logger::builder().is_test(true).try_init();
    ServerConfig {
        base_url,
        token: "tok".to_string(),
        max_retries: 0,
        ..Default::default()
    }
}

const ITEM: &str = r#"{"id":"li_1","media":{"duration":3600,"chapters":[{"id":0,"start":0,"end":3600,"title":"All"}],"tracks":[{"contentUrl":"/s/li_1/a.mp3","mimeType":"audio/mpeg"}],"metadata":{"title":"Dune"}}}"#;

#[tokio::test]
async fn test_fetch_item_sends_bearer_header() {
    let mut routes = Routes::new();
    routes.insert(("GET", "/api/items/li_1?expanded=1"), (200, ITEM));
    let (base, seen) = serve(routes).await;
    let gateway = HttpGateway::from_config(&config(base)).unwrap();

    let item = gateway.fetch_item(&ItemId::new("li_1")).await.unwrap();
    assert_eq!(item.duration, 3600.0);
    assert_eq!(
        item.rendition(RenditionKind::Adaptive).unwrap().url,
        "/hls/li_1/output.m3u8"
    );

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer tok"));
}

#[tokio::test]
async fn test_missing_item_is_not_found() {
    let (base, _) = serve(Routes::new()).await;
    let gateway = HttpGateway::from_config(&config(base)).unwrap();

    let err = gateway.fetch_item(&ItemId::new("nope")).await.unwrap_err();
    assert!(matches!(err, GatewayError::NotFound(_)));
}

#[tokio::test]
async fn test_absent_progress_is_none() {
    let (base, _) = serve(Routes::new()).await;
    let gateway = HttpGateway::from_config(&config(base)).unwrap();

    let progress = gateway.fetch_progress(&ItemId::new("li_1")).await.unwrap();
    assert!(progress.is_none());
}

#[tokio::test]
async fn test_stored_progress_is_parsed() {
    let mut routes = Routes::new();
    routes.insert(
        ("GET", "/api/me/progress/li_1"),
        (
            200,
            r#"{"libraryItemId":"li_1","currentTime":120.5,"duration":3600,"progress":0.03,"isFinished":false,"lastUpdate":1700000000000}"#,
        ),
    );
    let (base, _) = serve(routes).await;
    let gateway = HttpGateway::from_config(&config(base)).unwrap();

    let progress = gateway
        .fetch_progress(&ItemId::new("li_1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(progress.current_time, 120.5);
    assert_eq!(progress.resume_position(), 120.5);
}

#[tokio::test]
async fn test_push_goes_to_selected_target() {
    let mut routes = Routes::new();
    routes.insert(("PATCH", "/api/session/local/li_1/sync"), (200, "{}"));
    let (base, seen) = serve(routes).await;
    let mut cfg = config(base);
    cfg.progress_target = ProgressTarget::Alternate;
    let gateway = HttpGateway::from_config(&cfg).unwrap();

    let record = ProgressRecord::new(ItemId::new("li_1"), 15.0, 3600.0);
    gateway.push_progress(&record).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].method, "PATCH");
    assert!(seen[0].body.contains("\"currentTime\":15.0"));
    assert!(seen[0].body.contains("\"isFinished\":false"));
}

#[tokio::test]
async fn test_server_error_on_push_is_reported() {
    let mut routes = Routes::new();
    routes.insert(("PATCH", "/api/me/progress/li_1"), (502, ""));
    let (base, _) = serve(routes).await;
    let gateway = HttpGateway::from_config(&config(base)).unwrap();

    let record = ProgressRecord::new(ItemId::new("li_1"), 15.0, 3600.0);
    let err = gateway.push_progress(&record).await.unwrap_err();
    assert!(matches!(err, GatewayError::Status { status: 502, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_reachability_and_text() {
    let mut routes = Routes::new();
    routes.insert(("HEAD", "/s/li_1/a.mp3"), (200, ""));
    routes.insert(("GET", "/hls/li_1/output.m3u8"), (200, "#EXTM3U\n"));
    let (base, _) = serve(routes).await;
    let gateway = HttpGateway::from_config(&config(base)).unwrap();

    let file = gateway.resolve("/s/li_1/a.mp3").unwrap();
    gateway.check_reachable(&file).await.unwrap();

    let manifest = gateway.resolve("/hls/li_1/output.m3u8").unwrap();
    assert_eq!(gateway.get_text(&manifest).await.unwrap(), "#EXTM3U\n");
}

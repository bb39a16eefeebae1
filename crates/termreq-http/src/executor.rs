use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, header::HeaderMap};
use tracing::{info, warn};

use crate::error::{RequestError, describe_chain};
use crate::model::{HttpMethod, RequestDescriptor, ResponseRecord};

/// Result received from the executor thread.
#[derive(Debug)]
pub struct DispatchReport {
    pub outcome: Result<ResponseRecord, RequestError>,
    pub elapsed: Duration,
}

/// Sender/Receiver pair for communicating with the executor thread.
pub struct HttpExecutor {
    sender: mpsc::Sender<RequestDescriptor>,
    receiver: mpsc::Receiver<DispatchReport>,
}

impl HttpExecutor {
    /// Spawn the background executor thread with a tokio runtime.
    /// `timeout` bounds each request from start to the last body byte.
    pub fn spawn(timeout: Duration) -> Result<Self> {
        let client = build_client(timeout).context("Failed to build HTTP client")?;
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to create tokio runtime")?;

        let (cmd_tx, cmd_rx) = mpsc::channel::<RequestDescriptor>();
        let (result_tx, result_rx) = mpsc::channel::<DispatchReport>();

        thread::Builder::new()
            .name("http-executor".into())
            .spawn(move || {
                rt.block_on(async move {
                    while let Ok(descriptor) = cmd_rx.recv() {
                        let report = execute(&client, descriptor).await;
                        if result_tx.send(report).is_err() {
                            break; // Main thread dropped the receiver
                        }
                    }
                });
            })
            .context("Failed to spawn executor thread")?;

        Ok(Self {
            sender: cmd_tx,
            receiver: result_rx,
        })
    }

    /// Queue a request (non-blocking).
    pub fn send(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<(), mpsc::SendError<RequestDescriptor>> {
        self.sender.send(descriptor)
    }

    /// Try to receive a finished request (non-blocking).
    pub fn try_recv(&self) -> Option<DispatchReport> {
        self.receiver.try_recv().ok()
    }
}

/// Client with an overall per-request timeout.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).build()
}

async fn execute(client: &Client, descriptor: RequestDescriptor) -> DispatchReport {
    info!(method = %descriptor.method, url = %descriptor.url, "dispatching request");
    let start = Instant::now();
    let outcome = dispatch(client, descriptor).await;
    let elapsed = start.elapsed();

    match &outcome {
        Ok(record) => info!(
            status = %record.status_line,
            bytes = record.body.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "request completed"
        ),
        Err(e) => warn!(elapsed_ms = elapsed.as_millis() as u64, "request failed: {e}"),
    }

    DispatchReport { outcome, elapsed }
}

/// Send one request and read the whole body. No retries.
pub async fn dispatch(
    client: &Client,
    descriptor: RequestDescriptor,
) -> Result<ResponseRecord, RequestError> {
    let mut builder = client.request(to_reqwest_method(descriptor.method), descriptor.url);

    // RequestBuilder::header appends, so repeated names are all sent
    for (key, value) in &descriptor.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }

    if let Some(body) = descriptor.body {
        builder = builder.body(body);
    }

    let response = builder
        .send()
        .await
        .map_err(|e| RequestError::Transport(describe_chain(&e)))?;

    let status = response.status();
    let status_line = format!("{} {}", status.as_str(), status.canonical_reason().unwrap_or(""))
        .trim_end()
        .to_string();
    let headers = collect_headers(response.headers());

    let body = response.bytes().await.map_err(|e| RequestError::BodyRead {
        status: status_line.clone(),
        detail: describe_chain(&e),
    })?;

    Ok(ResponseRecord::new(status_line, headers, body.to_vec()))
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Patch => reqwest::Method::PATCH,
    }
}

/// Group header values by name in first-seen order.
fn collect_headers(headers: &HeaderMap) -> Vec<(String, Vec<String>)> {
    headers
        .keys()
        .map(|name| {
            let values = headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect();
            (name.to_string(), values)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::model::KvMap;
    use crate::parser::parse_kv_buffer;
    use pretty_assertions::assert_eq;
    use reqwest::header::HeaderValue;
    use std::io::{Read, Write};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}/")
    }

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(to_reqwest_method(HttpMethod::Get), reqwest::Method::GET);
        assert_eq!(to_reqwest_method(HttpMethod::Delete), reqwest::Method::DELETE);
        assert_eq!(to_reqwest_method(HttpMethod::Patch), reqwest::Method::PATCH);
    }

    #[test]
    fn test_collect_headers_groups_values() {
        let mut map = HeaderMap::new();
        map.append("set-cookie", HeaderValue::from_static("a=1"));
        map.append("content-length", HeaderValue::from_static("0"));
        map.append("set-cookie", HeaderValue::from_static("b=2"));

        let mut collected = collect_headers(&map);
        collected.sort();
        assert_eq!(
            collected,
            vec![
                ("content-length".to_string(), vec!["0".to_string()]),
                (
                    "set-cookie".to_string(),
                    vec!["a=1".to_string(), "b=2".to_string()]
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_get_sends_query_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get"))
            .and(query_param("a", "1"))
            .and(query_param("b", "2"))
            .and(header("X-Trace", "abc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-served-by", "mock")
                    .set_body_raw(r#"{"ok":true}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let descriptor = build(
            HttpMethod::Get,
            &format!("{}/get?a=1", server.uri()),
            &parse_kv_buffer("b=2"),
            &parse_kv_buffer("X-Trace=abc"),
        )
        .unwrap();

        let client = build_client(Duration::from_secs(5)).unwrap();
        let record = dispatch(&client, descriptor).await.unwrap();

        assert_eq!(record.status_line, "200 OK");
        assert_eq!(record.body, br#"{"ok":true}"#.to_vec());
        assert!(
            record
                .headers
                .contains(&("x-served-by".to_string(), vec!["mock".to_string()]))
        );
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/post"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(serde_json::json!({"name": "ada", "role": "admin"})))
            .respond_with(ResponseTemplate::new(201).set_body_string("created"))
            .mount(&server)
            .await;

        let descriptor = build(
            HttpMethod::Post,
            &format!("{}/post", server.uri()),
            &parse_kv_buffer("name=ada\nrole=admin"),
            &KvMap::new(),
        )
        .unwrap();

        let client = build_client(Duration::from_secs(5)).unwrap();
        let record = dispatch(&client, descriptor).await.unwrap();

        assert_eq!(record.status_line, "201 Created");
        assert_eq!(record.body, b"created".to_vec());
    }

    #[tokio::test]
    async fn test_timeout_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let descriptor = build(
            HttpMethod::Get,
            &server.uri(),
            &KvMap::new(),
            &KvMap::new(),
        )
        .unwrap();

        let client = build_client(Duration::from_millis(200)).unwrap();
        let start = Instant::now();
        let err = dispatch(&client, descriptor).await.unwrap_err();

        assert!(matches!(err, RequestError::Transport(_)), "got {err:?}");
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_transport_error() {
        let descriptor =
            build(HttpMethod::Get, &closed_port_url(), &KvMap::new(), &KvMap::new()).unwrap();
        let client = build_client(Duration::from_secs(5)).unwrap();

        let err = dispatch(&client, descriptor).await.unwrap_err();
        assert!(matches!(err, RequestError::Transport(_)), "got {err:?}");
        assert!(err.to_string().starts_with("Error sending request: "));
    }

    #[tokio::test]
    async fn test_invalid_header_name_fails_without_panicking() {
        let descriptor = build(
            HttpMethod::Get,
            &closed_port_url(),
            &KvMap::new(),
            &parse_kv_buffer("Bad Header=x"),
        )
        .unwrap();
        let client = build_client(Duration::from_secs(5)).unwrap();

        let err = dispatch(&client, descriptor).await.unwrap_err();
        assert!(matches!(err, RequestError::Transport(_)), "got {err:?}");
    }

    /// Serves one response whose body stops short of its Content-Length.
    fn truncated_body_server() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nshort")
                .unwrap();
        });
        format!("http://127.0.0.1:{port}/")
    }

    #[tokio::test]
    async fn test_short_body_is_a_body_read_error_with_status() {
        let descriptor = build(
            HttpMethod::Get,
            &truncated_body_server(),
            &KvMap::new(),
            &KvMap::new(),
        )
        .unwrap();
        let client = build_client(Duration::from_secs(5)).unwrap();

        let err = dispatch(&client, descriptor).await.unwrap_err();
        match &err {
            RequestError::BodyRead { status, .. } => assert_eq!(status, "200 OK"),
            other => panic!("expected BodyRead, got {other:?}"),
        }
        assert!(err.to_string().starts_with("Error reading response (200 OK): "));
    }

    #[test]
    fn test_executor_reports_back_over_channel() {
        let executor = HttpExecutor::spawn(Duration::from_secs(5)).unwrap();
        let descriptor =
            build(HttpMethod::Delete, &closed_port_url(), &KvMap::new(), &KvMap::new()).unwrap();
        executor.send(descriptor).unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        let report = loop {
            if let Some(report) = executor.try_recv() {
                break report;
            }
            assert!(Instant::now() < deadline, "executor never answered");
            thread::sleep(Duration::from_millis(20));
        };

        assert!(matches!(report.outcome, Err(RequestError::Transport(_))));
    }
}

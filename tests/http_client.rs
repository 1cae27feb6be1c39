//! `GotenbergClient` against a minimal local HTTP server.
//!
//! The server accepts one connection per scripted response, captures the raw
//! request (headers and body), and writes back a canned reply. That is enough
//! to check what actually goes over the wire.

use gotenberg_node::{
    execute, BinaryData, Credentials, ErrorKind, GotenbergClient, GotenbergError, InputItem,
    NodeParameters, Operation, TransportError,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// A request as the server saw it.
struct Captured {
    head: String,
    body: Vec<u8>,
}

impl Captured {
    fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.trim().eq_ignore_ascii_case(name).then(|| v.trim())
        })
    }

    fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Serve `responses` in order, one per connection, and report what was received.
async fn mock_server(responses: Vec<(u16, Vec<u8>)>) -> (String, mpsc::UnboundedReceiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        for (status, body) in responses {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let captured = read_request(&mut stream).await;
            let _ = tx.send(captured);

            let reason = if status < 400 { "OK" } else { "Error" };
            let head = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/pdf\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes()).await;
            let _ = stream.write_all(&body).await;
            let _ = stream.shutdown().await;
        }
    });

    (format!("http://{addr}"), rx)
}

/// Read headers up to the blank line, then exactly `Content-Length` body bytes.
async fn read_request(stream: &mut tokio::net::TcpStream) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before headers were complete");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let content_length = head
        .lines()
        .find_map(|l| {
            let (k, v) = l.split_once(':')?;
            k.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| v.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Captured { head, body }
}

#[tokio::test]
async fn url_conversion_over_the_wire() {
    let (base, mut rx) = mock_server(vec![(200, b"%PDF-1.7 fake".to_vec())]).await;
    let host = GotenbergClient::new(Some(Credentials::new("admin", "hunter2"))).unwrap();
    let params = NodeParameters::builder()
        .api_url(&base)
        .operation(Operation::ConvertUrl)
        .output_filename("site.pdf")
        .landscape(true)
        .build()
        .unwrap();

    let results = execute(
        &host,
        &params,
        &[InputItem::new().with_field("url", "https://example.com")],
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].decode_pdf().unwrap(), b"%PDF-1.7 fake");
    assert_eq!(results[0].filename(), "site.pdf");

    let req = rx.recv().await.unwrap();
    assert_eq!(req.request_line(), "POST /forms/chromium/convert/url HTTP/1.1");
    assert_eq!(req.header("gotenberg-output-filename"), Some("site.pdf"));
    // base64("admin:hunter2")
    assert_eq!(req.header("authorization"), Some("Basic YWRtaW46aHVudGVyMg=="));
    assert!(req
        .header("content-type")
        .is_some_and(|ct| ct.starts_with("multipart/form-data; boundary=")));

    let body = req.body_text();
    assert!(body.contains(r#"name="url""#), "body: {body}");
    assert!(body.contains("https://example.com"));
    assert!(body.contains(r#"name="landscape""#));
}

#[tokio::test]
async fn anonymous_requests_carry_no_authorization() {
    let (base, mut rx) = mock_server(vec![(200, b"%PDF".to_vec())]).await;
    let host = GotenbergClient::new(None).unwrap();
    let params = NodeParameters::builder()
        .api_url(&base)
        .operation(Operation::ConvertHtml)
        .html_content("<h1>Hi</h1>")
        .build()
        .unwrap();

    execute(&host, &params, &[InputItem::new()]).await.unwrap();

    let req = rx.recv().await.unwrap();
    assert_eq!(req.request_line(), "POST /forms/chromium/convert/html HTTP/1.1");
    assert!(req.header("authorization").is_none());
    assert_eq!(req.header("gotenberg-output-filename"), Some("output.pdf"));

    let body = req.body_text();
    assert!(body.contains(r#"name="index.html"; filename="index.html""#), "body: {body}");
    assert!(body.contains("<h1>Hi</h1>"));
}

#[tokio::test]
async fn markdown_sends_wrapper_and_content_files() {
    let (base, mut rx) = mock_server(vec![(200, b"%PDF".to_vec())]).await;
    let host = GotenbergClient::new(None).unwrap();
    let params = NodeParameters::builder()
        .api_url(&base)
        .operation(Operation::ConvertMarkdown)
        .markdown_content("# Title\n\nBody text")
        .build()
        .unwrap();

    execute(&host, &params, &[InputItem::new()]).await.unwrap();

    let req = rx.recv().await.unwrap();
    assert_eq!(req.request_line(), "POST /forms/chromium/convert/markdown HTTP/1.1");
    let body = req.body_text();
    assert!(body.contains(r#"filename="index.html""#));
    assert!(body.contains(r#"{{ toHTML "content.md" }}"#));
    assert!(body.contains(r#"filename="content.md""#));
    assert!(body.contains("# Title\n\nBody text"));
}

#[tokio::test]
async fn office_file_read_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("budget.xlsx");
    std::fs::write(&path, b"spreadsheet-bytes").unwrap();

    let (base, mut rx) = mock_server(vec![(200, b"%PDF".to_vec())]).await;
    let host = GotenbergClient::new(None).unwrap();
    let params = NodeParameters::builder()
        .api_url(&base)
        .operation(Operation::ConvertOffice)
        .office_file(path.to_string_lossy())
        .build()
        .unwrap();

    execute(&host, &params, &[InputItem::new()]).await.unwrap();

    let req = rx.recv().await.unwrap();
    assert_eq!(req.request_line(), "POST /forms/libreoffice/convert HTTP/1.1");
    let body = req.body_text();
    assert!(body.contains(r#"name="file"; filename="budget.xlsx""#), "body: {body}");
    assert!(body.contains("spreadsheet-bytes"));
}

#[tokio::test]
async fn office_attachment_uploaded_without_disk() {
    let (base, mut rx) = mock_server(vec![(200, b"%PDF".to_vec())]).await;
    let host = GotenbergClient::new(None).unwrap();
    let params = NodeParameters::builder()
        .api_url(&base)
        .operation(Operation::ConvertOffice)
        .build()
        .unwrap();
    let item = InputItem::new().with_binary(
        "data",
        BinaryData::from_bytes(
            b"docx-bytes",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            Some("letter.docx".into()),
        ),
    );

    execute(&host, &params, &[item]).await.unwrap();

    let body = rx.recv().await.unwrap().body_text();
    assert!(body.contains(r#"filename="letter.docx""#), "body: {body}");
    assert!(body.contains("docx-bytes"));
}

#[tokio::test]
async fn missing_office_file_is_a_transport_error() {
    let host = GotenbergClient::new(None).unwrap();
    let params = NodeParameters::builder()
        .api_url("http://127.0.0.1:9")
        .operation(Operation::ConvertOffice)
        .office_file("/definitely/not/here.docx")
        .build()
        .unwrap();

    let err = execute(&host, &params, &[InputItem::new()]).await.unwrap_err();
    assert!(matches!(
        err,
        GotenbergError::RequestFailed {
            operation: Operation::ConvertOffice,
            source: TransportError::FileRead { .. },
        }
    ));
}

#[tokio::test]
async fn error_status_aborts_with_status() {
    let (base, mut rx) = mock_server(vec![
        (200, b"%PDF-ok".to_vec()),
        (500, b"chromium crashed".to_vec()),
    ])
    .await;
    let host = GotenbergClient::new(None).unwrap();
    let params = NodeParameters::builder()
        .api_url(&base)
        .operation(Operation::ConvertUrl)
        .build()
        .unwrap();
    let items = vec![
        InputItem::new().with_field("url", "https://a"),
        InputItem::new().with_field("url", "https://b"),
        InputItem::new().with_field("url", "https://c"),
    ];

    let err = execute(&host, &params, &items).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.status(), Some(500));
    let msg = err.to_string();
    assert!(msg.starts_with("Failed to execute convertUrl"), "got: {msg}");
    assert!(msg.contains("chromium crashed"), "got: {msg}");

    assert!(rx.recv().await.is_some());
    assert!(rx.recv().await.is_some());
    // Server was scripted for two responses only; a third request would
    // have failed with a connection error instead of a 500.
}

#[tokio::test]
async fn unreachable_service_is_a_network_error() {
    // Bind then drop to obtain a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let host = GotenbergClient::with_timeout(None, 5).unwrap();
    let params = NodeParameters::builder()
        .api_url(format!("http://{addr}"))
        .build()
        .unwrap();

    let err = execute(
        &host,
        &params,
        &[InputItem::new().with_field("url", "https://a")],
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.status().is_none());
}

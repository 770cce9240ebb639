use dibungo_preview::{FetchError, HttpSource, PageSource};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

async fn listener() -> (TcpListener, Url) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = Url::parse(&format!("http://{}/", listener.local_addr().unwrap())).unwrap();
    (listener, base)
}

async fn read_head(stream: &mut TcpStream) -> String {
    let mut raw = Vec::new();
    let mut buf = [0u8; 1024];
    while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&buf[..n]);
    }
    String::from_utf8(raw).unwrap()
}

/// Answers one connection per entry in `responses`, in order, and returns the
/// request heads it received.
async fn serve(listener: TcpListener, responses: Vec<String>) -> Vec<String> {
    let mut heads = Vec::new();
    for response in responses {
        let (mut stream, _) = listener.accept().await.unwrap();
        heads.push(read_head(&mut stream).await);
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
    }
    heads
}

fn response(status: &str, extra_headers: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n{}",
        status,
        body.len(),
        extra_headers,
        body
    )
}

fn request_line(head: &str) -> &str {
    head.lines().next().unwrap_or_default()
}

#[tokio::test]
async fn test_http_source_returns_body() {
    let (listener, base) = listener().await;
    let source = HttpSource::new(base, Duration::from_secs(5));

    let (heads, body) = tokio::join!(
        serve(listener, vec![response("200 OK", "", "<h1>Profil Kami</h1>")]),
        source.get("/templates/template1/profil.html"),
    );

    assert_eq!(body.unwrap(), "<h1>Profil Kami</h1>");
    assert_eq!(request_line(&heads[0]), "GET /templates/template1/profil.html HTTP/1.1");
    assert!(heads[0].to_ascii_lowercase().contains("\r\naccept: text/html\r\n"));
}

#[tokio::test]
async fn test_http_source_follows_redirects() {
    let (listener, base) = listener().await;
    let source = HttpSource::new(base, Duration::from_secs(5));

    let (heads, body) = tokio::join!(
        serve(
            listener,
            vec![
                response(
                    "301 Moved Permanently",
                    "Location: /templates/template1/index.html\r\n",
                    "",
                ),
                response("200 OK", "", "<h1>Selamat Datang</h1>"),
            ],
        ),
        source.get("/templates/template1/"),
    );

    assert_eq!(body.unwrap(), "<h1>Selamat Datang</h1>");
    assert_eq!(heads.len(), 2);
    assert_eq!(request_line(&heads[1]), "GET /templates/template1/index.html HTTP/1.1");
}

#[tokio::test]
async fn test_http_source_decodes_chunked_body() {
    let (listener, base) = listener().await;
    let source = HttpSource::new(base, Duration::from_secs(5));

    let chunked = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n\
                   8\r\n<h1>Menu\r\n\
                   6\r\n</h1>\n\r\n\
                   0\r\n\r\n"
        .to_string();

    let (_, body) = tokio::join!(
        serve(listener, vec![chunked]),
        source.get("/templates/template2/menu.html"),
    );

    assert_eq!(body.unwrap(), "<h1>Menu</h1>\n");
}

#[tokio::test]
async fn test_http_source_maps_status_errors() {
    let (listener, base) = listener().await;
    let source = HttpSource::new(base, Duration::from_secs(5));

    let (_, result) = tokio::join!(
        serve(listener, vec![response("404 Not Found", "", "")]),
        source.get("/templates/template1/nosuchpage.html"),
    );

    let err = result.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.path(), "/templates/template1/nosuchpage.html");
    assert_eq!(err.to_string(), "HTTP 404: Not Found");
}

#[tokio::test]
async fn test_http_source_server_error_is_not_not_found() {
    let (listener, base) = listener().await;
    let source = HttpSource::new(base, Duration::from_secs(5));

    let (_, result) = tokio::join!(
        serve(listener, vec![response("503 Service Unavailable", "", "")]),
        source.get("/templates/template1/index.html"),
    );

    let err = result.unwrap_err();
    assert!(!err.is_not_found());
    assert_eq!(
        err,
        FetchError::Http {
            path: "/templates/template1/index.html".to_string(),
            status: 503,
            reason: "Service Unavailable".to_string(),
        }
    );
}

#[tokio::test]
async fn test_http_source_times_out_on_silent_server() {
    let (listener, base) = listener().await;
    let source = HttpSource::new(base, Duration::from_millis(100));

    // Accepts and then never answers.
    let silent = async {
        let (stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        drop(stream);
    };

    let (_, result) = tokio::join!(silent, source.get("/templates/template1/menu.html"));

    let err = result.unwrap_err();
    assert_eq!(
        err,
        FetchError::Timeout {
            path: "/templates/template1/menu.html".to_string(),
            timeout_ms: 100,
        }
    );
    assert_eq!(
        err.to_string(),
        "Request timeout - /templates/template1/menu.html took longer than 100 ms to load"
    );
}

#[tokio::test]
async fn test_http_source_network_error_on_closed_port() {
    let (listener, base) = listener().await;
    drop(listener);
    let source = HttpSource::new(base, Duration::from_secs(5));

    let err = source.get("/templates/template1/index.html").await.unwrap_err();
    assert!(matches!(err, FetchError::Network { .. }));
    assert!(!err.is_not_found());
}

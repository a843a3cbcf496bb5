//! RestVault against a one-shot local HTTP responder

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use osync_core::vault::RestOptions;
use osync_core::{Error, RestVault, VaultApi};

/// Serve exactly one request with `status` and `body`; the raw request text
/// is sent back through the returned channel.
fn respond_once(status: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request(&mut stream);
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        let _ = tx.send(request);
    });

    (format!("http://{addr}"), rx)
}

fn read_request(stream: &mut std::net::TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buffer).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .find_map(|line| {
                    let lower = line.to_ascii_lowercase();
                    lower
                        .strip_prefix("content-length:")
                        .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                })
                .unwrap_or(0);
            if buffer.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buffer).to_string()
}

fn vault(host: &str) -> RestVault {
    RestVault::new(
        host,
        "test-key",
        RestOptions {
            verify_tls: true,
            timeout: Duration::from_secs(5),
        },
    )
    .unwrap()
}

#[test]
fn status_sends_the_bearer_key() {
    let (host, requests) = respond_once("200 OK", r#"{"authenticated":true,"service":"Obsidian Local REST API"}"#);

    let status = vault(&host).status().unwrap();
    assert!(status.authenticated);

    let request = requests.recv().unwrap().to_ascii_lowercase();
    assert!(request.starts_with("get / http/1.1"));
    assert!(request.contains("authorization: bearer test-key"));
}

#[test]
fn unauthenticated_status_is_an_auth_error() {
    let (host, _requests) = respond_once("200 OK", r#"{"authenticated":false}"#);
    let err = vault(&host).status().unwrap_err();
    assert!(matches!(err, Error::Auth { .. }));
}

#[test]
fn unauthorized_listing_is_an_auth_error() {
    let (host, _requests) = respond_once("401 Unauthorized", r#"{"message":"no"}"#);
    let err = vault(&host).list_dir("10-Projects/atlas").unwrap_err();
    assert!(matches!(err, Error::Auth { status: Some(401), .. }));
}

#[test]
fn missing_folder_lists_as_none() {
    let (host, _requests) = respond_once("404 Not Found", r#"{"errorCode":40400}"#);
    assert_eq!(vault(&host).list_dir("10-Projects/atlas").unwrap(), None);
}

#[test]
fn listing_returns_entries_relative_to_the_folder() {
    let (host, requests) = respond_once("200 OK", r#"{"files":["a.md","sub/"]}"#);

    let entries = vault(&host).list_dir("10-Projects/My Atlas").unwrap().unwrap();
    assert_eq!(entries, vec!["a.md".to_string(), "sub/".to_string()]);

    let request = requests.recv().unwrap();
    assert!(request.starts_with("GET /vault/10-Projects/My%20Atlas/ HTTP/1.1"));
}

#[test]
fn server_error_is_connectivity_with_status() {
    let (host, _requests) = respond_once("500 Internal Server Error", "{}");
    let err = vault(&host).read_note("10-Projects/a.md").unwrap_err();
    assert!(matches!(err, Error::Connectivity { status: Some(500), .. }));
    assert!(!err.aborts_pass());
}

#[test]
fn note_json_is_parsed_with_metadata() {
    let (host, requests) = respond_once(
        "200 OK",
        r##"{"content":"# Hello\n","path":"10-Projects/a.md","stat":{"mtime":1700000000000,"ctime":1690000000000,"size":8}}"##,
    );

    let note = vault(&host).read_note("10-Projects/a.md").unwrap();
    assert_eq!(note.content, b"# Hello\n");
    assert_eq!(note.modified, Utc.timestamp_opt(1_700_000_000, 0).unwrap());
    assert_eq!(note.size, 8);

    let request = requests.recv().unwrap().to_ascii_lowercase();
    assert!(request.contains("accept: application/vnd.olrapi.note+json"));
}

#[test]
fn write_puts_markdown() {
    let (host, requests) = respond_once("204 No Content", "");

    vault(&host).write_note("10-Projects/a b.md", b"# Body\n").unwrap();

    let request = requests.recv().unwrap();
    assert!(request.starts_with("PUT /vault/10-Projects/a%20b.md HTTP/1.1"));
    assert!(request.to_ascii_lowercase().contains("content-type: text/markdown"));
    assert!(request.ends_with("# Body\n"));
}

#[test]
fn refused_connection_aborts_the_pass() {
    // Bind then drop to get a port nobody listens on
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let err = vault(&format!("http://127.0.0.1:{port}")).status().unwrap_err();
    assert!(matches!(err, Error::Connectivity { status: None, .. }));
    assert!(err.aborts_pass());
}

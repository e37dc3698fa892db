use std::path::Path;

use tokio::task::JoinHandle;

use filedrop::security::Credentials;
use filedrop::server::{router, ServerConfig};

// Helpers

async fn start_server(dir: &Path, credentials: Option<Credentials>) -> (JoinHandle<()>, String) {
    let config = ServerConfig { serve_dir: dir.to_path_buf(), credentials };
    let app = router(config);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind 127.0.0.1:0");
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server task error: {e:?}");
        }
    });
    (handle, format!("http://127.0.0.1:{}", port))
}

fn multipart_body(boundary: &str, filename: &str, payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            b = boundary, f = filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{b}--\r\n", b = boundary).as_bytes());
    body
}

async fn post_multipart(base: &str, boundary: &str, body: Vec<u8>) -> reqwest::Response {
    reqwest::Client::new()
        .post(base)
        .header("Content-Type", format!("multipart/form-data; boundary={}", boundary))
        .body(body)
        .send()
        .await
        .expect("POST upload")
}

#[tokio::test]
async fn upload_list_download_roundtrip() {
    let tmp = tempfile::tempdir().unwrap();
    let (_server, base) = start_server(tmp.path(), None).await;

    let resp = post_multipart(&base, "B", multipart_body("B", "test.txt", b"Hello, World!")).await;
    filedrop::tprintln!("upload status: {}", resp.status());
    assert_eq!(resp.status(), 200);
    let summary: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(summary["status"], "ok");
    assert_eq!(summary["saved"][0], "test.txt");
    assert_eq!(summary["failed"], 0);

    // Byte-exact on disk: 13 bytes, no trailing CRLF
    let on_disk = std::fs::read(tmp.path().join("test.txt")).unwrap();
    assert_eq!(on_disk, b"Hello, World!");

    let listed: serde_json::Value = reqwest::get(format!("{base}/list")).await.unwrap().json().await.unwrap();
    assert_eq!(listed, serde_json::json!([{"name": "test.txt", "size": 13}]));

    let downloaded = reqwest::get(format!("{base}/test.txt")).await.unwrap();
    assert_eq!(downloaded.status(), 200);
    assert_eq!(
        downloaded.headers().get("content-type").unwrap().to_str().unwrap(),
        "text/plain"
    );
    assert_eq!(downloaded.bytes().await.unwrap().as_ref(), b"Hello, World!");
}

#[tokio::test]
async fn traversal_filenames_are_sanitized_on_upload() {
    let tmp = tempfile::tempdir().unwrap();
    let (_server, base) = start_server(tmp.path(), None).await;

    let resp = post_multipart(&base, "B", multipart_body("B", "../../../etc/passwd", b"owned")).await;
    assert_eq!(resp.status(), 200);
    let summary: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(summary["saved"][0], "passwd");
    assert!(tmp.path().join("passwd").is_file());
    // Nothing escaped the serve directory
    assert!(!tmp.path().join("../passwd").exists());
}

#[tokio::test]
async fn hidden_filenames_are_neutralized_on_upload() {
    let tmp = tempfile::tempdir().unwrap();
    let (_server, base) = start_server(tmp.path(), None).await;

    let resp = post_multipart(&base, "B", multipart_body("B", ".bashrc", b"alias ls=rm")).await;
    assert_eq!(resp.status(), 200);
    let summary: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(summary["saved"][0], "file_.bashrc");
    assert!(tmp.path().join("file_.bashrc").is_file());
}

#[tokio::test]
async fn upload_without_file_parts_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let (_server, base) = start_server(tmp.path(), None).await;

    // Empty filename attribute: decoder must produce no parts
    let resp = post_multipart(&base, "B", multipart_body("B", "", b"ignored")).await;
    assert_eq!(resp.status(), 400);

    // Body with no multipart structure at all
    let resp = post_multipart(&base, "B", b"not multipart".to_vec()).await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn listing_excludes_hidden_files_and_directories() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("a.txt"), b"Hello, World!").unwrap();
    std::fs::write(tmp.path().join(".secret"), b"hidden").unwrap();
    std::fs::create_dir(tmp.path().join("sub")).unwrap();
    let (_server, base) = start_server(tmp.path(), None).await;

    let listed: serde_json::Value = reqwest::get(format!("{base}/list")).await.unwrap().json().await.unwrap();
    assert_eq!(listed, serde_json::json!([{"name": "a.txt", "size": 13}]));
}

#[tokio::test]
async fn download_rejects_hidden_and_traversal_paths() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join(".secret"), b"hidden").unwrap();
    let (_server, base) = start_server(tmp.path(), None).await;

    let resp = reqwest::get(format!("{base}/.secret")).await.unwrap();
    assert_eq!(resp.status(), 404);

    // Percent-encoded traversal decodes to ../ and must not resolve
    let resp = reqwest::get(format!("{base}/%2e%2e%2fCargo.toml")).await.unwrap();
    assert_eq!(resp.status(), 404);

    let resp = reqwest::get(format!("{base}/no-such-file.bin")).await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn auth_gates_every_route() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("a.txt"), b"Hello, World!").unwrap();
    let creds = Credentials { username: "user".into(), password: "hunter2hunter".into() };
    let (_server, base) = start_server(tmp.path(), Some(creds)).await;
    let client = reqwest::Client::new();

    for path in ["/", "/list", "/a.txt"] {
        let resp = client.get(format!("{base}{path}")).send().await.unwrap();
        assert_eq!(resp.status(), 401, "unauthenticated {path}");
        assert_eq!(
            resp.headers().get("www-authenticate").unwrap().to_str().unwrap(),
            "Basic realm=\"Restricted Access\""
        );
    }

    let resp = client
        .get(format!("{base}/list"))
        .basic_auth("user", Some("wrong-password"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = client
        .get(format!("{base}/list"))
        .basic_auth("user", Some("hunter2hunter"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Uploads are gated too
    let resp = client
        .post(&base)
        .header("Content-Type", "multipart/form-data; boundary=B")
        .body(multipart_body("B", "x.txt", b"x"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    assert!(!tmp.path().join("x.txt").exists());
}

#[tokio::test]
async fn multiple_files_upload_in_one_request() {
    let tmp = tempfile::tempdir().unwrap();
    let (_server, base) = start_server(tmp.path(), None).await;

    let mut body = Vec::new();
    for (name, payload) in [("one.txt", "first"), ("two.txt", "second")] {
        body.extend_from_slice(
            format!(
                "--M\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\r\n{payload}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(b"--M--\r\n");

    let resp = post_multipart(&base, "M", body).await;
    assert_eq!(resp.status(), 200);
    let summary: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(summary["saved"], serde_json::json!(["one.txt", "two.txt"]));
    assert_eq!(std::fs::read(tmp.path().join("one.txt")).unwrap(), b"first");
    assert_eq!(std::fs::read(tmp.path().join("two.txt")).unwrap(), b"second");
}

#[tokio::test]
async fn security_headers_present_on_responses() {
    let tmp = tempfile::tempdir().unwrap();
    let (_server, base) = start_server(tmp.path(), None).await;

    let resp = reqwest::get(format!("{base}/list")).await.unwrap();
    let headers = resp.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("referrer-policy").unwrap(), "strict-origin-when-cross-origin");
}

#[tokio::test]
async fn upload_page_is_served_at_root() {
    let tmp = tempfile::tempdir().unwrap();
    let (_server, base) = start_server(tmp.path(), None).await;

    let resp = reqwest::get(&base).await.unwrap();
    assert_eq!(resp.status(), 200);
    let text = resp.text().await.unwrap();
    assert!(text.contains("<form id=\"upload-form\""));
    assert!(text.contains("/list"));
}

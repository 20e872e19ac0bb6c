//! End-to-end lifecycle tests: readiness, uploads and shutdown.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use staging_server::lifecycle::ShutdownReason;
use staging_server::staging::TeardownOutcome;

mod common;

async fn wait_for_report(
    task: tokio::task::JoinHandle<staging_server::TeardownReport>,
) -> staging_server::TeardownReport {
    tokio::time::timeout(Duration::from_secs(10), task)
        .await
        .expect("server did not stop")
        .expect("server task panicked")
}

#[tokio::test]
async fn test_hello_world() {
    let root = tempfile::tempdir().unwrap();
    let server = common::start_server(root.path()).await;

    let res = common::client().get(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "hello": "world" }));

    server.shutdown.trigger(ShutdownReason::Interrupt);
    wait_for_report(server.task).await;
}

#[tokio::test]
async fn test_staging_directory_lives_for_the_server_lifetime() {
    let root = tempfile::tempdir().unwrap();
    let server = common::start_server(root.path()).await;
    let staging_dir = root.path().join("tmp");

    assert!(staging_dir.is_dir(), "ready hook should create the staging directory");

    let form = Form::new()
        .text("note", "not a file")
        .part("video", Part::bytes(vec![7u8; 64 * 1024]).file_name("video.mp4"))
        .part("thumb", Part::bytes(b"png".to_vec()).file_name("thumb.png"));
    let res = common::client()
        .post(server.url("/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);

    let body: Value = res.json().await.unwrap();
    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["field"], "video");
    assert_eq!(files[0]["bytes"], 64 * 1024);
    assert!(files[1]["file_name"].as_str().unwrap().ends_with("-thumb.png"));
    assert_eq!(
        files[0]["path"].as_str().unwrap(),
        staging_dir.join(files[0]["file_name"].as_str().unwrap()).to_str().unwrap()
    );

    for file in files {
        let name = file["file_name"].as_str().unwrap();
        assert!(staging_dir.join(name).is_file());
    }

    let health: Value = common::client()
        .get(server.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["staging_present"], true);
    assert_eq!(health["staged_files"], 2);

    server.shutdown.trigger(ShutdownReason::Terminate);
    let report = wait_for_report(server.task).await;

    assert_eq!(report.reason, ShutdownReason::Terminate);
    assert_eq!(report.outcome, TeardownOutcome::Removed);
    assert!(!staging_dir.exists());
    assert_eq!(server.coordinator.completions(), 1);
}

#[tokio::test]
async fn test_https_serves_and_tears_down() {
    let root = tempfile::tempdir().unwrap();
    let server = common::start_tls_server(root.path()).await;
    assert_eq!(server.scheme, "https");
    assert!(root.path().join("tmp").is_dir());

    let res = common::client().get(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.version(), reqwest::Version::HTTP_2);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "hello": "world" }));

    server.shutdown.trigger(ShutdownReason::Terminate);
    let report = wait_for_report(server.task).await;

    assert_eq!(report.reason, ShutdownReason::Terminate);
    assert_eq!(report.outcome, TeardownOutcome::Removed);
    assert!(!root.path().join("tmp").exists());
}

#[tokio::test]
async fn test_failed_upload_leaves_no_files_behind() {
    let root = tempfile::tempdir().unwrap();
    let server = common::start_server(root.path()).await;

    // First file is complete; the second part is cut off before its boundary.
    let body = concat!(
        "--XBOUNDARY\r\n",
        "Content-Disposition: form-data; name=\"first\"; filename=\"first.bin\"\r\n",
        "\r\n",
        "complete\r\n",
        "--XBOUNDARY\r\n",
        "Content-Disposition: form-data; name=\"second\"; filename=\"second.bin\"\r\n",
        "\r\n",
        "truncat",
    );
    let res = common::client()
        .post(server.url("/upload"))
        .header("content-type", "multipart/form-data; boundary=XBOUNDARY")
        .body(body)
        .send()
        .await
        .unwrap();
    assert!(res.status().is_client_error(), "status was {}", res.status());

    let staged = std::fs::read_dir(server.staging.path()).unwrap().count();
    assert_eq!(staged, 0);

    server.shutdown.trigger(ShutdownReason::Interrupt);
    wait_for_report(server.task).await;
}

#[tokio::test]
async fn test_upload_without_files_is_rejected() {
    let root = tempfile::tempdir().unwrap();
    let server = common::start_server(root.path()).await;

    let form = Form::new().text("note", "nothing attached");
    let res = common::client()
        .post(server.url("/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "No file provided");

    server.shutdown.trigger(ShutdownReason::Interrupt);
    wait_for_report(server.task).await;
}

#[tokio::test]
async fn test_ensure_failure_does_not_block_readiness() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("tmp"), b"a file where the directory goes").unwrap();

    let server = common::start_server(root.path()).await;

    let health: Value = common::client()
        .get(server.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["staging_present"], false);

    server.shutdown.trigger(ShutdownReason::Interrupt);
    let report = wait_for_report(server.task).await;

    assert_eq!(report.reason, ShutdownReason::Interrupt);
    assert!(matches!(report.outcome, TeardownOutcome::Failed(_)));
    assert_eq!(server.coordinator.completions(), 1);
}

#[tokio::test]
async fn test_signal_and_close_hook_both_tear_down() {
    let root = tempfile::tempdir().unwrap();
    let server = common::start_server(root.path()).await;
    std::fs::write(server.staging.file_path("video.mp4"), b"frames").unwrap();

    // A repeated signal tears down directly while the server is closing.
    server.shutdown.trigger(ShutdownReason::Interrupt);
    let direct = server.coordinator.tear_down(ShutdownReason::Terminate).await;
    let closed = wait_for_report(server.task).await;

    assert!(direct.outcome.is_removed() || closed.outcome.is_removed());
    assert_eq!(server.coordinator.completions(), 2);
    assert!(server.coordinator.completed().await.is_some());
    assert!(!root.path().join("tmp").exists());
}

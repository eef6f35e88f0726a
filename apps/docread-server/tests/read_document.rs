mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use common::{encode, fake_pdf, png_bytes, FakeOcr, TestApp};

const READ: &str = "/read-pdf/";

fn three_pages() -> String {
    encode(&fake_pdf(&["alpha", "beta", "gamma"]))
}

#[tokio::test]
async fn test_pdf_all_pages() {
    let app = TestApp::new();

    let (status, body) = app
        .post(READ, json!({ "data": three_pages(), "ext": ".pdf" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["content"],
        "--- Page 1 ---\nalpha\n\n--- Page 2 ---\nbeta\n\n--- Page 3 ---\ngamma"
    );
    assert!(body.get("total_pages").is_none());
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_pdf_single_page() {
    let app = TestApp::new();

    let (status, body) = app
        .post(READ, json!({ "data": three_pages(), "ext": ".pdf", "pages": "2" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    let content = body["content"].as_str().unwrap();
    assert_eq!(content.matches("--- Page 2 ---").count(), 1);
    assert!(!content.contains("--- Page 1 ---"));
    assert!(!content.contains("--- Page 3 ---"));
    assert_eq!(content, "--- Page 2 ---\nbeta");
}

#[tokio::test]
async fn test_pdf_page_list() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            READ,
            json!({ "data": three_pages(), "ext": "pdf", "pages": [3, "1", "x"] }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["content"],
        "--- Page 1 ---\nalpha\n\n--- Page 3 ---\ngamma"
    );
}

#[tokio::test]
async fn test_pdf_malformed_pages_fall_back_to_all() {
    let app = TestApp::new();

    let (status, body) = app
        .post(READ, json!({ "data": three_pages(), "ext": ".pdf", "pages": "5-2,abc" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"].as_str().unwrap().matches("--- Page").count(), 3);
}

#[tokio::test]
async fn test_pdf_no_valid_pages_reports_total() {
    let app = TestApp::new();

    let (status, body) = app
        .post(READ, json!({ "data": three_pages(), "ext": ".pdf", "pages": "50" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_pages"], 3);
    assert!(!body["content"].as_str().unwrap().contains("--- Page"));
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_pdf_page_without_text() {
    let app = TestApp::new();

    let data = encode(&fake_pdf(&["alpha", "", "gamma"]));
    let (status, body) = app
        .post(READ, json!({ "data": data, "ext": ".pdf", "pages": "2-3" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "--- Page 2 ---\n\n\n--- Page 3 ---\ngamma");
}

#[tokio::test]
async fn test_corrupt_pdf_is_bad_request() {
    let app = TestApp::new();

    let (status, body) = app
        .post(READ, json!({ "data": encode(b"garbage"), "ext": ".pdf" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("corrupt PDF"));
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_unsupported_extension() {
    let app = TestApp::new();

    let (status, body) = app
        .post(READ, json!({ "data": encode(b"PK"), "ext": ".docx" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = body["detail"].as_str().unwrap();
    for ext in [".pdf", ".png", ".jpg", ".jpeg"] {
        assert!(detail.contains(ext), "{} missing from {}", ext, detail);
    }
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_invalid_base64() {
    let app = TestApp::new();

    let (status, body) = app
        .post(READ, json!({ "data": "%%%not base64%%%", "ext": ".pdf" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("base64"));
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_missing_field_is_unprocessable() {
    let app = TestApp::new();

    let (status, body) = app.post(READ, json!({ "ext": ".pdf" })).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("data"));
}

#[tokio::test]
async fn test_image_ocr() {
    let app = TestApp::new();

    let (status, body) = app
        .post(READ, json!({ "data": encode(&png_bytes()), "ext": ".PNG" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Hello world");
    assert_eq!(app.ocr.calls(), 1);
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_image_page_one_list() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            READ,
            json!({ "data": encode(&png_bytes()), "ext": "png", "pages": "1,2" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Hello world");
    assert_eq!(app.ocr.calls(), 1);
}

#[tokio::test]
async fn test_image_other_page_skips_ocr() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            READ,
            json!({ "data": encode(&png_bytes()), "ext": ".png", "pages": "2" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let content = body["content"].as_str().unwrap();
    assert!(content.contains("exactly one page"));
    assert_eq!(app.ocr.calls(), 0);
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_invalid_image_is_bad_request() {
    let app = TestApp::new();

    let (status, body) = app
        .post(READ, json!({ "data": encode(b"not an image"), "ext": ".jpg" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("Invalid image"));
    assert_eq!(app.ocr.calls(), 0);
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_ocr_failure_is_server_error() {
    let app = TestApp::with_ocr(FakeOcr::failing());

    let (status, body) = app
        .post(READ, json!({ "data": encode(&png_bytes()), "ext": ".jpeg" }))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("engine crashed"));
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_route_aliases() {
    let app = TestApp::new();

    for uri in ["/read-pdf", "/api/v1/extract"] {
        let (status, body) = app
            .post(uri, json!({ "data": three_pages(), "ext": ".pdf", "pages": "1" }))
            .await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(body["content"], "--- Page 1 ---\nalpha");
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "docread-server");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_are_isolated() {
    let app = Arc::new(TestApp::new());

    let tasks: Vec<_> = (1..=8)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                let pages: Vec<String> = (0..i).map(|p| format!("doc{}-p{}", i, p + 1)).collect();
                let pages: Vec<&str> = pages.iter().map(String::as_str).collect();
                let data = encode(&fake_pdf(&pages));

                let (status, body) = app
                    .post(READ, json!({ "data": data, "ext": ".pdf", "pages": "ALL" }))
                    .await;
                assert_eq!(status, StatusCode::OK);

                let content = body["content"].as_str().unwrap().to_string();
                assert_eq!(content.matches("--- Page").count(), i);
                assert!(content.contains(&format!("doc{}-p{}", i, i)));
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_extraction_timeout_cleans_up_and_frees_ocr() {
    let app = TestApp::with_options(FakeOcr::stalling(Duration::from_secs(5)), 1, true);
    let image = json!({ "data": encode(&png_bytes()), "ext": "png" });

    let (status, body) = app.post(READ, image.clone()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("timed out"));
    assert_eq!(app.staged_files(), 0);

    // The serialization gate is free again
    let (status, body) = tokio::time::timeout(Duration::from_secs(2), app.post(READ, image))
        .await
        .expect("second request must not wait on the timed-out one");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Hello world");
    assert_eq!(app.ocr.calls(), 2);
}

#[tokio::test]
async fn test_page_zero_reports_total_pages() {
    let app = TestApp::new();

    let (status, body) = app
        .post(READ, json!({ "data": three_pages(), "ext": "pdf", "pages": "0" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_pages"], 3);

    let (status, body) = app
        .post(READ, json!({ "data": encode(&png_bytes()), "ext": "png", "pages": "0" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.ocr.calls(), 0);
    assert!(body["content"].as_str().unwrap().contains("exactly one page"));
}

//! Shared fixtures for router tests

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use base64::Engine;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use docread_server::config::Config;
use docread_server::ocr::{OcrEngine, OcrError, OcrProvider, OcrResult, OcrService};
use docread_server::pdf::{PdfError, PdfPages, PdfResult, PdfTextReader};
use docread_server::routes;
use docread_server::state::AppState;

/// Header of the fake PDF format read by [`FakePdfReader`]
const FAKE_PDF_HEADER: &str = "%PDF-fake\n";

/// Build a fake PDF whose pages hold the given texts
pub fn fake_pdf(pages: &[&str]) -> Vec<u8> {
    format!("{}{}", FAKE_PDF_HEADER, pages.join("\x0c")).into_bytes()
}

/// Reads the staged file from disk and splits pages on form feeds
pub struct FakePdfReader;

struct FakePages(Vec<String>);

impl PdfTextReader for FakePdfReader {
    fn open<'a>(&'a self, path: &Path) -> PdfResult<Box<dyn PdfPages + 'a>> {
        let bytes = std::fs::read(path).map_err(|e| PdfError::Corrupt(e.to_string()))?;
        let text = String::from_utf8(bytes).map_err(|e| PdfError::Corrupt(e.to_string()))?;
        let body = text
            .strip_prefix(FAKE_PDF_HEADER)
            .ok_or_else(|| PdfError::Corrupt("missing header".into()))?;

        Ok(Box::new(FakePages(
            body.split('\x0c').map(str::to_string).collect(),
        )))
    }
}

impl PdfPages for FakePages {
    fn page_count(&self) -> usize {
        self.0.len()
    }

    fn page_text(&self, page: u32) -> PdfResult<Option<String>> {
        let text = &self.0[page as usize - 1];
        Ok((!text.is_empty()).then(|| text.clone()))
    }
}

/// OCR engine returning fixed fragments and counting calls
pub struct FakeOcr {
    pub fragments: Vec<String>,
    pub fail: bool,
    /// Delay applied to the first call only
    pub first_call_delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl FakeOcr {
    pub fn new(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|s| s.to_string()).collect(),
            fail: false,
            first_call_delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }

    /// Engine whose first recognition hangs for `delay`
    pub fn stalling(delay: Duration) -> Self {
        Self {
            first_call_delay: Some(delay),
            ..Self::new(&["Hello", "world"])
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for FakeOcr {
    fn provider_type(&self) -> OcrProvider {
        OcrProvider::Tesseract
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn recognize(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(image_path.exists(), "image must be staged during OCR");

        if let (0, Some(delay)) = (call, self.first_call_delay) {
            tokio::time::sleep(delay).await;
        }

        if self.fail {
            return Err(OcrError::ProcessingError("engine crashed".into()));
        }
        Ok(OcrResult {
            fragments: self.fragments.clone(),
            provider: OcrProvider::Tesseract,
        })
    }
}

/// Router wired to fake backends, staging into its own directory
pub struct TestApp {
    pub router: Router,
    pub ocr: Arc<FakeOcr>,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_ocr(FakeOcr::new(&["Hello", "world"]))
    }

    pub fn with_ocr(ocr: FakeOcr) -> Self {
        Self::with_options(ocr, Config::default().extract.timeout_secs, false)
    }

    /// Router with a custom extraction timeout and OCR serialization
    pub fn with_options(ocr: FakeOcr, timeout_secs: u64, serialize: bool) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.extract.temp_dir = Some(temp_dir.path().to_path_buf());
        config.extract.timeout_secs = timeout_secs;
        config.ocr.serialize = serialize;

        let ocr = Arc::new(ocr);
        let service = Arc::new(OcrService::with_engine(ocr.clone(), serialize));
        let state = AppState::with_backends(config, Arc::new(FakePdfReader), service);

        Self {
            router: routes::app(state),
            ocr,
            temp_dir,
        }
    }

    /// POST a JSON body and return status and parsed response
    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    /// Number of files left in the staging directory
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.temp_dir.path()).unwrap().count()
    }
}

pub fn encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([0, 0, 0]));
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
    buffer.into_inner()
}

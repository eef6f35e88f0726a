//! Text extraction routes
//!
//! Accepts a base64-encoded PDF or image and returns its text.
//!
//! ```text
//! POST /read-pdf/
//! { "data": "<base64>", "ext": ".pdf", "pages": "1-3,5" }
//! ```

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::extract::ExtractionResult;
use crate::pages::{parse, PageSpec};
use crate::state::AppState;

/// Create the extract router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/read-pdf/", post(read_document))
        .route("/read-pdf", post(read_document))
        .route("/api/v1/extract", post(read_document))
}

/// Extraction request body
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    /// Base64-encoded document
    pub data: String,
    /// Declared extension, e.g. `.pdf` or `png`
    pub ext: String,
    /// Page selection, every page when absent
    #[serde(default)]
    pub pages: PageSpec,
}

/// Extract text from a document
async fn read_document(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractionResult>> {
    let Json(request) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;

    let span = tracing::info_span!(
        "read_document",
        request_id = %Uuid::new_v4(),
        ext = %request.ext
    );

    async move {
        let document = state.intake().stage(&request.ext, request.data).await?;
        let pages = parse(&request.pages);

        tracing::info!(
            "Extracting {} bytes as {:?}, pages {}",
            document.size(),
            document.kind(),
            pages
        );

        let outcome = state.extractor().extract(&document, &pages).await;
        document.release();

        let result = outcome?;
        tracing::info!("Extracted {} chars", result.content.len());

        Ok::<_, AppError>(Json(result))
    }
    .instrument(span)
    .await
}

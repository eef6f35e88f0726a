//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::document::Intake;
use crate::extract::Extractor;
use crate::ocr::OcrService;
use crate::pdf::{MupdfReader, PdfTextReader};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    intake: Intake,
    extractor: Extractor,
}

impl AppState {
    /// Create the state with the MuPDF reader and the configured OCR provider
    pub fn new(config: Config) -> Self {
        let ocr = Arc::new(OcrService::new(&config.ocr));
        Self::with_backends(config, Arc::new(MupdfReader::new()), ocr)
    }

    /// Create the state around explicit extraction backends
    pub fn with_backends(
        config: Config,
        pdf: Arc<dyn PdfTextReader>,
        ocr: Arc<OcrService>,
    ) -> Self {
        let intake = Intake::new(config.extract.temp_dir());
        let extractor = Extractor::new(pdf, ocr, config.extract.timeout());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                intake,
                extractor,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the document intake
    pub fn intake(&self) -> &Intake {
        &self.inner.intake
    }

    /// Get the extraction dispatcher
    pub fn extractor(&self) -> &Extractor {
        &self.inner.extractor
    }

    /// Get the process-wide OCR service
    pub fn ocr(&self) -> &OcrService {
        self.inner.extractor.ocr()
    }
}

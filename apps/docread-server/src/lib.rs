//! DocRead Server Library
//!
//! Text extraction over HTTP for PDFs and raster images. The server binary is
//! in main.rs; the router is exposed here for integration tests.
//!
//! # Modules
//!
//! - `pages`: page selection parsing and clipping
//! - `document`: extension validation and scoped staging of payloads
//! - `extract`: dispatch to the PDF text layer or OCR
//! - `pdf`, `ocr`: extraction backends

pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod ocr;
pub mod pages;
pub mod pdf;
pub mod routes;
pub mod state;

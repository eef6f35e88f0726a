//! Document intake
//!
//! Validates and stages incoming documents. A staged document lives in a
//! uniquely named temporary file that is deleted when the owning
//! [`ScopedDocument`] is dropped, whichever way the request ends.

mod error;
mod intake;
mod types;

pub use error::{IntakeError, IntakeResult};
pub use intake::{Intake, ScopedDocument};
pub use types::{DocumentKind, ImageKind, SUPPORTED_EXTENSIONS};

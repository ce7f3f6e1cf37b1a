//! CV rendering: a pure page layout followed by a PDF writer.

pub mod layout;
pub mod pdf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::cv_profile::CvProfile;
use crate::util::error::ServiceError;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to load font: {0}")]
    Font(String),
    #[error("Failed to write PDF: {0}")]
    Write(String),
}

impl From<RenderError> for ServiceError {
    fn from(err: RenderError) -> Self {
        ServiceError::InternalError(err.to_string())
    }
}

/// Lays out `cv` and encodes it as PDF bytes. CPU bound; call it off the async runtime.
pub fn render_cv(cv: &CvProfile, generated_on: NaiveDate) -> Result<Vec<u8>, RenderError> {
    let document = layout::layout_cv(cv, generated_on);
    pdf::write_pdf(&document)
}

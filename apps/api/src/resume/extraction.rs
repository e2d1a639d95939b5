//! Text extraction — the black-box collaborator that turns an uploaded
//! document into plain text or a typed failure. The analyzer only ever
//! sees text that already passed the minimum-length gate here.

use thiserror::Error;
use tracing::info;

use crate::errors::AppError;

/// Extracted text shorter than this is treated as an unreadable upload.
pub const MIN_EXTRACTED_CHARS: usize = 50;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    Unsupported(String),

    #[error("Failed to read document: {0}")]
    Unreadable(String),
}

/// Black-box document-to-text boundary.
pub trait TextExtractor: Send + Sync {
    fn extract(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, ExtractionError>;
}

/// PDF extraction via `pdf_extract`. Anything that is not recognizably a
/// PDF produces a typed `Unsupported` failure; OCR for images stays outside
/// this service.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, ExtractionError> {
        let looks_like_pdf = content_type == "application/pdf"
            || (content_type == "application/octet-stream"
                && file_name.to_lowercase().ends_with(".pdf"));
        if !looks_like_pdf {
            return Err(ExtractionError::Unsupported(format!(
                "{content_type} ({file_name}); upload a PDF resume"
            )));
        }

        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractionError::Unreadable(e.to_string()))?;
        info!(
            "Extracted {} characters from {file_name}",
            text.chars().count()
        );
        Ok(text)
    }
}

/// Runs extraction and applies the minimum-length gate, mapping failures
/// into the application error taxonomy.
pub fn dispatch_extraction(
    extractor: &dyn TextExtractor,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
) -> Result<String, AppError> {
    if bytes.is_empty() {
        return Err(AppError::InvalidInput(
            "Uploaded file is empty or unreadable".to_string(),
        ));
    }

    let text = extractor
        .extract(file_name, content_type, bytes)
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    if text.chars().count() < MIN_EXTRACTED_CHARS {
        return Err(AppError::InvalidInput(
            "The file appears to be empty or contains very little text".to_string(),
        ));
    }
    Ok(text)
}

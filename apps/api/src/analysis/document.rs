//! Resume document ingestion: PDF bytes in, plain text out.

use crate::errors::AppError;

/// The only document format a resume upload may declare.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Upload ceiling, enforced before any conversion work is attempted.
pub const MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

/// Converts uploaded PDF bytes to extracted plain text.
pub fn extract_document_text(bytes: &[u8]) -> Result<String, AppError> {
    if bytes.len() > MAX_DOCUMENT_BYTES {
        return Err(AppError::LengthOutOfBounds(
            "Resume file must be at most 5 MB".to_string(),
        ));
    }

    pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
        tracing::warn!("PDF text extraction failed: {e}");
        AppError::DocumentReadError
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oversized_document_rejected_before_conversion() {
        let bytes = vec![0u8; MAX_DOCUMENT_BYTES + 1];
        let err = extract_document_text(&bytes).unwrap_err();
        assert!(matches!(err, AppError::LengthOutOfBounds(_)));
    }

    #[test]
    fn test_garbage_bytes_fail_as_read_error() {
        let err = extract_document_text(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, AppError::DocumentReadError));
    }

    #[test]
    fn test_empty_document_fails_as_read_error() {
        let err = extract_document_text(&[]).unwrap_err();
        assert!(matches!(err, AppError::DocumentReadError));
    }
}

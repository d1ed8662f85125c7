//! Text extraction from fetched document bytes.
//!
//! Every failure here is soft: unsupported media types, corrupt streams, and
//! decode errors all degrade to an empty string so the caller can decide what
//! an unreadable document means for the run.

use tracing::warn;

/// Media type of documents the PDF decoder handles.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Extract the concatenated page text of a document, dispatching on its
/// declared media type. Returns an empty string when nothing can be decoded.
pub fn document_text(name: &str, media_type: &str, bytes: &[u8]) -> String {
    if media_type == PDF_MEDIA_TYPE {
        pdf_text(name, bytes)
    } else if media_type.starts_with("text/") {
        String::from_utf8_lossy(bytes).into_owned()
    } else {
        warn!(document = name, media_type, "unsupported media type, skipping");
        String::new()
    }
}

/// Whether the declared media type is one `document_text` can decode.
pub fn is_supported_media_type(media_type: &str) -> bool {
    media_type == PDF_MEDIA_TYPE || media_type.starts_with("text/")
}

fn pdf_text(name: &str, bytes: &[u8]) -> String {
    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => text,
        Err(err) => {
            warn!(document = name, error = %err, "failed to extract pdf text");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_decodes_directly() {
        let text = document_text("posting.txt", "text/plain", b"Required skills\nRust");
        assert_eq!(text, "Required skills\nRust");
    }

    #[test]
    fn invalid_utf8_degrades_lossily_instead_of_failing() {
        let text = document_text("posting.txt", "text/plain", &[0x52, 0xff, 0x53]);
        assert_eq!(text, "R\u{fffd}S");
    }

    #[test]
    fn unsupported_media_type_yields_empty() {
        let text = document_text("photo.png", "image/png", &[0x89, 0x50]);
        assert!(text.is_empty());
    }

    #[test]
    fn corrupt_pdf_yields_empty() {
        let text = document_text("resume.pdf", PDF_MEDIA_TYPE, b"not a pdf at all");
        assert!(text.is_empty());
    }

    #[test]
    fn supported_media_types() {
        assert!(is_supported_media_type(PDF_MEDIA_TYPE));
        assert!(is_supported_media_type("text/plain"));
        assert!(is_supported_media_type("text/markdown"));
        assert!(!is_supported_media_type("application/zip"));
    }
}

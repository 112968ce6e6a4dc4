//! Plain-text extraction for uploaded documents.
//!
//! The parser only ever sees text. Failures here never become HTTP errors:
//! [`parse_upload`] turns them into a profile carrying an `error` tag.

use thiserror::Error;
use tracing::{info, warn};

use crate::resume::models::ParsedProfile;
use crate::resume::pipeline::ResumeParser;

#[cfg(feature = "docx")]
mod docx;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("no decoder available for {0} files")]
    MissingDecoder(&'static str),

    #[error("failed to decode {kind} file: {message}")]
    Decode { kind: &'static str, message: String },

    #[error("no text could be extracted from the document")]
    NoText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    fn from_file_name(file_name: &str) -> Result<Self, ExtractError> {
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "txt" | "md" | "text" => Ok(Self::PlainText),
            _ => Err(ExtractError::UnsupportedType(file_name.to_string())),
        }
    }
}

/// Extracts plain text from an uploaded file, chosen by extension.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let text = match DocumentKind::from_file_name(file_name)? {
        DocumentKind::Pdf => pdf_text(bytes)?,
        DocumentKind::Docx => docx_text(bytes)?,
        DocumentKind::PlainText => String::from_utf8_lossy(bytes).into_owned(),
    };
    if text.trim().is_empty() {
        return Err(ExtractError::NoText);
    }
    Ok(text)
}

#[cfg(feature = "pdf")]
fn pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractError::Decode {
            kind: "pdf",
            message: e.to_string(),
        }),
        Err(_) => Err(ExtractError::Decode {
            kind: "pdf",
            message: "decoder aborted".to_string(),
        }),
    }
}

#[cfg(not(feature = "pdf"))]
fn pdf_text(_bytes: &[u8]) -> Result<String, ExtractError> {
    Err(ExtractError::MissingDecoder("pdf"))
}

#[cfg(feature = "docx")]
fn docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    docx::document_text(bytes)
}

#[cfg(not(feature = "docx"))]
fn docx_text(_bytes: &[u8]) -> Result<String, ExtractError> {
    Err(ExtractError::MissingDecoder("docx"))
}

/// Extracts and parses an upload. Extraction failures come back as a
/// profile with only `error` set.
pub fn parse_upload(
    parser: &ResumeParser,
    file_name: &str,
    bytes: &[u8],
    debug: bool,
) -> ParsedProfile {
    match extract_text(file_name, bytes) {
        Ok(text) => {
            info!("Extracted {} chars from {file_name}", text.chars().count());
            parser.parse(&text, debug)
        }
        Err(e) => {
            warn!("Text extraction failed for {file_name}: {e}");
            ParsedProfile::failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_passed_through() {
        let text = extract_text("resume.TXT", "张三\n教育背景".as_bytes()).unwrap();
        assert_eq!(text, "张三\n教育背景");
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        assert!(matches!(
            extract_text("resume.xls", b"data"),
            Err(ExtractError::UnsupportedType(name)) if name == "resume.xls"
        ));
        assert!(matches!(
            extract_text("resume", b"data"),
            Err(ExtractError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_blank_document_has_no_text() {
        assert!(matches!(
            extract_text("blank.txt", b"  \n "),
            Err(ExtractError::NoText)
        ));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_garbage_pdf_is_a_decode_error() {
        assert!(matches!(
            extract_text("resume.pdf", b"not a pdf"),
            Err(ExtractError::Decode { kind: "pdf", .. })
        ));
    }

    #[test]
    fn test_failed_upload_becomes_error_tag() {
        let profile = parse_upload(&ResumeParser::heuristic(), "photo.png", b"\x89PNG", false);
        assert_eq!(
            profile.error.as_deref(),
            Some("unsupported file type: photo.png")
        );
        assert!(profile.careers.is_empty());
        assert!(profile.name.is_none());
    }

    #[test]
    fn test_text_upload_is_parsed() {
        let profile = parse_upload(
            &ResumeParser::heuristic(),
            "cv.txt",
            "张三\n13812345678".as_bytes(),
            false,
        );
        assert_eq!(profile.name.as_deref(), Some("张三"));
        assert_eq!(profile.phone.as_deref(), Some("13812345678"));
        assert!(profile.error.is_none());
    }
}

use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use serde::Serialize;
use std::fmt;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_TXT: &str = "text/plain";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Txt,
    Docx,
    Unsupported,
}

impl DocumentFormat {
    /// Resolves a declared MIME type. Parameters such as `; charset=utf-8`
    /// are ignored.
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            MIME_PDF => DocumentFormat::Pdf,
            MIME_TXT => DocumentFormat::Txt,
            MIME_DOCX => DocumentFormat::Docx,
            _ => DocumentFormat::Unsupported,
        }
    }

    /// MIME type guessed from a file name, for uploads that arrive without one.
    pub fn mime_for_filename(filename: &str) -> Option<&'static str> {
        let ext = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())?;
        match ext.as_str() {
            "pdf" => Some(MIME_PDF),
            "txt" => Some(MIME_TXT),
            "docx" => Some(MIME_DOCX),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Txt => "txt",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("could not parse PDF document: {0}")]
    Pdf(String),

    #[error("could not read DOCX package: {0}")]
    Docx(String),

    #[error("unsupported document type: {0}")]
    Unsupported(String),
}

impl ExtractionError {
    pub fn format(&self) -> DocumentFormat {
        match self {
            ExtractionError::Pdf(_) => DocumentFormat::Pdf,
            ExtractionError::Docx(_) => DocumentFormat::Docx,
            ExtractionError::Unsupported(_) => DocumentFormat::Unsupported,
        }
    }
}

/// Converts an uploaded document into plain text according to its declared
/// MIME type. Never mutates `data`.
pub fn extract_text(data: &[u8], mime: &str) -> Result<String, ExtractionError> {
    match DocumentFormat::from_mime(mime) {
        DocumentFormat::Pdf => extract_text_from_pdf(data),
        DocumentFormat::Txt => Ok(decode_plain_text(data)),
        DocumentFormat::Docx => extract_text_from_docx(data),
        DocumentFormat::Unsupported => Err(ExtractionError::Unsupported(mime.to_string())),
    }
}

/// Pages that fail to decode are skipped with a warning; only an unreadable
/// document is an error.
fn extract_text_from_pdf(data: &[u8]) -> Result<String, ExtractionError> {
    let doc = lopdf::Document::load_mem(data).map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    let pages = doc.get_pages();
    let mut parts = Vec::with_capacity(pages.len());
    for page_num in pages.keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(page_text) => parts.push(page_text),
            Err(e) => {
                tracing::warn!(page = page_num, error = %e, "skipping undecodable PDF page");
            }
        }
    }

    Ok(parts.join("\n"))
}

/// UTF-8 first, then Latin-1, which maps every byte to a char and so cannot fail.
pub fn decode_plain_text(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(s) => s.to_string(),
        Err(_) => data.iter().map(|&b| char::from(b)).collect(),
    }
}

fn extract_text_from_docx(data: &[u8]) -> Result<String, ExtractionError> {
    let docx = docx_rs::read_docx(data).map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let mut paragraphs = Vec::new();
    for child in docx.document.children {
        if let DocumentChild::Paragraph(p) = child {
            let mut line = String::new();
            for p_child in p.children {
                if let ParagraphChild::Run(run) = p_child {
                    for run_child in run.children {
                        match run_child {
                            RunChild::Text(t) => line.push_str(&t.text),
                            RunChild::Tab(_) => line.push('\t'),
                            RunChild::Break(_) => line.push('\n'),
                            _ => {}
                        }
                    }
                }
            }
            paragraphs.push(line);
        }
    }

    Ok(paragraphs.join("\n"))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_text_is_returned_verbatim() {
        let text = extract_text("Jane Doe\nZürich, 6 yrs".as_bytes(), MIME_TXT).unwrap();
        assert_eq!(text, "Jane Doe\nZürich, 6 yrs");
    }

    #[test]
    fn invalid_utf8_falls_back_to_latin1() {
        let text = extract_text(&[b'C', b'a', b'f', 0xE9], "text/plain; charset=iso-8859-1").unwrap();
        assert_eq!(text, "Café");
    }

    #[test]
    fn plain_text_decoding_never_fails() {
        let all_bytes: Vec<u8> = (0..=255u8).cycle().take(2048).collect();
        let text = decode_plain_text(&all_bytes);
        assert_eq!(text.chars().count(), all_bytes.len());
        assert_eq!(decode_plain_text(&[]), "");
    }

    #[test]
    fn unsupported_mime_carries_the_offending_type() {
        let err = extract_text(b"\x89PNG", "image/png").unwrap_err();
        assert_eq!(err.format(), DocumentFormat::Unsupported);
        assert!(matches!(err, ExtractionError::Unsupported(ref m) if m == "image/png"));
    }

    #[test]
    fn malformed_pdf_is_a_pdf_error() {
        let err = extract_text(b"definitely not a pdf", MIME_PDF).unwrap_err();
        assert_eq!(err.format(), DocumentFormat::Pdf);
    }

    #[test]
    fn malformed_docx_is_a_docx_error() {
        let err = extract_text(b"PK\x03\x04 not really a zip", MIME_DOCX).unwrap_err();
        assert_eq!(err.format(), DocumentFormat::Docx);
    }

    #[test]
    fn docx_paragraphs_are_joined_in_order() {
        let data = fixtures::docx_bytes(&["Jane Doe", "Senior Rust Engineer", "Berlin"]);
        let text = extract_text(&data, MIME_DOCX).unwrap();
        assert_eq!(text, "Jane Doe\nSenior Rust Engineer\nBerlin");
    }

    #[test]
    fn pdf_pages_are_concatenated_in_page_order() {
        let data = fixtures::pdf_bytes(&["First page text", "Second page text"]);
        let text = extract_text(&data, MIME_PDF).unwrap();
        let first = text.find("First page").expect("first page text");
        let second = text.find("Second page").expect("second page text");
        assert!(first < second);
    }

    #[test]
    fn mime_resolution() {
        assert_eq!(DocumentFormat::from_mime("APPLICATION/PDF"), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::mime_for_filename("cv.DOCX"), Some(MIME_DOCX));
        assert_eq!(DocumentFormat::mime_for_filename("cv.doc"), None);
    }
}

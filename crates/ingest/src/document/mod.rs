pub mod pdf;

use std::path::Path;

use quibly_core::PendingDocument;
use thiserror::Error;
use tracing::debug;

use self::pdf::PdfBackend;

/// The only MIME type the extractor accepts.
pub const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported document type: {0} (expected application/pdf)")]
    InvalidDocumentType(String),
    #[error("PDF extraction failed: {0}")]
    ExtractionFailed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A file handed to the extractor: raw bytes plus the type marker the file
/// was selected with.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type.eq_ignore_ascii_case(PDF_MIME)
    }
}

/// A page of extracted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    /// 1-based page number.
    pub page_number: u32,
    /// Text items of the page joined with single spaces.
    pub text: String,
}

/// Result of extracting text from a document.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Original filename.
    pub file_name: String,
    /// Pages in source order.
    pub pages: Vec<PageContent>,
}

impl ExtractedDocument {
    /// Page-labelled text: one `Page {n}: {text}` line per page.
    pub fn context_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| format!("Page {}: {}\n", p.page_number, p.text))
            .collect()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total character count across all pages.
    pub fn total_chars(&self) -> usize {
        self.pages.iter().map(|p| p.text.chars().count()).sum()
    }

    pub fn into_pending(self) -> PendingDocument {
        PendingDocument {
            text: self.context_text(),
            file_name: self.file_name,
        }
    }
}

/// Read a file from disk the way a file picker would hand it over: display
/// name from the path, type marker guessed from the extension.
pub async fn read_upload(path: &Path) -> Result<DocumentUpload, ExtractionError> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    debug!(file = %file_name, mime = %mime_type, bytes = bytes.len(), "Read upload");
    Ok(DocumentUpload::new(file_name, mime_type, bytes))
}

/// Extract page-labelled text from a PDF upload.
///
/// Pages are decoded strictly in ascending order; the task yields to the
/// runtime after each page.
pub async fn extract_document(
    upload: &DocumentUpload,
    backend: &dyn PdfBackend,
) -> Result<ExtractedDocument, ExtractionError> {
    if !upload.is_pdf() {
        return Err(ExtractionError::InvalidDocumentType(upload.mime_type.clone()));
    }

    let document = backend.open(&upload.bytes)?;
    let page_count = document.page_count();
    let mut pages = Vec::with_capacity(page_count as usize);

    for page_number in 1..=page_count {
        let items = document.text_items(page_number)?;
        pages.push(PageContent {
            page_number,
            text: items.join(" "),
        });
        tokio::task::yield_now().await;
    }

    debug!(file = %upload.file_name, pages = page_count, "Extracted document");
    Ok(ExtractedDocument {
        file_name: upload.file_name.clone(),
        pages,
    })
}

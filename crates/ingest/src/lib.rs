pub mod document;

pub use document::pdf::{LopdfBackend, PdfBackend, PdfPages};
pub use document::{
    extract_document, read_upload, DocumentUpload, ExtractedDocument, ExtractionError,
    PageContent, PDF_MIME,
};

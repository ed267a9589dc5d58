//! PDF decoding behind a narrow per-page interface.
//!
//! `lopdf` loads the document and decodes each page. When it cannot decode a
//! page's text, `pdf-extract` re-reads the whole document page by page (once)
//! and its text for that page is used instead.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use lopdf::{Document, ObjectId};
use tracing::{debug, warn};

use super::ExtractionError;

/// Opens raw bytes as a paged document.
pub trait PdfBackend: Send + Sync {
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn PdfPages>, ExtractionError>;
}

/// A decoded document, read one page at a time.
pub trait PdfPages: Send {
    fn page_count(&self) -> u32;

    /// Plain text items of a 1-based page, in content order.
    fn text_items(&self, page_number: u32) -> Result<Vec<String>, ExtractionError>;
}

/// Default backend: `lopdf`, with `pdf-extract` for pages lopdf cannot read.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfBackend;

impl PdfBackend for LopdfBackend {
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn PdfPages>, ExtractionError> {
        let doc = Document::load_mem(bytes)
            .map_err(|e| ExtractionError::ExtractionFailed(e.to_string()))?;
        let pages = doc.get_pages();
        debug!(pages = pages.len(), "Loaded PDF with lopdf");
        Ok(Box::new(LopdfPages {
            doc,
            pages,
            bytes: bytes.to_vec(),
            fallback: OnceLock::new(),
        }))
    }
}

struct LopdfPages {
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
    bytes: Vec<u8>,
    fallback: OnceLock<Result<SplitTextPages, String>>,
}

impl LopdfPages {
    /// Page text as `pdf-extract` sees it. The document is decoded on first use.
    fn fallback_items(&self, page_number: u32) -> Result<Vec<String>, ExtractionError> {
        let pages = self
            .fallback
            .get_or_init(|| SplitTextPages::extract(&self.bytes));
        match pages {
            Ok(pages) => pages.text_items(page_number),
            Err(e) => Err(ExtractionError::ExtractionFailed(format!(
                "page {page_number}: pdf-extract: {e}"
            ))),
        }
    }
}

impl PdfPages for LopdfPages {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn text_items(&self, page_number: u32) -> Result<Vec<String>, ExtractionError> {
        if !self.pages.contains_key(&page_number) {
            return Err(ExtractionError::ExtractionFailed(format!(
                "page {page_number} not found"
            )));
        }
        match self.doc.extract_text(&[page_number]) {
            Ok(text) => Ok(split_items(&text)),
            Err(e) => {
                warn!(page = page_number, error = %e, "lopdf could not read page text, trying pdf-extract");
                self.fallback_items(page_number)
            }
        }
    }
}

/// Pages decoded by `pdf-extract`, one string per page.
struct SplitTextPages {
    pages: Vec<Vec<String>>,
}

impl SplitTextPages {
    fn extract(bytes: &[u8]) -> Result<Self, String> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| e.to_string())?;
        debug!(pages = pages.len(), "Decoded PDF with pdf-extract");
        Ok(Self::from_pages(&pages))
    }

    fn from_pages(pages: &[String]) -> Self {
        Self {
            pages: pages.iter().map(|p| split_items(p)).collect(),
        }
    }
}

impl PdfPages for SplitTextPages {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn text_items(&self, page_number: u32) -> Result<Vec<String>, ExtractionError> {
        page_number
            .checked_sub(1)
            .and_then(|i| self.pages.get(i as usize))
            .cloned()
            .ok_or_else(|| ExtractionError::ExtractionFailed(format!("page {page_number} not found")))
    }
}

/// Each non-blank line of decoded page text is one item.
fn split_items(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{extract_document, DocumentUpload, PDF_MIME};
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Build a PDF with one Courier text run per page.
    fn synthetic_pdf(page_texts: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for text in page_texts {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            });
            kids.push(Object::from(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[tokio::test]
    async fn test_two_page_pdf_round_trip() {
        let bytes = synthetic_pdf(&["Hello", "World"]);
        let upload = DocumentUpload::new("hello.pdf", PDF_MIME, bytes);

        let doc = extract_document(&upload, &LopdfBackend).await.unwrap();
        assert_eq!(doc.context_text(), "Page 1: Hello\nPage 2: World\n");
    }

    #[tokio::test]
    async fn test_same_bytes_same_text() {
        let bytes = synthetic_pdf(&["Alpha", "Beta", "Gamma"]);
        let upload = DocumentUpload::new("abc.pdf", PDF_MIME, bytes);

        let first = extract_document(&upload, &LopdfBackend).await.unwrap();
        let second = extract_document(&upload, &LopdfBackend).await.unwrap();
        assert_eq!(first.context_text(), second.context_text());
        assert_eq!(first.page_count(), 3);
    }

    #[tokio::test]
    async fn test_garbage_bytes_fail() {
        let upload = DocumentUpload::new("broken.pdf", PDF_MIME, b"not a pdf at all".to_vec());
        let err = extract_document(&upload, &LopdfBackend).await.unwrap_err();
        assert!(matches!(err, ExtractionError::ExtractionFailed(_)));
    }

    #[test]
    fn test_pdf_extract_pages_match_lopdf_pages() {
        let bytes = synthetic_pdf(&["Hello", "World"]);
        let pages = SplitTextPages::extract(&bytes).unwrap();
        assert_eq!(pages.page_count(), 2);
        assert!(pages.text_items(1).unwrap().join(" ").contains("Hello"));
        assert!(pages.text_items(2).unwrap().join(" ").contains("World"));
        assert!(pages.text_items(0).is_err());
        assert!(pages.text_items(3).is_err());
    }

    #[test]
    fn test_fallback_reads_pages_of_loaded_document() {
        let bytes = synthetic_pdf(&["Hello", "World"]);
        let doc = Document::load_mem(&bytes).unwrap();
        let pages = LopdfPages {
            pages: doc.get_pages(),
            doc,
            bytes,
            fallback: OnceLock::new(),
        };

        let second = pages.fallback_items(2).unwrap();
        assert!(second.join(" ").contains("World"));
        assert!(!second.join(" ").contains("Hello"));
        // Decoded once, reused for later pages.
        assert!(pages.fallback.get().is_some());
        assert!(pages.fallback_items(1).unwrap().join(" ").contains("Hello"));
    }

    #[test]
    fn test_backend_pages_are_send() {
        fn assert_send<T: Send + ?Sized>(_: &T) {}
        let pages = LopdfBackend.open(&synthetic_pdf(&["Hi"])).unwrap();
        assert_send(pages.as_ref());
    }

    #[test]
    fn test_split_items_skips_blank_lines() {
        assert_eq!(split_items("  a \n\n   \n b"), vec!["a", "b"]);
        assert!(split_items("").is_empty());
    }
}

//! Receipt PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use std::path::Path;
use tracing::{debug, trace, warn};

use super::{PageTextSource, Result};
use crate::error::PdfError;
use crate::models::config::PdfConfig;

const PDF_MAGIC: &[u8] = b"%PDF";

/// Loads a receipt PDF and reads the text of its pages.
pub struct PdfExtractor {
    config: PdfConfig,
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Extractor with the default size limit and magic-byte check.
    pub fn new() -> Self {
        Self::with_config(PdfConfig::default())
    }

    pub fn with_config(config: PdfConfig) -> Self {
        Self {
            config,
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Load a PDF from bytes, replacing any previously loaded document.
    pub fn load(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > self.config.max_size_bytes {
            return Err(PdfError::TooLarge {
                size: data.len(),
                limit: self.config.max_size_bytes,
            });
        }
        if self.config.require_magic_bytes && !data.starts_with(PDF_MAGIC) {
            return Err(PdfError::NotPdf);
        }

        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Receipts are sometimes encrypted with an empty user password
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads the raw bytes, so keep the decrypted form
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages ({} bytes)", page_count, data.len());
        self.document = Some(doc);
        Ok(())
    }

    /// Load a PDF from a file.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let data = std::fs::read(path)?;
        self.load(&data)
    }

    pub fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    /// Text of one page (1-indexed) from the lopdf content streams.
    pub fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self.document()?;
        doc.extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    /// Whole-document text via pdf-extract.
    pub fn extract_text(&self) -> Result<String> {
        self.document()?;
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PageTextSource for PdfExtractor {
    fn page_texts(&self) -> Result<Vec<Option<String>>> {
        let doc = self.document()?;

        let pages: Vec<Option<String>> = doc
            .get_pages()
            .keys()
            .map(|&page| match self.extract_page_text(page) {
                Ok(text) if !text.trim().is_empty() => Some(text),
                Ok(_) => None,
                Err(e) => {
                    trace!("No text on page {}: {}", page, e);
                    None
                }
            })
            .collect();

        if pages.iter().any(Option::is_some) {
            return Ok(pages);
        }

        // Some producers write text lopdf cannot decode
        debug!("lopdf found no page text, falling back to pdf-extract");
        match self.extract_text() {
            Ok(text) => Ok(vec![Some(text)]),
            Err(e) => {
                warn!("pdf-extract fallback failed: {}", e);
                Ok(pages)
            }
        }
    }
}

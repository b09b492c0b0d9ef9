//! PDF text acquisition.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::{ExtractionError, PdfError};

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A document that can report the text of each of its pages.
pub trait PageTextSource {
    /// Page texts in page order; `None` for a page without a text layer.
    fn page_texts(&self) -> Result<Vec<Option<String>>>;
}

/// Combine per-page text into one receipt text.
///
/// Pages without text are skipped and the rest are joined with a single
/// newline. Fails when nothing but whitespace remains.
pub fn acquire_text<I>(pages: I) -> std::result::Result<String, ExtractionError>
where
    I: IntoIterator<Item = Option<String>>,
{
    let text = pages
        .into_iter()
        .flatten()
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if text.trim().is_empty() {
        return Err(ExtractionError::NoText);
    }

    Ok(text)
}

/// Small text PDFs built in memory for tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// A document with one line of Courier text per page.
    pub(crate) fn text_pdf(pages: &[&str]) -> Vec<u8> {
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

        let kids: Vec<Object> = pages
            .iter()
            .map(|text| {
                let content = Content {
                    operations: vec![
                        Operation::new("BT", vec![]),
                        Operation::new("Tf", vec!["F1".into(), 12.into()]),
                        Operation::new("Td", vec![72.into(), 720.into()]),
                        Operation::new("Tj", vec![Object::string_literal(*text)]),
                        Operation::new("ET", vec![]),
                    ],
                };
                let content_id =
                    doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                })
                .into()
            })
            .collect();

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => kids.len() as i64,
                "Kids" => kids,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_text_joins_pages() {
        let pages = vec![Some("uno".to_string()), None, Some("dos".to_string())];
        assert_eq!(acquire_text(pages).unwrap(), "uno\ndos");
    }

    #[test]
    fn test_acquire_text_keeps_whitespace_pages() {
        // Blank but non-empty pages still take part in the join.
        let pages = vec![Some("uno".to_string()), Some(" ".to_string())];
        assert_eq!(acquire_text(pages).unwrap(), "uno\n ");
    }

    #[test]
    fn test_acquire_text_without_text() {
        assert_eq!(acquire_text(Vec::new()), Err(ExtractionError::NoText));
        assert_eq!(
            acquire_text(vec![None, Some("  \n ".to_string())]),
            Err(ExtractionError::NoText)
        );
    }
}

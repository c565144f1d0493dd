//! PDF reader wrapper for PDFium
//!
//! A `PdfReader` binds PDFium, loads the document, pulls out everything the
//! operations need, and releases the document before `open` returns. Nothing
//! holds a PDFium handle past that point.

use crate::chunker::PageText;
use crate::error::{Error, Result};
use pdfium_render::prelude::*;
use std::cmp::Ordering;

/// Vertical distance (points) within which glyphs share a line
const LINE_TOLERANCE: f32 = 5.0;
/// Horizontal gap (points) between one glyph's right edge and the next
/// glyph's left edge that is rendered as a word break
const WORD_GAP: f32 = 2.0;

/// Which pages get their text rendered while the document is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextScope {
    /// Every page
    All,
    /// Only the first N pages (used for density sampling)
    FirstPages(u16),
}

/// Document information dictionary fields
#[derive(Debug, Clone, Default)]
pub struct PdfMetadataInfo {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub creation_date: Option<String>,
}

/// A positioned character on a page
#[derive(Debug, Clone, Copy)]
pub struct Glyph {
    pub ch: char,
    /// Left edge
    pub x: f32,
    /// Right edge
    pub right: f32,
    /// Top edge (PDF coordinates, larger is higher on the page)
    pub y: f32,
}

/// Get PDFium instance (PDFium is not thread-safe, so each reader binds its own)
fn create_pdfium() -> Result<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "/opt/pdfium/lib",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| Error::Pdfium {
            reason: format!("Failed to initialize PDFium: {}", e),
        })?;

    Ok(Pdfium::new(bindings))
}

/// PDF contents read through PDFium
pub struct PdfReader {
    page_count: u32,
    metadata: PdfMetadataInfo,
    has_bookmarks: bool,
    page_texts: Vec<String>,
}

impl PdfReader {
    /// Open a PDF from bytes, rendering text for the pages in `scope`
    pub fn open_bytes(data: &[u8], scope: TextScope) -> Result<Self> {
        if data.len() < 4 || &data[0..4] != b"%PDF" {
            return Err(Error::InvalidPdf {
                reason: "Not a valid PDF file".to_string(),
            });
        }

        let pdfium = create_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(data, None)
            .map_err(Self::map_pdfium_error)?;

        let page_count = document.pages().len() as u32;
        let metadata = Self::extract_metadata(&document);
        let has_bookmarks = document.bookmarks().iter().next().is_some();
        let page_texts = Self::render_page_texts(&document, scope)?;

        tracing::debug!(
            page_count,
            rendered = page_texts.len(),
            "PDF loaded through PDFium"
        );

        Ok(Self {
            page_count,
            metadata,
            has_bookmarks,
            page_texts,
        })
    }

    fn extract_metadata(document: &PdfDocument) -> PdfMetadataInfo {
        let meta = document.metadata();
        let tag = |kind: PdfDocumentMetadataTagType| {
            meta.get(kind)
                .map(|t| t.value().trim().to_string())
                .filter(|v| !v.is_empty())
        };
        PdfMetadataInfo {
            title: tag(PdfDocumentMetadataTagType::Title),
            subject: tag(PdfDocumentMetadataTagType::Subject),
            creator: tag(PdfDocumentMetadataTagType::Creator),
            creation_date: tag(PdfDocumentMetadataTagType::CreationDate),
        }
    }

    fn render_page_texts(document: &PdfDocument, scope: TextScope) -> Result<Vec<String>> {
        let pages = document.pages();
        let limit = match scope {
            TextScope::All => pages.len(),
            TextScope::FirstPages(n) => pages.len().min(n),
        };
        let mut texts = Vec::with_capacity(limit as usize);

        for index in 0..limit {
            let page = pages.get(index).map_err(|e| Error::Pdfium {
                reason: format!("Failed to get page {}: {}", index + 1, e),
            })?;
            texts.push(Self::render_page_text(&page));
        }

        Ok(texts)
    }

    /// Render a page's text in reading order. Pages without a text layer
    /// render as an empty string.
    fn render_page_text(page: &PdfPage) -> String {
        let text_obj = match page.text() {
            Ok(t) => t,
            Err(_) => return String::new(),
        };

        let mut glyphs = Vec::new();
        for segment in text_obj.segments().iter() {
            if let Ok(chars) = segment.chars() {
                for text_char in chars.iter() {
                    if let (Some(ch), Ok(bounds)) =
                        (text_char.unicode_char(), text_char.loose_bounds())
                    {
                        glyphs.push(Glyph {
                            ch,
                            x: bounds.left().value,
                            right: bounds.right().value,
                            y: bounds.top().value,
                        });
                    }
                }
            }
        }

        layout_text(glyphs)
    }

    /// Map PDFium errors to our error type
    fn map_pdfium_error(err: PdfiumError) -> Error {
        match err {
            PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
                Error::PasswordRequired
            }
            PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::FormatError) => {
                Error::InvalidPdf {
                    reason: "PDF file appears to be corrupted".to_string(),
                }
            }
            _ => Error::Pdfium {
                reason: format!("{}", err),
            },
        }
    }

    /// Get the number of pages
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Get PDF metadata
    pub fn metadata(&self) -> &PdfMetadataInfo {
        &self.metadata
    }

    /// Whether the document carries an outline (bookmarks)
    pub fn has_bookmarks(&self) -> bool {
        self.has_bookmarks
    }

    /// Rendered texts, in page order, for the pages in the open scope
    pub fn rendered_texts(&self) -> &[String] {
        &self.page_texts
    }

    /// Consume the reader into numbered page texts
    pub fn into_page_texts(self) -> Vec<PageText> {
        self.page_texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageText::new(i as u32 + 1, text))
            .collect()
    }
}

/// Arrange positioned glyphs into lines of text.
///
/// Glyphs are ordered top to bottom, grouped into a line while they stay
/// within `LINE_TOLERANCE` of the line's first glyph, and each line is read
/// left to right with a space inserted where the blank run between one
/// glyph's right edge and the next glyph's left edge exceeds `WORD_GAP`.
pub fn layout_text(mut glyphs: Vec<Glyph>) -> String {
    if glyphs.is_empty() {
        return String::new();
    }

    glyphs.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
    });

    let mut lines: Vec<Vec<Glyph>> = Vec::new();
    let mut line_y = f32::NAN;
    for glyph in glyphs {
        match lines.last_mut() {
            Some(line) if (line_y - glyph.y).abs() <= LINE_TOLERANCE => line.push(glyph),
            _ => {
                line_y = glyph.y;
                lines.push(vec![glyph]);
            }
        }
    }

    let mut output = String::new();
    for mut line in lines {
        line.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));

        let mut prev_right: Option<f32> = None;
        for glyph in line {
            if let Some(right) = prev_right {
                if glyph.x - right > WORD_GAP && glyph.ch != ' ' && !output.ends_with(' ') {
                    output.push(' ');
                }
            }
            output.push(glyph.ch);
            prev_right = Some(glyph.right);
        }
        output.push('\n');
    }

    output.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, x: f32, y: f32) -> Vec<Glyph> {
        text.chars()
            .enumerate()
            .map(|(i, ch)| Glyph {
                ch,
                x: x + i as f32 * 6.0,
                right: x + i as f32 * 6.0 + 5.5,
                y,
            })
            .collect()
    }

    /// Glyphs laid out with per-character advances, as a real font would
    fn typeset(chars: &[(char, f32)], x: f32, y: f32) -> Vec<Glyph> {
        let mut pen = x;
        chars
            .iter()
            .map(|&(ch, advance)| {
                let glyph = Glyph {
                    ch,
                    x: pen,
                    right: pen + advance,
                    y,
                };
                pen += advance;
                glyph
            })
            .collect()
    }

    #[test]
    fn test_invalid_pdf_detection() {
        let result = PdfReader::open_bytes(b"not a pdf", TextScope::All);
        assert!(matches!(result, Err(Error::InvalidPdf { .. })));
    }

    #[test]
    fn test_layout_empty() {
        assert_eq!(layout_text(Vec::new()), "");
    }

    #[test]
    fn test_layout_orders_lines_top_to_bottom() {
        let mut glyphs = word("second", 10.0, 680.0);
        glyphs.extend(word("first", 10.0, 700.0));
        assert_eq!(layout_text(glyphs), "first\nsecond");
    }

    #[test]
    fn test_layout_joins_jittered_baseline_and_gaps() {
        let mut glyphs = word("world", 100.0, 698.0);
        glyphs.extend(word("hello", 10.0, 700.0));
        assert_eq!(layout_text(glyphs), "hello world");
    }

    #[test]
    fn test_layout_large_font_keeps_words_whole() {
        // Helvetica advances at 24pt
        let glyphs = typeset(
            &[
                ('P', 16.0),
                ('a', 13.3),
                ('g', 13.3),
                ('e', 13.3),
                (' ', 6.7),
                ('1', 13.3),
            ],
            72.0,
            720.0,
        );
        assert_eq!(layout_text(glyphs), "Page 1");
    }

    #[test]
    fn test_layout_wide_letters_in_body_text() {
        let glyphs = typeset(&[('W', 11.3), ('W', 11.3), ('W', 11.3), ('.', 3.3)], 10.0, 500.0);
        assert_eq!(layout_text(glyphs), "WWW.");
    }

    #[test]
    fn test_layout_inserts_space_for_missing_space_glyph() {
        let mut glyphs = typeset(&[('a', 6.7), ('b', 6.7)], 10.0, 500.0);
        glyphs.extend(typeset(&[('c', 6.0), ('d', 6.7)], 10.0 + 13.4 + 3.3, 500.0));
        assert_eq!(layout_text(glyphs), "ab cd");
    }

    #[test]
    fn test_layout_keeps_existing_spaces() {
        let glyphs = word("a b", 10.0, 700.0);
        assert_eq!(layout_text(glyphs), "a b");
    }
}

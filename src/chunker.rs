//! Token-aware chunking of page text
//!
//! Pages are packed greedily, in order, into chunks whose summed token
//! counts stay within a budget. Pages are never split: a page that alone
//! exceeds the budget becomes its own oversized chunk. Every input page
//! lands in exactly one chunk.

use crate::text::TokenCounter;
use serde::{Serialize, Serializer};
use std::fmt;

/// Text rendered from a single page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// Page number (1-indexed)
    pub page: u32,
    /// Rendered (and optionally cleaned) page text
    pub text: String,
}

impl PageText {
    pub fn new(page: u32, text: impl Into<String>) -> Self {
        Self {
            page,
            text: text.into(),
        }
    }
}

/// First and last page covered by a chunk, serialized as `"first-last"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub first: u32,
    pub last: u32,
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.last)
    }
}

impl Serialize for PageRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A run of whole pages packed under a token budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Position among the chunks of one extraction (1-indexed)
    #[serde(rename = "chunk_id")]
    pub id: u32,
    /// Page contents in page order, surrounding whitespace trimmed
    pub text: String,
    /// Sum of the per-page token counts
    pub token_count: usize,
    /// Page numbers in this chunk (1-indexed, ascending)
    pub pages: Vec<u32>,
    /// First and last page, e.g. "3-7"
    pub page_range: PageRange,
}

/// Header inserted ahead of each page's text when page numbers are requested
pub fn page_marker(page: u32) -> String {
    format!("\n--- Page {} ---\n", page)
}

#[derive(Default)]
struct Accumulator {
    text: String,
    tokens: usize,
    pages: Vec<u32>,
}

impl Accumulator {
    fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn push(&mut self, page: u32, content: &str, tokens: usize) {
        self.text.push_str(content);
        self.tokens += tokens;
        self.pages.push(page);
    }

    fn seal(&mut self, id: u32) -> Chunk {
        let Accumulator {
            text,
            tokens,
            pages,
        } = std::mem::take(self);
        // seal is only reached with at least one page
        let page_range = PageRange {
            first: pages[0],
            last: pages[pages.len() - 1],
        };
        Chunk {
            id,
            text: text.trim().to_string(),
            token_count: tokens,
            pages,
            page_range,
        }
    }
}

/// Partition `pages` into token-bounded chunks.
///
/// Token counts are measured per page content (marker included) and summed;
/// the concatenated chunk text is never re-tokenized. The budget check only
/// applies once a chunk already holds a page, so the first page of every
/// chunk is accepted regardless of size.
pub fn chunk_pages(
    pages: &[PageText],
    max_tokens_per_chunk: usize,
    include_page_numbers: bool,
    counter: &dyn TokenCounter,
) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current = Accumulator::default();

    for page in pages {
        let content = if include_page_numbers {
            let mut content = page_marker(page.page);
            content.push_str(&page.text);
            content
        } else {
            page.text.clone()
        };
        let page_tokens = counter.count_tokens(&content);

        if !current.is_empty() && current.tokens + page_tokens > max_tokens_per_chunk {
            let id = chunks.len() as u32 + 1;
            chunks.push(current.seal(id));
        }
        current.push(page.page, &content, page_tokens);
    }

    if !current.is_empty() {
        let id = chunks.len() as u32 + 1;
        chunks.push(current.seal(id));
    }

    tracing::debug!(
        pages = pages.len(),
        chunks = chunks.len(),
        max_tokens_per_chunk,
        "Chunked page text"
    );

    chunks
}

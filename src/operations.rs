//! PDF operations shared by the MCP server and the CLI
//!
//! Each operation opens its source through [`load_pdf`], does its work
//! synchronously, and returns a serializable report. Callers on an async
//! runtime should run these on a blocking thread.

use crate::chunker::{chunk_pages, Chunk};
use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::pdf::{load_pdf, PdfReader, QpdfWrapper, TextScope};
use crate::text::{TextCleaner, TokenCounter};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Pages sampled to estimate text density
const DENSITY_SAMPLE_PAGES: u16 = 3;

// ============================================================================
// Tool outcome
// ============================================================================

/// Tagged result returned by every tool: `{"status": "success", ...}` or
/// `{"status": "error", "error": "..."}`
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolOutcome<T> {
    Success(T),
    Error { error: String },
}

impl<T> ToolOutcome<T> {
    /// Convert an operation result, logging the full error and keeping only
    /// the client-safe message.
    pub fn from_result(operation: &str, result: Result<T>) -> Self {
        match result {
            Ok(report) => ToolOutcome::Success(report),
            Err(e) => {
                tracing::warn!(error = %e, operation, "operation failed");
                ToolOutcome::Error {
                    error: e.client_message(),
                }
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success(_))
    }
}

// ============================================================================
// Info
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PdfInfo {
    pub total_pages: u32,
    /// File size in MB, rounded to two decimals
    pub file_size_mb: f64,
    pub has_bookmarks: bool,
    pub title: Option<String>,
    pub creator: Option<String>,
    pub subject: Option<String>,
    pub creation_date: Option<String>,
    /// Average characters per page over the sampled pages
    pub avg_chars_per_page: u64,
    /// `total_pages * avg_chars_per_page / 4`
    pub estimated_total_tokens: u64,
}

/// Number of output files for common fixed page counts
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ChunkCountEstimates {
    #[serde(rename = "5_pages")]
    pub five_pages: u32,
    #[serde(rename = "10_pages")]
    pub ten_pages: u32,
    #[serde(rename = "20_pages")]
    pub twenty_pages: u32,
    #[serde(rename = "50_pages")]
    pub fifty_pages: u32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ProcessingEstimates {
    pub estimated_chunks: ChunkCountEstimates,
    /// Suggested `pages_per_chunk` for splitting
    pub recommended_chunk_size: u32,
    pub complexity_level: Complexity,
    pub processing_time_estimate_minutes: u32,
}

#[derive(Debug, Serialize)]
pub struct InfoReport {
    pub pdf_info: PdfInfo,
    pub processing_estimates: ProcessingEstimates,
}

/// Derive splitting estimates from page count, size and structure.
pub fn estimate_processing(
    total_pages: u32,
    file_size_mb: f64,
    has_bookmarks: bool,
) -> ProcessingEstimates {
    let (recommended_chunk_size, complexity_level) = if file_size_mb > 50.0 {
        (10, Complexity::High)
    } else if total_pages > 200 {
        (15, Complexity::Medium)
    } else if has_bookmarks {
        (25, Complexity::Low)
    } else {
        (20, Complexity::Medium)
    };

    ProcessingEstimates {
        estimated_chunks: ChunkCountEstimates {
            five_pages: total_pages.div_ceil(5),
            ten_pages: total_pages.div_ceil(10),
            twenty_pages: total_pages.div_ceil(20),
            fifty_pages: total_pages.div_ceil(50),
        },
        recommended_chunk_size,
        complexity_level,
        processing_time_estimate_minutes: (total_pages / 50).max(1),
    }
}

/// Get metadata and basic analytics for a PDF.
pub fn get_pdf_info(path: &Path, config: &ServerConfig) -> Result<InfoReport> {
    let source = load_pdf(path, config.max_file_size_mb)?;
    let file_size_mb = source.size_mb();

    let reader = PdfReader::open_bytes(&source.data, TextScope::FirstPages(DENSITY_SAMPLE_PAGES))?;
    let total_pages = reader.page_count();
    if total_pages == 0 {
        return Err(Error::NoPages);
    }

    let sampled = reader.rendered_texts();
    let sample_chars: usize = sampled.iter().map(|t| t.chars().count()).sum();
    let avg_chars_per_page = if sampled.is_empty() {
        0.0
    } else {
        sample_chars as f64 / sampled.len() as f64
    };
    let estimated_total_tokens = (total_pages as f64 * avg_chars_per_page / 4.0).floor() as u64;

    let processing_estimates =
        estimate_processing(total_pages, file_size_mb, reader.has_bookmarks());

    tracing::info!(
        pages = total_pages,
        size_mb = file_size_mb,
        complexity = ?processing_estimates.complexity_level,
        estimated_tokens = estimated_total_tokens,
        "PDF analysis complete"
    );

    let meta = reader.metadata();
    Ok(InfoReport {
        pdf_info: PdfInfo {
            total_pages,
            file_size_mb: (file_size_mb * 100.0).round() / 100.0,
            has_bookmarks: reader.has_bookmarks(),
            title: meta.title.clone(),
            creator: meta.creator.clone(),
            subject: meta.subject.clone(),
            creation_date: meta.creation_date.clone(),
            avg_chars_per_page: avg_chars_per_page.round() as u64,
            estimated_total_tokens,
        },
        processing_estimates,
    })
}

// ============================================================================
// Split
// ============================================================================

/// Options for splitting a PDF into fixed-size page runs
#[derive(Debug, Clone)]
pub struct SplitOptions {
    pub pages_per_chunk: u32,
    pub output_dir: Option<PathBuf>,
    pub prefix: String,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            pages_per_chunk: 20,
            output_dir: None,
            prefix: "chunk".to_string(),
        }
    }
}

impl SplitOptions {
    pub fn validate(&self, config: &ServerConfig) -> Result<()> {
        if self.pages_per_chunk == 0 || self.pages_per_chunk > config.max_pages_per_chunk {
            return Err(Error::InvalidOptions {
                reason: format!(
                    "pages_per_chunk must be between 1 and {}, got {}",
                    config.max_pages_per_chunk, self.pages_per_chunk
                ),
            });
        }
        if let Some(dir) = &self.output_dir {
            let parent = match dir.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            if !parent.is_dir() {
                return Err(Error::InvalidOptions {
                    reason: format!("Parent directory does not exist: {}", parent.display()),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct SplitChunk {
    pub chunk_id: u32,
    pub file_path: String,
    /// Page span, e.g. "21-40"
    pub pages: String,
    pub page_count: u32,
}

#[derive(Debug, Serialize)]
pub struct SplitReport {
    pub message: String,
    pub source_pdf: String,
    pub output_directory: String,
    pub chunks_created: usize,
    pub chunks: Vec<SplitChunk>,
}

/// Consecutive inclusive page runs of at most `pages_per_chunk` pages
pub fn page_runs(total_pages: u32, pages_per_chunk: u32) -> Vec<(u32, u32)> {
    let step = pages_per_chunk.max(1);
    (0..total_pages)
        .step_by(step as usize)
        .map(|start| (start + 1, (start + step).min(total_pages)))
        .collect()
}

/// File name for one split output
pub fn split_file_name(prefix: &str, chunk_id: u32, first: u32, last: u32) -> String {
    format!("{}_{:02}_pages_{:03}-{:03}.pdf", prefix, chunk_id, first, last)
}

/// Split a PDF into smaller PDFs of `pages_per_chunk` pages each.
pub fn split_pdf(path: &Path, options: &SplitOptions, config: &ServerConfig) -> Result<SplitReport> {
    options.validate(config)?;
    let source = load_pdf(path, config.max_file_size_mb)?;

    let out_dir = match (&options.output_dir, &config.default_output_dir) {
        (Some(dir), _) => dir.clone(),
        (None, Some(default_dir)) => default_dir.join(format!("{}_chunks", source.stem())),
        (None, None) => source
            .parent_dir()
            .join(format!("{}_chunks", source.stem())),
    };
    std::fs::create_dir_all(&out_dir)?;

    let total_pages = QpdfWrapper::page_count(&source.data)?;
    if total_pages == 0 {
        return Err(Error::NoPages);
    }

    let runs = page_runs(total_pages, options.pages_per_chunk);
    let outputs = QpdfWrapper::copy_page_ranges(&source.data, &runs)?;

    let mut chunks = Vec::with_capacity(runs.len());
    for (i, ((first, last), data)) in runs.iter().zip(outputs).enumerate() {
        let chunk_id = i as u32 + 1;
        let file_path = out_dir.join(split_file_name(&options.prefix, chunk_id, *first, *last));
        std::fs::write(&file_path, data)?;

        chunks.push(SplitChunk {
            chunk_id,
            file_path: file_path.display().to_string(),
            pages: format!("{}-{}", first, last),
            page_count: last - first + 1,
        });
    }

    tracing::info!(
        source = %source.path.display(),
        chunks = chunks.len(),
        output_dir = %out_dir.display(),
        "PDF split complete"
    );

    Ok(SplitReport {
        message: format!("Successfully split PDF into {} chunks", chunks.len()),
        source_pdf: source.path.display().to_string(),
        output_directory: out_dir.display().to_string(),
        chunks_created: chunks.len(),
        chunks,
    })
}

// ============================================================================
// Text extraction
// ============================================================================

/// Options for token-aware text extraction
#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    pub max_tokens_per_chunk: usize,
    pub include_page_numbers: bool,
    pub clean_text: bool,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            max_tokens_per_chunk: 8000,
            include_page_numbers: true,
            clean_text: true,
        }
    }
}

impl ExtractionOptions {
    /// Smallest accepted budget is one above this
    pub const MIN_TOKENS_EXCLUSIVE: usize = 100;

    pub fn validate(&self, config: &ServerConfig) -> Result<()> {
        if self.max_tokens_per_chunk <= Self::MIN_TOKENS_EXCLUSIVE
            || self.max_tokens_per_chunk > config.max_token_limit
        {
            return Err(Error::InvalidOptions {
                reason: format!(
                    "max_tokens_per_chunk must be greater than {} and at most {}, got {}",
                    Self::MIN_TOKENS_EXCLUSIVE,
                    config.max_token_limit,
                    self.max_tokens_per_chunk
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct TextExtractionReport {
    /// Source file name
    pub source_pdf: String,
    pub total_pages: u32,
    pub chunks_created: usize,
    pub total_tokens: usize,
    pub avg_tokens_per_chunk: usize,
    /// Largest token count among the produced chunks
    pub max_tokens_per_chunk: usize,
    pub chunks: Vec<Chunk>,
}

impl TextExtractionReport {
    /// Attach aggregate statistics to a chunk list
    pub fn new(source_pdf: String, total_pages: u32, chunks: Vec<Chunk>) -> Self {
        let total_tokens: usize = chunks.iter().map(|c| c.token_count).sum();
        let avg_tokens_per_chunk = if chunks.is_empty() {
            0
        } else {
            (total_tokens as f64 / chunks.len() as f64).round() as usize
        };
        let max_tokens_per_chunk = chunks.iter().map(|c| c.token_count).max().unwrap_or(0);

        Self {
            source_pdf,
            total_pages,
            chunks_created: chunks.len(),
            total_tokens,
            avg_tokens_per_chunk,
            max_tokens_per_chunk,
            chunks,
        }
    }
}

/// Extract text from a PDF in token-aware chunks.
pub fn extract_text(
    path: &Path,
    options: &ExtractionOptions,
    counter: &dyn TokenCounter,
    config: &ServerConfig,
) -> Result<TextExtractionReport> {
    options.validate(config)?;
    let source = load_pdf(path, config.max_file_size_mb)?;
    let reader = PdfReader::open_bytes(&source.data, TextScope::All)?;
    let total_pages = reader.page_count();

    let mut pages = reader.into_page_texts();
    if options.clean_text {
        let cleaner = TextCleaner::new();
        for page in &mut pages {
            page.text = cleaner.clean(&page.text);
        }
    }

    let chunks = chunk_pages(
        &pages,
        options.max_tokens_per_chunk,
        options.include_page_numbers,
        counter,
    );
    let report = TextExtractionReport::new(source.file_name(), total_pages, chunks);

    tracing::info!(
        source = %source.path.display(),
        pages = total_pages,
        chunks = report.chunks_created,
        total_tokens = report.total_tokens,
        tokenizer = counter.name(),
        "Text extraction complete"
    );

    Ok(report)
}

// ============================================================================
// Page range extraction
// ============================================================================

#[derive(Debug, Serialize)]
pub struct RangeReport {
    pub source_pdf: String,
    /// Extracted span, e.g. "3-9"
    pub extracted_pages: String,
    pub page_count: u32,
    pub output_file: String,
}

/// Extract pages `start_page..=end_page` (1-indexed) as a new PDF file.
pub fn extract_range(
    path: &Path,
    start_page: u32,
    end_page: u32,
    output_path: Option<&Path>,
    config: &ServerConfig,
) -> Result<RangeReport> {
    let source = load_pdf(path, config.max_file_size_mb)?;

    let total_pages = QpdfWrapper::page_count(&source.data)?;
    if total_pages == 0 {
        return Err(Error::NoPages);
    }
    if start_page < 1 || end_page > total_pages || start_page > end_page {
        return Err(Error::InvalidPageRange {
            start: start_page,
            end: end_page,
            total: total_pages,
        });
    }

    let output_path = match output_path {
        Some(p) => p.to_path_buf(),
        None => source.parent_dir().join(format!(
            "{}_pages_{}-{}.pdf",
            source.stem(),
            start_page,
            end_page
        )),
    };
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let data = QpdfWrapper::copy_page_range(&source.data, start_page, end_page)?;
    std::fs::write(&output_path, data)?;

    tracing::info!(
        source = %source.path.display(),
        start_page,
        end_page,
        output = %output_path.display(),
        "Page range extracted"
    );

    Ok(RangeReport {
        source_pdf: source.path.display().to_string(),
        extracted_pages: format!("{}-{}", start_page, end_page),
        page_count: end_page - start_page + 1,
        output_file: output_path.display().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::PageRange;
    use crate::pdf::minimal_pdf;
    use crate::text::HeuristicCounter;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn write_pdf(dir: &Path, name: &str, pages: u32) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, minimal_pdf(pages)).unwrap();
        path
    }

    fn chunk(id: u32, tokens: usize, first: u32, last: u32) -> Chunk {
        Chunk {
            id,
            text: String::new(),
            token_count: tokens,
            pages: (first..=last).collect(),
            page_range: PageRange { first, last },
        }
    }

    #[test]
    fn test_outcome_shapes() {
        let ok: ToolOutcome<RangeReport> = ToolOutcome::from_result(
            "extract_range",
            Ok(RangeReport {
                source_pdf: "/a.pdf".to_string(),
                extracted_pages: "1-2".to_string(),
                page_count: 2,
                output_file: "/a_pages_1-2.pdf".to_string(),
            }),
        );
        assert!(ok.is_success());
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["page_count"], 2);

        let err: ToolOutcome<RangeReport> =
            ToolOutcome::from_result("extract_range", Err(Error::NoPages));
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({"status": "error", "error": "PDF has no pages"})
        );
    }

    #[rstest]
    #[case(1, 1.0, false, [1, 1, 1, 1], 20, Complexity::Medium, 1)]
    #[case(40, 2.0, true, [8, 4, 2, 1], 25, Complexity::Low, 1)]
    #[case(450, 12.0, true, [90, 45, 23, 9], 15, Complexity::Medium, 9)]
    #[case(30, 75.5, true, [6, 3, 2, 1], 10, Complexity::High, 1)]
    fn test_estimate_processing(
        #[case] pages: u32,
        #[case] size_mb: f64,
        #[case] bookmarks: bool,
        #[case] counts: [u32; 4],
        #[case] recommended: u32,
        #[case] complexity: Complexity,
        #[case] minutes: u32,
    ) {
        let estimates = estimate_processing(pages, size_mb, bookmarks);
        assert_eq!(
            estimates.estimated_chunks,
            ChunkCountEstimates {
                five_pages: counts[0],
                ten_pages: counts[1],
                twenty_pages: counts[2],
                fifty_pages: counts[3],
            }
        );
        assert_eq!(estimates.recommended_chunk_size, recommended);
        assert_eq!(estimates.complexity_level, complexity);
        assert_eq!(estimates.processing_time_estimate_minutes, minutes);
    }

    #[test]
    fn test_estimate_keys_serialize() {
        let value = serde_json::to_value(estimate_processing(12, 1.0, false)).unwrap();
        assert_eq!(value["estimated_chunks"]["5_pages"], 3);
        assert_eq!(value["estimated_chunks"]["50_pages"], 1);
        assert_eq!(value["complexity_level"], "medium");
    }

    #[test]
    fn test_info_report_fields() {
        let report = InfoReport {
            pdf_info: PdfInfo {
                total_pages: 12,
                file_size_mb: 1.25,
                has_bookmarks: false,
                title: Some("Handbook".to_string()),
                creator: None,
                subject: None,
                creation_date: None,
                avg_chars_per_page: 1800,
                estimated_total_tokens: 5400,
            },
            processing_estimates: estimate_processing(12, 1.25, false),
        };

        let value = serde_json::to_value(&report).unwrap();
        let mut keys: Vec<&str> = value["pdf_info"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "avg_chars_per_page",
                "creation_date",
                "creator",
                "estimated_total_tokens",
                "file_size_mb",
                "has_bookmarks",
                "subject",
                "title",
                "total_pages",
            ]
        );
        assert_eq!(value["pdf_info"]["title"], "Handbook");
    }

    #[test]
    fn test_page_runs() {
        assert_eq!(page_runs(45, 20), vec![(1, 20), (21, 40), (41, 45)]);
        assert_eq!(page_runs(20, 20), vec![(1, 20)]);
        assert_eq!(page_runs(3, 1), vec![(1, 1), (2, 2), (3, 3)]);
        assert!(page_runs(0, 5).is_empty());
    }

    #[test]
    fn test_split_file_name() {
        assert_eq!(
            split_file_name("chunk", 3, 41, 60),
            "chunk_03_pages_041-060.pdf"
        );
        assert_eq!(
            split_file_name("part", 12, 221, 1000),
            "part_12_pages_221-1000.pdf"
        );
    }

    #[test]
    fn test_split_options_validation() {
        let config = ServerConfig::default();
        assert!(SplitOptions::default().validate(&config).is_ok());

        for pages_per_chunk in [0, 201, 500] {
            let options = SplitOptions {
                pages_per_chunk,
                ..SplitOptions::default()
            };
            assert!(matches!(
                options.validate(&config),
                Err(Error::InvalidOptions { .. })
            ));
        }

        let options = SplitOptions {
            output_dir: Some(PathBuf::from("/nonexistent/parent/out")),
            ..SplitOptions::default()
        };
        assert!(matches!(
            options.validate(&config),
            Err(Error::InvalidOptions { .. })
        ));
    }

    #[test]
    fn test_extraction_options_validation() {
        let config = ServerConfig::default();
        assert!(ExtractionOptions::default().validate(&config).is_ok());

        for max_tokens_per_chunk in [0, 100, 32_001, 50_000] {
            let options = ExtractionOptions {
                max_tokens_per_chunk,
                ..ExtractionOptions::default()
            };
            assert!(options.validate(&config).is_err());
        }

        let options = ExtractionOptions {
            max_tokens_per_chunk: 101,
            ..ExtractionOptions::default()
        };
        assert!(options.validate(&config).is_ok());
    }

    #[test]
    fn test_extraction_report_aggregates() {
        let report = TextExtractionReport::new(
            "doc.pdf".to_string(),
            5,
            vec![chunk(1, 200, 1, 2), chunk(2, 101, 3, 4), chunk(3, 50, 5, 5)],
        );
        assert_eq!(report.chunks_created, 3);
        assert_eq!(report.total_tokens, 351);
        assert_eq!(report.avg_tokens_per_chunk, 117);
        assert_eq!(report.max_tokens_per_chunk, 200);

        let empty = TextExtractionReport::new("doc.pdf".to_string(), 0, Vec::new());
        assert_eq!(empty.avg_tokens_per_chunk, 0);
        assert_eq!(empty.max_tokens_per_chunk, 0);
    }

    #[test]
    fn test_split_pdf_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf(dir.path(), "report.pdf", 7);
        let options = SplitOptions {
            pages_per_chunk: 3,
            ..SplitOptions::default()
        };

        let report = split_pdf(&path, &options, &ServerConfig::default()).unwrap();

        let expected_dir = dir.path().join("report_chunks");
        assert_eq!(report.output_directory, expected_dir.display().to_string());
        assert_eq!(report.chunks_created, 3);
        assert_eq!(report.message, "Successfully split PDF into 3 chunks");

        let spans: Vec<(&str, u32)> = report
            .chunks
            .iter()
            .map(|c| (c.pages.as_str(), c.page_count))
            .collect();
        assert_eq!(spans, vec![("1-3", 3), ("4-6", 3), ("7-7", 1)]);

        let last = expected_dir.join("chunk_03_pages_007-007.pdf");
        assert!(last.is_file());
        let data = std::fs::read(last).unwrap();
        assert_eq!(QpdfWrapper::page_count(&data).unwrap(), 1);
    }

    #[test]
    fn test_split_pdf_explicit_dir_and_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf(dir.path(), "book.pdf", 4);
        let out_dir = dir.path().join("parts");
        let options = SplitOptions {
            pages_per_chunk: 2,
            output_dir: Some(out_dir.clone()),
            prefix: "part".to_string(),
        };

        let report = split_pdf(&path, &options, &ServerConfig::default()).unwrap();
        assert_eq!(report.chunks_created, 2);
        assert!(out_dir.join("part_01_pages_001-002.pdf").is_file());
        assert!(out_dir.join("part_02_pages_003-004.pdf").is_file());
    }

    #[test]
    fn test_split_uses_configured_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf(dir.path(), "book.pdf", 2);
        let config = ServerConfig {
            default_output_dir: Some(dir.path().join("outputs")),
            ..ServerConfig::default()
        };

        let report = split_pdf(&path, &SplitOptions::default(), &config).unwrap();
        assert_eq!(
            report.output_directory,
            dir.path().join("outputs").join("book_chunks").display().to_string()
        );
        assert_eq!(report.chunks_created, 1);
    }

    #[test]
    fn test_split_missing_file() {
        let result = split_pdf(
            Path::new("/nonexistent/file.pdf"),
            &SplitOptions::default(),
            &ServerConfig::default(),
        );
        assert!(matches!(result, Err(Error::PdfNotFound { .. })));
    }

    #[test]
    fn test_extract_range_default_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf(dir.path(), "paper.pdf", 6);

        let report = extract_range(&path, 2, 4, None, &ServerConfig::default()).unwrap();
        let expected = dir.path().join("paper_pages_2-4.pdf");
        assert_eq!(report.output_file, expected.display().to_string());
        assert_eq!(report.extracted_pages, "2-4");
        assert_eq!(report.page_count, 3);

        let data = std::fs::read(expected).unwrap();
        assert_eq!(QpdfWrapper::page_count(&data).unwrap(), 3);
    }

    #[test]
    fn test_extract_range_explicit_output_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf(dir.path(), "paper.pdf", 3);
        let output = dir.path().join("a").join("b").join("first.pdf");

        let report =
            extract_range(&path, 1, 1, Some(&output), &ServerConfig::default()).unwrap();
        assert_eq!(report.page_count, 1);
        assert!(output.is_file());
    }

    #[rstest]
    #[case(0, 2)]
    #[case(2, 9)]
    #[case(3, 1)]
    fn test_extract_range_invalid(#[case] start: u32, #[case] end: u32) {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf(dir.path(), "paper.pdf", 5);

        let err = extract_range(&path, start, end, None, &ServerConfig::default()).unwrap_err();
        assert_eq!(
            err.client_message(),
            format!("Invalid page range {}-{}. PDF has 5 pages.", start, end)
        );
    }

    #[test]
    fn test_file_size_limit_applies_to_all_operations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.pdf");
        let mut data = b"%PDF-1.4\n".to_vec();
        data.resize(2 * 1024 * 1024, b' ');
        std::fs::write(&path, &data).unwrap();

        let config = ServerConfig {
            max_file_size_mb: 1,
            ..ServerConfig::default()
        };

        assert!(matches!(
            get_pdf_info(&path, &config),
            Err(Error::FileTooLarge { .. })
        ));
        assert!(matches!(
            extract_text(&path, &ExtractionOptions::default(), &HeuristicCounter, &config),
            Err(Error::FileTooLarge { .. })
        ));
        assert!(matches!(
            extract_range(&path, 1, 1, None, &config),
            Err(Error::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_info_missing_file() {
        let result = get_pdf_info(Path::new("/nonexistent/file.pdf"), &ServerConfig::default());
        assert!(matches!(result, Err(Error::PdfNotFound { .. })));
    }

    // Requires the PDFium shared library
    #[test]
    #[ignore]
    fn test_get_pdf_info_reads_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf(dir.path(), "report.pdf", 3);

        let report = get_pdf_info(&path, &ServerConfig::default()).unwrap();
        assert_eq!(report.pdf_info.total_pages, 3);
        assert!(!report.pdf_info.has_bookmarks);
        assert!(report.pdf_info.avg_chars_per_page > 0);
        assert_eq!(report.processing_estimates.recommended_chunk_size, 20);
    }

    // Requires the PDFium shared library
    #[test]
    #[ignore]
    fn test_extract_text_reads_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf(dir.path(), "report.pdf", 3);

        let report = extract_text(
            &path,
            &ExtractionOptions::default(),
            &HeuristicCounter,
            &ServerConfig::default(),
        )
        .unwrap();
        assert_eq!(report.source_pdf, "report.pdf");
        assert_eq!(report.total_pages, 3);
        assert_eq!(report.chunks_created, 1);

        let chunk = &report.chunks[0];
        assert_eq!(chunk.pages, vec![1, 2, 3]);
        assert!(chunk.text.contains("--- Page 1 ---"));
        assert!(chunk.text.contains("Page 1"));
        assert!(chunk.text.contains("Page 3"));
    }
}

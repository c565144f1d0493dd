//! MCP Server implementation using rmcp

use crate::config::ServerConfig;
use crate::error::Error;
use crate::operations::{
    extract_range, extract_text, get_pdf_info, split_pdf, ExtractionOptions, SplitOptions,
    ToolOutcome,
};
use crate::text::{load_token_counter, SharedTokenCounter};
use rmcp::{
    handler::server::tool::ToolRouter, handler::server::wrapper::Parameters, model::*,
    schemars::JsonSchema, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct InfoParams {
    /// Path to the PDF file
    pub pdf_path: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SplitParams {
    /// Path to the PDF file
    pub pdf_path: String,
    /// Pages per output file (default: 20)
    #[serde(default = "default_pages_per_chunk")]
    pub pages_per_chunk: u32,
    /// Output directory (default: `<pdf name>_chunks` next to the source)
    #[serde(default)]
    pub output_dir: Option<String>,
    /// File name prefix for the output files (default: "chunk")
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExtractTextParams {
    /// Path to the PDF file
    pub pdf_path: String,
    /// Token budget for each chunk (default: 8000)
    #[serde(default = "default_max_tokens")]
    pub max_tokens_per_chunk: usize,
    /// Prefix each page with a `--- Page N ---` marker (default: true)
    #[serde(default = "default_true")]
    pub include_page_numbers: bool,
    /// Normalize whitespace and strip artifacts (default: true)
    #[serde(default = "default_true")]
    pub clean_text: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExtractRangeParams {
    /// Path to the PDF file
    pub pdf_path: String,
    /// First page to extract (1-indexed)
    pub start_page: u32,
    /// Last page to extract (inclusive)
    pub end_page: u32,
    /// Output file (default: `<pdf name>_pages_S-E.pdf` next to the source)
    #[serde(default)]
    pub output_path: Option<String>,
}

fn default_pages_per_chunk() -> u32 {
    SplitOptions::default().pages_per_chunk
}

fn default_prefix() -> String {
    SplitOptions::default().prefix
}

fn default_max_tokens() -> usize {
    ExtractionOptions::default().max_tokens_per_chunk
}

fn default_true() -> bool {
    true
}

/// Short id attached to every tool call's log span
fn correlation_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn respond<T: Serialize>(tool: &str, result: crate::Result<T>) -> String {
    let outcome = ToolOutcome::from_result(tool, result);
    if outcome.is_success() {
        tracing::info!(tool, "Tool call succeeded");
    }
    serde_json::to_string_pretty(&outcome).unwrap_or_default()
}

// ============================================================================
// Server
// ============================================================================

/// Prometheus PDF MCP Server
#[derive(Clone)]
pub struct PrometheusServer {
    tool_router: ToolRouter<Self>,
    /// Server configuration
    config: Arc<ServerConfig>,
    /// Token counter shared by every extraction
    tokenizer: SharedTokenCounter,
}

#[tool_router]
impl PrometheusServer {
    /// Create a server with the tokenizer named in `config`
    pub fn new(config: ServerConfig) -> Self {
        let tokenizer = load_token_counter(&config.tokenizer_encoding);
        Self::with_tokenizer(config, tokenizer)
    }

    pub fn with_tokenizer(config: ServerConfig, tokenizer: SharedTokenCounter) -> Self {
        Self {
            tool_router: Self::tool_router(),
            config: Arc::new(config),
            tokenizer,
        }
    }

    /// Get PDF metadata and processing estimates
    #[tool(
        description = "Get metadata and processing estimates for a PDF: page count, file size, bookmarks, document properties, average text density, estimated tokens, and a recommended split size."
    )]
    async fn prometheus_info(&self, Parameters(params): Parameters<InfoParams>) -> String {
        let span = tracing::info_span!(
            "tool_call",
            tool = "prometheus_info",
            correlation_id = %correlation_id()
        );
        async move {
            tracing::info!(pdf_path = %params.pdf_path, "Tool called");
            let path = PathBuf::from(params.pdf_path);
            let result = self
                .run_blocking(move |config| get_pdf_info(&path, config))
                .await;
            respond("prometheus_info", result)
        }
        .instrument(span)
        .await
    }

    /// Split a PDF into fixed-size page runs
    #[tool(
        description = "Split a large PDF into smaller PDF files of pages_per_chunk pages each. Output files are named <prefix>_NN_pages_SSS-EEE.pdf."
    )]
    async fn prometheus_split(&self, Parameters(params): Parameters<SplitParams>) -> String {
        let span = tracing::info_span!(
            "tool_call",
            tool = "prometheus_split",
            correlation_id = %correlation_id()
        );
        async move {
            tracing::info!(
                pdf_path = %params.pdf_path,
                pages_per_chunk = params.pages_per_chunk,
                "Tool called"
            );
            let path = PathBuf::from(params.pdf_path);
            let options = SplitOptions {
                pages_per_chunk: params.pages_per_chunk,
                output_dir: params.output_dir.map(PathBuf::from),
                prefix: params.prefix,
            };
            let result = match options.validate(&self.config) {
                Ok(()) => {
                    self.run_blocking(move |config| split_pdf(&path, &options, config))
                        .await
                }
                Err(e) => Err(e),
            };
            respond("prometheus_split", result)
        }
        .instrument(span)
        .await
    }

    /// Extract text in token-aware chunks
    #[tool(
        description = "Extract text from a PDF as chunks of whole pages, each kept under max_tokens_per_chunk tokens. A single page larger than the budget becomes its own chunk. Returns chunk texts, page lists, and token statistics."
    )]
    async fn prometheus_extract_text(
        &self,
        Parameters(params): Parameters<ExtractTextParams>,
    ) -> String {
        let span = tracing::info_span!(
            "tool_call",
            tool = "prometheus_extract_text",
            correlation_id = %correlation_id()
        );
        async move {
            tracing::info!(
                pdf_path = %params.pdf_path,
                max_tokens_per_chunk = params.max_tokens_per_chunk,
                "Tool called"
            );
            let path = PathBuf::from(params.pdf_path);
            let options = ExtractionOptions {
                max_tokens_per_chunk: params.max_tokens_per_chunk,
                include_page_numbers: params.include_page_numbers,
                clean_text: params.clean_text,
            };
            let result = match options.validate(&self.config) {
                Ok(()) => {
                    let counter = Arc::clone(&self.tokenizer);
                    self.run_blocking(move |config| {
                        extract_text(&path, &options, counter.as_ref(), config)
                    })
                    .await
                }
                Err(e) => Err(e),
            };
            respond("prometheus_extract_text", result)
        }
        .instrument(span)
        .await
    }

    /// Extract a page range into a new PDF
    #[tool(
        description = "Extract pages start_page through end_page (1-indexed, inclusive) from a PDF into a new PDF file."
    )]
    async fn prometheus_extract_range(
        &self,
        Parameters(params): Parameters<ExtractRangeParams>,
    ) -> String {
        let span = tracing::info_span!(
            "tool_call",
            tool = "prometheus_extract_range",
            correlation_id = %correlation_id()
        );
        async move {
            tracing::info!(
                pdf_path = %params.pdf_path,
                start_page = params.start_page,
                end_page = params.end_page,
                "Tool called"
            );
            let path = PathBuf::from(params.pdf_path);
            let output = params.output_path.map(PathBuf::from);
            let (start, end) = (params.start_page, params.end_page);
            let result = self
                .run_blocking(move |config| {
                    extract_range(&path, start, end, output.as_deref(), config)
                })
                .await;
            respond("prometheus_extract_range", result)
        }
        .instrument(span)
        .await
    }

    /// Run CPU-bound PDF work on the blocking pool under the processing timeout
    async fn run_blocking<T, F>(&self, operation: F) -> crate::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&ServerConfig) -> crate::Result<T> + Send + 'static,
    {
        let seconds = self.config.processing_timeout_secs;
        let config = Arc::clone(&self.config);
        let span = tracing::Span::current();

        let task = tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            operation(config.as_ref())
        });

        match tokio::time::timeout(Duration::from_secs(seconds), task).await {
            Ok(joined) => joined.map_err(|e| Error::Pdfium {
                reason: format!("Task join error: {}", e),
            })?,
            Err(_) => Err(Error::Timeout { seconds }),
        }
    }
}

#[tool_handler]
impl ServerHandler for PrometheusServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Prometheus PDF prepares large PDFs for language models. \
                 Start with prometheus_info to see page count and a recommended split size, \
                 then use prometheus_split or prometheus_extract_range to cut the document, \
                 or prometheus_extract_text to get token-bounded text chunks."
                    .into(),
            ),
        }
    }
}

/// Run the MCP server on stdio
pub async fn run_server_with_config(config: ServerConfig) -> anyhow::Result<()> {
    let server = PrometheusServer::new(config);

    tracing::info!(
        tokenizer = server.tokenizer.name(),
        "Prometheus PDF server ready, waiting for connections..."
    );

    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}

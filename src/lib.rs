//! Prometheus PDF Library
//!
//! Prepares large PDFs for language models. Exposed as MCP tools:
//! - `prometheus_info`: Metadata and processing estimates
//! - `prometheus_split`: Split a PDF into fixed-size page runs
//! - `prometheus_extract_text`: Token-aware text chunks of whole pages
//! - `prometheus_extract_range`: Extract a page range as a new PDF

pub mod chunker;
pub mod config;
pub mod error;
pub mod operations;
pub mod pdf;
pub mod server;
pub mod text;

pub use chunker::{chunk_pages, Chunk, PageRange, PageText};
pub use config::{LogFormat, ServerConfig};
pub use error::{Error, Result};
pub use server::{run_server_with_config, PrometheusServer};
pub use text::{SharedTokenCounter, TokenCounter};

//! Error types for Prometheus PDF

use thiserror::Error;

/// Result type alias for Prometheus PDF
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Prometheus PDF
#[derive(Error, Debug)]
pub enum Error {
    /// PDF file not found
    #[error("PDF file not found: {path}")]
    PdfNotFound { path: String },

    /// PDF file exceeds the configured size limit
    #[error("PDF file too large: {size_mb:.1}MB (max: {max_mb}MB)")]
    FileTooLarge { size_mb: f64, max_mb: u64 },

    /// Invalid PDF file
    #[error("Invalid PDF file: {reason}")]
    InvalidPdf { reason: String },

    /// PDF is password protected
    #[error("PDF is password protected")]
    PasswordRequired,

    /// PDF has no pages
    #[error("PDF has no pages")]
    NoPages,

    /// Requested page range does not fit the document
    #[error("Invalid page range {start}-{end}. PDF has {total} pages.")]
    InvalidPageRange { start: u32, end: u32, total: u32 },

    /// Tool or CLI options failed validation
    #[error("Invalid options: {reason}")]
    InvalidOptions { reason: String },

    /// Processing exceeded the configured timeout
    #[error("Processing timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Invalid configuration value
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// PDFium error
    #[error("PDFium error: {reason}")]
    Pdfium { reason: String },

    /// qpdf error
    #[error("qpdf error: {reason}")]
    QpdfError { reason: String },
}

impl Error {
    /// Return a sanitized error message safe to send to clients.
    /// Library internals and IO details are omitted; log the full error
    /// via tracing before calling this.
    pub fn client_message(&self) -> String {
        match self {
            Error::PdfNotFound { path } => format!("PDF file not found: {}", path),
            Error::FileTooLarge { .. } => self.to_string(),
            Error::InvalidPdf { .. } => "Invalid PDF file".to_string(),
            Error::PasswordRequired => "PDF is password protected".to_string(),
            Error::NoPages => "PDF has no pages".to_string(),
            Error::InvalidPageRange { .. } => self.to_string(),
            Error::InvalidOptions { .. } => self.to_string(),
            Error::Timeout { .. } => self.to_string(),
            Error::Config { .. } => "Server configuration error".to_string(),
            Error::Io(_) => "I/O error".to_string(),
            Error::Pdfium { .. } => "PDF processing error".to_string(),
            Error::QpdfError { .. } => "PDF processing error".to_string(),
        }
    }
}

//! Loading PDF bytes from disk with size and header checks

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// PDF bytes read from a file path
pub struct SourcePdf {
    pub path: PathBuf,
    pub data: Vec<u8>,
}

impl SourcePdf {
    /// File size in megabytes
    pub fn size_mb(&self) -> f64 {
        self.data.len() as f64 / BYTES_PER_MB
    }

    /// File name without directories, for reporting
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// File name without extension, used to name derived outputs
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string())
    }

    /// Directory holding the source file
    pub fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// Read a PDF from `path`, enforcing `max_file_size_mb`.
pub fn load_pdf<P: AsRef<Path>>(path: P, max_file_size_mb: u64) -> Result<SourcePdf> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(Error::PdfNotFound {
            path: path.display().to_string(),
        });
    }

    let size_mb = std::fs::metadata(path)?.len() as f64 / BYTES_PER_MB;
    if size_mb > max_file_size_mb as f64 {
        return Err(Error::FileTooLarge {
            size_mb,
            max_mb: max_file_size_mb,
        });
    }

    tracing::info!(file_path = %path.display(), size_mb, "Opening PDF");

    let data = std::fs::read(path)?;
    if data.len() < 4 || &data[0..4] != b"%PDF" {
        return Err(Error::InvalidPdf {
            reason: "Not a valid PDF file".to_string(),
        });
    }

    Ok(SourcePdf {
        path: path.to_path_buf(),
        data,
    })
}

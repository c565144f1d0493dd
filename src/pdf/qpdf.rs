//! qpdf FFI wrapper for page copying
//!
//! Splitting and range extraction copy whole pages into fresh documents,
//! preserving all visual content, using the qpdf crate (vendored FFI).

use crate::error::{Error, Result};
use qpdf::QPdf;

/// Wrapper for qpdf operations via FFI
pub struct QpdfWrapper;

/// Helper: open a QPdf from memory
fn open_qpdf(data: &[u8]) -> Result<QPdf> {
    QPdf::read_from_memory(data).map_err(map_qpdf_error)
}

/// Map qpdf crate errors to our error types
fn map_qpdf_error(e: qpdf::QPdfError) -> Error {
    match e.error_code() {
        qpdf::QPdfErrorCode::InvalidPassword => Error::PasswordRequired,
        _ => Error::QpdfError {
            reason: e.to_string(),
        },
    }
}

impl QpdfWrapper {
    /// Get the page count of a PDF
    pub fn page_count(input_data: &[u8]) -> Result<u32> {
        let qpdf = open_qpdf(input_data)?;
        qpdf.get_num_pages().map_err(map_qpdf_error)
    }

    /// Copy the pages `first..=last` (1-indexed, inclusive) into a new PDF.
    pub fn copy_page_range(input_data: &[u8], first: u32, last: u32) -> Result<Vec<u8>> {
        let mut outputs = Self::copy_page_ranges(input_data, &[(first, last)])?;
        outputs.pop().ok_or_else(|| Error::QpdfError {
            reason: "No output produced".to_string(),
        })
    }

    /// Copy each inclusive 1-indexed page range into its own new PDF,
    /// parsing the source document once.
    pub fn copy_page_ranges(input_data: &[u8], ranges: &[(u32, u32)]) -> Result<Vec<Vec<u8>>> {
        let source = open_qpdf(input_data)?;
        let total = source.get_num_pages().map_err(map_qpdf_error)?;

        let mut outputs = Vec::with_capacity(ranges.len());
        for &(first, last) in ranges {
            if first < 1 || last > total || first > last {
                return Err(Error::InvalidPageRange {
                    start: first,
                    end: last,
                    total,
                });
            }

            let dest = QPdf::empty();
            for index in (first - 1)..last {
                let page = source.get_page(index).ok_or(Error::InvalidPageRange {
                    start: first,
                    end: last,
                    total,
                })?;
                let copied = dest.copy_from_foreign(&page);
                dest.add_page(&copied, false).map_err(map_qpdf_error)?;
            }

            let mut writer = dest.writer();
            writer.preserve_encryption(false);
            outputs.push(writer.write_to_memory().map_err(map_qpdf_error)?);
        }

        Ok(outputs)
    }
}

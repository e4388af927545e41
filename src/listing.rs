//! Input listings
//!
//! Reads candidate files for the CLI: a JSON listing (an array of descriptors,
//! or an object with a `files` array) or a local directory of page images.

use crate::page_order::FileDescriptor;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Listing error types
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Input not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON listing: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid record {index}: {source}")]
    Record {
        index: usize,
        source: serde_json::Error,
    },

    #[error("Listing must be a JSON array or an object with a \"files\" array")]
    Shape,
}

pub type Result<T> = std::result::Result<T, ListingError>;

/// Load descriptors from a JSON file or a directory
pub fn load(path: &Path) -> Result<Vec<FileDescriptor>> {
    if path.is_dir() {
        from_directory(path)
    } else if path.is_file() {
        let content = std::fs::read_to_string(path).map_err(|source| ListingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        from_json_str(&content)
    } else {
        Err(ListingError::NotFound(path.to_path_buf()))
    }
}

/// Parse a JSON listing.
///
/// Records are decoded one by one so an error names the offending index.
pub fn from_json_str(content: &str) -> Result<Vec<FileDescriptor>> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    let records = match value {
        serde_json::Value::Array(records) => records,
        serde_json::Value::Object(mut map) => match map.remove("files") {
            Some(serde_json::Value::Array(records)) => records,
            _ => return Err(ListingError::Shape),
        },
        _ => return Err(ListingError::Shape),
    };

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_value(record).map_err(|source| ListingError::Record { index, source })
        })
        .collect()
}

/// Regular, non-hidden files in a directory, in name order
pub fn from_directory(dir: &Path) -> Result<Vec<FileDescriptor>> {
    let io_err = |source| ListingError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if !entry.file_type().map_err(io_err)?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') {
            names.push(name);
        }
    }
    names.sort();

    Ok(names
        .into_iter()
        .map(|name| {
            let descriptor = FileDescriptor::new(name.clone(), name.clone());
            match guess_mime_type(&name) {
                Some(mime) => descriptor.with_mime_type(mime),
                None => descriptor,
            }
        })
        .collect())
}

/// MIME type from a file extension
pub fn guess_mime_type(name: &str) -> Option<&'static str> {
    let (_, ext) = name.rsplit_once('.')?;
    let mime = match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "jp2" => "image/jp2",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => return None,
    };
    Some(mime)
}

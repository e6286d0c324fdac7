//! File Attachment Ports
//!
//! Seams for the two external collaborators the request composer calls
//! into: the file loader (path -> upload-ready descriptor) and the image
//! compressor (path -> smaller path, failure tolerated). A filesystem
//! loader ships as the default; no compressor implementation ships, so
//! compression only happens when the caller installs one.

use crate::config::ImagePolicy;
use crate::types::FileDescriptor;
use async_trait::async_trait;
use base64::Engine;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File loading errors
#[derive(Error, Debug)]
pub enum FileLoadError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("path has no usable file name: {0}")]
    NoFileName(String),
}

/// Loads a local file into an upload-ready descriptor.
///
/// Loader output must always be a conforming descriptor: all three fields
/// populated, content base64-encoded.
#[async_trait]
pub trait FileLoader: Send + Sync {
    async fn load(&self, path: &Path) -> Result<FileDescriptor, FileLoadError>;
}

/// Image compression error
#[derive(Error, Debug)]
#[error("image compression failed for {path}: {message}")]
pub struct CompressError {
    pub path: String,
    pub message: String,
}

/// Shrinks an image before upload, returning the path of the compressed
/// copy. Failure is tolerated by the composer, which logs and falls back
/// to the original path; it must never abort a request.
#[async_trait]
pub trait ImageCompressor: Send + Sync {
    async fn compress(&self, path: &Path, policy: &ImagePolicy)
        -> Result<PathBuf, CompressError>;
}

/// Default loader reading from the local filesystem.
pub struct FsFileLoader;

#[async_trait]
impl FileLoader for FsFileLoader {
    async fn load(&self, path: &Path) -> Result<FileDescriptor, FileLoadError> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| FileLoadError::NoFileName(path.display().to_string()))?
            .to_string();

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FileLoadError::NotFound(path.display().to_string())
            } else {
                FileLoadError::Io {
                    path: path.display().to_string(),
                    source: e,
                }
            }
        })?;

        Ok(FileDescriptor {
            filename,
            content_type: content_type_for_path(path).to_string(),
            base64: base64::engine::general_purpose::STANDARD.encode(&bytes),
        })
    }
}

/// Extension-based MIME guess with an octet-stream fallback.
pub fn content_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("csv") => "text/csv",
        Some("html") | Some("htm") => "text/html",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}

pub(crate) fn is_image(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock loader producing a fixed-content descriptor per path.
    pub struct MockFileLoader {
        fail: bool,
        calls: AtomicUsize,
    }

    impl MockFileLoader {
        pub fn new() -> Self {
            Self {
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn new_failing() -> Self {
            Self {
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Default for MockFileLoader {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl FileLoader for MockFileLoader {
        async fn load(&self, path: &Path) -> Result<FileDescriptor, FileLoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FileLoadError::NotFound(path.display().to_string()));
            }
            Ok(FileDescriptor {
                filename: path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or("file")
                    .to_string(),
                content_type: content_type_for_path(path).to_string(),
                base64: "bW9jaw==".to_string(),
            })
        }
    }

    /// Mock compressor that either rewrites to a fixed path or fails.
    pub struct MockImageCompressor {
        target: Option<PathBuf>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl MockImageCompressor {
        pub fn rewriting_to(path: impl Into<PathBuf>) -> Self {
            Self {
                target: Some(path.into()),
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn new_failing() -> Self {
            Self {
                target: None,
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageCompressor for MockImageCompressor {
        async fn compress(
            &self,
            path: &Path,
            _policy: &ImagePolicy,
        ) -> Result<PathBuf, CompressError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CompressError {
                    path: path.display().to_string(),
                    message: "mock failure".to_string(),
                });
            }
            Ok(self
                .target
                .clone()
                .unwrap_or_else(|| path.to_path_buf()))
        }
    }
}

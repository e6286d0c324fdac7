//! Task Request Composition
//!
//! Builds the outbound payload for one task invocation and enforces the
//! payload-level constraints: attachment ceiling, descriptor shape, input
//! shape. Validation here is the only error class the SDK raises; it fires
//! before any network call.

use crate::config::ImagePolicy;
use crate::error::{Result, SdkError};
use crate::files::{content_type_for_path, is_image, FileLoader, ImageCompressor};
use crate::types::FileDescriptor;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Attachment ceiling per request.
pub const MAX_FILES_PER_REQUEST: usize = 10;

const DESCRIPTOR_KEYS: [&str; 3] = ["filename", "content_type", "base64"];

/// One attachment, in any of the accepted shapes.
#[derive(Debug, Clone)]
pub enum FileInput {
    /// Local path, resolved through the file loader. Image paths may be
    /// swapped for a compressed copy first, per the client's image policy.
    Path(PathBuf),
    /// Ready-made descriptor, sent as-is.
    Descriptor(FileDescriptor),
    /// Loose JSON, validated for the mandatory descriptor keys.
    Raw(Value),
}

impl From<&str> for FileInput {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<String> for FileInput {
    fn from(path: String) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<PathBuf> for FileInput {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for FileInput {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<FileDescriptor> for FileInput {
    fn from(descriptor: FileDescriptor) -> Self {
        Self::Descriptor(descriptor)
    }
}

impl From<Value> for FileInput {
    fn from(value: Value) -> Self {
        Self::Raw(value)
    }
}

/// Outbound request for one task invocation.
#[derive(Debug, Clone, Default)]
pub struct TaskRequest {
    pub user_id: String,
    pub session_id: String,
    /// Free-form content. `None` is omitted from the wire entirely; an
    /// explicitly empty string is still sent.
    pub content: Option<String>,
    /// Attached files, at most [`MAX_FILES_PER_REQUEST`].
    pub files: Vec<FileInput>,
    /// Extra named options (e.g. `domain`, `effort`) merged verbatim into
    /// the payload top level. Colliding with the reserved keys `user_id`,
    /// `session_id`, `content` or `files` is last-writer-wins; avoid it.
    pub options: Map<String, Value>,
}

impl TaskRequest {
    pub fn new(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
            ..Default::default()
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn file(mut self, file: impl Into<FileInput>) -> Self {
        self.files.push(file.into());
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// Build the wire payload for a request.
///
/// Insertion order matches the engine's reference clients: identity fields,
/// then extra options (which therefore win a reserved-key collision), then
/// content, then prepared files.
pub(crate) async fn compose_payload(
    request: &TaskRequest,
    loader: &dyn FileLoader,
    compressor: Option<&dyn ImageCompressor>,
    image: &ImagePolicy,
) -> Result<Value> {
    let mut payload = Map::new();
    payload.insert("user_id".to_string(), Value::String(request.user_id.clone()));
    payload.insert(
        "session_id".to_string(),
        Value::String(request.session_id.clone()),
    );
    for (key, value) in &request.options {
        payload.insert(key.clone(), value.clone());
    }
    if let Some(content) = &request.content {
        payload.insert("content".to_string(), Value::String(content.clone()));
    }

    let files = prepare_files(&request.files, loader, compressor, image).await?;
    if !files.is_empty() {
        payload.insert("files".to_string(), serde_json::to_value(files)?);
    }

    Ok(Value::Object(payload))
}

/// Normalize attachments into validated descriptors.
pub(crate) async fn prepare_files(
    inputs: &[FileInput],
    loader: &dyn FileLoader,
    compressor: Option<&dyn ImageCompressor>,
    image: &ImagePolicy,
) -> Result<Vec<FileDescriptor>> {
    if inputs.len() > MAX_FILES_PER_REQUEST {
        return Err(SdkError::TooManyFiles {
            count: inputs.len(),
            max: MAX_FILES_PER_REQUEST,
        });
    }

    let mut prepared = Vec::with_capacity(inputs.len());
    for input in inputs {
        match input {
            FileInput::Path(path) => {
                let path_to_load = maybe_compress(path, compressor, image).await;
                prepared.push(loader.load(&path_to_load).await?);
            }
            FileInput::Descriptor(descriptor) => prepared.push(descriptor.clone()),
            FileInput::Raw(value) => prepared.push(descriptor_from_raw(value)?),
        }
    }
    Ok(prepared)
}

/// Best-effort image compression: swap in the compressed path on success,
/// keep the original on failure or when no compressor is installed.
async fn maybe_compress(
    path: &Path,
    compressor: Option<&dyn ImageCompressor>,
    image: &ImagePolicy,
) -> PathBuf {
    if !image.auto_compress || !is_image(content_type_for_path(path)) {
        return path.to_path_buf();
    }
    let Some(compressor) = compressor else {
        return path.to_path_buf();
    };
    match compressor.compress(path, image).await {
        Ok(compressed) => {
            info!(
                target: "scistream.client",
                original = %path.display(),
                compressed = %compressed.display(),
                "compressed image attachment"
            );
            compressed
        }
        Err(err) => {
            warn!(
                target: "scistream.client",
                path = %path.display(),
                error = %err,
                "image compression failed, using original"
            );
            path.to_path_buf()
        }
    }
}

fn descriptor_from_raw(value: &Value) -> Result<FileDescriptor> {
    let Some(object) = value.as_object() else {
        return Err(SdkError::UnsupportedFileInput);
    };
    let missing: Vec<String> = DESCRIPTOR_KEYS
        .iter()
        .filter(|key| !object.contains_key(**key))
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SdkError::InvalidFileDescriptor { missing });
    }
    serde_json::from_value(value.clone()).map_err(|_| SdkError::UnsupportedFileInput)
}

//! Client Configuration
//!
//! Immutable per-client settings. A configuration is built once and shared
//! read-only across task invocations; it holds no per-task state.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Image handling policy for path attachments.
#[derive(Debug, Clone)]
pub struct ImagePolicy {
    /// Compress image files before upload. Oversized uploads otherwise risk
    /// 413 rejections from the engine.
    pub auto_compress: bool,
    /// Max dimension (width or height) after resizing.
    pub max_dim: u32,
    /// JPEG quality, 1-95.
    pub quality: u8,
    /// Re-encode to JPEG where possible.
    pub convert_to_jpeg: bool,
}

impl Default for ImagePolicy {
    fn default() -> Self {
        Self {
            auto_compress: true,
            max_dim: 1280,
            quality: 80,
            convert_to_jpeg: true,
        }
    }
}

/// Per-client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base address of the engine, stored without a trailing slash.
    pub base_url: String,
    /// Timeout for the task initiation call. Never applied to the event
    /// stream, whose lifetime is bounded by the task itself.
    pub request_timeout: Duration,
    /// Optional cap on the quiet period between stream events. `None` waits
    /// indefinitely and leaves stall detection to transport keep-alives.
    pub stream_idle_timeout: Option<Duration>,
    pub image: ImagePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            stream_idle_timeout: None,
            image: ImagePolicy::default(),
        }
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn stream_idle_timeout(mut self, timeout: Duration) -> Self {
        self.stream_idle_timeout = Some(timeout);
        self
    }

    pub fn image_policy(mut self, image: ImagePolicy) -> Self {
        self.image = image;
        self
    }
}

//! SciStream SDK - Rust Client Library
//!
//! Client for the SciStream research engine. The engine runs tasks
//! asynchronously: a task is submitted over HTTP, accepted with a task
//! handle, and observed through a Server-Sent Events feed until a terminal
//! status. The SDK hides those two phases behind one lazy [`EventStream`]
//! per task invocation: iterate events, check `status`, done.
//!
//! # Example
//!
//! ```no_run
//! use futures::StreamExt;
//! use scistream_sdk::{ClientConfig, SciStreamClient, TaskRequest, TaskStatus};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SciStreamClient::new(ClientConfig::new("http://127.0.0.1:8000"))?;
//!
//!     let mut events = client
//!         .chat(
//!             TaskRequest::new("user-1", "session-1")
//!                 .content("Tell me about mitochondria.")
//!                 .option("domain", "bioscience"),
//!         )
//!         .await?;
//!
//!     while let Some(event) = events.next().await {
//!         match &event.status {
//!             TaskStatus::Running => println!("... {:?}", event.message),
//!             TaskStatus::Completed => println!("done: {:?}", event.final_result()),
//!             _ => println!("{}: {:?}", event.status, event.message),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
pub mod files;
mod request;
mod stream;
mod types;


pub use client::SciStreamClient;
pub use config::{ClientConfig, ImagePolicy, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
pub use error::{Result, SdkError};
pub use files::{CompressError, FileLoadError, FileLoader, FsFileLoader, ImageCompressor};
pub use request::{FileInput, TaskRequest, MAX_FILES_PER_REQUEST};
pub use stream::EventStream;
pub use types::{FileDescriptor, StreamEvent, TaskId, TaskStatus};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

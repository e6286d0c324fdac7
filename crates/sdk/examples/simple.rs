//! Simple SDK Example
//!
//! Submits a chat task and prints the streamed status events.
//!
//! 1. Start a SciStream engine on `http://127.0.0.1:8000`.
//! 2. Run this example:
//!    ```bash
//!    cargo run --example simple
//!    ```

use futures::StreamExt;
use scistream_sdk::{ClientConfig, SciStreamClient, TaskRequest, TaskStatus};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scistream=info")),
        )
        .init();

    let client = SciStreamClient::new(ClientConfig::new("http://127.0.0.1:8000"))?;

    let request = TaskRequest::new("example_user_123", "example_session_abc")
        .content("Tell me about mitochondria.")
        // Attachments can be file paths or ready-made descriptors:
        // .file("/path/to/photo.jpg")
        .option("domain", "bioscience")
        .option("effort", "low");

    let mut events = client.chat(request).await?;

    while let Some(event) = events.next().await {
        match &event.status {
            TaskStatus::Running => {
                println!("⏳ {}", event.message.as_deref().unwrap_or("running"));
            }
            TaskStatus::Completed => {
                println!("✅ task completed");
                if let Some(result) = event.final_result() {
                    let answer = result
                        .get("response")
                        .or_else(|| result.get("content"))
                        .cloned()
                        .unwrap_or(serde_json::Value::Null);
                    println!("final answer: {answer}");
                }
            }
            TaskStatus::Error | TaskStatus::Failed => {
                eprintln!("❌ {}", event.message.as_deref().unwrap_or("task failed"));
            }
            TaskStatus::Other(status) => {
                println!("unknown event status: {status}");
            }
        }
    }

    Ok(())
}

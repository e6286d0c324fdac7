//! Event Stream Consumption
//!
//! Phase two of the submit-then-stream protocol: attach to the engine's
//! Server-Sent Events feed for an accepted task and turn it into a lazy,
//! finite event sequence. Per invocation the state machine is
//!
//! `NotStarted -> Initiating -> {InitiationFailed | Streaming} ->
//! {Completed | Errored | Failed | ConnectionLost -> Errored}`
//!
//! and every path ends with exactly one terminal-status event: server
//! terminals are forwarded as-is, client-side faults are synthesized.

use crate::client::initiate_task;
use crate::config::ClientConfig;
use crate::types::StreamEvent;
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use serde_json::Value;
use std::pin::Pin;
use tracing::{debug, error, info};

/// Lazy, finite sequence of task events.
///
/// Nothing is sent until the stream is first polled. The last event always
/// carries a terminal status; failures appear as a synthetic `error` event,
/// never as a raised error. Dropping the stream detaches from the task
/// without cancelling it server-side.
pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send + 'static>>;

/// Drive one task invocation: initiate, attach, forward events until a
/// terminal condition.
pub(crate) fn run_task(
    http: reqwest::Client,
    config: ClientConfig,
    endpoint: String,
    payload: Value,
) -> EventStream {
    Box::pin(async_stream::stream! {
        let task_id = match initiate_task(&http, &config, &endpoint, &payload).await {
            Ok(task_id) => task_id,
            Err(err) => {
                error!(target: "scistream.stream", error = %err, "task initiation failed");
                yield StreamEvent::synthetic_error(format!("failed to start task: {err}"));
                return;
            }
        };

        let stream_url = format!("{}/stream/{}", config.base_url, task_id);
        info!(target: "scistream.stream", %stream_url, "attaching to event stream");
        let response = match http.get(&stream_url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                let status = response.status();
                error!(target: "scistream.stream", %status, "event stream rejected");
                yield StreamEvent::synthetic_error(format!(
                    "event stream rejected with status {status}"
                ));
                return;
            }
            Err(err) => {
                error!(target: "scistream.stream", error = %err, "event stream connection failed");
                yield StreamEvent::synthetic_error(format!(
                    "event stream connection failed: {err}"
                ));
                return;
            }
        };

        let mut messages = response.bytes_stream().eventsource();
        loop {
            let message = match config.stream_idle_timeout {
                Some(cap) => match tokio::time::timeout(cap, messages.next()).await {
                    Ok(message) => message,
                    Err(_) => {
                        error!(target: "scistream.stream", idle_cap = ?cap, "event stream idle timeout");
                        yield StreamEvent::synthetic_error(format!(
                            "event stream idle for more than {cap:?}"
                        ));
                        return;
                    }
                },
                None => messages.next().await,
            };

            match message {
                Some(Ok(message)) => {
                    if message.data.is_empty() {
                        // keep-alive
                        continue;
                    }
                    let event: StreamEvent = match serde_json::from_str(&message.data) {
                        Ok(event) => event,
                        Err(err) => {
                            error!(target: "scistream.stream", error = %err, "malformed stream event");
                            yield StreamEvent::synthetic_error(format!(
                                "malformed stream event: {err}"
                            ));
                            return;
                        }
                    };
                    debug!(target: "scistream.stream", status = %event.status, "received event");
                    let terminal = event.is_terminal();
                    if terminal {
                        info!(target: "scistream.stream", status = %event.status, "task finished");
                    }
                    yield event;
                    if terminal {
                        return;
                    }
                }
                Some(Err(err)) => {
                    error!(target: "scistream.stream", error = %err, "event stream connection lost");
                    yield StreamEvent::synthetic_error(format!(
                        "event stream connection lost: {err}"
                    ));
                    return;
                }
                None => {
                    error!(target: "scistream.stream", "event stream closed before a terminal event");
                    yield StreamEvent::synthetic_error(
                        "event stream closed before a terminal event",
                    );
                    return;
                }
            }
        }
    })
}

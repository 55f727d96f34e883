//! Cancellable poll loops.
//!
//! Each loop runs as its own task and owns a [`CancellationToken`]. The
//! returned [`PollHandle`] stops it; dropping the handle stops it too, so a
//! loop never outlives the session that started it.

use std::future::Future;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use sleeplog_core::{JobId, JobStatus};
use sleeplog_logging::{sleeplog_debug, sleeplog_info, sleeplog_warn};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{ApiError, EngineEvent, FailureKind, SleepApi};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug)]
pub struct PollHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    fn spawn<F, Fut>(runtime: &Handle, body: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let task = runtime.spawn(body(token.clone()));
        Self { token, task }
    }

    /// Halts the loop. A request already in flight is abandoned and its
    /// result never reported.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True once the loop has exited, by stopping or by reaching its goal.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Consecutive network failures tolerated before a job is reported failed.
pub const JOB_POLL_NETWORK_RETRIES: u32 = 3;

/// Polls the job-status endpoint until the job is terminal. The next request
/// is only sent `interval` after the previous one resolved.
///
/// An HTTP error status or an unreadable body ends the loop with a
/// `Failure` status. Network errors and timeouts are retried up to
/// [`JOB_POLL_NETWORK_RETRIES`] times in a row before failing the same way.
pub fn poll_job(
    runtime: &Handle,
    api: Arc<dyn SleepApi>,
    job_id: JobId,
    interval: Duration,
    sink: Arc<dyn EventSink>,
) -> PollHandle {
    PollHandle::spawn(runtime, move |token| async move {
        let mut network_failures = 0;
        loop {
            let result = tokio::select! {
                _ = token.cancelled() => break,
                result = api.job_status(&job_id) => result,
            };
            let status = match result {
                Ok(status) => {
                    network_failures = 0;
                    status
                }
                Err(err) => {
                    sleeplog_warn!("Polling job {} failed: {}", job_id, err);
                    let retryable = matches!(err.kind, FailureKind::Network | FailureKind::Timeout);
                    if retryable && network_failures < JOB_POLL_NETWORK_RETRIES {
                        network_failures += 1;
                        tokio::select! {
                            _ = token.cancelled() => break,
                            _ = tokio::time::sleep(interval) => {}
                        }
                        continue;
                    }
                    JobStatus::Failure(poll_failure_message(&err))
                }
            };
            let terminal = status.is_terminal();
            sink.emit(EngineEvent::JobStatus {
                job_id: job_id.clone(),
                status,
            });
            if terminal {
                sleeplog_debug!("Job {} is terminal, polling stops", job_id);
                break;
            }
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }
    })
}

fn poll_failure_message(err: &ApiError) -> String {
    match err.kind {
        FailureKind::HttpStatus(code) => format!("HTTP Code {code}"),
        _ => err.to_string(),
    }
}

/// Polls the recommendation endpoint every `retry` until it is ready. A
/// transport error ends the loop.
pub fn poll_recommendation(
    runtime: &Handle,
    api: Arc<dyn SleepApi>,
    retry: Duration,
    sink: Arc<dyn EventSink>,
) -> PollHandle {
    PollHandle::spawn(runtime, move |token| async move {
        loop {
            let result = tokio::select! {
                _ = token.cancelled() => break,
                result = api.poll_recommendation() => result,
            };
            match result {
                Ok(response) if response.is_ready() => {
                    sleeplog_info!("Recommendation is ready");
                    sink.emit(EngineEvent::RecommendationReady(response));
                    break;
                }
                Ok(_) => sleeplog_debug!("Recommendation not ready, retrying in {:?}", retry),
                Err(err) => {
                    sleeplog_warn!("Recommendation poll failed: {}", err);
                    break;
                }
            }
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(retry) => {}
            }
        }
    })
}

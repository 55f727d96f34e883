//! Sleeplog engine: backend client, poll loops and effect execution.
mod client;
mod engine;
mod poll;
mod settings;
mod types;
mod wire;

pub use client::{ReqwestSleepApi, SleepApi, UNSUPPORTED_TYPE_MARKER};
pub use engine::EngineHandle;
pub use poll::{
    poll_job, poll_recommendation, ChannelEventSink, EventSink, PollHandle,
    JOB_POLL_NETWORK_RETRIES,
};
pub use settings::ClientSettings;
pub use types::{ApiError, EngineError, EngineEvent, FailureKind};

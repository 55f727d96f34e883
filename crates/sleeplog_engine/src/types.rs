use std::fmt;

use sleeplog_core::{
    Bootstrap, FetchFailure, JobId, JobStatus, PageResponse, RecommendationResponse, RequestSeq,
    Timer, UploadId, UploadRejection,
};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    UploadFinished {
        upload_id: UploadId,
        result: Result<JobId, UploadRejection>,
    },
    JobStatus {
        job_id: JobId,
        status: JobStatus,
    },
    PageLoaded {
        seq: RequestSeq,
        result: Result<PageResponse, FetchFailure>,
    },
    RecommendationReady(RecommendationResponse),
    Bootstrapped(Result<Box<Bootstrap>, ApiError>),
    TimerElapsed(Timer),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// Body did not match the expected shape.
    Decode,
    /// The ingestion endpoint refused the file's type.
    UnsupportedFileType,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "unexpected response body"),
            FailureKind::UnsupportedFileType => write!(f, "unsupported file type"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}

impl From<ApiError> for UploadRejection {
    fn from(err: ApiError) -> Self {
        match err.kind {
            FailureKind::UnsupportedFileType => UploadRejection::UnsupportedType,
            FailureKind::HttpStatus(_) => UploadRejection::Other(err.message),
            _ => UploadRejection::Other(err.to_string()),
        }
    }
}

impl From<ApiError> for FetchFailure {
    fn from(err: ApiError) -> Self {
        FetchFailure::new(err.to_string())
    }
}

/// Failure to start the engine thread.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to build http client: {0}")]
    Client(#[from] ApiError),
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

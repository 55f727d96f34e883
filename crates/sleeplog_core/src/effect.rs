use std::time::Duration;

use crate::{FileRef, JobId, PageQuery, RequestSeq, UploadId};

/// Timers the controller arms. Each carries the generation or epoch it was
/// armed under so late expirations can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    Banner { generation: u64 },
    Reload { epoch: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send one accepted file to the ingestion endpoint.
    TransmitFile { upload_id: UploadId, file: FileRef },
    /// Poll the job-status endpoint until the job is terminal.
    MonitorJob { job_id: JobId },
    Schedule { timer: Timer, after: Duration },
    /// Blocking, user-facing alert.
    ShowAlert { message: String },
    FetchPage { seq: RequestSeq, query: PageQuery },
    StartRecommendationPoll,
    /// Cancel every running poll loop.
    StopPolling,
    /// Fetch fresh bootstrap data and start over.
    ReloadPage,
}

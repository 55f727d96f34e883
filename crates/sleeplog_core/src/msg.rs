#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Server-rendered initial state, on first load and after every reload.
    Bootstrapped(Box<crate::Bootstrap>),
    /// User dropped files onto the upload area.
    FilesDropped(Vec<crate::FileRef>),
    /// Ingestion endpoint answered for one transmitted file.
    UploadFinished {
        upload_id: crate::UploadId,
        result: Result<crate::JobId, crate::UploadRejection>,
    },
    /// One poll of the job-status endpoint.
    JobStatusPolled {
        job_id: crate::JobId,
        status: crate::JobStatus,
    },
    TimerElapsed(crate::Timer),
    /// User clicked a pagination or mode control.
    ControlClicked(crate::ControlId),
    LoadPage(crate::PageDirection),
    SetPageSize(crate::PageSize),
    PageLoaded {
        seq: crate::RequestSeq,
        result: Result<crate::PageResponse, crate::FetchFailure>,
    },
    /// The recommendation poll loop found a ready recommendation.
    RecommendationPolled(crate::RecommendationResponse),
    NoOp,
}

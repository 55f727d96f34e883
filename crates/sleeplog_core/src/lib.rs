//! Sleeplog core: pure controller state machine and view-model helpers.
//!
//! Everything here is synchronous and side-effect free. Network calls and
//! timers are requested through [`Effect`]s; their completions come back as
//! [`Msg`]s.
mod banner;
mod bindings;
mod chart;
mod config;
mod dashboard;
mod effect;
pub mod ids;
mod job;
mod msg;
mod pagination;
mod recommendation;
mod state;
mod update;
mod upload;
mod view_model;

pub use banner::{BannerPhase, TransientBanner};
pub use bindings::{
    ControlId, NavAction, NavigationBindings, PaginationControls, Subscription, SubscriptionId,
};
pub use chart::{
    density_overlay, ChartData, ChartHandle, ChartKind, ChartRegistry, ScatterPoint, SeriesColor,
    SeriesName,
};
pub use config::{BannerTiming, ControllerConfig, ReloadDelays, UploadPolicy};
pub use dashboard::{Bootstrap, Dashboard, HeartRateSeries, PageChart, PhaseSlice};
pub use effect::{Effect, Timer};
pub use job::{display_name, JobId, JobMonitors, JobOutcome, JobRow, JobStatus, Transition};
pub use msg::Msg;
pub use pagination::{
    Cursor, CursorDirection, DayMetrics, FetchFailure, Page, PageApply, PageDirection,
    PageMetric, PageQuery, PageResponse, PageSize, PaginatedSeries, PaginationState, RequestSeq,
    SeriesPayload,
};
pub use recommendation::{RecommendationBlock, RecommendationResponse, RecommendationState};
pub use state::AppState;
pub use update::update;
pub use upload::{
    Admission, FileRef, UploadId, UploadQueue, UploadRejection, UploadTask, MAX_FILES_EXCEEDED,
};
pub use view_model::{
    AppViewModel, BannerView, JobRowView, ModeControlView, NavControlView, SummaryText,
};

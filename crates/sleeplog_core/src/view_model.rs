use crate::{
    BannerPhase, ChartHandle, ControlId, Cursor, Dashboard, JobId, JobStatus, PageSize,
    RecommendationBlock,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BannerView {
    pub element_id: &'static str,
    pub phase: BannerPhase,
    /// Times the banner was shown this session.
    pub shows: u64,
}

/// Summary text fields of the statistics dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SummaryText {
    pub title: Option<String>,
    pub count: Option<String>,
    pub avg_duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub row_id: String,
    pub bar_id: String,
    pub message_id: String,
    pub job_id: JobId,
    pub display_name: String,
    pub status: JobStatus,
    pub percent: u8,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeControlView {
    pub element_id: &'static str,
    pub page_size: PageSize,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavControlView {
    pub control: ControlId,
    pub element_id: &'static str,
    pub cursor: Cursor,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub epoch: u64,
    pub dashboard: Dashboard,
    pub banner: BannerView,
    pub upload_progress_visible: bool,
    pub uploads_waiting: usize,
    pub uploads_in_flight: usize,
    pub uploads_accepted: usize,
    pub tasks_progress_visible: bool,
    pub jobs: Vec<JobRowView>,
    pub page_size: PageSize,
    pub page_loading: bool,
    pub mode_controls: Vec<ModeControlView>,
    pub pagination: Vec<NavControlView>,
    pub charts: Vec<ChartHandle>,
    pub summary: SummaryText,
    pub recommendation_pending: bool,
    pub recommendation: Option<RecommendationBlock>,
    pub dirty: bool,
}

impl AppViewModel {
    pub fn job(&self, job_id: &str) -> Option<&JobRowView> {
        self.jobs.iter().find(|row| row.job_id.as_str() == job_id)
    }

    pub fn chart(&self, container_id: &str) -> Option<&ChartHandle> {
        self.charts
            .iter()
            .find(|chart| chart.container_id == container_id)
    }

    pub fn has_control(&self, control: ControlId) -> bool {
        self.pagination.iter().any(|nav| nav.control == control)
    }
}

use sleeplog_logging::{sleeplog_debug, sleeplog_info, sleeplog_warn};

use crate::bindings::{NavAction, NavigationBindings, PaginationControls};
use crate::chart::{ChartData, ChartKind, ChartRegistry, SeriesName};
use crate::job::{JobMonitors, JobOutcome, Transition};
use crate::pagination::{PageApply, PaginatedSeries};
use crate::upload::{Admission, UploadQueue, MAX_FILES_EXCEEDED};
use crate::view_model::{
    AppViewModel, BannerView, JobRowView, ModeControlView, NavControlView, SummaryText,
};
use crate::{
    ids, Bootstrap, ControlId, ControllerConfig, Dashboard, Effect, FetchFailure,
    FileRef, JobId, JobStatus, PageDirection, PageResponse, PageSize, RecommendationResponse,
    RecommendationState, RequestSeq, Timer, TransientBanner, UploadId, UploadRejection,
};

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    config: ControllerConfig,
    dashboard: Dashboard,
    epoch: u64,
    uploads: UploadQueue,
    banner: TransientBanner,
    upload_progress_visible: bool,
    jobs: JobMonitors,
    series: PaginatedSeries,
    controls: PaginationControls,
    bindings: NavigationBindings,
    charts: ChartRegistry,
    summary: SummaryText,
    recommendation: RecommendationState,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_config(ControllerConfig::default())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ControllerConfig) -> Self {
        Self {
            uploads: UploadQueue::new(config.upload.clone()),
            config,
            dashboard: Dashboard::default(),
            epoch: 0,
            banner: TransientBanner::default(),
            upload_progress_visible: true,
            jobs: JobMonitors::default(),
            series: PaginatedSeries::new(PageSize::default()),
            controls: PaginationControls::default(),
            bindings: NavigationBindings::default(),
            charts: ChartRegistry::default(),
            summary: SummaryText::default(),
            recommendation: RecommendationState::default(),
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        let page_size = self.series.page_size();
        let mut pagination = Vec::new();
        if let Some(cursor) = &self.controls.prev {
            pagination.push(NavControlView {
                control: ControlId::Prev,
                element_id: ids::PREV_BUTTON,
                cursor: cursor.clone(),
            });
        }
        if let Some(cursor) = &self.controls.next {
            pagination.push(NavControlView {
                control: ControlId::Next,
                element_id: ids::NEXT_BUTTON,
                cursor: cursor.clone(),
            });
        }

        AppViewModel {
            epoch: self.epoch,
            dashboard: self.dashboard,
            banner: BannerView {
                element_id: ids::FILE_TYPE_ERROR,
                phase: self.banner.phase(),
                shows: self.banner.shows(),
            },
            upload_progress_visible: self.upload_progress_visible,
            uploads_waiting: self.uploads.waiting_count(),
            uploads_in_flight: self.uploads.in_flight_count(),
            uploads_accepted: self.uploads.accepted_total(),
            tasks_progress_visible: !self.jobs.is_empty(),
            jobs: self
                .jobs
                .rows()
                .iter()
                .map(|row| JobRowView {
                    row_id: ids::progress_row(&row.job_id),
                    bar_id: ids::progress_bar(&row.job_id),
                    message_id: ids::progress_message(&row.job_id),
                    job_id: row.job_id.clone(),
                    display_name: row.display_name.clone(),
                    status: row.status.clone(),
                    percent: row.percent,
                    message: row.message.clone(),
                })
                .collect(),
            page_size,
            page_loading: self.series.in_flight().is_some(),
            mode_controls: PageSize::ALL
                .iter()
                .map(|&size| ModeControlView {
                    element_id: size.control_id(),
                    page_size: size,
                    active: size == page_size,
                })
                .collect(),
            pagination,
            charts: self.charts.handles().cloned().collect(),
            summary: self.summary.clone(),
            recommendation_pending: matches!(self.recommendation, RecommendationState::Pending),
            recommendation: self.recommendation.block().cloned(),
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn page_size(&self) -> PageSize {
        self.series.page_size()
    }

    pub fn series(&self) -> &PaginatedSeries {
        &self.series
    }

    pub fn bindings(&self) -> &NavigationBindings {
        &self.bindings
    }

    pub fn charts(&self) -> &ChartRegistry {
        &self.charts
    }

    pub fn uploads(&self) -> &UploadQueue {
        &self.uploads
    }

    pub fn jobs(&self) -> &JobMonitors {
        &self.jobs
    }

    // ---- bootstrap / reload ----

    pub(crate) fn bootstrap(&mut self, bootstrap: &Bootstrap) -> Vec<Effect> {
        self.dashboard = bootstrap.dashboard;
        self.series.reset(bootstrap.page_size);
        self.series.install(&bootstrap.page);
        self.apply_page(&bootstrap.page);

        if self.dashboard == Dashboard::Statistics {
            self.charts.render(
                ids::GRAPH_PHASE,
                SeriesName::SleepPhases,
                ChartData::Slices(bootstrap.phases.clone()),
                ChartKind::VariablePie,
            );
            self.charts.render(
                ids::GRAPH_BPM,
                SeriesName::HeartRate,
                ChartData::heart_rate(&bootstrap.heart_rate),
                ChartKind::ScatterDensity,
            );
        }
        self.mark_dirty();

        if self.recommendation.activate(bootstrap.recommendation_pending) {
            vec![Effect::StartRecommendationPoll]
        } else {
            Vec::new()
        }
    }

    fn reload(&mut self) -> Vec<Effect> {
        self.epoch += 1;
        sleeplog_info!("Reloading page, epoch={}", self.epoch);
        self.uploads.reset();
        self.banner.hide();
        self.upload_progress_visible = true;
        self.jobs = JobMonitors::default();
        self.series.reset(self.series.page_size());
        self.controls = PaginationControls::default();
        self.bindings.clear();
        self.charts.clear();
        self.summary = SummaryText::default();
        self.recommendation = RecommendationState::Inactive;
        self.mark_dirty();
        vec![Effect::StopPolling, Effect::ReloadPage]
    }

    // ---- uploads ----

    pub(crate) fn drop_files(&mut self, files: Vec<FileRef>) -> Vec<Effect> {
        let mut effects = Vec::new();
        for file in files {
            // A new file clears the banner left by an earlier rejection.
            self.banner.hide();
            let name = file.name.clone();
            match self.uploads.admit(file) {
                Admission::Queued(upload_id) => {
                    sleeplog_debug!("Queued upload_id={} name={}", upload_id, name);
                }
                Admission::WrongType => {
                    sleeplog_info!("Rejected {} before transmission: wrong file type", name);
                    effects.push(self.show_banner());
                }
                Admission::LimitReached => {
                    sleeplog_warn!("Rejected {}: session upload limit reached", name);
                    self.upload_progress_visible = false;
                    effects.push(Effect::ShowAlert {
                        message: format!("Upload failed: {MAX_FILES_EXCEEDED}"),
                    });
                }
            }
        }
        effects.extend(self.dispatch_uploads());
        self.mark_dirty();
        effects
    }

    pub(crate) fn finish_upload(
        &mut self,
        upload_id: UploadId,
        result: Result<JobId, UploadRejection>,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        match result {
            Ok(job_id) => match self.uploads.complete(upload_id, job_id.clone()) {
                Some(task) => {
                    sleeplog_info!("Upload {} accepted as job {}", task.file.name, job_id);
                    self.jobs.start(job_id.clone(), &task.file.name);
                    effects.push(Effect::MonitorJob { job_id });
                }
                None => {
                    sleeplog_debug!("Ignoring answer for unknown upload_id={}", upload_id);
                }
            },
            Err(rejection) => match self.uploads.reject(upload_id, &rejection) {
                Some(task) => {
                    self.upload_progress_visible = false;
                    match rejection {
                        UploadRejection::UnsupportedType => {
                            sleeplog_info!("Backend refused {}: unsupported type", task.file.name);
                            effects.push(self.show_banner());
                        }
                        UploadRejection::Other(reason) => {
                            sleeplog_warn!("Upload of {} failed: {}", task.file.name, reason);
                            effects.push(Effect::ShowAlert {
                                message: format!("Upload failed: {reason}"),
                            });
                        }
                    }
                }
                None => {
                    sleeplog_debug!("Ignoring rejection for unknown upload_id={}", upload_id);
                }
            },
        }
        effects.extend(self.dispatch_uploads());
        self.mark_dirty();
        effects
    }

    fn dispatch_uploads(&mut self) -> Vec<Effect> {
        self.uploads
            .dispatch()
            .into_iter()
            .map(|(upload_id, file)| Effect::TransmitFile { upload_id, file })
            .collect()
    }

    fn show_banner(&mut self) -> Effect {
        let (generation, after) = self.banner.show(&self.config.banner);
        Effect::Schedule {
            timer: Timer::Banner { generation },
            after,
        }
    }

    // ---- jobs ----

    pub(crate) fn apply_job_status(&mut self, job_id: &JobId, status: JobStatus) -> Vec<Effect> {
        match self.jobs.apply(job_id, status) {
            Transition::Ignored => {
                sleeplog_debug!("Ignoring status update for job {}", job_id);
                Vec::new()
            }
            Transition::Applied => {
                self.mark_dirty();
                Vec::new()
            }
            Transition::Finished(outcome) => {
                let after = match outcome {
                    JobOutcome::Succeeded => self.config.reload.success,
                    JobOutcome::Failed => self.config.reload.failure,
                };
                sleeplog_info!(
                    "Job {} finished {:?}, reload in {:?}",
                    job_id,
                    outcome,
                    after
                );
                self.mark_dirty();
                vec![Effect::Schedule {
                    timer: Timer::Reload { epoch: self.epoch },
                    after,
                }]
            }
        }
    }

    // ---- timers ----

    pub(crate) fn timer_elapsed(&mut self, timer: Timer) -> Vec<Effect> {
        match timer {
            Timer::Banner { generation } => {
                let before = self.banner.phase();
                let next = self.banner.advance(generation, &self.config.banner);
                if self.banner.phase() != before {
                    self.mark_dirty();
                }
                next.map(|after| Effect::Schedule {
                    timer: Timer::Banner { generation },
                    after,
                })
                .into_iter()
                .collect()
            }
            Timer::Reload { epoch } if epoch == self.epoch => self.reload(),
            Timer::Reload { epoch } => {
                sleeplog_debug!("Ignoring reload armed in epoch {}", epoch);
                Vec::new()
            }
        }
    }

    // ---- pagination ----

    pub(crate) fn click(&mut self, control: ControlId) -> Vec<Effect> {
        let actions = self.bindings.dispatch(control);
        if actions.is_empty() {
            sleeplog_debug!("No handler bound to {}", control.element_id());
            return Vec::new();
        }

        let mut effects = Vec::new();
        for action in actions {
            match action {
                NavAction::Load {
                    direction,
                    minted_under,
                } => {
                    if minted_under != self.series.page_size() {
                        sleeplog_debug!(
                            "Ignoring cursor minted under {} mode",
                            minted_under.mode()
                        );
                        continue;
                    }
                    effects.push(self.load_page(&direction));
                }
                NavAction::SelectMode(page_size) => effects.extend(self.set_page_size(page_size)),
            }
        }
        effects
    }

    pub(crate) fn load_page(&mut self, direction: &PageDirection) -> Effect {
        let (seq, query) = self.series.load_page(direction);
        self.mark_dirty();
        Effect::FetchPage { seq, query }
    }

    pub(crate) fn set_page_size(&mut self, page_size: PageSize) -> Vec<Effect> {
        if !self.series.set_page_size(page_size) {
            return Vec::new();
        }
        // Cursors belong to the old mode; drop them before the first page arrives.
        self.controls = PaginationControls::default();
        self.bindings.rebind(&self.controls, page_size);
        vec![self.load_page(&PageDirection::First)]
    }

    pub(crate) fn page_loaded(
        &mut self,
        seq: RequestSeq,
        result: Result<PageResponse, FetchFailure>,
    ) -> Vec<Effect> {
        match self.series.accept(seq, &result) {
            PageApply::Applied => {
                if let Ok(response) = &result {
                    self.apply_page(response);
                }
                self.mark_dirty();
            }
            PageApply::Failed => self.mark_dirty(),
            PageApply::Stale => {}
        }
        Vec::new()
    }

    fn apply_page(&mut self, response: &PageResponse) {
        let page_size = self.series.page_size();
        let Some(page) = self.series.page() else {
            return;
        };

        if let Some(payload) = &response.series {
            let categories = page.dates();
            for chart in self.dashboard.page_charts() {
                let data = ChartData::Series {
                    categories: categories.clone(),
                    values: page.column(chart.series.key()),
                };
                self.charts
                    .render(chart.container_id, chart.series, data, chart.kind);
            }

            // Columns without a fixed slot get a plain line chart of their own.
            let extra: Vec<SeriesName> = payload
                .series
                .keys()
                .map(|key| SeriesName::from_key(key))
                .filter(|series| matches!(series, SeriesName::Other(_)))
                .collect();
            self.charts.retain(|handle| match &handle.series {
                SeriesName::Other(_) => extra.contains(&handle.series),
                _ => true,
            });
            for series in extra {
                let container_id = ids::extra_graph(series.key());
                sleeplog_debug!("Drawing unlabelled column into {}", container_id);
                let data = ChartData::Series {
                    categories: categories.clone(),
                    values: page.column(series.key()),
                };
                self.charts
                    .render(&container_id, series, data, ChartKind::Line);
            }
        } else {
            sleeplog_warn!("Page response carried no chart data");
        }

        self.controls = PaginationControls {
            prev: page.cursor_prev.clone(),
            next: page.cursor_next.clone(),
        };
        self.update_summary(response, page_size);
        self.bindings.rebind(&self.controls, page_size);
    }

    fn update_summary(&mut self, response: &PageResponse, page_size: PageSize) {
        if let (Some(first), Some(last)) = (&response.first_date, &response.last_date) {
            self.summary.title = Some(format!(
                "Your sleep trends and statistics from {first} to {last}"
            ));
        }
        if self.dashboard.has_summary() {
            self.summary.count = Some(format!(
                "Showing how long you slept each day over the last {} days.",
                page_size.days()
            ));
        }
        if let Some(avg) = response
            .metric
            .as_ref()
            .and_then(|metric| metric.avg_sleep_duration)
        {
            self.summary.avg_duration = Some(format!("{avg} hours."));
        }
    }

    // ---- recommendation ----

    pub(crate) fn recommendation_polled(&mut self, response: &RecommendationResponse) {
        if self.recommendation.accept(response) {
            sleeplog_info!("Recommendation rendered");
            self.mark_dirty();
        }
    }
}

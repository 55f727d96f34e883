//! Element ids forming the contract between the controller and the page surface.

use crate::JobId;

pub const FILE_TYPE_ERROR: &str = "file-type-error";
pub const UPLOAD_PROGRESS_WRAPPER: &str = "progress-bar-wrapper";
pub const TASKS_PROGRESS: &str = "tasks-progress";

pub const PAGINATION: &str = "pagination";
pub const PREV_BUTTON: &str = "prev-btn";
pub const NEXT_BUTTON: &str = "next-btn";
pub const MODE_WEEK: &str = "mode-week";
pub const MODE_MONTH: &str = "mode-month";

pub const GRAPH_LATENCY: &str = "graph-Latency";
pub const GRAPH_EFFICIENCY: &str = "graph-Efficiency";
pub const GRAPH_FRAGMENTATION: &str = "graph-Fragmentation";
pub const GRAPH_CALORIES: &str = "graph-Calories";
pub const GRAPH_DURATION: &str = "graph-Duration";
pub const GRAPH_PHASE: &str = "graph-Phase";
pub const GRAPH_BPM: &str = "graph-BPM";

pub const GRAPH_TITLE: &str = "sleep-graph-title";
pub const COUNT_SLEEP: &str = "count_sleep";
pub const AVG_DURATION: &str = "avg_duration";
pub const RECOMMENDATION_BLOCK: &str = "recommendation-block";

/// Container of a chart for a column the dashboards have no fixed slot for.
pub fn extra_graph(key: &str) -> String {
    format!("graph-{key}")
}

pub fn progress_row(job_id: &JobId) -> String {
    format!("progress-{job_id}")
}

pub fn progress_bar(job_id: &JobId) -> String {
    format!("bar-{job_id}")
}

pub fn progress_message(job_id: &JobId) -> String {
    format!("msg-{job_id}")
}

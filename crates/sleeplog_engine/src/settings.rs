use std::time::Duration;

use sleeplog_core::Dashboard;

/// Where the backend lives and how often the poll loops ask it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_url: String,
    pub ingest_path: String,
    /// Job-status path; `{task_id}` is replaced with the job id.
    pub progress_path: String,
    pub history_path: String,
    pub statistics_path: String,
    pub bootstrap_path: String,
    /// Multipart field carrying the uploaded file.
    pub upload_field: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub job_poll_interval: Duration,
    pub recommendation_retry: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            ingest_path: "/sleep-records-from-csv/".to_string(),
            progress_path: "/celery-progress/{task_id}/".to_string(),
            history_path: "/sleep-history/".to_string(),
            statistics_path: "/sleep-statistics-show/".to_string(),
            bootstrap_path: "/api/bootstrap/".to_string(),
            upload_field: "csv_file".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            job_poll_interval: Duration::from_millis(500),
            recommendation_retry: Duration::from_secs(5),
        }
    }
}

impl ClientSettings {
    pub fn page_path(&self, dashboard: Dashboard) -> &str {
        match dashboard {
            Dashboard::History => &self.history_path,
            Dashboard::Statistics => &self.statistics_path,
        }
    }

    /// The recommendation is served by the statistics view with `poll=true`.
    pub fn recommendation_path(&self) -> &str {
        &self.statistics_path
    }

    pub fn progress_path_for(&self, task_id: &str) -> String {
        self.progress_path.replace("{task_id}", task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_path_substitutes_task_id() {
        let settings = ClientSettings::default();
        assert_eq!(settings.progress_path_for("abc123"), "/celery-progress/abc123/");
        assert_eq!(settings.page_path(Dashboard::History), "/sleep-history/");
    }
}

//! Optional RON configuration file.
//!
//! Every field is optional; whatever is present overrides the built-in
//! defaults of the controller and the backend client.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sleeplog_core::ControllerConfig;
use sleeplog_engine::ClientSettings;
use sleeplog_logging::sleeplog_info;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: Option<String>,
    pub ingest_path: Option<String>,
    pub progress_path: Option<String>,
    pub history_path: Option<String>,
    pub statistics_path: Option<String>,
    pub bootstrap_path: Option<String>,
    pub upload_field: Option<String>,
    pub max_files: Option<usize>,
    pub parallel_uploads: Option<usize>,
    pub request_timeout_ms: Option<u64>,
    pub job_poll_interval_ms: Option<u64>,
    pub recommendation_retry_ms: Option<u64>,
    pub reload_after_success_ms: Option<u64>,
    pub reload_after_failure_ms: Option<u64>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        sleeplog_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn apply(&self, controller: &mut ControllerConfig, settings: &mut ClientSettings) {
        let text_overrides = [
            (&self.base_url, &mut settings.base_url),
            (&self.ingest_path, &mut settings.ingest_path),
            (&self.progress_path, &mut settings.progress_path),
            (&self.history_path, &mut settings.history_path),
            (&self.statistics_path, &mut settings.statistics_path),
            (&self.bootstrap_path, &mut settings.bootstrap_path),
            (&self.upload_field, &mut settings.upload_field),
        ];
        for (value, target) in text_overrides {
            if let Some(value) = value {
                target.clone_from(value);
            }
        }

        if let Some(max_files) = self.max_files {
            controller.upload.max_files = max_files;
        }
        if let Some(parallel) = self.parallel_uploads {
            controller.upload.parallel_uploads = parallel.max(1);
        }

        let millis = |value: Option<u64>| value.map(Duration::from_millis);
        if let Some(timeout) = millis(self.request_timeout_ms) {
            settings.request_timeout = timeout;
        }
        if let Some(interval) = millis(self.job_poll_interval_ms) {
            settings.job_poll_interval = interval;
        }
        if let Some(retry) = millis(self.recommendation_retry_ms) {
            settings.recommendation_retry = retry;
        }
        if let Some(delay) = millis(self.reload_after_success_ms) {
            controller.reload.success = delay;
        }
        if let Some(delay) = millis(self.reload_after_failure_ms) {
            controller.reload.failure = delay;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn overrides_only_present_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sleeplog.ron");
        fs::write(
            &path,
            r#"(
                base_url: Some("https://sleep.example.org"),
                parallel_uploads: Some(0),
                job_poll_interval_ms: Some(250),
            )"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        let mut controller = ControllerConfig::default();
        let mut settings = ClientSettings::default();
        config.apply(&mut controller, &mut settings);

        assert_eq!(settings.base_url, "https://sleep.example.org");
        assert_eq!(settings.job_poll_interval, Duration::from_millis(250));
        assert_eq!(settings.upload_field, "csv_file");
        assert_eq!(controller.upload.parallel_uploads, 1);
        assert_eq!(controller.upload.max_files, 13);
    }

    #[test]
    fn reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ron");
        fs::write(&path, "(max_files: \"many\")").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.ron"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = AppConfig::load(Path::new("/nonexistent/sleeplog.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}

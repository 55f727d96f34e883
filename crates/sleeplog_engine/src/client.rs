use reqwest::header::{CACHE_CONTROL, HeaderValue};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use sleeplog_core::{
    Bootstrap, Dashboard, FileRef, JobId, JobStatus, PageQuery, PageResponse,
    RecommendationResponse,
};
use sleeplog_logging::{sleeplog_debug, sleeplog_info};
use url::Url;

use crate::settings::ClientSettings;
use crate::wire::{BootstrapBody, PageBody, ProgressBody, RecommendationBody, UploadBody};
use crate::{ApiError, FailureKind};

/// Marker the ingestion endpoint puts in its error body for refused file types.
pub const UNSUPPORTED_TYPE_MARKER: &str = "can't upload files of this type";

const AJAX_HEADER: &str = "X-Requested-With";
const AJAX_VALUE: &str = "XMLHttpRequest";

/// Everything the controller needs from the backend.
#[async_trait::async_trait]
pub trait SleepApi: Send + Sync {
    /// Sends one file to the ingestion endpoint and returns the job it started.
    async fn upload(&self, file: &FileRef) -> Result<JobId, ApiError>;

    async fn job_status(&self, job_id: &JobId) -> Result<JobStatus, ApiError>;

    async fn fetch_page(
        &self,
        dashboard: Dashboard,
        query: &PageQuery,
    ) -> Result<PageResponse, ApiError>;

    async fn poll_recommendation(&self) -> Result<RecommendationResponse, ApiError>;

    /// Initial state of a freshly loaded dashboard.
    async fn bootstrap(&self, dashboard: Dashboard) -> Result<Bootstrap, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestSleepApi {
    settings: ClientSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestSleepApi {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request
            .header(AJAX_HEADER, AJAX_VALUE)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl SleepApi for ReqwestSleepApi {
    async fn upload(&self, file: &FileRef) -> Result<JobId, ApiError> {
        let url = self.endpoint(&self.settings.ingest_path)?;
        let bytes = tokio::fs::read(&file.path).await.map_err(|err| {
            ApiError::new(
                FailureKind::Io,
                format!("{}: {err}", file.path.display()),
            )
        })?;
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str("text/csv")
            .map_err(map_reqwest_error)?;
        let form = reqwest::multipart::Form::new().part(self.settings.upload_field.clone(), part);

        sleeplog_info!("Uploading {} to {}", file.name, url);
        let response = self
            .client
            .post(url)
            .header(AJAX_HEADER, AJAX_VALUE)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::UNSUPPORTED_MEDIA_TYPE
                || body.contains(UNSUPPORTED_TYPE_MARKER)
            {
                return Err(ApiError::new(FailureKind::UnsupportedFileType, body));
            }
            let message = server_message(&body).unwrap_or_else(|| status.to_string());
            return Err(ApiError::new(FailureKind::HttpStatus(status.as_u16()), message));
        }

        let body: UploadBody = response
            .json()
            .await
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
        Ok(JobId::new(body.task_id))
    }

    async fn job_status(&self, job_id: &JobId) -> Result<JobStatus, ApiError> {
        let url = self.endpoint(&self.settings.progress_path_for(job_id.as_str()))?;
        let body: ProgressBody = self.get_json(self.client.get(url)).await?;
        let status = body.into_status();
        sleeplog_debug!("Job {} status {:?}", job_id, status);
        Ok(status)
    }

    async fn fetch_page(
        &self,
        dashboard: Dashboard,
        query: &PageQuery,
    ) -> Result<PageResponse, ApiError> {
        let url = self.endpoint(self.settings.page_path(dashboard))?;
        let request = self
            .client
            .get(url)
            .query(&query.params())
            .header(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        let body: PageBody = self.get_json(request).await?;
        Ok(body.into_response())
    }

    async fn poll_recommendation(&self) -> Result<RecommendationResponse, ApiError> {
        let url = self.endpoint(self.settings.recommendation_path())?;
        let request = self.client.get(url).query(&[("poll", "true")]);
        let body: RecommendationBody = self.get_json(request).await?;
        Ok(body.into_response())
    }

    async fn bootstrap(&self, dashboard: Dashboard) -> Result<Bootstrap, ApiError> {
        let url = self.endpoint(&self.settings.bootstrap_path)?;
        let name = match dashboard {
            Dashboard::History => "history",
            Dashboard::Statistics => "statistics",
        };
        let request = self.client.get(url).query(&[("dashboard", name)]);
        let body: BootstrapBody = self.get_json(request).await?;
        Ok(body.into_bootstrap())
    }
}

const MAX_SERVER_MESSAGE: usize = 200;

/// Error text of a refused upload: the `error` field of a JSON body, or the
/// trimmed body itself. `None` for an empty body.
fn server_message(body: &str) -> Option<String> {
    let text = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("error") {
            Some(serde_json::Value::String(error)) => error.clone(),
            _ => body.to_string(),
        },
        _ => body.to_string(),
    };
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(text.chars().take(MAX_SERVER_MESSAGE).collect())
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}

//! Response bodies as the backend sends them, and their conversion into the
//! controller's types.
//!
//! The backend is loose about types: numbers may arrive as strings, empty
//! date ranges are sent as `0`, and the history view may embed its chart data
//! as a JSON string. Conversion absorbs all of that here.

use serde::Deserialize;
use serde_json::Value;
use sleeplog_core::{
    Bootstrap, Cursor, Dashboard, HeartRateSeries, JobStatus, PageMetric, PageResponse, PageSize,
    PhaseSlice, RecommendationResponse, SeriesPayload,
};
use sleeplog_logging::sleeplog_debug;

#[derive(Debug, Deserialize)]
pub(crate) struct UploadBody {
    pub task_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProgressBody {
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    complete: bool,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    progress: Option<ProgressDetail>,
    #[serde(default)]
    percent: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ProgressDetail {
    #[serde(default)]
    percent: Option<Value>,
}

impl ProgressBody {
    pub(crate) fn into_status(self) -> JobStatus {
        let state = self.state.as_deref().unwrap_or_default();
        if state == "FAILURE" || (self.complete && self.success == Some(false)) {
            return JobStatus::Failure(result_message(self.result.as_ref()));
        }
        if state == "SUCCESS" || self.complete {
            return JobStatus::Success;
        }

        let percent = self
            .percent
            .as_ref()
            .and_then(number)
            .or_else(|| {
                self.progress
                    .as_ref()
                    .and_then(|detail| detail.percent.as_ref())
                    .and_then(number)
            });
        match (state, percent) {
            ("PENDING", _) | (_, None) => JobStatus::Pending,
            (_, Some(percent)) => JobStatus::Progress(percent.clamp(0.0, 100.0).round() as u8),
        }
    }
}

fn result_message(result: Option<&Value>) -> String {
    match result {
        Some(Value::String(text)) if !text.is_empty() => text.clone(),
        None | Some(Value::Null) | Some(Value::String(_)) => "processing failed".to_string(),
        Some(other) => other.to_string(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MetricBody {
    #[serde(default)]
    avg_sleep_duration: Option<Value>,
    #[serde(default)]
    sleep_efficiency: Option<Value>,
}

impl MetricBody {
    fn into_metric(self) -> PageMetric {
        PageMetric {
            avg_sleep_duration: self.avg_sleep_duration.as_ref().and_then(number),
            sleep_efficiency: self.sleep_efficiency.as_ref().and_then(number),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageBody {
    #[serde(default)]
    graph_data_json: Option<Value>,
    #[serde(default)]
    graph_data: Option<Value>,
    #[serde(default)]
    has_previous: bool,
    #[serde(default)]
    prev_cursor: Option<String>,
    #[serde(default)]
    has_next: bool,
    #[serde(default)]
    next_cursor: Option<String>,
    #[serde(default)]
    first_date: Option<Value>,
    #[serde(default)]
    last_date: Option<Value>,
    #[serde(default)]
    metric: Option<MetricBody>,
}

impl PageBody {
    pub(crate) fn into_response(self) -> PageResponse {
        let series = self
            .graph_data_json
            .or(self.graph_data)
            .and_then(series_payload);
        PageResponse {
            series,
            has_previous: self.has_previous,
            prev_cursor: self.prev_cursor.map(Cursor::new),
            has_next: self.has_next,
            next_cursor: self.next_cursor.map(Cursor::new),
            first_date: self.first_date.and_then(date_text),
            last_date: self.last_date.and_then(date_text),
            metric: self.metric.map(MetricBody::into_metric),
        }
    }
}

fn series_payload(value: Value) -> Option<SeriesPayload> {
    let value = match value {
        Value::String(text) => match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(err) => {
                sleeplog_debug!("Embedded chart data is not JSON: {}", err);
                return None;
            }
        },
        other => other,
    };
    let Value::Object(map) = value else {
        return None;
    };

    let mut payload = SeriesPayload::default();
    for (key, column) in map {
        let Value::Array(items) = column else {
            continue;
        };
        if key == "dates" {
            payload.dates = items.iter().map(text).collect();
        } else {
            payload
                .series
                .insert(key, items.iter().map(number).collect());
        }
    }
    Some(payload)
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecommendationBody {
    #[serde(default)]
    rec: Option<String>,
    #[serde(default)]
    metric: Option<MetricBody>,
}

impl RecommendationBody {
    pub(crate) fn into_response(self) -> RecommendationResponse {
        RecommendationResponse {
            rec: self.rec,
            sleep_efficiency: self
                .metric
                .and_then(|metric| metric.sleep_efficiency.as_ref().and_then(number)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PhaseBody {
    name: String,
    y: Value,
    z: Value,
}

#[derive(Debug, Default, Deserialize)]
struct HeartRateBody {
    #[serde(default)]
    bpm: Vec<Value>,
    #[serde(default)]
    date: Vec<Value>,
}

impl HeartRateBody {
    /// Unreadable readings are dropped together with their time label, so
    /// every remaining reading keeps its own time.
    fn into_series(self) -> HeartRateSeries {
        let mut series = HeartRateSeries::default();
        for (index, reading) in self.bpm.iter().enumerate() {
            let Some(bpm) = number(reading) else {
                continue;
            };
            series.bpm.push(bpm);
            series
                .date
                .push(self.date.get(index).map(text).unwrap_or_default());
        }
        series
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BootstrapBody {
    #[serde(default)]
    dashboard: Option<String>,
    #[serde(default)]
    page_size: Option<Value>,
    #[serde(default)]
    page: PageBody,
    #[serde(default)]
    phases: Vec<PhaseBody>,
    #[serde(default)]
    heart_rate: Option<HeartRateBody>,
    #[serde(default)]
    recommendation_pending: bool,
}

impl BootstrapBody {
    pub(crate) fn into_bootstrap(self) -> Bootstrap {
        let dashboard = match self.dashboard.as_deref() {
            Some("statistics") => Dashboard::Statistics,
            _ => Dashboard::History,
        };
        let page_size = self
            .page_size
            .as_ref()
            .and_then(number)
            .and_then(|days| PageSize::from_days(days as u32))
            .unwrap_or_default();
        let heart_rate = self.heart_rate.unwrap_or_default();

        Bootstrap {
            dashboard,
            page_size,
            page: self.page.into_response(),
            phases: self
                .phases
                .into_iter()
                .map(|phase| PhaseSlice {
                    name: phase.name,
                    y: number(&phase.y).unwrap_or_default(),
                    z: number(&phase.z).unwrap_or_default(),
                })
                .collect(),
            heart_rate: heart_rate.into_series(),
            recommendation_pending: self.recommendation_pending,
        }
    }
}

/// Numbers, numeric strings and nothing else.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Empty ranges come back as `0`; only strings are dates.
fn date_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text),
        _ => None,
    }
}

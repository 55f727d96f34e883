//! Chart rendering adapter.
//!
//! The registry owns one [`ChartHandle`] per container. Rendering never
//! updates a chart in place: the old handle is destroyed and a new one with a
//! fresh generation takes its place, so a container never shows two charts or
//! leftovers of an earlier series.

use std::collections::BTreeMap;

use crate::dashboard::{HeartRateSeries, PhaseSlice};

/// Series the dashboards know how to draw.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SeriesName {
    Latency,
    Efficiency,
    Fragmentation,
    CaloriesBurned,
    SleepDuration,
    SleepPhases,
    HeartRate,
    /// A data key this client has no presentation for.
    Other(String),
}

/// Colour assigned to a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesColor {
    Fixed(&'static str),
    /// One colour per slice, in order.
    Palette(&'static [&'static str]),
    /// No colour asserted; the drawing primitive picks its default.
    Unassigned,
}

const PHASE_PALETTE: &[&str] = &["#64bff7", "#8053d5", "#45c454", "#ffad61"];

impl SeriesName {
    /// Key of the column in the service payload.
    pub fn key(&self) -> &str {
        match self {
            SeriesName::Latency => "latency_minutes",
            SeriesName::Efficiency => "sleep_efficiency",
            SeriesName::Fragmentation => "sleep_fragmentation_index",
            SeriesName::CaloriesBurned => "sleep_calories_burned",
            SeriesName::SleepDuration => "sleep_duration",
            SeriesName::SleepPhases => "phases",
            SeriesName::HeartRate => "bpm",
            SeriesName::Other(key) => key,
        }
    }

    pub fn from_key(key: &str) -> Self {
        match key {
            "latency_minutes" => SeriesName::Latency,
            "sleep_efficiency" => SeriesName::Efficiency,
            "sleep_fragmentation_index" => SeriesName::Fragmentation,
            "sleep_calories_burned" => SeriesName::CaloriesBurned,
            "sleep_duration" => SeriesName::SleepDuration,
            "phases" => SeriesName::SleepPhases,
            "bpm" => SeriesName::HeartRate,
            other => SeriesName::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SeriesName::Latency => "Latency",
            SeriesName::Efficiency => "Efficiency",
            SeriesName::Fragmentation => "Fragmentation",
            SeriesName::CaloriesBurned => "Calories burned",
            SeriesName::SleepDuration => "Sleep duration",
            SeriesName::SleepPhases => "Sleep phases",
            SeriesName::HeartRate => "Heart rate distribution",
            SeriesName::Other(key) => key,
        }
    }

    pub fn color(&self) -> SeriesColor {
        match self {
            SeriesName::Latency => SeriesColor::Fixed("#667eea"),
            SeriesName::Efficiency | SeriesName::SleepDuration => SeriesColor::Fixed("#10b981"),
            SeriesName::Fragmentation => SeriesColor::Fixed("#f6d365"),
            SeriesName::CaloriesBurned | SeriesName::HeartRate => SeriesColor::Fixed("#ff5e62"),
            SeriesName::SleepPhases => SeriesColor::Palette(PHASE_PALETTE),
            SeriesName::Other(_) => SeriesColor::Unassigned,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Column,
    VariablePie,
    ScatterDensity,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Series {
        categories: Vec<String>,
        values: Vec<Option<f64>>,
    },
    Slices(Vec<PhaseSlice>),
    Scatter {
        points: Vec<ScatterPoint>,
        labels: Vec<String>,
        density: Vec<ScatterPoint>,
    },
}

impl ChartData {
    /// Heart-rate scatter: x is the bpm, y the measurement number (1-based).
    pub fn heart_rate(series: &HeartRateSeries) -> Self {
        let points = series
            .bpm
            .iter()
            .enumerate()
            .map(|(index, bpm)| ScatterPoint {
                x: *bpm,
                y: (index + 1) as f64,
            })
            .collect();
        ChartData::Scatter {
            points,
            labels: series.date.clone(),
            density: density_overlay(&series.bpm),
        }
    }

    pub fn point_count(&self) -> usize {
        match self {
            ChartData::Series { values, .. } => values.len(),
            ChartData::Slices(slices) => slices.len(),
            ChartData::Scatter { points, .. } => points.len(),
        }
    }
}

const DENSITY_INTERVALS: i32 = 4;
const DENSITY_POINTS_PER_INTERVAL: i32 = 3;

/// Normal density fitted to `values`, sampled from mean - 4σ to mean + 4σ
/// with three points per σ. Empty when there is no spread to fit.
pub fn density_overlay(values: &[f64]) -> Vec<ScatterPoint> {
    if values.len() < 2 {
        return Vec::new();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let sigma = variance.sqrt();
    if sigma <= f64::EPSILON {
        return Vec::new();
    }

    let steps = DENSITY_INTERVALS * DENSITY_POINTS_PER_INTERVAL;
    let step = sigma / f64::from(DENSITY_POINTS_PER_INTERVAL);
    (-steps..=steps)
        .map(|i| {
            let x = mean + f64::from(i) * step;
            let z = (x - mean) / sigma;
            let y = (-0.5 * z * z).exp() / (sigma * (2.0 * std::f64::consts::PI).sqrt());
            ScatterPoint { x, y }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartHandle {
    pub container_id: String,
    pub series: SeriesName,
    pub generation: u64,
    pub kind: ChartKind,
    pub color: SeriesColor,
    pub title: String,
    pub data: ChartData,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartRegistry {
    charts: BTreeMap<String, ChartHandle>,
    next_generation: u64,
    destroyed: u64,
}

impl ChartRegistry {
    /// Destroys whatever the container shows and draws a new chart.
    pub fn render(
        &mut self,
        container_id: &str,
        series: SeriesName,
        data: ChartData,
        kind: ChartKind,
    ) -> &ChartHandle {
        if self.charts.remove(container_id).is_some() {
            self.destroyed += 1;
        }
        self.next_generation += 1;
        let title = match kind {
            ChartKind::Line | ChartKind::Column => format!("{} trend", series.label()),
            ChartKind::VariablePie | ChartKind::ScatterDensity => series.label().to_string(),
        };
        let handle = ChartHandle {
            container_id: container_id.to_string(),
            color: series.color(),
            series,
            generation: self.next_generation,
            kind,
            title,
            data,
        };
        self.charts.entry(container_id.to_string()).or_insert(handle)
    }

    /// Destroys the charts whose handle fails `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&ChartHandle) -> bool) {
        let before = self.charts.len();
        self.charts.retain(|_, handle| keep(handle));
        self.destroyed += (before - self.charts.len()) as u64;
    }

    /// Destroys every chart.
    pub fn clear(&mut self) {
        self.destroyed += self.charts.len() as u64;
        self.charts.clear();
    }

    pub fn get(&self, container_id: &str) -> Option<&ChartHandle> {
        self.charts.get(container_id)
    }

    pub fn handles(&self) -> impl Iterator<Item = &ChartHandle> {
        self.charts.values()
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    /// Charts destroyed over the registry's lifetime.
    pub fn destroyed(&self) -> u64 {
        self.destroyed
    }
}

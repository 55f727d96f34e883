use crate::chart::{ChartKind, SeriesName};
use crate::ids;
use crate::pagination::{PageResponse, PageSize};

/// The two paginated views served by the analytics service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dashboard {
    /// Efficiency history: four trend charts, no summary text.
    #[default]
    History,
    /// Statistics: duration trend, phase breakdown, heart rate and summary.
    Statistics,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageChart {
    pub container_id: &'static str,
    pub series: SeriesName,
    pub kind: ChartKind,
}

impl Dashboard {
    /// Charts redrawn from every fetched page.
    pub fn page_charts(self) -> Vec<PageChart> {
        match self {
            Dashboard::History => vec![
                PageChart {
                    container_id: ids::GRAPH_LATENCY,
                    series: SeriesName::Latency,
                    kind: ChartKind::Column,
                },
                PageChart {
                    container_id: ids::GRAPH_EFFICIENCY,
                    series: SeriesName::Efficiency,
                    kind: ChartKind::Line,
                },
                PageChart {
                    container_id: ids::GRAPH_FRAGMENTATION,
                    series: SeriesName::Fragmentation,
                    kind: ChartKind::Line,
                },
                PageChart {
                    container_id: ids::GRAPH_CALORIES,
                    series: SeriesName::CaloriesBurned,
                    kind: ChartKind::Line,
                },
            ],
            Dashboard::Statistics => vec![PageChart {
                container_id: ids::GRAPH_DURATION,
                series: SeriesName::SleepDuration,
                kind: ChartKind::Line,
            }],
        }
    }

    pub fn has_summary(self) -> bool {
        matches!(self, Dashboard::Statistics)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseSlice {
    pub name: String,
    /// Share of the night, percent.
    pub y: f64,
    /// Radius weight of the slice.
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeartRateSeries {
    pub bpm: Vec<f64>,
    /// Time of each measurement, `HH:MM`.
    pub date: Vec<String>,
}

/// Initial state rendered by the server for a freshly loaded page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bootstrap {
    pub dashboard: Dashboard,
    pub page_size: PageSize,
    pub page: PageResponse,
    pub phases: Vec<PhaseSlice>,
    pub heart_rate: HeartRateSeries,
    pub recommendation_pending: bool,
}

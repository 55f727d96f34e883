//! Plain-text rendering of the view model.

use sleeplog_core::{
    AppViewModel, BannerPhase, ChartData, ChartHandle, Dashboard, JobRowView, JobStatus,
};

const BAR_WIDTH: usize = 20;
const FILE_TYPE_MESSAGE: &str = "Only CSV files can be uploaded.";

pub fn render(view: &AppViewModel, alerts: &[String]) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(header(view));

    if view.banner.phase != BannerPhase::Hidden {
        lines.push(format!("! {FILE_TYPE_MESSAGE}"));
    }
    lines.extend(alerts.iter().map(|alert| format!("! {alert}")));

    if view.upload_progress_visible {
        lines.push(format!(
            "uploads: {} waiting, {} sending, {} accepted",
            view.uploads_waiting, view.uploads_in_flight, view.uploads_accepted
        ));
    }
    if view.tasks_progress_visible {
        lines.extend(view.jobs.iter().map(job_line));
    }

    lines.extend(view.charts.iter().map(chart_line));

    if !view.pagination.is_empty() {
        let controls: Vec<&str> = view
            .pagination
            .iter()
            .map(|nav| nav.element_id)
            .collect();
        lines.push(format!("[{}]", controls.join("] [")));
    }

    if let Some(title) = &view.summary.title {
        lines.push(title.clone());
    }
    if let Some(count) = &view.summary.count {
        lines.push(count.clone());
    }
    if let Some(avg) = &view.summary.avg_duration {
        lines.push(format!("average duration: {avg}"));
    }

    if let Some(block) = &view.recommendation {
        lines.extend(block.lines.iter().map(|line| format!("> {line}")));
        if let Some(efficiency) = &block.efficiency {
            lines.push(format!("> {efficiency}"));
        }
    } else if view.recommendation_pending {
        lines.push("> preparing recommendation...".to_string());
    }
    lines
}

fn header(view: &AppViewModel) -> String {
    let dashboard = match view.dashboard {
        Dashboard::History => "history",
        Dashboard::Statistics => "statistics",
    };
    let modes: Vec<String> = view
        .mode_controls
        .iter()
        .map(|mode| {
            if mode.active {
                format!("*{}*", mode.page_size.mode())
            } else {
                mode.page_size.mode().to_string()
            }
        })
        .collect();
    let loading = if view.page_loading { " (loading)" } else { "" };
    format!("== {dashboard} | {}{loading} ==", modes.join(" "))
}

fn job_line(row: &JobRowView) -> String {
    let filled = usize::from(row.percent.min(100)) * BAR_WIDTH / 100;
    let state = match &row.status {
        JobStatus::Pending => "pending",
        JobStatus::Progress(_) => "running",
        JobStatus::Success => "done",
        JobStatus::Failure(_) => "failed",
    };
    format!(
        "{:<24} [{}{}] {:>3}% {state} {}",
        row.display_name,
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        row.percent,
        row.message
    )
}

fn chart_line(chart: &ChartHandle) -> String {
    let detail = match &chart.data {
        ChartData::Series { categories, values } => {
            let known: Vec<f64> = values.iter().flatten().copied().collect();
            let range = match (categories.first(), categories.last()) {
                (Some(from), Some(to)) => format!(" {from}..{to}"),
                _ => String::new(),
            };
            if known.is_empty() {
                format!("no data{range}")
            } else {
                let min = known.iter().copied().fold(f64::INFINITY, f64::min);
                let max = known.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                format!("{} days{range}, min {min:.1}, max {max:.1}", values.len())
            }
        }
        ChartData::Slices(slices) => slices
            .iter()
            .map(|slice| format!("{} {:.0}%", slice.name, slice.y))
            .collect::<Vec<_>>()
            .join(", "),
        ChartData::Scatter { points, density, .. } => {
            format!("{} readings, {} density points", points.len(), density.len())
        }
    };
    format!("{} ({}): {detail}", chart.title, chart.container_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sleeplog_core::{
        BannerView, ChartKind, JobId, ModeControlView, PageSize, RecommendationBlock,
        SeriesColor, SeriesName,
    };

    fn row(percent: u8, status: JobStatus, message: &str) -> JobRowView {
        JobRowView {
            row_id: "progress-row-abc".into(),
            bar_id: "progress-bar-abc".into(),
            message_id: "progress-message-abc".into(),
            job_id: JobId::new("abc"),
            display_name: "night".into(),
            status,
            percent,
            message: message.into(),
        }
    }

    #[test]
    fn renders_banner_alerts_and_jobs() {
        let view = AppViewModel {
            banner: BannerView {
                element_id: "file-type-error",
                phase: BannerPhase::Visible,
                shows: 1,
            },
            mode_controls: vec![
                ModeControlView {
                    element_id: "mode-week",
                    page_size: PageSize::Week,
                    active: true,
                },
                ModeControlView {
                    element_id: "mode-month",
                    page_size: PageSize::Month,
                    active: false,
                },
            ],
            tasks_progress_visible: true,
            jobs: vec![row(40, JobStatus::Progress(40), "Processing")],
            ..AppViewModel::default()
        };
        let lines = render(&view, &["10:00:00 Too many files".to_string()]);
        assert_eq!(lines[0], "== history | *week* month ==");
        assert_eq!(lines[1], "! Only CSV files can be uploaded.");
        assert_eq!(lines[2], "! 10:00:00 Too many files");
        assert!(lines[3].contains("[########------------]  40% running Processing"));
    }

    #[test]
    fn renders_charts_and_recommendation() {
        let view = AppViewModel {
            dashboard: Dashboard::Statistics,
            charts: vec![ChartHandle {
                container_id: "graph-Duration".into(),
                series: SeriesName::SleepDuration,
                generation: 3,
                kind: ChartKind::Line,
                color: SeriesColor::Unassigned,
                title: "Sleep duration".into(),
                data: ChartData::Series {
                    categories: vec!["2024-05-01".into(), "2024-05-02".into()],
                    values: vec![Some(6.5), None],
                },
            }],
            recommendation: Some(RecommendationBlock {
                lines: vec!["Sleep earlier.".into()],
                efficiency: Some("Your sleep efficiency is 87%".into()),
            }),
            ..AppViewModel::default()
        };
        let lines = render(&view, &[]);
        assert_eq!(
            lines[1],
            "Sleep duration (graph-Duration): 2 days 2024-05-01..2024-05-02, min 6.5, max 6.5"
        );
        assert_eq!(lines[2], "> Sleep earlier.");
        assert_eq!(lines[3], "> Your sleep efficiency is 87%");
    }

    #[test]
    fn recommendation_without_efficiency_has_no_metric_line() {
        let view = AppViewModel {
            recommendation: Some(RecommendationBlock {
                lines: vec!["Sleep earlier.".into()],
                efficiency: None,
            }),
            ..AppViewModel::default()
        };
        let lines = render(&view, &[]);
        assert_eq!(lines.last().map(String::as_str), Some("> Sleep earlier."));
        assert!(!lines.iter().any(|line| line.contains("efficiency")));
    }

    #[test]
    fn pending_recommendation_is_announced() {
        let view = AppViewModel {
            recommendation_pending: true,
            ..AppViewModel::default()
        };
        assert_eq!(
            render(&view, &[]).last().map(String::as_str),
            Some("> preparing recommendation...")
        );
    }
}

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use sleeplog_core::Dashboard;

use super::logging::LogDestination;

/// Terminal client for the sleep tracker: uploads health-log exports,
/// follows their processing and pages through the resulting charts.
#[derive(Parser, Debug)]
#[command(name = "sleeplog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// RON file overriding the built-in settings.
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Backend address, e.g. http://127.0.0.1:8000.
    #[arg(long, env = "SLEEPLOG_BASE_URL")]
    pub base_url: Option<String>,

    /// Dashboard to open.
    #[arg(short = 'd', long, value_enum, default_value_t = DashboardArg::History)]
    pub dashboard: DashboardArg,

    /// Where log records go.
    #[arg(long, value_enum, default_value_t = LogArg::File)]
    pub log: LogArg,

    /// Log at debug level.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Files to upload right after start-up.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DashboardArg {
    History,
    Statistics,
}

impl From<DashboardArg> for Dashboard {
    fn from(arg: DashboardArg) -> Self {
        match arg {
            DashboardArg::History => Dashboard::History,
            DashboardArg::Statistics => Dashboard::Statistics,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogArg {
    File,
    Terminal,
    Both,
}

impl From<LogArg> for LogDestination {
    fn from(arg: LogArg) -> Self {
        match arg {
            LogArg::File => LogDestination::File,
            LogArg::Terminal => LogDestination::Terminal,
            LogArg::Both => LogDestination::Both,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dashboard_and_files() {
        let cli = Cli::parse_from([
            "sleeplog",
            "--dashboard",
            "statistics",
            "--log",
            "both",
            "a.csv",
            "b.csv",
        ]);
        assert_eq!(Dashboard::from(cli.dashboard), Dashboard::Statistics);
        assert_eq!(LogDestination::from(cli.log), LogDestination::Both);
        assert_eq!(cli.files, vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]);
        assert!(cli.config.is_none());
    }
}

use std::fmt;

/// Server-issued identifier of a background processing job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    /// Percent complete, 0..=100.
    Progress(u8),
    Success,
    Failure(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failure(_))
    }

    fn rank(&self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Progress(_) => 1,
            JobStatus::Success | JobStatus::Failure(_) => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored,
    Finished(JobOutcome),
}

pub const DISPLAY_NAME_LIMIT: usize = 10;

/// Shortens a file name for the progress row: ten characters and an ellipsis.
pub fn display_name(file_name: &str) -> String {
    if file_name.chars().count() > DISPLAY_NAME_LIMIT {
        let head: String = file_name.chars().take(DISPLAY_NAME_LIMIT).collect();
        format!("{head}...")
    } else {
        file_name.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRow {
    pub job_id: JobId,
    pub display_name: String,
    pub status: JobStatus,
    pub percent: u8,
    pub message: String,
}

impl JobRow {
    fn message_for(status: &JobStatus, display_name: &str) -> String {
        match status {
            JobStatus::Pending => "Waiting...".to_string(),
            JobStatus::Progress(percent) => format!("Processing: {percent}%"),
            JobStatus::Success => format!("Upload of file {display_name} complete"),
            JobStatus::Failure(_) => format!("Error while uploading file {display_name}"),
        }
    }
}

/// Progress rows of every monitored job, in the order they were started.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobMonitors {
    rows: Vec<JobRow>,
}

impl JobMonitors {
    /// Creates a `Pending` row. Returns false if the job is already monitored.
    pub fn start(&mut self, job_id: JobId, file_name: &str) -> bool {
        if self.row(&job_id).is_some() {
            return false;
        }
        let display_name = display_name(file_name);
        let status = JobStatus::Pending;
        self.rows.push(JobRow {
            message: JobRow::message_for(&status, &display_name),
            job_id,
            display_name,
            status,
            percent: 0,
        });
        true
    }

    /// Applies a polled status. Backward moves and anything after a terminal
    /// state are ignored.
    pub fn apply(&mut self, job_id: &JobId, status: JobStatus) -> Transition {
        let Some(row) = self.rows.iter_mut().find(|row| &row.job_id == job_id) else {
            return Transition::Ignored;
        };
        if row.status.is_terminal() || status.rank() < row.status.rank() {
            return Transition::Ignored;
        }

        match &status {
            JobStatus::Progress(percent) => row.percent = (*percent).min(100),
            JobStatus::Success => row.percent = 100,
            JobStatus::Pending | JobStatus::Failure(_) => {}
        }
        row.message = JobRow::message_for(&status, &row.display_name);
        let outcome = match status {
            JobStatus::Success => Some(JobOutcome::Succeeded),
            JobStatus::Failure(_) => Some(JobOutcome::Failed),
            JobStatus::Pending | JobStatus::Progress(_) => None,
        };
        row.status = status;

        match outcome {
            Some(outcome) => Transition::Finished(outcome),
            None => Transition::Applied,
        }
    }

    pub fn row(&self, job_id: &JobId) -> Option<&JobRow> {
        self.rows.iter().find(|row| &row.job_id == job_id)
    }

    pub fn rows(&self) -> &[JobRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

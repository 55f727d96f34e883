use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;

use crate::config::UploadPolicy;
use crate::JobId;

pub type UploadId = u64;

/// A file the user dropped. The controller never reads it; the engine does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub name: String,
    pub path: PathBuf,
}

impl FileRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path }
    }

    /// Lowercased text after the last dot, or the whole name when there is none.
    pub fn extension(&self) -> String {
        self.name
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    pub id: UploadId,
    pub file: FileRef,
    pub accepted: bool,
    pub job_id: Option<JobId>,
}

/// Why the ingestion side refused a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    UnsupportedType,
    Other(String),
}

/// Message used when a file arrives after the session limit was reached.
pub const MAX_FILES_EXCEEDED: &str = "You can not upload any more files.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Queued(UploadId),
    WrongType,
    LimitReached,
}

/// Bounded upload queue: at most `max_files` accepted per session and at most
/// `parallel_uploads` transmissions in flight. Waiting files leave in FIFO order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadQueue {
    policy: UploadPolicy,
    next_id: UploadId,
    accepted_total: usize,
    waiting: VecDeque<UploadTask>,
    in_flight: BTreeMap<UploadId, UploadTask>,
}

impl UploadQueue {
    pub fn new(policy: UploadPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn admit(&mut self, file: FileRef) -> Admission {
        if file.extension() != self.policy.accepted_extension {
            return Admission::WrongType;
        }
        if self.accepted_total >= self.policy.max_files {
            return Admission::LimitReached;
        }

        self.next_id += 1;
        let id = self.next_id;
        self.accepted_total += 1;
        self.waiting.push_back(UploadTask {
            id,
            file,
            accepted: true,
            job_id: None,
        });
        Admission::Queued(id)
    }

    /// Moves waiting tasks into flight until the concurrency cap is reached.
    pub fn dispatch(&mut self) -> Vec<(UploadId, FileRef)> {
        let mut started = Vec::new();
        while self.in_flight.len() < self.policy.parallel_uploads {
            let Some(task) = self.waiting.pop_front() else {
                break;
            };
            started.push((task.id, task.file.clone()));
            self.in_flight.insert(task.id, task);
        }
        started
    }

    /// Records the job id for a transmitted file and releases its slot.
    pub fn complete(&mut self, upload_id: UploadId, job_id: JobId) -> Option<UploadTask> {
        let mut task = self.in_flight.remove(&upload_id)?;
        task.job_id = Some(job_id);
        Some(task)
    }

    /// Releases the slot of a refused file. A type rejection removes the file
    /// from the session entirely, so it no longer counts against `max_files`.
    pub fn reject(&mut self, upload_id: UploadId, reason: &UploadRejection) -> Option<UploadTask> {
        let mut task = self.in_flight.remove(&upload_id)?;
        if *reason == UploadRejection::UnsupportedType {
            task.accepted = false;
            self.accepted_total = self.accepted_total.saturating_sub(1);
        }
        Some(task)
    }

    /// Forgets every task for a new session. Ids keep increasing so answers
    /// for transmissions from the old session cannot match a new task.
    pub fn reset(&mut self) {
        self.accepted_total = 0;
        self.waiting.clear();
        self.in_flight.clear();
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn accepted_total(&self) -> usize {
        self.accepted_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_files: usize, parallel_uploads: usize) -> UploadPolicy {
        UploadPolicy {
            max_files,
            parallel_uploads,
            ..UploadPolicy::default()
        }
    }

    #[test]
    fn extension_is_case_insensitive() {
        assert_eq!(FileRef::new("/tmp/Night.CSV").extension(), "csv");
        assert_eq!(FileRef::new("/tmp/archive.csv.txt").extension(), "txt");
        assert_eq!(FileRef::new("/tmp/README").extension(), "readme");
    }

    #[test]
    fn dispatch_respects_parallel_cap() {
        let mut queue = UploadQueue::new(policy(13, 2));
        for i in 0..5 {
            assert!(matches!(
                queue.admit(FileRef::new(format!("/tmp/{i}.csv"))),
                Admission::Queued(_)
            ));
        }

        let started = queue.dispatch();
        assert_eq!(started.len(), 2);
        assert_eq!(queue.in_flight_count(), 2);
        assert_eq!(queue.waiting_count(), 3);
        assert!(queue.dispatch().is_empty());

        queue.complete(started[0].0, JobId::new("a"));
        let next = queue.dispatch();
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].1.name, "2.csv");
    }

    #[test]
    fn type_rejection_frees_a_session_slot() {
        let mut queue = UploadQueue::new(policy(1, 1));
        let Admission::Queued(id) = queue.admit(FileRef::new("/tmp/a.csv")) else {
            panic!("expected queued");
        };
        assert_eq!(queue.admit(FileRef::new("/tmp/b.csv")), Admission::LimitReached);

        queue.dispatch();
        let task = queue.reject(id, &UploadRejection::UnsupportedType).unwrap();
        assert!(!task.accepted);
        assert_eq!(queue.accepted_total(), 0);
        assert!(matches!(
            queue.admit(FileRef::new("/tmp/c.csv")),
            Admission::Queued(_)
        ));
    }
}

use std::sync::Once;
use std::time::Duration;

use pretty_assertions::assert_eq;
use sleeplog_core::{
    update, AppState, BannerPhase, ControllerConfig, Effect, FileRef, JobId, JobStatus, Msg,
    Timer, UploadPolicy, UploadRejection,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(sleeplog_logging::initialize_for_tests);
}

fn drop_files(state: AppState, names: &[&str]) -> (AppState, Vec<Effect>) {
    let files = names
        .iter()
        .map(|name| FileRef::new(format!("/data/{name}")))
        .collect();
    update(state, Msg::FilesDropped(files))
}

fn transmitted(effects: &[Effect]) -> Vec<(u64, String)> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::TransmitFile { upload_id, file } => Some((*upload_id, file.name.clone())),
            _ => None,
        })
        .collect()
}

#[test]
fn wrong_extension_shows_banner_without_transmission() {
    init_logging();
    let (mut state, effects) = drop_files(AppState::new(), &["notes.txt"]);

    assert!(transmitted(&effects).is_empty());
    assert_eq!(
        effects,
        vec![Effect::Schedule {
            timer: Timer::Banner { generation: 1 },
            after: Duration::from_millis(10),
        }]
    );
    let view = state.view();
    assert_eq!(view.banner.phase, BannerPhase::Shown);
    assert_eq!(view.banner.shows, 1);
    assert_eq!(view.banner.element_id, "file-type-error");
    assert_eq!(view.uploads_accepted, 0);
    assert!(state.consume_dirty());
}

#[test]
fn banner_shown_once_per_rejected_file() {
    init_logging();
    let (state, effects) = drop_files(AppState::new(), &["a.txt", "b.csv", "c.PDF", "d.Csv"]);

    let sent = transmitted(&effects);
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].1, "b.csv");
    assert_eq!(sent[1].1, "d.Csv");
    assert_eq!(state.view().banner.shows, 2);
}

#[test]
fn banner_fades_out_and_hides() {
    init_logging();
    let (state, _) = drop_files(AppState::new(), &["a.txt"]);
    let banner = |generation| Msg::TimerElapsed(Timer::Banner { generation });

    let (state, effects) = update(state, banner(1));
    assert_eq!(state.view().banner.phase, BannerPhase::Visible);
    assert_eq!(
        effects,
        vec![Effect::Schedule {
            timer: Timer::Banner { generation: 1 },
            after: Duration::from_secs(1),
        }]
    );

    let (state, effects) = update(state, banner(1));
    assert_eq!(state.view().banner.phase, BannerPhase::FadingOut);
    assert_eq!(
        effects,
        vec![Effect::Schedule {
            timer: Timer::Banner { generation: 1 },
            after: Duration::from_millis(500),
        }]
    );

    let (state, effects) = update(state, banner(1));
    assert_eq!(state.view().banner.phase, BannerPhase::Hidden);
    assert!(effects.is_empty());
}

#[test]
fn concurrency_cap_queues_the_rest() {
    init_logging();
    let names = ["1.csv", "2.csv", "3.csv", "4.csv", "5.csv"];
    let (state, effects) = drop_files(AppState::new(), &names);

    let sent = transmitted(&effects);
    assert_eq!(sent.len(), 3);
    let view = state.view();
    assert_eq!(view.uploads_in_flight, 3);
    assert_eq!(view.uploads_waiting, 2);

    let (state, effects) = update(
        state,
        Msg::UploadFinished {
            upload_id: sent[0].0,
            result: Ok(JobId::new("job-1")),
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::MonitorJob {
                job_id: JobId::new("job-1")
            },
            Effect::TransmitFile {
                upload_id: 4,
                file: FileRef::new("/data/4.csv"),
            },
        ]
    );
    assert_eq!(state.view().uploads_in_flight, 3);
    assert_eq!(state.view().uploads_waiting, 1);
}

#[test]
fn session_limit_raises_alert() {
    init_logging();
    let config = ControllerConfig {
        upload: UploadPolicy {
            max_files: 2,
            ..UploadPolicy::default()
        },
        ..ControllerConfig::default()
    };
    let (state, effects) = drop_files(AppState::with_config(config), &["a.csv", "b.csv", "c.csv"]);

    assert_eq!(transmitted(&effects).len(), 2);
    assert!(effects.contains(&Effect::ShowAlert {
        message: "Upload failed: You can not upload any more files.".to_string(),
    }));
    assert_eq!(state.view().banner.shows, 0);
    assert!(!state.view().upload_progress_visible);
}

#[test]
fn transport_type_rejection_uses_banner() {
    init_logging();
    let (state, effects) = drop_files(AppState::new(), &["a.csv"]);
    let upload_id = transmitted(&effects)[0].0;

    let (state, effects) = update(
        state,
        Msg::UploadFinished {
            upload_id,
            result: Err(UploadRejection::UnsupportedType),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::Schedule {
            timer: Timer::Banner { generation: 1 },
            after: Duration::from_millis(10),
        }]
    );
    let view = state.view();
    assert_eq!(view.uploads_accepted, 0);
    assert_eq!(view.uploads_in_flight, 0);
    assert!(!view.upload_progress_visible);
    assert!(view.jobs.is_empty());
}

#[test]
fn other_transport_rejection_raises_alert() {
    init_logging();
    let (state, effects) = drop_files(AppState::new(), &["a.csv"]);
    let upload_id = transmitted(&effects)[0].0;

    let (state, effects) = update(
        state,
        Msg::UploadFinished {
            upload_id,
            result: Err(UploadRejection::Other("Missing column: date".into())),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::ShowAlert {
            message: "Upload failed: Missing column: date".to_string(),
        }]
    );
    assert_eq!(state.view().banner.shows, 0);
    assert_eq!(state.view().uploads_accepted, 1);
}

#[test]
fn accepted_upload_creates_pending_row() {
    init_logging();
    let (state, effects) = drop_files(AppState::new(), &["very_long_night_export.csv"]);
    let upload_id = transmitted(&effects)[0].0;

    let (mut state, effects) = update(
        state,
        Msg::UploadFinished {
            upload_id,
            result: Ok(JobId::new("abc123")),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::MonitorJob {
            job_id: JobId::new("abc123")
        }]
    );
    let view = state.view();
    assert!(view.tasks_progress_visible);
    let row = view.job("abc123").expect("row");
    assert_eq!(row.row_id, "progress-abc123");
    assert_eq!(row.bar_id, "bar-abc123");
    assert_eq!(row.message_id, "msg-abc123");
    assert_eq!(row.display_name, "very_long_...");
    assert_eq!(row.status, JobStatus::Pending);
    assert_eq!(row.message, "Waiting...");
    assert!(state.consume_dirty());
}

#[test]
fn answer_for_unknown_upload_is_ignored() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::UploadFinished {
            upload_id: 42,
            result: Ok(JobId::new("ghost")),
        },
    );
    assert!(effects.is_empty());
    assert!(state.view().jobs.is_empty());
}

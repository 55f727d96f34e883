use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Bootstrapped(bootstrap) => state.bootstrap(&bootstrap),
        Msg::FilesDropped(files) => {
            if files.is_empty() {
                return (state, Vec::new());
            }
            state.drop_files(files)
        }
        Msg::UploadFinished { upload_id, result } => state.finish_upload(upload_id, result),
        Msg::JobStatusPolled { job_id, status } => state.apply_job_status(&job_id, status),
        Msg::TimerElapsed(timer) => state.timer_elapsed(timer),
        Msg::ControlClicked(control) => state.click(control),
        Msg::LoadPage(direction) => vec![state.load_page(&direction)],
        Msg::SetPageSize(page_size) => state.set_page_size(page_size),
        Msg::PageLoaded { seq, result } => state.page_loaded(seq, result),
        Msg::RecommendationPolled(response) => {
            state.recommendation_polled(&response);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use sleeplog_core::{Dashboard, FileRef, JobId, PageQuery, RequestSeq, Timer, UploadId};
use sleeplog_logging::{sleeplog_debug, sleeplog_info};

use crate::poll::{self, ChannelEventSink, EventSink, PollHandle};
use crate::{ClientSettings, EngineError, EngineEvent, ReqwestSleepApi, SleepApi};

enum EngineCommand {
    Upload {
        upload_id: UploadId,
        file: FileRef,
    },
    MonitorJob {
        job_id: JobId,
    },
    FetchPage {
        seq: RequestSeq,
        dashboard: Dashboard,
        query: PageQuery,
    },
    PollRecommendation,
    Bootstrap {
        dashboard: Dashboard,
    },
    Schedule {
        timer: Timer,
        after: Duration,
    },
    StopPolling,
}

/// Runs backend calls, poll loops and timers on a background thread with its
/// own async runtime. Results come back as [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let api = Arc::new(ReqwestSleepApi::new(settings.clone())?);
        Self::with_api(api, settings)
    }

    pub fn with_api(api: Arc<dyn SleepApi>, settings: ClientSettings) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));

        thread::spawn(move || {
            let mut pollers: Vec<PollHandle> = Vec::new();
            while let Ok(command) = cmd_rx.recv() {
                pollers.retain(|poller| !poller.is_finished());
                match command {
                    EngineCommand::MonitorJob { job_id } => {
                        pollers.push(poll::poll_job(
                            runtime.handle(),
                            api.clone(),
                            job_id,
                            settings.job_poll_interval,
                            sink.clone(),
                        ));
                    }
                    EngineCommand::PollRecommendation => {
                        pollers.push(poll::poll_recommendation(
                            runtime.handle(),
                            api.clone(),
                            settings.recommendation_retry,
                            sink.clone(),
                        ));
                    }
                    EngineCommand::StopPolling => {
                        sleeplog_info!("Stopping {} poll loop(s)", pollers.len());
                        for poller in pollers.drain(..) {
                            poller.stop();
                        }
                    }
                    other => {
                        let api = api.clone();
                        let sink = sink.clone();
                        runtime.spawn(async move {
                            handle_command(api.as_ref(), other, sink.as_ref()).await;
                        });
                    }
                }
            }
            sleeplog_debug!("Engine channel closed, shutting down");
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn upload(&self, upload_id: UploadId, file: FileRef) {
        let _ = self.cmd_tx.send(EngineCommand::Upload { upload_id, file });
    }

    pub fn monitor_job(&self, job_id: JobId) {
        let _ = self.cmd_tx.send(EngineCommand::MonitorJob { job_id });
    }

    pub fn fetch_page(&self, seq: RequestSeq, dashboard: Dashboard, query: PageQuery) {
        let _ = self.cmd_tx.send(EngineCommand::FetchPage {
            seq,
            dashboard,
            query,
        });
    }

    pub fn poll_recommendation(&self) {
        let _ = self.cmd_tx.send(EngineCommand::PollRecommendation);
    }

    pub fn bootstrap(&self, dashboard: Dashboard) {
        let _ = self.cmd_tx.send(EngineCommand::Bootstrap { dashboard });
    }

    pub fn schedule(&self, timer: Timer, after: Duration) {
        let _ = self.cmd_tx.send(EngineCommand::Schedule { timer, after });
    }

    /// Cancels every running poll loop.
    pub fn stop_polling(&self) {
        let _ = self.cmd_tx.send(EngineCommand::StopPolling);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(api: &dyn SleepApi, command: EngineCommand, sink: &dyn EventSink) {
    match command {
        EngineCommand::Upload { upload_id, file } => {
            let result = api.upload(&file).await.map_err(Into::into);
            sink.emit(EngineEvent::UploadFinished { upload_id, result });
        }
        EngineCommand::FetchPage {
            seq,
            dashboard,
            query,
        } => {
            let result = api.fetch_page(dashboard, &query).await.map_err(Into::into);
            sink.emit(EngineEvent::PageLoaded { seq, result });
        }
        EngineCommand::Bootstrap { dashboard } => {
            let result = api.bootstrap(dashboard).await.map(Box::new);
            sink.emit(EngineEvent::Bootstrapped(result));
        }
        EngineCommand::Schedule { timer, after } => {
            tokio::time::sleep(after).await;
            sink.emit(EngineEvent::TimerElapsed(timer));
        }
        EngineCommand::MonitorJob { .. }
        | EngineCommand::PollRecommendation
        | EngineCommand::StopPolling => {}
    }
}

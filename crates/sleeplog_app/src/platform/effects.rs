use std::time::Duration;

use sleeplog_core::{Dashboard, Effect, Msg};
use sleeplog_engine::{ClientSettings, EngineError, EngineEvent, EngineHandle};
use sleeplog_logging::{sleeplog_error, sleeplog_info};

/// Hands effects to the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    dashboard: Dashboard,
}

impl EffectRunner {
    pub fn new(settings: ClientSettings, dashboard: Dashboard) -> Result<Self, EngineError> {
        sleeplog_info!("Connecting to {}", settings.base_url);
        Ok(Self {
            engine: EngineHandle::new(settings)?,
            dashboard,
        })
    }

    pub fn bootstrap(&self) {
        self.engine.bootstrap(self.dashboard);
    }

    /// Executes effects and returns the alerts the user has to see.
    pub fn run(&self, effects: Vec<Effect>) -> Vec<String> {
        let mut alerts = Vec::new();
        for effect in effects {
            match effect {
                Effect::TransmitFile { upload_id, file } => {
                    sleeplog_info!("TransmitFile upload_id={} name={}", upload_id, file.name);
                    self.engine.upload(upload_id, file);
                }
                Effect::MonitorJob { job_id } => self.engine.monitor_job(job_id),
                Effect::Schedule { timer, after } => self.engine.schedule(timer, after),
                Effect::ShowAlert { message } => alerts.push(message),
                Effect::FetchPage { seq, query } => {
                    self.engine.fetch_page(seq, self.dashboard, query);
                }
                Effect::StartRecommendationPoll => self.engine.poll_recommendation(),
                Effect::StopPolling => self.engine.stop_polling(),
                Effect::ReloadPage => self.bootstrap(),
            }
        }
        alerts
    }

    /// Waits up to `timeout` for the next engine event that means something
    /// to the controller.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).and_then(event_to_msg)
    }

    /// `None` when no event is pending; `Some(None)` for an event that maps to
    /// no message.
    pub fn try_next_msg(&self) -> Option<Option<Msg>> {
        self.engine.try_recv().map(event_to_msg)
    }
}

pub fn event_to_msg(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::UploadFinished { upload_id, result } => {
            Some(Msg::UploadFinished { upload_id, result })
        }
        EngineEvent::JobStatus { job_id, status } => Some(Msg::JobStatusPolled { job_id, status }),
        EngineEvent::PageLoaded { seq, result } => Some(Msg::PageLoaded { seq, result }),
        EngineEvent::RecommendationReady(response) => Some(Msg::RecommendationPolled(response)),
        EngineEvent::Bootstrapped(Ok(bootstrap)) => Some(Msg::Bootstrapped(bootstrap)),
        EngineEvent::Bootstrapped(Err(err)) => {
            sleeplog_error!("Failed to load dashboard: {}", err);
            None
        }
        EngineEvent::TimerElapsed(timer) => Some(Msg::TimerElapsed(timer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sleeplog_core::{Bootstrap, JobId, JobStatus, Timer};
    use sleeplog_engine::{ApiError, FailureKind};

    #[test]
    fn engine_events_become_messages() {
        assert_eq!(
            event_to_msg(EngineEvent::JobStatus {
                job_id: JobId::new("abc123"),
                status: JobStatus::Progress(40),
            }),
            Some(Msg::JobStatusPolled {
                job_id: JobId::new("abc123"),
                status: JobStatus::Progress(40),
            })
        );
        assert_eq!(
            event_to_msg(EngineEvent::TimerElapsed(Timer::Banner { generation: 2 })),
            Some(Msg::TimerElapsed(Timer::Banner { generation: 2 }))
        );
        assert_eq!(
            event_to_msg(EngineEvent::Bootstrapped(Ok(Box::new(Bootstrap::default())))),
            Some(Msg::Bootstrapped(Box::new(Bootstrap::default())))
        );
    }

    #[test]
    fn failed_bootstrap_is_dropped() {
        let err = ApiError {
            kind: FailureKind::Timeout,
            message: "timed out".into(),
        };
        assert_eq!(event_to_msg(EngineEvent::Bootstrapped(Err(err))), None);
    }
}

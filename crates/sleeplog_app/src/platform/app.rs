use std::sync::mpsc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use sleeplog_core::{update, AppState, ControllerConfig, Dashboard, FileRef, Msg};
use sleeplog_engine::ClientSettings;
use sleeplog_logging::{set_session_epoch, sleeplog_info};

use super::cli::Cli;
use super::config::AppConfig;
use super::effects::EffectRunner;
use super::logging;
use super::ui::input::{self, Command, HELP};
use super::ui::render;

const EVENT_WAIT: Duration = Duration::from_millis(50);

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log.into(), cli.verbose);

    let mut controller = ControllerConfig::default();
    let mut settings = ClientSettings::default();
    if let Some(path) = &cli.config {
        AppConfig::load(path)?.apply(&mut controller, &mut settings);
    }
    if let Some(base_url) = &cli.base_url {
        settings.base_url = base_url.clone();
    }

    let dashboard: Dashboard = cli.dashboard.into();
    let runner = EffectRunner::new(settings, dashboard).context("starting the engine")?;
    runner.bootstrap();

    let (command_tx, command_rx) = mpsc::channel();
    input::spawn_stdin_reader(command_tx);
    println!("{HELP}");

    let mut session = Session {
        state: AppState::with_config(controller),
        runner,
    };
    if !cli.files.is_empty() {
        let files = cli.files.into_iter().map(FileRef::new).collect();
        session.dispatch(Msg::FilesDropped(files));
    }

    loop {
        while let Some(event) = session.runner.try_next_msg() {
            if let Some(msg) = event {
                session.dispatch(msg);
            }
        }
        loop {
            match command_rx.try_recv() {
                Ok(Command::Msg(msg)) => session.dispatch(msg),
                Ok(Command::Help) => println!("{HELP}"),
                Ok(Command::Quit) | Err(mpsc::TryRecvError::Disconnected) => {
                    sleeplog_info!("Shutting down");
                    return Ok(());
                }
                Err(mpsc::TryRecvError::Empty) => break,
            }
        }
        if let Some(msg) = session.runner.next_msg(EVENT_WAIT) {
            session.dispatch(msg);
        }
    }
}

struct Session {
    state: AppState,
    runner: EffectRunner,
}

impl Session {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        set_session_epoch(state.epoch());

        let stamp = chrono::Local::now().format("%H:%M:%S");
        let alerts: Vec<String> = self
            .runner
            .run(effects)
            .into_iter()
            .map(|alert| format!("{stamp} {alert}"))
            .collect();

        if state.consume_dirty() || !alerts.is_empty() {
            for line in render::render(&state.view(), &alerts) {
                println!("{line}");
            }
        }
        self.state = state;
    }
}

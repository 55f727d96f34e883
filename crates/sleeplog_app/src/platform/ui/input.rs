//! Line commands read from stdin.

use std::io::BufRead;
use std::sync::mpsc;
use std::thread;

use sleeplog_core::{ControlId, FileRef, Msg, PageSize};
use sleeplog_logging::sleeplog_debug;

pub const HELP: &str =
    "commands: drop <file>... | prev | next | week | month | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Msg(Msg),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`drop` needs at least one file")]
    MissingPaths,
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, InputError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let command = match verb.to_lowercase().as_str() {
        "drop" => {
            let files: Vec<FileRef> = words.map(FileRef::new).collect();
            if files.is_empty() {
                return Err(InputError::MissingPaths);
            }
            Command::Msg(Msg::FilesDropped(files))
        }
        "prev" => Command::Msg(Msg::ControlClicked(ControlId::Prev)),
        "next" => Command::Msg(Msg::ControlClicked(ControlId::Next)),
        "week" => Command::Msg(Msg::ControlClicked(ControlId::Mode(PageSize::Week))),
        "month" => Command::Msg(Msg::ControlClicked(ControlId::Mode(PageSize::Month))),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(InputError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

/// Reads stdin on a background thread. End of input counts as `quit`.
pub fn spawn_stdin_reader(tx: mpsc::Sender<Command>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            match parse(&line) {
                Ok(Some(command)) => {
                    if tx.send(command).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    sleeplog_debug!("Rejected input {:?}: {}", line, err);
                    eprintln!("{err}. {HELP}");
                }
            }
        }
        let _ = tx.send(Command::Quit);
    });
}

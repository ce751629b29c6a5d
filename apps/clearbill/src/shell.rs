//! Interactive line-oriented front end over the view coordinator.

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use client_core::{AuditClient, Dispatched, Session, SessionEvent, UploadOutcome, UserAction};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{broadcast, oneshot},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::view::{render_history, render_transcript, TranscriptPrinter};

pub const HELP: &str = "\
commands:
  upload <file>         submit one document
  drop <file> [file..]  submit the first of several files
  history               list processed documents, newest first
  view <n>              show history entry n
  log                   print the whole conversation
  help                  show this text
  quit                  wait for running uploads and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Action(UserAction),
    History,
    Log,
    Help,
    Quit,
    Empty,
}

pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(ShellCommand::Empty);
    };
    let rest: Vec<&str> = words.collect();

    match verb {
        "upload" => match rest.as_slice() {
            [path] => Ok(ShellCommand::Action(UserAction::FileChosen(PathBuf::from(
                path,
            )))),
            _ => Err("usage: upload <file>".into()),
        },
        "drop" => Ok(ShellCommand::Action(UserAction::FilesDropped(
            rest.iter().map(PathBuf::from).collect(),
        ))),
        "view" => {
            let [index] = rest.as_slice() else {
                return Err("usage: view <n>".into());
            };
            index
                .parse::<usize>()
                .map(|i| ShellCommand::Action(UserAction::HistoryEntryClicked(i)))
                .map_err(|_| format!("'{index}' is not a history index"))
        }
        "history" => Ok(ShellCommand::History),
        "log" => Ok(ShellCommand::Log),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}

/// Prints session changes as they happen until `stop` fires, then flushes
/// whatever is left.
pub fn spawn_follower(
    session: Arc<Session>,
    mut events: broadcast::Receiver<SessionEvent>,
    mut stop: oneshot::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut printer = TranscriptPrinter::default();
        loop {
            tokio::select! {
                received = events.recv() => match received {
                    Ok(event) => {
                        let snapshot = session.snapshot().await;
                        print!("{}", printer.apply(&event, &snapshot));
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "shell: follower lagged, catching up");
                        print!("{}", printer.catch_up(&session.snapshot().await));
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = &mut stop => {
                    while let Ok(event) = events.try_recv() {
                        let snapshot = session.snapshot().await;
                        print!("{}", printer.apply(&event, &snapshot));
                    }
                    print!("{}", printer.catch_up(&session.snapshot().await));
                    break;
                }
            }
        }
    })
}

pub async fn wait_for_uploads(pending: Vec<JoinHandle<UploadOutcome>>) {
    for handle in pending {
        match handle.await {
            Ok(outcome) => debug!(processed = outcome.record().is_some(), "shell: upload settled"),
            Err(e) => warn!("shell: upload task failed: {e}"),
        }
    }
}

pub async fn run(client: &AuditClient) -> Result<()> {
    let coordinator = client.coordinator();
    let (stop_tx, stop_rx) = oneshot::channel();
    let follower = spawn_follower(
        Arc::clone(client.session()),
        coordinator.subscribe(),
        stop_rx,
    );

    println!("{HELP}");
    let mut pending = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        match command {
            ShellCommand::Empty => {}
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Quit => break,
            ShellCommand::History => {
                let snapshot = client.session().snapshot().await;
                print!(
                    "{}",
                    render_history(&snapshot.history, snapshot.selected.as_ref())
                );
            }
            ShellCommand::Log => {
                print!("{}", render_transcript(&client.session().events().await));
            }
            ShellCommand::Action(action) => match coordinator.dispatch(action).await {
                Ok(Dispatched::UploadStarted(handle)) => {
                    pending.retain(|h: &JoinHandle<UploadOutcome>| !h.is_finished());
                    pending.push(handle);
                }
                Ok(Dispatched::Selected) => {}
                Ok(Dispatched::Ignored) => eprintln!("nothing to do"),
                Err(e) => eprintln!("error: {e:#}"),
            },
        }
    }

    wait_for_uploads(pending).await;
    let _ = stop_tx.send(());
    let _ = follower.await;
    Ok(())
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;

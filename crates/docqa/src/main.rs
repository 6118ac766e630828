//! A terminal client for a document Q&A service.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::time::Duration;

use docqa::command::{Command, CommandError};
use docqa::core::conversation::{Message, Role};
use docqa::core::notify::{Notification, Severity};
use docqa::core::upload::DEFAULT_MAX_UPLOAD_BYTES;
use docqa::files::load_documents;
use docqa::{
    HttpService, HttpServiceConfigBuilder, Session, SessionBuilder,
    SessionSnapshot,
};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;

const DEFAULT_BASE_URL: &str = "http://localhost:5000";

const BAR_CHAR: &str = "▎";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let base_url = env::var("DOCQA_BASE_URL")
        .unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
    let mut config = HttpServiceConfigBuilder::with_base_url(base_url);
    let mut request_timeout = None;
    if let Ok(secs) = env::var("DOCQA_TIMEOUT_SECS") {
        let Ok(secs) = secs.parse::<u64>() else {
            eprintln!("DOCQA_TIMEOUT_SECS must be a number of seconds");
            return;
        };
        let timeout = Duration::from_secs(secs);
        config = config.with_timeout(timeout);
        request_timeout = Some(timeout);
    }

    let service = match HttpService::new(config.build()) {
        Ok(service) => service,
        Err(err) => {
            eprintln!("cannot set up the HTTP client: {err}");
            return;
        }
    };

    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel();
    let mut builder = SessionBuilder::with_remote_service(service)
        .with_notification_sink(move |notice: Notification| {
            notice_tx.send(notice).ok();
        });
    if let Some(timeout) = request_timeout {
        builder = builder.with_request_timeout(timeout);
    }
    let session = builder.build();
    let mut snapshots = session.subscribe();

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    let mut lines = io::BufReader::new(io::stdin()).lines();
    let mut printer = Printer::default();
    let mut progress_bar: Option<ProgressBar> = None;
    prompt();

    loop {
        let busy = busy_message(&snapshots.borrow());
        match busy {
            Some(message) => {
                // Create a new progress bar if it has been finished.
                let progress_bar = progress_bar.get_or_insert_with(|| {
                    let progress_bar = ProgressBar::new_spinner();
                    progress_bar.set_style(progress_style.clone());
                    progress_bar
                });
                progress_bar.set_message(message);
                progress_bar.inc(1);
            }
            None => {
                if let Some(progress_bar) = progress_bar.take() {
                    progress_bar.finish_and_clear();
                    prompt();
                }
            }
        }

        let sleep = sleep(Duration::from_millis(100));
        select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(err) => {
                        error!("error reading input: {err}");
                        break;
                    }
                };
                if !handle_line(&session, &line).await {
                    break;
                }
                if busy_message(&session.snapshot()).is_none() {
                    prompt();
                }
            },
            notice = notice_rx.recv() => {
                let Some(notice) = notice else {
                    break;
                };
                // Finish the progress bar before printing anything else.
                if let Some(progress_bar) = progress_bar.take() {
                    progress_bar.finish_and_clear();
                }
                print_notice(&notice);
                if busy_message(&snapshots.borrow()).is_none() {
                    prompt();
                }
            },
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if printer.has_news(&snapshot) {
                    if let Some(progress_bar) = progress_bar.take() {
                        progress_bar.finish_and_clear();
                    }
                    printer.print_news(&snapshot);
                    if busy_message(&snapshot).is_none() {
                        prompt();
                    }
                }
            },
            _ = sleep => {}
        }
    }
}

/// Returns `false` when the REPL should exit.
async fn handle_line(session: &Session, line: &str) -> bool {
    let command = match Command::parse(line) {
        Ok(Some(command)) => command,
        Ok(None) => return true,
        Err(err) => {
            print_usage_error(&err);
            return true;
        }
    };

    match command {
        Command::Ask(question) => {
            if session.snapshot().is_awaiting_answer() {
                println!("{}", "Still waiting for the last answer.".dimmed());
            }
            session.submit_question(question);
        }
        Command::Upload(patterns) => match load_documents(
            patterns,
            DEFAULT_MAX_UPLOAD_BYTES,
        )
        .await
        {
            Ok(files) => session.upload_files(files),
            Err(err) => println!("{}", err.bright_red()),
        },
        Command::ListFiles => print_files(&session.snapshot()),
        Command::Remove(index) => {
            if index >= session.snapshot().files.len() {
                println!("{}", "No such file, see /files".bright_red());
            } else {
                session.remove_file(index);
            }
        }
        Command::Clear => session.clear_chat(),
        Command::Quit => return false,
    }
    true
}

fn busy_message(snapshot: &SessionSnapshot) -> Option<String> {
    if snapshot.is_awaiting_answer() {
        Some("🤔 Thinking...".to_owned())
    } else if snapshot.is_uploading() {
        Some(format!("📤 Uploading {} file(s)...", snapshot.uploads_in_flight))
    } else {
        None
    }
}

/// Prints assistant messages as they arrive.
#[derive(Default)]
struct Printer {
    last_seen_id: u64,
}

impl Printer {
    fn has_news(&self, snapshot: &SessionSnapshot) -> bool {
        snapshot
            .messages
            .last()
            .is_some_and(|msg| msg.id() > self.last_seen_id)
    }

    fn print_news(&mut self, snapshot: &SessionSnapshot) {
        for msg in &snapshot.messages {
            if msg.id() <= self.last_seen_id {
                continue;
            }
            self.last_seen_id = msg.id();
            // The user has just typed their own messages.
            if msg.role() == Role::Assistant {
                print_answer(msg);
            }
        }
    }
}

fn print_answer(msg: &Message) {
    let bar = if msg.is_error() {
        BAR_CHAR.bright_red().to_string()
    } else {
        BAR_CHAR.bright_cyan().to_string()
    };
    println!(
        "\r{bar}🤖 {}  {}",
        msg.content().bright_white(),
        msg.timestamp().dimmed()
    );
    for (i, source) in msg.sources().iter().enumerate() {
        let label = format!("[{}]", i + 1);
        println!("{bar}   {} {}", label.bright_blue(), source.content.dimmed());
    }
    println!();
}

fn print_files(snapshot: &SessionSnapshot) {
    if snapshot.files.is_empty() {
        println!("{}", "No files uploaded yet.".dimmed());
    }
    for (i, file) in snapshot.files.iter().enumerate() {
        println!(
            "{} {} {}",
            format!("{}.", i + 1).bright_blue(),
            file.name.bright_white(),
            format!("({}, {})", file.display_size(), file.uploaded_at).dimmed()
        );
    }
    if snapshot.is_uploading() {
        println!(
            "{}",
            format!("{} upload(s) in progress", snapshot.uploads_in_flight)
                .dimmed()
        );
    }
}

fn print_notice(notice: &Notification) {
    let bar = match notice.severity {
        Severity::Success => BAR_CHAR.bright_green().to_string(),
        Severity::Info => BAR_CHAR.bright_blue().to_string(),
        Severity::Error => BAR_CHAR.bright_red().to_string(),
    };
    // Overwrite the pending prompt.
    println!("\r{bar}{}", notice.message);
}

fn print_usage_error(err: &CommandError) {
    println!("{}", err.to_string().bright_yellow());
}

fn prompt() {
    print!("> ");
    std::io::stdout().flush().ok();
}

//! Console output for the terminal chat

use chatnest_application::ChatObserver;
use chatnest_domain::session::entities::now_millis;
use chatnest_domain::util::preview;
use chatnest_domain::{Message, ModelCatalog, Role, SessionSummary, StreamEvent, Voice};
use colored::Colorize;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

/// Name shown in front of assistant replies.
pub const ASSISTANT_NAME: &str = "小星";

/// Formats conversation state for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    pub fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// One message, labelled by role.
    pub fn message(message: &Message) -> String {
        match message.role {
            Role::User => format!("{} {}", "你:".green().bold(), message.content),
            Role::Assistant => format!(
                "{} {}",
                format!("{ASSISTANT_NAME}:").magenta().bold(),
                message.content
            ),
            Role::System => format!("{} {}", "system:".dimmed(), message.content.dimmed()),
        }
    }

    /// The whole visible conversation.
    pub fn transcript(messages: &[Message]) -> String {
        messages
            .iter()
            .map(Self::message)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Numbered session list, marking the current session.
    pub fn sessions(sessions: &[SessionSummary], current: Option<&str>) -> String {
        if sessions.is_empty() {
            return "  (no sessions)".dimmed().to_string();
        }
        sessions
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let marker = if Some(s.id.as_str()) == current { "*" } else { " " };
                let updated = relative_age(s.updated_at);
                format!(
                    " {} {:>2}. {}  {}",
                    marker.yellow().bold(),
                    i + 1,
                    preview(&s.title, 30),
                    format!("{} {}", s.id, updated).dimmed()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Model catalog, marking the selected model and missing keys.
    pub fn models(
        catalog: &ModelCatalog,
        selected: &str,
        has_key: impl Fn(&str) -> bool,
    ) -> String {
        catalog
            .iter()
            .map(|m| {
                let marker = if m.id == selected { "*" } else { " " };
                let key = if has_key(&m.id) {
                    "key set".green()
                } else {
                    "no key".red()
                };
                format!(
                    " {} {:<16} {}  [{}]",
                    marker.yellow().bold(),
                    m.id,
                    m.endpoint.dimmed(),
                    key
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn voices(voices: &[Voice], selected: &str) -> String {
        if voices.is_empty() {
            return "  (no Chinese voices available)".dimmed().to_string();
        }
        voices
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let marker = if v.name == selected { "*" } else { " " };
                format!(" {} {:>2}. {} {}", marker.yellow().bold(), i + 1, v.name, v.lang.dimmed())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// `updatedAt` as age text relative to now.
fn relative_age(updated_at: i64) -> String {
    relative_age_at(updated_at, now_millis())
}

fn relative_age_at(updated_at: i64, now: i64) -> String {
    let seconds = now.saturating_sub(updated_at).max(0) / 1000;
    match seconds {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{}m ago", seconds / 60),
        3600..=86399 => format!("{}h ago", seconds / 3600),
        _ => format!("{}d ago", seconds / 86400),
    }
}

/// Renders streamed replies to stdout as they arrive.
#[derive(Default)]
pub struct ConsolePresenter {
    /// A reply line has been started and not yet terminated.
    line_open: AtomicBool,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self::default()
    }

    fn open_line(&self) {
        if !self.line_open.swap(true, Ordering::SeqCst) {
            print!("{} ", format!("{ASSISTANT_NAME}:").magenta().bold());
        }
    }
}

impl ChatObserver for ConsolePresenter {
    fn on_stream_event(&self, event: &StreamEvent) {
        match event {
            StreamEvent::Delta(text) => {
                self.open_line();
                print!("{}", text);
                let _ = std::io::stdout().flush();
            }
            StreamEvent::Completed(_) => {
                if self.line_open.swap(false, Ordering::SeqCst) {
                    println!();
                }
                println!();
            }
            StreamEvent::Failed(text) => {
                if self.line_open.swap(false, Ordering::SeqCst) {
                    println!();
                }
                println!("{} {}", format!("{ASSISTANT_NAME}:").magenta().bold(), text.yellow());
                println!();
            }
        }
    }
}

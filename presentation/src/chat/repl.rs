//! REPL (Read-Eval-Print Loop) for the terminal chat client

use crate::output::console::ConsoleFormatter;
use chatnest_application::{ChatController, SpeakOutcome, SpeechPlayer};
use chatnest_domain::Role;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;
use tracing::warn;

/// Which session a `/switch` refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRef {
    /// 1-based position in the `/sessions` list.
    Index(usize),
    Id(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoicesAction {
    List,
    Test,
    /// 1-based position in the voice list.
    Select(usize),
}

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    New,
    Sessions,
    Switch(SessionRef),
    Delete(Option<String>),
    Clear,
    Model(Option<String>),
    Key { model: String, key: String },
    /// Speak the n-th most recent reply (1 = latest).
    Speak(usize),
    Voices(VoicesAction),
    Listen,
    Help,
    Quit,
}

/// Parse a line starting with `/`.
pub fn parse_command(line: &str) -> Result<ReplCommand, String> {
    let mut parts = line.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    let command = match (name, args.as_slice()) {
        ("/new", []) => ReplCommand::New,
        ("/sessions" | "/ls", []) => ReplCommand::Sessions,
        ("/switch", [target]) => ReplCommand::Switch(match target.parse::<usize>() {
            Ok(0) => return Err("Session numbers start at 1".to_string()),
            Ok(index) => SessionRef::Index(index),
            Err(_) => SessionRef::Id(target.to_string()),
        }),
        ("/switch", _) => return Err("Usage: /switch <id|number>".to_string()),
        ("/delete", []) => ReplCommand::Delete(None),
        ("/delete", [id]) => ReplCommand::Delete(Some(id.to_string())),
        ("/clear", []) => ReplCommand::Clear,
        ("/model", []) => ReplCommand::Model(None),
        ("/model", [id]) => ReplCommand::Model(Some(id.to_string())),
        ("/key", [model, key]) => ReplCommand::Key {
            model: model.to_string(),
            key: key.to_string(),
        },
        ("/key", _) => return Err("Usage: /key <model> <api-key>".to_string()),
        ("/speak", []) => ReplCommand::Speak(1),
        ("/speak", [n]) => match n.parse::<usize>() {
            Ok(n) if n > 0 => ReplCommand::Speak(n),
            _ => return Err("Usage: /speak [n] (n >= 1)".to_string()),
        },
        ("/voices", []) => ReplCommand::Voices(VoicesAction::List),
        ("/voices", ["test"]) => ReplCommand::Voices(VoicesAction::Test),
        ("/voices", [n]) => match n.parse::<usize>() {
            Ok(n) if n > 0 => ReplCommand::Voices(VoicesAction::Select(n)),
            _ => return Err("Usage: /voices [test|number]".to_string()),
        },
        ("/listen", []) => ReplCommand::Listen,
        ("/help" | "/h" | "/?", []) => ReplCommand::Help,
        ("/quit" | "/exit" | "/q", []) => ReplCommand::Quit,
        _ => return Err(format!("Unknown command: {}", line.trim())),
    };
    Ok(command)
}

/// Interactive chat REPL
pub struct ChatRepl {
    controller: ChatController,
    speech: SpeechPlayer,
    history_path: Option<PathBuf>,
}

impl ChatRepl {
    pub fn new(controller: ChatController, speech: SpeechPlayer) -> Self {
        Self {
            controller,
            speech,
            history_path: dirs::data_dir().map(|p| p.join("chatnest").join("history.txt")),
        }
    }

    /// Override where readline history is kept (`None` disables it).
    pub fn with_history_path(mut self, path: Option<PathBuf>) -> Self {
        self.history_path = path;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        if let Err(e) = self.controller.load_sessions().await {
            println!(
                "{} {}",
                "Session server unreachable, working offline:".yellow(),
                e
            );
        }
        self.print_welcome().await;

        loop {
            match rl.readline(">>> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(line);

                    if line.starts_with('/') {
                        match parse_command(line) {
                            Ok(command) => {
                                if self.handle_command(command).await {
                                    break;
                                }
                            }
                            Err(message) => {
                                println!("{}", message.yellow());
                                println!("Type /help for available commands");
                            }
                        }
                        continue;
                    }

                    self.send(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("拜拜宝贝!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        self.speech.stop();
        self.controller.shutdown().await;

        if let Some(ref path) = self.history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    async fn print_welcome(&self) {
        println!();
        println!("{}", ConsoleFormatter::header("小星大姐姐 · chatnest"));
        println!();
        println!("Model: {}", self.controller.selected_model().cyan());
        if !self.controller.has_api_key(self.controller.selected_model()) {
            println!(
                "{}",
                "No API key for this model yet, set one with /key <model> <key>".yellow()
            );
        }
        println!("Sessions: {}", self.controller.sessions().await.len());
        if !self.speech.is_available() {
            println!("{}", "Speech output is not available on this system".dimmed());
        }
        println!();
        if !self.controller.messages().is_empty() {
            println!("{}", ConsoleFormatter::transcript(self.controller.messages()));
            println!();
        }
        println!("Type a message to chat, or /help for commands.");
        println!();
    }

    fn print_help(&self) {
        println!("{}", ConsoleFormatter::section_header("Commands"));
        let lines = [
            "/new                 - Start a new chat",
            "/sessions            - List sessions",
            "/switch <id|number>  - Open another session",
            "/delete [id]         - Delete a session (default: current)",
            "/clear               - Delete the current chat",
            "/model [id]          - Show models or select one",
            "/key <model> <key>   - Save the API key for a model",
            "/speak [n]           - Read the n-th latest reply aloud (again to stop)",
            "/voices [test|n]     - List voices, test, or select one",
            "/listen              - Speak a message instead of typing it",
            "/help                - Show this help",
            "/quit                - Exit",
        ];
        println!("{}", ConsoleFormatter::indent(&lines.join("\n"), "  "));
        println!();
    }

    async fn send(&mut self, content: &str) {
        println!();
        self.speech.stop();
        self.controller.send_message(content).await;
    }

    /// Handle a slash command. Returns true if the REPL should exit.
    async fn handle_command(&mut self, command: ReplCommand) -> bool {
        let result: Result<(), String> = match command {
            ReplCommand::Quit => {
                println!("拜拜宝贝!");
                return true;
            }
            ReplCommand::Help => {
                self.print_help();
                Ok(())
            }
            ReplCommand::New => {
                self.speech.stop();
                self.controller
                    .create_new_chat()
                    .await
                    .map(|()| println!("{}", "✨ New chat started".dimmed()))
                    .map_err(|e| e.to_string())
            }
            ReplCommand::Sessions => self.show_sessions().await,
            ReplCommand::Switch(target) => self.switch(target).await,
            ReplCommand::Delete(id) => {
                match id.or_else(|| self.controller.current_session_id().map(str::to_string)) {
                    Some(id) => self
                        .controller
                        .delete_session(&id)
                        .await
                        .map(|()| println!("Deleted {}", id.dimmed()))
                        .map_err(|e| e.to_string()),
                    None => Err("No active session".to_string()),
                }
            }
            ReplCommand::Clear => {
                self.speech.stop();
                self.controller.clear_chat().await.map_err(|e| e.to_string())
            }
            ReplCommand::Model(None) => {
                println!("{}", ConsoleFormatter::section_header("Models"));
                println!(
                    "{}",
                    ConsoleFormatter::models(
                        self.controller.catalog(),
                        self.controller.selected_model(),
                        |id| self.controller.has_api_key(id),
                    )
                );
                println!();
                Ok(())
            }
            ReplCommand::Model(Some(id)) => self
                .controller
                .set_model(&id)
                .map(|()| println!("Now chatting with {}", id.cyan()))
                .map_err(|e| e.to_string()),
            ReplCommand::Key { model, key } => self
                .controller
                .save_api_key(&model, &key)
                .map(|()| println!("Saved API key for {}", model.cyan()))
                .map_err(|e| e.to_string()),
            ReplCommand::Speak(n) => self.speak(n).await,
            ReplCommand::Voices(action) => self.voices(action).await,
            ReplCommand::Listen => self.listen().await,
        };

        if let Err(message) = result {
            warn!("Command failed: {}", message);
            println!("{} {}", "Error:".red().bold(), message);
        }
        false
    }

    async fn show_sessions(&mut self) -> Result<(), String> {
        self.controller
            .refresh_sessions()
            .await
            .map_err(|e| e.to_string())?;
        println!("{}", ConsoleFormatter::section_header("Sessions"));
        println!(
            "{}",
            ConsoleFormatter::sessions(
                &self.controller.sessions().await,
                self.controller.current_session_id(),
            )
        );
        println!();
        Ok(())
    }

    async fn switch(&mut self, target: SessionRef) -> Result<(), String> {
        let id = match target {
            SessionRef::Id(id) => id,
            SessionRef::Index(index) => self
                .controller
                .sessions()
                .await
                .get(index - 1)
                .map(|s| s.id.clone())
                .ok_or_else(|| format!("No session number {index}, see /sessions"))?,
        };
        self.speech.stop();
        self.controller
            .switch_session(&id)
            .await
            .map_err(|e| e.to_string())?;

        println!();
        println!("{}", ConsoleFormatter::transcript(self.controller.messages()));
        println!();
        Ok(())
    }

    async fn speak(&mut self, n: usize) -> Result<(), String> {
        let message = self
            .controller
            .messages()
            .iter()
            .rev()
            .filter(|m| m.role == Role::Assistant && !m.content.is_empty())
            .nth(n - 1)
            .cloned()
            .ok_or_else(|| "No such reply to read".to_string())?;

        match self
            .speech
            .speak(&message.content, &message.id)
            .await
            .map_err(|e| e.to_string())?
        {
            SpeakOutcome::Started { sentences } => {
                println!("{}", format!("🔊 Reading {sentences} sentences...").dimmed())
            }
            SpeakOutcome::Stopped => println!("{}", "🔇 Stopped".dimmed()),
            SpeakOutcome::Empty => println!("{}", "Nothing to read".dimmed()),
        }
        Ok(())
    }

    async fn voices(&mut self, action: VoicesAction) -> Result<(), String> {
        match action {
            VoicesAction::List => {
                let voices = self.speech.load_voices().await.map_err(|e| e.to_string())?.to_vec();
                println!("{}", ConsoleFormatter::section_header("Voices"));
                println!(
                    "{}",
                    ConsoleFormatter::voices(&voices, &self.speech.settings().selected_voice)
                );
                println!();
            }
            VoicesAction::Test => {
                self.speech.test_voice().await.map_err(|e| e.to_string())?;
            }
            VoicesAction::Select(n) => {
                let voice = self
                    .speech
                    .load_voices()
                    .await
                    .map_err(|e| e.to_string())?
                    .get(n - 1)
                    .cloned()
                    .ok_or_else(|| format!("No voice number {n}, see /voices"))?;
                println!("Voice set to {}", voice.name.cyan());
                self.speech.settings_mut().selected_voice = voice.name;
            }
        }
        Ok(())
    }

    async fn listen(&mut self) -> Result<(), String> {
        println!("{}", "🎤 Listening...".dimmed());
        let transcript = self.speech.listen().await.map_err(|e| e.to_string())?;
        let transcript = transcript.trim().to_string();
        if transcript.is_empty() {
            return Err("Did not catch that".to_string());
        }
        println!("{} {}", "你:".green().bold(), transcript);
        self.send(&transcript).await;
        Ok(())
    }
}

//! JSON file mirror.
//!
//! Two files inside one directory:
//!
//! - `chat_history.json`: the last message sequence the client showed
//! - `api_keys.json`: per-model API keys
//!
//! Unreadable files are treated as empty; they are overwritten by the next
//! save.

use chatnest_application::ports::local_mirror::{LocalMirror, MirrorError};
use chatnest_domain::Message;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

const HISTORY_FILE: &str = "chat_history.json";
const API_KEYS_FILE: &str = "api_keys.json";

pub struct JsonFileMirror {
    directory: PathBuf,
}

impl JsonFileMirror {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.directory.join(name);
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_slice(&data) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring corrupt {}: {}", path.display(), e);
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), MirrorError> {
        std::fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(name);
        std::fs::write(&path, serde_json::to_vec_pretty(value)?)?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}

impl LocalMirror for JsonFileMirror {
    fn load_history(&self) -> Option<Vec<Message>> {
        self.read::<Vec<Message>>(HISTORY_FILE)
            .filter(|messages| !messages.is_empty())
    }

    fn save_history(&self, messages: &[Message]) -> Result<(), MirrorError> {
        self.write(HISTORY_FILE, messages)
    }

    fn load_api_keys(&self) -> HashMap<String, String> {
        self.read(API_KEYS_FILE).unwrap_or_default()
    }

    fn save_api_keys(&self, keys: &HashMap<String, String>) -> Result<(), MirrorError> {
        self.write(API_KEYS_FILE, keys)
    }
}

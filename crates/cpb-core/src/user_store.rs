//! Flat-file registry of chats that ran `/start`.
//!
//! Two on-disk layouts are supported, picked by file extension:
//! - `*.json`: a JSON array of numeric ids, rewritten atomically on insert
//! - anything else: one id per line, appended on insert
//!
//! A missing file is an empty store. Records are never mutated or deleted.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::{debug, warn};

use crate::{domain::ChatId, errors::Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreFormat {
    Lines,
    Json,
}

impl StoreFormat {
    pub fn for_path(path: &Path) -> Self {
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            Self::Json
        } else {
            Self::Lines
        }
    }
}

#[derive(Debug)]
pub struct UserStore {
    path: PathBuf,
    format: StoreFormat,
    // Read-check-write in `save_user` must not interleave across chats.
    write_lock: Mutex<()>,
}

impl UserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = StoreFormat::for_path(&path);
        Self {
            path,
            format,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored ids in storage order (first registration first).
    pub async fn get_users(&self) -> Result<Vec<ChatId>> {
        let Some(contents) = self.read_raw().await? else {
            return Ok(Vec::new());
        };
        self.parse(&contents)
    }

    /// Idempotent insert. Returns `true` when a new record was written.
    pub async fn save_user(&self, id: ChatId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let existing = self.read_raw().await?;
        let mut users = match existing.as_deref() {
            Some(contents) => self.parse(contents)?,
            None => Vec::new(),
        };
        if users.contains(&id) {
            debug!(chat_id = id.0, "user already registered");
            return Ok(false);
        }

        self.ensure_parent_dir().await?;

        match self.format {
            StoreFormat::Lines => {
                let mut line = String::new();
                if existing
                    .as_deref()
                    .is_some_and(|c| !c.is_empty() && !c.ends_with('\n'))
                {
                    line.push('\n');
                }
                line.push_str(&format!("{}\n", id.0));

                let mut file = fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)
                    .await?;
                file.write_all(line.as_bytes()).await?;
                file.flush().await?;
            }
            StoreFormat::Json => {
                users.push(id);
                let ids: Vec<i64> = users.iter().map(|c| c.0).collect();
                let body = serde_json::to_vec(&ids)?;

                let tmp = self.path.with_extension("json.tmp");
                fs::write(&tmp, body).await?;
                fs::rename(&tmp, &self.path).await?;
            }
        }

        debug!(chat_id = id.0, path = %self.path.display(), "user registered");
        Ok(true)
    }

    async fn read_raw(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    fn parse(&self, contents: &str) -> Result<Vec<ChatId>> {
        let raw: Vec<i64> = match self.format {
            StoreFormat::Lines => contents
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .filter_map(|l| match l.parse::<i64>() {
                    Ok(id) => Some(id),
                    Err(_) => {
                        warn!(line = l, path = %self.path.display(), "skipping malformed user id");
                        None
                    }
                })
                .collect(),
            StoreFormat::Json => {
                if contents.trim().is_empty() {
                    Vec::new()
                } else {
                    serde_json::from_str(contents)?
                }
            }
        };

        // First occurrence wins so storage order is kept.
        let mut seen: HashSet<i64> = HashSet::with_capacity(raw.len());
        Ok(raw
            .into_iter()
            .filter(|id| seen.insert(*id))
            .map(ChatId)
            .collect())
    }
}

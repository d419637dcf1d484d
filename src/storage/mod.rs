//! # Storage Module - Data Persistence Layer
//!
//! This module provides data persistence for the Goosebbs system: user
//! accounts, the message board, and the seeded bulletin list.
//!
//! ## Architecture
//!
//! The storage system keeps each collection in a single JSON snapshot file:
//!
//! ```text
//! data/
//! ├── users.json      ← username -> account record map
//! ├── messages.json   ← ordered list of board posts (oldest first)
//! └── bulletins.json  ← ordered list of announcements (seeded once)
//! ```
//!
//! Every mutation loads the whole collection, changes it in memory, and
//! rewrites the file. That keeps the on-disk format trivially inspectable
//! and recoverable with a text editor, at the cost of rewriting the file on
//! each post. A per-store async mutex serializes each load-modify-save
//! cycle so two sessions posting at once cannot drop each other's message,
//! and the file itself is replaced atomically (exclusive lock, temp file,
//! rename) so a crash mid-write never leaves a half-written snapshot.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use goosebbs::storage::Storage;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Initialize storage, creating and seeding files on first run
//!     let storage = Storage::new("./data").await?;
//!
//!     storage.create_user("alice", "hunter2").await?;
//!     storage.post_message("hello", "first post!", "alice").await?;
//!     let messages = storage.list_messages().await?;
//!     assert_eq!(messages.len(), 1);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Known Weakness
//!
//! Account passwords are stored in clear text. This reproduces the storage
//! shape of the classic hobby BBSes this project imitates and is documented
//! here so nobody mistakes it for an oversight: do not point this at real
//! credentials.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;

/// Errors that can arise while interacting with the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Returned by [`Storage::create_user`] when the exact username already exists.
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    /// Returned by [`Storage::verify_user`] unless both fields match exactly.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Returned when a 1-based position falls outside the current listing.
    #[error("position {0} is out of range")]
    OutOfRange(usize),

    /// Wrapper around IO errors (snapshot reads/writes, directory creation).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapper around JSON serialization and deserialization errors.
    #[error("malformed store file: {0}")]
    Json(#[from] serde_json::Error),
}

/// A registered account. Keyed by username in `users.json`; the username
/// itself is the map key and is matched case-sensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub password: String,
    pub created: DateTime<Utc>,
}

/// A single board post. Positions shown to clients are 1-based indices into
/// the current listing and are recomputed on every list, so they are not
/// stable identifiers across concurrent posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub subject: String,
    pub body: String,
    pub author: String,
    pub created: DateTime<Utc>,
}

/// A server announcement. Seeded at first startup; read-only over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bulletin {
    pub title: String,
    pub body: String,
}

/// Main storage interface.
///
/// One async mutex per collection guards the whole load-modify-save cycle.
/// Read paths take the same lock; the critical sections are short (one file
/// read or one file replace) and never held across a client await.
pub struct Storage {
    data_dir: PathBuf,
    users_lock: Mutex<()>,
    messages_lock: Mutex<()>,
    bulletins_lock: Mutex<()>,
}

const USERS_FILE: &str = "users.json";
const MESSAGES_FILE: &str = "messages.json";
const BULLETINS_FILE: &str = "bulletins.json";

/// Placeholder subject stored when a post is submitted with an empty one.
pub const NO_SUBJECT: &str = "(no subject)";

fn default_bulletins(bbs_name: &str) -> Vec<Bulletin> {
    vec![
        Bulletin {
            title: format!("Welcome to {}", bbs_name),
            body: "This is a tiny local BBS. Have fun!".to_string(),
        },
        Bulletin {
            title: "Tips".to_string(),
            body: "Use netcat: nc localhost 2323".to_string(),
        },
    ]
}

impl Storage {
    /// Initialize storage with the given data directory, creating the
    /// directory and any missing snapshot files. Bulletins are seeded with
    /// the default announcements only when `bulletins.json` does not exist
    /// yet; existing files are never touched.
    pub async fn new(data_dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::with_seed(data_dir, "Goose Retro BBS").await
    }

    /// Like [`Storage::new`] but names the BBS in the seeded welcome bulletin.
    pub async fn with_seed(
        data_dir: impl AsRef<Path>,
        bbs_name: &str,
    ) -> Result<Self, StorageError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir).await?;

        let storage = Storage {
            data_dir,
            users_lock: Mutex::new(()),
            messages_lock: Mutex::new(()),
            bulletins_lock: Mutex::new(()),
        };

        storage
            .seed_file(USERS_FILE, &HashMap::<String, UserRecord>::new())
            .await?;
        storage.seed_file(MESSAGES_FILE, &Vec::<Message>::new()).await?;
        storage
            .seed_file(BULLETINS_FILE, &default_bulletins(bbs_name))
            .await?;

        Ok(storage)
    }

    /// Return the base data directory path used by this storage instance.
    pub fn base_dir(&self) -> &Path {
        &self.data_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Write the initial snapshot for `name` unless the file already exists.
    async fn seed_file<T: Serialize>(&self, name: &str, initial: &T) -> Result<(), StorageError> {
        let path = self.file_path(name);
        if fs::try_exists(&path).await? {
            return Ok(());
        }
        debug!("seeding {}", path.display());
        let content = serde_json::to_string_pretty(initial)?;
        write_snapshot(&path, &content)
    }

    async fn load<T: for<'de> Deserialize<'de>>(&self, name: &str) -> Result<T, StorageError> {
        let content = fs::read_to_string(self.file_path(name)).await?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(value)?;
        write_snapshot(&self.file_path(name), &content)
    }

    // ---- accounts ----

    /// Check whether `username` already has an account (exact match).
    pub async fn username_taken(&self, username: &str) -> Result<bool, StorageError> {
        let _guard = self.users_lock.lock().await;
        let users: HashMap<String, UserRecord> = self.load(USERS_FILE).await?;
        Ok(users.contains_key(username))
    }

    /// Register a new account. Fails with [`StorageError::UsernameTaken`]
    /// when the exact username already exists; the check and the insert
    /// happen under one lock so two racing signups cannot both win.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserRecord, StorageError> {
        let _guard = self.users_lock.lock().await;
        let mut users: HashMap<String, UserRecord> = self.load(USERS_FILE).await?;
        if users.contains_key(username) {
            return Err(StorageError::UsernameTaken(username.to_string()));
        }
        let record = UserRecord {
            password: password.to_string(),
            created: Utc::now(),
        };
        users.insert(username.to_string(), record.clone());
        self.save(USERS_FILE, &users)?;
        Ok(record)
    }

    /// Verify a username/password pair. Succeeds only on an exact,
    /// case-sensitive match of both fields.
    pub async fn verify_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserRecord, StorageError> {
        let _guard = self.users_lock.lock().await;
        let users: HashMap<String, UserRecord> = self.load(USERS_FILE).await?;
        match users.get(username) {
            Some(record) if record.password == password => Ok(record.clone()),
            _ => Err(StorageError::InvalidCredentials),
        }
    }

    /// Number of registered accounts.
    pub async fn user_count(&self) -> Result<usize, StorageError> {
        let _guard = self.users_lock.lock().await;
        let users: HashMap<String, UserRecord> = self.load(USERS_FILE).await?;
        Ok(users.len())
    }

    // ---- message board ----

    /// All board posts in insertion order, oldest first.
    pub async fn list_messages(&self) -> Result<Vec<Message>, StorageError> {
        let _guard = self.messages_lock.lock().await;
        self.load(MESSAGES_FILE).await
    }

    /// Append a post. An empty subject is stored as [`NO_SUBJECT`]; the body
    /// is stored verbatim, newlines included.
    pub async fn post_message(
        &self,
        subject: &str,
        body: &str,
        author: &str,
    ) -> Result<Message, StorageError> {
        let _guard = self.messages_lock.lock().await;
        let mut messages: Vec<Message> = self.load(MESSAGES_FILE).await?;
        let message = Message {
            subject: if subject.is_empty() {
                NO_SUBJECT.to_string()
            } else {
                subject.to_string()
            },
            body: body.to_string(),
            author: author.to_string(),
            created: Utc::now(),
        };
        messages.push(message.clone());
        self.save(MESSAGES_FILE, &messages)?;
        Ok(message)
    }

    /// Fetch the post at a 1-based position in the current listing.
    pub async fn read_message(&self, position: usize) -> Result<Message, StorageError> {
        let _guard = self.messages_lock.lock().await;
        let messages: Vec<Message> = self.load(MESSAGES_FILE).await?;
        pick(&messages, position).cloned()
    }

    // ---- bulletins ----

    /// All bulletins in authoring order.
    pub async fn list_bulletins(&self) -> Result<Vec<Bulletin>, StorageError> {
        let _guard = self.bulletins_lock.lock().await;
        self.load(BULLETINS_FILE).await
    }

    /// Fetch the bulletin at a 1-based position.
    pub async fn read_bulletin(&self, position: usize) -> Result<Bulletin, StorageError> {
        let _guard = self.bulletins_lock.lock().await;
        let bulletins: Vec<Bulletin> = self.load(BULLETINS_FILE).await?;
        pick(&bulletins, position).cloned()
    }
}

/// Index a slice by 1-based display position.
fn pick<T>(items: &[T], position: usize) -> Result<&T, StorageError> {
    if position == 0 || position > items.len() {
        return Err(StorageError::OutOfRange(position));
    }
    Ok(&items[position - 1])
}

/// Replace `path` with `content` atomically: take an exclusive lock on the
/// destination, write a temp file in the same directory, fsync it, then
/// rename it over the destination. Synchronous std IO because fs2 locks do
/// not compose with async file handles; callers hold the store mutex so the
/// blocking window stays short.
fn write_snapshot(path: &Path, content: &str) -> Result<(), StorageError> {
    use std::fs::{File, OpenOptions};
    use std::io::Write;

    let lock_file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(path)?;
    lock_file.lock_exclusive()?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let base = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("snapshot.json");
    let tmp_path = dir.join(format!(".{}.tmp-{}", base, std::process::id()));

    let result = (|| -> Result<(), StorageError> {
        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        let _ = tmp.sync_all();
        std::fs::rename(&tmp_path, path)?;
        if let Ok(dir_file) = File::open(dir) {
            let _ = dir_file.sync_all();
        }
        Ok(())
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    drop(lock_file);
    result
}

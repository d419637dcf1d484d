use std::io;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};

use crate::bbs::presence::Presence;
use crate::bbs::render;
use crate::logutil::escape_log;
use crate::storage::{Storage, StorageError};

/// How many username/password attempts a signin gets before the connection
/// is closed. No lockout is persisted; reconnecting starts a fresh count.
const MAX_SIGNIN_ATTEMPTS: usize = 3;

/// One generic line for every store failure; details stay in the server log.
const STORE_FAILURE_LINE: &str = "The board is unavailable right now. Try again later.\n";

/// # User Session Management
///
/// Represents one client connection from accept to close. Each session owns
/// its half of the socket, tracks the authenticated username, and walks the
/// client through the menu state machine.
///
/// ## Session Lifecycle
///
/// 1. **Connected** - connection accepted, banner not yet sent
/// 2. **Authenticating** - signup or signin in progress
/// 3. **MainMenu** - authenticated, at the four-option menu
/// 4. **MessageBoard** / **Bulletins** / **WhosOnline** - feature substates,
///    each returning to the main menu
/// 5. **Terminated** - logged off, failed signin, or disconnected
///
/// The session is generic over the byte stream so tests can drive the full
/// state machine over an in-memory duplex pipe instead of a TCP socket.
///
/// ## Cleanup
///
/// Presence registration is released by [`Session::run`] on every exit path,
/// normal or not. The username is `take`n on first cleanup, so the explicit
/// logoff path and the disconnect unwind path can both call it without the
/// roster ever being decremented twice.
pub struct Session<S> {
    reader: BufReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
    peer: String,
    bbs_name: String,
    pub state: SessionState,
    username: Option<String>,
    storage: Arc<Storage>,
    presence: Arc<Presence>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Authenticating,
    MainMenu,
    MessageBoard,
    Bulletins,
    WhosOnline,
    Terminated,
}

impl<S: AsyncRead + AsyncWrite> Session<S> {
    /// Create a session for an accepted connection.
    pub fn new(
        stream: S,
        peer: String,
        bbs_name: String,
        storage: Arc<Storage>,
        presence: Arc<Presence>,
    ) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        Session {
            reader: BufReader::new(read_half),
            writer: write_half,
            peer,
            bbs_name,
            state: SessionState::Connected,
            username: None,
            storage,
            presence,
        }
    }

    /// Drive the session to completion and release its presence entry.
    ///
    /// A dropped connection surfaces as an IO error from whichever read or
    /// write was in flight; that is the normal way for clients to leave, so
    /// it is logged at debug and swallowed here rather than bubbled up to
    /// the listener.
    pub async fn run(mut self) {
        debug!("session {}: connected", self.peer);
        let outcome = self.drive().await;
        self.clear_presence();
        match outcome {
            Ok(()) => debug!("session {}: finished", self.peer),
            Err(e) => debug!("session {}: connection lost: {}", self.peer, e),
        }
    }

    async fn drive(&mut self) -> io::Result<()> {
        self.state = SessionState::Authenticating;
        let banner = render::banner(&self.bbs_name);
        self.send(&banner).await?;
        let have = self.getline("Do you have an account? (y/n): ").await?;
        if have.trim().to_lowercase().starts_with('n') {
            self.signup().await?;
        } else {
            self.signin().await?;
        }
        if self.username.is_some() {
            self.menu_loop().await?;
        }
        Ok(())
    }

    // ---- authentication ----

    async fn signup(&mut self) -> io::Result<()> {
        let header = render::signup_header();
        self.send(&header).await?;
        loop {
            let username = self.getline("Choose username: ").await?;
            let username = username.trim().to_string();
            if username.is_empty() {
                continue;
            }
            match self.storage.username_taken(&username).await {
                Ok(true) => {
                    self.send("Username taken. Try again.\n").await?;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!("session {}: signup availability check failed: {}", self.peer, e);
                    self.send(STORE_FAILURE_LINE).await?;
                    continue;
                }
            }
            let password = self.getline("Choose password: ").await?;
            match self.storage.create_user(&username, password.trim()).await {
                Ok(_) => {
                    info!(
                        "session {}: new account '{}' registered",
                        self.peer,
                        escape_log(&username)
                    );
                    self.authenticated(username.clone());
                    let greeting = format!("\nWelcome, {}!\n", username);
                    return self.send(&greeting).await;
                }
                // Raced by another signup between the check and the insert.
                Err(StorageError::UsernameTaken(_)) => {
                    self.send("Username taken. Try again.\n").await?;
                }
                Err(e) => {
                    warn!("session {}: account creation failed: {}", self.peer, e);
                    self.send(STORE_FAILURE_LINE).await?;
                }
            }
        }
    }

    async fn signin(&mut self) -> io::Result<()> {
        let header = render::signin_header();
        self.send(&header).await?;
        for _ in 0..MAX_SIGNIN_ATTEMPTS {
            let username = self.getline("Username: ").await?;
            let password = self.getline("Password: ").await?;
            match self
                .storage
                .verify_user(username.trim(), password.trim())
                .await
            {
                Ok(_) => {
                    let username = username.trim().to_string();
                    info!(
                        "session {}: '{}' signed in",
                        self.peer,
                        escape_log(&username)
                    );
                    self.authenticated(username.clone());
                    let greeting = format!("\nWelcome back, {}!\n", username);
                    return self.send(&greeting).await;
                }
                Err(StorageError::InvalidCredentials) => {
                    self.send("Invalid credentials.\n").await?;
                }
                Err(e) => {
                    warn!("session {}: credential check failed: {}", self.peer, e);
                    self.send(STORE_FAILURE_LINE).await?;
                }
            }
        }
        info!("session {}: signin failed {} times, closing", self.peer, MAX_SIGNIN_ATTEMPTS);
        self.send("Too many attempts. Bye.\n").await?;
        self.state = SessionState::Terminated;
        Ok(())
    }

    fn authenticated(&mut self, username: String) {
        self.presence.add(&username);
        self.username = Some(username);
        self.state = SessionState::MainMenu;
    }

    // ---- menus ----

    async fn menu_loop(&mut self) -> io::Result<()> {
        while self.state != SessionState::Terminated {
            self.state = SessionState::MainMenu;
            let choice = self.getline(render::MAIN_MENU).await?;
            match choice.trim().to_lowercase().as_str() {
                "1" => self.message_board().await?,
                "2" => self.bulletins().await?,
                "3" => self.whos_online().await?,
                "4" => self.logoff().await?,
                other => {
                    debug!(
                        "session {}: unknown menu selection: {}",
                        self.peer,
                        escape_log(other)
                    );
                    self.send("Unknown selection.\n").await?;
                }
            }
        }
        Ok(())
    }

    async fn message_board(&mut self) -> io::Result<()> {
        self.state = SessionState::MessageBoard;
        loop {
            let choice = self.getline(render::BOARD_MENU).await?;
            match choice.trim().to_lowercase().as_str() {
                "l" => self.board_list().await?,
                "r" => self.board_read().await?,
                "p" => self.board_post().await?,
                "b" => return Ok(()),
                _ => self.send("Unknown option.\n").await?,
            }
        }
    }

    async fn board_list(&mut self) -> io::Result<()> {
        match self.storage.list_messages().await {
            Ok(messages) if messages.is_empty() => self.send("No messages yet.\n").await,
            Ok(messages) => {
                let rows = render::message_rows(&messages);
                self.send(&rows).await
            }
            Err(e) => self.report_store_failure("list messages", e).await,
        }
    }

    async fn board_read(&mut self) -> io::Result<()> {
        let raw = self.getline("Read which #: ").await?;
        // One generic line for both bad numbers and numbers off the end;
        // the client is not told which it was.
        match raw.trim().parse::<usize>() {
            Ok(position) => match self.storage.read_message(position).await {
                Ok(message) => {
                    let view = render::message_view(&message);
                    self.send(&view).await
                }
                Err(StorageError::OutOfRange(_)) => self.send("Invalid message number.\n").await,
                Err(e) => self.report_store_failure("read message", e).await,
            },
            Err(_) => self.send("Invalid message number.\n").await,
        }
    }

    async fn board_post(&mut self) -> io::Result<()> {
        let subject = self.getline("Subject: ").await?;
        self.send("Enter message. End with a single '.' on its own line.\n")
            .await?;
        let mut lines: Vec<String> = Vec::new();
        loop {
            let line = self.read_line().await?;
            let line = line.trim();
            if line == "." {
                break;
            }
            lines.push(line.to_string());
        }
        let body = lines.join("\n");
        let author = self.display_name();
        match self
            .storage
            .post_message(subject.trim(), &body, &author)
            .await
        {
            Ok(message) => {
                info!(
                    "session {}: '{}' posted '{}'",
                    self.peer,
                    escape_log(&author),
                    escape_log(&message.subject)
                );
                self.send("Posted.\n").await
            }
            Err(e) => self.report_store_failure("post message", e).await,
        }
    }

    async fn bulletins(&mut self) -> io::Result<()> {
        self.state = SessionState::Bulletins;
        let bulletins = match self.storage.list_bulletins().await {
            Ok(bulletins) => bulletins,
            Err(e) => return self.report_store_failure("list bulletins", e).await,
        };
        let index = render::bulletin_index(&bulletins);
        let selection = self.getline(&index).await?;
        let selection = selection.trim().to_lowercase();
        if selection == "b" || selection == "back" {
            return Ok(());
        }
        // No retry loop here: any invalid selection falls back to the menu.
        match selection.parse::<usize>() {
            Ok(position) => match self.storage.read_bulletin(position).await {
                Ok(bulletin) => {
                    let view = render::bulletin_view(&bulletin);
                    self.send(&view).await
                }
                Err(StorageError::OutOfRange(_)) => self.send("Invalid selection.\n").await,
                Err(e) => self.report_store_failure("read bulletin", e).await,
            },
            Err(_) => self.send("Invalid selection.\n").await,
        }
    }

    async fn whos_online(&mut self) -> io::Result<()> {
        self.state = SessionState::WhosOnline;
        let line = render::online_line(&self.presence.list());
        self.send(&line).await
    }

    async fn logoff(&mut self) -> io::Result<()> {
        self.send("Goodbye!\n").await?;
        self.clear_presence();
        self.state = SessionState::Terminated;
        Ok(())
    }

    // ---- plumbing ----

    /// Get the username, or "guest" if not logged in.
    fn display_name(&self) -> String {
        self.username.clone().unwrap_or_else(|| "guest".to_string())
    }

    /// Release this session's presence entry. Safe to call more than once:
    /// the username is taken on the first call, so later calls are no-ops.
    fn clear_presence(&mut self) {
        if let Some(name) = self.username.take() {
            self.presence.remove(&name);
            debug!(
                "session {}: '{}' now offline",
                self.peer,
                escape_log(&name)
            );
        }
    }

    async fn report_store_failure(&mut self, action: &str, err: StorageError) -> io::Result<()> {
        warn!("session {}: failed to {}: {}", self.peer, action, err);
        self.send(STORE_FAILURE_LINE).await
    }

    async fn send(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.flush().await
    }

    async fn getline(&mut self, prompt: &str) -> io::Result<String> {
        self.send(prompt).await?;
        self.read_line().await
    }

    /// Read one newline-terminated line, without the terminator. Invalid
    /// UTF-8 is replaced rather than rejected; telnet clients send all
    /// sorts of bytes. EOF is reported as an error so callers unwind.
    async fn read_line(&mut self) -> io::Result<String> {
        let mut buf = Vec::new();
        let n = self.reader.read_until(b'\n', &mut buf).await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "peer closed the connection",
            ));
        }
        while buf.last() == Some(&b'\n') || buf.last() == Some(&b'\r') {
            buf.pop();
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

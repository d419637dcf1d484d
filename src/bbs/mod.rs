//! # BBS Core Module
//!
//! This module implements the interactive heart of Goosebbs: the TCP
//! listener, the per-connection session state machine, the shared presence
//! roster, and the text rendering that turns store data into terminal
//! output.
//!
//! ## Components
//!
//! - [`server`] - Listener and server lifecycle management
//! - [`session`] - Per-connection session handling and state management
//! - [`presence`] - Shared who's-online registry
//! - [`render`] - Menus, banners, listings, and word wrapping
//!
//! ## Session Lifecycle
//!
//! 1. Listener accepts a TCP connection and spawns a session task
//! 2. Session sends the banner and runs signup or signin
//! 3. On success the username joins the presence roster
//! 4. The main menu loop serves the board, bulletins, and roster
//! 5. Logoff or disconnect releases the presence entry exactly once

pub mod presence;
pub mod render;
pub mod server;
pub mod session;

pub use presence::Presence;
pub use server::BbsServer;
pub use session::{Session, SessionState};

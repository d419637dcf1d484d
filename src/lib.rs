//! # Goosebbs - A Retro Terminal Bulletin Board System
//!
//! Goosebbs is a small multi-user BBS reachable over a raw, line-oriented TCP
//! connection. Any plain terminal client works: `nc localhost 2323` or
//! `telnet localhost 2323` drops you at the login banner.
//!
//! ## Features
//!
//! - **Accounts**: Signup and signin with per-user records and a three-strike login.
//! - **Message Board**: List, read, and post messages with word-wrapped bodies.
//! - **Bulletins**: Server-seeded announcements, numbered for quick reading.
//! - **Who's Online**: Live presence roster shared across every connection.
//! - **Async Design**: Built with Tokio, one lightweight task per connection.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use goosebbs::config::Config;
//! use goosebbs::bbs::BbsServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load configuration
//!     let config = Config::load("config.toml").await?;
//!
//!     // Create and start the BBS server
//!     let mut server = BbsServer::new(config).await?;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`bbs`] - Core BBS functionality: listener, sessions, presence, rendering
//! - [`storage`] - Account, message, and bulletin persistence layer
//! - [`config`] - Configuration management
//! - [`logutil`] - Helpers for keeping user input safe in log output
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   BBS Server    │ ← TCP listener, one task per connection
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   Session       │ ← Per-connection state machine
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   Storage       │ ← Snapshot-file persistence
//! └─────────────────┘
//! ```
//!
//! ## Known Weakness
//!
//! Passwords are stored in clear text, faithful to the classic hobby-BBS
//! storage shape this project recreates. Do not reuse real passwords here.

pub mod bbs;
pub mod config;
pub mod logutil;
pub mod storage;

//! TCP listener and server lifecycle.
//!
//! [`BbsServer`] owns the configuration and the two shared collaborators
//! (storage and the presence registry) and hands an `Arc` of each to every
//! spawned session. The accept loop never blocks on a session: each
//! connection runs in its own Tokio task, and a task that panics or whose
//! peer vanishes takes down nothing but itself.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use tokio::net::TcpListener;

use crate::bbs::presence::Presence;
use crate::bbs::session::Session;
use crate::config::Config;
use crate::storage::Storage;

/// Main BBS server: binds the configured endpoint and serves until ctrl-c.
pub struct BbsServer {
    config: Config,
    storage: Arc<Storage>,
    presence: Arc<Presence>,
}

impl BbsServer {
    /// Create a server, initializing (and on first run seeding) storage.
    pub async fn new(config: Config) -> Result<Self> {
        let storage = Storage::with_seed(&config.storage.data_dir, &config.bbs.name)
            .await
            .with_context(|| {
                format!("failed to initialize data directory {}", config.storage.data_dir)
            })?;
        Ok(BbsServer {
            config,
            storage: Arc::new(storage),
            presence: Arc::new(Presence::new()),
        })
    }

    /// The `host:port` endpoint this server binds.
    pub fn endpoint(&self) -> String {
        format!(
            "{}:{}",
            self.config.server.bind_address, self.config.server.port
        )
    }

    /// Accept connections until the process receives an interrupt signal.
    ///
    /// In-flight sessions are simply dropped on shutdown; the stores are
    /// consistent at every point between snapshot writes, so there is no
    /// per-session teardown to wait for.
    pub async fn run(&mut self) -> Result<()> {
        let endpoint = self.endpoint();
        let listener = TcpListener::bind(&endpoint)
            .await
            .with_context(|| format!("failed to bind {}", endpoint))?;
        info!(
            "BBS '{}' listening on {} (sysop: {})",
            self.config.bbs.name, endpoint, self.config.bbs.sysop
        );

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            info!("accepted connection from {}", peer);
                            let session = Session::new(
                                stream,
                                peer.to_string(),
                                self.config.bbs.name.clone(),
                                Arc::clone(&self.storage),
                                Arc::clone(&self.presence),
                            );
                            let presence = Arc::clone(&self.presence);
                            tokio::spawn(async move {
                                session.run().await;
                                debug!("connection {} closed ({} online)", peer, presence.count());
                            });
                        }
                        Err(e) => {
                            // Transient accept failures (EMFILE and friends)
                            // should not kill the listener.
                            warn!("accept failed: {}", e);
                            tokio::time::sleep(Duration::from_millis(100)).await;
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("received shutdown signal, stopping listener");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Print a short status summary without starting the listener.
    pub async fn show_status(&self) -> Result<()> {
        let users = self.storage.user_count().await?;
        let messages = self.storage.list_messages().await?.len();
        let bulletins = self.storage.list_bulletins().await?.len();
        println!("{} ({})", self.config.bbs.name, self.config.bbs.location);
        println!("  endpoint:  {}", self.endpoint());
        println!("  data dir:  {}", self.storage.base_dir().display());
        println!("  users:     {}", users);
        println!("  messages:  {}", messages);
        println!("  bulletins: {}", bulletins);
        Ok(())
    }
}

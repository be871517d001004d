//! `MindmeldServer` builder and server loop.
//!
//! This is the entry point for running a Mindmeld lobby server. It ties
//! together all the layers: transport → protocol → service → lobby.

use std::sync::Arc;
use std::time::Duration;

use mindmeld_lobby::{
    Categories, Clock, LobbyConfig, LobbyRegistry, SystemClock,
};
use mindmeld_protocol::{Codec, JsonCodec};

use crate::handler::handle_connection;
use crate::ws::WsListener;
use crate::{LobbyService, MindmeldError, ServerConfig};

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// service holds the only lock.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) service: LobbyService,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Mindmeld server.
///
/// # Example
///
/// ```rust,no_run
/// use mindmeld::prelude::*;
///
/// # async fn run() -> Result<(), MindmeldError> {
/// let server = MindmeldServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct MindmeldServerBuilder {
    config: ServerConfig,
    clock: Arc<dyn Clock>,
    categories: Categories,
}

impl MindmeldServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            clock: Arc::new(SystemClock),
            categories: Categories::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets how long a silent connection stays open.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Sets player limits, retention and default settings.
    pub fn lobby_config(mut self, config: LobbyConfig) -> Self {
        self.config.lobby = config;
        self
    }

    /// Sets the time source. Tests pass a `ManualClock`.
    pub fn clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Sets where round categories come from.
    pub fn categories(mut self, categories: Categories) -> Self {
        self.categories = categories;
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// Uses `JsonCodec`, which is what browser clients speak.
    pub async fn build(self) -> Result<MindmeldServer<JsonCodec>, MindmeldError> {
        let listener = WsListener::bind(&self.config.bind_addr).await?;

        let registry = LobbyRegistry::new(self.config.lobby)
            .with_clock(self.clock)
            .with_categories(self.categories);

        let state = Arc::new(ServerState {
            service: LobbyService::new(registry),
            codec: JsonCodec,
            idle_timeout: self.config.idle_timeout,
        });

        Ok(MindmeldServer { listener, state })
    }
}

impl Default for MindmeldServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Mindmeld server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct MindmeldServer<C: Codec> {
    listener: WsListener,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> MindmeldServer<C> {
    /// Creates a new builder.
    pub fn builder() -> MindmeldServerBuilder {
        MindmeldServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// Runs until the process is terminated.
    pub async fn run(self) -> Result<(), MindmeldError> {
        tracing::info!("Mindmeld server running");

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, peer, state).await {
                            tracing::debug!(%peer, error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

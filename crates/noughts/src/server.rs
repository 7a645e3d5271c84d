//! `NoughtsServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → session registry.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use noughts_protocol::{Codec, JsonCodec};
use noughts_session::{RegistryConfig, SessionRegistry};
use noughts_transport::{Transport, WebSocketTransport};

use crate::NoughtsError;
use crate::handler::handle_connection;

/// Default address, matching the port the service has always used.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Connections that send nothing for this long are closed.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(15);

/// Shared server state handed to each connection task.
///
/// The registry is built once in [`NoughtsServerBuilder::build`] and
/// reaches handlers only through this struct.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) registry: Arc<SessionRegistry>,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a noughts server.
///
/// # Example
///
/// ```rust,no_run
/// # async fn run() -> Result<(), noughts::NoughtsError> {
/// use noughts::prelude::*;
///
/// let server = NoughtsServerBuilder::new()
///     .bind("127.0.0.1:8080")
///     .registry_config(RegistryConfig {
///         id_strategy: IdStrategy::Random,
///         ..RegistryConfig::default()
///     })
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct NoughtsServerBuilder {
    bind_addr: String,
    registry_config: RegistryConfig,
    registry: Option<Arc<SessionRegistry>>,
    idle_timeout: Duration,
}

impl NoughtsServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            registry_config: RegistryConfig::default(),
            registry: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the configuration for the registry the builder creates.
    pub fn registry_config(mut self, config: RegistryConfig) -> Self {
        self.registry_config = config;
        self
    }

    /// Serves an existing registry instead of creating one.
    /// Overrides [`registry_config`](Self::registry_config).
    pub fn registry(mut self, registry: Arc<SessionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets how long a connection may stay silent before it is closed.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// Uses `JsonCodec` over `WebSocketTransport`.
    pub async fn build(self) -> Result<NoughtsServer<JsonCodec>, NoughtsError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(SessionRegistry::new(self.registry_config)));

        let state = Arc::new(ServerState {
            registry,
            codec: JsonCodec,
            idle_timeout: self.idle_timeout,
        });

        Ok(NoughtsServer { transport, state })
    }
}

impl Default for NoughtsServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound noughts server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct NoughtsServer<C: Codec = JsonCodec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl NoughtsServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> NoughtsServerBuilder {
        NoughtsServerBuilder::new()
    }
}

impl<C: Codec> NoughtsServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, NoughtsError> {
        Ok(self.transport.local_addr()?)
    }

    /// Returns the registry this server serves.
    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.state.registry)
    }

    /// Runs the accept loop until the process is terminated.
    ///
    /// Each connection gets its own task; a failed accept is logged and
    /// the loop carries on.
    pub async fn run(mut self) -> Result<(), NoughtsError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "noughts server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
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

//! `PalaceServer` builder and accept loop.

use std::sync::Arc;

use palace_protocol::JsonCodec;
use palace_room::RoomRegistry;
use palace_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::ServerError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
///
/// The registry is the single process-wide mutable map of rooms; the
/// mutex guards only registry bookkeeping (create/get/remove). Room
/// mutations themselves are serialized by each room's own actor, so
/// unrelated rooms never wait on one another.
pub(crate) struct ServerState {
    pub(crate) registry: Mutex<RoomRegistry>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Palace server.
///
/// # Example
///
/// ```rust,ignore
/// let server = PalaceServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct PalaceServerBuilder {
    bind_addr: String,
}

impl PalaceServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Binds the listener and builds the server.
    pub async fn build(self) -> Result<PalaceServer, ServerError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: Mutex::new(RoomRegistry::new()),
            codec: JsonCodec,
        });

        Ok(PalaceServer { transport, state })
    }
}

impl Default for PalaceServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Palace game server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct PalaceServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl PalaceServer {
    /// Creates a new builder.
    pub fn builder() -> PalaceServerBuilder {
        PalaceServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// A fault handling one connection is logged and never brings down
    /// the process or other rooms. Runs until the process terminates.
    pub async fn run(mut self) -> Result<(), ServerError> {
        tracing::info!("Palace server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(conn, state).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
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

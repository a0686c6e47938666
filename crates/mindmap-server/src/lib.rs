//! HTTP + WebSocket server

pub mod assets;
pub mod handlers;
pub mod router;
pub mod session;
pub mod websocket;

use std::net::SocketAddr;
use std::sync::Arc;

use mindmap_core::{Diagram, Notice};
use mindmap_export::Exporter;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

use crate::session::{LiveSession, Update};
use crate::websocket::WsMessage;

/// Capacity of the update broadcast channel.
const BROADCAST_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { host: "127.0.0.1".to_string(), port: 7890 }
    }
}

/// State shared by every request handler and socket.
pub struct ServerState {
    /// The single shared session; every action takes the write lock.
    pub session: RwLock<LiveSession>,
    /// Serialized [`WsMessage`]s for all connected clients.
    pub diff_tx: broadcast::Sender<String>,
    pub exporter: Exporter,
}

impl ServerState {
    pub fn new(diagram: Diagram, exporter: Exporter) -> Self {
        let (diff_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        ServerState { session: RwLock::new(LiveSession::new(diagram)), diff_tx, exporter }
    }

    /// Send a raw message to every connected client.
    pub fn broadcast(&self, msg: String) -> Result<usize, broadcast::error::SendError<String>> {
        self.diff_tx.send(msg)
    }

    /// Publish the changes made under `session` together with `notice`.
    pub fn publish(&self, session: &mut LiveSession, notice: Option<Notice>) -> Update {
        let update = Update { diff: session.commit(), notice };
        if update.is_noteworthy() {
            let msg = WsMessage::SceneDiff { update: update.clone() };
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    // No receivers is fine: nobody is connected.
                    let _ = self.broadcast(json);
                }
                Err(e) => debug!("Failed to serialize update: {}", e),
            }
        }
        update
    }
}

pub struct MindmapServer {
    state: Arc<ServerState>,
    config: ServerConfig,
}

impl MindmapServer {
    pub fn new(diagram: Diagram, exporter: Exporter, config: ServerConfig) -> Self {
        MindmapServer { state: Arc::new(ServerState::new(diagram, exporter)), config }
    }

    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    pub fn address(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.config.host, self.config.port).parse()?)
    }

    /// Bind and serve until the process ends.
    pub async fn start(self) -> anyhow::Result<()> {
        let addr = self.address()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Listening on http://{}", listener.local_addr()?);
        axum::serve(listener, router::create_router(self.state)).await?;
        Ok(())
    }
}

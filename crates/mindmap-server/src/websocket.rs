//! WebSocket handling: client actions in, scene diffs out

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use mindmap_core::{Diagram, InteractionController, Notice, PointerInput, Scene, Size};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::session::Update;
use crate::ServerState;

/// A user action sent by a client. Confirmations happen client-side before
/// destructive actions are sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientAction {
    Pointer { event: PointerInput },
    Wheel { x: f64, y: f64, delta_y: f64 },
    Resize { width: f64, height: f64 },
    Select { id: String },
    AddService { service: String },
    AddCategory { category: String },
    AddCustom {
        name: String,
        category: String,
        #[serde(default)]
        description: String,
    },
    DeleteSelected,
    Clear,
    ResetView,
}

/// WebSocket message types for client-server communication
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Client performs an action on the shared diagram
    Action {
        #[serde(flatten)]
        action: ClientAction,
    },
    /// Client requests the full scene
    RequestScene,
    /// Server sends the full scene
    Scene { scene: Box<Scene>, sequence: u64 },
    /// Server broadcasts a scene diff
    #[serde(skip_deserializing)]
    SceneDiff { update: Update },
    /// Ping/pong for keepalive
    Ping,
    Pong,
    /// Error message
    Error { message: String },
}

/// Per-connection view state. The viewport is shared, but each client drags
/// with its own pointer and reports positions on its own surface.
#[derive(Debug, Default)]
pub struct ClientView {
    pointer: InteractionController,
    screen: Option<Size>,
}

impl ClientView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer(&self) -> &InteractionController {
        &self.pointer
    }

    /// Map a point on this client's surface onto the shared viewport surface.
    fn to_shared(&self, x: f64, y: f64, shared: Size) -> (f64, f64) {
        match self.screen {
            Some(own) => (x * shared.width / own.width, y * shared.height / own.height),
            None => (x, y),
        }
    }

    fn input_to_shared(&self, input: PointerInput, shared: Size) -> PointerInput {
        match input {
            PointerInput::Down { x, y } => {
                let (x, y) = self.to_shared(x, y, shared);
                PointerInput::Down { x, y }
            }
            PointerInput::Move { x, y } => {
                let (x, y) = self.to_shared(x, y, shared);
                PointerInput::Move { x, y }
            }
            other => other,
        }
    }
}

/// Apply one action from a client to the diagram, returning the notice to
/// show, if any.
pub fn apply_action(diagram: &mut Diagram, view: &mut ClientView, action: ClientAction) -> Option<Notice> {
    match action {
        ClientAction::Pointer { event } => {
            let event = view.input_to_shared(event, diagram.viewport().screen());
            diagram.pointer_with(&mut view.pointer, event);
            None
        }
        ClientAction::Wheel { x, y, delta_y } => {
            let (x, y) = view.to_shared(x, y, diagram.viewport().screen());
            diagram.wheel(x, y, delta_y);
            None
        }
        ClientAction::Resize { width, height } => {
            let screen = Size::new(width, height);
            if screen.is_usable() {
                view.screen = Some(screen);
            }
            diagram.resize(width, height);
            None
        }
        ClientAction::Select { id } => {
            let notice = diagram.select(&id);
            (!notice.is_success()).then_some(notice)
        }
        ClientAction::AddService { service } => Some(diagram.add_entry(&service)),
        ClientAction::AddCategory { category } => Some(diagram.add_category(&category)),
        ClientAction::AddCustom { name, category, description } => {
            Some(diagram.add_custom(&name, &category, &description))
        }
        ClientAction::DeleteSelected => diagram.delete_selected(|_| true),
        ClientAction::Clear => diagram.clear(|_| true),
        ClientAction::ResetView => Some(diagram.reset_view()),
    }
}

async fn scene_message(state: &ServerState) -> WsMessage {
    let session = state.session.read().await;
    WsMessage::Scene {
        scene: Box::new(session.published().clone()),
        sequence: session.sequence(),
    }
}

/// Handle WebSocket upgrade requests
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<ServerState>) {
    info!("New WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.diff_tx.subscribe();
    // Replies meant for this client only.
    let (reply_tx, mut reply_rx) = mpsc::channel::<String>(16);

    // Send full scene immediately after connection
    match serde_json::to_string(&scene_message(&state).await) {
        Ok(json) => {
            if sender.send(Message::Text(json)).await.is_err() {
                warn!("Failed to send initial scene to WebSocket client");
                return;
            }
            debug!("Sent full scene to WebSocket client");
        }
        Err(e) => warn!("Failed to serialize scene message: {}", e),
    }

    // Spawn a task to handle incoming messages from the client
    let state_clone = Arc::clone(&state);
    let mut recv_task = tokio::spawn(async move {
        let mut view = ClientView::new();
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    debug!("Received WebSocket message: {}", text);
                    let reply = match serde_json::from_str::<WsMessage>(&text) {
                        Ok(ws_msg) => handle_client_message(ws_msg, &state_clone, &mut view).await,
                        Err(e) => {
                            warn!("Failed to parse WebSocket message: {}", e);
                            Some(WsMessage::Error { message: format!("invalid message: {e}") })
                        }
                    };
                    if let Some(reply) = reply {
                        if let Ok(json) = serde_json::to_string(&reply) {
                            if reply_tx.send(json).await.is_err() {
                                break;
                            }
                        }
                    }
                }
                Message::Close(_) => {
                    debug!("WebSocket client disconnected");
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to forward broadcasts and replies to the client
    let mut send_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                broadcast = rx.recv() => match broadcast {
                    Ok(msg) => msg,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Missed diffs cannot be replayed; resend everything.
                        warn!("WebSocket client lagged behind by {} updates", n);
                        match serde_json::to_string(&scene_message(&state).await) {
                            Ok(json) => json,
                            Err(_) => continue,
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                reply = reply_rx.recv() => match reply {
                    Some(msg) => msg,
                    None => break,
                },
            };
            if sender.send(Message::Text(msg)).await.is_err() {
                debug!("Failed to send message to WebSocket client");
                break;
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    info!("WebSocket connection closed");
}

/// Handle messages received from the WebSocket client. Returns a reply for
/// this client only; diagram changes are broadcast to everyone.
async fn handle_client_message(
    msg: WsMessage,
    state: &ServerState,
    view: &mut ClientView,
) -> Option<WsMessage> {
    match msg {
        WsMessage::Action { action } => {
            debug!("Client action: {:?}", action);
            let mut session = state.session.write().await;
            let notice = apply_action(session.diagram_mut(), view, action);
            state.publish(&mut session, notice);
            None
        }
        WsMessage::RequestScene => Some(scene_message(state).await),
        WsMessage::Ping => Some(WsMessage::Pong),
        other => {
            debug!("Ignoring message: {:?}", other);
            None
        }
    }
}

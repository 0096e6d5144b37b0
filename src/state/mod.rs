//! Shared runtime state: the connection table and the session registry.

pub mod evaluator;
pub mod registry;
pub mod session;

use std::sync::Arc;

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::config::AppConfig;

pub use self::registry::{SessionRegistry, SharedSession};

/// Shared handle to the application state, cloned into every handler.
pub type SharedState = Arc<AppState>;

/// Handle used to push messages to a connected player socket.
#[derive(Clone)]
pub struct PlayerConnection {
    /// Stable identifier assigned to the socket for its lifetime.
    pub id: Uuid,
    /// Writer-task channel for outbound frames.
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Central application state storing live connections and sessions.
pub struct AppState {
    config: AppConfig,
    connections: DashMap<Uuid, PlayerConnection>,
    rooms: SessionRegistry,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be
    /// cloned cheaply.
    pub fn new(config: AppConfig) -> SharedState {
        let rooms = SessionRegistry::new(config.room_code_length());
        Arc::new(Self {
            config,
            connections: DashMap::new(),
            rooms,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Registry of active player sockets keyed by their identifier.
    pub fn connections(&self) -> &DashMap<Uuid, PlayerConnection> {
        &self.connections
    }

    /// Registry of live sessions keyed by room code.
    pub fn rooms(&self) -> &SessionRegistry {
        &self.rooms
    }
}

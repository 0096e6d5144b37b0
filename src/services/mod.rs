/// OpenAPI documentation generation.
pub mod documentation;
/// Gameplay operations on a seated connection.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Public service for read-only room information.
pub mod public_service;
/// Deferred cleanup of abandoned rooms.
pub mod reaper;
/// Room lifecycle: create, join, exit, disconnect.
pub mod room_service;
/// WebSocket connection and message handling service.
pub mod websocket_service;
/// Outbound WebSocket event delivery.
pub mod ws_events;

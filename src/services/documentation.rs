use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Digit Duel Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::public::get_room,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::ws::ClientMessage,
            crate::dto::ws::ServerMessage,
            crate::dto::phase::VisibleRoomPhase,
            crate::dto::room::SlotId,
            crate::dto::room::RoomSnapshot,
            crate::dto::room::ParticipantSnapshot,
            crate::dto::room::ParticipantPair,
            crate::dto::room::AttemptCounts,
            crate::dto::room::SeriesScore,
            crate::dto::room::RevealedSecrets,
            crate::dto::room::FeedbackSnapshot,
            crate::dto::room::DigitStatusSnapshot,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "public", description = "Read-only room information"),
        (name = "game", description = "WebSocket operations for game clients"),
    )
)]
pub struct ApiDoc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::room::RoomSnapshot, error::AppError, services::public_service, state::SharedState,
};

/// Public read-only endpoints that expose room state.
pub fn router() -> Router<SharedState> {
    Router::new().route("/public/rooms/{code}", get(get_room))
}

#[utoipa::path(
    get,
    path = "/public/rooms/{code}",
    tag = "public",
    params(("code" = String, Path, description = "Room code")),
    responses(
        (status = 200, description = "Room snapshot", body = RoomSnapshot),
        (status = 400, description = "Malformed room code"),
        (status = 404, description = "No live room under this code")
    )
)]
/// Return a read-only snapshot of a live room.
pub async fn get_room(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<RoomSnapshot>, AppError> {
    let payload = public_service::get_room(&state, &code).await?;
    Ok(Json(payload))
}

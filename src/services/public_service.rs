use crate::{
    dto::{room::RoomSnapshot, validation::validate_room_code},
    error::AppError,
    state::SharedState,
};

/// Return a read-only snapshot of a live room.
///
/// The snapshot carries the same fields a participant receives on entry;
/// secrets and guess history are never exposed here.
pub async fn get_room(state: &SharedState, code: &str) -> Result<RoomSnapshot, AppError> {
    if validate_room_code(code).is_err() {
        return Err(AppError::BadRequest(
            "room code must be a short alphanumeric string".into(),
        ));
    }

    let code = code.trim().to_uppercase();
    let session = state
        .rooms()
        .get(&code)
        .ok_or_else(|| AppError::NotFound(format!("room `{code}` not found")))?;

    let session = session.lock().await;
    Ok(RoomSnapshot::from(&*session))
}

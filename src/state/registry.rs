//! In-memory registry mapping room codes to live sessions.

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use rand::Rng;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::state::session::{ParticipantInfo, Session};

/// Alphabet used for generated room codes.
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A session as handed out by the registry: shared ownership, exclusive
/// access. Every operation on a session locks this mutex, which is what
/// keeps the per-session atomicity guarantee when handlers run concurrently.
pub type SharedSession = Arc<Mutex<Session>>;

/// Owner of all live sessions, keyed by room code.
///
/// Registration and deletion go through `DashMap`'s atomic entry API, so two
/// concurrent room creations can never collide on the same freshly generated
/// code.
#[derive(Debug)]
pub struct SessionRegistry {
    rooms: DashMap<String, SharedSession>,
    room_code_length: usize,
}

impl SessionRegistry {
    /// Build an empty registry generating codes of the given length.
    pub fn new(room_code_length: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            room_code_length,
        }
    }

    /// Open a new session under a freshly generated unique code, seating the
    /// creator in Slot One.
    pub fn create(
        &self,
        code_length: usize,
        conn: Uuid,
        creator: ParticipantInfo,
    ) -> (String, SharedSession) {
        loop {
            let code = generate_room_code(self.room_code_length);
            match self.rooms.entry(code.clone()) {
                // Collision with a live room: roll a new code.
                Entry::Occupied(_) => continue,
                Entry::Vacant(entry) => {
                    let session = Arc::new(Mutex::new(Session::new(
                        code.clone(),
                        code_length,
                        conn,
                        creator,
                    )));
                    entry.insert(session.clone());
                    return (code, session);
                }
            }
        }
    }

    /// Look up a live session by its room code.
    pub fn get(&self, code: &str) -> Option<SharedSession> {
        self.rooms.get(code).map(|entry| entry.value().clone())
    }

    /// Delete a session, returning it if it was still registered.
    pub fn remove(&self, code: &str) -> Option<SharedSession> {
        let removed = self.rooms.remove(code).map(|(_, session)| session);
        if removed.is_some() {
            info!(code = %code, remaining = self.rooms.len(), "room removed from registry");
        }
        removed
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether no session is currently registered.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

/// Produce a short random identifier from the room-code alphabet.
fn generate_room_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let index = rng.random_range(0..CODE_CHARSET.len());
            CODE_CHARSET[index] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creator() -> ParticipantInfo {
        ParticipantInfo {
            name: "Alice".into(),
            avatar: "🐨".into(),
        }
    }

    #[test]
    fn generated_codes_use_the_documented_alphabet() {
        for _ in 0..50 {
            let code = generate_room_code(6);
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| CODE_CHARSET.contains(&b)));
        }
    }

    #[test]
    fn create_registers_unique_codes() {
        let registry = SessionRegistry::new(6);
        let mut codes = std::collections::HashSet::new();

        for _ in 0..32 {
            let (code, _) = registry.create(4, Uuid::new_v4(), creator());
            assert!(codes.insert(code), "registry handed out a duplicate code");
        }
        assert_eq!(registry.len(), 32);
    }

    #[test]
    fn get_returns_the_registered_session() {
        let registry = SessionRegistry::new(6);
        let (code, session) = registry.create(4, Uuid::new_v4(), creator());

        let found = registry.get(&code).expect("session should be registered");
        assert!(Arc::ptr_eq(&found, &session));
    }

    #[test]
    fn unknown_code_is_not_found() {
        let registry = SessionRegistry::new(6);
        assert!(registry.get("NOPE42").is_none());
        assert!(registry.remove("NOPE42").is_none());
    }

    #[test]
    fn remove_frees_the_code() {
        let registry = SessionRegistry::new(6);
        let (code, _) = registry.create(4, Uuid::new_v4(), creator());

        assert!(registry.remove(&code).is_some());
        assert!(registry.get(&code).is_none());
        assert!(registry.is_empty());
    }
}

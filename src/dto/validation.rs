//! Validation helpers for inbound message payloads.

use validator::ValidationError;

/// Longest accepted display name, in characters.
const MAX_NAME_CHARS: usize = 32;
/// Longest accepted avatar glyph, in characters.
const MAX_AVATAR_CHARS: usize = 8;
/// Upper bound accepted for room codes and digit codes before the session's
/// own exact-length checks apply.
const MAX_CODE_CHARS: usize = 16;

/// Validates that a room code is non-empty alphanumeric ASCII.
///
/// Codes are normalized (trimmed and uppercased) before lookup, so lowercase
/// input is accepted here.
pub fn validate_room_code(code: &str) -> Result<(), ValidationError> {
    let trimmed = code.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_CODE_CHARS {
        let mut err = ValidationError::new("room_code_length");
        err.message = Some("Room code must be between 1 and 16 characters".into());
        return Err(err);
    }

    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        let mut err = ValidationError::new("room_code_format");
        err.message = Some("Room code must contain only letters and digits".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a secret or guess consists solely of ASCII digits.
///
/// The exact length requirement is per-session and enforced when the code is
/// committed or evaluated.
pub fn validate_code_digits(code: &str) -> Result<(), ValidationError> {
    if code.is_empty() || code.len() > MAX_CODE_CHARS {
        let mut err = ValidationError::new("code_length");
        err.message = Some("Code must be between 1 and 16 digits".into());
        return Err(err);
    }

    if !code.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("code_format");
        err.message = Some("Code must contain only digits".into());
        return Err(err);
    }

    Ok(())
}

/// Validates an optional display name: anything non-blank up to 32 characters.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if name.chars().count() > MAX_NAME_CHARS {
        let mut err = ValidationError::new("name_length");
        err.message = Some("Display name must be at most 32 characters".into());
        return Err(err);
    }
    Ok(())
}

/// Validates an optional avatar glyph.
pub fn validate_avatar(avatar: &str) -> Result<(), ValidationError> {
    if avatar.chars().count() > MAX_AVATAR_CHARS {
        let mut err = ValidationError::new("avatar_length");
        err.message = Some("Avatar must be at most 8 characters".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_room_code_valid() {
        assert!(validate_room_code("ABC123").is_ok());
        assert!(validate_room_code("abc123").is_ok());
        assert!(validate_room_code("  XY12ZQ  ").is_ok()); // trimmed before checking
    }

    #[test]
    fn test_validate_room_code_invalid() {
        assert!(validate_room_code("").is_err());
        assert!(validate_room_code("   ").is_err());
        assert!(validate_room_code("ABC-123").is_err()); // punctuation
        assert!(validate_room_code("ABCDEFGHIJKLMNOPQ").is_err()); // too long
    }

    #[test]
    fn test_validate_code_digits_valid() {
        assert!(validate_code_digits("1234").is_ok());
        assert!(validate_code_digits("00000").is_ok());
    }

    #[test]
    fn test_validate_code_digits_invalid() {
        assert!(validate_code_digits("").is_err());
        assert!(validate_code_digits("12a4").is_err()); // letter
        assert!(validate_code_digits("12 4").is_err()); // space
        assert!(validate_code_digits("12345678901234567").is_err()); // too long
    }

    #[test]
    fn test_validate_display_name() {
        assert!(validate_display_name("Alice").is_ok());
        assert!(validate_display_name("").is_ok()); // blank falls back to default
        assert!(validate_display_name(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_avatar() {
        assert!(validate_avatar("🐨").is_ok());
        assert!(validate_avatar(&"🐨".repeat(9)).is_err());
    }
}

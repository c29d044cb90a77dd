use base64::Engine;
use base64::engine::general_purpose::{GeneralPurpose, STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use serde_json::Value;

use crate::common::types::id_from_value;

/// Extracts `user_id` from the payload segment of a JWT.
///
/// The signature is NOT verified. The id is only used to decide which side
/// a message is drawn on; the server still checks the token on every call.
/// Anything malformed yields `None`.
pub fn user_id_from_token(token: Option<&str>) -> Option<i64> {
    let token = token?.trim();
    if token.is_empty() {
        return None;
    }

    let Some(payload) = token.split('.').nth(1) else {
        log::warn!("Token has no payload segment");
        return None;
    };

    let bytes = match decode_segment(payload) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::warn!("Error decoding token payload: {err}");
            return None;
        }
    };

    let claims: Value = match serde_json::from_slice(&bytes) {
        Ok(claims) => claims,
        Err(err) => {
            log::warn!("Token payload is not JSON: {err}");
            return None;
        }
    };

    // 0 counts as "no identity", same as a missing claim
    claims
        .get("user_id")
        .and_then(id_from_value)
        .filter(|id| *id != 0)
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let trimmed = segment.trim_end_matches('=');
    let engine: &GeneralPurpose = if trimmed.contains(['+', '/']) {
        &STANDARD_NO_PAD
    } else {
        &URL_SAFE_NO_PAD
    };
    engine.decode(trimmed)
}

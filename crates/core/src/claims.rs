//! Best-effort extraction of identity claims from a bearer token.
//!
//! The client never verifies token signatures; it only peeks at the payload
//! segment to learn who the backend thinks the user is. Every malformed input
//! (wrong segment count, bad base64, non-JSON, non-object payload) yields
//! `None`, which callers treat exactly like a token carrying no claims.

use base64::alphabet;
use base64::engine::general_purpose::GeneralPurposeConfig;
use base64::engine::{DecodePaddingMode, GeneralPurpose};
use base64::Engine as _;
use serde_json::{Map, Value};

use crate::types::Identifier;
use crate::user::SessionUser;

/// Standard alphabet, lenient about padding and trailing bits.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode the claims carried by `token`.
///
/// Recognized keys are `id` (falling back to `sub`), `email`, `username`,
/// `role` and `rolId`. Anything else is ignored, as is a recognized key whose
/// value has an unexpected JSON type.
pub fn decode_claims(token: &str) -> Option<SessionUser> {
    let payload = decode_payload(token)?;
    Some(claims_from_payload(&payload))
}

/// Decode the payload segment of a three-part token into a JSON object.
pub fn decode_payload(token: &str) -> Option<Map<String, Value>> {
    let mut segments = token.split('.');
    let (_header, payload, _signature) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() {
        return None;
    }

    let bytes = PAYLOAD_ENGINE.decode(to_standard_base64(payload)).ok()?;
    match serde_json::from_slice(&bytes).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Map the URL-safe alphabet onto the standard one and pad to a multiple of
/// four characters.
fn to_standard_base64(segment: &str) -> String {
    let mut normalized: String = segment
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    while normalized.len() % 4 != 0 {
        normalized.push('=');
    }
    normalized
}

fn claims_from_payload(payload: &Map<String, Value>) -> SessionUser {
    let text = |key: &str| payload.get(key).and_then(Value::as_str).map(str::to_owned);

    SessionUser {
        id: payload
            .get("id")
            .and_then(Identifier::from_json)
            .or_else(|| payload.get("sub").and_then(Identifier::from_json)),
        email: text("email"),
        username: text("username"),
        role: text("role"),
        role_id: payload.get("rolId").and_then(Identifier::from_json),
    }
}

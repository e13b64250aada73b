use super::crypto;
use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "session";

/// HMAC-secured session string, signed by $SESSION_SECRET
///
/// Note: since this guy is stored in a browser cookie, it's important to
/// esure it does not get too large. Only the user id goes in; the user row
/// is looked up again on every request.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    /// Unix seconds
    pub created_at: i64,
}

impl Session {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn is_expired(&self, ttl_secs: i64, now: i64) -> bool {
        now - self.created_at > ttl_secs
    }
}

pub fn serialize_session(secret: &[u8], session: &Session) -> Result<String> {
    let json_bytes = serde_json::to_string(session)?;
    let b64 = general_purpose::STANDARD_NO_PAD.encode(json_bytes);
    let raw_digest = crypto::get_digest(secret, b64.as_bytes())?;
    let digest = general_purpose::STANDARD_NO_PAD.encode(raw_digest);

    Ok(format!("{}:{}", b64, digest))
}

pub fn deserialize_session(
    secret: &[u8],
    cookie: &str,
) -> Result<Session, &'static str> {
    let parts: Vec<&str> = cookie.split(':').collect();
    if parts.len() != 2 {
        return Err("Invalid session");
    }
    let b64_json = parts[0].as_bytes();
    let digest = match general_purpose::STANDARD_NO_PAD.decode(parts[1]) {
        Ok(v) => v,
        Err(_) => {
            return Err("Cannot base64 decode the digest");
        }
    };

    if !crypto::is_valid(secret, b64_json, &digest) {
        return Err("Failed to validate session signature");
    }
    let json_string = match general_purpose::STANDARD_NO_PAD.decode(b64_json) {
        Ok(v) => v,
        Err(_) => {
            return Err("Cannot base64 decode sesion string");
        }
    };

    serde_json::from_slice(&json_string)
        .map_err(|_| "Cannot deserialize session JSON")
}

pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0")
}

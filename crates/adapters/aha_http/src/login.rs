//! `login_sid.lua` session handshake.
//!
//! The gateway hands out a challenge; the client answers it with the
//! PBKDF2-HMAC-SHA256 scheme (challenge version 2, FRITZ!OS 7.24+):
//!
//! ```text
//! challenge = "2$" iter1 "$" salt1-hex "$" iter2 "$" salt2-hex
//! hash1     = PBKDF2(password, salt1, iter1)
//! response  = salt2-hex "$" hex(PBKDF2(hash1, salt2, iter2))
//! ```
//!
//! The older MD5 scheme is not supported; gateways running a FRITZ!OS
//! before 7.24 are reported as [`AhaError::UnsupportedChallenge`].

use serde::Deserialize;
use sha2::Sha256;

use crate::error::AhaError;

/// The session id the gateway returns when no session was granted.
pub const EMPTY_SID: &str = "0000000000000000";

/// Parsed `<SessionInfo>` response of `login_sid.lua`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionInfo {
    #[serde(rename = "SID")]
    pub sid: String,
    #[serde(default)]
    pub challenge: String,
    #[serde(default)]
    pub block_time: u64,
}

impl SessionInfo {
    /// Parse the XML body of a `login_sid.lua` response.
    pub fn parse(xml: &str) -> Result<Self, AhaError> {
        Ok(quick_xml::de::from_str(xml)?)
    }

    /// Whether the gateway granted a session.
    #[must_use]
    pub fn has_session(&self) -> bool {
        self.sid != EMPTY_SID
    }
}

/// Compute the response string for a version-2 challenge.
pub fn challenge_response(challenge: &str, password: &str) -> Result<String, AhaError> {
    let malformed = || AhaError::MalformedChallenge {
        challenge: challenge.to_string(),
    };

    let mut parts = challenge.split('$');
    if parts.next() != Some("2") {
        return Err(AhaError::UnsupportedChallenge {
            challenge: challenge.to_string(),
        });
    }

    let iter1: u32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(malformed)?;
    let salt1 = parts
        .next()
        .and_then(|p| hex::decode(p).ok())
        .ok_or_else(malformed)?;
    let iter2: u32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(malformed)?;
    let salt2_hex = parts.next().ok_or_else(malformed)?;
    let salt2 = hex::decode(salt2_hex).map_err(|_| malformed())?;
    if iter1 == 0 || iter2 == 0 || salt1.is_empty() || salt2.is_empty() {
        return Err(malformed());
    }

    let mut hash1 = [0_u8; 32];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt1, iter1, &mut hash1);
    let mut hash2 = [0_u8; 32];
    pbkdf2::pbkdf2_hmac::<Sha256>(&hash1, &salt2, iter2, &mut hash2);

    Ok(format!("{salt2_hex}${}", hex::encode(hash2)))
}

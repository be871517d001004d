//! Identity types: who is playing, and in which lobby.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PlayerId
// ---------------------------------------------------------------------------

/// An opaque, caller-supplied player identifier.
///
/// The server never generates these. Clients pick an id once (usually a
/// random string kept in local storage) and present it on every request.
/// Presenting the same id again is how a player rejoins after a refresh.
///
/// `#[serde(transparent)]` keeps the JSON form a plain string:
/// `PlayerId("p-1")` becomes `"p-1"`.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Wraps any string-ish value as a player id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// LobbyCode
// ---------------------------------------------------------------------------

/// The short code players type in to find a lobby (e.g. `"K3ZQ7A"`).
///
/// Codes are case-insensitive for the humans typing them, so every
/// `LobbyCode` is normalized on construction: surrounding whitespace is
/// trimmed and letters are upper-cased. The inner string is private so a
/// non-normalized code can't be built by accident.
///
/// Serde goes through `String` in both directions, which means codes
/// arriving over the wire are normalized too.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub struct LobbyCode(String);

impl LobbyCode {
    /// Builds a normalized lobby code.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_uppercase())
    }

    /// Returns the normalized code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LobbyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for LobbyCode {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for LobbyCode {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<LobbyCode> for String {
    fn from(code: LobbyCode) -> Self {
        code.0
    }
}

use std::fmt;

/// Server-assigned player identity. Opaque: it can be compared, printed and
/// used in request paths, but only the API hands them out.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PlayerId(i64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A player as returned by create, get-one, list and delete.
/// Fields the API adds beyond these are ignored.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq, Hash)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    pub email: String,
    pub name: String,
    pub surname: String,
}

/// Body of `POST /api/automationTask/create`. The API expects snake_case keys.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct PlayerCreateRequest {
    pub currency_code: String,
    pub email: String,
    pub name: String,
    pub password_change: String,
    pub password_repeat: String,
    pub surname: String,
    pub username: String,
}

/// Body of `POST /api/automationTask/getOne`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct PlayerLookupRequest {
    pub email: String,
}

impl PlayerLookupRequest {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

impl From<&Player> for PlayerLookupRequest {
    fn from(player: &Player) -> Self {
        Self::new(player.email.clone())
    }
}

// Wire types for the device's JSON API.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/login`.
///
/// `override` asks the device to take over an existing session for the
/// same user instead of refusing the login.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    #[serde(rename = "override")]
    pub override_session: bool,
    pub username: &'a str,
    pub password: &'a str,
}

/// Response of `POST /api/login`. Only `sid` matters; the device may add
/// other fields which are ignored.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub sid: Option<String>,
}

/// One entry of `GET /api/speakers`: a microphone that currently has the floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    /// Set for a chairman/priority microphone.
    #[serde(default)]
    pub prio: bool,
}

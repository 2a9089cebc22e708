//! The authenticated user

use serde::{Deserialize, Serialize};

/// The identity of the logged-in user, as reported by the server.
///
/// Set once during the session bootstrap, cleared on logout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    /// URL of the user's avatar, if the identity provider supplied one
    #[serde(default)]
    pub picture: Option<String>,
}

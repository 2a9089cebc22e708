//! Telegram notification-channel linking

use serde::{Deserialize, Serialize};

/// The state of the link between this account and a Telegram chat.
///
/// Read-mostly: it is only ever mutated through the link/unlink operations, and reloaded
/// from the server after each of them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TelegramStatus {
    pub linked: bool,
    #[serde(default)]
    pub telegram_chat_id: Option<String>,
    #[serde(default)]
    pub telegram_username: Option<String>,
    #[serde(default)]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub daily_summary_enabled: bool,
}

/// The payload submitted to link a Telegram chat to this account
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelegramLinkRequest {
    pub telegram_chat_id: String,
    #[serde(default)]
    pub telegram_username: Option<String>,
}

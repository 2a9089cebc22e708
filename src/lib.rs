//! This crate provides the session side of a calendar/scheduling web application with a
//! Telegram notification channel.
//!
//! It provides an HTTP client for the scheduling server in the [`client`] module, that can
//! be used as a stand-alone module.
//!
//! Because a page needs one owner for its remote-entity caches and UI state, this crate
//! also provides a [`Session`](session::Session). \
//! A `Session` mirrors the remote entities (events, categories, settings, the Telegram
//! link status) locally, and mediates between the server, the page renderer and the
//! interactive calendar widget. The renderer and the widget are abstracted behind the
//! traits in [`traits`], so the projection logic can be exercised without any UI toolkit.

pub mod traits;

mod event;
pub use event::{Event, EventDraft, EventId, TimeWindow};
mod category;
pub use category::{Category, CategoryDraft, CategoryId, DEFAULT_COLOR};
mod settings;
pub use settings::Settings;
mod telegram;
pub use telegram::{TelegramLinkRequest, TelegramStatus};
mod user;
pub use user::User;

pub mod session;
pub use session::Session;

pub mod client;
pub use client::Client;

pub mod toast;
pub mod view;

pub mod config;

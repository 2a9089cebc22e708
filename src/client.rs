//! This module provides a client to connect to the scheduling server

use std::error::Error;

use async_trait::async_trait;
use reqwest::Response;
use serde::Deserialize;
use url::Url;

use crate::category::{Category, CategoryDraft, CategoryId};
use crate::event::{Event, EventDraft, EventId, TimeWindow};
use crate::settings::Settings;
use crate::telegram::{TelegramLinkRequest, TelegramStatus};
use crate::traits::RemoteSource;
use crate::user::User;

/// A [`RemoteSource`] that talks to the scheduling server over HTTP/JSON.
///
/// Authentication is cookie-based and handled by the server: the client only carries the
/// session cookie along (reqwest's cookie store), and hands the login URL to the page so
/// it can navigate there.
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct AuthCheckResponse {
    authenticated: bool,
}

#[derive(Deserialize)]
struct AuthUserResponse {
    authenticated: bool,
    #[serde(default)]
    user: Option<User>,
}

#[derive(Deserialize)]
struct EventsResponse {
    events: Vec<Event>,
}

#[derive(Deserialize)]
struct CategoriesResponse {
    categories: Vec<Category>,
}

#[derive(Deserialize)]
struct SettingsResponse {
    settings: Settings,
}

impl Client {
    /// Create a client for the server at `base_url`. This does not start a connection.
    pub fn new<S: AsRef<str>>(base_url: S) -> Result<Self, Box<dyn Error>> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        // Url::join treats a missing trailing slash as a file component
        if base_url.path().ends_with('/') == false {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let user_agent = crate::config::PRODUCT_NAME.lock().unwrap().clone();
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .cookie_store(true)
            .build()?;

        Ok(Self { base_url, http })
    }

    /// The URL the page should navigate to in order to start a login.
    ///
    /// The OAuth dance itself happens between the browser and the server; this crate is
    /// never involved in it.
    pub fn login_url(&self) -> Url {
        self.base_url.join("auth/login").unwrap(/* joining a constant relative path cannot fail */)
    }

    fn endpoint(&self, path: &str) -> Result<Url, Box<dyn Error>> {
        Ok(self.base_url.join(path)?)
    }

    // The endpoint join stays in its own binding: `?` inside the request-builder
    // expression leaves a non-Send temporary alive across the await
    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, Box<dyn Error>> {
        let url = self.endpoint(path)?;
        let response = self.http.get(url).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

/// Turns a non-2xx response into an `Err`, preferring the server's `{"error": ...}`
/// message over a generic status line
async fn check_status(response: Response) -> Result<Response, Box<dyn Error>> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(&body)
        .unwrap_or_else(|| format!("Unexpected HTTP status code {}", status));
    Err(message.into())
}

/// Extracts the optional `{"error": "..."}` message servers attach to failure responses
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(str::to_string)
}

#[async_trait]
impl RemoteSource for Client {
    async fn auth_status(&self) -> Result<bool, Box<dyn Error>> {
        let check: AuthCheckResponse = self.get_json("auth/check").await?;
        Ok(check.authenticated)
    }

    async fn current_user(&self) -> Result<Option<User>, Box<dyn Error>> {
        let reply: AuthUserResponse = self.get_json("auth/user").await?;
        if reply.authenticated {
            Ok(reply.user)
        } else {
            Ok(None)
        }
    }

    async fn logout(&self) -> Result<(), Box<dyn Error>> {
        let url = self.endpoint("auth/logout")?;
        let response = self.http.post(url).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn events(&self) -> Result<Vec<Event>, Box<dyn Error>> {
        let reply: EventsResponse = self.get_json("api/events").await?;
        Ok(reply.events)
    }

    async fn create_event(&self, draft: &EventDraft) -> Result<(), Box<dyn Error>> {
        let url = self.endpoint("api/events")?;
        let response = self.http.post(url).json(draft).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn update_event(&self, id: EventId, draft: &EventDraft) -> Result<(), Box<dyn Error>> {
        let url = self.endpoint(&format!("api/events/{}", id))?;
        let response = self.http.put(url).json(draft).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn reschedule_event(&self, id: EventId, window: &TimeWindow) -> Result<(), Box<dyn Error>> {
        let url = self.endpoint(&format!("api/events/{}", id))?;
        let response = self.http.put(url).json(window).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn delete_event(&self, id: EventId) -> Result<(), Box<dyn Error>> {
        let url = self.endpoint(&format!("api/events/{}", id))?;
        let response = self.http.delete(url).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn categories(&self) -> Result<Vec<Category>, Box<dyn Error>> {
        let reply: CategoriesResponse = self.get_json("api/categories").await?;
        Ok(reply.categories)
    }

    async fn create_category(&self, draft: &CategoryDraft) -> Result<(), Box<dyn Error>> {
        let url = self.endpoint("api/categories")?;
        let response = self.http.post(url).json(draft).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn update_category(&self, id: CategoryId, draft: &CategoryDraft) -> Result<(), Box<dyn Error>> {
        let url = self.endpoint(&format!("api/categories/{}", id))?;
        let response = self.http.put(url).json(draft).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), Box<dyn Error>> {
        let url = self.endpoint(&format!("api/categories/{}", id))?;
        let response = self.http.delete(url).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn settings(&self) -> Result<Settings, Box<dyn Error>> {
        let reply: SettingsResponse = self.get_json("api/settings").await?;
        Ok(reply.settings)
    }

    async fn save_settings(&self, settings: &Settings) -> Result<Settings, Box<dyn Error>> {
        let url = self.endpoint("api/settings")?;
        let response = self.http.put(url).json(settings).send().await?;
        let response = check_status(response).await?;
        // The server echoes the saved record; it is the canonical copy, the submitted
        // payload is not (the server may have normalized fields)
        let reply: SettingsResponse = response.json().await?;
        Ok(reply.settings)
    }

    async fn telegram_status(&self) -> Result<TelegramStatus, Box<dyn Error>> {
        self.get_json("api/telegram/status").await
    }

    async fn link_telegram(&self, request: &TelegramLinkRequest) -> Result<(), Box<dyn Error>> {
        let url = self.endpoint("api/telegram/link")?;
        let response = self.http.post(url).json(request).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn unlink_telegram(&self) -> Result<(), Box<dyn Error>> {
        let url = self.endpoint("api/telegram/unlink")?;
        let response = self.http.post(url).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn send_test_notification(&self) -> Result<(), Box<dyn Error>> {
        let url = self.endpoint("api/telegram/test")?;
        let response = self.http.post(url).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

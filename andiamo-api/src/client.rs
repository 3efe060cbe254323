use std::time::Duration;

use andiamo_core::event::normalize_events;
use andiamo_core::feed::Feed;
use andiamo_core::forms::{CategoryDraft, EventDraft, LieuDraft, LoginForm, RegisterForm};
use andiamo_core::{Category, Event, EventRecord, Lieu, LoginResponse, Role, User};
use chrono::TimeZone;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{ApiError, ApiResult};

/// Error body the backend sends along with 4xx/5xx answers.
#[derive(Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

/// Client for the events backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: Url, timeout: Duration) -> ApiResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        // Join relative paths under the base, not beside its last segment
        let mut base_url = base_url;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(ApiClient {
            http,
            base_url,
            token: None,
        })
    }

    /// Attach a bearer token to every following request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        let url = self.base_url.join(path)?;
        tracing::debug!("{} {}", method, url);

        let builder = self.http.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let resp = builder.send().await?;
        let status = resp.status();

        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(|e| e.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let resp = self.send(self.request(Method::GET, path)?).await?;
        Ok(resp.json().await?)
    }

    async fn send_json<B: serde::Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ApiResult<Response> {
        self.send(self.request(method, path)?.json(body)).await
    }

    // Auth

    /// POST /api/auth/login
    pub async fn login(&self, form: &LoginForm) -> ApiResult<LoginResponse> {
        let resp = self.send_json(Method::POST, "api/auth/login", form).await?;
        Ok(resp.json().await?)
    }

    /// POST /api/auth/register
    pub async fn register(&self, form: &RegisterForm) -> ApiResult<()> {
        self.send_json(Method::POST, "api/auth/register", form).await?;
        Ok(())
    }

    // Events

    /// GET /api/events, as sent.
    pub async fn list_events(&self) -> ApiResult<Vec<EventRecord>> {
        self.get_json("api/events").await
    }

    /// GET /api/events, normalized in `tz`. Records with unusable dates are dropped.
    pub async fn events_in<Tz: TimeZone>(&self, tz: &Tz) -> ApiResult<Vec<Event>> {
        let records = self.list_events().await?;
        let fetched = records.len();
        let events = normalize_events(records, tz);

        tracing::debug!("Fetched {} events ({} kept)", fetched, events.len());
        Ok(events)
    }

    /// Load the home feed.
    ///
    /// A failed fetch is logged and leaves the feed empty. The error is
    /// returned alongside so the caller can report it.
    pub async fn load_feed<Tz: TimeZone>(&self, zone: Tz) -> (Feed<Tz>, Option<ApiError>) {
        match self.events_in(&zone).await {
            Ok(events) => (Feed::new(events, zone), None),
            Err(e) => {
                tracing::warn!("Failed to load events: {e}");
                (Feed::empty(zone), Some(e))
            }
        }
    }

    /// GET /api/events/count
    pub async fn event_count(&self) -> ApiResult<i64> {
        self.get_json("api/events/count").await
    }

    /// POST /api/events
    pub async fn create_event(&self, draft: &EventDraft) -> ApiResult<()> {
        self.send_json(Method::POST, "api/events", draft).await?;
        Ok(())
    }

    /// PUT /api/events/{id}
    pub async fn update_event(&self, id: i64, draft: &EventDraft) -> ApiResult<()> {
        self.send_json(Method::PUT, &format!("api/events/{id}"), draft).await?;
        Ok(())
    }

    /// DELETE /api/events/{id}
    pub async fn delete_event(&self, id: i64) -> ApiResult<()> {
        self.send(self.request(Method::DELETE, &format!("api/events/{id}"))?).await?;
        Ok(())
    }

    // Categories & venues

    /// GET /api/categories
    pub async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        self.get_json("api/categories").await
    }

    /// POST /api/categories
    pub async fn create_category(&self, draft: &CategoryDraft) -> ApiResult<()> {
        self.send_json(Method::POST, "api/categories", draft).await?;
        Ok(())
    }

    /// GET /api/lieux/by-category/{id}
    pub async fn lieux_by_category(&self, category_id: i64) -> ApiResult<Vec<Lieu>> {
        self.get_json(&format!("api/lieux/by-category/{category_id}")).await
    }

    /// GET /api/lieux/{id}
    pub async fn get_lieu(&self, id: i64) -> ApiResult<Lieu> {
        self.get_json(&format!("api/lieux/{id}")).await
    }

    /// POST /api/lieux
    pub async fn create_lieu(&self, draft: &LieuDraft) -> ApiResult<()> {
        self.send_json(Method::POST, "api/lieux", draft).await?;
        Ok(())
    }

    // Users

    /// GET /api/users
    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.get_json("api/users").await
    }

    /// GET /api/countUsers
    pub async fn user_count(&self) -> ApiResult<i64> {
        self.get_json("api/countUsers").await
    }

    /// PUT /api/users/{id}/role
    pub async fn update_user_role(&self, id: i64, role: Role) -> ApiResult<()> {
        let body = serde_json::json!({ "role": role });
        self.send_json(Method::PUT, &format!("api/users/{id}/role"), &body).await?;
        Ok(())
    }

    /// DELETE /api/users/{id}
    pub async fn delete_user(&self, id: i64) -> ApiResult<()> {
        self.send(self.request(Method::DELETE, &format!("api/users/{id}"))?).await?;
        Ok(())
    }
}

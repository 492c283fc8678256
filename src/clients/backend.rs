//! HTTP client for the hive inventory backend.
//!
//! Implements both [`BeehiveService`] and [`SessionGate`] so the CLI can run
//! against a remote server with the same code paths as the local store. The
//! session token and the onboarding flag stay in the local [`Store`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::BackendConfig;
use crate::models::{Beehive, BeehivePatch, NewBeehive, ProfilePatch, Session, User};
use crate::services::auth_service::{AuthError, SessionGate};
use crate::services::beehive_service::{BeehiveError, BeehiveService};
use crate::services::validation;
use crate::services::views::HiveStats;
use crate::store::Store;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Network(String),

    #[error("Not logged in or token expired")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rejected by backend: {0}")]
    Validation(String),

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<ClientError> for BeehiveError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unauthorized => Self::Unauthorized,
            ClientError::NotFound(what) => Self::NotFound(what),
            ClientError::Validation(message) => Self::Validation(message),
            ClientError::Status { status, message } => Self::Remote { status, message },
            ClientError::Network(message) | ClientError::Decode(message) => Self::Network(message),
        }
    }
}

impl From<ClientError> for AuthError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unauthorized => Self::SessionExpired,
            ClientError::Validation(message) => Self::Validation(message),
            ClientError::Network(message) => Self::Network(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Error body shape: `{error, message, status_code, type}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    #[serde(default)]
    has_next: bool,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    beehives: Vec<Beehive>,
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
struct PublicHiveResponse {
    beehive: Beehive,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: User,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    user: User,
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    page_size: usize,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent("Hivekeep/1.0")
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn hive_url(&self, serial: &str, action: Option<&str>) -> String {
        let serial = urlencoding::encode(serial);
        match action {
            Some(action) => self.url(&format!("/beehives/{serial}/{action}")),
            None => self.url(&format!("/beehives/{serial}")),
        }
    }

    fn authorized(request: RequestBuilder, session: &Session) -> Result<RequestBuilder, ClientError> {
        let token = session.token.as_deref().ok_or(ClientError::Unauthorized)?;
        Ok(request.bearer_auth(token))
    }

    /// Sends the request and maps non-success statuses onto [`ClientError`].
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        let message = body
            .message
            .or(body.error)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());

        debug!(status = status.as_u16(), message = %message, "Backend request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::NOT_FOUND => ClientError::NotFound(what.to_string()),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::Validation(message)
            }
            _ => ClientError::Status {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, ClientError> {
        let response = self.send(request, what).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Follows `has_next` until the listing is exhausted.
    async fn fetch_all(&self, session: &Session, path: &str) -> Result<Vec<Beehive>, ClientError> {
        let mut hives = Vec::new();
        let mut page = 1usize;

        loop {
            let url = Url::parse_with_params(
                &self.url(path),
                &[
                    ("page", page.to_string()),
                    ("per_page", self.page_size.to_string()),
                ],
            )
            .map_err(|e| ClientError::Network(format!("Invalid backend URL: {e}")))?;
            let request = Self::authorized(self.client.get(url), session)?;
            let body: ListResponse = self.send_json(request, path).await?;

            hives.extend(body.beehives);
            if !body.pagination.has_next {
                break;
            }
            page += 1;
        }

        Ok(hives)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ClientError> {
        let request = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "username": username, "password": password }));
        let body: LoginResponse = self.send_json(request, "login").await?;

        Ok(Session {
            user: body.user,
            token: Some(body.token),
        })
    }

    pub async fn me(&self, session: &Session) -> Result<User, ClientError> {
        let request = Self::authorized(self.client.get(self.url("/auth/me")), session)?;
        self.send_json(request, "current user").await
    }

    pub async fn update_profile(
        &self,
        session: &Session,
        patch: &ProfilePatch,
    ) -> Result<User, ClientError> {
        let request = self
            .client
            .put(self.url("/auth/profile"))
            .json(&patch.to_backend_body());
        let request = Self::authorized(request, session)?;
        let body: ProfileResponse = self.send_json(request, "profile").await?;
        Ok(body.user)
    }

    pub async fn logout(&self, session: &Session) -> Result<(), ClientError> {
        let request = Self::authorized(self.client.post(self.url("/auth/logout")), session)?;
        self.send(request, "logout").await?;
        Ok(())
    }
}

fn new_hive_body(input: &NewBeehive) -> Value {
    json!({
        "import_date": input.import_date,
        "split_date": input.split_date,
        "health_status": input.health_status.backend_label(),
        "notes": input.notes.clone().unwrap_or_default(),
    })
}

fn patch_body(patch: &BeehivePatch) -> Value {
    let mut body = serde_json::Map::new();
    if let Some(date) = patch.import_date {
        body.insert("import_date".into(), json!(date));
    }
    if let Some(split) = patch.split_date {
        body.insert("split_date".into(), json!(split));
    }
    if let Some(status) = patch.health_status {
        body.insert("health_status".into(), json!(status.backend_label()));
    }
    if let Some(notes) = &patch.notes {
        body.insert("notes".into(), json!(notes));
    }
    Value::Object(body)
}

#[async_trait]
impl BeehiveService for BackendClient {
    async fn list(&self, session: &Session) -> Result<Vec<Beehive>, BeehiveError> {
        let mut hives = self.fetch_all(session, "/beehives").await?;
        hives.extend(self.fetch_all(session, "/sold-beehives").await?);
        Ok(hives)
    }

    async fn create(
        &self,
        session: &Session,
        input: NewBeehive,
    ) -> Result<Beehive, BeehiveError> {
        validation::validate_new_beehive(&input, chrono::Local::now().date_naive())?;

        let request = self
            .client
            .post(self.url("/beehives"))
            .json(&new_hive_body(&input));
        let request = Self::authorized(request, session)?;
        let hive: Beehive = self.send_json(request, "beehive").await?;

        info!(serial = %hive.serial_number, "Created beehive on backend");
        Ok(hive)
    }

    async fn update(
        &self,
        session: &Session,
        serial: &str,
        patch: BeehivePatch,
    ) -> Result<Beehive, BeehiveError> {
        let body = patch_body(&patch);
        let mut hive = if body.as_object().is_some_and(|b| !b.is_empty()) {
            let request = self.client.put(self.hive_url(serial, None)).json(&body);
            let request = Self::authorized(request, session)?;
            self.send_json::<Beehive>(request, serial).await?
        } else {
            self.find_by_serial(session, serial)
                .await?
                .ok_or_else(|| BeehiveError::NotFound(serial.to_string()))?
        };

        // Sold state has dedicated endpoints.
        match patch.is_sold {
            Some(true) if !hive.is_sold => hive = self.sell(session, serial).await?,
            Some(false) if hive.is_sold => hive = self.unsell(session, serial).await?,
            _ => {}
        }

        Ok(hive)
    }

    async fn delete(&self, session: &Session, serial: &str) -> Result<(), BeehiveError> {
        let request = Self::authorized(self.client.delete(self.hive_url(serial, None)), session)?;
        self.send(request, serial).await?;
        info!(serial = %serial, "Deleted beehive on backend");
        Ok(())
    }

    async fn find_by_serial(
        &self,
        session: &Session,
        serial: &str,
    ) -> Result<Option<Beehive>, BeehiveError> {
        let request = Self::authorized(self.client.get(self.hive_url(serial, None)), session)?;
        match self.send_json::<Beehive>(request, serial).await {
            Ok(hive) => Ok(Some(hive)),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Beehive>, BeehiveError> {
        let url = self.url(&format!("/beehive/{}", urlencoding::encode(token)));
        match self
            .send_json::<PublicHiveResponse>(self.client.get(url), token)
            .await
        {
            Ok(body) => Ok(Some(body.beehive)),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn sell(&self, session: &Session, serial: &str) -> Result<Beehive, BeehiveError> {
        let request = Self::authorized(
            self.client.post(self.hive_url(serial, Some("sell"))),
            session,
        )?;
        Ok(self.send_json(request, serial).await?)
    }

    async fn unsell(&self, session: &Session, serial: &str) -> Result<Beehive, BeehiveError> {
        let request = Self::authorized(
            self.client.post(self.hive_url(serial, Some("unsell"))),
            session,
        )?;
        Ok(self.send_json(request, serial).await?)
    }

    async fn stats(&self, session: &Session) -> Result<HiveStats, BeehiveError> {
        let request = Self::authorized(self.client.get(self.url("/stats")), session)?;
        Ok(self.send_json(request, "stats").await?)
    }

    async fn export_qr_pdf(
        &self,
        session: &Session,
        serials: &[String],
    ) -> Result<Vec<u8>, BeehiveError> {
        let request = self
            .client
            .post(self.url("/export_bulk_qr_pdf"))
            .json(&json!({ "serial_numbers": serials }));
        let request = Self::authorized(request, session)?;
        let response = self.send(request, "QR export").await?;
        let bytes = response.bytes().await.map_err(ClientError::from)?;
        Ok(bytes.to_vec())
    }
}

/// Session gate backed by the remote `/auth` endpoints.
pub struct RemoteSessionGate {
    client: BackendClient,
    store: Store,
}

impl RemoteSessionGate {
    #[must_use]
    pub const fn new(client: BackendClient, store: Store) -> Self {
        Self { client, store }
    }

    /// Drops the stored session after the backend rejected its token.
    pub async fn expire(&self) -> Result<(), AuthError> {
        warn!("Backend rejected the stored session, logging out");
        self.store.clear_session().await?;
        Ok(())
    }
}

#[async_trait]
impl SessionGate for RemoteSessionGate {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.store.current_session().await?)
    }

    async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        validation::validate_credentials(username, password)?;

        let session = match self.client.login(username, password).await {
            Ok(session) => session,
            Err(ClientError::Unauthorized) => {
                warn!(username = %username, "Failed login attempt");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        self.store.save_session(&session).await?;
        info!(username = %username, "Logged in to backend");
        Ok(session)
    }

    async fn logout(&self) -> Result<(), AuthError> {
        if let Some(session) = self.store.current_session().await? {
            if let Err(e) = self.client.logout(&session).await {
                debug!(error = %e, "Backend logout failed, clearing local session anyway");
            }
        }
        self.store.clear_session().await?;
        info!("Logged out");
        Ok(())
    }

    async fn is_setup_complete(&self) -> Result<bool, AuthError> {
        Ok(self.store.setup_complete().await?)
    }

    async fn set_setup_complete(&self, complete: bool) -> Result<(), AuthError> {
        self.store.set_setup_complete(complete).await?;
        Ok(())
    }

    async fn refresh(&self, session: &Session) -> Result<Session, AuthError> {
        let user = match self.client.me(session).await {
            Ok(user) => user,
            Err(ClientError::Unauthorized) => {
                self.expire().await?;
                return Err(AuthError::SessionExpired);
            }
            Err(e) => return Err(e.into()),
        };

        let refreshed = Session {
            user,
            token: session.token.clone(),
        };
        self.store.save_session(&refreshed).await?;
        Ok(refreshed)
    }

    async fn update_profile(
        &self,
        session: &Session,
        patch: ProfilePatch,
    ) -> Result<Session, AuthError> {
        validation::validate_profile(&patch)?;

        let user = match self.client.update_profile(session, &patch).await {
            Ok(user) => user,
            Err(ClientError::Unauthorized) => {
                self.expire().await?;
                return Err(AuthError::SessionExpired);
            }
            Err(e) => return Err(e.into()),
        };

        let updated = Session {
            user,
            token: session.token.clone(),
        };
        self.store.save_session(&updated).await?;
        Ok(updated)
    }
}

//! REST client for the user service and the paginated reference API.

use async_trait::async_trait;
use holocron_core::{Page, Patch, RecordError, RecordId, UserRecord};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid record: {0}")]
    Record(#[from] RecordError),
    #[error("Config error: {0}")]
    Config(String),
}

/// Operations on the signed-in user's record.
#[async_trait]
pub trait UserApi: Send + Sync {
    /// Send `patch` for the record identified by `original`, authorized with
    /// the token carried by `original`. Returns the server's record.
    async fn patch_user(
        &self,
        original: &UserRecord,
        patch: &Patch,
    ) -> Result<UserRecord, ApiClientError>;

    /// Load the current server copy of `user`.
    async fn get_user(&self, user: &UserRecord) -> Result<UserRecord, ApiClientError>;
}

/// Source of collection pages addressed by absolute URL.
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<Page<T>, ApiClientError>;
}

#[derive(Serialize)]
struct PatchUserRequest<'a> {
    patch: &'a Patch,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: UserRecord,
}

#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
}

impl RestClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, ApiClientError> {
        if base_url.trim().is_empty() {
            return Err(ApiClientError::Config("base_url must not be empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `PATCH /user/{id}` with `{ "patch": [...] }`, expecting `{ "user": {...} }`.
    ///
    /// A missing id leaves the path segment empty and a missing token sends
    /// no `Authorization` header; the server decides what to make of it.
    pub async fn patch_user_by_id(
        &self,
        id: Option<&RecordId>,
        token: Option<&str>,
        patch: &Patch,
    ) -> Result<UserRecord, ApiClientError> {
        let url = self.user_url(id);
        tracing::debug!(%url, ops = patch.len(), "sending user patch");
        let response = self
            .client
            .patch(url)
            .headers(auth_header(token)?)
            .json(&PatchUserRequest { patch })
            .send()
            .await?;
        let envelope: UserEnvelope = parse_response(response).await?;
        Ok(envelope.user)
    }

    /// `GET /user/{id}`, expecting `{ "user": {...} }`.
    pub async fn get_user_by_id(
        &self,
        id: Option<&RecordId>,
        token: Option<&str>,
    ) -> Result<UserRecord, ApiClientError> {
        let url = self.user_url(id);
        let response = self
            .client
            .get(url)
            .headers(auth_header(token)?)
            .send()
            .await?;
        let envelope: UserEnvelope = parse_response(response).await?;
        Ok(envelope.user)
    }

    fn user_url(&self, id: Option<&RecordId>) -> String {
        match id {
            Some(id) => format!("{}/user/{}", self.base_url, id),
            None => format!("{}/user/", self.base_url),
        }
    }

    /// Fetch one collection page by absolute URL.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Page<T>, ApiClientError> {
        tracing::debug!(%url, "fetching page");
        let response = self.client.get(url).send().await?;
        parse_response(response).await
    }
}

#[async_trait]
impl UserApi for RestClient {
    async fn patch_user(
        &self,
        original: &UserRecord,
        patch: &Patch,
    ) -> Result<UserRecord, ApiClientError> {
        self.patch_user_by_id(original.id().as_ref(), original.token(), patch)
            .await
    }

    async fn get_user(&self, user: &UserRecord) -> Result<UserRecord, ApiClientError> {
        self.get_user_by_id(user.id().as_ref(), user.token()).await
    }
}

#[async_trait]
impl<T> PageSource<T> for RestClient
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, url: &str) -> Result<Page<T>, ApiClientError> {
        self.get_page(url).await
    }
}

/// Authorization header carrying the record's bearer token.
pub fn jwt_header(token: &str) -> Result<HeaderMap, ApiClientError> {
    let mut headers = HeaderMap::new();
    let value = format!("Bearer {}", token);
    headers.insert(
        HeaderName::from_static("authorization"),
        HeaderValue::from_str(&value).map_err(|e| ApiClientError::Config(e.to_string()))?,
    );
    Ok(headers)
}

fn auth_header(token: Option<&str>) -> Result<HeaderMap, ApiClientError> {
    match token {
        Some(token) => jwt_header(token),
        None => Ok(HeaderMap::new()),
    }
}

async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiClientError> {
    let status = response.status();
    if status.is_success() {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice::<T>(&bytes)?)
    } else {
        let body = response.text().await?;
        Err(ApiClientError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

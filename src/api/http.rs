//! reqwest-backed implementation of [`UserService`].
//!
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Response, header};
use tracing::{debug, instrument};
use url::Url;

use super::{User, UserDraft, UserId, UserService};
use crate::error::{ApiError, ApiResult};

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Default endpoint of a locally running backend.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Stateless client for the `/users` collection under a base URL.
#[derive(Clone, Debug)]
pub struct HttpUserService {
    client: Client,
    base: Url,
}

impl HttpUserService {
    /// Build a client for `base_url`, which must be an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|e| anyhow!("invalid API URL {base_url}: {e}"))?;
        match base.scheme() {
            "http" | "https" => {}
            other => return Err(anyhow!("invalid API URL {base_url}: unsupported scheme {other}")),
        }
        if base.cannot_be_a_base() || base.host().is_none() {
            return Err(anyhow!("invalid API URL {base_url}: no host specified"));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `base` + `/users` (+ `/{id}`), keeping any path prefix of the base URL.
    fn endpoint(&self, id: Option<&UserId>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("users");
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        url
    }
}

/// Turn a non-2xx response into the matching [`ApiError`].
async fn check(response: Response, subject: &str) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    debug!(%status, body = %message.trim(), "request rejected");
    Err(ApiError::from_status(status, message.trim(), subject))
}

#[async_trait]
impl UserService for HttpUserService {
    #[instrument(skip(self), fields(base = %self.base))]
    async fn list_users(&self) -> ApiResult<Vec<User>> {
        let response = self.client.get(self.endpoint(None)).send().await?;
        // An empty collection may come back as `null`.
        let users: Option<Vec<User>> = check(response, "").await?.json().await?;
        Ok(users.unwrap_or_default())
    }

    #[instrument(skip(self), fields(base = %self.base))]
    async fn get_user(&self, id: &UserId) -> ApiResult<User> {
        let response = self.client.get(self.endpoint(Some(id))).send().await?;
        Ok(check(response, id.as_str()).await?.json().await?)
    }

    #[instrument(skip(self), fields(base = %self.base))]
    async fn create_user(&self, draft: &UserDraft) -> ApiResult<User> {
        let response = self.client.post(self.endpoint(None)).json(draft).send().await?;
        let user: User = check(response, "").await?.json().await?;
        debug!(id = %user.id, "user created");
        Ok(user)
    }

    #[instrument(skip(self), fields(base = %self.base))]
    async fn update_user(&self, id: &UserId, draft: &UserDraft) -> ApiResult<User> {
        let response = self
            .client
            .put(self.endpoint(Some(id)))
            .json(draft)
            .send()
            .await?;
        Ok(check(response, id.as_str()).await?.json().await?)
    }

    #[instrument(skip(self), fields(base = %self.base))]
    async fn delete_user(&self, id: &UserId) -> ApiResult<()> {
        let response = self.client.delete(self.endpoint(Some(id))).send().await?;
        check(response, id.as_str()).await?;
        Ok(())
    }
}

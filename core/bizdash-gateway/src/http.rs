//! REST backend.
//!
//! Data families map to tables under `{base_url}/rest/v1/{family}`; auth
//! lives under `{base_url}/auth/v1`. One [`HttpBackend`] owns the HTTP client
//! and the access-token slot shared by every gateway it hands out, so data
//! requests carry the signed-in user's bearer token.

use async_trait::async_trait;
use bizdash_model::{Credentials, Record, Session, UserProfile, decode_rows};
use bizdash_types::EntityId;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::gateway::{AuthGateway, RemoteGateway};
use crate::{GatewayConfig, GatewayError, GatewayResult};

struct RestClient {
    config: GatewayConfig,
    client: Client,
    session: RwLock<Option<Session>>,
}

impl RestClient {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.root(), path)
    }

    /// Request with the API key and, when signed in, the user's bearer token.
    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let bearer = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.config.api_key.clone());

        self.client
            .request(method, self.url(path))
            .header("apikey", &self.config.api_key)
            .bearer_auth(bearer)
    }
}

/// Maps non-success statuses to [`GatewayError`].
async fn check(response: Response) -> GatewayResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Unauthorized(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            GatewayError::Validation(message)
        }
        _ => GatewayError::Http {
            status: status.as_u16(),
            message,
        },
    })
}

/// Owner of the HTTP client and shared session for all REST gateways.
#[derive(Clone)]
pub struct HttpBackend {
    rest: Arc<RestClient>,
}

impl HttpBackend {
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(GatewayError::Config("base_url is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            rest: Arc::new(RestClient {
                config,
                client,
                session: RwLock::new(None),
            }),
        })
    }

    /// Installs a previously persisted session.
    pub async fn set_session(&self, session: Option<Session>) {
        *self.rest.session.write().await = session;
    }

    /// Gateway for one entity family.
    pub fn gateway<E: Record>(&self) -> HttpGateway<E> {
        HttpGateway {
            rest: self.rest.clone(),
            _record: PhantomData,
        }
    }

    pub fn auth(&self) -> HttpAuthGateway {
        HttpAuthGateway {
            rest: self.rest.clone(),
        }
    }
}

/// REST [`RemoteGateway`] for one entity family.
pub struct HttpGateway<E: Record> {
    rest: Arc<RestClient>,
    _record: PhantomData<fn() -> E>,
}

impl<E: Record> HttpGateway<E> {
    fn table(&self) -> String {
        format!("/rest/v1/{}", E::FAMILY)
    }

    fn first_row(&self, rows: Vec<E>, id: Option<&EntityId>) -> GatewayResult<E> {
        match (rows.into_iter().next(), id) {
            (Some(row), _) => Ok(row),
            (None, Some(id)) => Err(GatewayError::NotFound {
                family: E::FAMILY,
                id: id.clone(),
            }),
            (None, None) => Err(GatewayError::Protocol(format!(
                "empty representation returned for {}",
                E::FAMILY
            ))),
        }
    }
}

#[async_trait]
impl<E: Record> RemoteGateway<E> for HttpGateway<E> {
    async fn list(&self) -> GatewayResult<Vec<E>> {
        debug!(family = E::FAMILY, "GET list");
        let response = self
            .rest
            .request(Method::GET, &self.table())
            .await
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;
        let rows: Value = check(response).await?.json().await?;
        Ok(decode_rows(rows)?)
    }

    async fn create(&self, draft: E::Draft) -> GatewayResult<E> {
        debug!(family = E::FAMILY, "POST create");
        let response = self
            .rest
            .request(Method::POST, &self.table())
            .await
            .header("Prefer", "return=representation")
            .json(&draft)
            .send()
            .await?;
        let rows: Value = check(response).await?.json().await?;
        self.first_row(decode_rows(rows)?, None)
    }

    async fn update(&self, id: &EntityId, patch: E::Patch) -> GatewayResult<E> {
        debug!(family = E::FAMILY, %id, "PATCH update");
        let filter = format!("eq.{id}");
        let response = self
            .rest
            .request(Method::PATCH, &self.table())
            .await
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;
        let rows: Value = check(response).await?.json().await?;
        self.first_row(decode_rows(rows)?, Some(id))
    }

    async fn delete(&self, id: &EntityId) -> GatewayResult<()> {
        debug!(family = E::FAMILY, %id, "DELETE");
        let filter = format!("eq.{id}");
        let response = self
            .rest
            .request(Method::DELETE, &self.table())
            .await
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=representation")
            .send()
            .await?;
        // The deleted representation is only counted, never decoded.
        let rows: Value = check(response).await?.json().await?;
        let deleted = rows.as_array().ok_or_else(|| {
            GatewayError::Protocol(format!("expected a list of deleted {} rows", E::FAMILY))
        })?;
        if deleted.is_empty() {
            return Err(GatewayError::NotFound {
                family: E::FAMILY,
                id: id.clone(),
            });
        }
        Ok(())
    }
}

/// Absolute expiry for a token valid for `secs` more seconds.
fn expiry_from_now(secs: i64) -> GatewayResult<DateTime<Utc>> {
    TimeDelta::try_seconds(secs)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| GatewayError::Protocol(format!("token expires_in out of range: {secs}")))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    user: WireUser,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    id: EntityId,
    email: String,
    #[serde(default)]
    user_metadata: WireUserMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct WireUserMetadata {
    display_name: Option<String>,
    full_name: Option<String>,
}

impl From<WireUser> for UserProfile {
    fn from(user: WireUser) -> Self {
        let meta = user.user_metadata;
        UserProfile {
            id: user.id,
            email: user.email,
            display_name: meta.display_name.or(meta.full_name),
        }
    }
}

/// REST [`AuthGateway`] using password grants.
pub struct HttpAuthGateway {
    rest: Arc<RestClient>,
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn current_session(&self) -> GatewayResult<Option<Session>> {
        let Some(stored) = self.rest.session.read().await.clone() else {
            return Ok(None);
        };
        if stored.is_expired(Utc::now()) {
            *self.rest.session.write().await = None;
            return Ok(None);
        }

        let response = self
            .rest
            .request(Method::GET, "/auth/v1/user")
            .await
            .send()
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            info!("stored session rejected by backend");
            *self.rest.session.write().await = None;
            return Ok(None);
        }
        let user: WireUser = check(response).await?.json().await?;

        let session = Session {
            user: user.into(),
            ..stored
        };
        session.validate()?;
        *self.rest.session.write().await = Some(session.clone());
        Ok(Some(session))
    }

    async fn sign_in(&self, credentials: &Credentials) -> GatewayResult<Session> {
        let response = self
            .rest
            .client
            .post(self.rest.url("/auth/v1/token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.rest.config.api_key)
            .json(credentials)
            .send()
            .await?;
        let token: TokenResponse = check(response).await?.json().await?;

        let expires_at = token.expires_in.map(expiry_from_now).transpose()?;
        let session = Session {
            user: token.user.into(),
            access_token: token.access_token,
            expires_at,
        };
        session.validate()?;
        info!(user = %session.user.id, "signed in");
        *self.rest.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> GatewayResult<()> {
        // Revoke with the current token, then forget it whatever the outcome.
        let request = self.rest.request(Method::POST, "/auth/v1/logout").await;
        *self.rest.session.write().await = None;
        check(request.send().await?).await?;
        Ok(())
    }
}

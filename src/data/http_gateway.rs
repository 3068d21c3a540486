use crate::domain::error::GatewayError;
use crate::domain::gateway::{AuthGateway, RecordGateway};
use crate::domain::models::{FinancialRecord, NewRecord, RecordPatch};
use crate::domain::session::Session;
use crate::domain::user::{CreateUser, LoginRequest};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

pub const DEFAULT_API_URL: &str = "http://localhost:3001";

/// reqwest-backed client for the finance API.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            GatewayError::Transport(format!("invalid API URL '{}': {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                GatewayError::Transport(format!("API URL '{}' cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "Request succeeded");
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error);
        warn!(status = status.as_u16(), message = ?message, "Request rejected");
        Err(GatewayError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

impl Default for HttpGateway {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

#[async_trait]
impl AuthGateway for HttpGateway {
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn login(&self, credentials: &LoginRequest) -> Result<Session, GatewayError> {
        let request = self
            .client
            .post(self.endpoint(&["auth", "login"])?)
            .json(credentials);
        Self::decode(self.send(request).await?).await
    }

    #[instrument(skip(self, request), fields(username = %request.username))]
    async fn register(&self, request: &CreateUser) -> Result<Session, GatewayError> {
        let request = self
            .client
            .post(self.endpoint(&["auth", "register"])?)
            .json(request);
        Self::decode(self.send(request).await?).await
    }
}

#[async_trait]
impl RecordGateway for HttpGateway {
    #[instrument(skip(self))]
    async fn fetch_all(&self, owner_id: &str) -> Result<serde_json::Value, GatewayError> {
        let url = self.endpoint(&["financial-records", "getAllByUserID", owner_id])?;
        Self::decode(self.send(self.client.get(url)).await?).await
    }

    #[instrument(skip(self, record), fields(owner_id = %record.owner_id))]
    async fn create(&self, record: &NewRecord) -> Result<FinancialRecord, GatewayError> {
        let request = self
            .client
            .post(self.endpoint(&["financial-records"])?)
            .json(record);
        Self::decode(self.send(request).await?).await
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: &str, patch: &RecordPatch) -> Result<RecordPatch, GatewayError> {
        let request = self
            .client
            .put(self.endpoint(&["financial-records", id])?)
            .json(patch);
        Self::decode(self.send(request).await?).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<(), GatewayError> {
        let request = self
            .client
            .delete(self.endpoint(&["financial-records", id])?);
        self.send(request).await?;
        Ok(())
    }
}

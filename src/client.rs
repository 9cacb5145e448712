use anyhow::{Context, anyhow};
use reqwest::{RequestBuilder, StatusCode, header::CONTENT_TYPE};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    auth::Credentials,
    player::{PlayerCreateRequest, PlayerId, PlayerLookupRequest},
};

pub const LOGIN_PATH: &str = "/api/tester/login";
pub const CREATE_PATH: &str = "/api/automationTask/create";
pub const GET_ONE_PATH: &str = "/api/automationTask/getOne";
pub const GET_ALL_PATH: &str = "/api/automationTask/getAll";
pub const DELETE_PATH: &str = "/api/automationTask/deleteOne";

/// Status and body of a finished request. The client never judges these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    status: StatusCode,
    body: String,
}

impl ApiResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            anyhow!(
                "Failed to deserialize {}: {:?}, error: {:?}",
                std::any::type_name::<T>(),
                self.body,
                e
            )
        })
    }

    pub fn value(&self) -> anyhow::Result<serde_json::Value> {
        self.json()
    }
}

/// Thin wrapper over the player API. Every call is one round-trip; transport
/// failures come back as errors, any HTTP status comes back as a response.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// An empty `token` means requests go out without `Authorization`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn anonymous(base_url: impl Into<String>) -> Self {
        Self::new(base_url, "")
    }

    /// Same base URL and connection pool, different token.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            base_url: self.base_url.clone(),
            token: token.into(),
            client: self.client.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn url_path(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(CONTENT_TYPE, "application/json");
        if self.token.is_empty() {
            request
        } else {
            request.bearer_auth(&self.token)
        }
    }

    fn json_body<T: Serialize>(payload: &T) -> anyhow::Result<String> {
        serde_json::to_string(payload).context("Failed to serialize request body")
    }

    async fn send(&self, what: &str, request: RequestBuilder) -> anyhow::Result<ApiResponse> {
        let response = request
            .send()
            .await
            .map_err(|e| anyhow!("Failed to send {} request: {:?}", what, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| anyhow!("Error receiving {} response body: {:?}", what, e))?;
        debug!(status = status.as_u16(), body = %body, "Received {} response", what);
        Ok(ApiResponse { status, body })
    }

    /// Always anonymous, whatever token this client holds.
    pub async fn login(&self, credentials: &Credentials) -> anyhow::Result<ApiResponse> {
        debug!(payload = ?credentials, "Sending login request");
        let request = self
            .client
            .post(self.url_path(LOGIN_PATH))
            .header(CONTENT_TYPE, "application/json")
            .body(Self::json_body(credentials)?);
        self.send("login", request).await
    }

    pub async fn create_player(&self, player: &PlayerCreateRequest) -> anyhow::Result<ApiResponse> {
        debug!(payload = ?player, "Sending create player request");
        let request = self
            .authorized(self.client.post(self.url_path(CREATE_PATH)))
            .body(Self::json_body(player)?);
        self.send("create player", request).await
    }

    pub async fn get_one_player(
        &self,
        lookup: &PlayerLookupRequest,
    ) -> anyhow::Result<ApiResponse> {
        debug!(payload = ?lookup, "Sending get one player request");
        let request = self
            .authorized(self.client.post(self.url_path(GET_ONE_PATH)))
            .body(Self::json_body(lookup)?);
        self.send("get one player", request).await
    }

    pub async fn get_all_players(&self) -> anyhow::Result<ApiResponse> {
        debug!("Sending get all players request");
        let request = self.authorized(self.client.get(self.url_path(GET_ALL_PATH)));
        self.send("get all players", request).await
    }

    pub async fn delete_player(&self, id: PlayerId) -> anyhow::Result<ApiResponse> {
        debug!(%id, "Sending delete player request");
        let request = self.authorized(
            self.client
                .delete(self.url_path(&format!("{DELETE_PATH}/{id}"))),
        );
        self.send("delete player", request).await
    }
}

use crate::room::messages::CreateRoomResponse;
use crate::room::{CreateRoomRequest, RoomBackend, RoomDescriptor, RoomList, RoomLookup, RoomSettings};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

/// REST client for the room backend
pub struct HttpRoomClient {
    http: Client,
    base_url: String,
}

impl HttpRoomClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        info!("Room backend at {}", base_url);

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-success status into an error carrying the server's message.
    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Backend answered {}: {}", status, body.trim());
        }

        response.json::<T>().await.context("Unexpected response from the backend")
    }

    fn unreachable(&self) -> String {
        format!(
            "No response from the backend. Check that a backend is running at {}",
            self.base_url
        )
    }
}

#[async_trait]
impl RoomBackend for HttpRoomClient {
    async fn create_room(&self, request: &CreateRoomRequest) -> Result<RoomDescriptor> {
        debug!("POST /rooms {}", request.room_id);

        let response = self
            .http
            .post(self.url("/rooms"))
            .json(request)
            .send()
            .await
            .with_context(|| self.unreachable())?;

        let created: CreateRoomResponse = self.decode(response).await?;
        Ok(created.room)
    }

    async fn get_room(&self, room_id: &str) -> Result<RoomLookup> {
        debug!("GET /rooms/{}", room_id);

        let response = self
            .http
            .get(self.url(&format!("/rooms/{room_id}")))
            .send()
            .await
            .with_context(|| self.unreachable())?;

        self.decode(response).await
    }

    async fn list_rooms(&self) -> Result<RoomList> {
        let response = self
            .http
            .get(self.url("/rooms"))
            .send()
            .await
            .with_context(|| self.unreachable())?;

        self.decode(response).await
    }

    async fn default_settings(&self) -> Result<RoomSettings> {
        let response = self
            .http
            .get(self.url("/settings"))
            .send()
            .await
            .with_context(|| self.unreachable())?;

        self.decode(response).await
    }
}

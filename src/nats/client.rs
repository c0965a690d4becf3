use super::messages::{subject, transcript_subject, DISCONNECT_USER, JOIN, ON_PAGE};
use crate::room::messages::decode_disconnect_ack;
use crate::room::{Channel, DisconnectRequest, JoinAck, JoinRequest};
use anyhow::{Context, Result};
use async_nats::Client;
use async_trait::async_trait;
use tracing::{debug, info};

/// Room channel over NATS.
///
/// Fire-and-forget events are plain publishes; acknowledged events use
/// request/reply and the reply payload is the acknowledgment.
pub struct NatsChannel {
    client: Client,
    subject_prefix: String,
}

impl NatsChannel {
    /// Connect to NATS server
    pub async fn connect(url: &str, subject_prefix: &str) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self::from_client(client, subject_prefix))
    }

    pub fn from_client(client: Client, subject_prefix: &str) -> Self {
        Self {
            client,
            subject_prefix: subject_prefix.to_string(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Subscribe to transcript messages for one room
    pub async fn subscribe_transcripts(&self, room_id: &str) -> Result<async_nats::Subscriber> {
        let subject = transcript_subject(&self.subject_prefix, room_id);

        info!("Subscribing to transcripts on {}", subject);

        let subscriber = self
            .client
            .subscribe(subject)
            .await
            .context("Failed to subscribe to transcripts")?;

        Ok(subscriber)
    }
}

#[async_trait]
impl Channel for NatsChannel {
    async fn notify_page(&self, page: &str) -> Result<()> {
        let subject = subject(&self.subject_prefix, ON_PAGE);
        debug!("Publishing {} to {}", page, subject);

        self.client
            .publish(subject, page.as_bytes().to_vec().into())
            .await
            .context("Failed to publish on-page")?;

        Ok(())
    }

    async fn join(&self, request: &JoinRequest) -> Result<JoinAck> {
        let payload = serde_json::to_vec(request)?;

        let reply = self
            .client
            .request(subject(&self.subject_prefix, JOIN), payload.into())
            .await
            .context("Join request failed")?;

        JoinAck::from_payload(&reply.payload)
    }

    async fn disconnect_user(&self, request: &DisconnectRequest) -> Result<bool> {
        let payload = serde_json::to_vec(request)?;

        let reply = self
            .client
            .request(subject(&self.subject_prefix, DISCONNECT_USER), payload.into())
            .await
            .context("Disconnect request failed")?;

        Ok(decode_disconnect_ack(&reply.payload))
    }
}

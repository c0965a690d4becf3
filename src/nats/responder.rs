//! Channel side of the development backend: answers join and disconnect
//! requests from the in-memory room registry.

use super::messages::{subject, DISCONNECT_USER, JOIN, ON_PAGE};
use crate::http::AppState;
use crate::room::{DisconnectRequest, JoinAck, JoinRequest};
use anyhow::{Context, Result};
use async_nats::Client;
use futures::stream::StreamExt;
use tracing::{debug, info, warn};

/// Answer a raw join payload.
pub async fn handle_join(state: &AppState, payload: &[u8]) -> JoinAck {
    match serde_json::from_slice::<JoinRequest>(payload) {
        Ok(request) => state.rooms.write().await.join(&request),
        Err(e) => {
            warn!("Malformed join request: {}", e);
            JoinAck::rejected("malformed join request.")
        }
    }
}

/// Answer a raw disconnect payload.
pub async fn handle_disconnect(state: &AppState, payload: &[u8]) -> bool {
    match serde_json::from_slice::<DisconnectRequest>(payload) {
        Ok(request) => state.rooms.write().await.disconnect_user(&request.user_id),
        Err(e) => {
            warn!("Malformed disconnect request: {}", e);
            false
        }
    }
}

/// Serve channel requests until the subscriptions close.
pub async fn serve(client: Client, subject_prefix: &str, state: AppState) -> Result<()> {
    let mut pages = client
        .subscribe(subject(subject_prefix, ON_PAGE))
        .await
        .context("Failed to subscribe to on-page")?;
    let mut joins = client
        .subscribe(subject(subject_prefix, JOIN))
        .await
        .context("Failed to subscribe to join")?;
    let mut disconnects = client
        .subscribe(subject(subject_prefix, DISCONNECT_USER))
        .await
        .context("Failed to subscribe to disconnect-user")?;

    info!("Serving room channel on {}.*", subject_prefix);

    loop {
        tokio::select! {
            Some(msg) = pages.next() => {
                debug!("Client on page {}", String::from_utf8_lossy(&msg.payload));
            }
            Some(msg) = joins.next() => {
                let ack = handle_join(&state, &msg.payload).await;
                if let Some(reply) = msg.reply {
                    client
                        .publish(reply, serde_json::to_vec(&ack)?.into())
                        .await
                        .context("Failed to answer join")?;
                }
            }
            Some(msg) = disconnects.next() => {
                let ok = handle_disconnect(&state, &msg.payload).await;
                if let Some(reply) = msg.reply {
                    client
                        .publish(reply, serde_json::to_vec(&ok)?.into())
                        .await
                        .context("Failed to answer disconnect-user")?;
                }
            }
            else => break,
        }
    }

    info!("Room channel closed");

    Ok(())
}

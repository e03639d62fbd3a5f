use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use heatvote_core::types::DbId;
use heatvote_events::{BroadcastHub, HubMessage};

use crate::error::AppResult;
use crate::handlers::require_floorplan;
use crate::state::AppState;

/// GET /api/v1/floorplans/{id}/ws
///
/// Upgrades to a WebSocket that receives every vote accepted on the
/// floor-plan from now on, one JSON text frame per vote. Nothing is
/// replayed: clients load the current state through the REST endpoints.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(floorplan_id): Path<DbId>,
) -> AppResult<Response> {
    require_floorplan(&state, floorplan_id).await?;
    let hub = Arc::clone(&state.hub);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, hub, floorplan_id)))
}

/// The frame a hub message is written as. `None` when a vote cannot be
/// encoded; the message is skipped.
pub(crate) fn frame_for(msg: &HubMessage) -> Option<Message> {
    match msg {
        HubMessage::Vote(vote) => match serde_json::to_string(vote.as_ref()) {
            Ok(json) => Some(Message::Text(json.into())),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize vote broadcast");
                None
            }
        },
        HubMessage::Ping => Some(Message::Ping(Bytes::new())),
        HubMessage::Close => Some(Message::Close(None)),
    }
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Subscribes to the hub for this floor-plan.
///   2. Spawns a sender task that forwards hub messages to the sink.
///   3. Processes inbound frames on the current task.
///   4. Unsubscribes on disconnect.
async fn handle_socket(socket: WebSocket, hub: Arc<BroadcastHub>, floorplan_id: DbId) {
    let mut subscription = hub.subscribe(floorplan_id).await;
    let subscriber_id = subscription.id();
    tracing::info!(floorplan_id, subscriber_id, "WebSocket connected");

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward hub messages to the WebSocket sink.
    let send_task = tokio::spawn(async move {
        while let Some(msg) = subscription.recv().await {
            let Some(frame) = frame_for(&msg) else {
                continue;
            };
            let closing = matches!(frame, Message::Close(_));
            if sink.send(frame).await.is_err() {
                tracing::debug!(subscriber_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    // Receiver loop: the client only ever sends control frames.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(subscriber_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(subscriber_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Deregister before tearing down so no further vote is queued.
    hub.unsubscribe(floorplan_id, subscriber_id).await;
    send_task.abort();
    tracing::info!(floorplan_id, subscriber_id, "WebSocket disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};
    use heatvote_db::models::vote::PublicVote;
    use heatvote_events::VoteBroadcast;

    #[test]
    fn vote_becomes_json_text_frame_with_public_fields() {
        let created_at = Utc.with_ymd_and_hms(2025, 8, 20, 12, 0, 0).unwrap();
        let msg = HubMessage::Vote(Arc::new(VoteBroadcast {
            floorplan_id: 3,
            vote: PublicVote {
                id: 41,
                x: 120,
                y: 80,
                value: -1,
                created_at,
            },
        }));

        let text = match frame_for(&msg) {
            Some(Message::Text(text)) => text,
            other => panic!("expected a text frame, got {other:?}"),
        };
        let json: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(json["floorplan_id"], 3);
        assert_eq!(json["id"], 41);
        assert_eq!(json["x"], 120);
        assert_eq!(json["y"], 80);
        assert_eq!(json["value"], -1);
        assert!(json.get("visitor_id").is_none());
        assert!(json.get("ip_address").is_none());
    }

    #[test]
    fn ping_and_close_map_to_control_frames() {
        assert_matches!(frame_for(&HubMessage::Ping), Some(Message::Ping(p)) if p.is_empty());
        assert_matches!(frame_for(&HubMessage::Close), Some(Message::Close(None)));
    }
}

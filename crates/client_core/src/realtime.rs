//! Owner-filtered change feed over the hosted realtime socket (Phoenix
//! channel frames, protocol `vsn=1.0.0`).

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::json;
use shared::{
    domain::UserId,
    protocol::{ChangeEvent, PhoenixFrame, PostgresChangesPayload},
};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::{
    error::{ClientError, Result},
    remote::Subscription,
    supabase::SupabaseConfig,
};

pub const CHANNEL_TOPIC: &str = "realtime:user-bookmarks";
const SOCKET_TOPIC: &str = "phoenix";
const EVENT_CAPACITY: usize = 64;
const JOIN_REF: &str = "1";

pub fn socket_url(config: &SupabaseConfig) -> Result<String> {
    let base = config.endpoint("realtime/v1/websocket");
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        return Err(ClientError::Config(
            "project url must start with http:// or https://".to_string(),
        ));
    };
    let mut url =
        url::Url::parse(&ws_base).map_err(|err| ClientError::Config(err.to_string()))?;
    url.query_pairs_mut()
        .append_pair("apikey", &config.anon_key)
        .append_pair("vsn", "1.0.0");
    Ok(url.into())
}

pub fn owner_filter(owner: UserId) -> String {
    format!("user_id=eq.{owner}")
}

pub fn join_frame(owner: UserId, access_token: &str) -> PhoenixFrame {
    PhoenixFrame::new(
        CHANNEL_TOPIC,
        "phx_join",
        json!({
            "config": {
                "broadcast": {"ack": false, "self": false},
                "presence": {"key": ""},
                "postgres_changes": [{
                    "event": "*",
                    "schema": "public",
                    "table": "bookmarks",
                    "filter": owner_filter(owner),
                }],
            },
            "access_token": access_token,
        }),
    )
    .with_ref(JOIN_REF)
    .with_join_ref(JOIN_REF)
}

fn heartbeat_frame(reference: u64) -> PhoenixFrame {
    PhoenixFrame::new(SOCKET_TOPIC, "heartbeat", json!({})).with_ref(reference.to_string())
}

fn leave_frame(reference: u64) -> PhoenixFrame {
    PhoenixFrame::new(CHANNEL_TOPIC, "phx_leave", json!({}))
        .with_ref(reference.to_string())
        .with_join_ref(JOIN_REF)
}

/// Frames that matter to the feed once the channel is joined.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedFrame {
    Change(ChangeEvent),
    Closed(String),
    Ignored,
}

pub fn decode_frame(raw: &str) -> FeedFrame {
    let Ok(frame) = serde_json::from_str::<PhoenixFrame>(raw) else {
        return FeedFrame::Ignored;
    };
    if frame.topic != CHANNEL_TOPIC {
        return FeedFrame::Ignored;
    }
    match frame.event.as_str() {
        "postgres_changes" => {
            match serde_json::from_value::<PostgresChangesPayload>(frame.payload) {
                Ok(payload) => FeedFrame::Change(payload.data.into()),
                Err(err) => {
                    warn!("realtime: undecodable change payload: {err}");
                    FeedFrame::Ignored
                }
            }
        }
        "phx_error" => FeedFrame::Closed("channel error".to_string()),
        "phx_close" => FeedFrame::Closed("channel closed by server".to_string()),
        _ => FeedFrame::Ignored,
    }
}

fn encode(frame: &PhoenixFrame) -> Result<Message> {
    serde_json::to_string(frame)
        .map(Message::Text)
        .map_err(|err| ClientError::Realtime(err.to_string()))
}

/// Connects, joins the owner-filtered channel and waits for the join reply
/// before handing the feed to a background task.
pub async fn subscribe(
    socket_url: &str,
    access_token: &str,
    owner: UserId,
    heartbeat_interval: Duration,
) -> Result<Subscription> {
    let (stream, _) = connect_async(socket_url)
        .await
        .map_err(|err| ClientError::Realtime(format!("failed to connect websocket: {err}")))?;
    let (mut writer, mut reader) = stream.split();

    writer
        .send(encode(&join_frame(owner, access_token))?)
        .await
        .map_err(|err| ClientError::Realtime(err.to_string()))?;

    loop {
        let Some(message) = reader.next().await else {
            return Err(ClientError::Realtime(
                "socket closed while joining channel".to_string(),
            ));
        };
        let message = message.map_err(|err| ClientError::Realtime(err.to_string()))?;
        let Message::Text(raw) = message else {
            continue;
        };
        let Ok(frame) = serde_json::from_str::<PhoenixFrame>(&raw) else {
            continue;
        };
        if frame.topic != CHANNEL_TOPIC || frame.reference.as_deref() != Some(JOIN_REF) {
            continue;
        }
        match frame.reply_status() {
            Some("ok") => break,
            Some(status) => {
                let reason = frame
                    .payload
                    .pointer("/response/reason")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or(status)
                    .to_string();
                return Err(ClientError::Realtime(format!("join rejected: {reason}")));
            }
            None => continue,
        }
    }
    info!(owner = %owner, topic = CHANNEL_TOPIC, "realtime: joined channel");

    let (events_tx, events_rx) = mpsc::channel(EVENT_CAPACITY);
    let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(heartbeat_interval);
        heartbeat.tick().await;
        let mut next_ref: u64 = 2;

        loop {
            tokio::select! {
                _ = &mut cancel_rx => {
                    if let Ok(leave) = encode(&leave_frame(next_ref)) {
                        let _ = writer.send(leave).await;
                    }
                    let _ = writer.close().await;
                    debug!(owner = %owner, "realtime: left channel");
                    break;
                }
                _ = heartbeat.tick() => {
                    let Ok(frame) = encode(&heartbeat_frame(next_ref)) else {
                        break;
                    };
                    next_ref += 1;
                    if let Err(err) = writer.send(frame).await {
                        warn!(owner = %owner, "realtime: heartbeat failed: {err}");
                        break;
                    }
                }
                message = reader.next() => match message {
                    Some(Ok(Message::Text(raw))) => match decode_frame(&raw) {
                        FeedFrame::Change(event) => {
                            if events_tx.send(event).await.is_err() {
                                break;
                            }
                        }
                        FeedFrame::Closed(reason) => {
                            warn!(owner = %owner, "realtime: {reason}");
                            break;
                        }
                        FeedFrame::Ignored => {}
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        warn!(owner = %owner, "realtime: socket closed");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        warn!(owner = %owner, "realtime: socket error: {err}");
                        break;
                    }
                },
            }
        }
    });

    Ok(Subscription::new(owner, events_rx, cancel_tx))
}

#[cfg(test)]
#[path = "tests/realtime_tests.rs"]
mod tests;

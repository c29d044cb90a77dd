use serde::Serialize;
use serde_json::Value;

use crate::common::ChatMessage;

/// Payload the client writes on the room socket.
#[derive(Debug, Serialize)]
pub struct OutboundFrame<'a> {
    pub message: &'a str,
}

/// One text frame received on a room socket.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomFrame {
    Message(ChatMessage),
    Notification(String),
}

/// Bare message objects and `{"type": "message", ...}` envelopes are
/// messages; `{"type": "notification", "content": ...}` is a notification.
pub fn decode_room_frame(text: &str) -> Result<RoomFrame, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;
    if value.get("type").and_then(Value::as_str) == Some("notification") {
        if let Some(content) = value.get("content").and_then(notification_text) {
            return Ok(RoomFrame::Notification(content));
        }
    }
    serde_json::from_value(value).map(RoomFrame::Message)
}

/// Text carried by a notification-channel frame: either `{"notification": ..}`
/// or a `{"type": "notification", "content": ..}` envelope. Other frames
/// yield `None`.
pub fn decode_notification(text: &str) -> Option<String> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("Undecodable notification frame: {err}");
            return None;
        }
    };

    if let Some(notification) = value.get("notification").and_then(notification_text) {
        return Some(notification);
    }
    if value.get("type").and_then(Value::as_str) == Some("notification") {
        return value.get("content").and_then(notification_text);
    }
    None
}

fn notification_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

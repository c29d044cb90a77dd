use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Một phòng chat giữa hai người tham gia.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRoom {
    pub oid: String,
    pub title: String,
    #[serde(default, deserialize_with = "lenient_id")]
    pub sender_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub receiver_id: Option<i64>,
    #[serde(default)]
    pub messages: Vec<Value>,
}

/// Domain model đại diện một tin nhắn chat.
///
/// History rows from REST carry every field. Frames pushed on the room
/// socket only carry `message`, `sender_id` and `receiver_id`, so the rest
/// is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub oid: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub sender_id: Option<i64>,
    #[serde(default)]
    pub sender_name: String,
    #[serde(alias = "message")]
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub receiver_id: Option<i64>,
}

impl ChatMessage {
    pub fn is_own(&self, current_user_id: i64) -> bool {
        self.sender_id == Some(current_user_id)
    }

    pub fn display_name(&self) -> String {
        if !self.sender_name.is_empty() {
            return self.sender_name.clone();
        }
        match self.sender_id {
            Some(id) => format!("User {id}"),
            None => "Unknown".to_string(),
        }
    }

    /// `created_at` rendered in local time, or the raw string when it is not
    /// a timestamp we recognise.
    pub fn display_time(&self) -> Option<String> {
        let raw = self.created_at.as_deref()?;
        let local = match DateTime::parse_from_rfc3339(raw) {
            Ok(parsed) => parsed.with_timezone(&Local),
            Err(_) => match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
                Ok(naive) => Utc.from_utc_datetime(&naive).with_timezone(&Local),
                Err(_) => return Some(raw.to_string()),
            },
        };
        Some(local.format("%d/%m/%Y %H:%M:%S").to_string())
    }
}

/// Body of `POST /communications/chatrooms/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChatRoom {
    pub title: String,
    pub sender_id: i64,
    pub receiver_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedRoom {
    pub room_oid: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostedMessage {
    #[serde(default, alias = "oid")]
    pub message_id: Option<String>,
}

/// Reads an id that the backend may send either as a JSON number or as a
/// numeric string.
pub fn id_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(id_from_value))
}

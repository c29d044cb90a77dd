use uuid::Uuid;

use crate::network::SocketState;

use super::types::{ChatMessage, ChatRoom};

/// Sự kiện từ tầng mạng gửi lên UI.
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    SessionRestored {
        has_token: bool,
        user_id: Option<i64>,
    },
    LoginSucceeded {
        user_id: Option<i64>,
    },
    LoginFailed,
    LoggedOut,
    ChatsLoaded(Vec<ChatRoom>),
    RoomCreated {
        room_oid: String,
    },
    RoomCreateFailed(String),
    HistoryLoaded {
        room_oid: String,
        messages: Vec<ChatMessage>,
    },
    HistoryFailed {
        room_oid: String,
    },
    MessageReceived {
        room_oid: String,
        message: ChatMessage,
    },
    /// Notification received while `room_oid` was mounted.
    NotificationReceived {
        room_oid: String,
        text: String,
    },
    /// A new sender socket exists for `room_oid`; later `SenderStatus`
    /// events from any other socket are stale.
    SenderMounted {
        room_oid: String,
        socket: Uuid,
    },
    SenderStatus {
        socket: Uuid,
        state: SocketState,
    },
    SenderFeedback(String),
}

use super::types::NewChatRoom;

/// Lệnh UI gửi xuống tầng mạng.
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Đọc token đã lưu và giải mã user id
    RestoreSession,
    Login {
        email: String,
        password: String,
    },
    Logout,
    FetchChats,
    CreateChatRoom(NewChatRoom),
    /// Mở màn hình phòng chat:
    /// - tải lịch sử qua REST
    /// - mở socket của phòng và socket thông báo
    MountRoom {
        room_oid: String,
    },
    UnmountRoom,
    /// The sender keeps its own room socket, separate from the one opened by
    /// `MountRoom`.
    MountSender {
        room_oid: String,
    },
    UnmountSender,
    SendMessage(String),
}

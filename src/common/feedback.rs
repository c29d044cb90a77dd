//! Fixed user-facing strings. Failures never surface more detail than these.

pub const LOGIN_OK: &str = "Login successful!";
pub const LOGIN_FAILED: &str = "Failed to login. Check the logs for details.";
pub const LOGIN_INVALID_EMAIL: &str = "Please enter a valid email address.";
pub const LOGIN_MISSING_PASSWORD: &str = "Please enter your password.";

pub const ROOM_CREATED: &str = "Chat room created successfully!";
pub const ROOM_CREATE_FAILED: &str = "Failed to create chat room.";
pub const ROOM_NEEDS_LOGIN: &str = "Please log in to create a chat room.";
pub const ROOM_MISSING_TITLE: &str = "Please enter a chat room title.";
pub const ROOM_INVALID_SENDER: &str = "Sender ID must be a number.";
pub const ROOM_INVALID_RECEIVER: &str = "Receiver ID must be a number.";

pub const SENDER_NO_TOKEN: &str = "No authentication token found.";
pub const SENDER_SENT: &str = "Message sent";
pub const SENDER_NOT_OPEN: &str = "WebSocket is not open";

pub const NO_CHATS: &str = "No chats available";
pub const NO_MESSAGES: &str = "No messages yet.";
pub const HISTORY_LOADING: &str = "Loading messages...";
pub const HISTORY_FAILED: &str = "Could not load messages.";
pub const USER_LOADING: &str = "Loading user data...";
pub const WELCOME: &str = "Welcome! Choose your chat or create a new one.";

pub mod commands;
pub mod events;
pub mod feedback;
pub mod types;

pub use commands::NetworkCommand;
pub use events::NetworkEvent;
pub use types::{
    AccessToken, ChatMessage, ChatRoom, CreatedRoom, Credentials, NewChatRoom, PostedMessage,
};

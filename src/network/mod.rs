pub mod client;
pub mod frames;
pub mod socket;

pub use client::{ChatClient, RoomView};
pub use socket::{SocketError, SocketEvent, SocketHandle, SocketState};

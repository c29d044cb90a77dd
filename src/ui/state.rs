use std::time::Instant;

use uuid::Uuid;

use crate::common::feedback;
use crate::common::{ChatMessage, ChatRoom, NetworkCommand, NetworkEvent};
use crate::network::SocketState;

use super::components::login_form::LoginForm;
use super::components::message_sender::SenderState;
use super::components::room_creator::RoomCreatorForm;
use super::notifications::NotificationTray;

/// Màn hình đang hiển thị.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Login,
    Chat { room: Option<String> },
    CreateChat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryStatus {
    Loading,
    Failed,
    Loaded,
}

/// What the message list should draw.
#[derive(Debug, PartialEq)]
pub enum HistoryView<'a> {
    Loading,
    Failed,
    Empty,
    Messages(&'a [ChatMessage]),
}

/// Trạng thái cục bộ của UI.
///
/// Navigation and network events go through `navigate` / `apply`, which
/// return the commands needed to bring the sockets in line with what is on
/// screen (mount on enter, unmount on leave).
pub struct AppState {
    pub screen: Screen,
    pub has_token: bool,
    pub user_id: Option<i64>,
    pub login: LoginForm,
    pub creator: RoomCreatorForm,
    pub chats: Vec<ChatRoom>,
    pub messages: Vec<ChatMessage>,
    pub notifications: NotificationTray,
    pub sender: SenderState,
    pub banner: Option<String>,
    chats_requested: bool,
    mounted_room: Option<String>,
    sender_socket: Option<Uuid>,
    history: HistoryStatus,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Login,
            has_token: false,
            user_id: None,
            login: LoginForm::default(),
            creator: RoomCreatorForm::default(),
            chats: Vec::new(),
            messages: Vec::new(),
            notifications: NotificationTray::default(),
            sender: SenderState::default(),
            banner: None,
            chats_requested: false,
            mounted_room: None,
            sender_socket: None,
            history: HistoryStatus::Loading,
        }
    }

    pub fn active_room(&self) -> Option<&str> {
        match &self.screen {
            Screen::Chat { room } => room.as_deref(),
            _ => None,
        }
    }

    pub fn history_view(&self) -> HistoryView<'_> {
        if !self.messages.is_empty() {
            return HistoryView::Messages(&self.messages);
        }
        match self.history {
            HistoryStatus::Loading => HistoryView::Loading,
            HistoryStatus::Failed => HistoryView::Failed,
            HistoryStatus::Loaded => HistoryView::Empty,
        }
    }

    pub fn navigate(&mut self, screen: Screen) -> Vec<NetworkCommand> {
        if screen != self.screen {
            self.banner = None;
        }
        self.screen = screen;
        self.sync_effects()
    }

    pub fn apply(&mut self, event: NetworkEvent, now: Instant) -> Vec<NetworkCommand> {
        match event {
            NetworkEvent::SessionRestored { has_token, user_id } => {
                self.has_token = has_token;
                self.user_id = user_id;
                if has_token && self.screen == Screen::Login {
                    self.screen = Screen::Chat { room: None };
                }
            }
            NetworkEvent::LoginSucceeded { user_id } => {
                self.has_token = true;
                self.user_id = user_id;
                self.chats_requested = false;
                self.login.pending = false;
                self.login.password.clear();
                self.login.feedback = feedback::LOGIN_OK.to_string();
                return self.navigate(Screen::Chat { room: None });
            }
            NetworkEvent::LoginFailed => {
                self.login.pending = false;
                self.login.feedback = feedback::LOGIN_FAILED.to_string();
            }
            NetworkEvent::LoggedOut => {
                *self = Self::new();
            }
            NetworkEvent::ChatsLoaded(chats) => {
                self.chats = chats;
            }
            NetworkEvent::RoomCreated { room_oid } => {
                self.creator.creating = false;
                self.creator.clear_fields();
                self.creator.feedback = feedback::ROOM_CREATED.to_string();
                let commands = self.navigate(Screen::Chat {
                    room: Some(room_oid),
                });
                self.banner = Some(feedback::ROOM_CREATED.to_string());
                return commands;
            }
            NetworkEvent::RoomCreateFailed(message) => {
                self.creator.creating = false;
                self.creator.feedback = message;
            }
            NetworkEvent::HistoryLoaded { room_oid, messages } => {
                if self.is_mounted(&room_oid) {
                    self.messages = messages;
                    self.history = HistoryStatus::Loaded;
                } else {
                    log::debug!("Ignoring history for room {room_oid}; no longer shown");
                }
            }
            NetworkEvent::HistoryFailed { room_oid } => {
                if self.is_mounted(&room_oid) {
                    self.history = HistoryStatus::Failed;
                }
            }
            NetworkEvent::MessageReceived { room_oid, message } => {
                if self.is_mounted(&room_oid) {
                    self.messages.push(message);
                } else {
                    log::debug!("Ignoring message for room {room_oid}; no longer shown");
                }
            }
            NetworkEvent::NotificationReceived { room_oid, text } => {
                if self.is_mounted(&room_oid) {
                    self.notifications.push(text, now);
                } else {
                    log::debug!("Ignoring notification from room {room_oid}; no longer shown");
                }
            }
            NetworkEvent::SenderMounted { room_oid, socket } => {
                if self.is_mounted(&room_oid) {
                    self.sender_socket = Some(socket);
                    self.sender.set_socket_state(SocketState::Connecting);
                }
            }
            NetworkEvent::SenderStatus { socket, state } => {
                // Sockets of a replaced sender keep reporting until they close
                if self.sender_socket == Some(socket) {
                    self.sender.set_socket_state(state);
                } else {
                    log::debug!("Ignoring {state:?} from replaced sender socket {socket}");
                }
            }
            NetworkEvent::SenderFeedback(text) => self.sender.feedback = text,
        }
        self.sync_effects()
    }

    fn is_mounted(&self, room_oid: &str) -> bool {
        self.mounted_room.as_deref() == Some(room_oid)
    }

    /// Chat list is fetched once the user id is known; the room view (and
    /// its sender) is mounted only when a room is selected and the user id
    /// is known.
    fn sync_effects(&mut self) -> Vec<NetworkCommand> {
        let mut commands = Vec::new();
        let in_chat = matches!(self.screen, Screen::Chat { .. });

        if in_chat && self.user_id.is_some() && !self.chats_requested {
            self.chats_requested = true;
            commands.push(NetworkCommand::FetchChats);
        }

        let wanted = match &self.screen {
            Screen::Chat { room: Some(room) } if self.user_id.is_some() => Some(room.clone()),
            _ => None,
        };
        if wanted == self.mounted_room {
            return commands;
        }

        if self.mounted_room.take().is_some() {
            commands.push(NetworkCommand::UnmountRoom);
            commands.push(NetworkCommand::UnmountSender);
        }
        self.messages.clear();
        self.history = HistoryStatus::Loading;
        self.sender = SenderState::default();
        self.sender_socket = None;
        self.notifications.clear();

        if let Some(room_oid) = wanted {
            commands.push(NetworkCommand::MountRoom {
                room_oid: room_oid.clone(),
            });
            commands.push(NetworkCommand::MountSender {
                room_oid: room_oid.clone(),
            });
            self.mounted_room = Some(room_oid);
        }
        commands
    }
}

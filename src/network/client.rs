use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::common::feedback;
use crate::common::{Credentials, NetworkCommand, NetworkEvent, NewChatRoom};
use crate::session::user_id_from_token;
use crate::storage::SessionDatabase;

use super::frames::{RoomFrame, decode_notification, decode_room_frame};
use super::socket::{
    SocketEvent, SocketHandle, notification_channel_url, redacted, room_channel_url,
};

/// Sockets opened for one mounted room view.
pub struct RoomView {
    room_oid: String,
    live: Option<SocketHandle>,
    notifications: Option<SocketHandle>,
}

impl RoomView {
    pub fn new(
        room_oid: String,
        live: Option<SocketHandle>,
        notifications: Option<SocketHandle>,
    ) -> Self {
        Self {
            room_oid,
            live,
            notifications,
        }
    }

    pub fn room_oid(&self) -> &str {
        &self.room_oid
    }

    /// Closes the sockets this view opened and nothing else. Returns how many
    /// were closed.
    pub fn close(self) -> usize {
        let mut closed = 0;
        for socket in [self.live, self.notifications].into_iter().flatten() {
            socket.close();
            closed += 1;
        }
        log::info!("Unmounted room {} ({closed} sockets closed)", self.room_oid);
        closed
    }
}

struct SenderSocket {
    room_oid: String,
    socket: SocketHandle,
}

/// Network side of the app: owns the session store, the REST client and
/// every socket. Talks to the UI only through the two channels.
pub struct ChatClient {
    event_sender: mpsc::Sender<NetworkEvent>,
    command_receiver: mpsc::Receiver<NetworkCommand>,
    api: ApiClient,
    ws_base_url: String,
    sessions: SessionDatabase,
    room_view: Option<RoomView>,
    sender: Option<SenderSocket>,
}

impl ChatClient {
    pub fn new(
        event_sender: mpsc::Sender<NetworkEvent>,
        command_receiver: mpsc::Receiver<NetworkCommand>,
        api: ApiClient,
        ws_base_url: String,
        sessions: SessionDatabase,
    ) -> Self {
        Self {
            event_sender,
            command_receiver,
            api,
            ws_base_url,
            sessions,
            room_view: None,
            sender: None,
        }
    }

    pub async fn run(mut self) {
        log::info!("Network event loop started (api: {})", self.api.base_url());

        while let Some(command) = self.command_receiver.recv().await {
            self.handle_command(command).await;
        }

        log::info!("Command channel closed; shutting down network loop");
        self.unmount_room();
        self.unmount_sender();
    }

    async fn handle_command(&mut self, command: NetworkCommand) {
        match command {
            NetworkCommand::RestoreSession => {
                let token = self.sessions.token();
                let user_id = user_id_from_token(token.as_deref());
                self.emit(NetworkEvent::SessionRestored {
                    has_token: token.is_some(),
                    user_id,
                })
                .await;
            }
            NetworkCommand::Login { email, password } => {
                self.handle_login(Credentials { email, password }).await;
            }
            NetworkCommand::Logout => {
                self.unmount_room();
                self.unmount_sender();
                if let Err(err) = self.sessions.clear_token() {
                    log::error!("Failed to clear session token: {err}");
                }
                log::info!("Logged out");
                self.emit(NetworkEvent::LoggedOut).await;
            }
            NetworkCommand::FetchChats => self.fetch_chats(),
            NetworkCommand::CreateChatRoom(room) => self.create_chat_room(room).await,
            NetworkCommand::MountRoom { room_oid } => self.mount_room(room_oid).await,
            NetworkCommand::UnmountRoom => self.unmount_room(),
            NetworkCommand::MountSender { room_oid } => self.mount_sender(room_oid).await,
            NetworkCommand::UnmountSender => self.unmount_sender(),
            NetworkCommand::SendMessage(text) => self.send_message(&text).await,
        }
    }

    async fn handle_login(&mut self, credentials: Credentials) {
        match self.api.authenticate(&credentials).await {
            Ok(token) => {
                if let Err(err) = self.sessions.save_token(&token.access) {
                    log::error!("Failed to persist session token: {err}");
                }
                let user_id = user_id_from_token(Some(&token.access));
                log::info!("Logged in as {}", credentials.email);
                self.emit(NetworkEvent::LoginSucceeded { user_id }).await;
            }
            Err(err) => {
                log::error!("Login failed for {}: {err}", credentials.email);
                self.emit(NetworkEvent::LoginFailed).await;
            }
        }
    }

    fn fetch_chats(&mut self) {
        let Some(token) = self.sessions.token() else {
            log::warn!("Skipping chat list fetch: no session token");
            return;
        };

        let api = self.api.clone();
        let events = self.event_sender.clone();
        tokio::spawn(async move {
            match api.user_chats(&token).await {
                Ok(chats) => {
                    log::info!("Fetched {} chat rooms", chats.len());
                    let _ = events.send(NetworkEvent::ChatsLoaded(chats)).await;
                }
                Err(err) => log::error!("Error fetching chats: {err}"),
            }
        });
    }

    async fn create_chat_room(&mut self, room: NewChatRoom) {
        let Some(token) = self.sessions.token() else {
            self.emit(NetworkEvent::RoomCreateFailed(
                feedback::ROOM_NEEDS_LOGIN.to_string(),
            ))
            .await;
            return;
        };

        let api = self.api.clone();
        let events = self.event_sender.clone();
        tokio::spawn(async move {
            let event = match api.create_chat_room(&token, &room).await {
                Ok(created) => {
                    log::info!("Created chat room {} ({})", created.room_oid, room.title);
                    NetworkEvent::RoomCreated {
                        room_oid: created.room_oid,
                    }
                }
                Err(err) => {
                    log::error!("Failed to create chat room: {err}");
                    NetworkEvent::RoomCreateFailed(feedback::ROOM_CREATE_FAILED.to_string())
                }
            };
            let _ = events.send(event).await;
        });
    }

    async fn mount_room(&mut self, room_oid: String) {
        self.unmount_room();

        let Some(token) = self.sessions.token() else {
            log::warn!("Cannot open room {room_oid}: no session token");
            self.emit(NetworkEvent::HistoryFailed { room_oid }).await;
            return;
        };

        log::info!("Mounting room {room_oid}");
        self.spawn_history_fetch(room_oid.clone(), token.clone());

        // 1. Socket tin nhắn của phòng
        let live = match room_channel_url(&self.ws_base_url, &room_oid, &token) {
            Ok(url) => {
                log::debug!("Opening room socket {}", redacted(&url));
                let (socket, frames) = SocketHandle::connect(url);
                forward_room_frames(room_oid.clone(), frames, self.event_sender.clone());
                Some(socket)
            }
            Err(err) => {
                log::error!("Cannot build room socket URL: {err}");
                None
            }
        };

        // 2. Socket thông báo của tài khoản
        let notifications = match notification_channel_url(&self.ws_base_url, &token) {
            Ok(url) => {
                let (socket, frames) = SocketHandle::connect(url);
                forward_notifications(room_oid.clone(), frames, self.event_sender.clone());
                Some(socket)
            }
            Err(err) => {
                log::error!("Cannot build notification socket URL: {err}");
                None
            }
        };

        self.room_view = Some(RoomView::new(room_oid, live, notifications));
    }

    /// The request is not cancelled by unmounting; the UI drops results for
    /// rooms it no longer shows.
    fn spawn_history_fetch(&self, room_oid: String, token: String) -> JoinHandle<()> {
        let api = self.api.clone();
        let events = self.event_sender.clone();
        tokio::spawn(async move {
            let event = match api.room_messages(&token, &room_oid).await {
                Ok(messages) => {
                    log::info!("Loaded {} messages for room {room_oid}", messages.len());
                    NetworkEvent::HistoryLoaded { room_oid, messages }
                }
                Err(err) => {
                    log::error!("Error fetching messages for room {room_oid}: {err}");
                    NetworkEvent::HistoryFailed { room_oid }
                }
            };
            let _ = events.send(event).await;
        })
    }

    fn unmount_room(&mut self) {
        if let Some(view) = self.room_view.take() {
            view.close();
        }
    }

    async fn mount_sender(&mut self, room_oid: String) {
        self.unmount_sender();

        let Some(token) = self.sessions.token() else {
            self.emit(NetworkEvent::SenderFeedback(
                feedback::SENDER_NO_TOKEN.to_string(),
            ))
            .await;
            return;
        };

        let url = match room_channel_url(&self.ws_base_url, &room_oid, &token) {
            Ok(url) => url,
            Err(err) => {
                log::error!("Cannot build sender socket URL: {err}");
                self.emit(NetworkEvent::SenderFeedback(
                    super::SocketState::Errored.feedback().to_string(),
                ))
                .await;
                return;
            }
        };

        log::info!("Mounting sender for room {room_oid}");
        let (socket, events) = SocketHandle::connect(url);
        // Announced before any status of this socket can reach the UI
        self.emit(NetworkEvent::SenderMounted {
            room_oid: room_oid.clone(),
            socket: socket.id(),
        })
        .await;
        forward_sender_state(socket.id(), events, self.event_sender.clone());
        self.sender = Some(SenderSocket { room_oid, socket });
    }

    fn unmount_sender(&mut self) {
        if let Some(sender) = self.sender.take() {
            log::info!("Unmounted sender for room {}", sender.room_oid);
            sender.socket.close();
        }
    }

    async fn send_message(&mut self, text: &str) {
        let result = match &self.sender {
            Some(sender) => sender.socket.send_message(text),
            None => Err(super::SocketError::NotOpen),
        };

        let message = match result {
            Ok(()) => feedback::SENDER_SENT,
            Err(err) => {
                log::warn!("Message not sent: {err}");
                feedback::SENDER_NOT_OPEN
            }
        };
        self.emit(NetworkEvent::SenderFeedback(message.to_string()))
            .await;
    }

    async fn emit(&mut self, event: NetworkEvent) {
        if let Err(err) = self.event_sender.send(event).await {
            log::warn!("Failed to notify UI: {err}");
        }
    }
}

/// Room socket → `MessageReceived` (or `NotificationReceived` for
/// notification envelopes), in arrival order.
fn forward_room_frames(
    room_oid: String,
    mut frames: broadcast::Receiver<SocketEvent>,
    events: mpsc::Sender<NetworkEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let event = match frames.recv().await {
                Ok(SocketEvent::Text(text)) => match decode_room_frame(&text) {
                    Ok(RoomFrame::Message(message)) => NetworkEvent::MessageReceived {
                        room_oid: room_oid.clone(),
                        message,
                    },
                    Ok(RoomFrame::Notification(text)) => NetworkEvent::NotificationReceived {
                        room_oid: room_oid.clone(),
                        text,
                    },
                    Err(err) => {
                        log::warn!("Dropping undecodable frame in room {room_oid}: {err}");
                        continue;
                    }
                },
                Ok(SocketEvent::State(state)) => {
                    log::info!("Chat socket for room {room_oid}: {state:?}");
                    if state.is_terminal() {
                        break;
                    }
                    continue;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("Room {room_oid} listener lagged, {skipped} frames lost");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            if events.send(event).await.is_err() {
                break;
            }
        }
    })
}

/// Notification socket → `NotificationReceived`, tagged with the room whose
/// view opened the socket.
fn forward_notifications(
    room_oid: String,
    mut frames: broadcast::Receiver<SocketEvent>,
    events: mpsc::Sender<NetworkEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match frames.recv().await {
                Ok(SocketEvent::Text(text)) => {
                    let Some(notification) = decode_notification(&text) else {
                        continue;
                    };
                    let event = NetworkEvent::NotificationReceived {
                        room_oid: room_oid.clone(),
                        text: notification,
                    };
                    if events.send(event).await.is_err() {
                        break;
                    }
                }
                Ok(SocketEvent::State(state)) => {
                    log::info!("Notification socket: {state:?}");
                    if state.is_terminal() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("Notification listener lagged, {skipped} frames lost");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Sender socket: only state changes matter, inbound frames are ignored.
fn forward_sender_state(
    socket: Uuid,
    mut frames: broadcast::Receiver<SocketEvent>,
    events: mpsc::Sender<NetworkEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match frames.recv().await {
                Ok(SocketEvent::State(state)) => {
                    let event = NetworkEvent::SenderStatus { socket, state };
                    if events.send(event).await.is_err() {
                        break;
                    }
                    if state.is_terminal() {
                        break;
                    }
                }
                Ok(SocketEvent::Text(_)) => {}
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use futures::{SinkExt, StreamExt};
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_hdr_async;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

    use super::*;
    use crate::network::SocketState;
    use crate::ui::state::{AppState, Screen};

    // Payload {"user_id": 42}
    const TOKEN: &str = "e30.eyJ1c2VyX2lkIjo0Mn0.sig";

    /// WebSocket server accepting any number of connections. Room sockets get
    /// `room_frames` pushed in order, notification sockets get
    /// `notification_frames`. Each connection then stays open until the
    /// client closes it.
    async fn serve_frames(
        room_frames: Vec<&'static str>,
        notification_frames: Vec<&'static str>,
    ) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let room_frames = room_frames.clone();
                let notification_frames = notification_frames.clone();
                tokio::spawn(async move {
                    let mut path = String::new();
                    let record_path =
                        |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
                            path = request.uri().path().to_string();
                            Ok(response)
                        };
                    let Ok(mut ws) = accept_hdr_async(stream, record_path).await else {
                        return;
                    };

                    let frames = if path.starts_with("/ws/notifications/") {
                        notification_frames
                    } else {
                        room_frames
                    };
                    for frame in frames {
                        if ws.send(Message::Text(frame.to_string().into())).await.is_err() {
                            return;
                        }
                    }
                    while let Some(Ok(message)) = ws.next().await {
                        if message.is_close() {
                            break;
                        }
                    }
                });
            }
        });

        format!("ws://{addr}")
    }

    /// Accepts TCP connections and never answers the handshake.
    async fn serve_silence() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });
        format!("ws://{addr}")
    }

    async fn next_event(events: &mut mpsc::Receiver<NetworkEvent>) -> NetworkEvent {
        tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("timed out waiting for network event")
            .expect("event channel closed")
    }

    fn client_with(
        sessions: SessionDatabase,
    ) -> (
        ChatClient,
        mpsc::Sender<NetworkCommand>,
        mpsc::Receiver<NetworkEvent>,
    ) {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::channel(16);
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        let client = ChatClient::new(
            event_tx,
            cmd_rx,
            api,
            "ws://127.0.0.1:9".to_string(),
            sessions,
        );
        (client, cmd_tx, event_rx)
    }

    #[test]
    fn closing_room_view_closes_only_its_sockets() {
        let (live, _, _) = SocketHandle::detached(SocketState::Open);
        let (never_opened, _, _) = SocketHandle::detached(SocketState::Connecting);
        let (unrelated, _, _) = SocketHandle::detached(SocketState::Open);

        let view = RoomView::new(
            "room-1".to_string(),
            Some(live.clone()),
            Some(never_opened.clone()),
        );
        assert_eq!(view.room_oid(), "room-1");
        assert_eq!(view.close(), 2);

        assert!(live.close_requested());
        assert!(never_opened.close_requested());
        assert!(!unrelated.close_requested());
    }

    #[test]
    fn closing_empty_room_view_is_fine() {
        let view = RoomView::new("room-2".to_string(), None, None);
        assert_eq!(view.close(), 0);
    }

    #[tokio::test]
    async fn restore_session_reports_decoded_user() {
        let sessions = SessionDatabase::in_memory().unwrap();
        sessions.save_token(TOKEN).unwrap();
        let (mut client, _cmd, mut events) = client_with(sessions);

        client.handle_command(NetworkCommand::RestoreSession).await;

        match events.recv().await.unwrap() {
            NetworkEvent::SessionRestored { has_token, user_id } => {
                assert!(has_token);
                assert_eq!(user_id, Some(42));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_without_sender_socket_is_rejected() {
        let (mut client, _cmd, mut events) = client_with(SessionDatabase::in_memory().unwrap());

        client
            .handle_command(NetworkCommand::SendMessage("hi".to_string()))
            .await;

        match events.recv().await.unwrap() {
            NetworkEvent::SenderFeedback(text) => assert_eq!(text, feedback::SENDER_NOT_OPEN),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_over_open_sender_socket() {
        let (mut client, _cmd, mut events) = client_with(SessionDatabase::in_memory().unwrap());
        let (socket, mut wire, _state) = SocketHandle::detached(SocketState::Open);
        client.sender = Some(SenderSocket {
            room_oid: "r".to_string(),
            socket,
        });

        client
            .handle_command(NetworkCommand::SendMessage("hi".to_string()))
            .await;

        assert_eq!(wire.try_recv().unwrap(), r#"{"message":"hi"}"#);
        assert!(wire.try_recv().is_err());
        match events.recv().await.unwrap() {
            NetworkEvent::SenderFeedback(text) => assert_eq!(text, feedback::SENDER_SENT),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn sender_without_token_reports_feedback() {
        let (mut client, _cmd, mut events) = client_with(SessionDatabase::in_memory().unwrap());

        client
            .handle_command(NetworkCommand::MountSender {
                room_oid: "r".to_string(),
            })
            .await;

        assert!(client.sender.is_none());
        match events.recv().await.unwrap() {
            NetworkEvent::SenderFeedback(text) => assert_eq!(text, feedback::SENDER_NO_TOKEN),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn room_without_token_opens_no_sockets() {
        let (mut client, _cmd, mut events) = client_with(SessionDatabase::in_memory().unwrap());

        client
            .handle_command(NetworkCommand::MountRoom {
                room_oid: "r".to_string(),
            })
            .await;

        assert!(client.room_view.is_none());
        assert!(matches!(
            events.recv().await.unwrap(),
            NetworkEvent::HistoryFailed { room_oid } if room_oid == "r"
        ));
    }

    #[tokio::test]
    async fn create_room_without_token_needs_login() {
        let (mut client, _cmd, mut events) = client_with(SessionDatabase::in_memory().unwrap());

        client
            .handle_command(NetworkCommand::CreateChatRoom(NewChatRoom {
                title: "t".to_string(),
                sender_id: 1,
                receiver_id: 2,
            }))
            .await;

        match events.recv().await.unwrap() {
            NetworkEvent::RoomCreateFailed(text) => assert_eq!(text, feedback::ROOM_NEEDS_LOGIN),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn remounting_room_closes_previous_view() {
        let sessions = SessionDatabase::in_memory().unwrap();
        sessions.save_token(TOKEN).unwrap();
        let (mut client, _cmd, _events) = client_with(sessions);

        let (old_live, _, _) = SocketHandle::detached(SocketState::Open);
        let (old_notes, _, _) = SocketHandle::detached(SocketState::Open);
        let (sender, _, _) = SocketHandle::detached(SocketState::Open);
        client.room_view = Some(RoomView::new(
            "old".to_string(),
            Some(old_live.clone()),
            Some(old_notes.clone()),
        ));
        client.sender = Some(SenderSocket {
            room_oid: "old".to_string(),
            socket: sender.clone(),
        });

        client
            .handle_command(NetworkCommand::MountRoom {
                room_oid: "new".to_string(),
            })
            .await;

        assert!(old_live.close_requested());
        assert!(old_notes.close_requested());
        assert!(!sender.close_requested());
        assert_eq!(client.room_view.as_ref().map(RoomView::room_oid), Some("new"));

        client.handle_command(NetworkCommand::UnmountRoom).await;
        assert!(client.room_view.is_none());
    }

    #[tokio::test]
    async fn logout_clears_token_and_sockets() {
        let sessions = SessionDatabase::in_memory().unwrap();
        sessions.save_token(TOKEN).unwrap();
        let (mut client, _cmd, mut events) = client_with(sessions);
        let (sender, _, _) = SocketHandle::detached(SocketState::Open);
        client.sender = Some(SenderSocket {
            room_oid: "r".to_string(),
            socket: sender.clone(),
        });

        client.handle_command(NetworkCommand::Logout).await;

        assert!(sender.close_requested());
        assert!(client.sessions.token().is_none());
        assert!(matches!(events.recv().await.unwrap(), NetworkEvent::LoggedOut));
    }

    #[tokio::test]
    async fn mounted_room_forwards_live_messages_and_notifications() {
        let ws_base = serve_frames(
            vec![
                "not json",
                r#"{"unexpected": true}"#,
                r#"{"message":"hi there","sender_id":"5","receiver_id":42}"#,
            ],
            vec!["{broken", r#"{"notification":"Bo joined"}"#],
        )
        .await;
        let sessions = SessionDatabase::in_memory().unwrap();
        sessions.save_token(TOKEN).unwrap();
        let (mut client, _cmd, mut events) = client_with(sessions);
        client.ws_base_url = ws_base;

        client
            .handle_command(NetworkCommand::MountRoom {
                room_oid: "r1".to_string(),
            })
            .await;

        let mut live = None;
        let mut notification = None;
        while live.is_none() || notification.is_none() {
            match next_event(&mut events).await {
                NetworkEvent::MessageReceived { room_oid, message } => {
                    live = Some((room_oid, message));
                }
                NetworkEvent::NotificationReceived { room_oid, text } => {
                    notification = Some((room_oid, text));
                }
                // History goes to an unreachable API and fails; not under test
                _ => {}
            }
        }

        // Undecodable frames came first on both sockets and did not stop
        // the forwarders
        let (room_oid, message) = live.unwrap();
        assert_eq!(room_oid, "r1");
        assert_eq!(message.content, "hi there");
        assert_eq!(message.sender_id, Some(5));
        assert!(!message.is_own(42));
        assert_eq!(
            notification,
            Some(("r1".to_string(), "Bo joined".to_string()))
        );

        client.handle_command(NetworkCommand::UnmountRoom).await;
        assert!(client.room_view.is_none());
    }

    #[tokio::test]
    async fn old_sender_close_does_not_reach_new_sender() {
        let sessions = SessionDatabase::in_memory().unwrap();
        sessions.save_token(TOKEN).unwrap();
        let (mut client, _cmd, mut events) = client_with(sessions);
        client.ws_base_url = serve_frames(Vec::new(), Vec::new()).await;

        let now = Instant::now();
        let mut state = AppState::new();
        state.apply(
            NetworkEvent::SessionRestored {
                has_token: true,
                user_id: Some(42),
            },
            now,
        );
        state.navigate(Screen::Chat {
            room: Some("r1".to_string()),
        });

        client
            .handle_command(NetworkCommand::MountSender {
                room_oid: "r1".to_string(),
            })
            .await;
        loop {
            let event = next_event(&mut events).await;
            let open = matches!(
                event,
                NetworkEvent::SenderStatus {
                    state: SocketState::Open,
                    ..
                }
            );
            state.apply(event, now);
            if open {
                break;
            }
        }
        assert_eq!(state.sender.socket, SocketState::Open);

        // Switch rooms; the new sender never finishes its handshake
        state.navigate(Screen::Chat {
            room: Some("r2".to_string()),
        });
        client.ws_base_url = serve_silence().await;
        client.handle_command(NetworkCommand::UnmountSender).await;
        client
            .handle_command(NetworkCommand::MountSender {
                room_oid: "r2".to_string(),
            })
            .await;

        let mut old_closed = false;
        while !old_closed {
            let event = next_event(&mut events).await;
            old_closed = matches!(
                event,
                NetworkEvent::SenderStatus {
                    state: SocketState::Closed,
                    ..
                }
            );
            state.apply(event, now);
        }
        while let Ok(event) = events.try_recv() {
            state.apply(event, now);
        }

        let actual = client.sender.as_ref().map(|sender| sender.socket.state());
        assert_eq!(actual, Some(SocketState::Connecting));
        assert_eq!(state.sender.socket, SocketState::Connecting);
        assert_eq!(state.sender.feedback, SocketState::Connecting.feedback());
    }
}

use std::time::Instant;

use eframe::egui;
use tokio::sync::mpsc;

use crate::common::feedback;
use crate::common::{NetworkCommand, NetworkEvent};

use super::components::{chat_list, login_form, message_list, message_sender, room_creator};
use super::state::{AppState, Screen};

pub struct ChatApp {
    state: AppState,
    command_sender: mpsc::Sender<NetworkCommand>,
    event_receiver: mpsc::Receiver<NetworkEvent>,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        command_sender: mpsc::Sender<NetworkCommand>,
        event_receiver: mpsc::Receiver<NetworkEvent>,
    ) -> Self {
        let mut app = Self {
            state: AppState::new(),
            command_sender,
            event_receiver,
        };
        app.send_command(NetworkCommand::RestoreSession);
        app
    }

    fn handle_network_events(&mut self) {
        let now = Instant::now();
        while let Ok(event) = self.event_receiver.try_recv() {
            let commands = self.state.apply(event, now);
            self.dispatch(commands);
        }
        self.state.notifications.expire(now);
    }

    fn dispatch(&mut self, commands: Vec<NetworkCommand>) {
        for command in commands {
            self.send_command(command);
        }
    }

    fn send_command(&mut self, command: NetworkCommand) {
        if let Err(err) = self.command_sender.try_send(command) {
            log::warn!("Failed to send command to network: {err}");
        }
    }

    fn navigate(&mut self, screen: Screen) {
        let commands = self.state.navigate(screen);
        self.dispatch(commands);
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let logout = egui::TopBottomPanel::top("top_bar")
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Parley");
                    if !self.state.has_token {
                        return false;
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let clicked = ui.button("Logout").clicked();
                        if let Some(user_id) = self.state.user_id {
                            ui.label(egui::RichText::new(format!("user #{user_id}")).weak());
                        }
                        clicked
                    })
                    .inner
                })
                .inner
            })
            .inner;

        if logout {
            self.send_command(NetworkCommand::Logout);
        }
    }

    fn render_login(&mut self, ctx: &egui::Context) {
        let credentials = egui::CentralPanel::default()
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.set_max_width(320.0);
                    ui.add_space(40.0);
                    login_form::render(ui, &mut self.state.login)
                })
                .inner
            })
            .inner;

        if let Some(credentials) = credentials {
            self.send_command(NetworkCommand::Login {
                email: credentials.email,
                password: credentials.password,
            });
        }
    }

    fn render_chat(&mut self, ctx: &egui::Context) {
        let actions = egui::SidePanel::left("chat_list")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                chat_list::render(ui, &self.state.chats, self.state.active_room())
            })
            .inner;

        if let Some(room_oid) = actions.open_room {
            self.navigate(Screen::Chat {
                room: Some(room_oid),
            });
        } else if actions.create_chat {
            self.navigate(Screen::CreateChat);
        }

        let room = self.state.active_room().map(str::to_owned);
        let mut outgoing = None;
        egui::CentralPanel::default().show(ctx, |ui| match (room, self.state.user_id) {
            (None, _) => {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.heading(feedback::WELCOME);
                });
            }
            (Some(_), None) => {
                ui.label(feedback::USER_LOADING);
            }
            (Some(room), Some(user_id)) => {
                let title = self
                    .state
                    .chats
                    .iter()
                    .find(|chat| chat.oid == room)
                    .map_or(room.as_str(), |chat| chat.title.as_str());
                ui.heading(title);
                if let Some(banner) = &self.state.banner {
                    ui.colored_label(egui::Color32::LIGHT_GREEN, banner);
                }
                ui.separator();

                message_list::render(
                    ui,
                    self.state.history_view(),
                    user_id,
                    &self.state.notifications,
                );

                ui.separator();
                outgoing = message_sender::render(ui, &mut self.state.sender);
            }
        });

        if let Some(text) = outgoing {
            self.send_command(NetworkCommand::SendMessage(text));
        }
    }

    fn render_create_chat(&mut self, ctx: &egui::Context) {
        let actions = egui::CentralPanel::default()
            .show(ctx, |ui| room_creator::render(ui, &mut self.state.creator))
            .inner;

        if let Some(room) = actions.submit {
            self.send_command(NetworkCommand::CreateChatRoom(room));
        }
        if actions.back {
            self.navigate(Screen::Chat { room: None });
        }
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_network_events();

        self.render_top_bar(ctx);
        match self.state.screen {
            Screen::Login => self.render_login(ctx),
            Screen::Chat { .. } => self.render_chat(ctx),
            Screen::CreateChat => self.render_create_chat(ctx),
        }

        ctx.request_repaint();
    }
}

use eframe::egui;

use crate::common::ChatRoom;
use crate::common::feedback;

#[derive(Default)]
pub struct ChatListActions {
    pub open_room: Option<String>,
    pub create_chat: bool,
}

pub fn render(ui: &mut egui::Ui, chats: &[ChatRoom], active_room: Option<&str>) -> ChatListActions {
    let mut actions = ChatListActions::default();

    ui.heading("Conversations");
    ui.separator();

    if chats.is_empty() {
        ui.label(feedback::NO_CHATS);
    } else {
        egui::ScrollArea::vertical()
            .id_salt("chat_list_scroll")
            .max_height((ui.available_height() - 40.0).max(0.0))
            .show(ui, |ui| {
                for chat in chats {
                    let is_active = active_room == Some(chat.oid.as_str());
                    let title = egui::RichText::new(&chat.title).strong();
                    if ui.selectable_label(is_active, title).clicked() && !is_active {
                        actions.open_room = Some(chat.oid.clone());
                    }
                }
            });
    }

    ui.separator();
    if ui.button("Create New Chat").clicked() {
        actions.create_chat = true;
    }

    actions
}

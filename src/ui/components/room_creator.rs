use eframe::egui;

use crate::common::NewChatRoom;
use crate::common::feedback;

#[derive(Debug, Default)]
pub struct RoomCreatorForm {
    pub title: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub feedback: String,
    pub creating: bool,
}

#[derive(Debug, Default)]
pub struct RoomCreatorActions {
    pub submit: Option<NewChatRoom>,
    pub back: bool,
}

impl RoomCreatorForm {
    pub fn validate(&self) -> Result<NewChatRoom, &'static str> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(feedback::ROOM_MISSING_TITLE);
        }
        let sender_id = self
            .sender_id
            .trim()
            .parse::<i64>()
            .map_err(|_| feedback::ROOM_INVALID_SENDER)?;
        let receiver_id = self
            .receiver_id
            .trim()
            .parse::<i64>()
            .map_err(|_| feedback::ROOM_INVALID_RECEIVER)?;

        Ok(NewChatRoom {
            title: title.to_string(),
            sender_id,
            receiver_id,
        })
    }

    pub fn clear_fields(&mut self) {
        self.title.clear();
        self.sender_id.clear();
        self.receiver_id.clear();
    }
}

pub fn render(ui: &mut egui::Ui, form: &mut RoomCreatorForm) -> RoomCreatorActions {
    let mut actions = RoomCreatorActions::default();

    ui.heading("Create a New Chat Room");
    ui.separator();

    egui::Grid::new("room_creator_fields")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            ui.label("Chat Room Title:");
            ui.add(egui::TextEdit::singleline(&mut form.title).hint_text("Enter chat room title"));
            ui.end_row();

            ui.label("Sender ID:");
            ui.add(egui::TextEdit::singleline(&mut form.sender_id).hint_text("Enter sender ID"));
            ui.end_row();

            ui.label("Receiver ID:");
            ui.add(
                egui::TextEdit::singleline(&mut form.receiver_id).hint_text("Enter receiver ID"),
            );
            ui.end_row();
        });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        let label = if form.creating {
            "Creating..."
        } else {
            "Create Chat Room"
        };
        if ui
            .add_enabled(!form.creating, egui::Button::new(label))
            .clicked()
        {
            match form.validate() {
                Ok(room) => {
                    form.creating = true;
                    form.feedback.clear();
                    actions.submit = Some(room);
                }
                Err(message) => form.feedback = message.to_string(),
            }
        }
        if ui.button("Back to chats").clicked() {
            actions.back = true;
        }
    });

    if !form.feedback.is_empty() {
        ui.add_space(8.0);
        ui.label(&form.feedback);
    }

    actions
}

use eframe::egui;

use crate::common::ChatMessage;
use crate::common::feedback;
use crate::ui::notifications::NotificationTray;
use crate::ui::state::HistoryView;

/// Which side of the conversation a message is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSide {
    Own,
    Other,
}

pub fn side_of(message: &ChatMessage, current_user_id: i64) -> MessageSide {
    if message.is_own(current_user_id) {
        MessageSide::Own
    } else {
        MessageSide::Other
    }
}

pub fn render(
    ui: &mut egui::Ui,
    history: HistoryView<'_>,
    current_user_id: i64,
    notifications: &NotificationTray,
) {
    render_notifications(ui, notifications);

    let messages = match history {
        HistoryView::Loading => {
            ui.label(feedback::HISTORY_LOADING);
            return;
        }
        HistoryView::Failed => {
            ui.label(feedback::HISTORY_FAILED);
            return;
        }
        HistoryView::Empty => {
            ui.label(feedback::NO_MESSAGES);
            return;
        }
        HistoryView::Messages(messages) => messages,
    };

    egui::ScrollArea::vertical()
        .id_salt("message_list_scroll")
        .stick_to_bottom(true)
        .auto_shrink([false, false])
        .max_height((ui.available_height() - 80.0).max(0.0))
        .show(ui, |ui| {
            for (index, message) in messages.iter().enumerate() {
                ui.push_id(index, |ui| {
                    render_message(ui, message, side_of(message, current_user_id));
                });
            }
        });
}

fn render_notifications(ui: &mut egui::Ui, notifications: &NotificationTray) {
    for notification in notifications.visible() {
        ui.push_id(notification.id, |ui| {
            egui::Frame::group(ui.style())
                .fill(egui::Color32::from_rgb(255, 243, 205))
                .show(ui, |ui| {
                    ui.colored_label(egui::Color32::BLACK, &notification.text);
                });
        });
    }
}

fn render_message(ui: &mut egui::Ui, message: &ChatMessage, side: MessageSide) {
    let (layout, fill) = match side {
        MessageSide::Own => (
            egui::Layout::right_to_left(egui::Align::TOP),
            egui::Color32::from_rgb(40, 90, 160),
        ),
        MessageSide::Other => (
            egui::Layout::left_to_right(egui::Align::TOP),
            egui::Color32::from_gray(60),
        ),
    };

    ui.with_layout(layout, |ui| {
        egui::Frame::group(ui.style()).fill(fill).show(ui, |ui| {
            ui.vertical(|ui| {
                ui.label(
                    egui::RichText::new(format!("{}:", message.display_name()))
                        .strong()
                        .color(egui::Color32::WHITE),
                );
                ui.label(egui::RichText::new(&message.content).color(egui::Color32::WHITE));
                if let Some(time) = message.display_time() {
                    ui.label(egui::RichText::new(time).small().weak());
                }
            });
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_from(sender_id: Option<i64>) -> ChatMessage {
        ChatMessage {
            oid: None,
            sender_id,
            sender_name: String::new(),
            content: "x".to_string(),
            created_at: None,
            receiver_id: None,
        }
    }

    #[test]
    fn own_messages_go_right() {
        assert_eq!(side_of(&message_from(Some(42)), 42), MessageSide::Own);
        assert_eq!(side_of(&message_from(Some(7)), 42), MessageSide::Other);
        assert_eq!(side_of(&message_from(None), 42), MessageSide::Other);
    }
}

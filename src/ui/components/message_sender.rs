use eframe::egui;

use crate::common::feedback;
use crate::network::SocketState;

/// Input box state plus the last known state of the sender's own socket.
#[derive(Debug)]
pub struct SenderState {
    pub input: String,
    pub feedback: String,
    pub socket: SocketState,
}

impl Default for SenderState {
    fn default() -> Self {
        Self {
            input: String::new(),
            feedback: String::new(),
            socket: SocketState::Connecting,
        }
    }
}

impl SenderState {
    pub fn set_socket_state(&mut self, state: SocketState) {
        self.socket = state;
        self.feedback = state.feedback().to_string();
    }

    /// Takes the input if the socket is open. Otherwise the text stays in the
    /// box and the rejection is shown instead.
    pub fn submit(&mut self) -> Option<String> {
        if self.input.trim().is_empty() {
            return None;
        }
        if self.socket != SocketState::Open {
            self.feedback = feedback::SENDER_NOT_OPEN.to_string();
            return None;
        }
        Some(std::mem::take(&mut self.input))
    }
}

pub fn render(ui: &mut egui::Ui, state: &mut SenderState) -> Option<String> {
    let mut send = false;
    ui.horizontal(|ui| {
        let response = ui.add(
            egui::TextEdit::singleline(&mut state.input).hint_text("Type your message..."),
        );
        if ui.button("Send").clicked() {
            send = true;
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            send = true;
            response.request_focus();
        }
    });

    if !state.feedback.is_empty() {
        let color = match state.socket {
            SocketState::Open => egui::Color32::LIGHT_GREEN,
            SocketState::Connecting => egui::Color32::YELLOW,
            SocketState::Closed | SocketState::Errored => egui::Color32::LIGHT_RED,
        };
        ui.colored_label(color, &state.feedback);
    }

    if send { state.submit() } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_while_open_takes_and_clears_input() {
        let mut state = SenderState::default();
        state.set_socket_state(SocketState::Open);
        assert_eq!(state.feedback, "Connected");
        state.input = "hello".to_string();

        assert_eq!(state.submit().as_deref(), Some("hello"));
        assert!(state.input.is_empty());
    }

    #[test]
    fn submit_while_not_open_is_rejected() {
        for socket in [
            SocketState::Connecting,
            SocketState::Closed,
            SocketState::Errored,
        ] {
            let mut state = SenderState::default();
            state.set_socket_state(socket);
            state.input = "hello".to_string();

            assert_eq!(state.submit(), None);
            assert_eq!(state.input, "hello");
            assert_eq!(state.feedback, feedback::SENDER_NOT_OPEN);
        }
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut state = SenderState::default();
        state.set_socket_state(SocketState::Open);
        state.input = "   ".to_string();
        assert_eq!(state.submit(), None);
        assert_eq!(state.feedback, "Connected");
    }
}

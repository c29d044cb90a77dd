use std::sync::LazyLock;

use eframe::egui;
use regex::Regex;

use crate::common::Credentials;
use crate::common::feedback;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

#[derive(Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub feedback: String,
    pub pending: bool,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, &'static str> {
        let email = self.email.trim();
        if !EMAIL_PATTERN.is_match(email) {
            return Err(feedback::LOGIN_INVALID_EMAIL);
        }
        if self.password.is_empty() {
            return Err(feedback::LOGIN_MISSING_PASSWORD);
        }
        Ok(Credentials {
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

/// Returns credentials when the user submits a valid form.
pub fn render(ui: &mut egui::Ui, form: &mut LoginForm) -> Option<Credentials> {
    let mut submitted = false;

    ui.vertical_centered(|ui| {
        ui.heading("Welcome Back!");
    });
    ui.add_space(12.0);

    ui.label("Email");
    let email = ui.add(egui::TextEdit::singleline(&mut form.email).hint_text("you@example.com"));
    ui.label("Password");
    let password = ui.add(egui::TextEdit::singleline(&mut form.password).password(true));

    let enter = (email.lost_focus() || password.lost_focus())
        && ui.input(|i| i.key_pressed(egui::Key::Enter));
    ui.add_space(8.0);
    let label = if form.pending { "Logging in..." } else { "Login" };
    if ui.add_enabled(!form.pending, egui::Button::new(label)).clicked() || enter {
        submitted = !form.pending;
    }

    if !form.feedback.is_empty() {
        ui.add_space(8.0);
        ui.colored_label(egui::Color32::LIGHT_RED, &form.feedback);
    }

    if !submitted {
        return None;
    }
    match form.validate() {
        Ok(credentials) => {
            form.pending = true;
            form.feedback.clear();
            Some(credentials)
        }
        Err(message) => {
            form.feedback = message.to_string();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_email_and_password() {
        let mut form = LoginForm::default();
        assert_eq!(form.validate().unwrap_err(), feedback::LOGIN_INVALID_EMAIL);

        form.email = "not-an-email".to_string();
        assert_eq!(form.validate().unwrap_err(), feedback::LOGIN_INVALID_EMAIL);

        form.email = " ana@example.com ".to_string();
        assert_eq!(form.validate().unwrap_err(), feedback::LOGIN_MISSING_PASSWORD);

        form.password = "secret".to_string();
        let credentials = form.validate().unwrap();
        assert_eq!(credentials.email, "ana@example.com");
        assert_eq!(credentials.password, "secret");
    }
}

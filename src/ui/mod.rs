pub mod app;
pub mod components;
pub mod notifications;
pub mod state;

pub use app::ChatApp;

pub mod chat_list;
pub mod login_form;
pub mod message_list;
pub mod message_sender;
pub mod room_creator;

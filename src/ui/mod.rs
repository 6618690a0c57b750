pub mod chat_view;
pub mod message_widget;

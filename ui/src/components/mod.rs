pub mod app;
pub mod assistant_client;
pub mod chat_view;
pub mod markdown_view;
pub mod registration_form;
pub mod session;

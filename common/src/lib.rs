pub mod api;
pub mod config;
pub mod conversation;
pub mod lifecycle;
pub mod message;
pub mod overlay;
pub mod registration;
pub mod render;
pub mod tasks;

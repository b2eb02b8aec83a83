// Handler modules for API endpoints
mod get_messages;
mod get_typing;
mod send_message;
mod send_typing;

// Re-export handlers
pub use get_messages::get_messages;
pub use get_typing::get_typing;
pub use send_message::send_message;
pub use send_typing::send_typing;

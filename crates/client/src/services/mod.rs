//! Typed wrappers around the chat service endpoints

pub mod auth;
pub mod chat;
pub mod friends;

pub use auth::AuthService;
pub use chat::ChatService;
pub use friends::FriendService;

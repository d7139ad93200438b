//! Parlor client
//!
//! Client-side session handling for the Parlor chat service: an HTTP client
//! whose authenticated requests refresh an expired access token once and
//! retry, plus view-controllers for the dashboard, friend requests and chat.
//! Front-ends plug in by implementing the view, [`Navigator`] and
//! [`TokenStore`] traits.

pub mod client;
pub mod config;
pub mod error;
pub mod navigation;
pub mod services;
pub mod session;
pub mod storage;
pub mod types;
pub mod views;

pub use client::{ApiRequest, AuthenticatedClient, PublicClient};
pub use config::ClientConfig;
pub use error::ClientError;
pub use navigation::{NavigationLog, Navigator, Route};
pub use session::Session;
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreExt};
pub use types::{ChatMessage, Contact, FriendRequest, FriendStatus, UserId, UserSummary};

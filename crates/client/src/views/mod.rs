//! View-controllers
//!
//! Each controller owns the behaviour of one part of the UI and talks to the
//! screen through a small trait, so the same logic drives a browser page, a
//! terminal, or a test double.

pub mod chat;
pub mod dashboard;
pub mod forms;
pub mod friends;

pub use chat::{ChatPanel, ChatState, ChatView, RenderedMessage};
pub use dashboard::{BootstrapOutcome, Dashboard, DashboardView, Tab};
pub use forms::{FormView, LoginForm, RegisterForm, logout};
pub use friends::{Feedback, FriendRequestPanel, FriendRequestRow, FriendRequestView};

use std::sync::{Mutex, MutexGuard, PoisonError};

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

//! Plain-text rendering of the client views on stdout

use parlor_client::views::{
    ChatView, DashboardView, Feedback, FormView, FriendRequestRow, FriendRequestView,
    RenderedMessage,
};
use parlor_client::{Contact, UserId};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Prints view updates as lines of text
///
/// The conversation is re-rendered on every poll; only messages past the
/// ones already printed are written.
#[derive(Default)]
pub struct TerminalView {
    transcript: Mutex<Transcript>,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Transcript {
    printed: usize,
    placeholder_shown: bool,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    fn transcript(&self) -> MutexGuard<'_, Transcript> {
        self.transcript.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FormView for TerminalView {
    fn show_success(&self, message: &str) {
        println!("{message}");
    }

    fn show_error(&self, message: &str) {
        eprintln!("{message}");
    }
}

impl DashboardView for TerminalView {
    fn set_content_visible(&self, _visible: bool) {}

    fn show_loading(&self) {}

    fn hide_loading(&self) {}

    fn show_error(&self, message: &str) {
        eprintln!("{message}");
    }

    fn set_display_name(&self, name: &str) {
        println!("Signed in as {name}");
    }
}

impl FriendRequestView for TerminalView {
    fn render_requests(&self, rows: &[FriendRequestRow]) {
        for row in rows {
            let marker = if row.actionable { "*" } else { " " };
            println!(
                "{marker} #{:<6} {:<24} {}",
                row.request_id, row.sender_name, row.status
            );
        }
    }

    fn show_placeholder(&self, text: &str) {
        println!("{text}");
    }

    fn show_feedback(&self, feedback: &Feedback) {
        match feedback {
            Feedback::Success(message) => println!("{message}"),
            Feedback::Warning(message) | Feedback::Error(message) => eprintln!("{message}"),
        }
    }

    fn clear_feedback(&self) {}
}

impl ChatView for TerminalView {
    fn render_contacts(&self, contacts: &[Contact], selected: Option<&UserId>) {
        for contact in contacts {
            let marker = if selected == Some(&contact.user_id) { ">" } else { " " };
            println!("{marker} {:<8} {}", contact.user_id, contact.display_name());
        }
    }

    fn show_contacts_placeholder(&self, text: &str) {
        println!("{text}");
    }

    fn highlight_contact(&self, _user_id: &UserId) {}

    fn set_chat_label(&self, label: &str) {
        println!("-- {label} --");
    }

    fn set_compose_visible(&self, _visible: bool) {}

    fn render_messages(&self, messages: &[RenderedMessage]) {
        let mut transcript = self.transcript();
        if transcript.printed > messages.len() {
            transcript.printed = 0;
        }
        for message in &messages[transcript.printed..] {
            if message.timestamp.is_empty() {
                println!("{}: {}", message.sender_label, message.text);
            } else {
                println!(
                    "[{}] {}: {}",
                    message.timestamp, message.sender_label, message.text
                );
            }
        }
        transcript.printed = messages.len();
        transcript.placeholder_shown = false;
    }

    fn show_messages_placeholder(&self, text: &str) {
        let mut transcript = self.transcript();
        transcript.printed = 0;
        if !transcript.placeholder_shown {
            transcript.placeholder_shown = true;
            println!("{text}");
        }
    }

    fn clear_messages(&self) {
        *self.transcript() = Transcript::default();
    }

    fn clear_input(&self) {}

    fn scroll_to_latest(&self) {}
}
